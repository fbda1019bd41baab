//! Date and time resolution for scheduling requests.
//!
//! [`parse_iso`] accepts only ISO 8601 timestamps. [`parse_natural`] handles
//! the loose phrasing people use on calls ("next Tuesday at 3pm", "July 2nd",
//! "in two hours") relative to a reference instant. Wall-clock times are read
//! in a calendar timezone and returned as UTC.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
    Weekday,
};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::OnceLock;

/// Hour used when a date is mentioned without a time of day.
const DEFAULT_MEETING_HOUR: u32 = 9;

/// Parse a strict ISO 8601 timestamp, taking timestamps without an offset as UTC.
pub fn parse_iso(input: &str) -> Option<DateTime<Utc>> {
    parse_iso_in(input, chrono_tz::UTC)
}

/// Parse a strict ISO 8601 timestamp.
///
/// Offsets are converted to UTC; timestamps without an offset are wall-clock
/// times in `tz`. A bare date resolves to midnight.
pub fn parse_iso_in(input: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return localize(dt, tz);
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| localize(dt, tz))
}

/// Parse a natural-language date/time mention relative to `now`, in UTC.
pub fn parse_natural(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    parse_natural_in(input, now, chrono_tz::UTC)
}

/// Parse a natural-language date/time mention relative to `now`, reading
/// dates and times of day in `tz`.
///
/// Returns `None` when the text carries no date or time cue at all, or when
/// the mentioned offset is out of range.
pub fn parse_natural_in(input: &str, now: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    if let Some(found) = embedded_iso_regex().find(input) {
        if let Some(dt) = parse_iso_in(found.as_str(), tz) {
            return Some(dt);
        }
    }

    let text = input.to_lowercase();

    if short_offset_regex().is_match(&text) {
        return parse_short_offset(&text, now);
    }

    let local_now = now.with_timezone(&tz).naive_local();
    let today = local_now.date();
    let resolved = match (find_date(&text, today), find_time(&text)) {
        (Some(date), Some(time)) => date.and_time(time),
        (Some(date), None) => date.and_hms_opt(DEFAULT_MEETING_HOUR, 0, 0)?,
        (None, Some(time)) => {
            let candidate = today.and_time(time);
            if candidate <= local_now {
                candidate.checked_add_signed(Duration::days(1))?
            } else {
                candidate
            }
        }
        (None, None) => return None,
    };

    localize(resolved, tz)
}

/// Map a wall-clock time in `tz` to UTC. Times skipped by a DST change have no mapping;
/// repeated ones take the earlier instant.
fn localize(local: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Extract the first literal `YYYY-MM-DDTHH:MM:SS` timestamp from text.
pub fn find_iso_timestamp(text: &str) -> Option<&str> {
    iso_timestamp_regex().find(text).map(|m| m.as_str())
}

fn iso_timestamp_regex() -> &'static Regex {
    static ISO_TIMESTAMP_RE: OnceLock<Regex> = OnceLock::new();
    ISO_TIMESTAMP_RE.get_or_init(|| {
        Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("iso timestamp regex must compile")
    })
}

fn embedded_iso_regex() -> &'static Regex {
    static EMBEDDED_ISO_RE: OnceLock<Regex> = OnceLock::new();
    EMBEDDED_ISO_RE.get_or_init(|| {
        Regex::new(r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:\d{2})?")
            .expect("embedded iso regex must compile")
    })
}

fn short_offset_regex() -> &'static Regex {
    static SHORT_OFFSET_RE: OnceLock<Regex> = OnceLock::new();
    SHORT_OFFSET_RE.get_or_init(|| {
        Regex::new(r"\bin\s+(\d+|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\s+(minute|hour)s?\b")
            .expect("short offset regex must compile")
    })
}

/// "in 20 minutes", "in an hour".
fn parse_short_offset(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = short_offset_regex().captures(text)?;
    let amount = parse_count(&caps[1])?;
    let offset = match &caps[2] {
        "minute" => Duration::try_minutes(amount)?,
        _ => Duration::try_hours(amount)?,
    };

    now.checked_add_signed(offset)?
        .with_second(0)?
        .with_nanosecond(0)
}

fn find_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    static ISO_DATE_RE: OnceLock<Regex> = OnceLock::new();
    static MONTH_FIRST_RE: OnceLock<Regex> = OnceLock::new();
    static DAY_FIRST_RE: OnceLock<Regex> = OnceLock::new();
    static NUMERIC_DATE_RE: OnceLock<Regex> = OnceLock::new();
    static DAY_OFFSET_RE: OnceLock<Regex> = OnceLock::new();
    static WEEKDAY_RE: OnceLock<Regex> = OnceLock::new();

    const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

    let iso = ISO_DATE_RE.get_or_init(|| {
        Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("iso date regex must compile")
    });
    if let Some(caps) = iso.captures(text) {
        return NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?);
    }

    let month_first = MONTH_FIRST_RE.get_or_init(|| {
        Regex::new(&format!(
            r"\b({MONTHS})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
        ))
        .expect("month-first date regex must compile")
    });
    if let Some(caps) = month_first.captures(text) {
        let month = month_number(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = caps.get(3).and_then(|y| y.as_str().parse().ok());
        return resolve_calendar_date(year, month, day, today);
    }

    let day_first = DAY_FIRST_RE.get_or_init(|| {
        Regex::new(&format!(
            r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\b(?:,?\s+(\d{{4}})\b)?"
        ))
        .expect("day-first date regex must compile")
    });
    if let Some(caps) = day_first.captures(text) {
        let day = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = caps.get(3).and_then(|y| y.as_str().parse().ok());
        return resolve_calendar_date(year, month, day, today);
    }

    let numeric = NUMERIC_DATE_RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").expect("numeric date regex must compile")
    });
    if let Some(caps) = numeric.captures(text) {
        let month = caps[1].parse().ok()?;
        let day = caps[2].parse().ok()?;
        let year = caps.get(3).and_then(|y| {
            let value: i32 = y.as_str().parse().ok()?;
            Some(if y.as_str().len() == 2 { 2000 + value } else { value })
        });
        return resolve_calendar_date(year, month, day, today);
    }

    if text.contains("day after tomorrow") {
        return today.checked_add_signed(Duration::days(2));
    }
    if text.contains("tomorrow") {
        return today.checked_add_signed(Duration::days(1));
    }
    if contains_word(text, "today") || contains_word(text, "tonight") {
        return Some(today);
    }

    let day_offset = DAY_OFFSET_RE.get_or_init(|| {
        Regex::new(r"\bin\s+(\d+|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\s+(day|week)s?\b")
            .expect("day offset regex must compile")
    });
    if let Some(caps) = day_offset.captures(text) {
        let amount = parse_count(&caps[1])?;
        let days = if &caps[2] == "week" {
            amount.checked_mul(7)?
        } else {
            amount
        };
        return today.checked_add_signed(Duration::try_days(days)?);
    }

    if text.contains("next week") {
        return today.checked_add_signed(Duration::days(7));
    }

    let weekday = WEEKDAY_RE.get_or_init(|| {
        Regex::new(r"\b(?:(next|this|on)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
            .expect("weekday regex must compile")
    });
    if let Some(caps) = weekday.captures(text) {
        let target: Weekday = caps[2].parse().ok()?;
        let allow_today = caps.get(1).is_some_and(|q| q.as_str() == "this");
        let mut ahead = (target.num_days_from_monday() as i64
            - today.weekday().num_days_from_monday() as i64)
            .rem_euclid(7);
        if ahead == 0 && !allow_today {
            ahead = 7;
        }
        return today.checked_add_signed(Duration::days(ahead));
    }

    None
}

fn find_time(text: &str) -> Option<NaiveTime> {
    static TWELVE_HOUR_RE: OnceLock<Regex> = OnceLock::new();
    static TWENTY_FOUR_HOUR_RE: OnceLock<Regex> = OnceLock::new();
    static BARE_HOUR_RE: OnceLock<Regex> = OnceLock::new();

    if contains_word(text, "noon") || contains_word(text, "midday") {
        return NaiveTime::from_hms_opt(12, 0, 0);
    }
    if contains_word(text, "midnight") {
        return NaiveTime::from_hms_opt(0, 0, 0);
    }

    let twelve = TWELVE_HOUR_RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\b").expect("12-hour time regex must compile")
    });
    for caps in twelve.captures_iter(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            continue;
        }
        let hour = match &caps[3] {
            "p" => hour % 12 + 12,
            _ => hour % 12,
        };
        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
            return Some(time);
        }
    }

    let twenty_four = TWENTY_FOUR_HOUR_RE.get_or_init(|| {
        Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("24-hour time regex must compile")
    });
    if let Some(caps) = twenty_four.captures(text) {
        return NaiveTime::from_hms_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, 0);
    }

    let bare = BARE_HOUR_RE.get_or_init(|| {
        Regex::new(r"\bat\s+(\d{1,2})\b").expect("bare hour regex must compile")
    });
    for caps in bare.captures_iter(text) {
        let whole = caps.get(0)?;
        let followed_by_date = text[whole.end()..]
            .chars()
            .next()
            .is_some_and(|c| c == '/' || c == '-' || c == ':');
        if followed_by_date {
            continue;
        }
        let hour: u32 = caps[1].parse().ok()?;
        // Business hours: "at 3" means the afternoon.
        let hour = match hour {
            1..=7 => hour + 12,
            8..=23 => hour,
            _ => continue,
        };
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }

    None
}

/// A date from month/day with an optional year; yearless dates already past roll to next year.
fn resolve_calendar_date(year: Option<i32>, month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => {
            let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
            if this_year < today {
                NaiveDate::from_ymd_opt(today.year() + 1, month, day)
            } else {
                Some(this_year)
            }
        }
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_count(word: &str) -> Option<i64> {
    let count = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        digits => digits.parse().ok()?,
    };
    Some(count)
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}
