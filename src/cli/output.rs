//! CLI output formatting utilities.

use crate::report::AgentOutputRecord;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print an analyzed call.
    pub fn record(record: &AgentOutputRecord) {
        Output::header("Executive Summary");
        println!("{}", or_none(&record.summary));

        Output::header("Action Items");
        if record.action_items.is_empty() {
            println!("{}", style("(none)").dim());
        }
        for item in &record.action_items {
            Output::list_item(item);
        }

        Output::header("Calendar");
        println!("{}", or_none(&record.calendar));

        Output::header("Web Search");
        println!("{}", or_none(&record.web_search));
    }

    /// Print a single-line preview of a transcript.
    pub fn transcript_preview(text: &str) {
        println!("  {}", style(content_preview(text, 200)).dim());
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn or_none(text: &str) -> String {
    if text.trim().is_empty() {
        style("(none)").dim().to_string()
    } else {
        text.to_string()
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    match content.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short\ntext", 20), "short text");
        assert_eq!(content_preview("abcdef", 3), "abc...");
        assert_eq!(content_preview("åäöåäö", 3), "åäö...");
    }
}
