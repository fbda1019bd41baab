//! Doctor command - verify keys, credentials and configuration.

use super::config::mask;
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::AuthorizedUserToken;
use chrono::Utc;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("callbrief doctor");
    println!();

    let sections = [
        (
            "API Keys",
            vec![check_openai_key(settings), check_serpapi_key(settings)],
        ),
        (
            "Calendar",
            vec![
                check_calendar_token(&settings.token_path()).await,
                check_timezone(&settings.calendar.timezone),
            ],
        ),
        (
            "Configuration",
            vec![check_config_file(config_path), check_prompt_file(settings)],
        ),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before analyzing calls.",
            errors
        ));
        anyhow::bail!("{} doctor check(s) failed", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! callbrief is ready to use.");
    }

    Ok(())
}

fn check_openai_key(settings: &Settings) -> CheckResult {
    match settings.openai_api_key() {
        Some(key) if key.starts_with("sk-") => {
            CheckResult::ok("OpenAI API key", &format!("configured ({})", mask(&key)))
        }
        Some(_) => CheckResult::warning(
            "OpenAI API key",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error(
            "OpenAI API key",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

fn check_serpapi_key(settings: &Settings) -> CheckResult {
    match settings.serpapi_api_key() {
        Some(key) => CheckResult::ok("SerpAPI key", &format!("configured ({})", mask(&key))),
        None => CheckResult::warning(
            "SerpAPI key",
            "not set, web search disabled",
            "Set with: export SERPAPI_API_KEY='...'",
        ),
    }
}

async fn check_calendar_token(path: &Path) -> CheckResult {
    let name = "Calendar token";
    if !path.exists() {
        return CheckResult::warning(
            name,
            &format!("{} not found, events cannot be created", path.display()),
            "Authorize Google Calendar access and save the token file there",
        );
    }

    match AuthorizedUserToken::load(path).await {
        Ok(token) if token.is_fresh(Utc::now()) => {
            CheckResult::ok(name, &format!("{} (access token valid)", path.display()))
        }
        Ok(token) if token.refresh_token.is_some() => CheckResult::ok(
            name,
            &format!("{} (will refresh on first use)", path.display()),
        ),
        Ok(_) => CheckResult::error(
            name,
            "access token expired and no refresh token",
            "Re-run the Google Calendar authorization",
        ),
        Err(e) => CheckResult::error(name, &e.to_string(), "Re-run the Google Calendar authorization"),
    }
}

fn check_timezone(timezone: &str) -> CheckResult {
    match timezone.trim().parse::<chrono_tz::Tz>() {
        Ok(tz) => CheckResult::ok("Timezone", tz.name()),
        Err(_) => CheckResult::warning(
            "Timezone",
            &format!("'{}' is not an IANA timezone, using UTC", timezone),
            "Set calendar.timezone to a name like 'Europe/Berlin'",
        ),
    }
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: callbrief config init",
        )
    }
}

fn check_prompt_file(settings: &Settings) -> CheckResult {
    match &settings.agent.prompt_file {
        None => CheckResult::ok("Prompts", "built-in"),
        Some(file) if Settings::expand_path(file).exists() => CheckResult::ok("Prompts", file),
        Some(file) => CheckResult::error(
            "Prompts",
            &format!("{} not found", file),
            "Fix agent.prompt_file in the config file",
        ),
    }
}
