//! Doctor command - verify system requirements and configuration.

use crate::cli::output::format_size;
use crate::cli::Output;
use crate::config::Settings;
use crate::feed;
use crate::topics::{TopicPool, TopicStatus, UsedTopics};
use console::style;
use std::path::Path;
use std::process::Command;

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
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Autocast Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    let sections: [(&str, Vec<CheckResult>); 4] = [
        ("External Tools", vec![check_ffmpeg()]),
        ("API Configuration", vec![check_openai_api_key()]),
        ("Publishing", check_publishing(settings)),
        ("Topics", vec![check_topics(settings), check_config_file()]),
    ];

    for (title, results) in sections {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        println!();
        checks.extend(results);
    }

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before running Autocast.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Autocast is ready to publish.");
    }

    Ok(())
}

fn check_ffmpeg() -> CheckResult {
    let hint = install_hint_ffmpeg();
    match Command::new("ffmpeg").arg("-version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect::<String>();
            CheckResult::ok("ffmpeg", &version)
        }
        Ok(_) => CheckResult::error("ffmpeg", "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error("ffmpeg", "not found", hint)
        }
        Err(e) => CheckResult::error("ffmpeg", &format!("error: {}", e), hint),
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

fn check_publishing(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let base = &settings.publish.base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        results.push(CheckResult::error(
            "Base URL",
            base,
            "Set publish.base_url to the public http(s) address of the site directory",
        ));
    } else if base.contains("example.com") {
        results.push(CheckResult::warning(
            "Base URL",
            base,
            "Still the default; enclosure URLs will not resolve",
        ));
    } else {
        results.push(CheckResult::ok("Base URL", base));
    }

    results.push(check_feed(&settings.feed_path()));
    results
}

fn check_feed(path: &Path) -> CheckResult {
    if !path.exists() {
        return CheckResult::error(
            "Feed",
            &format!("{} (missing)", path.display()),
            "Create with: autocast feed-init",
        );
    }

    match feed::read_items(path) {
        Ok(items) => {
            let size = std::fs::metadata(path)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "unknown size".to_string());
            CheckResult::ok(
                "Feed",
                &format!("{} ({} episodes, {})", path.display(), items.len(), size),
            )
        }
        Err(e) => CheckResult::error(
            "Feed",
            &format!("{} does not parse", path.display()),
            &e.to_string(),
        ),
    }
}

fn check_topics(settings: &Settings) -> CheckResult {
    let pool = match TopicPool::load_or_builtin(settings.topic_pool_path().as_deref()) {
        Ok(pool) => pool,
        Err(e) => {
            return CheckResult::error("Topic pool", &e.to_string(), "Check topics.pool_file")
        }
    };
    let used = UsedTopics::load(&settings.used_topics_path(), pool.len());
    let status = TopicStatus::new(&pool, &used);
    let message = format!("{} of {} remaining", status.remaining, status.pool_size);

    match status.remaining {
        0 => CheckResult::error("Topic pool", &message, "Add topics or reset the used-topics file"),
        1..=6 => CheckResult::warning("Topic pool", &message, "Less than a week of topics left"),
        _ => CheckResult::ok("Topic pool", &message),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: autocast config edit",
        )
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}
