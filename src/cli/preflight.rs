//! Pre-flight checks before a run.
//!
//! A run spends a topic before it reaches synthesis, so missing tools and
//! configuration are caught here rather than halfway through.

use crate::config::Settings;
use crate::error::{AutocastError, Result};
use crate::openai::is_api_key_configured;
use std::process::Command;

/// Check everything `autocast run` needs.
pub fn check_run(settings: &Settings) -> Result<()> {
    check_api_key()?;
    check_tool("ffmpeg")?;
    check_base_url(settings)?;

    let feed_path = settings.feed_path();
    if !feed_path.exists() {
        return Err(AutocastError::Config(format!(
            "No feed at {}. Create one with: autocast feed-init",
            feed_path.display()
        )));
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        Ok(())
    } else {
        Err(AutocastError::Config(
            "OPENAI_API_KEY is not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}

fn check_base_url(settings: &Settings) -> Result<()> {
    let base = settings.publish.base_url.trim();
    if base.starts_with("http://") || base.starts_with("https://") {
        Ok(())
    } else {
        Err(AutocastError::Config(format!(
            "publish.base_url must be an http(s) URL, got '{}'",
            base
        )))
    }
}

/// Check if an external tool is available.
pub(crate) fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("-version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(AutocastError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AutocastError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(AutocastError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
