//! Feed-init command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::feed::document;
use anyhow::Result;

/// Create an empty feed and the episodes directory.
pub fn run_feed_init(settings: &Settings) -> Result<()> {
    let feed_path = settings.feed_path();

    if let Err(e) = document::create(&feed_path, &settings.channel) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }
    Output::success(&format!("Created feed at {}", feed_path.display()));

    let episodes_dir = settings.episodes_dir();
    std::fs::create_dir_all(&episodes_dir)?;
    Output::kv("Episodes", &episodes_dir.display().to_string());
    Output::kv(
        "Feed URL",
        &format!(
            "{}/{}",
            settings.publish.base_url.trim_end_matches('/'),
            settings.publish.feed_file
        ),
    );

    Ok(())
}
