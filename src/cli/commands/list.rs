//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::feed;
use anyhow::Result;

/// List the episodes in the feed, newest first.
pub fn run_list(settings: &Settings) -> Result<()> {
    let feed_path = settings.feed_path();
    if !feed_path.exists() {
        Output::info("No feed yet. Use 'autocast feed-init' to create one.");
        return Ok(());
    }

    let items = match feed::read_items(&feed_path) {
        Ok(items) => items,
        Err(e) => {
            Output::error(&format!("Failed to read feed: {}", e));
            return Err(e.into());
        }
    };

    if items.is_empty() {
        Output::info("The feed has no episodes yet. Use 'autocast run' to publish one.");
        return Ok(());
    }

    Output::header(&format!("Episodes ({})", items.len()));
    println!();
    for item in &items {
        Output::episode_info(&item.title, &item.pub_date, item.enclosure_length);
    }

    let total: u64 = items.iter().filter_map(|i| i.enclosure_length).sum();
    println!();
    Output::kv("Feed", &feed_path.display().to_string());
    Output::kv("Total audio", &crate::cli::output::format_size(total));

    Ok(())
}
