//! Run command - produce and publish one episode.

use crate::cli::output::{format_duration, format_size};
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::AutocastError;
use crate::pipeline::Pipeline;
use anyhow::Result;
use chrono::{NaiveDate, Utc};

/// Run the pipeline once.
pub async fn run_episode(date: Option<NaiveDate>, force: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check_run(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'autocast doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    Output::info(&format!("Producing episode for {}", date.format("%Y-%m-%d")));

    let pipeline = Pipeline::new(settings)?;

    match pipeline.run_once(date, force).await {
        Ok(result) => {
            Output::success(&format!("Published '{}'", result.episode.title));
            Output::kv("Topic", &format!("#{} {}", result.topic.index, result.topic.topic));
            Output::kv("Chunks", &result.chunk_count.to_string());
            Output::kv("Duration", &format_duration(result.duration));
            Output::kv(
                "Audio",
                &format!(
                    "{} ({})",
                    result.audio_path.display(),
                    format_size(result.episode.enclosure.length)
                ),
            );
            Output::kv("URL", &result.episode.enclosure.url);
            Ok(())
        }
        Err(e) => {
            match &e {
                AutocastError::EpisodeExists(_) => {
                    Output::warning("An episode for this date is already in the feed.");
                }
                AutocastError::ExhaustedPool { .. } => {
                    Output::error(&format!("{}", e));
                    Output::info("Add topics to the pool file or reset the used-topics file.");
                }
                _ => Output::error(&format!("Run failed: {}", e)),
            }
            Err(e.into())
        }
    }
}
