//! Topics command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::topics::{TopicPool, TopicStatus, UsedTopics};
use anyhow::Result;

/// Show how much of the topic pool has been used.
pub fn run_topics(remaining: bool, settings: &Settings) -> Result<()> {
    let pool_path = settings.topic_pool_path();
    let pool = TopicPool::load_or_builtin(pool_path.as_deref())?;
    let used = UsedTopics::load(&settings.used_topics_path(), pool.len());
    let status = TopicStatus::new(&pool, &used);

    Output::header("Topic Pool");
    Output::kv(
        "Source",
        &pool_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
    );
    Output::kv("Topics", &status.pool_size.to_string());
    Output::kv("Used", &status.used.to_string());
    Output::kv("Remaining", &status.remaining.to_string());

    if status.remaining == 0 {
        println!();
        Output::warning("Every topic has been used. The next run will fail.");
    }

    if remaining && status.remaining > 0 {
        println!();
        for (index, topic) in pool.topics().iter().enumerate() {
            if !used.contains(index) {
                Output::list_item(&format!("#{} {}", index, topic));
            }
        }
    }

    Ok(())
}
