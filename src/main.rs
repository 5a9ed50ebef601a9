//! Autocast CLI entry point.

use anyhow::Result;
use autocast::cli::{commands, Cli, Commands};
use autocast::config::Settings;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    // -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("autocast={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Run { date, force } => {
            commands::run_episode(*date, *force, settings).await?;
        }

        Commands::Topics { remaining } => {
            commands::run_topics(*remaining, &settings)?;
        }

        Commands::List => {
            commands::run_list(&settings)?;
        }

        Commands::FeedInit => {
            commands::run_feed_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
