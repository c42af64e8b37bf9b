//! stagepipe - Main Entry Point
//!
//! Reads integers from stdin, one per line, until `exit` or end of input.
//! An optional first argument names a TOML config file.

use stagepipe::{config, PipelineBuilder, PipelineConfig, ResultExt};
use std::io::BufReader;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging; stderr keeps stdin/stdout free for the user's session
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stagepipe=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    tracing::info!("Starting stagepipe");

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(config::default_config_path);

    let mut config = match &config_path {
        Some(path) => {
            tracing::debug!("Loading config from {:?}", path);
            PipelineConfig::load_or_default(path)
        }
        None => PipelineConfig::default(),
    };
    config.apply_env_overrides()?;
    config.validate()?;

    let running = PipelineBuilder::new(config)
        .spawn(BufReader::new(std::io::stdin()))
        .context("Failed to start pipeline")?;

    let report = running
        .run_to_completion()
        .context("Pipeline did not shut down cleanly")?;

    for stage in report.stages.iter().chain(report.source.iter()) {
        tracing::debug!("Stage '{}' ended: {:?}", stage.name, stage.outcome);
    }
    if report.unflushed > 0 {
        tracing::debug!("{} buffered values were never flushed", report.unflushed);
    }
    tracing::info!("Shutting down after {} processed values", report.processed);

    Ok(())
}
