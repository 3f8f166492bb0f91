//! datechat-web service entry point.

use anyhow::Result;
use datechat_common::config::Config;
use datechat_common::logging::init_logging_with_exclusions;

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    let config = Config::load_and_validate()?;
    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    tracing::info!("DateChat v{}", env!("CARGO_PKG_VERSION"));

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    datechat_web::start_server(&config).await
}
