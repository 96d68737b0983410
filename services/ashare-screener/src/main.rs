//! A-Share Screener - live market screening service.
//!
//! Fetches the full A-share spot snapshot per request, filters it by the
//! caller's criteria, and serves the ranked result set over HTTP.

use anyhow::Result;
use ashare_screener::config::Settings;
use ashare_screener::logging::init_logging;
use ashare_screener::ScreenerService;

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    let settings = Settings::load();

    init_logging(&settings.log_level, &settings.log_format);

    tracing::info!("A-Share Screener v{}", env!("CARGO_PKG_VERSION"));

    let service = ScreenerService::new(settings);

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    service.start().await
}
