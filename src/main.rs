use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use lifeboard::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let config = Config::load();
    info!(
        target: "lifeboard",
        "lifeboard starting: RUST_LOG='{}', idle_timeout_ms={}, year={}, allow_list_entries={}, email={:?}",
        rust_log,
        config.idle_timeout_ms,
        config.year,
        config.allowed.len(),
        config.email
    );

    lifeboard::app::run(config).await
}
