use tracing_subscriber::{EnvFilter, fmt};
use waterinfo::{app, config};

/// Main entry point for the web application
///
/// Reads the settings, installs logging and serves the water quality page
/// until the process is stopped.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let settings = config::load_settings();
    app::run(settings).await
}
