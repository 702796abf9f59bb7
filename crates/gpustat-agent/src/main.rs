use clap::Parser;
use gpustat_agent::app::App;
use gpustat_agent::cli::Args;
use gpustat_agent::config::Config;
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    // Setup logging
    gpustat_common::logging::setup_logging(&config.log_level, args.tracing.into());

    let app = App::new(config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        },
        port = app.config().port,
        "starting gpustat-agent"
    );

    app.run().await
}
