use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Output format for log events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Build the filter used when `RUST_LOG` is not set
///
/// Dependencies are held at `warn`; the gpustat crates log at `level`.
pub fn default_filter(level: &str) -> String {
    format!("warn,gpustat_agent={level},gpustat_common={level}")
}

/// Configure and initialize logging for the application
pub fn setup_logging(level: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let builder = FmtSubscriber::builder()
        .with_target(true)
        .with_env_filter(filter);

    let result = match format {
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(
            builder.json().flatten_event(true).finish(),
        ),
    };

    if let Err(e) = result {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }
}
