use clap::Parser;
use gpustat_common::logging::LogFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log formatter to use
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,

    /// TOML file with configuration; environment variables take precedence
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Listen on this port instead of the configured one
    #[arg(long, short)]
    pub port: Option<u16>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// Use pretty formatter (default in debug mode)
    Pretty,
    /// Use JSON formatter (default in release mode)
    Json,
}

impl From<TracingFormat> for LogFormat {
    fn from(format: TracingFormat) -> Self {
        match format {
            TracingFormat::Pretty => LogFormat::Pretty,
            TracingFormat::Json => LogFormat::Json,
        }
    }
}

#[cfg(debug_assertions)]
const DEFAULT_TRACING_FORMAT: TracingFormat = TracingFormat::Pretty;
#[cfg(not(debug_assertions))]
const DEFAULT_TRACING_FORMAT: TracingFormat = TracingFormat::Json;

fn default_tracing_format() -> TracingFormat {
    DEFAULT_TRACING_FORMAT
}
