//! Agent configuration.
//!
//! Values come from an optional TOML file, overridden by `GPUSTAT_*` environment variables.
//! Durations accept both numeric values (seconds) and duration strings with units.

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use fundu::{DurationParser, TimeUnit};
use gpustat_common::types::DeviceOrder;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

use crate::sources::ToolPaths;

/// Agent configuration loaded from a config file and environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port for the telemetry HTTP endpoint
    /// Default: 8998
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level for the gpustat crates, e.g. "debug" behaves like
    /// "warn,gpustat_agent=debug,gpustat_common=debug"
    /// Default: info
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Hostname override (auto-detected if not provided)
    pub hostname: Option<String>,

    /// Upper bound on a single vendor tool invocation
    /// Default: 10 seconds
    #[serde(
        default = "default_command_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub command_timeout: Duration,

    /// Device ordering within a snapshot ("source" or "id")
    #[serde(default)]
    pub device_order: DeviceOrder,

    /// Path or name of the NVIDIA diagnostic tool
    #[serde(default = "default_nvidia_smi")]
    pub nvidia_smi: String,

    /// Path or name of the AMD diagnostic tool
    #[serde(default = "default_rocm_smi")]
    pub rocm_smi: String,
}

fn default_port() -> u16 {
    8998
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_nvidia_smi() -> String {
    "nvidia-smi".to_string()
}

fn default_rocm_smi() -> String {
    "rocm-smi".to_string()
}

impl Config {
    /// Load configuration, merging `file` (if given) under the environment
    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new();
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::raw().filter_map(|k| {
                // Map environment variable names to struct field names
                match k.as_str() {
                    "GPUSTAT_PORT" => Some("port".into()),
                    "GPUSTAT_LOG_LEVEL" => Some("log_level".into()),
                    "GPUSTAT_HOSTNAME" => Some("hostname".into()),
                    "GPUSTAT_COMMAND_TIMEOUT" => Some("command_timeout".into()),
                    "GPUSTAT_DEVICE_ORDER" => Some("device_order".into()),
                    "GPUSTAT_NVIDIA_SMI" => Some("nvidia_smi".into()),
                    "GPUSTAT_ROCM_SMI" => Some("rocm_smi".into()),
                    _ => None,
                }
            }))
            .extract()
    }

    /// Get the hostname, using configured value or auto-detecting
    pub fn get_hostname(&self) -> String {
        self.hostname.clone().unwrap_or_else(|| {
            hostname::get()
                .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
                .to_string_lossy()
                .to_string()
        })
    }

    pub fn tools(&self) -> ToolPaths {
        ToolPaths {
            nvidia_smi: self.nvidia_smi.clone(),
            rocm_smi: self.rocm_smi.clone(),
        }
    }
}

/// Duration parser configured to handle various time units with seconds as default
///
/// Supports seconds (default unit), milliseconds and minutes. Fractions, exponents and
/// infinity are rejected. Multiple units are summed ("1m 30s" = 90 seconds).
const DURATION_PARSER: DurationParser<'static> = DurationParser::builder()
    .time_units(&[TimeUnit::Second, TimeUnit::MilliSecond, TimeUnit::Minute])
    .parse_multiple(None)
    .allow_time_unit_delimiter()
    .disable_infinity()
    .disable_fraction()
    .disable_exponent()
    .default_unit(TimeUnit::Second)
    .build();

/// Deserialize a duration from an unsigned/signed integer (seconds) or a duration string
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Visitor;

    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a duration string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            DURATION_PARSER.parse(value)
                .map_err(|e| {
                    serde::de::Error::custom(format!(
                        "Invalid duration format '{}': {}. Examples: '5' (5 seconds), '3500ms', '30s', '2m'",
                        value, e
                    ))
                })?
                .try_into()
                .map_err(|e| serde::de::Error::custom(format!("Duration conversion error: {}", e)))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Duration::from_secs(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if value < 0 {
                return Err(serde::de::Error::custom("Duration cannot be negative"));
            }
            Ok(Duration::from_secs(value as u64))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}
