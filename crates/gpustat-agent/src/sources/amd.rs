use async_trait::async_trait;
use gpustat_common::types::{DeviceRecord, MemoryUsage, Reading, Vendor};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::{GpuSource, invoke};
use crate::error::TelemetryError;
use crate::runner::CommandRunner;

const METRICS_ARGS: &[&str] = &["--showtemp", "--showuse", "--showpower", "--json"];
const MEMORY_ARGS: &[&str] = &["--showmeminfo", "vram", "--json"];

// Accepted key names, most preferred first. Newer ROCm releases renamed some of them.
const TEMPERATURE_KEYS: &[&str] = &[
    "Temperature (Sensor edge) (C)",
    "Temperature (Sensor junction) (C)",
];
const UTILIZATION_KEYS: &[&str] = &["GPU use (%)"];
const POWER_KEYS: &[&str] = &[
    "Average Graphics Package Power (W)",
    "Current Socket Graphics Package Power (W)",
];
const MEMORY_USED_KEYS: &[&str] = &["VRAM Total Used Memory (B)"];
const MEMORY_TOTAL_KEYS: &[&str] = &["VRAM Total Memory (B)"];

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// JSON object keyed by card, e.g. `{"card0": {"GPU use (%)": "12"}}`
pub type CardTable = Map<String, Value>;

/// The two documents rocm-smi has to be asked for separately
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RocmSmiOutput {
    /// Temperature, utilization and power
    pub metrics: CardTable,
    /// VRAM usage
    pub memory: CardTable,
}

impl RocmSmiOutput {
    /// Decode both documents; anything other than a JSON object is rejected
    pub fn from_slices(metrics: &[u8], memory: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            metrics: serde_json::from_slice(metrics)?,
            memory: serde_json::from_slice(memory)?,
        })
    }
}

/// AMD source backed by `rocm-smi --json`
#[derive(Debug, Clone)]
pub struct RocmSmi {
    program: String,
}

impl RocmSmi {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl GpuSource for RocmSmi {
    type Raw = RocmSmiOutput;

    fn vendor(&self) -> Vendor {
        Vendor::Amd
    }

    #[instrument(skip_all, fields(program = %self.program))]
    async fn fetch_raw(&self, runner: &dyn CommandRunner) -> Result<RocmSmiOutput, TelemetryError> {
        let metrics = invoke(runner, &self.program, METRICS_ARGS).await?;
        let memory = invoke(runner, &self.program, MEMORY_ARGS).await?;

        RocmSmiOutput::from_slices(&metrics, &memory).map_err(|e| {
            TelemetryError::source_unavailable(
                self.program.as_str(),
                format!("unreadable JSON output: {}", e),
            )
        })
    }

    fn parse(&self, raw: &RocmSmiOutput) -> Vec<DeviceRecord> {
        correlate(raw)
    }
}

/// Join the metrics and memory documents by card key
///
/// Cards keep their order of first appearance: every card of the metrics document, then
/// cards only the memory document knows about. A card missing from one document is still
/// reported with the fields the other one provides.
pub fn correlate(output: &RocmSmiOutput) -> Vec<DeviceRecord> {
    let from_metrics = output.metrics.keys().filter(|key| is_card(key));
    let memory_only = output
        .memory
        .keys()
        .filter(|key| is_card(key) && !output.metrics.contains_key(key.as_str()));

    from_metrics
        .chain(memory_only)
        .map(|card| {
            build_record(
                card,
                card_fields(&output.metrics, card),
                card_fields(&output.memory, card),
            )
        })
        .collect()
}

/// rocm-smi also emits non-device blocks such as `system`
fn is_card(key: &str) -> bool {
    key.starts_with("card")
}

fn card_fields<'a>(table: &'a CardTable, card: &str) -> Option<&'a Map<String, Value>> {
    table.get(card).and_then(Value::as_object)
}

fn build_record(
    card: &str,
    metrics: Option<&Map<String, Value>>,
    memory: Option<&Map<String, Value>>,
) -> DeviceRecord {
    if metrics.is_none() {
        debug!(card, "card missing from metrics output");
    }
    if memory.is_none() {
        debug!(card, "card missing from memory output");
    }

    let used = lookup(memory, MEMORY_USED_KEYS);
    let total = lookup(memory, MEMORY_TOTAL_KEYS);
    let memory = match (used, total) {
        (None, None) => None,
        (used, total) => Some(MemoryUsage {
            used_gib: used
                .unwrap_or(Reading::Unavailable)
                .scaled_down(BYTES_PER_GIB),
            total_gib: total
                .unwrap_or(Reading::Unavailable)
                .scaled_down(BYTES_PER_GIB),
        }),
    };

    DeviceRecord {
        id: card.to_string(),
        temperature_c: lookup(metrics, TEMPERATURE_KEYS).unwrap_or(Reading::Unavailable),
        utilization_percent: lookup(metrics, UTILIZATION_KEYS).unwrap_or(Reading::Unavailable),
        memory,
        power_watts: lookup(metrics, POWER_KEYS),
    }
}

/// Read the first present key; `None` when the card has none of them
fn lookup(fields: Option<&Map<String, Value>>, keys: &[&str]) -> Option<Reading> {
    let fields = fields?;
    keys.iter()
        .find_map(|key| fields.get(*key))
        .map(reading_from_value)
}

fn reading_from_value(value: &Value) -> Reading {
    match value {
        Value::String(text) => Reading::parse(text),
        Value::Number(number) => Reading::parse(&number.to_string()),
        _ => Reading::Unavailable,
    }
}
