use async_trait::async_trait;
use gpustat_common::types::{DeviceRecord, MemoryUsage, Reading, Vendor};
use tracing::{debug, instrument};

use super::{GpuSource, invoke};
use crate::error::TelemetryError;
use crate::runner::CommandRunner;

/// Columns requested from nvidia-smi, in output order
const QUERY: &str =
    "--query-gpu=index,temperature.gpu,memory.used,memory.total,utilization.gpu,power.draw";
const FORMAT: &str = "--format=csv,noheader,nounits";
const FIELD_COUNT: usize = 6;

const MIB_PER_GIB: f64 = 1024.0;

/// NVIDIA source backed by `nvidia-smi --query-gpu`
#[derive(Debug, Clone)]
pub struct NvidiaSmi {
    program: String,
}

impl NvidiaSmi {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl GpuSource for NvidiaSmi {
    type Raw = String;

    fn vendor(&self) -> Vendor {
        Vendor::Nvidia
    }

    #[instrument(skip_all, fields(program = %self.program))]
    async fn fetch_raw(&self, runner: &dyn CommandRunner) -> Result<String, TelemetryError> {
        let stdout = invoke(runner, &self.program, &[QUERY, FORMAT]).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn parse(&self, raw: &String) -> Vec<DeviceRecord> {
        parse_query_output(raw)
    }
}

/// Parse `csv,noheader,nounits` output, one device per line
///
/// Lines with fewer than the expected number of columns are skipped. Columns that are not
/// numbers (nvidia-smi prints `[N/A]` or `[Not Supported]` for some boards) become
/// `Reading::Unavailable`.
pub fn parse_query_output(output: &str) -> Vec<DeviceRecord> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<DeviceRecord> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < FIELD_COUNT {
        debug!(line, columns = fields.len(), "skipping short nvidia-smi line");
        return None;
    }

    let memory = MemoryUsage {
        used_gib: Reading::parse(fields[2]).scaled_down(MIB_PER_GIB),
        total_gib: Reading::parse(fields[3]).scaled_down(MIB_PER_GIB),
    };

    Some(DeviceRecord {
        id: fields[0].to_string(),
        temperature_c: Reading::parse(fields[1]),
        utilization_percent: Reading::parse(fields[4]),
        memory: Some(memory),
        power_watts: Some(Reading::parse(fields[5])),
    })
}
