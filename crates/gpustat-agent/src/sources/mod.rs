//! Vendor source adapters and their output parsers.
//!
//! Each supported vendor implements [`GpuSource`]: `fetch_raw` is the only impure step
//! (it runs the vendor tool), `parse` is a pure transform of the captured output.

mod amd;
mod nvidia;

pub use amd::{RocmSmi, RocmSmiOutput};
pub use nvidia::NvidiaSmi;

use async_trait::async_trait;
use gpustat_common::types::{DeviceRecord, Vendor};
use tracing::{debug, warn};

use crate::error::TelemetryError;
use crate::runner::CommandRunner;

/// Binaries used to query each vendor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub nvidia_smi: String,
    pub rocm_smi: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            nvidia_smi: "nvidia-smi".to_string(),
            rocm_smi: "rocm-smi".to_string(),
        }
    }
}

#[async_trait]
pub trait GpuSource: Send + Sync {
    /// Output captured from the vendor tool, before any field interpretation
    type Raw: Send;

    fn vendor(&self) -> Vendor;

    /// Run the vendor tool and capture its output
    async fn fetch_raw(&self, runner: &dyn CommandRunner) -> Result<Self::Raw, TelemetryError>;

    /// Turn captured output into device records; malformed fields degrade, never fail
    fn parse(&self, raw: &Self::Raw) -> Vec<DeviceRecord>;
}

/// Fetch and parse in one step
pub async fn collect<S: GpuSource>(
    source: &S,
    runner: &dyn CommandRunner,
) -> Result<Vec<DeviceRecord>, TelemetryError> {
    let raw = source.fetch_raw(runner).await?;
    let devices = source.parse(&raw);
    debug!(vendor = %source.vendor(), devices = devices.len(), "parsed vendor output");
    Ok(devices)
}

/// Run one tool invocation, mapping any failure to `SourceUnavailable`
async fn invoke(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<Vec<u8>, TelemetryError> {
    let output = runner.run(program, args).await.map_err(|e| {
        warn!(program, error = %e, "failed to run vendor tool");
        TelemetryError::source_unavailable(program, e.to_string())
    })?;

    if !output.success() {
        let reason = output.failure_reason();
        warn!(program, reason = %reason, "vendor tool failed");
        return Err(TelemetryError::source_unavailable(program, reason));
    }

    Ok(output.stdout)
}
