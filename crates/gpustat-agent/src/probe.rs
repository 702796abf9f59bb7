use gpustat_common::types::Vendor;
use tracing::{debug, instrument};

use crate::error::TelemetryError;
use crate::runner::CommandRunner;
use crate::sources::ToolPaths;

/// Determine which accelerator ecosystem is present by trial-running each vendor's tool
///
/// NVIDIA is always checked first, so a host with both tools reports NVIDIA. A tool counts
/// as present when it launches and exits successfully without arguments.
#[instrument(skip_all)]
pub async fn detect_vendor(
    runner: &dyn CommandRunner,
    tools: &ToolPaths,
) -> Result<Vendor, TelemetryError> {
    let candidates = [
        (Vendor::Nvidia, tools.nvidia_smi.as_str()),
        (Vendor::Amd, tools.rocm_smi.as_str()),
    ];

    for (vendor, program) in candidates {
        match runner.run(program, &[]).await {
            Ok(output) if output.success() => {
                debug!(%vendor, program, "vendor detected");
                return Ok(vendor);
            }
            Ok(output) => {
                debug!(program, reason = %output.failure_reason(), "probe failed");
            }
            Err(e) => {
                debug!(program, error = %e, "probe failed");
            }
        }
    }

    Err(TelemetryError::NoVendorDetected)
}
