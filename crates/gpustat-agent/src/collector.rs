use gpustat_common::types::{DeviceOrder, Snapshot, Vendor};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::TelemetryError;
use crate::probe::detect_vendor;
use crate::runner::CommandRunner;
use crate::sources::{self, NvidiaSmi, RocmSmi, ToolPaths};

/// Builds telemetry snapshots on demand
///
/// Holds no per-request state: every call probes, fetches and parses from scratch, so
/// concurrent requests need no coordination.
#[derive(Clone)]
pub struct Collector {
    runner: Arc<dyn CommandRunner>,
    tools: ToolPaths,
    order: DeviceOrder,
}

impl Collector {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: ToolPaths, order: DeviceOrder) -> Self {
        Self {
            runner,
            tools,
            order,
        }
    }

    pub async fn detect_vendor(&self) -> Result<Vendor, TelemetryError> {
        detect_vendor(self.runner.as_ref(), &self.tools).await
    }

    /// Take a snapshot of every device on this host, reported under `host`
    #[instrument(skip(self))]
    pub async fn snapshot(&self, host: &str) -> Result<Snapshot, TelemetryError> {
        let vendor = self.detect_vendor().await?;
        let runner = self.runner.as_ref();

        let devices = match vendor {
            Vendor::Nvidia => {
                let source = NvidiaSmi::new(&self.tools.nvidia_smi);
                sources::collect(&source, runner).await?
            }
            Vendor::Amd => {
                let source = RocmSmi::new(&self.tools.rocm_smi);
                sources::collect(&source, runner).await?
            }
        };

        info!(%vendor, devices = devices.len(), "snapshot collected");
        Ok(Snapshot::assemble(vendor, devices, host, self.order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;

    const NVIDIA_QUERY: &str = "nvidia-smi --query-gpu=index,temperature.gpu,memory.used,memory.total,utilization.gpu,power.draw --format=csv,noheader,nounits";

    fn collector(runner: FakeRunner, order: DeviceOrder) -> Collector {
        Collector::new(Arc::new(runner), ToolPaths::default(), order)
    }

    #[tokio::test]
    async fn test_nvidia_snapshot() {
        let runner = FakeRunner::new()
            .with("nvidia-smi", 0, "")
            .with(NVIDIA_QUERY, 0, "1, 40, 0, 8192, 0, 20\n0, 45, 2048, 8192, 10, 75.5\n");

        let snapshot = collector(runner, DeviceOrder::Source)
            .snapshot("node-1")
            .await
            .unwrap();
        assert_eq!(snapshot.vendor, Vendor::Nvidia);
        assert_eq!(snapshot.host, "node-1");
        let ids: Vec<&str> = snapshot.devices.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["1", "0"]);
    }

    #[tokio::test]
    async fn test_id_order_is_applied() {
        let runner = FakeRunner::new()
            .with("nvidia-smi", 0, "")
            .with(NVIDIA_QUERY, 0, "1, 40, 0, 8192, 0, 20\n0, 45, 2048, 8192, 10, 75.5\n");

        let snapshot = collector(runner, DeviceOrder::Id)
            .snapshot("node-1")
            .await
            .unwrap();
        let ids: Vec<&str> = snapshot.devices.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["0", "1"]);
    }

    #[tokio::test]
    async fn test_amd_snapshot() {
        let runner = FakeRunner::new()
            .with("rocm-smi", 0, "")
            .with(
                "rocm-smi --showtemp --showuse --showpower --json",
                0,
                r#"{"card0": {"Temperature (Sensor edge) (C)": "50.0", "GPU use (%)": "3"}}"#,
            )
            .with("rocm-smi --showmeminfo vram --json", 0, "{}");

        let snapshot = collector(runner, DeviceOrder::Source)
            .snapshot("node-2")
            .await
            .unwrap();
        assert_eq!(snapshot.vendor, Vendor::Amd);
        assert_eq!(snapshot.devices.len(), 1);
        assert_eq!(snapshot.devices[0].memory, None);
    }

    #[tokio::test]
    async fn test_no_vendor_detected() {
        let result = collector(FakeRunner::new(), DeviceOrder::Source)
            .snapshot("node")
            .await;
        assert_eq!(result, Err(TelemetryError::NoVendorDetected));
    }

    #[tokio::test]
    async fn test_source_failure_after_detection() {
        let runner = FakeRunner::new()
            .with("nvidia-smi", 0, "")
            .with(NVIDIA_QUERY, 15, "");

        let result = collector(runner, DeviceOrder::Source).snapshot("node").await;
        assert!(matches!(result, Err(TelemetryError::SourceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_hung_source_is_unavailable() {
        let runner = FakeRunner::new()
            .with("nvidia-smi", 0, "")
            .hanging(NVIDIA_QUERY);

        let result = collector(runner, DeviceOrder::Source).snapshot("node").await;
        match result {
            Err(TelemetryError::SourceUnavailable { tool, reason }) => {
                assert_eq!(tool, "nvidia-smi");
                assert!(reason.contains("did not exit"));
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_every_request_probes_again() {
        let runner = Arc::new(
            FakeRunner::new()
                .with("nvidia-smi", 0, "")
                .with(NVIDIA_QUERY, 0, ""),
        );
        let collector = Collector::new(runner.clone(), ToolPaths::default(), DeviceOrder::Source);

        collector.snapshot("node").await.unwrap();
        collector.snapshot("node").await.unwrap();

        let probes = runner.calls().iter().filter(|c| *c == "nvidia-smi").count();
        assert_eq!(probes, 2);
    }
}
