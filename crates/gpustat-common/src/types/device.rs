use super::Reading;

/// Video memory usage, normalized to GiB
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryUsage {
    pub used_gib: Reading,
    pub total_gib: Reading,
}

impl MemoryUsage {
    /// Render as `"<used> / <total> GiB"` with two decimals on each side
    pub fn display(&self) -> String {
        format!("{} / {} GiB", self.used_gib.text(), self.total_gib.text())
    }
}

/// One accelerator's telemetry at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    /// Vendor-assigned index (`0`) or card identifier (`card0`)
    pub id: String,
    pub temperature_c: Reading,
    pub utilization_percent: Reading,
    /// `None` when the source did not report memory for this device
    pub memory: Option<MemoryUsage>,
    /// `None` when the source did not report power for this device
    pub power_watts: Option<Reading>,
}
