use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{DeviceRecord, Vendor};

/// How devices are ordered inside a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceOrder {
    /// Whatever order the vendor tool enumerated devices in; not stable across vendors
    #[default]
    Source,
    /// Sorted by device id, comparing trailing digits numerically (`card2` < `card10`)
    Id,
}

/// One point-in-time telemetry result for every device on the host
///
/// Built fresh for each request and never mutated after assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub vendor: Vendor,
    pub devices: Vec<DeviceRecord>,
    pub host: String,
}

impl Snapshot {
    pub fn assemble(
        vendor: Vendor,
        mut devices: Vec<DeviceRecord>,
        host: impl Into<String>,
        order: DeviceOrder,
    ) -> Self {
        if order == DeviceOrder::Id {
            devices.sort_by(|a, b| compare_ids(&a.id, &b.id));
        }

        Self {
            vendor,
            devices,
            host: host.into(),
        }
    }
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    trailing_number(a)
        .cmp(&trailing_number(b))
        .then_with(|| a.cmp(b))
}

fn trailing_number(id: &str) -> Option<u64> {
    let prefix_len = id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    id[prefix_len..].parse().ok()
}

// =============================================================================
// Wire format
// =============================================================================

/// Serialized form of a [`Snapshot`] served to HTTP consumers
///
/// Field names are kept stable for existing pollers of the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    #[serde(rename = "type")]
    pub vendor: Vendor,
    #[serde(rename = "GPUs")]
    pub gpus: Vec<GpuEntry>,
    pub hostname: String,
}

/// Serialized form of a [`DeviceRecord`], with units rendered into each value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuEntry {
    pub gpu_id: String,
    pub temperature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<String>,
    pub gpu_util: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
}

impl From<&DeviceRecord> for GpuEntry {
    fn from(device: &DeviceRecord) -> Self {
        Self {
            gpu_id: device.id.clone(),
            temperature: device.temperature_c.with_unit("°C"),
            memory_usage: device.memory.as_ref().map(|memory| memory.display()),
            gpu_util: device.utilization_percent.with_unit("%"),
            power: device.power_watts.as_ref().map(|power| power.with_unit("W")),
        }
    }
}

impl From<&Snapshot> for SnapshotPayload {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            vendor: snapshot.vendor,
            gpus: snapshot.devices.iter().map(GpuEntry::from).collect(),
            hostname: snapshot.host.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MemoryUsage, Reading};

    fn device(id: &str) -> DeviceRecord {
        DeviceRecord {
            id: id.to_string(),
            temperature_c: Reading::parse("45"),
            utilization_percent: Reading::parse("10"),
            memory: None,
            power_watts: None,
        }
    }

    fn ids(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.devices.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_source_order_is_preserved() {
        let devices = vec![device("card1"), device("card10"), device("card0")];
        let snapshot = Snapshot::assemble(Vendor::Amd, devices, "node", DeviceOrder::Source);
        assert_eq!(ids(&snapshot), ["card1", "card10", "card0"]);
        assert_eq!(snapshot.host, "node");
    }

    #[test]
    fn test_id_order_compares_trailing_numbers() {
        let devices = vec![device("card10"), device("card2"), device("card0")];
        let snapshot = Snapshot::assemble(Vendor::Amd, devices, "node", DeviceOrder::Id);
        assert_eq!(ids(&snapshot), ["card0", "card2", "card10"]);
    }

    #[test]
    fn test_id_order_plain_indices() {
        let devices = vec![device("3"), device("11"), device("1")];
        let snapshot = Snapshot::assemble(Vendor::Nvidia, devices, "node", DeviceOrder::Id);
        assert_eq!(ids(&snapshot), ["1", "3", "11"]);
    }

    #[test]
    fn test_payload_field_names() {
        let mut gpu = device("0");
        gpu.memory = Some(MemoryUsage {
            used_gib: Reading::parse("2048").scaled_down(1024.0),
            total_gib: Reading::parse("8192").scaled_down(1024.0),
        });
        gpu.power_watts = Some(Reading::parse("75.5"));
        let snapshot = Snapshot::assemble(Vendor::Nvidia, vec![gpu], "node-1", DeviceOrder::Source);

        let json = serde_json::to_value(SnapshotPayload::from(&snapshot)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "nvidia",
                "GPUs": [{
                    "gpu_id": "0",
                    "temperature": "45°C",
                    "memory_usage": "2.00 / 8.00 GiB",
                    "gpu_util": "10%",
                    "power": "75.5W"
                }],
                "hostname": "node-1"
            })
        );
    }

    #[test]
    fn test_payload_omits_absent_fields() {
        let snapshot = Snapshot::assemble(Vendor::Amd, vec![device("card0")], "h", DeviceOrder::Source);
        let json = serde_json::to_value(SnapshotPayload::from(&snapshot)).unwrap();
        let gpu = &json["GPUs"][0];
        assert!(gpu.get("memory_usage").is_none());
        assert!(gpu.get("power").is_none());
        assert_eq!(json["type"], "amd");
    }

    #[test]
    fn test_payload_renders_unavailable_memory_side() {
        let mut gpu = device("0");
        gpu.memory = Some(MemoryUsage {
            used_gib: Reading::Unavailable,
            total_gib: Reading::parse("8192").scaled_down(1024.0),
        });
        assert_eq!(GpuEntry::from(&gpu).memory_usage.as_deref(), Some("N/A / 8.00 GiB"));
    }

    #[test]
    fn test_empty_snapshot_serializes_empty_list() {
        let snapshot = Snapshot::assemble(Vendor::Nvidia, Vec::new(), "h", DeviceOrder::Source);
        let json = serde_json::to_value(SnapshotPayload::from(&snapshot)).unwrap();
        assert_eq!(json["GPUs"], serde_json::json!([]));
    }
}
