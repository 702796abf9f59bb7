pub mod device;
pub mod reading;
pub mod snapshot;
pub mod vendor;

pub use device::{DeviceRecord, MemoryUsage};
pub use reading::Reading;
pub use snapshot::{DeviceOrder, GpuEntry, Snapshot, SnapshotPayload};
pub use vendor::Vendor;
