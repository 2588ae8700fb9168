// ── Domain model ──
//
// Persisted records plus the in-memory entities built from them.

pub mod address;
pub mod device;
pub mod group;
pub mod record;

pub use address::{EndpointRef, IeeeAddr};
pub use device::{Device, DeviceDirectory, Endpoint};
pub use group::Group;
pub use record::{EntityKind, Record};
