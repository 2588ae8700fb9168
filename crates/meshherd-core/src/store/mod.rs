// ── Persistence and registries ──

mod device_table;
mod entry_store;

pub use device_table::DeviceTable;
pub use entry_store::EntryStore;
