//! Persistence and entity coordination for the meshherd controller.
//!
//! This crate is the record-of-truth for which devices and groups exist
//! on a mesh network, and the layer group commands are dispatched through:
//!
//! - **[`EntryStore`]**: Flat-file, one-JSON-record-per-line store. The
//!   index is updated synchronously; every mutation rewrites the file via
//!   temp file, fsync and rename so a crash never leaves it half-written.
//!
//! - **[`EntityContext`]**: The store, adapter, device directory, sequence
//!   generator and cluster catalog an entity works with, passed explicitly
//!   instead of living in globals.
//!
//! - **[`GroupCoordinator`]**: Loads groups once and hands out a single
//!   shared [`Group`] per group address. Creation, membership changes and
//!   removal all round-trip through the store.
//!
//! - **Dispatch** ([`Group::write`], [`Group::read`], [`Group::command`]):
//!   Builds a frame from symbolic cluster/attribute/command names and sends
//!   it to the whole group through the [`meshherd_api::Adapter`].
//!
//! - **[`Controller`]**: Convenience facade that opens a database, seeds a
//!   [`DeviceTable`] from its device records and loads the groups.

pub mod command;
pub mod config;
pub mod context;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::CommandOptions;
pub use config::ControllerConfig;
pub use context::EntityContext;
pub use controller::Controller;
pub use coordinator::{DetachFailure, GroupCoordinator, GroupRemoval, GroupSummary};
pub use error::CoreError;
pub use store::{DeviceTable, EntryStore};

pub use model::{
    Device, DeviceDirectory, Endpoint, EndpointRef, EntityKind, Group, IeeeAddr, Record,
};
