//! Collaborator contracts for the meshherd controller core.
//!
//! Nothing in this crate touches disk or keeps entity state. It defines
//! what the core expects from the world around it:
//!
//! - **[`Adapter`]**: async outbound transport for group and unicast frames.
//! - **[`Frame`]**: symbolic cluster frame (header flags, sequence number,
//!   command/cluster ids, typed payload).
//! - **[`ClusterCatalog`]**: name ↔ id resolution for clusters, attributes
//!   and commands.
//! - **[`TransactionSequence`]**: process-wide wrapping sequence counter.

pub mod adapter;
pub mod cluster;
pub mod error;
pub mod frame;
pub mod sequence;

pub use adapter::{Adapter, OfflineAdapter};
pub use cluster::{Attribute, Cluster, ClusterCatalog, Command, DataType, GROUPS_CLUSTER_ID, Key};
pub use error::Error;
pub use frame::{
    Direction, Frame, FrameControl, FrameHeader, FrameType, GlobalCommand, Payload, WriteRecord,
};
pub use sequence::TransactionSequence;
