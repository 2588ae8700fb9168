// ── Entity context ──
//
// The set of collaborators every entity talks to: the store it persists
// through, the adapter it sends frames with, and the directory it
// resolves members against. Passed explicitly; several contexts can
// live side by side (one per network, or one per test).

use std::sync::Arc;

use meshherd_api::{Adapter, ClusterCatalog, TransactionSequence};

use crate::model::DeviceDirectory;
use crate::store::EntryStore;

#[derive(Clone)]
pub struct EntityContext {
    store: Arc<EntryStore>,
    adapter: Arc<dyn Adapter>,
    devices: Arc<dyn DeviceDirectory>,
    sequence: Arc<TransactionSequence>,
    catalog: Arc<ClusterCatalog>,
    default_source_endpoint: Option<u8>,
}

impl EntityContext {
    /// Bind a store, adapter and device directory together.
    ///
    /// Starts with a fresh transaction sequence and the built-in cluster
    /// catalog; override either with the `with_*` builders.
    pub fn new(
        store: Arc<EntryStore>,
        adapter: Arc<dyn Adapter>,
        devices: Arc<dyn DeviceDirectory>,
    ) -> Self {
        Self {
            store,
            adapter,
            devices,
            sequence: Arc::new(TransactionSequence::new()),
            catalog: Arc::new(ClusterCatalog::default()),
            default_source_endpoint: None,
        }
    }

    /// Share a sequence generator with other senders on the same network.
    #[must_use]
    pub fn with_sequence(mut self, sequence: Arc<TransactionSequence>) -> Self {
        self.sequence = sequence;
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<ClusterCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Source endpoint used for group frames when the caller names none.
    #[must_use]
    pub fn with_default_source_endpoint(mut self, endpoint: Option<u8>) -> Self {
        self.default_source_endpoint = endpoint;
        self
    }

    pub fn store(&self) -> &Arc<EntryStore> {
        &self.store
    }

    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.adapter
    }

    pub fn devices(&self) -> &Arc<dyn DeviceDirectory> {
        &self.devices
    }

    pub fn sequence(&self) -> &TransactionSequence {
        &self.sequence
    }

    pub fn catalog(&self) -> &ClusterCatalog {
        &self.catalog
    }

    pub fn default_source_endpoint(&self) -> Option<u8> {
        self.default_source_endpoint
    }
}
