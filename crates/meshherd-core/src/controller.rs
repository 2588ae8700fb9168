// ── Controller facade ──
//
// Wires the entry store, device table and group coordinator together
// around one adapter. Cheap to clone; every clone shares the same
// store, caches and sequence counter.

use std::sync::Arc;

use meshherd_api::{Adapter, TransactionSequence};
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::context::EntityContext;
use crate::coordinator::GroupCoordinator;
use crate::error::CoreError;
use crate::model::{DeviceDirectory, EntityKind};
use crate::store::{DeviceTable, EntryStore};

#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    devices: Arc<DeviceTable>,
    groups: GroupCoordinator,
}

impl Controller {
    /// Open the database and load devices and groups.
    ///
    /// When a backup path is configured and the database exists, it is
    /// copied there first.
    pub async fn start(config: ControllerConfig, adapter: Arc<dyn Adapter>) -> Result<Self, CoreError> {
        if let Some(backup) = &config.backup_path {
            if tokio::fs::try_exists(&config.database_path)
                .await
                .map_err(CoreError::io(&config.database_path))?
            {
                tokio::fs::copy(&config.database_path, backup)
                    .await
                    .map_err(CoreError::io(backup))?;
                debug!(backup = %backup.display(), "database backed up");
            }
        }

        let store = Arc::new(EntryStore::open(&config.database_path).await?);
        let sequence = Arc::new(TransactionSequence::new());
        let devices = Arc::new(DeviceTable::from_records(
            &store.entries(&EntityKind::DEVICES),
            Arc::clone(&adapter),
            Arc::clone(&sequence),
        ));

        let directory: Arc<dyn DeviceDirectory> = devices.clone();
        let ctx = EntityContext::new(store, adapter, directory)
            .with_sequence(sequence)
            .with_default_source_endpoint(config.default_source_endpoint);
        let groups = GroupCoordinator::new(ctx);
        groups.load_groups();

        info!(
            path = %config.database_path.display(),
            devices = devices.len(),
            "controller started"
        );

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                devices,
                groups,
            }),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn groups(&self) -> &GroupCoordinator {
        &self.inner.groups
    }

    pub fn devices(&self) -> &Arc<DeviceTable> {
        &self.inner.devices
    }

    pub fn store(&self) -> &Arc<EntryStore> {
        self.inner.groups.context().store()
    }

    pub fn context(&self) -> &EntityContext {
        self.inner.groups.context()
    }
}
