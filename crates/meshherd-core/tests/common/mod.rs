#![allow(clippy::unwrap_used, dead_code)]
// Shared fixtures for the meshherd-core integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use meshherd_api::{Adapter, Error, Frame, TransactionSequence};
use meshherd_core::{
    Device, DeviceTable, EntityContext, EntityKind, EntryStore, GroupCoordinator, IeeeAddr,
};

// ── Recording adapter ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GroupSend {
    pub group_address: u16,
    pub frame: Frame,
    pub source_endpoint: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct EndpointSend {
    pub ieee_addr: String,
    pub network_address: u16,
    pub endpoint: u8,
    pub frame: Frame,
}

/// Adapter that records every frame and fails on demand.
#[derive(Debug, Default)]
pub struct RecordingAdapter {
    pub group_sends: Mutex<Vec<GroupSend>>,
    pub endpoint_sends: Mutex<Vec<EndpointSend>>,
    /// Group sends fail with `SendFailed` while set.
    pub fail_group_sends: Mutex<Option<String>>,
    /// Unicast sends to these addresses fail with `DeliveryFailed`.
    pub unreachable: Mutex<Vec<String>>,
}

#[async_trait]
impl Adapter for RecordingAdapter {
    async fn send_frame_to_group(
        &self,
        group_address: u16,
        frame: &Frame,
        source_endpoint: Option<u8>,
    ) -> Result<(), Error> {
        if let Some(message) = self.fail_group_sends.lock().clone() {
            return Err(Error::SendFailed { message });
        }
        self.group_sends.lock().push(GroupSend {
            group_address,
            frame: frame.clone(),
            source_endpoint,
        });
        Ok(())
    }

    async fn send_frame_to_endpoint(
        &self,
        ieee_addr: &str,
        network_address: u16,
        endpoint: u8,
        frame: &Frame,
    ) -> Result<(), Error> {
        if self.unreachable.lock().iter().any(|a| a == ieee_addr) {
            return Err(Error::DeliveryFailed { status: 0xe9 });
        }
        self.endpoint_sends.lock().push(EndpointSend {
            ieee_addr: ieee_addr.to_owned(),
            network_address,
            endpoint,
            frame: frame.clone(),
        });
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn ieee(n: u64) -> IeeeAddr {
    IeeeAddr::parse(format!("0x{n:016x}")).unwrap()
}

/// A router with endpoints 1 and 2.
pub fn light(n: u64) -> Device {
    Device::new(ieee(n), 0x1000 + u16::try_from(n).unwrap(), EntityKind::Router)
        .with_endpoint(1)
        .with_endpoint(2)
}

pub struct Harness {
    pub dir: TempDir,
    pub adapter: Arc<RecordingAdapter>,
    pub devices: Arc<DeviceTable>,
    pub sequence: Arc<TransactionSequence>,
}

impl Harness {
    /// A fresh temp directory with `lights` devices registered.
    pub fn new(lights: u64) -> Self {
        let adapter = Arc::new(RecordingAdapter::default());
        let sequence = Arc::new(TransactionSequence::new());
        let devices = Arc::new(DeviceTable::new(adapter.clone(), sequence.clone()));
        for n in 1..=lights {
            devices.insert(light(n));
        }
        Self {
            dir: TempDir::new().unwrap(),
            adapter,
            devices,
            sequence,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("database.db")
    }

    pub fn write_db(&self, contents: &str) {
        std::fs::write(self.db_path(), contents).unwrap();
    }

    pub fn read_db(&self) -> String {
        std::fs::read_to_string(self.db_path()).unwrap()
    }

    /// Open the store and build a coordinator with groups loaded.
    pub async fn coordinator(&self) -> GroupCoordinator {
        let coordinator = self.unloaded_coordinator(&self.db_path()).await;
        coordinator.load_groups();
        coordinator
    }

    pub async fn unloaded_coordinator(&self, path: &Path) -> GroupCoordinator {
        let store = Arc::new(EntryStore::open(path).await.unwrap());
        let ctx = EntityContext::new(store, self.adapter.clone(), self.devices.clone())
            .with_sequence(self.sequence.clone());
        GroupCoordinator::new(ctx)
    }
}
