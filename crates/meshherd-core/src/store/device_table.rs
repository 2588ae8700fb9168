// ── Device table ──
//
// Concurrent registry of known devices, seeded from the device records
// in the entry store. Acts as the `DeviceDirectory` groups resolve
// their members against.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use meshherd_api::{
    Adapter, Direction, Frame, FrameType, GROUPS_CLUSTER_ID, Payload, TransactionSequence,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{Device, DeviceDirectory, Endpoint, IeeeAddr, Record};

/// `genGroups` command that removes a group from an endpoint's table.
const REMOVE_GROUP_COMMAND_ID: u8 = 0x03;

/// Device-record fields the table understands. Everything else in the
/// record is ignored here and preserved by the store.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceFields {
    ieee_addr: String,
    nwk_addr: u16,
    #[serde(default)]
    manuf_name: Option<String>,
    #[serde(default)]
    model_id: Option<String>,
    #[serde(default)]
    ep_list: Vec<u8>,
    #[serde(default)]
    endpoints: BTreeMap<String, EndpointFields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointFields {
    #[serde(default)]
    prof_id: Option<u16>,
    #[serde(default)]
    dev_id: Option<u16>,
    #[serde(default)]
    in_cluster_list: Vec<u16>,
    #[serde(default)]
    out_cluster_list: Vec<u16>,
}

fn device_from_record(record: &Record) -> Result<Device, CoreError> {
    let fields: DeviceFields = serde_json::from_value(Value::Object(record.fields.clone()))
        .map_err(|e| CoreError::invalid(format!("record {} is not a valid device: {e}", record.id)))?;
    let ieee_addr = IeeeAddr::parse(&fields.ieee_addr)?;

    let mut endpoints: BTreeMap<u8, Endpoint> = BTreeMap::new();
    for (key, ep) in fields.endpoints {
        let Ok(id) = key.parse::<u8>() else {
            warn!(record = record.id, endpoint = %key, "ignoring endpoint with non-numeric id");
            continue;
        };
        endpoints.insert(
            id,
            Endpoint {
                profile_id: ep.prof_id,
                device_id: ep.dev_id,
                input_clusters: ep.in_cluster_list,
                output_clusters: ep.out_cluster_list,
                ..Endpoint::new(ieee_addr.clone(), id)
            },
        );
    }
    for id in fields.ep_list {
        endpoints
            .entry(id)
            .or_insert_with(|| Endpoint::new(ieee_addr.clone(), id));
    }

    Ok(Device {
        ieee_addr,
        network_address: fields.nwk_addr,
        kind: record.kind,
        manufacturer_name: fields.manuf_name,
        model_id: fields.model_id,
        endpoints: endpoints.into_values().map(Arc::new).collect(),
    })
}

pub struct DeviceTable {
    devices: DashMap<IeeeAddr, Arc<Device>>,
    adapter: Arc<dyn Adapter>,
    sequence: Arc<TransactionSequence>,
}

impl DeviceTable {
    pub fn new(adapter: Arc<dyn Adapter>, sequence: Arc<TransactionSequence>) -> Self {
        Self {
            devices: DashMap::new(),
            adapter,
            sequence,
        }
    }

    /// Build a table from persisted device records.
    ///
    /// Records that do not describe a device are skipped with a warning.
    pub fn from_records(
        records: &[Record],
        adapter: Arc<dyn Adapter>,
        sequence: Arc<TransactionSequence>,
    ) -> Self {
        let table = Self::new(adapter, sequence);
        for record in records.iter().filter(|r| r.kind.is_device()) {
            match device_from_record(record) {
                Ok(device) => {
                    table.insert(device);
                }
                Err(e) => warn!(record = record.id, error = %e, "skipping device record"),
            }
        }
        debug!(devices = table.len(), "device table loaded");
        table
    }

    /// Insert or replace a device. Returns `true` if the address was new.
    pub fn insert(&self, device: Device) -> bool {
        self.devices
            .insert(device.ieee_addr.clone(), Arc::new(device))
            .is_none()
    }

    /// Forget a device. Its endpoints stop resolving immediately.
    pub fn remove(&self, ieee_addr: &IeeeAddr) -> Option<Arc<Device>> {
        self.devices.remove(ieee_addr).map(|(_, device)| device)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Snapshot of every device, ordered by address.
    pub fn all(&self) -> Vec<Arc<Device>> {
        let mut devices: Vec<_> = self.devices.iter().map(|e| Arc::clone(e.value())).collect();
        devices.sort_by(|a, b| a.ieee_addr.cmp(&b.ieee_addr));
        devices
    }
}

#[async_trait]
impl DeviceDirectory for DeviceTable {
    fn resolve(&self, ieee_addr: &IeeeAddr) -> Option<Arc<Device>> {
        self.devices.get(ieee_addr).map(|e| Arc::clone(e.value()))
    }

    async fn leave_group(&self, endpoint: &Endpoint, group_address: u16) -> Result<(), CoreError> {
        let device = self
            .resolve(&endpoint.device_ieee_addr)
            .ok_or_else(|| CoreError::not_found("Device", &endpoint.device_ieee_addr))?;

        let mut payload = Map::new();
        payload.insert("groupid".into(), Value::from(group_address));
        let frame = Frame::create(
            FrameType::Specific,
            Direction::ClientToServer,
            true,
            None,
            self.sequence.next(),
            REMOVE_GROUP_COMMAND_ID,
            GROUPS_CLUSTER_ID,
            Payload::Command(payload),
            0,
        );

        debug!(
            device = %device.ieee_addr,
            endpoint = endpoint.id,
            group = group_address,
            "sending genGroups.remove"
        );
        self.adapter
            .send_frame_to_endpoint(
                device.ieee_addr.as_str(),
                device.network_address,
                endpoint.id,
                &frame,
            )
            .await
            .map_err(|source| CoreError::Dispatch {
                summary: format!(
                    "Remove group {group_address} from {}",
                    endpoint.reference()
                ),
                source,
            })
    }
}
