// ── Device / endpoint reference model ──
//
// The controller core never owns devices; it consults them. These types
// carry just enough to resolve group members and address frames.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::address::{EndpointRef, IeeeAddr};
use super::record::EntityKind;
use crate::error::CoreError;

/// One application endpoint of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: u8,
    pub device_ieee_addr: IeeeAddr,
    pub profile_id: Option<u16>,
    pub device_id: Option<u16>,
    pub input_clusters: Vec<u16>,
    pub output_clusters: Vec<u16>,
}

impl Endpoint {
    pub fn new(device_ieee_addr: IeeeAddr, id: u8) -> Self {
        Self {
            id,
            device_ieee_addr,
            profile_id: None,
            device_id: None,
            input_clusters: Vec::new(),
            output_clusters: Vec::new(),
        }
    }

    /// The persisted form used in group member lists.
    pub fn reference(&self) -> EndpointRef {
        EndpointRef::new(self.device_ieee_addr.clone(), self.id)
    }

    pub fn supports_input_cluster(&self, cluster_id: u16) -> bool {
        self.input_clusters.contains(&cluster_id)
    }
}

/// A joined device as seen by the controller core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub ieee_addr: IeeeAddr,
    pub network_address: u16,
    pub kind: EntityKind,
    pub manufacturer_name: Option<String>,
    pub model_id: Option<String>,
    pub endpoints: Vec<Arc<Endpoint>>,
}

impl Device {
    pub fn new(ieee_addr: IeeeAddr, network_address: u16, kind: EntityKind) -> Self {
        Self {
            ieee_addr,
            network_address,
            kind,
            manufacturer_name: None,
            model_id: None,
            endpoints: Vec::new(),
        }
    }

    /// Add an endpoint with the given id, replacing any existing one.
    pub fn with_endpoint(mut self, id: u8) -> Self {
        self.endpoints.retain(|e| e.id != id);
        self.endpoints
            .push(Arc::new(Endpoint::new(self.ieee_addr.clone(), id)));
        self
    }

    pub fn endpoint(&self, id: u8) -> Option<Arc<Endpoint>> {
        self.endpoints.iter().find(|e| e.id == id).cloned()
    }
}

/// Lookup and protocol-level membership control for devices.
///
/// Implemented by whatever owns the device registry. Resolution is
/// synchronous; leaving a group is a radio round-trip.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Find a live device by its IEEE address.
    fn resolve(&self, ieee_addr: &IeeeAddr) -> Option<Arc<Device>>;

    /// Find a live endpoint for a persisted member reference.
    fn resolve_endpoint(&self, member: &EndpointRef) -> Option<Arc<Endpoint>> {
        self.resolve(&member.device_ieee_addr)?
            .endpoint(member.endpoint_id)
    }

    /// Ask the endpoint's device to drop its membership of a group.
    async fn leave_group(&self, endpoint: &Endpoint, group_address: u16) -> Result<(), CoreError>;
}
