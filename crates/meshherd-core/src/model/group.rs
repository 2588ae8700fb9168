// ── Group entity ──
//
// A multicast group: one persisted record, a live member set resolved
// through the device directory, and free-form application metadata.
// Instances are handed out as `Arc<Group>` by the coordinator and are
// the only copy of that group in the process.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::address::EndpointRef;
use super::device::Endpoint;
use super::record::{EntityKind, Record};
use crate::context::EntityContext;
use crate::error::CoreError;

/// The group-specific part of a persisted record.
#[derive(Debug, Deserialize)]
struct GroupFields {
    #[serde(rename = "groupID")]
    group_id: u16,
    /// Parsed entry by entry so one bad member cannot sink the group.
    #[serde(default)]
    members: Vec<Value>,
    #[serde(default)]
    meta: Map<String, Value>,
}

pub struct Group {
    pub(crate) ctx: EntityContext,
    store_id: u64,
    group_address: u16,
    members: Mutex<BTreeMap<EndpointRef, Arc<Endpoint>>>,
    meta: Mutex<Map<String, Value>>,
}

impl Group {
    /// A fresh group with no members and empty metadata.
    pub(crate) fn new(ctx: EntityContext, store_id: u64, group_address: u16) -> Self {
        Self {
            ctx,
            store_id,
            group_address,
            members: Mutex::new(BTreeMap::new()),
            meta: Mutex::new(Map::new()),
        }
    }

    /// Materialize a group from its record, resolving every member.
    ///
    /// Member entries that are malformed or no longer resolve to a live
    /// endpoint are dropped.
    pub(crate) fn from_record(ctx: EntityContext, record: &Record) -> Result<Self, CoreError> {
        if record.kind != EntityKind::Group {
            return Err(CoreError::invalid(format!(
                "record {} is a {}, not a Group",
                record.id, record.kind
            )));
        }
        let fields: GroupFields = serde_json::from_value(Value::Object(record.fields.clone()))
            .map_err(|e| CoreError::invalid(format!("record {} is not a valid group: {e}", record.id)))?;
        if fields.group_id == 0 {
            return Err(CoreError::invalid(format!(
                "record {} has group address 0",
                record.id
            )));
        }

        let mut members = BTreeMap::new();
        for entry in fields.members {
            let member = match serde_json::from_value::<EndpointRef>(entry) {
                Ok(member) => member,
                Err(e) => {
                    warn!(group = fields.group_id, error = %e, "dropping malformed group member");
                    continue;
                }
            };
            match ctx.devices().resolve_endpoint(&member) {
                Some(endpoint) => {
                    members.insert(member, endpoint);
                }
                None => warn!(
                    group = fields.group_id,
                    %member,
                    "dropping group member that no longer resolves"
                ),
            }
        }

        Ok(Self {
            ctx,
            store_id: record.id,
            group_address: fields.group_id,
            members: Mutex::new(members),
            meta: Mutex::new(fields.meta),
        })
    }

    /// The persisted form of this group.
    pub fn to_record(&self) -> Record {
        let members: Vec<Value> = self
            .members()
            .iter()
            .map(|endpoint| {
                serde_json::json!({
                    "deviceIeeeAddr": endpoint.device_ieee_addr,
                    "endpointID": endpoint.id,
                })
            })
            .collect();
        Record::new(self.store_id, EntityKind::Group)
            .with_field("groupID", Value::from(self.group_address))
            .with_field("members", Value::Array(members))
            .with_field("meta", Value::Object(self.meta()))
    }

    pub fn store_id(&self) -> u64 {
        self.store_id
    }

    pub fn group_address(&self) -> u16 {
        self.group_address
    }

    /// Current members whose device is still known to the directory.
    pub fn members(&self) -> Vec<Arc<Endpoint>> {
        let devices = self.ctx.devices();
        self.members
            .lock()
            .values()
            .filter(|endpoint| devices.resolve(&endpoint.device_ieee_addr).is_some())
            .cloned()
            .collect()
    }

    pub fn has_member(&self, member: &EndpointRef) -> bool {
        self.members().iter().any(|e| e.reference() == *member)
    }

    pub fn meta(&self) -> Map<String, Value> {
        self.meta.lock().clone()
    }

    /// Set one metadata key and persist the group.
    pub async fn set_meta(&self, key: impl Into<String>, value: Value) -> Result<(), CoreError> {
        self.meta.lock().insert(key.into(), value);
        self.save().await
    }

    /// Add an endpoint to the member set and persist the group.
    ///
    /// Adding an existing member is a no-op apart from the rewrite.
    pub async fn add_member(&self, endpoint: Arc<Endpoint>) -> Result<(), CoreError> {
        let member = endpoint.reference();
        debug!(group = self.group_address, %member, "adding group member");
        self.members.lock().insert(member, endpoint);
        self.save().await
    }

    /// Drop an endpoint from the member set and persist the group.
    pub async fn remove_member(&self, member: &EndpointRef) -> Result<(), CoreError> {
        let removed = self.members.lock().remove(member).is_some();
        debug!(group = self.group_address, %member, removed, "removing group member");
        self.save().await
    }

    /// Write the full record back to the store.
    pub async fn save(&self) -> Result<(), CoreError> {
        self.ctx.store().update(self.to_record()).await
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("store_id", &self.store_id)
            .field("group_address", &self.group_address)
            .field("members", &self.members.lock().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
