// ── Group coordinator ──
//
// Owns the one in-memory copy of every group. Groups are loaded from the
// store once, cached by group address, and handed out as shared `Arc`s so
// two lookups of the same address always return the same object.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::EntityContext;
use crate::error::CoreError;
use crate::model::{EndpointRef, EntityKind, Group};

const ENTITY: &str = "Group";

#[derive(Default)]
struct Cache {
    /// `None` until `load_groups` has run.
    groups: Option<BTreeMap<u16, Arc<Group>>>,
    /// Addresses with a `create` in flight.
    pending: BTreeSet<u16>,
}

/// A member that could not be told to leave during network removal.
#[derive(Debug)]
pub struct DetachFailure {
    pub member: EndpointRef,
    pub error: CoreError,
}

/// Outcome of [`GroupCoordinator::remove_from_network`].
#[derive(Debug)]
pub struct GroupRemoval {
    pub group_address: u16,
    pub detached: Vec<EndpointRef>,
    pub failures: Vec<DetachFailure>,
}

impl GroupRemoval {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Serializable summary of a group, for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub id: u64,
    pub group_address: u16,
    pub members: Vec<EndpointRef>,
    pub meta: serde_json::Map<String, serde_json::Value>,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            id: group.store_id(),
            group_address: group.group_address(),
            members: group.members().iter().map(|e| e.reference()).collect(),
            meta: group.meta(),
        }
    }
}

pub struct GroupCoordinator {
    ctx: EntityContext,
    cache: Mutex<Cache>,
}

impl GroupCoordinator {
    pub fn new(ctx: EntityContext) -> Self {
        Self {
            ctx,
            cache: Mutex::new(Cache::default()),
        }
    }

    pub fn context(&self) -> &EntityContext {
        &self.ctx
    }

    /// Materialize every persisted group. Calling this again is a no-op.
    ///
    /// Group records that cannot be read are skipped with a warning.
    pub fn load_groups(&self) {
        let mut cache = self.cache.lock();
        if cache.groups.is_some() {
            return;
        }
        let mut groups = BTreeMap::new();
        for record in self.ctx.store().entries(&[EntityKind::Group]) {
            match Group::from_record(self.ctx.clone(), &record) {
                Ok(group) => {
                    let address = group.group_address();
                    if groups.insert(address, Arc::new(group)).is_some() {
                        warn!(record = record.id, group = address, "duplicate group address, later record wins");
                    }
                }
                Err(e) => warn!(record = record.id, error = %e, "skipping group record"),
            }
        }
        info!(groups = groups.len(), "groups loaded");
        cache.groups = Some(groups);
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.lock().groups.is_some()
    }

    /// The live group with this address, if any.
    pub fn by_group_address(&self, group_address: u16) -> Result<Option<Arc<Group>>, CoreError> {
        let cache = self.cache.lock();
        let groups = cache.groups.as_ref().ok_or(CoreError::GroupsNotLoaded)?;
        Ok(groups.get(&group_address).cloned())
    }

    /// Every live group, ordered by address.
    pub fn all(&self) -> Result<Vec<Arc<Group>>, CoreError> {
        let cache = self.cache.lock();
        let groups = cache.groups.as_ref().ok_or(CoreError::GroupsNotLoaded)?;
        Ok(groups.values().cloned().collect())
    }

    /// Create and persist a new, empty group.
    ///
    /// The group is only visible through the cache once its record has
    /// been written. An address is taken if a live group, an in-flight
    /// create, or any stored Group record (loadable or not) holds it.
    pub async fn create(&self, group_address: i64) -> Result<Arc<Group>, CoreError> {
        let address = u16::try_from(group_address)
            .ok()
            .filter(|a| *a >= 1)
            .ok_or_else(|| {
                CoreError::invalid(format!(
                    "group address must be between 1 and 65535, got {group_address}"
                ))
            })?;

        {
            let mut cache = self.cache.lock();
            let groups = cache.groups.as_ref().ok_or(CoreError::GroupsNotLoaded)?;
            if groups.contains_key(&address)
                || cache.pending.contains(&address)
                || self.stored_record_holds(address)
            {
                return Err(CoreError::already_exists(ENTITY, address));
            }
            cache.pending.insert(address);
        }

        let id = self.ctx.store().new_id();
        let group = Arc::new(Group::new(self.ctx.clone(), id, address));
        let persisted = self.ctx.store().insert(group.to_record()).await;

        let mut cache = self.cache.lock();
        cache.pending.remove(&address);
        persisted?;
        if let Some(groups) = cache.groups.as_mut() {
            groups.insert(address, Arc::clone(&group));
        }
        debug!(group = address, id, "group created");
        Ok(group)
    }

    /// Tell every member to leave the group, then delete it.
    ///
    /// Per-member failures are logged and reported but never stop the
    /// record from being removed.
    pub async fn remove_from_network(&self, group: &Arc<Group>) -> Result<GroupRemoval, CoreError> {
        let address = group.group_address();
        let mut report = GroupRemoval {
            group_address: address,
            detached: Vec::new(),
            failures: Vec::new(),
        };

        for endpoint in group.members() {
            let member = endpoint.reference();
            match self.ctx.devices().leave_group(&endpoint, address).await {
                Ok(()) => report.detached.push(member),
                Err(error) => {
                    warn!(group = address, %member, %error, "member did not leave group");
                    report.failures.push(DetachFailure { member, error });
                }
            }
        }

        self.remove_from_database(group).await?;
        Ok(report)
    }

    /// Drop the group from the cache and delete its record.
    ///
    /// The cache entry is gone even when the rewrite fails.
    pub async fn remove_from_database(&self, group: &Group) -> Result<(), CoreError> {
        if let Some(groups) = self.cache.lock().groups.as_mut() {
            groups.remove(&group.group_address());
        }
        let store = self.ctx.store();
        if store.has(group.store_id()) {
            store.remove(group.store_id()).await?;
        }
        debug!(group = group.group_address(), "group removed");
        Ok(())
    }

    fn stored_record_holds(&self, address: u16) -> bool {
        self.ctx
            .store()
            .entries(&[EntityKind::Group])
            .iter()
            .any(|record| record.get("groupID").and_then(serde_json::Value::as_u64) == Some(u64::from(address)))
    }
}
