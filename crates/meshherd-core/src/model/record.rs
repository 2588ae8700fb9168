// ── Persisted record ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Kind tag carried in every record's `type` field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[non_exhaustive]
pub enum EntityKind {
    Coordinator,
    Router,
    EndDevice,
    Unknown,
    GreenPower,
    Group,
}

impl EntityKind {
    /// Every kind that describes a physical device.
    pub const DEVICES: [EntityKind; 5] = [
        Self::Coordinator,
        Self::Router,
        Self::EndDevice,
        Self::Unknown,
        Self::GreenPower,
    ];

    pub fn is_device(self) -> bool {
        !matches!(self, Self::Group)
    }
}

/// One line of the database file.
///
/// Only `id` and `type` mean anything to the store. Every other field is
/// kept in `fields` and written back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: u64, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let line = r#"{"id":3,"type":"Router","ieeeAddr":"0x00124b0001abcdef","nested":{"a":[1,2,{"b":null}]}}"#;
        let record: Record = serde_json::from_str(line).unwrap();
        assert_eq!(record.kind, EntityKind::Router);
        assert_eq!(record.get("nested"), Some(&json!({"a": [1, 2, {"b": null}]})));
        assert_eq!(serde_json::to_string(&record).unwrap(), line);
    }

    #[test]
    fn kind_parses_from_its_display_form() {
        for kind in EntityKind::DEVICES {
            assert_eq!(kind.to_string().parse::<EntityKind>().unwrap(), kind);
            assert!(kind.is_device());
        }
        assert!(!EntityKind::Group.is_device());
    }
}
