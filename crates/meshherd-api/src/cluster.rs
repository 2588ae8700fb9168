// ── Cluster / attribute / command definitions ──
//
// Symbolic lookup tables that turn names like `genOnOff` / `onOff`
// into the numeric identifiers a frame carries. Only the definitions
// the controller core needs live here; the wire encoder is elsewhere.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::error::Error;

// ── Key ─────────────────────────────────────────────────────────────

/// Name-or-number reference to a cluster, attribute, or command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Id(u16),
    Name(String),
}

impl Key {
    /// Parse a map key: decimal or `0x`-prefixed hex becomes `Id`, anything else `Name`.
    pub fn parse(raw: &str) -> Self {
        let parsed = raw
            .strip_prefix("0x")
            .map_or_else(|| raw.parse::<u16>(), |hex| u16::from_str_radix(hex, 16));
        match parsed {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(raw.to_owned()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<u16> for Key {
    fn from(id: u16) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

// ── DataType ────────────────────────────────────────────────────────

/// Attribute data types, named after their on-air type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DataType {
    NoData,
    Boolean,
    Bitmap8,
    Bitmap16,
    Uint8,
    Uint16,
    Uint32,
    Int8,
    Int16,
    Enum8,
    Enum16,
    CharStr,
}

impl DataType {
    /// The numeric type code carried in attribute records.
    pub fn code(self) -> u8 {
        match self {
            Self::NoData => 0x00,
            Self::Boolean => 0x10,
            Self::Bitmap8 => 0x18,
            Self::Bitmap16 => 0x19,
            Self::Uint8 => 0x20,
            Self::Uint16 => 0x21,
            Self::Uint32 => 0x23,
            Self::Int8 => 0x28,
            Self::Int16 => 0x29,
            Self::Enum8 => 0x30,
            Self::Enum16 => 0x31,
            Self::CharStr => 0x42,
        }
    }

    /// Reverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x00 => Self::NoData,
            0x10 => Self::Boolean,
            0x18 => Self::Bitmap8,
            0x19 => Self::Bitmap16,
            0x20 => Self::Uint8,
            0x21 => Self::Uint16,
            0x23 => Self::Uint32,
            0x28 => Self::Int8,
            0x29 => Self::Int16,
            0x30 => Self::Enum8,
            0x31 => Self::Enum16,
            0x42 => Self::CharStr,
            _ => return None,
        })
    }
}

// ── Definitions ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: u16,
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: u8,
    pub name: String,
}

/// A cluster: a numbered bundle of attributes and commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: u16,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub commands: Vec<Command>,
}

impl Cluster {
    pub fn new(id: u16, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, id: u16, name: &str, data_type: DataType) -> Self {
        self.attributes.push(Attribute {
            id,
            name: name.to_owned(),
            data_type,
        });
        self
    }

    pub fn with_command(mut self, id: u8, name: &str) -> Self {
        self.commands.push(Command {
            id,
            name: name.to_owned(),
        });
        self
    }

    /// Whether an attribute with this exact name exists.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    pub fn attribute(&self, key: &Key) -> Result<&Attribute, Error> {
        self.attributes
            .iter()
            .find(|a| match key {
                Key::Id(id) => a.id == *id,
                Key::Name(name) => a.name == *name,
            })
            .ok_or_else(|| Error::UnknownAttribute {
                cluster: self.name.clone(),
                attribute: key.to_string(),
            })
    }

    pub fn command(&self, key: &Key) -> Result<&Command, Error> {
        self.commands
            .iter()
            .find(|c| match key {
                Key::Id(id) => u16::from(c.id) == *id,
                Key::Name(name) => c.name == *name,
            })
            .ok_or_else(|| Error::UnknownCommand {
                cluster: self.name.clone(),
                command: key.to_string(),
            })
    }
}

// ── Catalog ─────────────────────────────────────────────────────────

/// Lookup table of every cluster the controller can address.
///
/// Starts with the standard lighting/group clusters; applications
/// register manufacturer-specific clusters on top.
#[derive(Debug, Clone)]
pub struct ClusterCatalog {
    clusters: Vec<Cluster>,
}

impl ClusterCatalog {
    /// An empty catalog with no definitions.
    pub fn empty() -> Self {
        Self {
            clusters: Vec::new(),
        }
    }

    /// Add (or replace, matched by id) a cluster definition.
    pub fn register(&mut self, cluster: Cluster) {
        debug!(id = cluster.id, name = %cluster.name, "registering cluster definition");
        self.clusters.retain(|c| c.id != cluster.id);
        self.clusters.push(cluster);
    }

    pub fn cluster(&self, key: &Key) -> Result<&Cluster, Error> {
        self.clusters
            .iter()
            .find(|c| match key {
                Key::Id(id) => c.id == *id,
                Key::Name(name) => c.name == *name,
            })
            .ok_or_else(|| Error::UnknownCluster {
                key: key.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

impl Default for ClusterCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        for cluster in builtin_clusters() {
            catalog.clusters.push(cluster);
        }
        catalog
    }
}

/// Cluster id of `genGroups`, used for protocol-level membership changes.
pub const GROUPS_CLUSTER_ID: u16 = 0x0004;

fn builtin_clusters() -> Vec<Cluster> {
    vec![
        Cluster::new(0x0000, "genBasic")
            .with_attribute(0x0000, "zclVersion", DataType::Uint8)
            .with_attribute(0x0001, "appVersion", DataType::Uint8)
            .with_attribute(0x0004, "manufacturerName", DataType::CharStr)
            .with_attribute(0x0005, "modelId", DataType::CharStr)
            .with_attribute(0x0007, "powerSource", DataType::Enum8)
            .with_attribute(0x0010, "locationDesc", DataType::CharStr)
            .with_command(0x00, "resetFactDefault"),
        Cluster::new(0x0003, "genIdentify")
            .with_attribute(0x0000, "identifyTime", DataType::Uint16)
            .with_command(0x00, "identify")
            .with_command(0x01, "identifyQuery"),
        Cluster::new(GROUPS_CLUSTER_ID, "genGroups")
            .with_attribute(0x0000, "nameSupport", DataType::Bitmap8)
            .with_command(0x00, "add")
            .with_command(0x01, "view")
            .with_command(0x02, "getMembership")
            .with_command(0x03, "remove")
            .with_command(0x04, "removeAll")
            .with_command(0x05, "addIfIdentifying"),
        Cluster::new(0x0005, "genScenes")
            .with_attribute(0x0000, "count", DataType::Uint8)
            .with_attribute(0x0001, "currentScene", DataType::Uint8)
            .with_attribute(0x0002, "currentGroup", DataType::Uint16)
            .with_attribute(0x0003, "sceneValid", DataType::Boolean)
            .with_attribute(0x0004, "nameSupport", DataType::Bitmap8)
            .with_command(0x00, "add")
            .with_command(0x01, "view")
            .with_command(0x02, "remove")
            .with_command(0x03, "removeAll")
            .with_command(0x04, "store")
            .with_command(0x05, "recall"),
        Cluster::new(0x0006, "genOnOff")
            .with_attribute(0x0000, "onOff", DataType::Boolean)
            .with_attribute(0x4000, "globalSceneCtrl", DataType::Boolean)
            .with_attribute(0x4001, "onTime", DataType::Uint16)
            .with_attribute(0x4002, "offWaitTime", DataType::Uint16)
            .with_attribute(0x4003, "startUpOnOff", DataType::Enum8)
            .with_command(0x00, "off")
            .with_command(0x01, "on")
            .with_command(0x02, "toggle")
            .with_command(0x40, "offWithEffect")
            .with_command(0x41, "onWithRecallGlobalScene")
            .with_command(0x42, "onWithTimedOff"),
        Cluster::new(0x0008, "genLevelCtrl")
            .with_attribute(0x0000, "currentLevel", DataType::Uint8)
            .with_attribute(0x0001, "remainingTime", DataType::Uint16)
            .with_attribute(0x0010, "onOffTransitionTime", DataType::Uint16)
            .with_attribute(0x0011, "onLevel", DataType::Uint8)
            .with_attribute(0x4000, "startUpCurrentLevel", DataType::Uint8)
            .with_command(0x00, "moveToLevel")
            .with_command(0x01, "move")
            .with_command(0x02, "step")
            .with_command(0x03, "stop")
            .with_command(0x04, "moveToLevelWithOnOff")
            .with_command(0x05, "moveWithOnOff")
            .with_command(0x06, "stepWithOnOff")
            .with_command(0x07, "stopWithOnOff"),
        Cluster::new(0x0300, "lightingColorCtrl")
            .with_attribute(0x0000, "currentHue", DataType::Uint8)
            .with_attribute(0x0001, "currentSaturation", DataType::Uint8)
            .with_attribute(0x0003, "currentX", DataType::Uint16)
            .with_attribute(0x0004, "currentY", DataType::Uint16)
            .with_attribute(0x0007, "colorTemperature", DataType::Uint16)
            .with_attribute(0x0008, "colorMode", DataType::Enum8)
            .with_command(0x00, "moveToHue")
            .with_command(0x03, "moveToSaturation")
            .with_command(0x06, "moveToHueAndSaturation")
            .with_command(0x07, "moveToColor")
            .with_command(0x0a, "moveToColorTemp"),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn key_parse_numeric_and_hex() {
        assert_eq!(Key::parse("16"), Key::Id(16));
        assert_eq!(Key::parse("0x4001"), Key::Id(0x4001));
        assert_eq!(Key::parse("onOff"), Key::Name("onOff".into()));
        assert_eq!(Key::parse("0xzz"), Key::Name("0xzz".into()));
    }

    #[test]
    fn lookup_cluster_by_name_and_id() {
        let catalog = ClusterCatalog::default();
        assert_eq!(catalog.cluster(&"genOnOff".into()).unwrap().id, 0x0006);
        assert_eq!(catalog.cluster(&Key::Id(0x0300)).unwrap().name, "lightingColorCtrl");
    }

    #[test]
    fn unknown_cluster_is_reported() {
        let catalog = ClusterCatalog::default();
        let err = catalog.cluster(&"genNope".into()).unwrap_err();
        assert!(matches!(err, Error::UnknownCluster { ref key } if key == "genNope"));
    }

    #[test]
    fn attribute_and_command_resolution() {
        let catalog = ClusterCatalog::default();
        let level = catalog.cluster(&"genLevelCtrl".into()).unwrap();

        let attr = level.attribute(&"onLevel".into()).unwrap();
        assert_eq!((attr.id, attr.data_type), (0x0011, DataType::Uint8));

        let cmd = level.command(&Key::Id(4)).unwrap();
        assert_eq!(cmd.name, "moveToLevelWithOnOff");

        assert!(matches!(
            level.command(&"blink".into()),
            Err(Error::UnknownCommand { .. })
        ));
        assert!(matches!(
            level.attribute(&Key::Id(0x7777)),
            Err(Error::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn register_replaces_by_id() {
        let mut catalog = ClusterCatalog::default();
        let before = catalog.len();
        catalog.register(Cluster::new(0x0006, "genOnOffCustom"));
        assert_eq!(catalog.len(), before);
        assert_eq!(catalog.cluster(&Key::Id(6)).unwrap().name, "genOnOffCustom");

        catalog.register(Cluster::new(0xfc00, "manuSpecificHue"));
        assert_eq!(catalog.len(), before + 1);
    }

    #[test]
    fn data_type_codes_round_trip() {
        for dt in [DataType::Boolean, DataType::Uint16, DataType::CharStr] {
            assert_eq!(DataType::from_code(dt.code()), Some(dt));
        }
        assert_eq!(DataType::from_code(0xff), None);
        assert_eq!(DataType::Uint16.to_string(), "uint16");
    }
}
