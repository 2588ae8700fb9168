// ── Core identity types ──
//
// IeeeAddr and EndpointRef are how the persisted world names devices
// and their endpoints. Both are plain values; resolving them to live
// objects goes through a `DeviceDirectory`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ── IeeeAddr ────────────────────────────────────────────────────────

/// 64-bit extended device address, normalized to `0x` + 16 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IeeeAddr(String);

impl IeeeAddr {
    /// Parse from any common format: `0x00124b…`, bare hex, or
    /// colon/dash separated octets.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let raw = raw.as_ref().trim();
        let digits: String = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw)
            .chars()
            .filter(|c| *c != ':' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::invalid(format!(
                "'{raw}' is not a 64-bit IEEE address"
            )));
        }
        Ok(Self(format!("0x{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IeeeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IeeeAddr {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IeeeAddr {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<IeeeAddr> for String {
    fn from(addr: IeeeAddr) -> Self {
        addr.0
    }
}

// ── EndpointRef ─────────────────────────────────────────────────────

/// Persisted reference to one numbered endpoint on one device.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EndpointRef {
    #[serde(rename = "deviceIeeeAddr")]
    pub device_ieee_addr: IeeeAddr,
    #[serde(rename = "endpointID")]
    pub endpoint_id: u8,
}

impl EndpointRef {
    pub fn new(device_ieee_addr: IeeeAddr, endpoint_id: u8) -> Self {
        Self {
            device_ieee_addr,
            endpoint_id,
        }
    }
}

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_ieee_addr, self.endpoint_id)
    }
}
