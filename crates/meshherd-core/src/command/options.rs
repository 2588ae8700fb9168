// ── Dispatch options ──
//
// Per-call overrides for frame header fields, merged field by field over
// the defaults when a group dispatch is built.

use meshherd_api::Direction;
use serde::{Deserialize, Serialize};

/// Caller-supplied overrides for a group dispatch.
///
/// Every field left as `None` falls back to the default for that field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_endpoint: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_bits: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_code: Option<u16>,
    /// Explicit sequence number; the shared generator supplies one otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_sequence_number: Option<u8>,
}

impl CommandOptions {
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn source_endpoint(mut self, endpoint: u8) -> Self {
        self.source_endpoint = Some(endpoint);
        self
    }

    pub fn reserved_bits(mut self, bits: u8) -> Self {
        self.reserved_bits = Some(bits);
        self
    }

    pub fn manufacturer_code(mut self, code: u16) -> Self {
        self.manufacturer_code = Some(code);
        self
    }

    pub fn transaction_sequence_number(mut self, tsn: u8) -> Self {
        self.transaction_sequence_number = Some(tsn);
        self
    }

    /// Merge over the defaults, field by field.
    pub(crate) fn resolve(self, default_source_endpoint: Option<u8>) -> ResolvedOptions {
        ResolvedOptions {
            direction: self.direction.unwrap_or_default(),
            source_endpoint: self.source_endpoint.or(default_source_endpoint),
            reserved_bits: self.reserved_bits.unwrap_or(0),
            manufacturer_code: self.manufacturer_code,
            transaction_sequence_number: self.transaction_sequence_number,
        }
    }
}

/// Options after defaults are applied; this is what the dispatch summary shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResolvedOptions {
    pub direction: Direction,
    pub source_endpoint: Option<u8>,
    pub reserved_bits: u8,
    pub manufacturer_code: Option<u16>,
    pub transaction_sequence_number: Option<u8>,
}
