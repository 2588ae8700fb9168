// ── Symbolic protocol frames ──
//
// A `Frame` is everything the radio adapter needs to put a cluster
// request on air: header flags, sequence number, command and cluster
// ids, and a typed payload. Byte-level encoding belongs to the adapter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cluster::DataType;

/// Global frames address the attribute model (read/write/report);
/// specific frames carry a cluster's own commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameType {
    Global,
    Specific,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    ClientToServer,
    ServerToClient,
}

/// Global command ids used by group dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GlobalCommand {
    Read,
    Write,
}

impl GlobalCommand {
    pub fn id(self) -> u8 {
        match self {
            Self::Read => 0x00,
            Self::Write => 0x02,
        }
    }
}

/// Frame control field, kept symbolic until the adapter encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameControl {
    pub frame_type: FrameType,
    pub manufacturer_specific: bool,
    pub direction: Direction,
    pub disable_default_response: bool,
    /// Upper three bits of the control byte; anything wider is masked off.
    pub reserved_bits: u8,
}

impl FrameControl {
    /// The control byte as it appears on air.
    pub fn bits(&self) -> u8 {
        let mut bits = match self.frame_type {
            FrameType::Global => 0b00,
            FrameType::Specific => 0b01,
        };
        if self.manufacturer_specific {
            bits |= 1 << 2;
        }
        if self.direction == Direction::ServerToClient {
            bits |= 1 << 3;
        }
        if self.disable_default_response {
            bits |= 1 << 4;
        }
        bits | ((self.reserved_bits & 0b111) << 5)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameHeader {
    pub control: FrameControl,
    pub manufacturer_code: Option<u16>,
    pub transaction_sequence_number: u8,
    pub command_id: u8,
}

/// One attribute in a global write request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRecord {
    pub attr_id: u16,
    pub data_type: DataType,
    pub attr_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "records")]
pub enum Payload {
    Read(Vec<u16>),
    Write(Vec<WriteRecord>),
    /// Cluster-specific command parameters, keyed by parameter name.
    Command(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub header: FrameHeader,
    pub cluster_id: u16,
    pub payload: Payload,
}

impl Frame {
    /// Assemble a frame from its parts.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        frame_type: FrameType,
        direction: Direction,
        disable_default_response: bool,
        manufacturer_code: Option<u16>,
        transaction_sequence_number: u8,
        command_id: u8,
        cluster_id: u16,
        payload: Payload,
        reserved_bits: u8,
    ) -> Self {
        Self {
            header: FrameHeader {
                control: FrameControl {
                    frame_type,
                    manufacturer_specific: manufacturer_code.is_some(),
                    direction,
                    disable_default_response,
                    reserved_bits: reserved_bits & 0b111,
                },
                manufacturer_code,
                transaction_sequence_number,
                command_id,
            },
            cluster_id,
            payload,
        }
    }

    pub fn is_global(&self) -> bool {
        self.header.control.frame_type == FrameType::Global
    }
}
