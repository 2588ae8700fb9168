// ── Outbound adapter contract ──
//
// The radio adapter owns transmission, retries, and delivery reporting.
// The controller core only hands it fully-built frames.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Error;
use crate::frame::Frame;

/// Transmits frames over the mesh.
///
/// Implementations decide their own retry policy; a returned error is
/// final from the caller's point of view.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Multicast a frame to every member of a group.
    async fn send_frame_to_group(
        &self,
        group_address: u16,
        frame: &Frame,
        source_endpoint: Option<u8>,
    ) -> Result<(), Error>;

    /// Unicast a frame to one endpoint of one device.
    async fn send_frame_to_endpoint(
        &self,
        ieee_addr: &str,
        network_address: u16,
        endpoint: u8,
        frame: &Frame,
    ) -> Result<(), Error>;
}

/// Adapter for tooling that runs without a radio attached.
///
/// Every send fails with [`Error::NotConnected`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAdapter;

#[async_trait]
impl Adapter for OfflineAdapter {
    async fn send_frame_to_group(
        &self,
        group_address: u16,
        frame: &Frame,
        _source_endpoint: Option<u8>,
    ) -> Result<(), Error> {
        debug!(group_address, cluster = frame.cluster_id, "dropping group frame (offline)");
        Err(Error::NotConnected)
    }

    async fn send_frame_to_endpoint(
        &self,
        ieee_addr: &str,
        _network_address: u16,
        endpoint: u8,
        frame: &Frame,
    ) -> Result<(), Error> {
        debug!(ieee_addr, endpoint, cluster = frame.cluster_id, "dropping unicast frame (offline)");
        Err(Error::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Direction, FrameType, Payload};

    #[tokio::test]
    async fn offline_adapter_rejects_everything() {
        let frame = Frame::create(
            FrameType::Specific,
            Direction::ClientToServer,
            true,
            None,
            1,
            0x02,
            0x0006,
            Payload::Command(serde_json::Map::new()),
            0,
        );
        let adapter = OfflineAdapter;
        assert!(matches!(
            adapter.send_frame_to_group(5, &frame, None).await,
            Err(Error::NotConnected)
        ));
        assert!(matches!(
            adapter
                .send_frame_to_endpoint("0x00124b0000000001", 0x1234, 1, &frame)
                .await,
            Err(Error::NotConnected)
        ));
    }
}
