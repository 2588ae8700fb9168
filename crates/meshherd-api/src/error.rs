use thiserror::Error;

/// Top-level error type for the `meshherd-api` crate.
///
/// Covers the failure modes of every collaborator contract:
/// cluster/attribute/command resolution and outbound frame delivery.
/// `meshherd-core` maps these into its own error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Definition lookup ───────────────────────────────────────────
    /// No cluster matches the given name or id.
    #[error("Unknown cluster '{key}'")]
    UnknownCluster { key: String },

    /// The cluster has no attribute with the given name or id.
    #[error("Unknown attribute '{attribute}' in cluster '{cluster}'")]
    UnknownAttribute { cluster: String, attribute: String },

    /// The cluster has no command with the given name or id.
    #[error("Unknown command '{command}' in cluster '{cluster}'")]
    UnknownCommand { cluster: String, command: String },

    // ── Delivery ────────────────────────────────────────────────────
    /// No radio adapter is attached (offline tooling, shutdown).
    #[error("Adapter not connected")]
    NotConnected,

    /// The adapter could not hand the frame to the radio.
    #[error("Send failed: {message}")]
    SendFailed { message: String },

    /// The radio accepted the frame but reported a delivery failure.
    #[error("Delivery failed with status {status:#04x}")]
    DeliveryFailed { status: u8 },

    /// No confirmation arrived in time.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl Error {
    /// Returns `true` if this is a transient delivery error worth retrying.
    ///
    /// The core never retries on its own; adapters and callers use this
    /// to decide.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::DeliveryFailed { .. })
    }

    /// Returns `true` if this error came from definition lookup rather than delivery.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::UnknownCluster { .. } | Self::UnknownAttribute { .. } | Self::UnknownCommand { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(Error::Timeout { timeout_ms: 500 }.is_transient());
        assert!(Error::DeliveryFailed { status: 0xe9 }.is_transient());
        assert!(!Error::NotConnected.is_transient());
        assert!(
            !Error::UnknownCluster {
                key: "nope".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn delivery_status_is_hex_formatted() {
        let err = Error::DeliveryFailed { status: 0xe9 };
        assert_eq!(err.to_string(), "Delivery failed with status 0xe9");
    }
}
