// ── Core error types ──
//
// Every CRUD contract violation surfaces as a typed variant; callers
// decide whether to retry. Adapter failures arrive wrapped in
// `Dispatch` together with a summary of what was being attempted.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Store / registry contract ────────────────────────────────────
    #[error("{entity} '{identifier}' already exists")]
    AlreadyExists { entity: String, identifier: String },

    #[error("{entity} '{identifier}' does not exist")]
    NotFound { entity: String, identifier: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Groups have not been loaded yet")]
    GroupsNotLoaded,

    // ── Definition lookup ────────────────────────────────────────────
    #[error("Unknown cluster '{key}'")]
    UnknownCluster { key: String },

    #[error("Unknown attribute '{attribute}' in cluster '{cluster}', specify either an existing attribute or a number")]
    UnknownAttribute { cluster: String, attribute: String },

    #[error("Unknown command '{command}' in cluster '{cluster}'")]
    UnknownCommand { cluster: String, command: String },

    // ── Dispatch ─────────────────────────────────────────────────────
    #[error("{summary} failed ({source})")]
    Dispatch {
        summary: String,
        #[source]
        source: meshherd_api::Error,
    },

    // ── Persistence ──────────────────────────────────────────────────
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON on line {line} of '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn already_exists(entity: &str, identifier: impl ToString) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn not_found(entity: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// Returns `true` if the adapter reported a transient delivery failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Dispatch { source, .. } if source.is_transient())
    }
}

// ── Conversion from collaborator errors ──────────────────────────────

impl From<meshherd_api::Error> for CoreError {
    fn from(err: meshherd_api::Error) -> Self {
        match err {
            meshherd_api::Error::UnknownCluster { key } => CoreError::UnknownCluster { key },
            meshherd_api::Error::UnknownAttribute { cluster, attribute } => {
                CoreError::UnknownAttribute { cluster, attribute }
            }
            meshherd_api::Error::UnknownCommand { cluster, command } => {
                CoreError::UnknownCommand { cluster, command }
            }
            other => CoreError::Dispatch {
                summary: "Frame delivery".into(),
                source: other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_errors_map_to_matching_variants() {
        let err: CoreError = meshherd_api::Error::UnknownCommand {
            cluster: "genOnOff".into(),
            command: "blink".into(),
        }
        .into();
        assert!(matches!(err, CoreError::UnknownCommand { ref command, .. } if command == "blink"));
    }

    #[test]
    fn delivery_errors_become_dispatch() {
        let err: CoreError = meshherd_api::Error::Timeout { timeout_ms: 10 }.into();
        assert!(err.is_transient());
        assert_eq!(
            err.to_string(),
            "Frame delivery failed (Request timed out after 10ms)"
        );
    }
}
