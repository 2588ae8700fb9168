// ── Controller configuration ──

use std::path::PathBuf;

/// Everything the controller needs to open its database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// The newline-delimited JSON database file.
    pub database_path: PathBuf,
    /// If set, the database is copied here before it is opened.
    pub backup_path: Option<PathBuf>,
    /// Source endpoint for group frames when a call does not name one.
    pub default_source_endpoint: Option<u8>,
}

impl ControllerConfig {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            backup_path: None,
            default_source_endpoint: None,
        }
    }
}
