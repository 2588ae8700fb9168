//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use meshherd_config::ConfigError;
use meshherd_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const DATA: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(meshherd::not_found),
        help("{hint}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        hint: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(code(meshherd::conflict))]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(meshherd::validation))]
    Validation { field: String, reason: String },

    // ── Database ─────────────────────────────────────────────────────
    #[error("Database error: {message}")]
    #[diagnostic(
        code(meshherd::database),
        help("Check the database path with --database or the [database] section of the config.")
    )]
    Database { message: String },

    // ── Delivery ─────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(meshherd::delivery),
        help("This tool runs without a radio adapter; frames cannot be delivered.")
    )]
    Delivery { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(meshherd::config_exists), help("Pass --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(meshherd::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(meshherd::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Delivery { .. } => exit_code::CONNECTION,
            Self::Database { .. } => exit_code::DATA,
            _ => exit_code::GENERAL,
        }
    }
}

/// Help text pointing at the command that lists what exists.
pub fn list_hint(command: &str) -> String {
    format!("Run: meshherd {command} to see what exists")
}

fn entity_hint(entity: &str) -> String {
    match entity {
        "Group" => list_hint("groups list"),
        "Device" | "Endpoint" => list_hint("devices list"),
        _ => "Run: meshherd db inspect to check the database contents".into(),
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, identifier } => CliError::NotFound {
                hint: entity_hint(&entity),
                resource_type: entity,
                identifier,
            },

            CoreError::AlreadyExists { entity, identifier } => CliError::Conflict {
                resource_type: entity,
                identifier,
            },

            CoreError::InvalidArgument { message } => CliError::Validation {
                field: "argument".into(),
                reason: message,
            },

            err @ (CoreError::UnknownCluster { .. }
            | CoreError::UnknownAttribute { .. }
            | CoreError::UnknownCommand { .. }) => CliError::Validation {
                field: "name".into(),
                reason: err.to_string(),
            },

            err @ CoreError::Dispatch { .. } => CliError::Delivery {
                message: err.to_string(),
            },

            err @ (CoreError::Io { .. }
            | CoreError::Parse { .. }
            | CoreError::Serialize(_)
            | CoreError::GroupsNotLoaded) => CliError::Database {
                message: err.to_string(),
            },
        }
    }
}
