//! Shared configuration for meshherd tools.
//!
//! One TOML file at the platform config location, overridable by
//! `MESHHERD_*` environment variables, translated into
//! `meshherd_core::ControllerConfig`. The CLI layers its flags on top.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use meshherd_core::ControllerConfig;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default log filter when neither `-v` nor `RUST_LOG` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub network: NetworkSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            database: DatabaseSection::default(),
            network: NetworkSection::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DatabaseSection {
    /// Database file; defaults to `database.db` in the platform data dir.
    pub path: Option<PathBuf>,

    /// Copy the database here before opening it.
    pub backup_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkSection {
    /// Source endpoint for group frames when a command names none.
    pub default_source_endpoint: Option<u8>,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Config {
    /// The configured database path, or the platform default.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| data_dir().join("database.db"))
    }

    /// Build a `ControllerConfig`, optionally overriding the database path.
    pub fn controller_config(&self, database_override: Option<&Path>) -> ControllerConfig {
        ControllerConfig {
            database_path: database_override.map_or_else(|| self.database_path(), Path::to_path_buf),
            backup_path: self.database.backup_path.clone(),
            default_source_endpoint: self.network.default_source_endpoint,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation {
                field: "log_level".into(),
                reason: format!("expected one of {}, got '{}'", LOG_LEVELS.join(", "), self.log_level),
            });
        }
        if self.network.default_source_endpoint == Some(0) {
            return Err(ConfigError::Validation {
                field: "network.default_source_endpoint".into(),
                reason: "endpoint 0 is reserved".into(),
            });
        }
        Ok(())
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "meshherd", "meshherd")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "meshherd", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory the database lives in unless configured otherwise.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "meshherd"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path` (or the default location) plus environment.
///
/// Nested keys use a double underscore, e.g. `MESHHERD_DATABASE__PATH`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("MESHHERD_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default(path: Option<&Path>) -> Config {
    load_config(path).unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path` (or the default location).
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(path)
}
