//! # Application Configuration
//!
//! Defines the server configuration and the logic for loading it from an
//! optional `config.yml` file layered under environment variables. Every
//! workspace credential is explicit configuration here; nothing is read
//! from ambient process state at request time.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::fs;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL of the Databricks workspace hosting the index and model.
    pub workspace_url: String,
    /// Personal access token for the workspace APIs.
    pub workspace_token: String,
    /// The vector search endpoint the metadata index lives on.
    pub vector_search_endpoint: String,
    /// The fully qualified name of the table-metadata index.
    pub vector_index_name: String,
    /// The serving endpoint hosting the SQL-generation model.
    pub llm_endpoint: String,
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    9090
}

/// Loads the application configuration.
///
/// An optional `config.yml` next to the manifest provides file-based
/// settings; environment variables (`PORT`, `WORKSPACE_URL`,
/// `WORKSPACE_TOKEN`, `VECTOR_SEARCH_ENDPOINT`, `VECTOR_INDEX_NAME`,
/// `LLM_ENDPOINT`) override them.
pub fn get_config() -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let file_path = format!("{}/config.yml", env!("CARGO_MANIFEST_DIR"));
    if std::path::Path::new(&file_path).exists() {
        let content = fs::read_to_string(&file_path)
            .map_err(|e| ConfigError::General(format!("Failed to read '{file_path}': {e}")))?;
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder.add_source(Environment::default()).build()?;

    Ok(settings.try_deserialize()?)
}
