//! # Deployment Collaborators
//!
//! This module centralizes the registry and serving-endpoint operations
//! that deployment tooling needs: resolving the latest registered model
//! version, repointing an alias, and creating or updating the serving
//! endpoint that hosts the model. The prediction pipeline itself never
//! touches these.

pub mod endpoints;
pub mod registry;

pub use endpoints::{EndpointConfig, ServedEntity, ServingEndpoints};
pub use registry::RegistryClient;

use thiserror::Error;

/// Custom error types for deployment operations.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Request failed: {0}")]
    Request(reqwest::Error),
    #[error("API returned an error: {0}")]
    Api(String),
    #[error("Failed to deserialize response: {0}")]
    Deserialization(reqwest::Error),
    #[error("Registry returned a non-numeric model version: {0}")]
    MalformedVersion(String),
}
