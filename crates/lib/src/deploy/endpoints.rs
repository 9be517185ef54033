use crate::deploy::DeployError;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// How long to wait between readiness polls.
const READY_POLL_INTERVAL: Duration = Duration::from_secs(30);

// --- Serving endpoint configuration structures ---

/// One model version served by an endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServedEntity {
    pub entity_name: String,
    pub entity_version: u32,
    pub workload_size: String,
    pub workload_type: String,
    pub scale_to_zero_enabled: bool,
}

/// The desired configuration of a serving endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub served_entities: Vec<ServedEntity>,
}

impl EndpointConfig {
    /// A single-entity config with the workload shape used for the
    /// text-to-SQL model.
    pub fn single_entity(entity_name: &str, entity_version: u32) -> Self {
        Self {
            served_entities: vec![ServedEntity {
                entity_name: entity_name.to_string(),
                entity_version,
                workload_size: "Small".to_string(),
                workload_type: "GPU_MEDIUM".to_string(),
                scale_to_zero_enabled: true,
            }],
        }
    }
}

#[derive(Serialize)]
struct CreateEndpointRequest<'a> {
    name: &'a str,
    config: &'a EndpointConfig,
}

#[derive(Deserialize, Debug)]
struct EndpointStatusResponse {
    state: EndpointState,
}

#[derive(Deserialize, Debug)]
struct EndpointState {
    #[serde(default)]
    ready: String,
    #[serde(default)]
    config_update: String,
}

// --- Serving endpoint client implementation ---

/// A client for the serving-endpoint control plane.
///
/// Centralizes the create-or-update and readiness-wait logic that the
/// deployment scripts each carried their own copy of.
#[derive(Clone, Debug)]
pub struct ServingEndpoints {
    client: ReqwestClient,
    workspace_url: String,
    token: String,
}

impl ServingEndpoints {
    /// Creates a new `ServingEndpoints` client.
    pub fn new(workspace_url: String, token: String) -> Result<Self, DeployError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(DeployError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            workspace_url,
            token,
        })
    }

    fn endpoints_url(&self) -> String {
        format!(
            "{}/api/2.0/serving-endpoints",
            self.workspace_url.trim_end_matches('/')
        )
    }

    /// Checks whether an endpoint with this name exists.
    pub async fn exists(&self, name: &str) -> Result<bool, DeployError> {
        let response = self
            .client
            .get(format!("{}/{name}", self.endpoints_url()))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(DeployError::Request)?;
        Ok(response.status().is_success())
    }

    /// Creates a new serving endpoint.
    pub async fn create(&self, name: &str, config: &EndpointConfig) -> Result<(), DeployError> {
        info!("Creating serving endpoint {name}");

        let request_body = CreateEndpointRequest { name, config };
        let response = self
            .client
            .post(self.endpoints_url())
            .bearer_auth(&self.token)
            .json(&request_body)
            .send()
            .await
            .map_err(DeployError::Request)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DeployError::Api(error_text));
        }
        Ok(())
    }

    /// Replaces the served-entity configuration of an existing endpoint.
    pub async fn update_config(
        &self,
        name: &str,
        config: &EndpointConfig,
    ) -> Result<(), DeployError> {
        info!("Updating serving endpoint {name}");

        let response = self
            .client
            .put(format!("{}/{name}/config", self.endpoints_url()))
            .bearer_auth(&self.token)
            .json(config)
            .send()
            .await
            .map_err(DeployError::Request)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DeployError::Api(error_text));
        }
        Ok(())
    }

    /// Creates the endpoint, falling back to a config update when creation
    /// fails because the endpoint already exists.
    pub async fn create_or_update(
        &self,
        name: &str,
        config: &EndpointConfig,
    ) -> Result<(), DeployError> {
        match self.create(name, config).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Endpoint creation failed ({e}), attempting to update endpoint");
                self.update_config(name, config).await
            }
        }
    }

    /// Polls the endpoint until deployment or a config update has finished.
    pub async fn wait_until_ready(&self, name: &str) -> Result<(), DeployError> {
        loop {
            let response = self
                .client
                .get(format!("{}/{name}", self.endpoints_url()))
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(DeployError::Request)?;

            if !response.status().is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(DeployError::Api(error_text));
            }

            let status: EndpointStatusResponse = response
                .json()
                .await
                .map_err(DeployError::Deserialization)?;

            if status.state.ready != "NOT_READY" && status.state.config_update != "IN_PROGRESS" {
                info!("Serving endpoint {name} is ready");
                return Ok(());
            }

            info!("Waiting 30s for deployment or update of {name} to finish");
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}
