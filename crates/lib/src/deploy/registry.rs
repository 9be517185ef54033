use crate::deploy::DeployError;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use tracing::info;

// --- Registry request and response structures ---

#[derive(Deserialize, Debug)]
struct SearchModelVersionsResponse {
    #[serde(default)]
    model_versions: Vec<ModelVersion>,
}

#[derive(Deserialize, Debug)]
struct ModelVersion {
    version: String,
}

#[derive(Serialize)]
struct SetAliasRequest<'a> {
    name: &'a str,
    alias: &'a str,
    version: String,
}

// --- Registry client implementation ---

/// A client for the model registry's REST API.
///
/// This is the single home for the version and alias operations that were
/// previously re-implemented by every deployment script.
#[derive(Clone, Debug)]
pub struct RegistryClient {
    client: ReqwestClient,
    workspace_url: String,
    token: String,
}

impl RegistryClient {
    /// Creates a new `RegistryClient`.
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

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/2.0/mlflow/{path}",
            self.workspace_url.trim_end_matches('/')
        )
    }

    /// Returns the latest registered version of `model_name`.
    ///
    /// The latest version is the numeric maximum over all registered
    /// versions; a model with no versions resolves to 1.
    pub async fn latest_model_version(&self, model_name: &str) -> Result<u32, DeployError> {
        let response = self
            .client
            .get(self.api_url("model-versions/search"))
            .bearer_auth(&self.token)
            .query(&[("filter", format!("name='{model_name}'"))])
            .send()
            .await
            .map_err(DeployError::Request)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DeployError::Api(error_text));
        }

        let search_response: SearchModelVersionsResponse = response
            .json()
            .await
            .map_err(DeployError::Deserialization)?;

        let mut latest_version = 1;
        for mv in search_response.model_versions {
            let version: u32 = mv
                .version
                .parse()
                .map_err(|_| DeployError::MalformedVersion(mv.version.clone()))?;
            if version > latest_version {
                latest_version = version;
            }
        }
        Ok(latest_version)
    }

    /// Points `alias` (e.g. `Champion`) at `version` of `model_name`.
    pub async fn set_registered_model_alias(
        &self,
        model_name: &str,
        alias: &str,
        version: u32,
    ) -> Result<(), DeployError> {
        info!("Setting alias {alias} on {model_name} to version {version}");

        let request_body = SetAliasRequest {
            name: model_name,
            alias,
            version: version.to_string(),
        };

        let response = self
            .client
            .post(self.api_url("registered-models/alias"))
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
}
