use crate::{errors::PredictError, providers::ai::CompletionProvider};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

// --- Serving endpoint request and response structures ---

#[derive(Serialize)]
struct InvocationRequest<'a> {
    prompt: Vec<&'a str>,
}

#[derive(Deserialize, Debug)]
struct InvocationResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    text: String,
}

// --- Serving endpoint provider implementation ---

/// A provider for a model hosted on a Databricks-style serving endpoint.
///
/// Requests go to `POST {workspace_url}/serving-endpoints/{name}/invocations`
/// with a `{"prompt": [...]}` body; the first choice's text is the result.
#[derive(Clone, Debug)]
pub struct ServingEndpointProvider {
    client: ReqwestClient,
    workspace_url: String,
    token: String,
    endpoint_name: String,
}

impl ServingEndpointProvider {
    /// Creates a new `ServingEndpointProvider`.
    pub fn new(
        workspace_url: String,
        token: String,
        endpoint_name: String,
    ) -> Result<Self, PredictError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PredictError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            workspace_url,
            token,
            endpoint_name,
        })
    }

    fn invocations_url(&self) -> String {
        format!(
            "{}/serving-endpoints/{}/invocations",
            self.workspace_url.trim_end_matches('/'),
            self.endpoint_name
        )
    }
}

#[async_trait]
impl CompletionProvider for ServingEndpointProvider {
    async fn complete(&self, prompt: &str) -> Result<String, PredictError> {
        let request_body = InvocationRequest {
            prompt: vec![prompt],
        };

        debug!(endpoint = %self.endpoint_name, "--> Sending prompt to serving endpoint");

        let response = self
            .client
            .post(self.invocations_url())
            .bearer_auth(&self.token)
            .json(&request_body)
            .send()
            .await
            .map_err(PredictError::GenerationRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PredictError::GenerationApi(error_text));
        }

        let invocation_response: InvocationResponse = response
            .json()
            .await
            .map_err(PredictError::GenerationDeserialization)?;

        let generated_text = invocation_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(PredictError::EmptyCompletion)?;

        debug!("<-- Completion from serving endpoint: {generated_text}");

        Ok(generated_text)
    }
}
