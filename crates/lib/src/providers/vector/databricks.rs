//! # Databricks Vector Search Index
//!
//! This module provides the HTTP client for a Databricks Vector Search
//! index. The query path implements the [`VectorIndex`] trait used by the
//! prediction pipeline; the remaining methods administer the index itself
//! (create, sync, readiness polling) and are used by the deployment
//! tooling, not by `predict`.

use crate::{
    deploy::DeployError,
    errors::PredictError,
    providers::vector::VectorIndex,
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// How long to wait between readiness polls.
const READY_POLL_INTERVAL: Duration = Duration::from_secs(30);

// --- Query request and response structures ---

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_text: &'a str,
    columns: &'a [&'a str],
    num_results: u32,
}

#[derive(Deserialize, Debug)]
struct QueryResponse {
    result: QueryResult,
}

#[derive(Deserialize, Debug)]
struct QueryResult {
    #[serde(default)]
    data_array: Vec<Vec<Value>>,
}

// --- Index administration structures ---

/// The definition of a delta-sync index over a source table.
#[derive(Debug, Clone, Serialize)]
pub struct DeltaSyncSpec {
    pub source_table: String,
    pub primary_key: String,
    pub embedding_source_column: String,
    pub embedding_model_endpoint: String,
    pub pipeline_type: String,
}

impl DeltaSyncSpec {
    /// A spec for the table-metadata index the pipeline retrieves from:
    /// keyed by table name, embedding the DDL text.
    pub fn table_metadata(source_table: &str, embedding_model_endpoint: &str) -> Self {
        Self {
            source_table: source_table.to_string(),
            primary_key: "TableName".to_string(),
            embedding_source_column: "CreateTableStatement".to_string(),
            embedding_model_endpoint: embedding_model_endpoint.to_string(),
            pipeline_type: "TRIGGERED".to_string(),
        }
    }
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    endpoint_name: &'a str,
    primary_key: &'a str,
    index_type: &'a str,
    delta_sync_index_spec: DeltaSyncIndexSpec<'a>,
}

#[derive(Serialize)]
struct DeltaSyncIndexSpec<'a> {
    source_table: &'a str,
    pipeline_type: &'a str,
    embedding_source_columns: Vec<EmbeddingSourceColumn<'a>>,
}

#[derive(Serialize)]
struct EmbeddingSourceColumn<'a> {
    name: &'a str,
    embedding_model_endpoint_name: &'a str,
}

#[derive(Deserialize, Debug)]
struct IndexStatusResponse {
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Deserialize, Debug, Default)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

// --- Databricks Vector Search implementation ---

/// A client for one Databricks Vector Search index.
#[derive(Clone, Debug)]
pub struct DatabricksVectorIndex {
    client: ReqwestClient,
    workspace_url: String,
    token: String,
    endpoint_name: String,
    index_name: String,
}

impl DatabricksVectorIndex {
    /// Creates a new `DatabricksVectorIndex`.
    pub fn new(
        workspace_url: String,
        token: String,
        endpoint_name: String,
        index_name: String,
    ) -> Result<Self, PredictError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PredictError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            workspace_url,
            token,
            endpoint_name,
            index_name,
        })
    }

    fn index_url(&self) -> String {
        format!(
            "{}/api/2.0/vector-search/indexes/{}",
            self.workspace_url.trim_end_matches('/'),
            self.index_name
        )
    }

    /// Checks whether the index exists on the endpoint.
    pub async fn exists(&self) -> Result<bool, DeployError> {
        let response = self
            .client
            .get(self.index_url())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(DeployError::Request)?;
        Ok(response.status().is_success())
    }

    /// Creates the delta-sync index from `spec`.
    pub async fn create(&self, spec: &DeltaSyncSpec) -> Result<(), DeployError> {
        let url = format!(
            "{}/api/2.0/vector-search/indexes",
            self.workspace_url.trim_end_matches('/')
        );
        let request_body = CreateIndexRequest {
            name: &self.index_name,
            endpoint_name: &self.endpoint_name,
            primary_key: &spec.primary_key,
            index_type: "DELTA_SYNC",
            delta_sync_index_spec: DeltaSyncIndexSpec {
                source_table: &spec.source_table,
                pipeline_type: &spec.pipeline_type,
                embedding_source_columns: vec![EmbeddingSourceColumn {
                    name: &spec.embedding_source_column,
                    embedding_model_endpoint_name: &spec.embedding_model_endpoint,
                }],
            },
        };

        let response = self
            .client
            .post(url)
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

    /// Triggers a sync so the index picks up new rows from the source table.
    pub async fn sync(&self) -> Result<(), DeployError> {
        let url = format!("{}/sync", self.index_url());
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(DeployError::Request)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DeployError::Api(error_text));
        }
        Ok(())
    }

    /// Creates the index if it does not exist yet, otherwise triggers a sync.
    pub async fn ensure_index(&self, spec: &DeltaSyncSpec) -> Result<(), DeployError> {
        if self.exists().await? {
            info!(
                "Index {} already exists, triggering a sync to pick up new rows",
                self.index_name
            );
            self.sync().await
        } else {
            info!(
                "Creating index {} on endpoint {}",
                self.index_name, self.endpoint_name
            );
            self.create(spec).await
        }
    }

    /// Polls the index until it reports ready.
    pub async fn wait_until_ready(&self) -> Result<(), DeployError> {
        loop {
            let response = self
                .client
                .get(self.index_url())
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(DeployError::Request)?;

            if !response.status().is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(DeployError::Api(error_text));
            }

            let status: IndexStatusResponse = response
                .json()
                .await
                .map_err(DeployError::Deserialization)?;

            if status.status.unwrap_or_default().ready {
                info!("Index {} is ready", self.index_name);
                return Ok(());
            }

            info!("Waiting 30s for index {} to be ready", self.index_name);
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl VectorIndex for DatabricksVectorIndex {
    async fn similarity_search(
        &self,
        query_text: &str,
        columns: &[&str],
        num_results: u32,
    ) -> Result<Vec<Vec<String>>, PredictError> {
        let request_body = QueryRequest {
            query_text,
            columns,
            num_results,
        };

        debug!(index = %self.index_name, %query_text, "--> Querying vector index");

        let response = self
            .client
            .post(format!("{}/query", self.index_url()))
            .bearer_auth(&self.token)
            .json(&request_body)
            .send()
            .await
            .map_err(PredictError::RetrievalRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PredictError::RetrievalApi(error_text));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(PredictError::RetrievalDeserialization)?;

        query_response
            .result
            .data_array
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        Value::String(s) => Ok(s),
                        other => Err(PredictError::RetrievalMalformedRow(other.to_string())),
                    })
                    .collect()
            })
            .collect()
    }
}
