//! # sqlrag-cli: A CLI for `sqlrag`
//!
//! Command-line access to the text-to-SQL pipeline and its deployment
//! operations: ask a question, repoint the Champion alias, roll the
//! serving endpoint to the latest model version, or sync the metadata
//! index.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlrag::{
    deploy::{EndpointConfig, RegistryClient, ServingEndpoints},
    providers::{
        ai::serving::ServingEndpointProvider,
        vector::databricks::{DatabricksVectorIndex, DeltaSyncSpec},
    },
    SqlRagClientBuilder,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the Databricks workspace
    #[arg(long, env = "WORKSPACE_URL", global = true, default_value = "")]
    workspace_url: String,

    /// Personal access token for the workspace APIs
    #[arg(long, env = "WORKSPACE_TOKEN", global = true, default_value = "")]
    workspace_token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a SQL statement for a natural-language question
    Predict(PredictArgs),
    /// Point an alias at the latest registered model version
    UpdateAlias(UpdateAliasArgs),
    /// Create or update the serving endpoint for the latest model version
    DeployEndpoint(DeployEndpointArgs),
    /// Create or sync the table-metadata vector index
    SyncIndex(SyncIndexArgs),
}

#[derive(Parser, Debug)]
struct PredictArgs {
    /// The natural-language question to answer with SQL
    question: String,
    /// The vector search endpoint holding the metadata index
    #[arg(long, env = "VECTOR_SEARCH_ENDPOINT")]
    vector_search_endpoint: String,
    /// The fully qualified name of the table-metadata index
    #[arg(long, env = "VECTOR_INDEX_NAME")]
    vector_index_name: String,
    /// The serving endpoint hosting the SQL-generation model
    #[arg(long, env = "LLM_ENDPOINT")]
    llm_endpoint: String,
}

#[derive(Parser, Debug)]
struct UpdateAliasArgs {
    /// The registered model name (catalog.schema.model)
    #[arg(long)]
    model_name: String,
    /// The alias to move
    #[arg(long, default_value = "Champion")]
    alias: String,
}

#[derive(Parser, Debug)]
struct DeployEndpointArgs {
    /// The registered model name (catalog.schema.model)
    #[arg(long)]
    model_name: String,
    /// The serving endpoint name
    #[arg(long)]
    endpoint_name: String,
    /// Wait for the endpoint to finish deploying
    #[arg(long)]
    wait: bool,
}

#[derive(Parser, Debug)]
struct SyncIndexArgs {
    /// The vector search endpoint to host the index on
    #[arg(long, env = "VECTOR_SEARCH_ENDPOINT")]
    vector_search_endpoint: String,
    /// The fully qualified name of the index
    #[arg(long, env = "VECTOR_INDEX_NAME")]
    vector_index_name: String,
    /// The source delta table holding the table metadata
    #[arg(long)]
    source_table: String,
    /// The embedding model endpoint for the index
    #[arg(long, default_value = "databricks-bge-large-en")]
    embedding_model_endpoint: String,
    /// Wait for the index to be ready
    #[arg(long)]
    wait: bool,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict(args) => {
            let vector_index = DatabricksVectorIndex::new(
                cli.workspace_url.clone(),
                cli.workspace_token.clone(),
                args.vector_search_endpoint,
                args.vector_index_name,
            )?;
            let completion_provider = ServingEndpointProvider::new(
                cli.workspace_url,
                cli.workspace_token,
                args.llm_endpoint,
            )?;
            let client = SqlRagClientBuilder::new()
                .vector_index(Box::new(vector_index))
                .completion_provider(Box::new(completion_provider))
                .build()?;

            let sql = client.predict(&args.question).await?;
            println!("{sql}");
        }
        Commands::UpdateAlias(args) => {
            let registry = RegistryClient::new(cli.workspace_url, cli.workspace_token)?;
            let latest_version = registry.latest_model_version(&args.model_name).await?;
            registry
                .set_registered_model_alias(&args.model_name, &args.alias, latest_version)
                .await?;
            info!(
                "Alias {} on {} now points at version {latest_version}",
                args.alias, args.model_name
            );
        }
        Commands::DeployEndpoint(args) => {
            let registry =
                RegistryClient::new(cli.workspace_url.clone(), cli.workspace_token.clone())?;
            let latest_version = registry.latest_model_version(&args.model_name).await?;

            let endpoints = ServingEndpoints::new(cli.workspace_url, cli.workspace_token)?;
            let config = EndpointConfig::single_entity(&args.model_name, latest_version);
            endpoints
                .create_or_update(&args.endpoint_name, &config)
                .await?;
            if args.wait {
                endpoints.wait_until_ready(&args.endpoint_name).await?;
            }
            info!(
                "Endpoint {} serves {} version {latest_version}",
                args.endpoint_name, args.model_name
            );
        }
        Commands::SyncIndex(args) => {
            let index = DatabricksVectorIndex::new(
                cli.workspace_url,
                cli.workspace_token,
                args.vector_search_endpoint,
                args.vector_index_name,
            )?;
            let spec =
                DeltaSyncSpec::table_metadata(&args.source_table, &args.embedding_model_endpoint);
            index.ensure_index(&spec).await?;
            if args.wait {
                index.wait_until_ready().await?;
            }
        }
    }

    Ok(())
}
