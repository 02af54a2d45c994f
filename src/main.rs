//! nodecon - change or delete a Kubernetes node's status conditions.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Parses and validates the command before any cluster call
//! - Creates the Kubernetes client
//! - Runs one change or delete and exits

use clap::Parser;
use tracing::{error, info};

use nodecon::{Cli, KubeNodeClient, create_client, execute};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nodecon=info".parse()?)
                .add_directive("kube=warn".parse()?),
        )
        .json()
        .init();

    let cli = Cli::parse();

    // Usage errors exit here, before a client exists
    let (options, operation) = match cli.into_operation() {
        Ok(parsed) => parsed,
        Err(e) => Cli::exit_with_usage_error(&e),
    };

    let client = match create_client(&options).await {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Cannot create Kubernetes client");
            return Err(e.into());
        }
    };
    info!(node = %operation.node_name(), "Connected to Kubernetes cluster");

    let nodes = KubeNodeClient::new(client);
    if let Err(e) = execute(&nodes, &operation).await {
        Cli::exit_with_usage_error(&e);
    }

    Ok(())
}
