//! Command line interface.
//!
//! Parses the `change` and `delete` commands, turns them into validated
//! requests, and runs the matching flow against a [`NodeClient`].

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use jiff::Timestamp;
use tracing::{error, info, warn};

use crate::client::{ClientOptions, NodeClient};
use crate::conditions::{
    ConditionChangeRequest, ConditionDeleteRequest, ConditionStatus, validate_change,
    validate_delete,
};
use crate::error::{Error, Result};
use crate::reconciler::{self, ChangeOutcome, DeleteOutcome};

/// nodecon - set or delete status conditions on a Kubernetes node
#[derive(Parser, Debug)]
#[command(name = "nodecon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to kubeconfig file. Leave unset to use the default kubeconfig or in-cluster config.
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Address of the Kubernetes API server. Overrides the kubeconfig cluster.
    #[arg(long, global = true)]
    pub master: Option<String>,

    /// Node name to change or delete conditions on
    #[arg(short = 'n', long = "nodename", global = true)]
    pub node_name: Option<String>,

    /// Condition type. For `change`, omit to change all conditions except 'Ready'
    #[arg(short = 't', long, global = true)]
    pub condition: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Change condition status
    Change(ChangeArgs),
    /// Delete the condition named by --condition
    Delete,
}

/// Arguments for `change`
#[derive(Args, Debug)]
pub struct ChangeArgs {
    /// Condition status, 'True' or 'False'
    #[arg(short = 's', long)]
    pub status: String,

    /// Message of status
    #[arg(short = 'm', long)]
    pub message: Option<String>,
}

/// A validated request ready to run against the cluster
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Change(ConditionChangeRequest),
    Delete(ConditionDeleteRequest),
}

impl Operation {
    pub fn node_name(&self) -> &str {
        match self {
            Operation::Change(r) => &r.node_name,
            Operation::Delete(r) => &r.node_name,
        }
    }
}

impl ChangeArgs {
    /// Build and validate the change request
    pub fn into_request(
        self,
        node_name: String,
        condition: Option<String>,
    ) -> Result<ConditionChangeRequest> {
        let status: ConditionStatus = self.status.parse()?;
        let request = ConditionChangeRequest {
            node_name,
            target_type: condition.filter(|c| !c.is_empty()),
            target_status: status,
            message: self.message.filter(|m| !m.is_empty()),
        };
        validate_change(&request)?;
        Ok(request)
    }
}

/// Build and validate the delete request
fn delete_request(node_name: String, condition: Option<String>) -> Result<ConditionDeleteRequest> {
    let request = ConditionDeleteRequest::new(node_name, condition.unwrap_or_default());
    validate_delete(&request)?;
    Ok(request)
}

impl Cli {
    /// Split into client options and a validated operation.
    ///
    /// Fails with [`Error::Validation`] before anything touches the cluster.
    pub fn into_operation(self) -> Result<(ClientOptions, Operation)> {
        let options = ClientOptions {
            kubeconfig: self.kubeconfig,
            master: self.master,
        };
        let node_name = self
            .node_name
            .ok_or_else(|| Error::Validation("--nodename is required".to_string()))?;
        let operation = match self.command {
            Commands::Change(args) => {
                Operation::Change(args.into_request(node_name, self.condition)?)
            }
            Commands::Delete => Operation::Delete(delete_request(node_name, self.condition)?),
        };
        Ok((options, operation))
    }

    /// Report a usage error the way clap does and exit with its usage code
    pub fn exit_with_usage_error(err: &Error) -> ! {
        Cli::command()
            .error(clap::error::ErrorKind::ValueValidation, err.to_string())
            .exit()
    }
}

/// Run an operation, logging cluster failures instead of returning them.
///
/// Usage errors are still returned so the caller can report them.
pub async fn execute<C>(client: &C, operation: &Operation) -> Result<()>
where
    C: NodeClient + ?Sized,
{
    let result = match operation {
        Operation::Change(request) => reconciler::change(client, request, Timestamp::now())
            .await
            .map(|outcome| report_change(&request.node_name, outcome)),
        Operation::Delete(request) => reconciler::delete(client, request)
            .await
            .map(|outcome| report_delete(request, outcome)),
    };

    match result {
        Err(e) if e.is_usage() => Err(e),
        Err(e) => {
            error!(node = %operation.node_name(), error = %e, "Failed to update node conditions");
            Ok(())
        }
        Ok(()) => Ok(()),
    }
}

fn report_change(node_name: &str, outcome: ChangeOutcome) {
    match outcome {
        ChangeOutcome::Applied { types } => {
            info!(node = %node_name, conditions = ?types, "Node conditions changed");
        }
        ChangeOutcome::NothingSelected => {
            info!(node = %node_name, "No conditions to change");
        }
        ChangeOutcome::NodeMissing => {
            warn!(node = %node_name, "Node not found, no changes made");
        }
    }
}

fn report_delete(request: &ConditionDeleteRequest, outcome: DeleteOutcome) {
    let node_name = request.node_name.as_str();
    let condition = request.condition_type.as_str();
    match outcome {
        DeleteOutcome::Deleted => {
            info!(node = %node_name, condition = %condition, "Node condition deleted");
        }
        DeleteOutcome::Absent => {
            info!(node = %node_name, condition = %condition, "Condition not present, nothing deleted");
        }
        DeleteOutcome::NodeMissing => {
            warn!(node = %node_name, "Node not found, no changes made");
        }
    }
}
