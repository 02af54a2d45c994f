//! Single-shot change and delete flows.
//!
//! Each flow validates the request, reads the node once, plans the new
//! condition list, and writes it back with the plan's strategy. A missing
//! node is reported as an outcome rather than an error.

use jiff::Timestamp;
use k8s_openapi::api::core::v1::{Node, NodeCondition};
use tracing::{info, warn};

use crate::client::{NodeClient, apply_plan};
use crate::conditions::{
    ConditionChangeRequest, ConditionDeleteRequest, plan_change, plan_delete, validate_change,
    validate_delete,
};
use crate::error::{Error, Result};

/// Result of a change flow
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The listed condition types were written
    Applied { types: Vec<String> },
    /// No condition matched and none could be created
    NothingSelected,
    /// The node does not exist
    NodeMissing,
}

/// Result of a delete flow
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The condition was removed
    Deleted,
    /// The node has no condition of the requested type
    Absent,
    /// The node does not exist
    NodeMissing,
}

/// Current conditions of a node
pub fn node_conditions(node: &Node) -> &[NodeCondition] {
    node.status
        .as_ref()
        .and_then(|s| s.conditions.as_deref())
        .unwrap_or_default()
}

/// Change one condition, or all but Ready, to the requested status.
pub async fn change<C>(
    client: &C,
    request: &ConditionChangeRequest,
    now: Timestamp,
) -> Result<ChangeOutcome>
where
    C: NodeClient + ?Sized,
{
    validate_change(request)?;
    let node_name = request.node_name.as_str();

    match request.target() {
        Some(condition_type) => info!(
            node = %node_name,
            condition = %condition_type,
            status = %request.target_status,
            "Changing node condition"
        ),
        None => info!(
            node = %node_name,
            status = %request.target_status,
            "Changing all node conditions except Ready"
        ),
    }

    let node = match client.get_node(node_name).await {
        Ok(node) => node,
        Err(Error::NodeNotFound { .. }) => {
            warn!(node = %node_name, "Node not found, nothing to change");
            return Ok(ChangeOutcome::NodeMissing);
        }
        Err(e) => return Err(e),
    };

    let plan = plan_change(node_conditions(&node), request, now);
    if plan.conditions.is_empty() {
        info!(node = %node_name, "No conditions matched");
        return Ok(ChangeOutcome::NothingSelected);
    }

    match apply_plan(client, node_name, &plan).await {
        Ok(()) => Ok(ChangeOutcome::Applied {
            types: plan.types().into_iter().map(str::to_string).collect(),
        }),
        Err(Error::NodeNotFound { .. }) => {
            warn!(node = %node_name, "Node disappeared before the status write");
            Ok(ChangeOutcome::NodeMissing)
        }
        Err(e) => Err(e),
    }
}

/// Remove a custom condition from a node.
pub async fn delete<C>(client: &C, request: &ConditionDeleteRequest) -> Result<DeleteOutcome>
where
    C: NodeClient + ?Sized,
{
    validate_delete(request)?;
    let node_name = request.node_name.as_str();
    let condition_type = request.condition_type.as_str();

    info!(node = %node_name, condition = %condition_type, "Deleting node condition");

    let node = match client.get_node(node_name).await {
        Ok(node) => node,
        Err(Error::NodeNotFound { .. }) => {
            warn!(node = %node_name, "Node not found, nothing to delete");
            return Ok(DeleteOutcome::NodeMissing);
        }
        Err(e) => return Err(e),
    };

    let Some(plan) = plan_delete(node_conditions(&node), condition_type) else {
        info!(node = %node_name, condition = %condition_type, "Condition not present");
        return Ok(DeleteOutcome::Absent);
    };

    for retained in plan.types() {
        info!(node = %node_name, condition = %retained, "Keeping condition");
    }

    match apply_plan(client, node_name, &plan).await {
        Ok(()) => Ok(DeleteOutcome::Deleted),
        Err(Error::NodeNotFound { .. }) => {
            warn!(node = %node_name, "Node disappeared before the status patch");
            Ok(DeleteOutcome::NodeMissing)
        }
        Err(e) => Err(e),
    }
}
