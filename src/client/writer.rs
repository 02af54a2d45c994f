//! Writing planned conditions back to a node.
//!
//! Two strategies share one entry point, [`apply_plan`]:
//! - [`change_node_condition`]: upsert into a fresh node, then replace status
//! - [`patch_node_status`]: swap the condition list and send the strategic
//!   merge patch between the before/after snapshots

use k8s_openapi::api::core::v1::{Node, NodeCondition};
use tracing::{debug, info};

use super::NodeClient;
use super::patch::{create_patch_for, is_empty_patch};
use crate::conditions::{ConditionPlan, WriteStrategy};
use crate::error::Result;

/// Write a plan using the strategy it carries.
pub async fn apply_plan<C>(client: &C, node_name: &str, plan: &ConditionPlan) -> Result<()>
where
    C: NodeClient + ?Sized,
{
    match plan.strategy {
        WriteStrategy::ReplaceStatus => {
            change_node_condition(client, node_name, &plan.conditions).await
        }
        WriteStrategy::StrategicPatch => {
            patch_node_status(client, node_name, plan.conditions.clone()).await
        }
    }
}

/// Upsert `conditions` into the live node and replace its status.
///
/// Matching entries get their heartbeat, transition time, message and status
/// overwritten in place; the reason and list position are kept. Conditions
/// with no match are appended.
pub async fn change_node_condition<C>(
    client: &C,
    node_name: &str,
    conditions: &[NodeCondition],
) -> Result<()>
where
    C: NodeClient + ?Sized,
{
    let mut node = client.get_node(node_name).await?;

    let live = node
        .status
        .get_or_insert_with(Default::default)
        .conditions
        .get_or_insert_with(Vec::new);
    upsert_conditions(live, conditions);

    for condition in live.iter() {
        info!(
            node = %node_name,
            condition = %condition.type_,
            status = %condition.status,
            "Node condition"
        );
    }

    client.replace_node_status(&node).await?;
    info!(node = %node_name, count = conditions.len(), "Replaced node status");
    Ok(())
}

/// Replace the node's condition list and patch the difference.
pub async fn patch_node_status<C>(
    client: &C,
    node_name: &str,
    conditions: Vec<NodeCondition>,
) -> Result<()>
where
    C: NodeClient + ?Sized,
{
    let before = client.get_node(node_name).await?;

    let mut after: Node = before.clone();
    after.status.get_or_insert_with(Default::default).conditions = Some(conditions);

    let patch = create_patch_for(&before, &after)?;
    if is_empty_patch(&patch) {
        debug!(node = %node_name, "Condition list unchanged, skipping patch");
        return Ok(());
    }

    client.patch_node_status(node_name, &patch).await?;
    info!(node = %node_name, "Patched node status");
    Ok(())
}

/// Merge `updates` into `live` by condition type
pub fn upsert_conditions(live: &mut Vec<NodeCondition>, updates: &[NodeCondition]) {
    for update in updates {
        match live.iter_mut().find(|c| c.type_ == update.type_) {
            Some(existing) => {
                existing.last_heartbeat_time = update.last_heartbeat_time.clone();
                existing.last_transition_time = update.last_transition_time.clone();
                existing.message = update.message.clone();
                existing.status = update.status.clone();
            }
            None => live.push(update.clone()),
        }
    }
}
