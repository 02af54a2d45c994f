//! Merging a requested status change into selected conditions.

use k8s_openapi::api::core::v1::NodeCondition;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use super::{ConditionChangeRequest, ConditionStatus, ok_message};

/// Apply a status change to the selected conditions.
///
/// The transition time is only stamped when the status actually changes.
/// When nothing was selected and a single type was requested, a new condition
/// of that type is created.
pub fn apply_change(
    mut selected: Vec<NodeCondition>,
    request: &ConditionChangeRequest,
    now: jiff::Timestamp,
) -> Vec<NodeCondition> {
    let status = request.target_status;

    for condition in selected.iter_mut() {
        if condition.status != status.as_str() {
            condition.last_transition_time = Some(Time(now));
        }

        if let Some(message) = resolve_message(request) {
            condition.message = Some(message);
        }

        condition.status = status.to_string();
    }

    if selected.is_empty() {
        if let Some(condition_type) = request.target() {
            selected.push(new_condition(condition_type, status, request.message.clone(), now));
        }
    }

    selected
}

/// Message to set on a condition, or `None` to leave the current one.
///
/// The canned message is keyed by the requested type, so a bulk change
/// never applies one.
fn resolve_message(request: &ConditionChangeRequest) -> Option<String> {
    match request.message.as_deref().filter(|m| !m.is_empty()) {
        Some(message) => Some(message.to_string()),
        None if request.target_status == ConditionStatus::False => {
            ok_message(request.target()?).map(str::to_string)
        }
        None => None,
    }
}

fn new_condition(
    condition_type: &str,
    status: ConditionStatus,
    message: Option<String>,
    now: jiff::Timestamp,
) -> NodeCondition {
    NodeCondition {
        type_: condition_type.to_string(),
        status: status.to_string(),
        message,
        reason: Some(condition_type.to_string()),
        last_heartbeat_time: Some(Time(now)),
        last_transition_time: Some(Time(now)),
    }
}
