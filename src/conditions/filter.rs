//! Selection of the conditions a request applies to.

use k8s_openapi::api::core::v1::NodeCondition;

use super::READY;

/// Select the conditions to mutate.
///
/// With no target type every condition except Ready is selected. With a
/// target type only entries of that type are selected.
pub fn select_conditions(
    conditions: &[NodeCondition],
    target_type: Option<&str>,
) -> Vec<NodeCondition> {
    match target_type {
        None => conditions
            .iter()
            .filter(|c| c.type_ != READY)
            .cloned()
            .collect(),
        Some(t) => conditions
            .iter()
            .filter(|c| c.type_ == t)
            .cloned()
            .collect(),
    }
}

/// Remove every condition of `condition_type`, keeping the rest untouched.
///
/// Returns `None` if nothing matched.
pub fn remove_condition(
    conditions: &[NodeCondition],
    condition_type: &str,
) -> Option<Vec<NodeCondition>> {
    let remaining: Vec<NodeCondition> = conditions
        .iter()
        .filter(|c| c.type_ != condition_type)
        .cloned()
        .collect();

    (remaining.len() != conditions.len()).then_some(remaining)
}
