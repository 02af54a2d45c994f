//! Node condition model and reconciliation rules.
//!
//! Contains the condition status type, the change/delete request types, the
//! static condition tables, and the pure filter/merge/validation logic used by
//! the reconciler.

pub mod filter;
pub mod merge;
pub mod validation;

pub use filter::{remove_condition, select_conditions};
pub use merge::apply_change;
pub use validation::{validate_change, validate_delete};

use std::fmt;
use std::str::FromStr;

use k8s_openapi::api::core::v1::NodeCondition;

use crate::error::Error;

/// The node readiness condition type
pub const READY: &str = "Ready";

/// Condition types that may never be deleted.
pub const PROTECTED_CONDITIONS: &[&str] = &[
    READY,
    "KernelDeadLock",
    "CorruptDockerOverlay2",
    "ReadonlyFilesystem",
    "NetworkUnavailable",
    "DiskPressure",
    "MemoryPressure",
    "PIDPressure",
    "EFSConnectFail",
];

/// Canonical "all clear" messages, applied when a condition goes back to False
/// without an explicit message.
const OK_MESSAGES: &[(&str, &str)] = &[
    ("KernelDeadLock", "kernel has no deadlock"),
    ("CorruptDockerOverlay2", "docker overlay2 is functioning properly"),
    ("ReadonlyFilesystem", "Filesystem is not read-only"),
    ("NetworkUnavailable", "Weave pod has set this"),
    ("DiskPressure", "kubelet has no disk pressure"),
    ("MemoryPressure", "kubelet has sufficient memory available"),
    ("PIDPressure", "kubelet has sufficient PID available"),
    ("EFSConnectFail", "EFS is mounted successfully"),
];

/// Look up the canonical ok-message for a condition type
pub fn ok_message(condition_type: &str) -> Option<&'static str> {
    OK_MESSAGES
        .iter()
        .find(|(t, _)| *t == condition_type)
        .map(|(_, msg)| *msg)
}

/// Check if a condition type is protected from deletion
pub fn is_protected(condition_type: &str) -> bool {
    PROTECTED_CONDITIONS.contains(&condition_type)
}

/// Status of a node condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    /// Wire representation used by the Kubernetes API
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "True" => Ok(ConditionStatus::True),
            "False" => Ok(ConditionStatus::False),
            "Unknown" => Ok(ConditionStatus::Unknown),
            other => Err(Error::Validation(format!(
                "invalid status '{}', only 'True' and 'False' are available",
                other
            ))),
        }
    }
}

/// A requested status change for one or all conditions of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionChangeRequest {
    /// Node to change
    pub node_name: String,
    /// Condition type to change; `None` targets every condition except Ready
    pub target_type: Option<String>,
    /// Status to set
    pub target_status: ConditionStatus,
    /// Explicit message; `None` falls back to the ok-message table
    pub message: Option<String>,
}

impl ConditionChangeRequest {
    /// Create a request targeting every condition except Ready
    pub fn all(node_name: impl Into<String>, status: ConditionStatus) -> Self {
        Self {
            node_name: node_name.into(),
            target_type: None,
            target_status: status,
            message: None,
        }
    }

    /// Create a request targeting a single condition type
    pub fn single(
        node_name: impl Into<String>,
        condition_type: impl Into<String>,
        status: ConditionStatus,
    ) -> Self {
        Self {
            node_name: node_name.into(),
            target_type: Some(condition_type.into()),
            target_status: status,
            message: None,
        }
    }

    /// Set an explicit message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Target type, with an empty string treated as unset
    pub fn target(&self) -> Option<&str> {
        self.target_type.as_deref().filter(|t| !t.is_empty())
    }
}

/// A request to remove a condition from a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionDeleteRequest {
    /// Node to change
    pub node_name: String,
    /// Condition type to remove
    pub condition_type: String,
}

impl ConditionDeleteRequest {
    pub fn new(node_name: impl Into<String>, condition_type: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            condition_type: condition_type.into(),
        }
    }
}

/// How a plan is written back to the cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Upsert the planned conditions into a fresh node and replace its status
    ReplaceStatus,
    /// Replace the condition list and send a strategic merge patch
    StrategicPatch,
}

/// Conditions to write plus the strategy used to write them.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionPlan {
    pub conditions: Vec<NodeCondition>,
    pub strategy: WriteStrategy,
}

impl ConditionPlan {
    pub fn replace(conditions: Vec<NodeCondition>) -> Self {
        Self {
            conditions,
            strategy: WriteStrategy::ReplaceStatus,
        }
    }

    pub fn patch(conditions: Vec<NodeCondition>) -> Self {
        Self {
            conditions,
            strategy: WriteStrategy::StrategicPatch,
        }
    }

    /// Condition types in the plan, in order
    pub fn types(&self) -> Vec<&str> {
        self.conditions.iter().map(|c| c.type_.as_str()).collect()
    }
}

/// Plan a status change against the node's current conditions.
pub fn plan_change(
    current: &[NodeCondition],
    request: &ConditionChangeRequest,
    now: jiff::Timestamp,
) -> ConditionPlan {
    let selected = select_conditions(current, request.target());
    ConditionPlan::replace(apply_change(selected, request, now))
}

/// Plan the removal of a condition type.
///
/// Returns `None` when the node has no condition of that type.
pub fn plan_delete(current: &[NodeCondition], condition_type: &str) -> Option<ConditionPlan> {
    remove_condition(current, condition_type).map(ConditionPlan::patch)
}
