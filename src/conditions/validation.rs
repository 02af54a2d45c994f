//! Validation of change and delete requests.
//!
//! Every check here runs before a client is built, so a rejected request
//! never reaches the cluster:
//! - Only True and False may be set
//! - Forcing every condition to True is not allowed
//! - Forcing Ready to False is not allowed
//! - Built-in condition types cannot be deleted

use crate::error::{Error, Result};

use super::{ConditionChangeRequest, ConditionDeleteRequest, ConditionStatus, READY, is_protected};

/// Validate a change request
pub fn validate_change(request: &ConditionChangeRequest) -> Result<()> {
    validate_node_name(&request.node_name)?;
    validate_status(request.target_status)?;

    match (request.target_status, request.target()) {
        (ConditionStatus::True, None) => Err(Error::Validation(
            "changing all conditions to 'True' is not allowed".to_string(),
        )),
        (ConditionStatus::False, Some(READY)) => Err(Error::Validation(format!(
            "changing the status of '{}' condition to 'False' is not allowed",
            READY
        ))),
        _ => Ok(()),
    }
}

/// Validate a delete request
pub fn validate_delete(request: &ConditionDeleteRequest) -> Result<()> {
    validate_node_name(&request.node_name)?;

    if request.condition_type.is_empty() {
        return Err(Error::Validation(
            "a condition type is required to delete a condition".to_string(),
        ));
    }

    if is_protected(&request.condition_type) {
        return Err(Error::Validation(format!(
            "deleting condition '{}' is not allowed",
            request.condition_type
        )));
    }

    Ok(())
}

fn validate_status(status: ConditionStatus) -> Result<()> {
    match status {
        ConditionStatus::True | ConditionStatus::False => Ok(()),
        ConditionStatus::Unknown => Err(Error::Validation(format!(
            "invalid status '{}', only 'True' and 'False' are available",
            status
        ))),
    }
}

fn validate_node_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("node name must not be empty".to_string()));
    }
    Ok(())
}
