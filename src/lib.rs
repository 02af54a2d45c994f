//! nodecon library crate
//!
//! This module exports the condition rules, the node client, and the
//! change/delete flows behind the `nodecon` command.

pub mod cli;
pub mod client;
pub mod conditions;
pub mod error;
pub mod reconciler;

pub use cli::{Cli, Operation, execute};
pub use client::{ClientOptions, KubeNodeClient, NodeClient, create_client};
pub use conditions::{
    ConditionChangeRequest, ConditionDeleteRequest, ConditionPlan, ConditionStatus, WriteStrategy,
};
pub use error::{Error, Result};
pub use reconciler::{ChangeOutcome, DeleteOutcome};
