use thiserror::Error;

use crate::AgentId;

/// Errors surfaced to hosts.
///
/// Runtime anomalies (sensor misses, stuck agents, clamped positions) are recovered inside the
/// engine and never show up here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FloorError {
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("agent name already registered: {0}")]
    DuplicateAgent(String),

    #[error("unknown agent state: {0}")]
    UnknownState(String),

    #[error("invalid agent config for {name}: {reason}")]
    InvalidAgent { name: String, reason: String },

    #[error("invalid floor bounds: {0}")]
    InvalidBounds(String),
}

pub type Result<T> = std::result::Result<T, FloorError>;
