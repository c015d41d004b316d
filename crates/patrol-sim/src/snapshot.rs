use patrol_core::{AgentId, AgentState, Vec2, Vec3};
use patrol_nav::Agent;
use serde::{Deserialize, Serialize};

/// Read-only view of one agent, for dashboards and CLI output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub name: String,
    pub position: Vec3,
    pub velocity: Vec2,
    pub heading: f32,
    pub state: AgentState,
    pub waypoint_index: usize,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id(),
            name: agent.name().to_string(),
            position: agent.position(),
            velocity: agent.velocity(),
            heading: agent.heading(),
            state: agent.state(),
            waypoint_index: agent.waypoint_index(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorSnapshot {
    pub tick: u64,
    pub elapsed_seconds: f64,
    pub agents: Vec<AgentSnapshot>,
}
