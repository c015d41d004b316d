//! Host-facing side of the patrol engine.
//!
//! [`Floor`] owns every agent, the obstacle list and the floor bounds. Hosts register agents,
//! call [`Floor::tick`] once per frame, query positions and states through typed methods, and
//! drain the notification queue.

#![forbid(unsafe_code)]

pub mod config;
pub mod floor;
pub mod snapshot;

pub use config::{BeltRecord, ObstacleRecord, ScenarioConfig};
pub use floor::{AgentHandle, Floor};
pub use snapshot::{AgentSnapshot, FloorSnapshot};

pub use patrol_core::{AgentId, AgentState, FloorError, Rect, Vec2, Vec3, Waypoint};
pub use patrol_nav::{AgentConfig, EventKind, NavEvent, NavTuning};
