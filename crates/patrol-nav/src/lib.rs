//! Per-agent navigation: waypoint following, ray sensing, steering, hard constraints and stuck
//! recovery.
//!
//! One [`Agent`] is ticked once per frame against a read-only [`FloorView`]. The pipeline per
//! walking tick is: router → ray sensor → steering → integration + bounds clamp → hard
//! constraint → stuck monitor.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod constraint;
pub mod escape;
pub mod events;
pub mod router;
pub mod sensor;
pub mod steering;
pub mod tuning;

pub use agent::{Agent, AgentConfig, FloorView};
pub use constraint::{enforce, ConstraintConfig, Correction};
pub use escape::{find_safe_waypoint, EscapeAction, EscapeConfig, StuckMonitor};
pub use events::{EventKind, EventSink, NavEvent, NullEventSink, VecEventSink};
pub use router::{RoutePhase, RouteTick, WaypointRouter, ARRIVAL_THRESHOLD};
pub use sensor::{RayKind, RaySensor, SensorConfig, SensorHit};
pub use steering::{SteerInput, SteeringConfig, SteeringController};
pub use tuning::NavTuning;
