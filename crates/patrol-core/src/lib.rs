//! Floor-plane geometry and shared types for patrol agents.
//!
//! Everything here is plain data plus small pure helpers; the navigation engine lives in
//! `patrol-nav` and the host-facing registry in `patrol-sim`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod error;
pub mod geometry;
pub mod math;
pub mod route;
pub mod tick;

pub use agent::{AgentId, AgentState};
pub use error::{FloorError, Result};
pub use geometry::{Face, Obstacle, Rect, RAY_DIR_EPSILON};
pub use math::{Vec2, Vec3};
pub use route::Waypoint;
pub use tick::{clamp_dt, TickContext, MAX_DT_SECONDS};
