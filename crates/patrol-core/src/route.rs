use crate::{Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A route target with an optional pause.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Waypoint {
    pub x: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub y: f32,
    pub z: f32,
    /// Seconds to wait after arriving. Omitted in config files means one second.
    #[cfg_attr(feature = "serde", serde(default = "default_dwell_seconds"))]
    pub dwell_seconds: f32,
}

#[cfg(feature = "serde")]
fn default_dwell_seconds() -> f32 {
    1.0
}

impl Waypoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            dwell_seconds: 0.0,
        }
    }

    pub const fn with_dwell(mut self, seconds: f32) -> Self {
        self.dwell_seconds = seconds;
        self
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn floor(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}

impl From<Vec3> for Waypoint {
    fn from(p: Vec3) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}
