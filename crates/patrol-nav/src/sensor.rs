use std::f32::consts::FRAC_PI_6;

use patrol_core::{Obstacle, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Look-ahead geometry of the three probe rays.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorConfig {
    pub forward_min: f32,
    pub forward_scale: f32,
    pub side_min: f32,
    pub side_scale: f32,
    /// Radians between the centre ray and each side ray.
    pub side_angle: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            forward_min: 0.5,
            forward_scale: 1.2,
            side_min: 0.4,
            side_scale: 0.9,
            side_angle: FRAC_PI_6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RayKind {
    Center,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorHit {
    /// Index into the obstacle slice that was sensed.
    pub obstacle: usize,
    pub ray: RayKind,
    /// Distance along the ray to the expanded rectangle (0 when already inside).
    pub distance: f32,
}

/// Three forward-looking rays: centre, then left, then right.
#[derive(Debug, Clone, Copy, Default)]
pub struct RaySensor {
    config: SensorConfig,
}

impl RaySensor {
    pub fn new(config: SensorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Rays in priority order. Lengths grow with speed above a fixed minimum.
    pub fn rays(&self, forward: Vec2, speed: f32) -> [(RayKind, Vec2, f32); 3] {
        let c = &self.config;
        let forward_len = (speed * c.forward_scale).max(c.forward_min);
        let side_len = (speed * c.side_scale).max(c.side_min);
        [
            (RayKind::Center, forward, forward_len),
            (RayKind::Left, forward.rotate_y(c.side_angle), side_len),
            (RayKind::Right, forward.rotate_y(-c.side_angle), side_len),
        ]
    }

    /// First ray (by priority) that hits any obstacle expanded by `radius`; within a ray the
    /// closest obstacle wins. Obstacles with invalid geometry are ignored.
    pub fn sense(
        &self,
        origin: Vec2,
        forward: Vec2,
        speed: f32,
        obstacles: &[Obstacle],
        radius: f32,
    ) -> Option<SensorHit> {
        for (ray, dir, len) in self.rays(forward, speed) {
            let mut best: Option<SensorHit> = None;
            for (index, obstacle) in obstacles.iter().enumerate() {
                if !obstacle.is_valid() {
                    continue;
                }
                let Some(t) = obstacle.expanded(radius).ray_entry(origin, dir, len) else {
                    continue;
                };
                if best.map_or(true, |b| t < b.distance) {
                    best = Some(SensorHit {
                        obstacle: index,
                        ray,
                        distance: t,
                    });
                }
            }
            if best.is_some() {
                return best;
            }
        }
        None
    }
}
