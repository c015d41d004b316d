use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use patrol_core::{Obstacle, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SteeringConfig {
    /// Steering force is clamped to `max_speed * max_force_factor`.
    pub max_force_factor: f32,
    /// Above this angle (radians) between heading and avoidance direction the agent turns
    /// rather than glides.
    pub turn_angle: f32,
    /// Fraction of velocity shed on each tick spent turning.
    pub turn_damping: f32,
    /// Fraction of velocity shed on each tick spent gliding.
    pub glide_damping: f32,
    pub turn_force_scale: f32,
    /// A new avoidance direction further than this from the remembered one is rejected.
    pub memory_max_turn: f32,
    /// `|tangent · to_target|` below which the target counts as straight through the face.
    pub tie_threshold: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            max_force_factor: 10.0,
            turn_angle: FRAC_PI_4,
            turn_damping: 0.7,
            glide_damping: 0.4,
            turn_force_scale: 0.5,
            memory_max_turn: FRAC_PI_2,
            tie_threshold: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SteerInput<'a> {
    pub position: Vec2,
    pub velocity: Vec2,
    pub target: Vec2,
    pub max_speed: f32,
    pub dt: f32,
    pub radius: f32,
    pub sensed: Option<&'a Obstacle>,
    /// Zero the steering force for this tick (reversal frame).
    pub suppress: bool,
}

/// Seek/avoid blend with angular priority and anti-oscillation memory.
#[derive(Debug, Clone, Default)]
pub struct SteeringController {
    config: SteeringConfig,
    last_evasion: Option<Vec2>,
}

impl SteeringController {
    pub fn new(config: SteeringConfig) -> Self {
        Self {
            config,
            last_evasion: None,
        }
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    pub fn last_evasion(&self) -> Option<Vec2> {
        self.last_evasion
    }

    pub fn clear_memory(&mut self) {
        self.last_evasion = None;
    }

    /// Direction to slide along the face of `obstacle` nearest to `position`.
    ///
    /// Picks the face tangent that makes progress toward `target`. When the target is almost
    /// straight through the face, the tangent pointing away from the obstacle centre is used.
    pub fn avoidance_direction(
        &self,
        position: Vec2,
        target: Vec2,
        obstacle: &Obstacle,
        radius: f32,
    ) -> Vec2 {
        let normal = obstacle.expanded(radius).face_normal(position);
        let to_target = (target - position)
            .try_normalize(0.001)
            .unwrap_or(Vec2::Z);

        let tangent = normal.perp();
        let along = tangent.dot(to_target);
        if along.abs() < self.config.tie_threshold {
            let away = position - obstacle.center();
            if tangent.dot(away) >= 0.0 {
                tangent
            } else {
                -tangent
            }
        } else if along > 0.0 {
            tangent
        } else {
            -tangent
        }
    }

    /// New velocity after one tick of steering. Position integration is left to the caller.
    pub fn steer(&mut self, input: SteerInput<'_>) -> Vec2 {
        let c = self.config;
        let speed = input.max_speed;
        let desired = (input.target - input.position).normalize_or_zero() * speed;
        let forward = input
            .velocity
            .try_normalize(0.001)
            .unwrap_or_else(|| desired.normalize_or_zero());

        let mut velocity = input.velocity;
        let mut force = match input.sensed {
            Some(obstacle) => {
                let mut dir =
                    self.avoidance_direction(input.position, input.target, obstacle, input.radius);
                if let Some(last) = self.last_evasion {
                    if dir.angle_to(last) > c.memory_max_turn {
                        dir = last;
                    }
                }
                self.last_evasion = Some(dir);

                if forward.angle_to(dir) > c.turn_angle {
                    velocity = velocity * (1.0 - c.turn_damping);
                    dir * speed * c.turn_force_scale
                } else {
                    velocity = velocity * (1.0 - c.glide_damping);
                    dir * speed
                }
            }
            None => {
                self.last_evasion = None;
                desired - velocity
            }
        };

        if input.suppress {
            force = Vec2::ZERO;
        }
        let force = force.clamp_length(speed * c.max_force_factor);
        (velocity + force * input.dt).clamp_length(speed)
    }
}
