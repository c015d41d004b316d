use patrol_core::{Face, Obstacle, Rect, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConstraintConfig {
    /// Extra gap, on top of the agent radius, left between a snapped agent and the expanded
    /// rectangle.
    pub snap_margin: f32,
    /// Velocity bias along the violated face normal, subtracted after the normal component is
    /// stripped.
    pub normal_bias: f32,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            snap_margin: 0.05,
            normal_bias: 0.1,
        }
    }
}

/// One positional correction applied by [`enforce`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub obstacle: usize,
    pub face: Face,
    pub normal: Vec2,
}

const MAX_PASSES: usize = 3;

/// Push `position` out of every obstacle expanded by `radius`.
///
/// The snap lands `radius + snap_margin` beyond the nearest face whose target stays inside
/// `walkable` (the floor bounds already inset by the radius); if none does, the nearest face is
/// used. Velocity loses its component along the (corner-blended) face normal, is biased by
/// `-normal_bias` along it, and is clamped to `max_speed`.
pub fn enforce(
    config: &ConstraintConfig,
    position: &mut Vec2,
    velocity: &mut Vec2,
    obstacles: &[Obstacle],
    radius: f32,
    walkable: Option<Rect>,
    max_speed: f32,
) -> Vec<Correction> {
    let mut corrections = Vec::new();
    let margin = radius + config.snap_margin;

    // Overlapping obstacles can push an agent from one into another; a few passes settle it.
    for _ in 0..MAX_PASSES {
        let before = corrections.len();
        for (index, obstacle) in obstacles.iter().enumerate() {
            if !obstacle.is_valid() {
                continue;
            }
            let rect = obstacle.expanded(radius);
            if !rect.contains(*position) {
                continue;
            }

            let normal = rect.face_normal(*position);
            let faces = rect.faces_by_distance(*position);
            let face = faces
                .iter()
                .map(|(face, _)| *face)
                .find(|face| {
                    let snapped = rect.snap_outside(*position, *face, margin);
                    walkable.map_or(true, |w| w.contains(snapped))
                })
                .unwrap_or(faces[0].0);

            *position = rect.snap_outside(*position, face, margin);

            let into = velocity.dot(normal);
            *velocity =
                (*velocity - normal * into - normal * config.normal_bias).clamp_length(max_speed);

            tracing::trace!(obstacle = index, ?face, "snapped out of obstacle");
            corrections.push(Correction {
                obstacle: index,
                face,
                normal,
            });
        }
        if corrections.len() == before {
            break;
        }
    }

    corrections
}
