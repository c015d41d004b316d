//! Scenario files: floor bounds, belts, loose obstacles, agents and optional tuning.

use std::path::Path;

use anyhow::{Context, Result};
use patrol_core::{AgentState, Obstacle, Rect, Vec3, Waypoint};
use patrol_nav::{AgentConfig, NavTuning};
use serde::{Deserialize, Serialize};

/// A complete floor setup, loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub name: Option<String>,

    /// Walkable floor rectangle. `null` disables the bounds clamp.
    #[serde(default = "default_bounds")]
    pub bounds: Option<Rect>,

    /// Conveyor belts; each becomes one collision rectangle.
    #[serde(default)]
    pub belts: Vec<BeltRecord>,

    /// Additional raw obstacles.
    #[serde(default)]
    pub obstacles: Vec<ObstacleRecord>,

    #[serde(default)]
    pub agents: Vec<AgentConfig>,

    #[serde(default)]
    pub tuning: NavTuning,
}

fn default_bounds() -> Option<Rect> {
    Some(Rect::new(-10.0, 10.0, -10.0, 10.0))
}

/// Conveyor belt as placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeltRecord {
    pub id: String,
    pub position: Vec3,
    /// Visual yaw in radians. Collision ignores it.
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_belt_length")]
    pub length: f32,
    #[serde(default = "default_belt_width")]
    pub width: f32,
}

fn default_belt_length() -> f32 {
    6.0
}
fn default_belt_width() -> f32 {
    1.0
}

/// Trim applied to a belt's width so the collision box matches the rendered frame.
pub const BELT_WIDTH_TRIM: f32 = 0.1;

impl BeltRecord {
    pub fn new(id: impl Into<String>, position: Vec3, length: f32, width: f32) -> Self {
        Self {
            id: id.into(),
            position,
            rotation: 0.0,
            length,
            width,
        }
    }

    /// Collision record: centre and size only, never rotated.
    pub fn to_record(&self) -> ObstacleRecord {
        ObstacleRecord {
            center_x: Some(self.position.x),
            center_z: Some(self.position.z),
            length: Some(self.length),
            width: Some(self.width - BELT_WIDTH_TRIM),
        }
    }
}

/// Obstacle geometry as it arrives from a host. Any missing or unusable field makes the record
/// unusable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObstacleRecord {
    #[serde(default, alias = "x")]
    pub center_x: Option<f32>,
    #[serde(default, alias = "z")]
    pub center_z: Option<f32>,
    #[serde(default)]
    pub length: Option<f32>,
    #[serde(default)]
    pub width: Option<f32>,
}

impl ObstacleRecord {
    pub fn to_obstacle(&self) -> Option<Obstacle> {
        let obstacle = Obstacle::new(self.center_x?, self.center_z?, self.length?, self.width?);
        obstacle.is_valid().then_some(obstacle)
    }
}

impl From<Obstacle> for ObstacleRecord {
    fn from(o: Obstacle) -> Self {
        Self {
            center_x: Some(o.center_x),
            center_z: Some(o.center_z),
            length: Some(o.length),
            width: Some(o.width),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::factory()
    }
}

impl ScenarioConfig {
    /// Empty floor with the default bounds.
    pub fn empty() -> Self {
        Self {
            name: None,
            bounds: default_bounds(),
            belts: Vec::new(),
            obstacles: Vec::new(),
            agents: Vec::new(),
            tuning: NavTuning::default(),
        }
    }

    /// The stock factory floor: two belts either side of the centre line and three patrolling
    /// workers.
    pub fn factory() -> Self {
        let route = |points: &[(f32, f32, f32)]| -> Vec<Waypoint> {
            points
                .iter()
                .map(|&(x, z, dwell)| Waypoint::new(x, 0.0, z).with_dwell(dwell))
                .collect()
        };

        Self {
            name: Some("factory".to_string()),
            bounds: default_bounds(),
            belts: vec![
                BeltRecord::new("conveyor-a", Vec3::new(-4.0, 0.0, 0.0), 8.0, 1.2),
                BeltRecord::new("conveyor-b", Vec3::new(4.0, 0.0, 0.0), 8.0, 1.2),
            ],
            obstacles: Vec::new(),
            agents: vec![
                AgentConfig::new(
                    "worker-1",
                    Vec3::new(-4.0, 0.0, 3.0),
                    route(&[
                        (-4.0, 3.0, 2.0),
                        (-7.0, 3.0, 1.0),
                        (-7.0, -3.0, 2.0),
                        (-4.0, -3.0, 1.0),
                    ]),
                )
                .with_speed(1.5),
                AgentConfig::new(
                    "worker-2",
                    Vec3::new(4.0, 0.0, 3.0),
                    route(&[
                        (4.0, 3.0, 3.0),
                        (7.0, 3.0, 1.0),
                        (7.0, -3.0, 3.0),
                        (4.0, -3.0, 1.0),
                    ]),
                )
                .with_speed(1.2),
                AgentConfig::new(
                    "worker-3",
                    Vec3::new(0.0, 0.0, 5.0),
                    route(&[
                        (0.0, 5.0, 2.0),
                        (-5.0, 5.0, 1.0),
                        (-5.0, -5.0, 2.0),
                        (5.0, -5.0, 1.0),
                        (5.0, 5.0, 2.0),
                    ]),
                )
                .with_speed(2.0)
                .with_state(AgentState::Walking),
            ],
            tuning: NavTuning::default(),
        }
    }

    /// Load a scenario from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse scenario from {}", path.display()))?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize scenario")
    }

    /// Belts first, then loose obstacles, in file order.
    pub fn obstacle_records(&self) -> Vec<ObstacleRecord> {
        self.belts
            .iter()
            .map(BeltRecord::to_record)
            .chain(self.obstacles.iter().copied())
            .collect()
    }
}
