use crate::{ConstraintConfig, EscapeConfig, SensorConfig, SteeringConfig, ARRIVAL_THRESHOLD};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Every engine constant in one place. The defaults reproduce the stock behaviour; scenario files
/// may override any subset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavTuning {
    pub arrival_threshold: f32,
    pub sensor: SensorConfig,
    pub steering: SteeringConfig,
    pub constraint: ConstraintConfig,
    pub escape: EscapeConfig,
}

impl Default for NavTuning {
    fn default() -> Self {
        Self {
            arrival_threshold: ARRIVAL_THRESHOLD,
            sensor: SensorConfig::default(),
            steering: SteeringConfig::default(),
            constraint: ConstraintConfig::default(),
            escape: EscapeConfig::default(),
        }
    }
}
