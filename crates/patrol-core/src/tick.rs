/// Upper bound applied to every frame delta before it reaches the engine.
pub const MAX_DT_SECONDS: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    /// Frame delta, already clamped to `[0, MAX_DT_SECONDS]`.
    pub dt_seconds: f32,
    /// Simulation clock at the end of this tick.
    pub elapsed_seconds: f64,
}

impl TickContext {
    /// Build a context from a raw host delta; non-finite or negative deltas become zero.
    pub fn new(tick: u64, raw_dt: f32, elapsed_seconds: f64) -> Self {
        Self {
            tick,
            dt_seconds: clamp_dt(raw_dt),
            elapsed_seconds,
        }
    }
}

pub fn clamp_dt(raw_dt: f32) -> f32 {
    if raw_dt.is_finite() {
        raw_dt.clamp(0.0, MAX_DT_SECONDS)
    } else {
        0.0
    }
}
