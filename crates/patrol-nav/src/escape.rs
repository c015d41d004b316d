use std::collections::VecDeque;

use patrol_core::{Obstacle, Vec2, Waypoint};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const TIME_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EscapeConfig {
    pub sample_interval: f32,
    /// Samples older than this are dropped.
    pub window: f32,
    /// Minimum span of the retained samples before the window is judged.
    pub full_window: f32,
    /// Path length over the window below which the agent counts as stuck.
    pub stuck_distance: f32,
    pub burst_duration: f32,
    pub burst_speed_scale: f32,
    pub cooldown: f32,
    pub reverse_scale: f32,
    /// Required gap between a teleport target and every obstacle's coarse extent.
    pub safe_clearance: f32,
}

impl Default for EscapeConfig {
    fn default() -> Self {
        Self {
            sample_interval: 0.1,
            window: 0.5,
            full_window: 0.4,
            stuck_distance: 0.1,
            burst_duration: 0.2,
            burst_speed_scale: 1.5,
            cooldown: 0.5,
            reverse_scale: 0.3,
            safe_clearance: 2.0,
        }
    }
}

/// What the agent has to do after [`StuckMonitor::observe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EscapeAction {
    None,
    /// A burst just started; override velocity.
    StartBurst(Vec2),
    /// A burst is still running; keep the override.
    Burst(Vec2),
    /// The burst ran its course. Velocity must be clamped back to max speed.
    FinishBurst,
    /// Apply this velocity; steering is suppressed on the next tick.
    Reverse(Vec2),
    /// Still stuck after the reversal. The caller relocates the agent and calls
    /// [`StuckMonitor::reset`].
    Teleport,
    /// Movement resumed while an escalation was pending.
    Recovered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveBurst {
    started: f64,
    velocity: Vec2,
}

/// Trailing-window stuck detection with a tiered escape: burst, one-frame reversal, teleport.
#[derive(Debug, Clone, Default)]
pub struct StuckMonitor {
    config: EscapeConfig,
    history: VecDeque<(f64, Vec2)>,
    last_sample: Option<f64>,
    burst: Option<ActiveBurst>,
    cooldown: f32,
    reversing: bool,
    verdict_pending: bool,
}

impl StuckMonitor {
    pub fn new(config: EscapeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EscapeConfig {
        &self.config
    }

    pub fn is_bursting(&self) -> bool {
        self.burst.is_some()
    }

    pub fn burst_velocity(&self) -> Option<Vec2> {
        self.burst.map(|b| b.velocity)
    }

    /// True during the frame after a reversal nudge.
    pub fn is_reversing(&self) -> bool {
        self.reversing
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Path length over the retained samples.
    pub fn total_distance(&self) -> f32 {
        self.history
            .iter()
            .zip(self.history.iter().skip(1))
            .map(|((_, a), (_, b))| a.distance(*b))
            .sum()
    }

    fn window_is_full(&self) -> bool {
        match (self.history.front(), self.history.back()) {
            (Some((first, _)), Some((last, _))) if self.history.len() >= 2 => {
                last - first >= f64::from(self.config.full_window) - 1e-6
            }
            _ => false,
        }
    }

    fn restart_window(&mut self, now: f64) {
        self.history.clear();
        self.last_sample = Some(now);
    }

    /// Clear all stuck and escape state, including the cooldown.
    pub fn reset(&mut self, now: f64) {
        self.restart_window(now);
        self.burst = None;
        self.cooldown = 0.0;
        self.reversing = false;
        self.verdict_pending = false;
    }

    /// Forget the window while the agent is deliberately standing still. The cooldown keeps
    /// running.
    pub fn pause(&mut self, dt: f32) {
        self.history.clear();
        self.last_sample = None;
        self.burst = None;
        self.reversing = false;
        self.verdict_pending = false;
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// Record this tick's position and decide on an escape step.
    ///
    /// `sensed` is the obstacle the ray sensor reported this tick, if any.
    pub fn observe(
        &mut self,
        now: f64,
        dt: f32,
        position: Vec2,
        velocity: Vec2,
        sensed: Option<&Obstacle>,
        max_speed: f32,
    ) -> EscapeAction {
        let c = self.config;
        self.cooldown = (self.cooldown - dt).max(0.0);

        let due = self
            .last_sample
            .map_or(true, |last| now - last >= f64::from(c.sample_interval) - TIME_EPS);
        if due {
            self.history.push_back((now, position));
            self.last_sample = Some(now);
            let window = f64::from(c.window);
            while let Some((t, _)) = self.history.front() {
                if now - t > window + TIME_EPS {
                    self.history.pop_front();
                } else {
                    break;
                }
            }
        }

        if let Some(burst) = self.burst {
            if now - burst.started < f64::from(c.burst_duration) - TIME_EPS {
                return EscapeAction::Burst(burst.velocity);
            }
            self.burst = None;
            self.cooldown = c.cooldown;
            self.restart_window(now);
            self.verdict_pending = true;
            return EscapeAction::FinishBurst;
        }

        if !self.window_is_full() {
            return EscapeAction::None;
        }

        if self.total_distance() >= c.stuck_distance {
            let escalated = self.reversing || self.verdict_pending;
            self.reversing = false;
            self.verdict_pending = false;
            return if escalated {
                EscapeAction::Recovered
            } else {
                EscapeAction::None
            };
        }

        if self.reversing {
            return EscapeAction::Teleport;
        }

        if self.verdict_pending {
            let heading = velocity
                .try_normalize(0.001)
                .unwrap_or(Vec2::new(0.0, -1.0));
            self.reversing = true;
            return EscapeAction::Reverse(velocity - heading * max_speed * c.reverse_scale);
        }

        if let Some(obstacle) = sensed {
            if self.cooldown <= 0.0 {
                let away = (position - obstacle.center())
                    .try_normalize(0.001)
                    .or_else(|| (-velocity).try_normalize(0.001))
                    .unwrap_or(Vec2::new(0.0, -1.0));
                let velocity = away * max_speed * c.burst_speed_scale;
                self.burst = Some(ActiveBurst {
                    started: now,
                    velocity,
                });
                return EscapeAction::StartBurst(velocity);
            }
        }

        EscapeAction::None
    }
}

/// Nearest waypoint (to `position`) whose coarse clearance from every valid obstacle is at least
/// `clearance`. Ties go to the lower index.
pub fn find_safe_waypoint(
    waypoints: &[Waypoint],
    position: Vec2,
    obstacles: &[Obstacle],
    radius: f32,
    clearance: f32,
) -> Option<usize> {
    waypoints
        .iter()
        .enumerate()
        .filter(|(_, wp)| {
            obstacles.iter().filter(|o| o.is_valid()).all(|o| {
                wp.floor().distance(o.center()) - o.coarse_extent() - radius >= clearance
            })
        })
        .map(|(i, wp)| (i, wp.floor().distance(position)))
        .fold(None, |best: Option<(usize, f32)>, (i, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((i, d)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.1;

    fn run_pinned(monitor: &mut StuckMonitor, ticks: usize, start: f64) -> Vec<EscapeAction> {
        let obstacle = Obstacle::new(1.0, 0.0, 1.0, 1.0);
        (1..=ticks)
            .map(|i| {
                let now = start + i as f64 * f64::from(DT);
                monitor.observe(now, DT, Vec2::ZERO, Vec2::X, Some(&obstacle), 1.0)
            })
            .collect()
    }

    #[test]
    fn burst_needs_a_full_window() {
        let mut monitor = StuckMonitor::default();
        let actions = run_pinned(&mut monitor, 5, 0.0);
        assert!(actions[..4].iter().all(|a| *a == EscapeAction::None));
        match actions[4] {
            EscapeAction::StartBurst(v) => {
                assert!((v.length() - 1.5).abs() < 1e-5);
                // Away from the obstacle centre at +X.
                assert!(v.x < 0.0);
            }
            other => panic!("expected burst, got {other:?}"),
        }
        assert!(monitor.is_bursting());
    }

    #[test]
    fn escalates_burst_reverse_teleport() {
        let mut monitor = StuckMonitor::default();
        let mut actions = run_pinned(&mut monitor, 30, 0.0);
        actions.retain(|a| *a != EscapeAction::None);
        let kinds: Vec<&'static str> = actions
            .iter()
            .map(|a| match a {
                EscapeAction::StartBurst(_) => "start",
                EscapeAction::Burst(_) => "burst",
                EscapeAction::FinishBurst => "finish",
                EscapeAction::Reverse(_) => "reverse",
                EscapeAction::Teleport => "teleport",
                EscapeAction::Recovered => "recovered",
                EscapeAction::None => "none",
            })
            .collect();
        assert_eq!(
            &kinds[..5],
            &["start", "burst", "finish", "reverse", "teleport"]
        );
    }

    #[test]
    fn reset_clears_history() {
        let mut monitor = StuckMonitor::default();
        run_pinned(&mut monitor, 4, 0.0);
        assert!(monitor.history_len() > 0);
        monitor.reset(1.0);
        assert_eq!(monitor.history_len(), 0);
        assert_eq!(monitor.total_distance(), 0.0);
        assert_eq!(monitor.cooldown(), 0.0);
    }

    #[test]
    fn moving_agent_is_never_stuck() {
        let mut monitor = StuckMonitor::default();
        let obstacle = Obstacle::new(10.0, 0.0, 1.0, 1.0);
        for i in 1..=50 {
            let now = f64::from(i) * 0.1;
            let p = Vec2::new(i as f32 * 0.1, 0.0);
            let action = monitor.observe(now, 0.1, p, Vec2::X, Some(&obstacle), 1.0);
            assert_eq!(action, EscapeAction::None);
        }
    }

    #[test]
    fn safe_waypoint_respects_coarse_clearance() {
        let obstacles = [Obstacle::new(0.0, 0.0, 4.0, 1.0)];
        let waypoints = [
            Waypoint::new(0.0, 0.0, 3.0),
            Waypoint::new(6.0, 0.0, 0.0),
            Waypoint::new(-8.0, 0.0, 0.0),
        ];
        // |wp| - 2.0 - 0.25 >= 2.0 rules out the first.
        let best = find_safe_waypoint(&waypoints, Vec2::new(0.0, 3.0), &obstacles, 0.25, 2.0);
        assert_eq!(best, Some(1));
        assert_eq!(
            find_safe_waypoint(&waypoints[..1], Vec2::ZERO, &obstacles, 0.25, 2.0),
            None
        );
    }
}
