use patrol_core::{Vec3, Waypoint};

/// Distance at which a waypoint counts as reached.
pub const ARRIVAL_THRESHOLD: f32 = 0.2;

/// What the agent should do this tick, as decided by the router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoutePhase {
    /// No waypoints: the tick is a no-op.
    Empty,
    /// Outside the arrival radius; steer toward this waypoint.
    Seek(Waypoint),
    /// Inside the arrival radius, waiting.
    Dwell { remaining: f32 },
    /// Dwell finished (or was zero) and the route moved on to `to`.
    Advance { from: usize, to: usize },
    /// Arrived and nothing left to do (single-waypoint routes).
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteTick {
    pub phase: RoutePhase,
    /// Set on the first tick inside the arrival radius of that waypoint.
    pub arrived: Option<usize>,
}

/// Cyclic waypoint route with per-waypoint dwell.
///
/// The arrival notification fires once per actual arrival: an agent that stays inside the
/// radius keeps `arrived` set until it leaves again or the route advances.
#[derive(Debug, Clone)]
pub struct WaypointRouter {
    waypoints: Vec<Waypoint>,
    index: usize,
    dwell_remaining: f32,
    arrived: bool,
    threshold: f32,
}

impl WaypointRouter {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self::with_threshold(waypoints, ARRIVAL_THRESHOLD)
    }

    pub fn with_threshold(waypoints: Vec<Waypoint>, threshold: f32) -> Self {
        Self {
            waypoints,
            index: 0,
            dwell_remaining: 0.0,
            arrived: false,
            threshold: threshold.max(0.0),
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.index)
    }

    pub fn dwell_remaining(&self) -> f32 {
        self.dwell_remaining
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Retarget the route, e.g. after a teleport. Out-of-range indices are ignored.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.waypoints.len() {
            return false;
        }
        self.index = index;
        self.dwell_remaining = 0.0;
        self.arrived = false;
        true
    }

    pub fn advance(&mut self, position: Vec3, dt: f32) -> RouteTick {
        let Some(target) = self.waypoints.get(self.index).copied() else {
            return RouteTick {
                phase: RoutePhase::Empty,
                arrived: None,
            };
        };

        if position.distance(target.position()) > self.threshold {
            // Leaving the radius cancels any dwell in progress.
            self.arrived = false;
            self.dwell_remaining = 0.0;
            return RouteTick {
                phase: RoutePhase::Seek(target),
                arrived: None,
            };
        }

        if !self.arrived {
            self.arrived = true;
            self.dwell_remaining = target.dwell_seconds.max(0.0);
            let arrived = Some(self.index);
            let phase = if self.dwell_remaining > 0.0 {
                RoutePhase::Dwell {
                    remaining: self.dwell_remaining,
                }
            } else {
                self.next()
            };
            return RouteTick { phase, arrived };
        }

        if self.dwell_remaining > 0.0 {
            self.dwell_remaining -= dt;
            if self.dwell_remaining > 0.0 {
                return RouteTick {
                    phase: RoutePhase::Dwell {
                        remaining: self.dwell_remaining,
                    },
                    arrived: None,
                };
            }
            self.dwell_remaining = 0.0;
            return RouteTick {
                phase: self.next(),
                arrived: None,
            };
        }

        RouteTick {
            phase: RoutePhase::Hold,
            arrived: None,
        }
    }

    fn next(&mut self) -> RoutePhase {
        if self.waypoints.len() < 2 {
            return RoutePhase::Hold;
        }
        let from = self.index;
        self.index = (self.index + 1) % self.waypoints.len();
        self.arrived = false;
        self.dwell_remaining = 0.0;
        RoutePhase::Advance {
            from,
            to: self.index,
        }
    }
}
