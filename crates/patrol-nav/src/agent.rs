use patrol_core::{
    AgentId, AgentState, FloorError, Obstacle, Rect, Result, TickContext, Vec2, Vec3, Waypoint,
};

use crate::events::{EventKind, EventSink, NavEvent};
use crate::{
    constraint, find_safe_waypoint, ConstraintConfig, EscapeAction, NavTuning, RaySensor,
    RoutePhase, SteerInput, SteeringController, StuckMonitor, WaypointRouter,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_SPEED: f32 = 1.5;
pub const DEFAULT_RADIUS: f32 = 0.25;

const BOUNCE_HEIGHT: f32 = 0.05;
const WALK_PHASE_RATE: f32 = 8.0;

/// Everything needed to create an [`Agent`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentConfig {
    pub name: String,
    pub start: Vec3,
    #[cfg_attr(feature = "serde", serde(default))]
    pub waypoints: Vec<Waypoint>,
    #[cfg_attr(feature = "serde", serde(default = "default_max_speed"))]
    pub max_speed: f32,
    #[cfg_attr(feature = "serde", serde(default = "default_radius"))]
    pub radius: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial_state: AgentState,
    /// Overrides the floor bounds for this agent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bounds: Option<Rect>,
}

#[cfg(feature = "serde")]
fn default_max_speed() -> f32 {
    DEFAULT_MAX_SPEED
}

#[cfg(feature = "serde")]
fn default_radius() -> f32 {
    DEFAULT_RADIUS
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, start: Vec3, waypoints: Vec<Waypoint>) -> Self {
        Self {
            name: name.into(),
            start,
            waypoints,
            max_speed: DEFAULT_MAX_SPEED,
            radius: DEFAULT_RADIUS,
            initial_state: AgentState::Idle,
            bounds: None,
        }
    }

    pub fn with_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_state(mut self, state: AgentState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// One fixed waypoint and no speed: a post that is worked rather than patrolled.
    pub fn is_stationary(&self) -> bool {
        self.waypoints.len() == 1 && self.max_speed == 0.0
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| FloorError::InvalidAgent {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if !self.max_speed.is_finite() || self.max_speed < 0.0 {
            return Err(invalid("max_speed must be finite and non-negative"));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(invalid("radius must be finite and non-negative"));
        }
        if !self.start.is_finite() {
            return Err(invalid("start position is not finite"));
        }
        if self
            .waypoints
            .iter()
            .any(|wp| !wp.position().is_finite() || !wp.dwell_seconds.is_finite())
        {
            return Err(invalid("waypoint is not finite"));
        }
        if let Some(bounds) = self.bounds {
            if !bounds.is_valid() {
                return Err(FloorError::InvalidBounds(format!("{bounds:?}")));
            }
        }
        Ok(())
    }
}

/// Read-only world an agent is ticked against.
#[derive(Debug, Clone, Copy)]
pub struct FloorView<'a> {
    pub obstacles: &'a [Obstacle],
    pub bounds: Option<Rect>,
}

impl<'a> FloorView<'a> {
    pub fn new(obstacles: &'a [Obstacle], bounds: Option<Rect>) -> Self {
        Self { obstacles, bounds }
    }
}

/// One navigating agent and all of its per-tick state.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    name: String,
    position: Vec3,
    velocity: Vec2,
    heading: f32,
    state: AgentState,
    resting_state: AgentState,
    max_speed: f32,
    radius: f32,
    bounds: Option<Rect>,
    walk_phase: f32,
    router: WaypointRouter,
    sensor: RaySensor,
    steering: SteeringController,
    constraint: ConstraintConfig,
    escape: StuckMonitor,
}

impl Agent {
    pub fn new(id: AgentId, config: AgentConfig, tuning: &NavTuning) -> Result<Self> {
        config.validate()?;
        let resting_state = if config.is_stationary() {
            AgentState::Working
        } else {
            AgentState::Idle
        };
        Ok(Self {
            id,
            name: config.name,
            position: config.start,
            velocity: Vec2::ZERO,
            heading: 0.0,
            state: config.initial_state,
            resting_state,
            max_speed: config.max_speed,
            radius: config.radius,
            bounds: config.bounds,
            walk_phase: 0.0,
            router: WaypointRouter::with_threshold(config.waypoints, tuning.arrival_threshold),
            sensor: RaySensor::new(tuning.sensor),
            steering: SteeringController::new(tuning.steering),
            constraint: tuning.constraint,
            escape: StuckMonitor::new(tuning.escape),
        })
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Facing angle, `atan2(vx, vz)` of the last meaningful velocity.
    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_stationary(&self) -> bool {
        self.router.waypoints().len() == 1 && self.max_speed == 0.0
    }

    pub fn waypoint_index(&self) -> usize {
        self.router.index()
    }

    pub fn router(&self) -> &WaypointRouter {
        &self.router
    }

    pub fn steering(&self) -> &SteeringController {
        &self.steering
    }

    pub fn escape(&self) -> &StuckMonitor {
        &self.escape
    }

    /// Change state, emitting [`EventKind::StateChanged`] only when it actually differs.
    pub fn set_state(&mut self, state: AgentState, tick: u64, sink: &mut dyn EventSink) {
        if self.state == state {
            return;
        }
        let from = self.state;
        self.state = state;
        tracing::debug!(agent = %self.id, %from, to = %state, "state changed");
        sink.emit(NavEvent::new(
            tick,
            self.id,
            EventKind::StateChanged { from, to: state },
        ));
    }

    pub fn tick(&mut self, ctx: &TickContext, view: &FloorView<'_>, sink: &mut dyn EventSink) {
        if self.state.is_frozen() {
            return;
        }

        let dt = ctx.dt_seconds;
        let walkable = self.bounds.or(view.bounds).map(|b| b.inset(self.radius));
        let route = self.router.advance(self.position, dt);

        if let Some(index) = route.arrived {
            tracing::trace!(agent = %self.id, index, "waypoint reached");
            sink.emit(NavEvent::new(
                ctx.tick,
                self.id,
                EventKind::WaypointReached { index },
            ));
        }

        match route.phase {
            RoutePhase::Empty => {}
            RoutePhase::Seek(target) => {
                self.set_state(AgentState::Walking, ctx.tick, sink);
                self.walk(ctx, target, view, walkable, sink);
            }
            RoutePhase::Advance { .. } => {
                self.set_state(AgentState::Walking, ctx.tick, sink);
                self.hold(dt, view, walkable);
            }
            RoutePhase::Dwell { .. } | RoutePhase::Hold => {
                if route.arrived.is_some() {
                    self.set_state(self.resting_state, ctx.tick, sink);
                }
                self.hold(dt, view, walkable);
            }
        }
    }

    /// Standing still at a waypoint: no steering, no stuck detection, constraints still apply.
    fn hold(&mut self, dt: f32, view: &FloorView<'_>, walkable: Option<Rect>) {
        self.velocity = Vec2::ZERO;
        self.escape.pause(dt);

        let mut p = self.position.floor();
        if let Some(w) = walkable {
            p = w.clamp(p);
        }
        constraint::enforce(
            &self.constraint,
            &mut p,
            &mut self.velocity,
            view.obstacles,
            self.radius,
            walkable,
            self.max_speed,
        );
        if let Some(w) = walkable {
            p = w.clamp(p);
        }
        self.velocity = Vec2::ZERO;

        let y = self.router.current().map_or(self.position.y, |wp| wp.y);
        self.position = p.with_height(y);
    }

    fn walk(
        &mut self,
        ctx: &TickContext,
        target: Waypoint,
        view: &FloorView<'_>,
        walkable: Option<Rect>,
        sink: &mut dyn EventSink,
    ) {
        let dt = ctx.dt_seconds;
        let speed = self.max_speed;
        let pos = self.position.floor();
        let to_target = target.floor() - pos;
        let desired = to_target.normalize_or_zero() * speed;

        if self.velocity.length() < 0.001 {
            self.velocity = desired;
        }
        let forward = self
            .velocity
            .try_normalize(0.001)
            .unwrap_or_else(|| desired.normalize_or_zero());

        let hit = self.sensor.sense(pos, forward, speed, view.obstacles, self.radius);
        let sensed: Option<Obstacle> = hit.map(|h| view.obstacles[h.obstacle]);

        self.velocity = match self.escape.burst_velocity() {
            Some(burst) => burst,
            None => self.steering.steer(SteerInput {
                position: pos,
                velocity: self.velocity,
                target: target.floor(),
                max_speed: speed,
                dt,
                radius: self.radius,
                sensed: sensed.as_ref(),
                suppress: self.escape.is_reversing(),
            }),
        };

        let mut p = pos + self.velocity * dt;
        if let Some(w) = walkable {
            p = w.clamp(p);
        }
        constraint::enforce(
            &self.constraint,
            &mut p,
            &mut self.velocity,
            view.obstacles,
            self.radius,
            walkable,
            speed,
        );
        if let Some(w) = walkable {
            p = w.clamp(p);
        }

        match self.escape.observe(
            ctx.elapsed_seconds,
            dt,
            p,
            self.velocity,
            sensed.as_ref(),
            speed,
        ) {
            EscapeAction::None => {}
            EscapeAction::Burst(v) => self.velocity = v,
            EscapeAction::StartBurst(v) => {
                self.velocity = v;
                tracing::debug!(agent = %self.id, vx = v.x, vz = v.z, "escape burst");
                sink.emit(NavEvent::new(
                    ctx.tick,
                    self.id,
                    EventKind::EscapeStarted { velocity: v },
                ));
            }
            EscapeAction::FinishBurst => {
                self.velocity = self.velocity.clamp_length(speed);
                sink.emit(NavEvent::new(ctx.tick, self.id, EventKind::EscapeFinished));
            }
            EscapeAction::Reverse(v) => {
                self.velocity = v;
                tracing::debug!(agent = %self.id, "still stuck after burst, reversing");
                sink.emit(NavEvent::new(ctx.tick, self.id, EventKind::Reversed));
            }
            EscapeAction::Teleport => {
                let waypoint = find_safe_waypoint(
                    self.router.waypoints(),
                    p,
                    view.obstacles,
                    self.radius,
                    self.escape.config().safe_clearance,
                );
                match waypoint {
                    Some(index) => {
                        if let Some(wp) = self.router.waypoints().get(index).copied() {
                            p = walkable.map_or(wp.floor(), |w| w.clamp(wp.floor()));
                            self.router.jump_to(index);
                            self.velocity = Vec2::ZERO;
                            self.steering.clear_memory();
                        }
                        tracing::debug!(agent = %self.id, index, "teleported to safe waypoint");
                    }
                    None => {
                        tracing::warn!(agent = %self.id, "stuck with no safe waypoint to teleport to")
                    }
                }
                self.escape.reset(ctx.elapsed_seconds);
                sink.emit(NavEvent::new(
                    ctx.tick,
                    self.id,
                    EventKind::Teleported { waypoint },
                ));
            }
            EscapeAction::Recovered => {
                tracing::trace!(agent = %self.id, "moving again");
            }
        }

        if self.velocity.length() > 0.001 {
            self.heading = self.velocity.heading();
        }
        let bounce = self.walk_phase.sin().abs() * BOUNCE_HEIGHT;
        self.walk_phase += dt * WALK_PHASE_RATE;

        let y = self.router.current().map_or(target.y, |wp| wp.y);
        self.position = p.with_height(y + bounce);
    }
}
