use std::collections::{BTreeMap, HashMap};

use anyhow::Context;
use patrol_core::{
    clamp_dt, AgentId, AgentState, FloorError, Obstacle, Rect, Result, TickContext, Vec2, Vec3,
};
use patrol_nav::{
    Agent, AgentConfig, EventKind, EventSink, FloorView, NavEvent, NavTuning, VecEventSink,
};

use crate::{AgentSnapshot, FloorSnapshot, ObstacleRecord, ScenarioConfig};

/// Registry of agents sharing one floor.
///
/// Agents are ticked in ascending [`AgentId`] order and never read each other, so results do not
/// depend on registration timing within a frame.
#[derive(Debug)]
pub struct Floor {
    agents: BTreeMap<AgentId, Agent>,
    names: HashMap<String, AgentId>,
    obstacles: Vec<Obstacle>,
    bounds: Option<Rect>,
    tuning: NavTuning,
    next_id: u64,
    tick: u64,
    elapsed_seconds: f64,
    events: VecEventSink,
}

/// Stable, copyable reference to a registered agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentHandle {
    id: AgentId,
}

impl AgentHandle {
    pub fn id(self) -> AgentId {
        self.id
    }

    pub fn position(self, floor: &Floor) -> Result<Vec3> {
        floor.position(self.id)
    }

    pub fn state(self, floor: &Floor) -> Result<AgentState> {
        floor.state(self.id)
    }

    pub fn set_state(self, floor: &mut Floor, state: AgentState) -> Result<()> {
        floor.set_state(self.id, state)
    }

    pub fn set_injured(self, floor: &mut Floor) -> Result<()> {
        floor.set_state(self.id, AgentState::Injured)
    }

    /// Clear an injury; the agent resumes as idle.
    pub fn recover(self, floor: &mut Floor) -> Result<()> {
        floor.set_state(self.id, AgentState::Idle)
    }
}

impl Floor {
    pub fn new(bounds: Option<Rect>) -> Result<Self> {
        Self::with_tuning(bounds, NavTuning::default())
    }

    pub fn with_tuning(bounds: Option<Rect>, tuning: NavTuning) -> Result<Self> {
        let mut floor = Self {
            agents: BTreeMap::new(),
            names: HashMap::new(),
            obstacles: Vec::new(),
            bounds: None,
            tuning,
            next_id: 0,
            tick: 0,
            elapsed_seconds: 0.0,
            events: VecEventSink::default(),
        };
        floor.set_bounds(bounds)?;
        Ok(floor)
    }

    /// Build a floor with the scenario's bounds, obstacles and agents.
    pub fn from_scenario(scenario: &ScenarioConfig) -> anyhow::Result<Self> {
        let mut floor = Self::with_tuning(scenario.bounds, scenario.tuning)
            .context("Invalid scenario bounds")?;
        floor.set_obstacles(scenario.obstacle_records());
        for agent in &scenario.agents {
            floor
                .register(agent.clone())
                .with_context(|| format!("Failed to register agent {}", agent.name))?;
        }
        Ok(floor)
    }

    pub fn register(&mut self, config: AgentConfig) -> Result<AgentHandle> {
        if self.names.contains_key(&config.name) {
            return Err(FloorError::DuplicateAgent(config.name));
        }
        let id = AgentId(self.next_id);
        let name = config.name.clone();
        let agent = Agent::new(id, config, &self.tuning)?;

        self.next_id += 1;
        self.names.insert(name.clone(), id);
        self.agents.insert(id, agent);
        tracing::debug!(agent = %id, name = %name, "registered agent");
        self.events.emit(NavEvent::new(
            self.tick,
            id,
            EventKind::Registered { name },
        ));
        Ok(AgentHandle { id })
    }

    /// Advance every agent by `dt` seconds (clamped to `[0, 0.1]`).
    pub fn tick(&mut self, dt: f32) -> TickContext {
        let dt = clamp_dt(dt);
        self.tick += 1;
        self.elapsed_seconds += f64::from(dt);
        let ctx = TickContext::new(self.tick, dt, self.elapsed_seconds);

        let view = FloorView::new(&self.obstacles, self.bounds);
        for agent in self.agents.values_mut() {
            agent.tick(&ctx, &view, &mut self.events);
        }
        ctx
    }

    fn get(&self, id: AgentId) -> Result<&Agent> {
        self.agents.get(&id).ok_or(FloorError::AgentNotFound(id))
    }

    pub fn agent(&self, id: AgentId) -> Result<&Agent> {
        self.get(id)
    }

    pub fn position(&self, id: AgentId) -> Result<Vec3> {
        self.get(id).map(Agent::position)
    }

    pub fn velocity(&self, id: AgentId) -> Result<Vec2> {
        self.get(id).map(Agent::velocity)
    }

    pub fn state(&self, id: AgentId) -> Result<AgentState> {
        self.get(id).map(Agent::state)
    }

    pub fn find(&self, name: &str) -> Option<AgentId> {
        self.names.get(name).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Closest agent to `point` by 3D distance; ties go to the lower id.
    pub fn nearest_agent(&self, point: Vec3) -> Option<AgentId> {
        self.agents
            .values()
            .map(|agent| (agent.id(), agent.position().distance(point)))
            .fold(None, |best: Option<(AgentId, f32)>, (id, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((id, d)),
            })
            .map(|(id, _)| id)
    }

    pub fn set_state(&mut self, id: AgentId, state: AgentState) -> Result<()> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(FloorError::AgentNotFound(id))?;
        agent.set_state(state, self.tick, &mut self.events);
        Ok(())
    }

    /// Replace the obstacle list. Unusable records are skipped; returns how many were kept.
    pub fn set_obstacles(&mut self, records: impl IntoIterator<Item = ObstacleRecord>) -> usize {
        self.obstacles.clear();
        for (index, record) in records.into_iter().enumerate() {
            match record.to_obstacle() {
                Some(obstacle) => self.obstacles.push(obstacle),
                None => tracing::warn!(index, ?record, "skipping obstacle with unusable geometry"),
            }
        }
        self.obstacles.len()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn set_bounds(&mut self, bounds: Option<Rect>) -> Result<()> {
        if let Some(rect) = bounds {
            if !rect.is_valid() {
                return Err(FloorError::InvalidBounds(format!("{rect:?}")));
            }
        }
        self.bounds = bounds;
        Ok(())
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Notifications emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<NavEvent> {
        self.events.drain()
    }

    pub fn snapshot(&self) -> FloorSnapshot {
        FloorSnapshot {
            tick: self.tick,
            elapsed_seconds: self.elapsed_seconds,
            agents: self.agents.values().map(AgentSnapshot::from).collect(),
        }
    }
}
