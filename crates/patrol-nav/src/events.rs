use patrol_core::{AgentId, AgentState, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Something observable that happened to one agent during a tick.
///
/// Plain data so hosts can record it, print it, or forward it to their own callbacks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavEvent {
    pub tick: u64,
    pub agent: AgentId,
    pub kind: EventKind,
}

impl NavEvent {
    pub fn new(tick: u64, agent: AgentId, kind: EventKind) -> Self {
        Self { tick, agent, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum EventKind {
    Registered {
        name: String,
    },
    /// Only emitted when the state actually changes.
    StateChanged {
        from: AgentState,
        to: AgentState,
    },
    /// First tick inside the arrival radius of waypoint `index`.
    WaypointReached {
        index: usize,
    },
    EscapeStarted {
        velocity: Vec2,
    },
    EscapeFinished,
    Reversed,
    /// `waypoint` is `None` when no waypoint was far enough from every obstacle.
    Teleported {
        waypoint: Option<usize>,
    },
}

impl EventKind {
    pub fn tag(&self) -> &'static str {
        match self {
            EventKind::Registered { .. } => "registered",
            EventKind::StateChanged { .. } => "state_changed",
            EventKind::WaypointReached { .. } => "waypoint_reached",
            EventKind::EscapeStarted { .. } => "escape_started",
            EventKind::EscapeFinished => "escape_finished",
            EventKind::Reversed => "reversed",
            EventKind::Teleported { .. } => "teleported",
        }
    }
}

pub trait EventSink {
    fn emit(&mut self, event: NavEvent);
}

#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&mut self, _event: NavEvent) {}
}

#[derive(Debug, Default)]
pub struct VecEventSink {
    pub events: Vec<NavEvent>,
}

impl VecEventSink {
    pub fn drain(&mut self) -> Vec<NavEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, tag: &str) -> usize {
        self.events.iter().filter(|e| e.kind.tag() == tag).count()
    }
}

impl EventSink for VecEventSink {
    fn emit(&mut self, event: NavEvent) {
        self.events.push(event);
    }
}
