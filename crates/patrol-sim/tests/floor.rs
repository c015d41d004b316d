use patrol_sim::{
    AgentConfig, AgentId, AgentState, EventKind, Floor, FloorError, ObstacleRecord, Rect, Vec3,
    Waypoint,
};
use proptest::prelude::*;

fn floor() -> Floor {
    Floor::new(Some(Rect::new(-10.0, 10.0, -10.0, 10.0))).expect("valid bounds")
}

fn walker(name: &str, x: f32, z: f32) -> AgentConfig {
    AgentConfig::new(
        name,
        Vec3::new(x, 0.0, z),
        vec![Waypoint::new(x + 3.0, 0.0, z), Waypoint::new(x, 0.0, z)],
    )
    .with_speed(1.0)
}

#[test]
fn register_hands_out_sequential_ids_and_notifies() {
    let mut floor = floor();
    let a = floor.register(walker("a", 0.0, 0.0)).expect("register a");
    let b = floor.register(walker("b", 0.0, 4.0)).expect("register b");

    assert_eq!(a.id(), AgentId(0));
    assert_eq!(b.id(), AgentId(1));
    assert_eq!(floor.find("b"), Some(b.id()));
    assert_eq!(floor.ids().collect::<Vec<_>>(), vec![AgentId(0), AgentId(1)]);

    let events = floor.drain_events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].kind,
        EventKind::Registered {
            name: "a".to_string()
        }
    );
    assert!(floor.drain_events().is_empty());
}

#[test]
fn duplicate_names_are_rejected() {
    let mut floor = floor();
    floor.register(walker("a", 0.0, 0.0)).expect("register");
    assert_eq!(
        floor.register(walker("a", 1.0, 1.0)),
        Err(FloorError::DuplicateAgent("a".to_string()))
    );
    assert_eq!(floor.len(), 1);
}

#[test]
fn unknown_ids_report_not_found() {
    let mut floor = floor();
    let missing = AgentId(42);
    assert_eq!(floor.position(missing), Err(FloorError::AgentNotFound(missing)));
    assert_eq!(floor.state(missing), Err(FloorError::AgentNotFound(missing)));
    assert_eq!(
        floor.set_state(missing, AgentState::Injured),
        Err(FloorError::AgentNotFound(missing))
    );
}

#[test]
fn injury_freezes_until_recovered() {
    let mut floor = floor();
    let handle = floor.register(walker("a", 0.0, 0.0)).expect("register");
    for _ in 0..10 {
        floor.tick(1.0 / 60.0);
    }

    handle.set_injured(&mut floor).expect("injure");
    let frozen = handle.position(&floor).expect("position");
    for _ in 0..60 {
        floor.tick(1.0 / 60.0);
    }
    assert_eq!(handle.position(&floor).expect("position"), frozen);
    assert_eq!(handle.state(&floor), Ok(AgentState::Injured));

    handle.recover(&mut floor).expect("recover");
    for _ in 0..10 {
        floor.tick(1.0 / 60.0);
    }
    assert_ne!(handle.position(&floor).expect("position"), frozen);

    let changes: Vec<_> = floor
        .drain_events()
        .into_iter()
        .filter_map(|e| match e.kind {
            EventKind::StateChanged { from, to } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert!(changes.contains(&(AgentState::Walking, AgentState::Injured)));
    assert!(changes.contains(&(AgentState::Injured, AgentState::Idle)));
}

#[test]
fn nearest_agent_prefers_lower_id_on_ties() {
    let mut floor = floor();
    assert_eq!(floor.nearest_agent(Vec3::ZERO), None);

    let a = floor.register(walker("a", -2.0, 0.0)).expect("register");
    let _b = floor.register(walker("b", 2.0, 0.0)).expect("register");
    let c = floor.register(walker("c", 0.0, 5.0)).expect("register");

    assert_eq!(floor.nearest_agent(Vec3::ZERO), Some(a.id()));
    assert_eq!(floor.nearest_agent(Vec3::new(0.0, 0.0, 4.0)), Some(c.id()));
}

#[test]
fn unusable_obstacle_records_are_skipped() {
    let mut floor = floor();
    let kept = floor.set_obstacles(vec![
        ObstacleRecord {
            center_x: Some(0.0),
            center_z: Some(0.0),
            length: Some(2.0),
            width: Some(1.0),
        },
        ObstacleRecord {
            center_x: Some(3.0),
            center_z: None,
            length: Some(2.0),
            width: Some(1.0),
        },
        ObstacleRecord {
            center_x: Some(3.0),
            center_z: Some(3.0),
            length: Some(f32::NAN),
            width: Some(1.0),
        },
    ]);
    assert_eq!(kept, 1);
    assert_eq!(floor.obstacles().len(), 1);
}

#[test]
fn invalid_bounds_are_rejected() {
    assert!(matches!(
        Floor::new(Some(Rect::new(5.0, -5.0, 0.0, 1.0))),
        Err(FloorError::InvalidBounds(_))
    ));
    let mut floor = floor();
    assert!(floor.set_bounds(Some(Rect::new(0.0, f32::NAN, 0.0, 1.0))).is_err());
    assert!(floor.bounds().is_some());
    floor.set_bounds(None).expect("unbounded");
    assert!(floor.bounds().is_none());
}

#[test]
fn snapshot_serializes_to_json() {
    let mut floor = floor();
    floor.register(walker("a", 0.0, 0.0)).expect("register");
    floor.tick(0.05);

    let snapshot = floor.snapshot();
    assert_eq!(snapshot.tick, 1);
    assert_eq!(snapshot.agents.len(), 1);
    assert_eq!(snapshot.agents[0].state, AgentState::Walking);

    let json = serde_json::to_string(&snapshot).expect("serialize");
    assert!(json.contains("\"state\":\"walking\""));
    let back: patrol_sim::FloorSnapshot = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, snapshot);
}

#[test]
fn ticking_is_deterministic() {
    let run = || {
        let mut floor = floor();
        floor.set_obstacles(vec![ObstacleRecord {
            center_x: Some(1.5),
            center_z: Some(0.0),
            length: Some(1.0),
            width: Some(2.0),
        }]);
        floor.register(walker("a", 0.0, 0.0)).expect("register");
        floor.register(walker("b", -3.0, 2.0)).expect("register");
        for _ in 0..600 {
            floor.tick(1.0 / 60.0);
        }
        (floor.snapshot(), floor.drain_events())
    };
    assert_eq!(run(), run());
}

proptest! {
    #[test]
    fn dt_is_clamped(dt in prop::num::f32::ANY) {
        let mut floor = floor();
        let ctx = floor.tick(dt);
        prop_assert!(ctx.dt_seconds >= 0.0 && ctx.dt_seconds <= 0.1);
        prop_assert!(floor.elapsed_seconds() <= 0.1 + 1e-6);
    }
}
