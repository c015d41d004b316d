use patrol_sim::{EventKind, Floor, ScenarioConfig, Vec2};

#[test]
fn factory_floor_runs_clean_for_two_minutes() {
    let scenario = ScenarioConfig::factory();
    let mut floor = Floor::from_scenario(&scenario).expect("factory scenario");
    assert_eq!(floor.len(), 3);
    assert_eq!(floor.obstacles().len(), 2);

    let walkable = floor.bounds().expect("bounds").inset(0.25);
    let obstacles: Vec<_> = floor.obstacles().iter().map(|o| o.expanded(0.25)).collect();
    let ids: Vec<_> = floor.ids().collect();

    for _ in 0..(120 * 60) {
        floor.tick(1.0 / 60.0);
        for &id in &ids {
            let agent = floor.agent(id).expect("agent");
            let p = agent.position();
            let p = Vec2::new(p.x, p.z);
            assert!(walkable.contains(p), "{} left the floor at {p:?}", agent.name());
            for rect in &obstacles {
                assert!(!rect.contains_strict(p), "{} inside a belt at {p:?}", agent.name());
            }
            if !agent.escape().is_bursting() {
                assert!(agent.velocity().length() <= agent.max_speed() + 1e-4);
            }
        }
    }

    let events = floor.drain_events();
    for &id in &ids {
        let arrivals = events
            .iter()
            .filter(|e| e.agent == id && matches!(e.kind, EventKind::WaypointReached { .. }))
            .count();
        assert!(arrivals >= 2, "{id} reached only {arrivals} waypoints");
    }
}
