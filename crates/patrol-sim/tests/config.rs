use std::io::Write;

use patrol_sim::{AgentState, Floor, ScenarioConfig};

fn write_scenario(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(yaml.as_bytes()).expect("write scenario");
    file
}

#[test]
fn loads_yaml_with_defaults() {
    let file = write_scenario(
        r#"
name: small
belts:
  - id: line-1
    position: { x: 0.0, z: 2.0 }
obstacles:
  - { center_x: 5.0, center_z: 5.0, length: 1.0, width: 1.0 }
  - { center_x: 5.0, length: 1.0, width: 1.0 }
agents:
  - name: w1
    start: { x: -5.0, z: 0.0 }
    waypoints:
      - { x: 5.0, z: 0.0 }
      - { x: -5.0, z: 0.0, dwell_seconds: 0.0 }
  - name: post
    start: { x: 0.0, z: -5.0 }
    waypoints:
      - { x: 0.0, z: -5.0 }
    max_speed: 0.0
    initial_state: working
tuning:
  arrival_threshold: 0.3
  escape:
    cooldown: 1.0
"#,
    );

    let scenario = ScenarioConfig::load(file.path()).expect("load");
    assert_eq!(scenario.name.as_deref(), Some("small"));
    assert_eq!(scenario.bounds, ScenarioConfig::empty().bounds);

    let belt = &scenario.belts[0];
    assert_eq!((belt.length, belt.width), (6.0, 1.0));

    let w1 = &scenario.agents[0];
    assert_eq!(w1.max_speed, 1.5);
    assert_eq!(w1.radius, 0.25);
    assert_eq!(w1.initial_state, AgentState::Idle);
    assert_eq!(w1.waypoints[0].dwell_seconds, 1.0);
    assert_eq!(w1.waypoints[1].dwell_seconds, 0.0);
    assert!(scenario.agents[1].is_stationary());

    assert_eq!(scenario.tuning.arrival_threshold, 0.3);
    assert_eq!(scenario.tuning.escape.cooldown, 1.0);
    assert_eq!(scenario.tuning.escape.burst_duration, 0.2);

    let floor = Floor::from_scenario(&scenario).expect("floor");
    // The belt plus one complete obstacle record.
    assert_eq!(floor.obstacles().len(), 2);
    assert!((floor.obstacles()[0].width - 0.9).abs() < 1e-6);
    assert_eq!(floor.len(), 2);
}

#[test]
fn null_bounds_disable_clamping() {
    let file = write_scenario("bounds: null\n");
    let scenario = ScenarioConfig::load(file.path()).expect("load");
    assert!(scenario.bounds.is_none());
    assert!(scenario.agents.is_empty());
}

#[test]
fn factory_round_trips_through_yaml() {
    let factory = ScenarioConfig::factory();
    let yaml = factory.to_yaml().expect("yaml");
    let file = write_scenario(&yaml);
    assert_eq!(ScenarioConfig::load(file.path()).expect("load"), factory);
}

#[test]
fn errors_name_the_file() {
    let missing = std::path::Path::new("/definitely/not/here.yaml");
    let err = ScenarioConfig::load(missing).expect_err("missing file");
    assert!(format!("{err:#}").contains("here.yaml"));

    let file = write_scenario("agents: [1, 2");
    let err = ScenarioConfig::load(file.path()).expect_err("bad yaml");
    assert!(err.to_string().contains("Failed to parse scenario"));
}

#[test]
fn duplicate_agent_names_fail_the_scenario() {
    let mut scenario = ScenarioConfig::factory();
    let copy = scenario.agents[0].clone();
    scenario.agents.push(copy);
    let err = Floor::from_scenario(&scenario).expect_err("duplicate");
    assert!(format!("{err:#}").contains("worker-1"));
}
