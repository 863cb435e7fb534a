//! End-to-end runs from an on-disk config, map and policy table.

use std::fs;
use std::path::Path;

use flow_nav::config::AgentConfig;
use flow_nav::simulation::flow::GridPoint;
use flow_nav::simulation::state::StateEncoder;
use flow_nav::simulation::{Episode, TickOutcome};
use flow_nav::ui::DashboardState;
use image::{Rgba, RgbaImage};

const WATER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const ROCK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// 12x12 open water with a rock at picture pixel (6, 5), i.e. grid (6, 6).
fn write_map(dir: &Path) {
    let mut img = RgbaImage::from_pixel(12, 12, WATER);
    img.put_pixel(6, 5, ROCK);
    img.save(dir.join("map.png")).unwrap();
}

fn write_config(dir: &Path, extra: &str) -> AgentConfig {
    let json = format!(
        r#"{{
            "WorkingDir": {dir:?},
            "MapPNGPath": "map.png",
            "InputQArrayPath": "q.txt",
            "StartPosition": "(2,6)",
            "EndPosition": "(10,6)",
            "ColorMap": ["(255,255,255)  (0,0)  water"]
            {extra}
        }}"#,
        dir = dir.display().to_string()
    );
    let path = dir.join("appsettings.json");
    fs::write(&path, json).unwrap();
    AgentConfig::load(&path).unwrap()
}

#[test]
fn test_empty_table_runs_into_rock() {
    let dir = tempfile::tempdir().unwrap();
    write_map(dir.path());
    fs::write(dir.path().join("q.txt"), "garbage\n").unwrap();
    let config = write_config(dir.path(), "");

    let nav = config.build_navigator(false).unwrap();
    assert_eq!(nav.table().len(), 0);
    assert_eq!(nav.table().skipped_records(), 1);
    assert!(nav.field().flow(GridPoint::new(10, 6)).is_goal());
    assert!(nav.field().flow(GridPoint::new(6, 6)).is_obstacle());

    let summary = Episode::new(&nav, config.start(false).unwrap())
        .unwrap()
        .run(config.max_ticks)
        .unwrap();
    assert_eq!(summary.outcome, TickOutcome::Collision);
    assert_eq!(summary.trajectory.last(), Some(&GridPoint::new(6, 6)));
}

#[test]
fn test_trained_rows_route_around_rock() {
    let dir = tempfile::tempdir().unwrap();
    write_map(dir.path());
    let config = write_config(dir.path(), r#", "ActionStrength": 2"#);

    // Build the table from the states the agent will actually see:
    // north-east, east, east, south-east around the rock.
    let probe = config.build_navigator(false);
    assert!(probe.is_err(), "policy file does not exist yet");

    fs::write(dir.path().join("q.txt"), "").unwrap();
    let nav = config.build_navigator(false).unwrap();
    let encoder = StateEncoder::default();
    let route = [
        (GridPoint::new(2, 6), 1),
        (GridPoint::new(4, 8), 0),
        (GridPoint::new(6, 8), 0),
        (GridPoint::new(8, 8), 7),
    ];
    let mut lines = String::new();
    for (point, action) in route {
        let key = encoder.encode(nav.field(), point).unwrap().fingerprint();
        let mut values = vec!["0,0"; 8];
        values[action] = "1,0";
        lines.push_str(&format!("{key}: {}\n", values.join(" ")));
    }
    fs::write(dir.path().join("q.txt"), lines).unwrap();

    let nav = config.build_navigator(false).unwrap();
    let summary = Episode::new(&nav, config.start(false).unwrap())
        .unwrap()
        .run(config.max_ticks)
        .unwrap();

    assert_eq!(summary.outcome, TickOutcome::GoalReached);
    assert_eq!(summary.table_hits, 4);
    assert_eq!(summary.trajectory.last(), Some(&GridPoint::new(10, 6)));
}

#[test]
fn test_dashboard_reflects_report() {
    let dir = tempfile::tempdir().unwrap();
    write_map(dir.path());
    fs::write(dir.path().join("q.txt"), "").unwrap();
    let config = write_config(dir.path(), "");
    let nav = config.build_navigator(false).unwrap();

    let report = nav.tick(GridPoint::new(2, 6)).unwrap();
    let dash = DashboardState::from_report(1, &report);

    assert_eq!(dash.position, GridPoint::new(4, 6));
    assert_eq!(dash.distance, 9);
    assert_eq!(dash.bearing, 0);
    assert!(!dash.table_hit);
    let hud = dash.hud_line();
    assert!(hud.contains("miss"));
    assert!(hud.contains("continue"));
}
