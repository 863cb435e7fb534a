use flow_nav::simulation::actions::ActionCatalog;
use flow_nav::simulation::flow::{FlowField, FlowVector, GridPoint};
use flow_nav::simulation::policy::PolicyTable;
use flow_nav::simulation::state::StateEncoder;
use flow_nav::simulation::{Episode, Navigator, TickOutcome};
use flow_nav::NavError;

fn corridor(end: GridPoint) -> FlowField {
    let mut field = FlowField::new(10, 10);
    field.set_end_point(end).unwrap();
    field
}

fn navigator(field: FlowField, table: PolicyTable) -> Navigator {
    Navigator::new(field, table, ActionCatalog::default(), StateEncoder::default())
}

#[test]
fn test_unseen_states_go_east_to_goal() {
    let nav = navigator(corridor(GridPoint::new(8, 5)), PolicyTable::new());
    let summary = Episode::new(&nav, GridPoint::new(2, 5)).unwrap().run(100).unwrap();

    assert_eq!(summary.outcome, TickOutcome::GoalReached);
    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.table_hits, 0);
    assert_eq!(summary.table_misses, 3);
    assert_eq!(
        summary.trajectory,
        vec![
            GridPoint::new(2, 5),
            GridPoint::new(4, 5),
            GridPoint::new(6, 5),
            GridPoint::new(8, 5),
        ]
    );
}

#[test]
fn test_obstacle_ends_run() {
    let mut field = corridor(GridPoint::new(8, 5));
    field.set_flow(GridPoint::new(6, 5), FlowVector::OBSTACLE).unwrap();
    let nav = navigator(field, PolicyTable::new());
    let summary = Episode::new(&nav, GridPoint::new(2, 5)).unwrap().run(100).unwrap();

    assert_eq!(summary.outcome, TickOutcome::Collision);
    assert_eq!(summary.ticks, 2);
}

#[test]
fn test_table_hit_steers_agent() {
    let field = corridor(GridPoint::new(8, 8));
    let start = GridPoint::new(2, 2);
    let state = StateEncoder::default().encode(&field, start).unwrap();
    let key = state.fingerprint();
    let mut table = PolicyTable::new();
    table.insert_state(&state.key(), vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

    let nav = navigator(field, table);
    let report = nav.tick(start).unwrap();

    assert!(report.selection.hit);
    assert_eq!(report.selection.index, 2);
    assert_eq!(report.action, FlowVector::new(2, 90));
    assert_eq!(report.new_position, GridPoint::new(2, 4));
    assert_eq!(report.outcome, TickOutcome::Continue);
    assert_eq!(report.fingerprint, key);
}

#[test]
fn test_current_is_added_to_action() {
    let mut field = corridor(GridPoint::new(8, 8));
    field.set_flow(GridPoint::new(3, 3), (1, 180)).unwrap();
    let nav = navigator(field, PolicyTable::new());
    let report = nav.tick(GridPoint::new(3, 3)).unwrap();

    assert_eq!(report.displacement.total, (1, 0));
    assert_eq!(report.new_position, GridPoint::new(4, 3));
}

#[test]
fn test_leaving_the_field_is_a_collision() {
    let nav = navigator(corridor(GridPoint::new(2, 2)), PolicyTable::new());
    let report = nav.tick(GridPoint::new(8, 5)).unwrap();
    assert_eq!(report.new_position, GridPoint::new(10, 5));
    assert_eq!(report.outcome, TickOutcome::Collision);
}

#[test]
fn test_tick_outside_field_is_an_error() {
    let nav = navigator(corridor(GridPoint::new(2, 2)), PolicyTable::new());
    assert!(matches!(
        nav.tick(GridPoint::new(-1, 0)),
        Err(NavError::OutOfBounds { .. })
    ));
    assert!(Episode::new(&nav, GridPoint::new(10, 10)).is_err());
}

#[test]
fn test_terminal_start_never_ticks() {
    let mut field = corridor(GridPoint::new(8, 8));
    field.set_flow(GridPoint::new(1, 1), FlowVector::OBSTACLE).unwrap();
    let nav = navigator(field, PolicyTable::new());

    let mut episode = Episode::new(&nav, GridPoint::new(1, 1)).unwrap();
    assert_eq!(episode.outcome(), TickOutcome::Collision);
    assert!(episode.step().unwrap().is_none());
}

#[test]
fn test_tick_cap_stops_stalled_agent() {
    let mut field = corridor(GridPoint::new(8, 8));
    // Current exactly cancels the default eastward action.
    field.set_flow(GridPoint::new(4, 4), (2, 180)).unwrap();
    let nav = navigator(field, PolicyTable::new());

    let summary = Episode::new(&nav, GridPoint::new(4, 4)).unwrap().run(5).unwrap();
    assert_eq!(summary.outcome, TickOutcome::Continue);
    assert_eq!(summary.ticks, 5);
    assert!(summary.trajectory.iter().all(|p| *p == GridPoint::new(4, 4)));
}

#[test]
fn test_ticks_are_repeatable() {
    let nav = navigator(corridor(GridPoint::new(8, 8)), PolicyTable::new());
    let a = nav.tick(GridPoint::new(3, 6)).unwrap();
    let b = nav.tick(GridPoint::new(3, 6)).unwrap();
    assert_eq!(a.state, b.state);
    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(a.new_position, b.new_position);
}
