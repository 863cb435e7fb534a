pub mod field;
pub mod render;

use crate::simulation::agent::TickReport;
use crate::simulation::flow::GridPoint;
use crate::simulation::motion::TickOutcome;

/// Snapshot of the last tick for HUD rendering.
#[derive(Clone, Debug)]
pub struct DashboardState {
    pub tick: u64,
    pub position: GridPoint,
    pub facing_degrees: f64,
    pub distance: i32,
    pub bearing: i32,
    pub current: (i32, i32),
    pub action_index: usize,
    pub table_hit: bool,
    pub obstacles_nearby: usize,
    pub outcome: TickOutcome,
}

impl DashboardState {
    /// State shown before the first tick.
    #[must_use]
    pub fn idle(position: GridPoint, outcome: TickOutcome) -> Self {
        Self {
            tick: 0,
            position,
            facing_degrees: 0.0,
            distance: 0,
            bearing: 0,
            current: (0, 0),
            action_index: 0,
            table_hit: false,
            obstacles_nearby: 0,
            outcome,
        }
    }

    #[must_use]
    pub fn from_report(tick: u64, report: &TickReport) -> Self {
        Self {
            tick,
            position: report.new_position,
            facing_degrees: report.displacement.facing.to_degrees(),
            distance: report.state.distance_to_goal.strength,
            bearing: report.state.distance_to_goal.angle,
            current: (report.state.current_flow.strength, report.state.current_flow.angle),
            action_index: report.selection.index,
            table_hit: report.selection.hit,
            obstacles_nearby: report.state.obstacles.obstacle_count(),
            outcome: report.outcome,
        }
    }

    #[must_use]
    pub fn hud_line(&self) -> String {
        let lookup = if self.table_hit { "hit" } else { "miss" };
        format!(
            "Tick: {} | Pos: {} | Dist: {} | Brg: {} | Flow: ({}, {}) | Act: {} ({}) | Hdg: {:.0} | Obs: {} | {}",
            self.tick,
            self.position,
            self.distance,
            self.bearing,
            self.current.0,
            self.current.1,
            self.action_index,
            lookup,
            self.facing_degrees,
            self.obstacles_nearby,
            self.outcome,
        )
    }
}
