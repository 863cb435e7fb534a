//! Combining an action with the ambient current into a grid step.

use std::fmt;

use crate::simulation::flow::{FlowField, FlowVector, GridPoint};

/// Cartesian step of a (strength, angle) vector.
///
/// The unit-circle components are rounded to {-1, 0, 1} before scaling, so
/// every step is axis-aligned or diagonal.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn component_delta(vector: FlowVector) -> (i32, i32) {
    let radians = f64::from(vector.angle).to_radians();
    let ux = radians.cos().round_ties_even() as i32;
    let uy = radians.sin().round_ties_even() as i32;
    (
        ux.saturating_mul(vector.strength),
        uy.saturating_mul(vector.strength),
    )
}

/// Breakdown of one tick's motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Displacement {
    /// Step contributed by the chosen action
    pub boat: (i32, i32),
    /// Step contributed by the current
    pub flow: (i32, i32),
    /// `boat + flow`
    pub total: (i32, i32),
    /// `atan2(dy, dx)` of the total step, radians
    pub facing: f64,
}

impl Displacement {
    #[must_use]
    pub const fn apply(&self, position: GridPoint) -> GridPoint {
        position.offset(self.total.0, self.total.1)
    }
}

/// Adds the action step and the current step per axis, saturating at the
/// `i32` range.
#[must_use]
pub fn resolve(action: FlowVector, current: FlowVector) -> Displacement {
    let boat = component_delta(action);
    let flow = component_delta(current);
    let total = (boat.0.saturating_add(flow.0), boat.1.saturating_add(flow.1));
    Displacement {
        boat,
        flow,
        total,
        facing: f64::from(total.1).atan2(f64::from(total.0)),
    }
}

/// What the host should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Agent is on an obstacle cell or off the field
    Collision,
    GoalReached,
}

impl TickOutcome {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Continue => "continue",
            Self::Collision => "collision",
            Self::GoalReached => "goal reached",
        };
        f.write_str(label)
    }
}

/// Checks the cell at `position` against the sentinels.
#[must_use]
pub fn classify(field: &FlowField, position: GridPoint) -> TickOutcome {
    match field.try_flow(position) {
        None => TickOutcome::Collision,
        Some(flow) if flow.is_obstacle() => TickOutcome::Collision,
        Some(flow) if flow.is_goal() => TickOutcome::GoalReached,
        Some(_) => TickOutcome::Continue,
    }
}
