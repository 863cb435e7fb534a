//! Discretisation of the agent's situation into a hashable `State`.
//!
//! Each tick the encoder snapshots:
//! 1. Which cells in a small window around the agent are impassable.
//! 2. The quantised distance and bearing to the end point.
//! 3. The raw current under the agent.
//!
//! The resulting `State` is reduced to a `Fingerprint`, the key of the
//! serialized policy table.

use std::fmt;
use std::hash::Hasher;

use fnv::FnvHasher;

use crate::error::{NavError, Result};
use crate::simulation::flow::{FlowField, FlowVector, GridPoint};
use crate::simulation::params::{BEARING_STEP, DISTANCE_STEP, OBSTACLE_WINDOW_SIZE};

/// Passability of one obstacle-window cell.
///
/// The discriminants are part of the fingerprint encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ObstacleCell {
    #[default]
    Free = 0,
    Obstacle = -1,
}

/// Square neighbourhood of passability flags centred on the agent.
///
/// Indexed `(wx, wy)` with `wx, wy` in `[0, side)`; the agent sits at
/// `(half, half)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObstacleWindow {
    side: usize,
    cells: Vec<ObstacleCell>,
}

impl ObstacleWindow {
    /// Creates an all-free window.
    ///
    /// # Errors
    /// Returns `InvalidWindow` for even or zero sides.
    pub fn new(side: usize) -> Result<Self> {
        if side % 2 == 0 {
            return Err(NavError::InvalidWindow(side));
        }
        Ok(Self {
            side,
            cells: vec![ObstacleCell::Free; side * side],
        })
    }

    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    #[must_use]
    pub const fn half(&self) -> usize {
        (self.side - 1) / 2
    }

    /// # Panics
    /// Panics if `wx` or `wy` is not below `side`.
    #[must_use]
    pub fn get(&self, wx: usize, wy: usize) -> ObstacleCell {
        assert!(wx < self.side && wy < self.side, "window index out of range");
        self.cells[wx * self.side + wy]
    }

    /// # Panics
    /// Panics if `wx` or `wy` is not below `side`.
    pub fn set(&mut self, wx: usize, wy: usize, cell: ObstacleCell) {
        assert!(wx < self.side && wy < self.side, "window index out of range");
        self.cells[wx * self.side + wy] = cell;
    }

    /// Cells in row-major order: `wx` outer, `wy` inner.
    pub fn iter(&self) -> impl Iterator<Item = ObstacleCell> + '_ {
        self.cells.iter().copied()
    }

    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.iter().filter(|c| *c == ObstacleCell::Obstacle).count()
    }
}

impl fmt::Display for ObstacleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<&str> = self
            .iter()
            .map(|c| match c {
                ObstacleCell::Free => "Free",
                ObstacleCell::Obstacle => "Obstacle",
            })
            .collect();
        write!(f, "({})", cells.join(", "))
    }
}

/// Integer key of the policy table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub i64);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured composite key with value equality.
///
/// Two states compare equal exactly when every encoded field matches, so it
/// can key in-memory maps without any risk of hash collision.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub distance: i32,
    pub bearing: i32,
    pub current_flow: FlowVector,
    pub obstacles: Vec<ObstacleCell>,
}

impl StateKey {
    /// FNV-1a over distance, bearing, flow strength, flow angle, then every
    /// window cell in row-major order.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = FnvHasher::default();
        hasher.write_i32(self.distance);
        hasher.write_i32(self.bearing);
        hasher.write_i32(self.current_flow.strength);
        hasher.write_i32(self.current_flow.angle);
        for cell in &self.obstacles {
            hasher.write_i32(*cell as i32);
        }
        #[allow(clippy::cast_possible_wrap)]
        Fingerprint(hasher.finish() as i64)
    }
}

/// The agent's discretised situation for one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// Quantised distance (`strength`) and bearing (`angle`) to the end point
    pub distance_to_goal: FlowVector,
    /// Unquantised current under the agent
    pub current_flow: FlowVector,
    pub obstacles: ObstacleWindow,
}

impl State {
    #[must_use]
    pub fn key(&self) -> StateKey {
        StateKey {
            distance: self.distance_to_goal.strength,
            bearing: self.distance_to_goal.angle,
            current_flow: self.current_flow,
            obstacles: self.obstacles.iter().collect(),
        }
    }

    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.key().fingerprint()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.distance_to_goal, self.current_flow, self.obstacles
        )
    }
}

/// How the bearing to the goal is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BearingMode {
    /// `acos(dx / d)`: covers [0, 180] and cannot tell above from below.
    /// Tables trained against the original encoder expect this.
    #[default]
    OneSided,
    /// Mirrors the bearing into (180, 360) when the goal lies below the agent.
    Signed,
}

/// Snaps a non-negative distance to the nearest multiple of `DISTANCE_STEP`.
#[must_use]
pub fn quantize_distance(distance: i32) -> i32 {
    let lower = distance - distance % DISTANCE_STEP;
    let upper = lower + DISTANCE_STEP;
    if distance - lower < upper - distance {
        lower
    } else {
        upper
    }
}

/// Snaps degrees to the nearest multiple of `BEARING_STEP`, ties to even.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn quantize_bearing(degrees: f64) -> i32 {
    (degrees / f64::from(BEARING_STEP)).round_ties_even() as i32 * BEARING_STEP
}

/// Builds a `State` for a grid position against a fixed flow field.
#[derive(Clone, Copy, Debug)]
pub struct StateEncoder {
    window_side: usize,
    bearing_mode: BearingMode,
}

impl Default for StateEncoder {
    fn default() -> Self {
        Self {
            window_side: OBSTACLE_WINDOW_SIZE,
            bearing_mode: BearingMode::OneSided,
        }
    }
}

impl StateEncoder {
    /// # Errors
    /// Returns `InvalidWindow` if `window_side` is even or zero.
    pub fn new(window_side: usize, bearing_mode: BearingMode) -> Result<Self> {
        ObstacleWindow::new(window_side)?;
        Ok(Self {
            window_side,
            bearing_mode,
        })
    }

    #[must_use]
    pub const fn window_side(&self) -> usize {
        self.window_side
    }

    #[must_use]
    pub const fn bearing_mode(&self) -> BearingMode {
        self.bearing_mode
    }

    /// Encodes the situation at `position`.
    ///
    /// # Errors
    /// Returns `OutOfBounds` if `position` is outside the field.
    pub fn encode(&self, field: &FlowField, position: GridPoint) -> Result<State> {
        let current_flow = field.try_flow(position).ok_or(NavError::OutOfBounds {
            point: position,
            len_x: field.len_x(),
            len_y: field.len_y(),
        })?;

        Ok(State {
            distance_to_goal: self.distance_to_goal(field.end_point(), position),
            current_flow,
            obstacles: self.obstacle_window(field, position)?,
        })
    }

    /// Marks window cells that are off the field or hold the obstacle sentinel.
    ///
    /// # Errors
    /// Returns `InvalidWindow` if the configured side is invalid.
    pub fn obstacle_window(&self, field: &FlowField, position: GridPoint) -> Result<ObstacleWindow> {
        let mut window = ObstacleWindow::new(self.window_side)?;
        let half = window.half();
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let reach = half as i32;

        for dx in -reach..=reach {
            for dy in -reach..=reach {
                let blocked = field
                    .try_flow(position.offset(dx, dy))
                    .is_none_or(FlowVector::is_obstacle);
                if blocked {
                    #[allow(clippy::cast_sign_loss)]
                    let (wx, wy) = ((dx + reach) as usize, (dy + reach) as usize);
                    window.set(wx, wy, ObstacleCell::Obstacle);
                }
            }
        }

        Ok(window)
    }

    /// Quantised (distance, bearing) from `position` to `end`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn distance_to_goal(&self, end: GridPoint, position: GridPoint) -> FlowVector {
        let dx = f64::from(end.x - position.x);
        let dy = f64::from(end.y - position.y);
        let distance = dx.hypot(dy).round_ties_even() as i32;

        let bearing = if distance == 0 {
            0.0
        } else {
            let raw = (dx / f64::from(distance)).clamp(-1.0, 1.0).acos().to_degrees();
            match self.bearing_mode {
                BearingMode::OneSided => raw,
                BearingMode::Signed if dy < 0.0 => 360.0 - raw,
                BearingMode::Signed => raw,
            }
        };

        FlowVector::new(quantize_distance(distance), quantize_bearing(bearing))
    }
}
