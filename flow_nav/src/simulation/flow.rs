//! Flow field storage.
//!
//! A `FlowField` is a fixed-size grid of `FlowVector`s describing the ambient
//! current in every cell. Two reserved vectors mark impassable cells and the
//! goal cell rather than real flow.

use std::fmt;
use std::str::FromStr;

use crate::error::{NavError, Result};
use crate::simulation::params::{GOAL_ANGLE, GOAL_STRENGTH, OBSTACLE_ANGLE, OBSTACLE_STRENGTH};

/// A (strength, angle) pair. Angles are integer degrees.
///
/// Used both for map-derived currents and for agent actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlowVector {
    pub strength: i32,
    pub angle: i32,
}

impl FlowVector {
    /// Impassable cell marker.
    pub const OBSTACLE: Self = Self::new(OBSTACLE_STRENGTH, OBSTACLE_ANGLE);
    /// Goal cell marker, written by `FlowField::set_end_point`.
    pub const GOAL: Self = Self::new(GOAL_STRENGTH, GOAL_ANGLE);
    /// No current.
    pub const CALM: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(strength: i32, angle: i32) -> Self {
        Self { strength, angle }
    }

    #[must_use]
    pub fn is_obstacle(self) -> bool {
        self == Self::OBSTACLE
    }

    #[must_use]
    pub fn is_goal(self) -> bool {
        self == Self::GOAL
    }
}

impl From<(i32, i32)> for FlowVector {
    fn from((strength, angle): (i32, i32)) -> Self {
        Self::new(strength, angle)
    }
}

impl fmt::Display for FlowVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.strength, self.angle)
    }
}

/// Integer grid coordinate. `y` grows upwards (row 0 is the bottom row).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl FromStr for GridPoint {
    type Err = NavError;

    /// Parses `"(x,y)"`. Whitespace around either number is tolerated.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || NavError::InvalidPoint(s.to_string());
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let (x, y) = inner.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(x, y))
    }
}

/// Grid of flow vectors with a start and an end point.
///
/// Dimensions are fixed at construction. All cells start out `CALM`.
#[derive(Clone, Debug)]
pub struct FlowField {
    len_x: i32,
    len_y: i32,
    cells: Vec<FlowVector>,
    start_point: GridPoint,
    end_point: GridPoint,
}

impl FlowField {
    /// Creates a `len_x` by `len_y` field of calm water.
    ///
    /// # Panics
    /// Panics if either dimension is negative.
    #[must_use]
    pub fn new(len_x: i32, len_y: i32) -> Self {
        assert!(len_x >= 0 && len_y >= 0, "negative flow field dimensions");
        #[allow(clippy::cast_sign_loss)]
        let size = len_x as usize * len_y as usize;
        Self {
            len_x,
            len_y,
            cells: vec![FlowVector::CALM; size],
            start_point: GridPoint::default(),
            end_point: GridPoint::default(),
        }
    }

    #[must_use]
    pub const fn len_x(&self) -> i32 {
        self.len_x
    }

    #[must_use]
    pub const fn len_y(&self) -> i32 {
        self.len_y
    }

    /// Returns true if `point` lies inside `[0, len_x) x [0, len_y)`.
    #[must_use]
    pub const fn contains(&self, point: GridPoint) -> bool {
        point.x >= 0 && point.x < self.len_x && point.y >= 0 && point.y < self.len_y
    }

    #[allow(clippy::cast_sign_loss)]
    fn index(&self, point: GridPoint) -> Option<usize> {
        self.contains(point)
            .then(|| point.y as usize * self.len_x as usize + point.x as usize)
    }

    fn out_of_bounds(&self, point: GridPoint) -> NavError {
        NavError::OutOfBounds {
            point,
            len_x: self.len_x,
            len_y: self.len_y,
        }
    }

    /// Flow at `point`.
    ///
    /// # Panics
    /// Reading outside the field is a caller bug: check `contains` first.
    #[must_use]
    pub fn flow(&self, point: GridPoint) -> FlowVector {
        match self.try_flow(point) {
            Some(flow) => flow,
            None => panic!(
                "flow read at {point} outside {}x{} field",
                self.len_x, self.len_y
            ),
        }
    }

    /// Flow at `point`, or `None` outside the field.
    #[must_use]
    pub fn try_flow(&self, point: GridPoint) -> Option<FlowVector> {
        self.index(point).map(|i| self.cells[i])
    }

    /// Overwrites the cell at `point`.
    ///
    /// # Errors
    /// Returns `OutOfBounds` if `point` is outside the field.
    pub fn set_flow(&mut self, point: GridPoint, flow: impl Into<FlowVector>) -> Result<()> {
        let i = self.index(point).ok_or_else(|| self.out_of_bounds(point))?;
        self.cells[i] = flow.into();
        Ok(())
    }

    #[must_use]
    pub const fn start_point(&self) -> GridPoint {
        self.start_point
    }

    pub fn set_start_point(&mut self, point: GridPoint) {
        self.start_point = point;
    }

    #[must_use]
    pub const fn end_point(&self) -> GridPoint {
        self.end_point
    }

    /// Stores the end point and stamps the goal sentinel into its cell.
    ///
    /// A previously set end point keeps its goal marker.
    ///
    /// # Errors
    /// Returns `OutOfBounds` if `point` is outside the field; nothing is
    /// changed in that case.
    pub fn set_end_point(&mut self, point: GridPoint) -> Result<()> {
        self.set_flow(point, FlowVector::GOAL)?;
        self.end_point = point;
        Ok(())
    }

    /// Iterates over every cell as `(point, flow)`, bottom row first.
    pub fn cells(&self) -> impl Iterator<Item = (GridPoint, FlowVector)> + '_ {
        let len_x = self.len_x.max(1);
        self.cells.iter().enumerate().map(move |(i, flow)| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let i = i as i32;
            (GridPoint::new(i % len_x, i / len_x), *flow)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_is_calm() {
        let field = FlowField::new(4, 3);
        assert_eq!(field.len_x(), 4);
        assert_eq!(field.len_y(), 3);
        assert!(field.cells().all(|(_, f)| f == FlowVector::CALM));
        assert_eq!(field.cells().count(), 12);
    }

    #[test]
    fn test_contains_edges() {
        let field = FlowField::new(4, 3);
        assert!(field.contains(GridPoint::new(0, 0)));
        assert!(field.contains(GridPoint::new(3, 2)));
        assert!(!field.contains(GridPoint::new(4, 0)));
        assert!(!field.contains(GridPoint::new(0, 3)));
        assert!(!field.contains(GridPoint::new(-1, 0)));
        assert!(!field.contains(GridPoint::new(0, -1)));
    }

    #[test]
    fn test_cells_iterates_row_by_row() {
        let mut field = FlowField::new(3, 2);
        field.set_flow(GridPoint::new(2, 1), (4, 90)).unwrap();
        let (point, flow) = field.cells().last().unwrap();
        assert_eq!(point, GridPoint::new(2, 1));
        assert_eq!(flow, FlowVector::new(4, 90));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_flow_out_of_bounds_panics() {
        let field = FlowField::new(2, 2);
        let _ = field.flow(GridPoint::new(2, 0));
    }

    #[test]
    fn test_point_parsing() {
        assert_eq!("(5,5)".parse::<GridPoint>().unwrap(), GridPoint::new(5, 5));
        assert_eq!(
            " ( 12 , -3 ) ".parse::<GridPoint>().unwrap(),
            GridPoint::new(12, -3)
        );
        assert!("5,5".parse::<GridPoint>().is_err());
        assert!("(5;5)".parse::<GridPoint>().is_err());
        assert!("(a,5)".parse::<GridPoint>().is_err());
    }

    #[test]
    fn test_sentinels() {
        assert!(FlowVector::new(-1, -1).is_obstacle());
        assert!(FlowVector::new(10, 10).is_goal());
        assert!(!FlowVector::new(-1, 0).is_obstacle());
        assert_eq!(FlowVector::GOAL.to_string(), "(10, 10)");
    }
}
