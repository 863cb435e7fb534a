use crate::simulation::flow::{FlowField, FlowVector, GridPoint};
use rayon::prelude::*;

/// Arrow glyphs for the eight 45 degree sectors, starting at 0 degrees.
const ARROWS: [char; 8] = ['>', '/', '^', '\\', '<', '/', 'v', '\\'];
pub const OBSTACLE_CHAR: char = '#';
pub const GOAL_CHAR: char = '@';
pub const CALM_CHAR: char = '.';

/// Glyph for a single cell.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn cell_char(flow: FlowVector) -> char {
    if flow.is_obstacle() {
        OBSTACLE_CHAR
    } else if flow.is_goal() {
        GOAL_CHAR
    } else if flow.strength == 0 {
        CALM_CHAR
    } else {
        let sector = (flow.angle + 22).rem_euclid(360) / 45;
        ARROWS[sector as usize % ARROWS.len()]
    }
}

/// Rasterises the field into `rows` strings of `cols` glyphs.
///
/// Row 0 of the output is the top of the field (highest `y`). Each output
/// cell samples the nearest grid cell.
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn compute_field_grid(field: &FlowField, rows: usize, cols: usize) -> Vec<String> {
    if rows == 0 || cols == 0 || field.len_x() == 0 || field.len_y() == 0 {
        return Vec::new();
    }

    let scale_y = f64::from(field.len_y()) / rows as f64;
    let scale_x = f64::from(field.len_x()) / cols as f64;

    // Use rayon to compute rows in parallel
    (0..rows)
        .into_par_iter()
        .map(|r| {
            let mut line = String::with_capacity(cols);
            let y = field.len_y() - 1 - (r as f64 * scale_y) as i32;
            for c in 0..cols {
                let x = (c as f64 * scale_x) as i32;
                let flow = field.try_flow(GridPoint::new(x, y)).unwrap_or(FlowVector::OBSTACLE);
                line.push(cell_char(flow));
            }
            line
        })
        .collect()
}

/// Maps a grid point to a `(row, col)` of a `rows` x `cols` raster, or `None`
/// if the point is off the field.
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[must_use]
pub fn grid_to_screen(
    field: &FlowField,
    point: GridPoint,
    rows: usize,
    cols: usize,
) -> Option<(usize, usize)> {
    if !field.contains(point) || rows == 0 || cols == 0 {
        return None;
    }
    let row_from_top = f64::from(field.len_y() - 1 - point.y);
    let r = (row_from_top * rows as f64 / f64::from(field.len_y())) as usize;
    let c = (f64::from(point.x) * cols as f64 / f64::from(field.len_x())) as usize;
    Some((r.min(rows - 1), c.min(cols - 1)))
}
