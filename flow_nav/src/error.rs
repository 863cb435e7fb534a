//! Error types for the navigation library.

use thiserror::Error;

use crate::simulation::flow::GridPoint;

/// Errors surfaced by loaders and the per-tick driver.
///
/// Malformed policy records and colour-map entries are not errors: they are
/// skipped and logged where they are parsed.
#[derive(Error, Debug)]
pub enum NavError {
    /// File reading failures (policy table, config, map dump)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Agent config could not be deserialised
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Flow-map image could not be decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A `"(x,y)"` point string did not parse
    #[error("Invalid point '{0}': expected \"(x,y)\"")]
    InvalidPoint(String),

    /// A grid read or write outside the flow field
    #[error("Point {point} is outside the {len_x}x{len_y} flow field")]
    OutOfBounds {
        point: GridPoint,
        len_x: i32,
        len_y: i32,
    },

    /// Obstacle window side must be odd so that a centre cell exists
    #[error("Obstacle window side must be odd and positive, got {0}")]
    InvalidWindow(usize),

    /// The action catalog has no actions to choose from
    #[error("Action catalog is empty")]
    EmptyCatalog,
}

pub type Result<T> = std::result::Result<T, NavError>;
