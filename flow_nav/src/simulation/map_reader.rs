//! Building a `FlowField` from a colour-coded raster map.
//!
//! Each pixel colour names a flow category; a colour map translates
//! categories to (strength, angle). Colour-map entries are strings of the form
//! `"(R,G,B) (strength,angle) comment"`.

use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use image::RgbaImage;
use regex::Regex;
use tracing::{info, warn};

use crate::error::Result;
use crate::simulation::flow::{FlowField, FlowVector, GridPoint};

static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(" {2,}").expect("valid regex"));

/// One colour -> flow mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorMatch {
    /// RGBA, alpha always 255
    pub color: [u8; 4],
    pub flow: FlowVector,
    /// Free text, usually the colour name
    pub comment: String,
}

/// Parses a list of colour-map strings. Malformed entries are skipped.
#[must_use]
pub fn parse_color_map<S: AsRef<str>>(entries: &[S]) -> Vec<ColorMatch> {
    entries
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_ref();
            let parsed = parse_color_entry(entry);
            if parsed.is_none() {
                warn!(entry, "skipping malformed colour map entry");
            }
            parsed
        })
        .collect()
}

/// Parses `"(R,G,B) (strength,angle) [comment]"`.
#[must_use]
pub fn parse_color_entry(entry: &str) -> Option<ColorMatch> {
    let collapsed = SPACE_RUNS.replace_all(entry, " ");
    let mut parts = collapsed.trim().splitn(3, ' ');

    let rgb = parse_tuple(parts.next()?)?;
    let [r, g, b] = rgb.as_slice() else {
        return None;
    };
    let color = [
        u8::try_from(*r).ok()?,
        u8::try_from(*g).ok()?,
        u8::try_from(*b).ok()?,
        u8::MAX,
    ];

    let flow = parse_tuple(parts.next()?)?;
    let [strength, angle] = flow.as_slice() else {
        return None;
    };

    Some(ColorMatch {
        color,
        flow: FlowVector::new(*strength, *angle),
        comment: parts.next().unwrap_or_default().trim().to_string(),
    })
}

fn parse_tuple(token: &str) -> Option<Vec<i32>> {
    token
        .trim_matches(|c| c == '(' || c == ')')
        .split(',')
        .map(|n| n.trim().parse().ok())
        .collect()
}

/// Flow for a pixel colour; unmapped colours are impassable.
#[must_use]
pub fn color_to_flow(color: [u8; 4], colors: &[ColorMatch]) -> FlowVector {
    colors
        .iter()
        .find(|m| m.color == color)
        .map_or(FlowVector::OBSTACLE, |m| m.flow)
}

/// Converts an image to a flow field.
///
/// Image row 0 is the top of the picture; grid row 0 is the bottom, so rows
/// are flipped.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn flow_field_from_image(img: &RgbaImage, colors: &[ColorMatch]) -> FlowField {
    let (width, height) = (img.width() as i32, img.height() as i32);
    let mut field = FlowField::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels() {
        let point = GridPoint::new(x as i32, height - 1 - y as i32);
        let stored = field.set_flow(point, color_to_flow(pixel.0, colors));
        debug_assert!(stored.is_ok(), "pixel ({x}, {y}) mapped outside the field");
    }
    field
}

/// Decodes an image file and converts it to a flow field.
///
/// # Errors
/// Returns `Image` if the file cannot be opened or decoded.
pub fn load_flow_field(path: impl AsRef<Path>, colors: &[ColorMatch]) -> Result<FlowField> {
    let path = path.as_ref();
    let img = image::open(path)?.to_rgba8();
    let field = flow_field_from_image(&img, colors);
    let obstacles = field.cells().filter(|(_, f)| f.is_obstacle()).count();
    info!(
        path = %path.display(),
        width = field.len_x(),
        height = field.len_y(),
        obstacles,
        "flow map loaded"
    );
    Ok(field)
}

/// Writes the field as text, top row first, one `(s, a)` per cell.
///
/// # Errors
/// Propagates write failures.
pub fn write_flow_field(field: &FlowField, mut out: impl Write) -> Result<()> {
    for y in (0..field.len_y()).rev() {
        let row: Vec<String> = (0..field.len_x())
            .map(|x| field.flow(GridPoint::new(x, y)).to_string())
            .collect();
        writeln!(out, "{}", row.join(" "))?;
    }
    Ok(())
}
