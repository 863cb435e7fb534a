//! Procedural demo maps.
//!
//! Produces a bordered field with horizontal current bands and a scatter of
//! round obstacles, so the binary can run without map assets.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use crate::simulation::flow::{FlowField, FlowVector, GridPoint};
use crate::simulation::params::{
    DEMO_BAND_HEIGHT, DEMO_CLEARANCE, DEMO_END, DEMO_HEIGHT, DEMO_OBSTACLE_COUNT_MAX,
    DEMO_OBSTACLE_COUNT_MIN, DEMO_OBSTACLE_RADIUS_MAX, DEMO_OBSTACLE_RADIUS_MIN, DEMO_START,
    DEMO_WIDTH,
};

/// Shape of a generated map.
#[derive(Clone, Debug)]
pub struct MapGeneratorConfig {
    pub width: i32,
    pub height: i32,
    pub start: GridPoint,
    pub end: GridPoint,
    pub band_height: i32,
    pub obstacle_count: (usize, usize),
    pub obstacle_radius: (i32, i32),
}

impl Default for MapGeneratorConfig {
    fn default() -> Self {
        Self {
            width: DEMO_WIDTH,
            height: DEMO_HEIGHT,
            start: GridPoint::new(DEMO_START.0, DEMO_START.1),
            end: GridPoint::new(DEMO_END.0, DEMO_END.1),
            band_height: DEMO_BAND_HEIGHT,
            obstacle_count: (DEMO_OBSTACLE_COUNT_MIN, DEMO_OBSTACLE_COUNT_MAX),
            obstacle_radius: (DEMO_OBSTACLE_RADIUS_MIN, DEMO_OBSTACLE_RADIUS_MAX),
        }
    }
}

/// Seeded map generator.
pub struct MapGenerator {
    config: MapGeneratorConfig,
    rng: ChaCha8Rng,
}

impl MapGenerator {
    #[must_use]
    pub fn new(config: MapGeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Builds a field with start and end points set.
    ///
    /// # Errors
    /// Returns `OutOfBounds` if the configured start or end lies outside the
    /// configured dimensions.
    pub fn generate(&mut self) -> Result<FlowField> {
        let MapGeneratorConfig {
            width,
            height,
            start,
            end,
            ..
        } = self.config;
        let mut field = FlowField::new(width, height);

        let bands = self.band_flows();
        for y in 0..height {
            let band = usize::try_from(y / self.config.band_height.max(1)).unwrap_or(0);
            let flow = bands[band % bands.len()];
            for x in 0..width {
                let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                let cell = if border { FlowVector::OBSTACLE } else { flow };
                field.set_flow(GridPoint::new(x, y), cell)?;
            }
        }

        let (min_count, max_count) = self.config.obstacle_count;
        let count = self.rng.random_range(min_count..=max_count.max(min_count));
        for _ in 0..count {
            self.place_blob(&mut field);
        }

        field.set_start_point(start);
        field.set_flow(start, FlowVector::CALM)?;
        field.set_end_point(end)?;
        Ok(field)
    }

    /// One current per band: strength 0..=1, pointing along the x axis.
    fn band_flows(&mut self) -> Vec<FlowVector> {
        (0..4)
            .map(|_| {
                let strength = self.rng.random_range(0..=1);
                let angle = if self.rng.random_bool(0.5) { 0 } else { 180 };
                FlowVector::new(strength, angle)
            })
            .collect()
    }

    fn place_blob(&mut self, field: &mut FlowField) {
        let (min_r, max_r) = self.config.obstacle_radius;
        let radius = self.rng.random_range(min_r..=max_r.max(min_r));
        let cx = self.rng.random_range(0..field.len_x().max(1));
        let cy = self.rng.random_range(0..field.len_y().max(1));
        let (start, end) = (self.config.start, self.config.end);

        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let p = GridPoint::new(cx + dx, cy + dy);
                if near(p, start) || near(p, end) {
                    continue;
                }
                // Cells past the edge are simply not painted.
                let _ = field.set_flow(p, FlowVector::OBSTACLE);
            }
        }
    }
}

fn near(a: GridPoint, b: GridPoint) -> bool {
    (a.x - b.x).abs() <= DEMO_CLEARANCE && (a.y - b.y).abs() <= DEMO_CLEARANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_map() {
        let a = MapGenerator::new(MapGeneratorConfig::default(), 7).generate().unwrap();
        let b = MapGenerator::new(MapGeneratorConfig::default(), 7).generate().unwrap();
        assert!(a.cells().zip(b.cells()).all(|(x, y)| x == y));
    }

    #[test]
    fn test_border_and_markers() {
        let config = MapGeneratorConfig::default();
        let field = MapGenerator::new(config.clone(), 3).generate().unwrap();
        assert!(field.flow(GridPoint::new(0, 10)).is_obstacle());
        assert!(field.flow(GridPoint::new(config.width - 1, 10)).is_obstacle());
        assert!(field.flow(config.end).is_goal());
        assert_eq!(field.start_point(), config.start);
        assert!(!field.flow(config.start).is_obstacle());
    }
}
