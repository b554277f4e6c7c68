//! Integer-cell occupancy tracking with spiral deconfliction.
//!
//! # Invariants
//! - A cell is claimed at most once per grid.
//! - `claim` always returns a point whose rounded cell was free before the call.

use crate::layout::radial::{LayoutConfig, Point};
use std::collections::HashSet;

/// Rounded `(x, y)` grid cell.
pub type Cell = (i64, i64);

/// Rounds a point to its grid cell.
pub fn cell_of(point: Point) -> Cell {
    (point.x.round() as i64, point.y.round() as i64)
}

/// Outcome of one placement request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Claim {
    pub point: Point,
    /// Spiral iterations needed; 0 when the computed cell was free.
    pub steps: usize,
}

/// Set of occupied cells owned by one layout session.
#[derive(Debug, Default, Clone)]
pub struct OccupancyGrid {
    cells: HashSet<Cell>,
}

impl OccupancyGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Claims the cell of `wanted`, walking an outward spiral on collision.
    ///
    /// Step `k` probes `wanted + k·spiral_radius_step·(cos(k·a), sin(k·a))`
    /// with `a = spiral_angle_step`. If `max_spiral_steps` probes all collide,
    /// the first free cell along +x from the wanted cell is taken.
    pub fn claim(&mut self, wanted: Point, config: &LayoutConfig) -> Claim {
        if self.cells.insert(cell_of(wanted)) {
            return Claim {
                point: wanted,
                steps: 0,
            };
        }

        for step in 1..=config.max_spiral_steps {
            let k = step as f64;
            let angle = k * config.spiral_angle_step;
            let radius = k * config.spiral_radius_step;
            let candidate = Point {
                x: wanted.x + radius * angle.cos(),
                y: wanted.y + radius * angle.sin(),
            };
            if self.cells.insert(cell_of(candidate)) {
                return Claim {
                    point: candidate,
                    steps: step,
                };
            }
        }

        let (x, y) = cell_of(wanted);
        let mut offset = 1;
        while self.cells.contains(&(x + offset, y)) {
            offset += 1;
        }
        self.cells.insert((x + offset, y));
        Claim {
            point: Point {
                x: (x + offset) as f64,
                y: y as f64,
            },
            steps: config.max_spiral_steps + offset as usize,
        }
    }
}
