//! Spatial occupancy grid.
//!
//! A lit lamp puts many hits into a few neighbouring cells, while sensor
//! noise scatters single hits across the whole region. Counting cells
//! that individually clear a hit threshold separates the two.

use crate::capture::ConfigError;
use serde::{Deserialize, Serialize};

/// Grid partition of the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: u32,
    pub rows: u32,
    /// Hits a cell needs before it counts as occupied.
    pub cell_min_hits: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 5,
            rows: 3,
            cell_min_hits: 6,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::invalid("grid", "needs at least one cell"));
        }
        if self.cell_min_hits == 0 {
            return Err(ConfigError::invalid("grid.cell_min_hits", "must be at least 1"));
        }
        Ok(())
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Per-cell hit counters, reused across ticks.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    config: GridConfig,
    width: u32,
    height: u32,
    hits: Vec<u32>,
}

impl OccupancyGrid {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            width: 1,
            height: 1,
            hits: vec![0; config.cell_count()],
        }
    }

    /// Clears counters and binds the grid to a region size.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.hits.iter_mut().for_each(|h| *h = 0);
    }

    /// Records a hit at an offset inside the region.
    pub fn record(&mut self, dx: u32, dy: u32) {
        let cx = (u64::from(dx) * u64::from(self.config.columns) / u64::from(self.width)) as usize;
        let cy = (u64::from(dy) * u64::from(self.config.rows) / u64::from(self.height)) as usize;
        if cx < self.config.columns as usize && cy < self.config.rows as usize {
            self.hits[cy * self.config.columns as usize + cx] += 1;
        }
    }

    /// Cells holding at least `cell_min_hits` hits.
    pub fn occupied_cells(&self) -> u32 {
        self.hits
            .iter()
            .filter(|&&h| h >= self.config.cell_min_hits)
            .count() as u32
    }
}
