//! Frame-level statistics.

use serde::Serialize;

/// Aggregated result of one tick. Built once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FrameStats {
    /// Samples read from the region.
    pub total: u32,
    /// Samples not ignored as too dark, too bright, or reflective.
    pub valid: u32,
    pub red_count: u32,
    pub green_count: u32,
    pub ignored_count: u32,
    /// `red_count / total`, zero when nothing was sampled.
    pub red_ratio: f64,
    /// `green_count / total`, zero when nothing was sampled.
    pub green_ratio: f64,
    /// Mean channel values over all samples.
    pub avg_r: f64,
    pub avg_g: f64,
    pub avg_b: f64,
    /// Highest red channel value among red-classified samples.
    pub max_red: u8,
    /// Grid cells occupied by red hits.
    pub red_cells: u32,
    /// Grid cells occupied by green hits.
    pub green_cells: u32,
}

impl FrameStats {
    /// True when no sample survived classification.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.valid == 0
    }

    /// Red hits as a percentage, for live display.
    pub fn red_percent(&self) -> f64 {
        self.red_ratio * 100.0
    }

    /// Green hits as a percentage, for live display.
    pub fn green_percent(&self) -> f64 {
        self.green_ratio * 100.0
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ravg {:.1} Gavg {:.1} Bavg {:.1} red% {:.2} green% {:.2} cells r{}/g{}",
            self.avg_r,
            self.avg_g,
            self.avg_b,
            self.red_percent(),
            self.green_percent(),
            self.red_cells,
            self.green_cells
        )
    }
}

/// Running sums while a tick's samples are consumed.
#[derive(Debug, Default)]
pub(super) struct Tally {
    pub total: u32,
    pub red: u32,
    pub green: u32,
    pub ignored: u32,
    pub sum_r: u64,
    pub sum_g: u64,
    pub sum_b: u64,
    pub max_red: u8,
}

impl Tally {
    pub fn finish(self, red_cells: u32, green_cells: u32) -> FrameStats {
        if self.total == 0 {
            return FrameStats::default();
        }
        let n = f64::from(self.total);
        FrameStats {
            total: self.total,
            valid: self.total - self.ignored,
            red_count: self.red,
            green_count: self.green,
            ignored_count: self.ignored,
            red_ratio: f64::from(self.red) / n,
            green_ratio: f64::from(self.green) / n,
            avg_r: self.sum_r as f64 / n,
            avg_g: self.sum_g as f64 / n,
            avg_b: self.sum_b as f64 / n,
            max_red: self.max_red,
            red_cells,
            green_cells,
        }
    }
}
