//! Reduction of classified samples into frame statistics.

use super::stats::Tally;
use super::{FrameStats, GridConfig, OccupancyGrid};
use crate::classification::{classify, ClassificationThresholds, PixelClass};
use crate::sampling::SampleGrid;

/// Consumes one tick's samples and produces a [`FrameStats`].
///
/// Owns the occupancy grids so their buffers are reused between ticks.
/// Aggregation is a single-writer reduction: a tick is fully consumed
/// before the next one starts.
#[derive(Debug, Clone)]
pub struct FrameAggregator {
    red_grid: OccupancyGrid,
    green_grid: OccupancyGrid,
}

impl FrameAggregator {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            red_grid: OccupancyGrid::new(grid),
            green_grid: OccupancyGrid::new(grid),
        }
    }

    /// Classifies and reduces every sample of the grid.
    pub fn aggregate(
        &mut self,
        samples: &SampleGrid<'_>,
        thresholds: &ClassificationThresholds,
    ) -> FrameStats {
        let roi = samples.roi();
        self.red_grid.reset(roi.width, roi.height);
        self.green_grid.reset(roi.width, roi.height);

        let mut tally = Tally::default();
        for point in samples {
            let s = point.sample;
            tally.total += 1;
            tally.sum_r += u64::from(s.r);
            tally.sum_g += u64::from(s.g);
            tally.sum_b += u64::from(s.b);

            match classify(s, thresholds) {
                PixelClass::Red => {
                    tally.red += 1;
                    tally.max_red = tally.max_red.max(s.r);
                    self.red_grid.record(point.dx, point.dy);
                }
                PixelClass::Green => {
                    tally.green += 1;
                    self.green_grid.record(point.dx, point.dy);
                }
                PixelClass::Ignored => tally.ignored += 1,
                PixelClass::Neither => {}
            }
        }

        let stats = tally.finish(
            self.red_grid.occupied_cells(),
            self.green_grid.occupied_cells(),
        );
        tracing::trace!(
            total = stats.total,
            red = stats.red_count,
            green = stats.green_count,
            ignored = stats.ignored_count,
            "Frame aggregated"
        );
        stats
    }
}

impl Default for FrameAggregator {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;
    use crate::sampling::Roi;

    fn stats_for(frame: &Frame, roi: Roi) -> FrameStats {
        let grid = SampleGrid::new(frame, roi, 6).unwrap();
        FrameAggregator::default().aggregate(&grid, &ClassificationThresholds::day())
    }

    #[test]
    fn test_uniform_red_region() {
        let frame = Frame::filled(100, 50, [200, 30, 30], 1);
        let roi = Roi::checked(0, 0, 100, 50, 100, 50).unwrap();
        let stats = stats_for(&frame, roi);

        // 17 columns x 9 rows
        assert_eq!(stats.total, 153);
        assert_eq!(stats.red_count, stats.total);
        assert_eq!(stats.red_ratio, 1.0);
        assert_eq!(stats.green_ratio, 0.0);
        assert_eq!(stats.max_red, 200);
        assert_eq!(stats.red_cells, 15);
        assert_eq!(stats.avg_r, 200.0);
    }

    #[test]
    fn test_uniform_green_region() {
        let frame = Frame::filled(100, 50, [30, 200, 40], 1);
        let roi = Roi::checked(0, 0, 100, 50, 100, 50).unwrap();
        let stats = stats_for(&frame, roi);

        assert_eq!(stats.green_ratio, 1.0);
        assert_eq!(stats.red_ratio, 0.0);
        assert_eq!(stats.max_red, 0);
        assert_eq!(stats.green_cells, 15);
    }

    #[test]
    fn test_small_bright_lamp_survives_dilution() {
        let mut frame = Frame::filled(120, 60, [40, 42, 45], 1);
        let pixels = frame_pixels_with_patch(&frame, 6, 6, 250);
        frame = Frame::new(pixels, 120, 60, 1);
        let roi = Roi::checked(0, 0, 120, 60, 120, 60).unwrap();
        let stats = stats_for(&frame, roi);

        assert_eq!(stats.red_count, 1);
        assert!(stats.red_ratio < 0.01);
        assert_eq!(stats.max_red, 250);
    }

    fn frame_pixels_with_patch(frame: &Frame, x: u32, y: u32, red: u8) -> Vec<u8> {
        let mut pixels = frame.pixels().to_vec();
        let idx = ((y * frame.width() + x) * 3) as usize;
        pixels[idx..idx + 3].copy_from_slice(&[red, 20, 20]);
        pixels
    }

    #[test]
    fn test_dark_region_has_no_valid_samples() {
        let frame = Frame::filled(60, 30, [0, 0, 0], 1);
        let roi = Roi::checked(0, 0, 60, 30, 60, 30).unwrap();
        let stats = stats_for(&frame, roi);

        assert!(stats.total > 0);
        assert_eq!(stats.valid, 0);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_empty_tally_is_all_zero() {
        let stats = Tally::default().finish(0, 0);
        assert_eq!(stats, FrameStats::default());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.red_ratio, 0.0);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_same_frame_same_stats() {
        let frame = Frame::filled(100, 50, [30, 200, 40], 1);
        let roi = Roi::checked(10, 5, 80, 40, 100, 50).unwrap();
        let grid = SampleGrid::new(&frame, roi, 6).unwrap();
        let mut aggregator = FrameAggregator::default();
        let t = ClassificationThresholds::day();

        assert_eq!(aggregator.aggregate(&grid, &t), aggregator.aggregate(&grid, &t));
    }
}
