//! Frame aggregation.
//!
//! Reduces a tick's classified samples into counts, ratios, channel
//! averages, the peak red value, and spatial grid occupancy.

mod aggregator;
mod grid;
mod stats;

pub use aggregator::FrameAggregator;
pub use grid::{GridConfig, OccupancyGrid};
pub use stats::FrameStats;
