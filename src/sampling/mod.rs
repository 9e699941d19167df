//! Region-of-interest sampling.
//!
//! Turns a frame and a region into a fixed-stride sequence of RGB
//! samples. Sampling never mutates the frame and never scans it at full
//! resolution.

mod roi;
mod sampler;

pub use roi::{Roi, RoiLayout};
pub use sampler::{Sample, SampleGrid, SampleIter, SamplePoint};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while preparing a frame for sampling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplingError {
    #[error("invalid region {roi}: outside {frame_width}x{frame_height} frame")]
    InvalidRegion {
        roi: Roi,
        frame_width: u32,
        frame_height: u32,
    },
    #[error("invalid region {roi}: empty")]
    EmptyRegion { roi: Roi },
    #[error("sampling step must be at least 1")]
    ZeroStep,
    #[error("frame buffer holds {actual} bytes, dimensions require {expected}")]
    MalformedFrame { expected: usize, actual: usize },
}

/// Sampling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Pixel stride in both axes.
    pub step: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { step: 6 }
    }
}

impl SamplingConfig {
    pub fn validate(&self) -> Result<(), crate::capture::ConfigError> {
        if self.step == 0 {
            return Err(crate::capture::ConfigError::invalid(
                "sampling.step",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
