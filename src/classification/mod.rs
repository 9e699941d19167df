//! Pixel color classification.
//!
//! Each sample is labelled red, green, neither, or ignored under the
//! active mode's thresholds. Cutoffs are configuration, never constants
//! baked into the classifier.

mod classifier;
mod thresholds;

pub use classifier::{classify, PixelClass};
pub use thresholds::{ChannelThresholds, ClassificationThresholds, ReflectionFilter};
