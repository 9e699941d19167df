//! Detection pipeline.
//!
//! One tick per delivered frame:
//!
//! ```text
//! frame → sampling → classification → aggregation → decision → trigger
//! ```
//!
//! Each stage is a pure function of its inputs plus the small rolling
//! state owned by the aggregator (grid buffers) and the engine (history).

mod config;
mod detector;

pub use config::{DetectorConfig, ModeProfile};
pub use detector::{Detector, SessionCounters, TickError, TickReport};
