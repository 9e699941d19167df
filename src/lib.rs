//! Lamp Shutter Library
//!
//! Judges a panel of indicator lamps from live camera frames and decides,
//! frame by frame, whether the panel is OK (lamps lit green) or NG (any
//! lamp lit red, or no lamp confirmed green). A stable OK verdict can fire
//! an automatic photo capture.
//!
//! # Architecture
//!
//! Every delivered frame runs through one explicit tick:
//!
//! ```text
//! capture → sampling → classification → aggregation → decision → trigger
//!                                                         ↓
//!                                                      metrics
//! ```
//!
//! # Design Principles
//!
//! - **Red always wins**: confirmed red evidence vetoes any amount of green
//! - **Debounced**: the visible verdict only flips after a stability window
//! - **Fail-safe**: an empty or unusable region reads as NG, never OK
//! - **Pure stages**: each stage is a function of its inputs and a small,
//!   explicitly owned rolling state
//!
//! # Example
//!
//! ```no_run
//! use lamp_shutter::{
//!     capture::{Camera, CaptureConfig, MockCamera, MockScene},
//!     decision::Mode,
//!     pipeline::{Detector, DetectorConfig},
//! };
//! use std::time::Instant;
//!
//! let mut camera = MockCamera::with_scene(MockScene::Green);
//! camera.open(&CaptureConfig::default()).unwrap();
//!
//! let mut detector = Detector::new(DetectorConfig::default(), Mode::Day).unwrap();
//!
//! for _ in 0..30 {
//!     let frame = camera.capture().unwrap();
//!     let report = detector.tick(&frame, Instant::now()).unwrap();
//!
//!     if let Some(request) = report.capture {
//!         println!("save {}", request.file_name());
//!     }
//! }
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod aggregation;
pub mod capture;
pub mod classification;
pub mod decision;
pub mod metrics;
pub mod pipeline;
pub mod sampling;
pub mod trigger;

// Re-export commonly used types at crate root
pub use aggregation::{FrameAggregator, FrameStats};
pub use capture::{Camera, CaptureConfig, Frame, MockCamera};
pub use classification::{classify, ClassificationThresholds, PixelClass};
pub use decision::{DecisionEngine, Mode, Verdict};
pub use pipeline::{Detector, DetectorConfig, TickReport};
pub use sampling::{Roi, SampleGrid};
pub use trigger::{CaptureGate, CaptureRequest};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
