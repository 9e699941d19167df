//! Prometheus exporter for detector observability.
//!
//! # Metrics Exposed
//!
//! ## Verdict
//! - `lamp_shutter_verdict` - Visible verdict (1=OK, 0=NG, -1=inconclusive)
//! - `lamp_shutter_verdict_changes_total` - Visible verdict changes
//!
//! ## Latest frame
//! - `lamp_shutter_red_ratio` / `lamp_shutter_green_ratio`
//! - `lamp_shutter_red_cells` / `lamp_shutter_green_cells`
//! - `lamp_shutter_max_red`
//!
//! ## Session
//! - `lamp_shutter_ticks_total` - Frames evaluated
//! - `lamp_shutter_tick_errors_total` - Frames rejected
//! - `lamp_shutter_auto_captures_total` / `lamp_shutter_manual_captures_total`
//!
//! The HTTP endpoint (`/metrics`, `/status`, `/health`) is only built with
//! the `metrics` feature.
//!
//! # Example
//!
//! ```no_run
//! use lamp_shutter::decision::Mode;
//! use lamp_shutter::metrics::{MetricsRegistry, MetricsSnapshot};
//! use lamp_shutter::pipeline::{Detector, DetectorConfig};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! let detector = Detector::new(DetectorConfig::default(), Mode::Day).unwrap();
//!
//! registry.update(&MetricsSnapshot::from_detector(&detector));
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
