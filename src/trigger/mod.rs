//! Auto-capture gating.
//!
//! A sustained OK condition must not produce a burst of snapshots: the
//! gate enforces a cooldown between automatic captures.

mod gate;
mod request;

pub use gate::{should_fire, AutoCapturePolicy, CaptureGate, GateConfig};
pub use request::{CaptureKind, CaptureRequest};
