//! Verdict decision engine.
//!
//! Turns per-frame statistics and short-term history into a debounced
//! OK / NG verdict and decides when to capture automatically.
//!
//! # States
//!
//! ```text
//! Idle ─tick─▶ Evaluating ─▶ { Ok, NotOk } ─tick─▶ Evaluating ─▶ …
//! Inspect mode: Inconclusive (sink until the mode changes)
//! ```

mod engine;
mod mode;
mod policy;
mod stability;

pub use engine::{Decision, DecisionEngine, DecisionError, DecisionReason, DecisionState};
pub use mode::{Mode, Verdict};
pub use policy::{DecisionThresholds, RedEvidence, RedVeto};
pub use stability::{StabilityConfig, StabilityWindow};
