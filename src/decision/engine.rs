//! Debounced verdict state machine.
//!
//! Each tick computes an instantaneous verdict (red first, then green),
//! feeds it into the stability window, and flips the visible verdict only
//! when the window agrees. Transitions into OK may request a capture.

use super::policy::{DecisionThresholds, RedEvidence};
use super::stability::{StabilityConfig, StabilityWindow};
use super::{Mode, Verdict};
use crate::aggregation::FrameStats;
use crate::trigger::{AutoCapturePolicy, CaptureGate, GateConfig};
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;

/// Errors raised by the engine for a single tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("tick is {behind_ms} ms older than the previous tick")]
    OutOfOrder { behind_ms: u64 },
}

/// Why a tick produced its instantaneous verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionReason {
    /// Inspect mode; nothing is judged.
    Inspection,
    /// No sample survived classification.
    EmptySample,
    /// A red criterion fired.
    Red(RedEvidence),
    /// Green evidence cleared every OK criterion.
    GreenConfirmed,
    /// Neither red nor enough green.
    InsufficientGreen,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    /// Debounced verdict shown to the operator.
    pub verdict: Verdict,
    /// This tick's verdict before stability filtering.
    pub instant: Verdict,
    pub reason: DecisionReason,
    /// Visible verdict changed on this tick.
    pub changed: bool,
    /// An automatic capture should be taken now.
    pub auto_capture: bool,
    /// Fraction of the stability window agreeing with this tick.
    pub agreement: f64,
}

/// Rolling memory of a detection session.
///
/// Owned by the engine and mutated only by its tick.
#[derive(Debug, Clone)]
pub struct DecisionState {
    verdict: Verdict,
    history: StabilityWindow,
    session_start: Option<Instant>,
    last_tick: Option<Instant>,
    last_transition: Option<Instant>,
    gate: CaptureGate,
    last_stats: Option<FrameStats>,
    ticks: u64,
}

impl DecisionState {
    fn new(mode: Mode, stability: &StabilityConfig, gate: &GateConfig) -> Self {
        Self {
            // Fail-safe until the window says otherwise
            verdict: if mode.is_judging() {
                Verdict::NotOk
            } else {
                Verdict::Inconclusive
            },
            history: StabilityWindow::new(stability.window()),
            session_start: None,
            last_tick: None,
            last_transition: None,
            gate: CaptureGate::new(gate.cooldown()),
            last_stats: None,
            ticks: 0,
        }
    }

    #[inline]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    #[inline]
    pub fn last_stats(&self) -> Option<&FrameStats> {
        self.last_stats.as_ref()
    }

    #[inline]
    pub fn last_transition(&self) -> Option<Instant> {
        self.last_transition
    }

    #[inline]
    pub fn last_capture(&self) -> Option<Instant> {
        self.gate.last_fire()
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

/// Turns frame statistics into debounced verdicts.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    mode: Mode,
    thresholds: DecisionThresholds,
    stability: StabilityConfig,
    gate: GateConfig,
    state: DecisionState,
}

impl DecisionEngine {
    pub fn new(
        mode: Mode,
        thresholds: DecisionThresholds,
        stability: StabilityConfig,
        gate: GateConfig,
    ) -> Self {
        Self {
            mode,
            thresholds,
            stability,
            gate,
            state: DecisionState::new(mode, &stability, &gate),
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn state(&self) -> &DecisionState {
        &self.state
    }

    #[inline]
    pub fn verdict(&self) -> Verdict {
        self.state.verdict
    }

    /// Switches mode and thresholds, discarding all session history.
    pub fn set_mode(&mut self, mode: Mode, thresholds: DecisionThresholds) {
        self.mode = mode;
        self.thresholds = thresholds;
        self.reset();
    }

    /// Starts a fresh session.
    pub fn reset(&mut self) {
        self.state = DecisionState::new(self.mode, &self.stability, &self.gate);
        tracing::debug!(mode = %self.mode, "Decision state reset");
    }

    /// Advances the state machine by one tick.
    ///
    /// Ticks must arrive in time order; an older tick is rejected and the
    /// state is left untouched.
    pub fn tick(&mut self, stats: &FrameStats, now: Instant) -> Result<Decision, DecisionError> {
        if let Some(last) = self.state.last_tick {
            if now < last {
                return Err(DecisionError::OutOfOrder {
                    behind_ms: (last - now).as_millis() as u64,
                });
            }
        }

        let state = &mut self.state;
        state.last_tick = Some(now);
        state.session_start.get_or_insert(now);
        state.last_stats = Some(*stats);
        state.ticks += 1;

        if !self.mode.is_judging() {
            // The first tick of an inspect session announces the sink state
            let changed = state.ticks == 1;
            if changed {
                state.last_transition = Some(now);
                tracing::info!(to = %Verdict::Inconclusive, "Inspection started");
            }
            return Ok(Decision {
                verdict: Verdict::Inconclusive,
                instant: Verdict::Inconclusive,
                reason: DecisionReason::Inspection,
                changed,
                auto_capture: false,
                agreement: 0.0,
            });
        }

        let (instant, reason) = self.judge(stats);
        let state = &mut self.state;
        let passed = instant.is_ok();
        state.history.push(now, passed);
        let agreement = state.history.agreement(passed);

        let previous = state.verdict;
        let settled = state
            .session_start
            .is_some_and(|start| now.saturating_duration_since(start) >= self.stability.window());

        let next = if reason == DecisionReason::EmptySample {
            // Nothing to judge: fail safe immediately
            Verdict::NotOk
        } else if instant != previous && settled && agreement >= self.stability.agreement {
            instant
        } else {
            previous
        };

        let changed = next != previous;
        if changed {
            state.verdict = next;
            state.last_transition = Some(now);
            tracing::info!(
                from = %previous,
                to = %next,
                reason = ?reason,
                agreement,
                "Verdict changed"
            );
        }

        let requested = next.is_ok()
            && match self.gate.policy {
                AutoCapturePolicy::OnTransition => changed,
                AutoCapturePolicy::WhileOk => true,
                AutoCapturePolicy::Disabled => false,
            };
        let auto_capture = state.gate.try_fire(requested, now);

        tracing::trace!(
            instant = %instant,
            verdict = %next,
            agreement,
            red_ratio = stats.red_ratio,
            green_ratio = stats.green_ratio,
            "Tick evaluated"
        );

        Ok(Decision {
            verdict: next,
            instant,
            reason,
            changed,
            auto_capture,
            agreement,
        })
    }

    /// Instantaneous verdict for one frame: red first, then green.
    fn judge(&self, stats: &FrameStats) -> (Verdict, DecisionReason) {
        if stats.is_empty() {
            return (Verdict::NotOk, DecisionReason::EmptySample);
        }
        if let Some(evidence) = self.thresholds.red_vetoes(stats) {
            return (Verdict::NotOk, DecisionReason::Red(evidence));
        }
        if self.thresholds.green_confirmed(stats) {
            (Verdict::Ok, DecisionReason::GreenConfirmed)
        } else {
            (Verdict::NotOk, DecisionReason::InsufficientGreen)
        }
    }
}
