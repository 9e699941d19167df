//! Per-frame detection driver.

use super::DetectorConfig;
use crate::aggregation::{FrameAggregator, FrameStats};
use crate::capture::{ConfigError, Frame};
use crate::decision::{Decision, DecisionEngine, DecisionError, DecisionState, Mode, Verdict};
use crate::sampling::{Roi, SampleGrid, SamplingError};
use crate::trigger::{CaptureKind, CaptureRequest};
use std::time::Instant;
use thiserror::Error;

/// Errors that abort a single tick. The previous verdict is held.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickError {
    #[error(transparent)]
    Sampling(#[from] SamplingError),
    #[error(transparent)]
    Decision(#[from] DecisionError),
    #[error("frame {sequence} is not newer than frame {last}")]
    StaleFrame { sequence: u64, last: u64 },
}

/// Everything one tick produced.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub sequence: u64,
    pub roi: Roi,
    pub stats: FrameStats,
    pub decision: Decision,
    /// Present when an automatic capture fired on this tick.
    pub capture: Option<CaptureRequest>,
}

/// Running totals for the lifetime of the detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    pub ticks: u64,
    pub tick_errors: u64,
    pub verdict_changes: u64,
    pub auto_captures: u64,
    pub manual_captures: u64,
}

#[derive(Debug, Clone, Copy)]
struct CachedRoi {
    frame_width: u32,
    frame_height: u32,
    roi: Roi,
}

/// Runs sampler, aggregator, engine and gate once per delivered frame.
///
/// Single-threaded and frame-clocked: ticks must be fed in arrival order,
/// and nothing here blocks on I/O.
pub struct Detector {
    config: DetectorConfig,
    mode: Mode,
    roi: Option<CachedRoi>,
    aggregator: FrameAggregator,
    engine: DecisionEngine,
    last_sequence: Option<u64>,
    counters: SessionCounters,
}

impl Detector {
    /// Validates the configuration and starts a session in `mode`.
    pub fn new(config: DetectorConfig, mode: Mode) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = DecisionEngine::new(
            mode,
            config.profile(mode).decision,
            config.stability,
            config.gate,
        );
        tracing::info!(%mode, "Detector started");
        Ok(Self {
            aggregator: FrameAggregator::new(config.grid),
            engine,
            config,
            mode,
            roi: None,
            last_sequence: None,
            counters: SessionCounters::default(),
        })
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Verdict currently shown to the operator.
    #[inline]
    pub fn verdict(&self) -> Verdict {
        self.engine.verdict()
    }

    #[inline]
    pub fn state(&self) -> &DecisionState {
        self.engine.state()
    }

    #[inline]
    pub fn counters(&self) -> SessionCounters {
        self.counters
    }

    #[inline]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Region resolved for the most recent frame size.
    pub fn roi(&self) -> Option<Roi> {
        self.roi.map(|c| c.roi)
    }

    /// Switches mode and starts a new session.
    pub fn set_mode(&mut self, mode: Mode) {
        let previous = self.mode;
        self.mode = mode;
        self.engine
            .set_mode(mode, self.config.profile(mode).decision);
        self.last_sequence = None;
        tracing::info!(from = %previous, to = %mode, "Mode changed");
    }

    /// Starts a new session, e.g. after a camera restart.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.roi = None;
        self.last_sequence = None;
        tracing::info!(mode = %self.mode, "Detector reset");
    }

    /// Processes one frame.
    ///
    /// On error the decision state is untouched and the previous verdict
    /// stays visible.
    pub fn tick(&mut self, frame: &Frame, now: Instant) -> Result<TickReport, TickError> {
        let result = self.evaluate(frame, now);
        match &result {
            Ok(report) => {
                self.counters.ticks += 1;
                if report.decision.changed {
                    self.counters.verdict_changes += 1;
                }
                if report.capture.is_some() {
                    self.counters.auto_captures += 1;
                }
            }
            Err(e) => {
                self.counters.tick_errors += 1;
                tracing::warn!(
                    sequence = frame.sequence(),
                    held = %self.verdict(),
                    "Tick failed: {}",
                    e
                );
            }
        }
        result
    }

    fn evaluate(&mut self, frame: &Frame, now: Instant) -> Result<TickReport, TickError> {
        let sequence = frame.sequence();
        if let Some(last) = self.last_sequence {
            if sequence <= last {
                return Err(TickError::StaleFrame { sequence, last });
            }
        }

        let (roi, stats) = match self.resolve_roi(frame.width(), frame.height()) {
            Ok(roi) => {
                let samples = SampleGrid::new(frame, roi, self.config.sampling.step)?;
                let profile = self.config.profile(self.mode);
                (roi, self.aggregator.aggregate(&samples, &profile.classification))
            }
            // A degenerate region yields nothing to judge, which fails safe
            Err(SamplingError::EmptyRegion { roi }) => {
                tracing::warn!(%roi, sequence, "Region of interest is empty");
                (roi, FrameStats::default())
            }
            Err(e) => return Err(e.into()),
        };
        let decision = self.engine.tick(&stats, now)?;
        self.last_sequence = Some(sequence);

        let capture = decision.auto_capture.then(|| {
            let request = CaptureRequest::new(CaptureKind::Auto, decision.verdict, sequence);
            tracing::info!(file = %request.file_name(), "Auto capture");
            request
        });

        tracing::debug!(
            sequence,
            verdict = %decision.verdict,
            instant = %decision.instant,
            red = stats.red_count,
            green = stats.green_count,
            total = stats.total,
            "Tick"
        );

        Ok(TickReport {
            sequence,
            roi,
            stats,
            decision,
            capture,
        })
    }

    fn resolve_roi(&mut self, width: u32, height: u32) -> Result<Roi, SamplingError> {
        if let Some(cached) = self.roi {
            if cached.frame_width == width && cached.frame_height == height {
                return Ok(cached.roi);
            }
        }
        let roi = self.config.roi.resolve(width, height)?;
        tracing::info!(%roi, width, height, "Region of interest resolved");
        self.roi = Some(CachedRoi {
            frame_width: width,
            frame_height: height,
            roi,
        });
        Ok(roi)
    }

    /// Operator-requested capture stamped with the current verdict.
    ///
    /// Manual captures bypass the cooldown gate.
    pub fn manual_capture(&mut self) -> CaptureRequest {
        self.counters.manual_captures += 1;
        let request = CaptureRequest::new(
            CaptureKind::Manual,
            self.verdict(),
            self.last_sequence.unwrap_or(0),
        );
        tracing::info!(file = %request.file_name(), "Manual capture");
        request
    }
}
