//! Per-mode pass/fail cutoffs.
//!
//! Red evidence is checked first and, under the default veto, any one
//! red criterion fails the frame no matter how much green is present.

use crate::aggregation::FrameStats;
use crate::capture::{check_unit, ConfigError};
use serde::{Deserialize, Serialize};

/// How red evidence interacts with green evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedVeto {
    /// Any confirmed red criterion fails the frame.
    #[default]
    AnyConfirmed,
    /// Red fails the frame only when it is at least as prevalent as green.
    Dominance,
}

/// Which red criterion fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RedEvidence {
    Ratio,
    Cluster,
    Peak,
}

/// Cutoffs turning [`FrameStats`] into an instantaneous verdict.
///
/// Count and peak criteria are disabled with zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    /// Red ratio at or above which the frame fails.
    pub red_ratio_ng: f64,
    /// Occupied red grid cells at or above which the frame fails.
    pub red_cells_ng: u32,
    /// Peak red value at or above which the frame fails.
    pub red_peak_ng: u8,
    /// Green ratio the frame needs to pass.
    pub green_ratio_ok: f64,
    /// Absolute green hits the frame needs to pass.
    pub green_min_hits: u32,
    /// Occupied green grid cells the frame needs to pass.
    pub green_cells_ok: u32,
    pub red_veto: RedVeto,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self::day()
    }
}

impl DecisionThresholds {
    pub fn day() -> Self {
        Self {
            red_ratio_ng: 0.010,
            red_cells_ng: 1,
            red_peak_ng: 230,
            green_ratio_ok: 0.015,
            green_min_hits: 3,
            green_cells_ok: 3,
            red_veto: RedVeto::AnyConfirmed,
        }
    }

    pub fn night() -> Self {
        Self {
            red_ratio_ng: 0.015,
            red_peak_ng: 245,
            green_ratio_ok: 0.012,
            ..Self::day()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("decision.red_ratio_ng", self.red_ratio_ng, 0.0, 1.0)?;
        check_unit("decision.green_ratio_ok", self.green_ratio_ok, 0.0, 1.0)?;
        if self.red_ratio_ng == 0.0 {
            // A zero cutoff would fail every frame, even one with no red at all
            return Err(ConfigError::invalid(
                "decision.red_ratio_ng",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// First red criterion the frame trips, if any.
    pub fn red_evidence(&self, stats: &FrameStats) -> Option<RedEvidence> {
        if stats.red_ratio >= self.red_ratio_ng {
            return Some(RedEvidence::Ratio);
        }
        if self.red_cells_ng > 0 && stats.red_cells >= self.red_cells_ng {
            return Some(RedEvidence::Cluster);
        }
        if self.red_peak_ng > 0 && stats.red_count > 0 && stats.max_red >= self.red_peak_ng {
            return Some(RedEvidence::Peak);
        }
        None
    }

    /// Whether the green evidence clears every enabled OK criterion.
    pub fn green_confirmed(&self, stats: &FrameStats) -> bool {
        stats.green_count > 0
            && stats.green_ratio >= self.green_ratio_ok
            && stats.green_count >= self.green_min_hits
            && stats.green_cells >= self.green_cells_ok
    }

    /// Whether red evidence vetoes this frame under the configured policy.
    pub fn red_vetoes(&self, stats: &FrameStats) -> Option<RedEvidence> {
        let evidence = self.red_evidence(stats)?;
        match self.red_veto {
            RedVeto::AnyConfirmed => Some(evidence),
            RedVeto::Dominance => (stats.red_ratio >= stats.green_ratio).then_some(evidence),
        }
    }
}
