//! Detector configuration: geometry, sampling and per-mode tables.

use crate::aggregation::GridConfig;
use crate::capture::ConfigError;
use crate::classification::ClassificationThresholds;
use crate::decision::{DecisionThresholds, Mode, StabilityConfig};
use crate::sampling::{RoiLayout, SamplingConfig};
use crate::trigger::GateConfig;
use serde::{Deserialize, Serialize};

/// Thresholds applied while one mode is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeProfile {
    pub classification: ClassificationThresholds,
    pub decision: DecisionThresholds,
}

impl ModeProfile {
    pub fn day() -> Self {
        Self {
            classification: ClassificationThresholds::day(),
            decision: DecisionThresholds::day(),
        }
    }

    pub fn night() -> Self {
        Self {
            classification: ClassificationThresholds::night(),
            decision: DecisionThresholds::night(),
        }
    }

    fn validate(&self, mode: &str) -> Result<(), ConfigError> {
        self.classification
            .validate()
            .and_then(|()| self.decision.validate())
            .map_err(|e| match e {
                ConfigError::InvalidConfiguration { field, reason } => {
                    ConfigError::invalid(format!("{mode}.{field}"), reason)
                }
                other => other,
            })
    }
}

impl Default for ModeProfile {
    fn default() -> Self {
        Self::day()
    }
}

/// Everything the detector needs besides frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub roi: RoiLayout,
    pub sampling: SamplingConfig,
    pub grid: GridConfig,
    pub stability: StabilityConfig,
    pub gate: GateConfig,
    pub day: ModeProfile,
    pub night: ModeProfile,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            roi: RoiLayout::default(),
            sampling: SamplingConfig::default(),
            grid: GridConfig::default(),
            stability: StabilityConfig::default(),
            gate: GateConfig::default(),
            day: ModeProfile::day(),
            night: ModeProfile::night(),
        }
    }
}

impl DetectorConfig {
    /// Rejects malformed configuration before any frame is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.roi.validate()?;
        self.sampling.validate()?;
        self.grid.validate()?;
        self.stability.validate()?;
        self.day.validate("day")?;
        self.night.validate("night")
    }

    /// Profile for a mode; inspection displays day statistics.
    pub fn profile(&self, mode: Mode) -> &ModeProfile {
        match mode {
            Mode::Day | Mode::Inspect => &self.day,
            Mode::Night => &self.night,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_profile_selection() {
        let config = DetectorConfig::default();
        assert_eq!(config.profile(Mode::Inspect), &config.day);
        assert_eq!(config.profile(Mode::Night), &config.night);
    }

    #[test]
    fn test_error_names_mode() {
        let mut config = DetectorConfig::default();
        config.night.decision.red_ratio_ng = -0.1;
        match config.validate() {
            Err(ConfigError::InvalidConfiguration { field, .. }) => {
                assert_eq!(field, "night.decision.red_ratio_ng")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_region_taller_than_frame_rejected() {
        let mut config = DetectorConfig::default();
        config.roi = RoiLayout::TopRight {
            width_ratio: 0.5,
            height_ratio: 1.0,
            margin_ratio: 0.02,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfiguration { field, .. }) if field == "roi.height_ratio"
        ));
        assert!(crate::pipeline::Detector::new(config, Mode::Day).is_err());
    }

    #[test]
    fn test_zero_step_rejected() {
        let mut config = DetectorConfig::default();
        config.sampling.step = 0;
        assert!(config.validate().is_err());
    }
}
