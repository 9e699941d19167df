//! Per-mode color cutoffs.

use crate::capture::{check_unit, ConfigError};
use serde::{Deserialize, Serialize};

/// Cutoffs for recognizing one lamp color on its dominant channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelThresholds {
    /// Channel value must exceed this.
    pub min_value: u8,
    /// Channel share of `r + g + b` must exceed this.
    pub min_share: f64,
    /// Channel must exceed each other channel by more than this.
    pub min_margin: u8,
}

impl ChannelThresholds {
    pub const fn new(min_value: u8, min_share: f64, min_margin: u8) -> Self {
        Self {
            min_value,
            min_share,
            min_margin,
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        check_unit(&format!("{field}.min_share"), self.min_share, 0.0, 1.0)
    }
}

/// Rejection of reflective highlights that mimic lamp colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionFilter {
    pub enabled: bool,
    /// All channels above this is treated as a white highlight.
    pub white_floor: u8,
    /// Saturation `1 - 3 * min(share)` below this is treated as white.
    pub min_saturation: f64,
    /// Near-yellow: red above this...
    pub yellow_red_floor: u8,
    /// ...green above this...
    pub yellow_green_floor: u8,
    /// ...blue below this...
    pub yellow_blue_ceiling: u8,
    /// ...and red exceeding blue by more than this.
    pub yellow_red_blue_gap: u8,
}

impl Default for ReflectionFilter {
    fn default() -> Self {
        Self {
            enabled: true,
            white_floor: 180,
            min_saturation: 0.25,
            yellow_red_floor: 120,
            yellow_green_floor: 100,
            yellow_blue_ceiling: 80,
            yellow_red_blue_gap: 50,
        }
    }
}

impl ReflectionFilter {
    /// Filter that lets everything through.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Complete classification table for one operating mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    pub red: ChannelThresholds,
    pub green: ChannelThresholds,
    /// Samples with `r + g + b` below this carry no usable color.
    pub min_brightness: u16,
    /// Samples with `r + g + b` above this are treated as highlights.
    pub max_brightness: u16,
    pub reflection: ReflectionFilter,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self::day()
    }
}

impl ClassificationThresholds {
    /// Daylight table.
    pub fn day() -> Self {
        Self {
            red: ChannelThresholds::new(90, 0.40, 18),
            green: ChannelThresholds::new(80, 0.40, 10),
            min_brightness: 80,
            max_brightness: 720,
            reflection: ReflectionFilter::default(),
        }
    }

    /// Night table: stricter, since lamps bloom against a dark panel.
    pub fn night() -> Self {
        Self {
            red: ChannelThresholds::new(120, 0.50, 25),
            green: ChannelThresholds::new(110, 0.50, 18),
            ..Self::day()
        }
    }

    /// Rejects non-finite or out-of-range cutoffs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.red.validate("classification.red")?;
        self.green.validate("classification.green")?;
        if self.max_brightness > 765 {
            return Err(ConfigError::invalid(
                "classification.max_brightness",
                "cannot exceed 765",
            ));
        }
        if self.min_brightness >= self.max_brightness {
            return Err(ConfigError::invalid(
                "classification.min_brightness",
                "must be below max_brightness",
            ));
        }
        check_unit(
            "classification.reflection.min_saturation",
            self.reflection.min_saturation,
            0.0,
            1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_valid() {
        assert!(ClassificationThresholds::day().validate().is_ok());
        assert!(ClassificationThresholds::night().validate().is_ok());
    }

    #[test]
    fn test_night_is_stricter() {
        let day = ClassificationThresholds::day();
        let night = ClassificationThresholds::night();
        assert!(night.red.min_value > day.red.min_value);
        assert!(night.green.min_share > day.green.min_share);
    }

    #[test]
    fn test_invalid_brightness_window() {
        let mut t = ClassificationThresholds::day();
        t.min_brightness = 720;
        assert!(matches!(
            t.validate(),
            Err(ConfigError::InvalidConfiguration { .. })
        ));

        let mut t = ClassificationThresholds::day();
        t.max_brightness = 800;
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_non_finite_share() {
        let mut t = ClassificationThresholds::day();
        t.green.min_share = f64::NAN;
        assert!(t.validate().is_err());
    }
}
