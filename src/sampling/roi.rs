//! Region of interest geometry.
//!
//! The region is fixed for a session and recomputed only when the frame
//! size changes. Resolving a layout never clamps silently: a region that
//! does not fit the frame is an error.

use super::SamplingError;
use crate::capture::ConfigError;
use serde::{Deserialize, Serialize};

/// Rectangle in frame-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    /// Creates a region, checking it against the frame bounds.
    pub fn checked(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, SamplingError> {
        let roi = Self {
            x,
            y,
            width,
            height,
        };
        roi.ensure_within(frame_width, frame_height)?;
        Ok(roi)
    }

    /// Fails unless the region is non-empty and lies inside the frame.
    pub fn ensure_within(&self, frame_width: u32, frame_height: u32) -> Result<(), SamplingError> {
        if self.width == 0 || self.height == 0 {
            return Err(SamplingError::EmptyRegion { roi: *self });
        }
        let right = u64::from(self.x) + u64::from(self.width);
        let bottom = u64::from(self.y) + u64::from(self.height);
        if right > u64::from(frame_width) || bottom > u64::from(frame_height) {
            return Err(SamplingError::InvalidRegion {
                roi: *self,
                frame_width,
                frame_height,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Roi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// How the region is placed on a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoiLayout {
    /// Absolute rectangle.
    Fixed(Roi),
    /// Band anchored to the top-right corner, sized relative to the frame.
    TopRight {
        /// Region width as a fraction of frame width.
        width_ratio: f64,
        /// Region height as a fraction of frame height.
        height_ratio: f64,
        /// Margin from the top and right edges, as a fraction of the shorter side.
        margin_ratio: f64,
    },
}

impl Default for RoiLayout {
    fn default() -> Self {
        RoiLayout::TopRight {
            width_ratio: 0.45,
            height_ratio: 0.25,
            margin_ratio: 0.02,
        }
    }
}

impl RoiLayout {
    /// Resolves the layout for a frame of the given size.
    pub fn resolve(&self, frame_width: u32, frame_height: u32) -> Result<Roi, SamplingError> {
        match *self {
            RoiLayout::Fixed(roi) => {
                roi.ensure_within(frame_width, frame_height)?;
                Ok(roi)
            }
            RoiLayout::TopRight {
                width_ratio,
                height_ratio,
                margin_ratio,
            } => {
                let w = (f64::from(frame_width) * width_ratio).round() as u32;
                let h = (f64::from(frame_height) * height_ratio).round() as u32;
                let m = (f64::from(frame_width.min(frame_height)) * margin_ratio).round() as u32;
                let mut roi = Roi {
                    x: 0,
                    y: m,
                    width: w,
                    height: h,
                };
                roi.x = frame_width
                    .checked_sub(w)
                    .and_then(|x| x.checked_sub(m))
                    .ok_or(SamplingError::InvalidRegion {
                        roi,
                        frame_width,
                        frame_height,
                    })?;
                roi.ensure_within(frame_width, frame_height)?;
                Ok(roi)
            }
        }
    }

    /// Validates ratios at load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            RoiLayout::Fixed(roi) => {
                if roi.width == 0 || roi.height == 0 {
                    return Err(ConfigError::invalid("roi", "fixed region must be non-empty"));
                }
                Ok(())
            }
            RoiLayout::TopRight {
                width_ratio,
                height_ratio,
                margin_ratio,
            } => {
                crate::capture::check_unit("roi.width_ratio", width_ratio, f64::EPSILON, 1.0)?;
                crate::capture::check_unit("roi.height_ratio", height_ratio, f64::EPSILON, 1.0)?;
                crate::capture::check_unit("roi.margin_ratio", margin_ratio, 0.0, 0.5)?;
                // The margin is a fraction of the shorter side, so this bounds both axes
                if width_ratio + margin_ratio > 1.0 {
                    return Err(ConfigError::invalid(
                        "roi.width_ratio",
                        "width_ratio + margin_ratio cannot exceed 1",
                    ));
                }
                if height_ratio + margin_ratio > 1.0 {
                    return Err(ConfigError::invalid(
                        "roi.height_ratio",
                        "height_ratio + margin_ratio cannot exceed 1",
                    ));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_accepts_exact_fit() {
        let roi = Roi::checked(0, 0, 100, 50, 100, 50).unwrap();
        assert_eq!((roi.width, roi.height), (100, 50));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        assert!(matches!(
            Roi::checked(60, 0, 50, 10, 100, 50),
            Err(SamplingError::InvalidRegion { .. })
        ));
        assert!(matches!(
            Roi::checked(0, 45, 10, 10, 100, 50),
            Err(SamplingError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            Roi::checked(0, 0, 0, 10, 100, 50),
            Err(SamplingError::EmptyRegion { .. })
        ));
    }

    #[test]
    fn test_top_right_layout() {
        let roi = RoiLayout::default().resolve(1280, 720).unwrap();

        // 45% x 25%, margin 2% of 720
        assert_eq!(roi.width, 576);
        assert_eq!(roi.height, 180);
        assert_eq!(roi.y, 14);
        assert_eq!(roi.x + roi.width + 14, 1280);
    }

    #[test]
    fn test_fixed_layout_too_large_for_frame() {
        let layout = RoiLayout::Fixed(Roi {
            x: 0,
            y: 0,
            width: 200,
            height: 10,
        });
        assert!(layout.resolve(100, 100).is_err());
    }

    #[test]
    fn test_top_right_overflow_is_not_clamped() {
        let layout = RoiLayout::TopRight {
            width_ratio: 0.99,
            height_ratio: 0.2,
            margin_ratio: 0.02,
        };
        assert!(matches!(
            layout.resolve(100, 100),
            Err(SamplingError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn test_layout_that_cannot_fit_rejected() {
        let tall = RoiLayout::TopRight {
            width_ratio: 0.5,
            height_ratio: 1.0,
            margin_ratio: 0.02,
        };
        assert_eq!(
            tall.validate(),
            Err(ConfigError::invalid(
                "roi.height_ratio",
                "height_ratio + margin_ratio cannot exceed 1"
            ))
        );

        let wide = RoiLayout::TopRight {
            width_ratio: 0.99,
            height_ratio: 0.2,
            margin_ratio: 0.02,
        };
        assert!(wide.validate().is_err());

        let flush = RoiLayout::TopRight {
            width_ratio: 0.9,
            height_ratio: 0.9,
            margin_ratio: 0.05,
        };
        assert!(flush.validate().is_ok());
        assert!(flush.resolve(1280, 720).is_ok());
    }

    #[test]
    fn test_layout_validation() {
        let bad = RoiLayout::TopRight {
            width_ratio: f64::NAN,
            height_ratio: 0.2,
            margin_ratio: 0.0,
        };
        assert!(bad.validate().is_err());
        assert!(RoiLayout::default().validate().is_ok());
    }
}
