//! Single-sample color classification.

use super::{ChannelThresholds, ClassificationThresholds, ReflectionFilter};
use crate::sampling::Sample;

/// Class assigned to one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelClass {
    /// Lit red lamp.
    Red,
    /// Lit green lamp.
    Green,
    /// Usable sample without lamp color.
    Neither,
    /// Too dark, too bright, or a reflective highlight.
    Ignored,
}

impl PixelClass {
    /// True for samples that count toward the valid total.
    #[inline]
    pub fn is_valid(self) -> bool {
        self != PixelClass::Ignored
    }
}

/// Classifies a sample. Total over the whole input range.
pub fn classify(sample: Sample, thresholds: &ClassificationThresholds) -> PixelClass {
    let Sample { r, g, b } = sample;
    let sum = sample.brightness();

    if sum < thresholds.min_brightness || sum > thresholds.max_brightness {
        return PixelClass::Ignored;
    }
    if sum == 0 {
        return PixelClass::Neither;
    }
    if is_reflection(sample, sum, &thresholds.reflection) {
        return PixelClass::Ignored;
    }

    let total = f64::from(sum);
    let red = channel_margin(r, g, b, total, &thresholds.red);
    let green = channel_margin(g, r, b, total, &thresholds.green);

    match (red, green) {
        (Some(rm), Some(gm)) => {
            // Only reachable with overlapping margins; the stronger channel wins
            if rm >= gm {
                PixelClass::Red
            } else {
                PixelClass::Green
            }
        }
        (Some(_), None) => PixelClass::Red,
        (None, Some(_)) => PixelClass::Green,
        (None, None) => PixelClass::Neither,
    }
}

/// Returns the smaller margin over the other channels when `main` passes.
fn channel_margin(
    main: u8,
    other_a: u8,
    other_b: u8,
    total: f64,
    t: &ChannelThresholds,
) -> Option<i16> {
    let margin_a = i16::from(main) - i16::from(other_a);
    let margin_b = i16::from(main) - i16::from(other_b);
    let floor = i16::from(t.min_margin);

    let passes = main > t.min_value
        && f64::from(main) / total > t.min_share
        && margin_a > floor
        && margin_b > floor;

    passes.then(|| margin_a.min(margin_b))
}

fn is_reflection(sample: Sample, sum: u16, filter: &ReflectionFilter) -> bool {
    if !filter.enabled {
        return false;
    }
    let Sample { r, g, b } = sample;

    let min_share = f64::from(r.min(g).min(b)) / f64::from(sum);
    let saturation = 1.0 - 3.0 * min_share;
    let whiteish = (r > filter.white_floor && g > filter.white_floor && b > filter.white_floor)
        || saturation < filter.min_saturation;

    let yellowish = r > filter.yellow_red_floor
        && g > filter.yellow_green_floor
        && b < filter.yellow_blue_ceiling
        && i16::from(r) - i16::from(b) > i16::from(filter.yellow_red_blue_gap);

    whiteish || yellowish
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day() -> ClassificationThresholds {
        ClassificationThresholds::day()
    }

    #[test]
    fn test_lamp_colors() {
        assert_eq!(classify(Sample::new(200, 30, 30), &day()), PixelClass::Red);
        assert_eq!(classify(Sample::new(30, 200, 40), &day()), PixelClass::Green);
    }

    #[test]
    fn test_dark_and_saturated_ignored() {
        assert_eq!(classify(Sample::new(0, 0, 0), &day()), PixelClass::Ignored);
        assert_eq!(classify(Sample::new(30, 20, 20), &day()), PixelClass::Ignored);
        assert_eq!(
            classify(Sample::new(255, 255, 255), &day()),
            PixelClass::Ignored
        );
    }

    #[test]
    fn test_zero_brightness_without_floor() {
        let mut t = day();
        t.min_brightness = 0;
        assert_eq!(classify(Sample::new(0, 0, 0), &t), PixelClass::Neither);
    }

    #[test]
    fn test_yellow_reflection_rejected() {
        // Would pass the red cutoffs but reads as a yellow highlight
        let s = Sample::new(190, 110, 20);
        assert_eq!(classify(s, &day()), PixelClass::Ignored);

        let mut t = day();
        t.reflection = ReflectionFilter::disabled();
        assert_eq!(classify(s, &t), PixelClass::Red);
    }

    #[test]
    fn test_low_saturation_rejected() {
        // Pinkish white: red dominant but washed out
        let s = Sample::new(170, 120, 120);
        assert_eq!(classify(s, &day()), PixelClass::Ignored);
    }

    #[test]
    fn test_margin_is_strict() {
        let mut t = day();
        t.reflection = ReflectionFilter::disabled();
        // r - g == 18 does not exceed the margin
        assert_eq!(classify(Sample::new(100, 82, 20), &t), PixelClass::Neither);
        assert_eq!(classify(Sample::new(100, 81, 20), &t), PixelClass::Red);
    }

    #[test]
    fn test_night_rejects_dim_day_red() {
        let s = Sample::new(110, 30, 30);
        assert_eq!(classify(s, &day()), PixelClass::Red);
        assert_eq!(
            classify(s, &ClassificationThresholds::night()),
            PixelClass::Neither
        );
    }

    proptest! {
        #[test]
        fn prop_gray_never_colored(v in any::<u8>()) {
            for t in [ClassificationThresholds::day(), ClassificationThresholds::night()] {
                let class = classify(Sample::new(v, v, v), &t);
                prop_assert!(matches!(class, PixelClass::Neither | PixelClass::Ignored));
            }
        }

        #[test]
        fn prop_gray_never_colored_without_filter(v in any::<u8>(), floor in 0u16..300) {
            let mut t = ClassificationThresholds::day();
            t.reflection = ReflectionFilter::disabled();
            t.min_brightness = floor;
            let class = classify(Sample::new(v, v, v), &t);
            prop_assert!(matches!(class, PixelClass::Neither | PixelClass::Ignored));
        }

        #[test]
        fn prop_total_and_exclusive(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let class = classify(Sample::new(r, g, b), &ClassificationThresholds::day());
            if class == PixelClass::Red {
                prop_assert!(r > g && r > b);
            }
            if class == PixelClass::Green {
                prop_assert!(g > r && g > b);
            }
        }
    }
}
