//! Time-windowed agreement filter.
//!
//! A blinking lamp drops out for a frame or two on every off-phase. The
//! visible verdict only follows the instantaneous one once a configured
//! fraction of the recent window agrees with it.

use crate::capture::{check_unit, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Stability filter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Length of the rolling window in milliseconds; zero disables filtering.
    pub window_ms: u64,
    /// Fraction of ticks in the window that must agree before a flip.
    pub agreement: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window_ms: 400,
            agreement: 0.6,
        }
    }
}

impl StabilityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("stability.agreement", self.agreement, f64::EPSILON, 1.0)
    }

    #[inline]
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Rolling history of per-tick pass flags, oldest first.
#[derive(Debug, Clone)]
pub struct StabilityWindow {
    window: Duration,
    entries: VecDeque<(Instant, bool)>,
}

impl StabilityWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: VecDeque::new(),
        }
    }

    /// Appends a tick and evicts entries older than the window.
    ///
    /// Callers must push in non-decreasing time order.
    pub fn push(&mut self, at: Instant, passed: bool) {
        self.entries.push_back((at, passed));
        while let Some(&(t, _)) = self.entries.front() {
            if at.saturating_duration_since(t) > self.window {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// Fraction of entries whose flag equals `passed`.
    pub fn agreement(&self, passed: bool) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let hits = self.entries.iter().filter(|&&(_, p)| p == passed).count();
        hits as f64 / self.entries.len() as f64
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_evicts_old_entries() {
        let t0 = Instant::now();
        let mut w = StabilityWindow::new(ms(100));
        w.push(t0, true);
        w.push(t0 + ms(50), false);
        w.push(t0 + ms(150), false);

        assert_eq!(w.len(), 2);
        assert_eq!(w.agreement(false), 1.0);
    }

    #[test]
    fn test_agreement_fraction() {
        let t0 = Instant::now();
        let mut w = StabilityWindow::new(ms(1000));
        for i in 0..10 {
            w.push(t0 + ms(i * 10), i % 4 != 0);
        }
        // i = 0, 4, 8 failed
        assert!((w.agreement(true) - 0.7).abs() < 1e-9);
        assert!((w.agreement(false) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_zero_window_keeps_latest_only() {
        let t0 = Instant::now();
        let mut w = StabilityWindow::new(Duration::ZERO);
        w.push(t0, true);
        w.push(t0 + ms(1), false);
        assert_eq!(w.len(), 1);
        assert_eq!(w.agreement(false), 1.0);
    }

    #[test]
    fn test_empty_has_no_agreement() {
        let w = StabilityWindow::new(ms(10));
        assert_eq!(w.agreement(true), 0.0);
        assert!(w.is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(StabilityConfig::default().validate().is_ok());
        let bad = StabilityConfig {
            window_ms: 400,
            agreement: 0.0,
        };
        assert!(bad.validate().is_err());
    }
}
