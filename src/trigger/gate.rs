//! Cooldown gate for automatic captures.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// When the engine asks for an automatic capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoCapturePolicy {
    /// On each transition into OK.
    #[default]
    OnTransition,
    /// On every OK tick, throttled by the cooldown.
    WhileOk,
    /// Never.
    Disabled,
}

/// Gate configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Minimum interval between automatic captures.
    pub cooldown_ms: u64,
    pub policy: AutoCapturePolicy,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 1200,
            policy: AutoCapturePolicy::OnTransition,
        }
    }
}

impl GateConfig {
    #[inline]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Returns true when a requested capture is outside the cooldown.
pub fn should_fire(
    requested: bool,
    now: Instant,
    last_fire: Option<Instant>,
    cooldown: Duration,
) -> bool {
    requested && last_fire.map_or(true, |last| now.saturating_duration_since(last) >= cooldown)
}

/// Stateful wrapper around [`should_fire`] that remembers the last firing.
#[derive(Debug, Clone)]
pub struct CaptureGate {
    cooldown: Duration,
    last_fire: Option<Instant>,
}

impl CaptureGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fire: None,
        }
    }

    /// Fires if requested and the cooldown has elapsed, recording the time.
    pub fn try_fire(&mut self, requested: bool, now: Instant) -> bool {
        let fire = should_fire(requested, now, self.last_fire, self.cooldown);
        if fire {
            self.last_fire = Some(now);
        } else if requested {
            tracing::debug!(
                cooldown_ms = self.cooldown.as_millis() as u64,
                "Capture suppressed by cooldown"
            );
        }
        fire
    }

    #[inline]
    pub fn last_fire(&self) -> Option<Instant> {
        self.last_fire
    }

    #[inline]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_unrequested_never_fires() {
        assert!(!should_fire(false, Instant::now(), None, ms(0)));
    }

    #[test]
    fn test_first_request_fires() {
        assert!(should_fire(true, Instant::now(), None, ms(1200)));
    }

    #[test]
    fn test_cooldown_boundary_is_inclusive() {
        let t0 = Instant::now();
        assert!(should_fire(true, t0 + ms(1200), Some(t0), ms(1200)));
        assert!(!should_fire(true, t0 + ms(1199), Some(t0), ms(1200)));
    }

    #[test]
    fn test_gate_suppresses_within_cooldown() {
        let t0 = Instant::now();
        let mut gate = CaptureGate::new(ms(1200));

        assert!(gate.try_fire(true, t0));
        assert!(!gate.try_fire(true, t0 + ms(300)));
        assert!(gate.try_fire(true, t0 + ms(1300)));
        assert_eq!(gate.last_fire(), Some(t0 + ms(1300)));
    }

    #[test]
    fn test_suppressed_request_does_not_extend_cooldown() {
        let t0 = Instant::now();
        let mut gate = CaptureGate::new(ms(1000));

        assert!(gate.try_fire(true, t0));
        assert!(!gate.try_fire(true, t0 + ms(900)));
        assert!(gate.try_fire(true, t0 + ms(1000)));
    }
}
