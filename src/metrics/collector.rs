//! Metrics collection and registry.

use crate::decision::Verdict;
use crate::pipeline::{Detector, SessionCounters};
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of detector state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Visible verdict; `None` before the first tick.
    pub verdict: Option<Verdict>,
    /// Red ratio of the latest frame.
    pub red_ratio: Option<f64>,
    /// Green ratio of the latest frame.
    pub green_ratio: Option<f64>,
    /// Occupied red cells of the latest frame.
    pub red_cells: Option<u32>,
    /// Occupied green cells of the latest frame.
    pub green_cells: Option<u32>,
    /// Peak red value of the latest frame.
    pub max_red: Option<u8>,
    /// Lifetime counters.
    pub counters: SessionCounters,
}

/// Prometheus metrics registry for lamp detection.
pub struct MetricsRegistry {
    registry: Registry,

    // Verdict metrics
    verdict: IntGauge,
    verdict_changes_total: IntCounter,

    // Frame metrics
    red_ratio: Gauge,
    green_ratio: Gauge,
    red_cells: IntGauge,
    green_cells: IntGauge,
    max_red: IntGauge,

    // Tick metrics
    ticks_total: IntCounter,
    tick_errors_total: IntCounter,

    // Capture metrics
    auto_captures_total: IntCounter,
    manual_captures_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all detection metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let verdict = IntGauge::new(
            "lamp_shutter_verdict",
            "Visible verdict (1=OK, 0=NG, -1=inconclusive)",
        )?;
        let verdict_changes_total = IntCounter::new(
            "lamp_shutter_verdict_changes_total",
            "Total visible verdict changes",
        )?;

        let red_ratio = Gauge::new(
            "lamp_shutter_red_ratio",
            "Fraction of samples classified red in the latest frame",
        )?;
        let green_ratio = Gauge::new(
            "lamp_shutter_green_ratio",
            "Fraction of samples classified green in the latest frame",
        )?;
        let red_cells = IntGauge::new(
            "lamp_shutter_red_cells",
            "Grid cells occupied by red hits in the latest frame",
        )?;
        let green_cells = IntGauge::new(
            "lamp_shutter_green_cells",
            "Grid cells occupied by green hits in the latest frame",
        )?;
        let max_red = IntGauge::new(
            "lamp_shutter_max_red",
            "Peak red value among red samples in the latest frame",
        )?;

        let ticks_total =
            IntCounter::new("lamp_shutter_ticks_total", "Total frames evaluated")?;
        let tick_errors_total = IntCounter::new(
            "lamp_shutter_tick_errors_total",
            "Total frames rejected (bad region, stale or malformed frame)",
        )?;

        let auto_captures_total = IntCounter::new(
            "lamp_shutter_auto_captures_total",
            "Total automatic captures fired",
        )?;
        let manual_captures_total = IntCounter::new(
            "lamp_shutter_manual_captures_total",
            "Total manual captures requested",
        )?;

        registry.register(Box::new(verdict.clone()))?;
        registry.register(Box::new(verdict_changes_total.clone()))?;
        registry.register(Box::new(red_ratio.clone()))?;
        registry.register(Box::new(green_ratio.clone()))?;
        registry.register(Box::new(red_cells.clone()))?;
        registry.register(Box::new(green_cells.clone()))?;
        registry.register(Box::new(max_red.clone()))?;
        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(tick_errors_total.clone()))?;
        registry.register(Box::new(auto_captures_total.clone()))?;
        registry.register(Box::new(manual_captures_total.clone()))?;

        Ok(Self {
            registry,
            verdict,
            verdict_changes_total,
            red_ratio,
            green_ratio,
            red_cells,
            green_cells,
            max_red,
            ticks_total,
            tick_errors_total,
            auto_captures_total,
            manual_captures_total,
        })
    }

    /// Updates all metrics from a snapshot of detector state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        if let Some(verdict) = snapshot.verdict {
            self.verdict.set(match verdict {
                Verdict::Ok => 1,
                Verdict::NotOk => 0,
                Verdict::Inconclusive => -1,
            });
        }

        if let Some(v) = snapshot.red_ratio {
            self.red_ratio.set(v);
        }
        if let Some(v) = snapshot.green_ratio {
            self.green_ratio.set(v);
        }
        if let Some(v) = snapshot.red_cells {
            self.red_cells.set(i64::from(v));
        }
        if let Some(v) = snapshot.green_cells {
            self.green_cells.set(i64::from(v));
        }
        if let Some(v) = snapshot.max_red {
            self.max_red.set(i64::from(v));
        }

        // Counters only move forward, so increment by the difference
        let c = &snapshot.counters;
        advance(&self.ticks_total, c.ticks);
        advance(&self.tick_errors_total, c.tick_errors);
        advance(&self.verdict_changes_total, c.verdict_changes);
        advance(&self.auto_captures_total, c.auto_captures);
        advance(&self.manual_captures_total, c.manual_captures);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from the current state of the detector.
    pub fn from_detector(detector: &Detector) -> Self {
        let state = detector.state();
        let stats = state.last_stats();

        Self {
            verdict: (state.ticks() > 0).then(|| detector.verdict()),
            red_ratio: stats.map(|s| s.red_ratio),
            green_ratio: stats.map(|s| s.green_ratio),
            red_cells: stats.map(|s| s.red_cells),
            green_cells: stats.map(|s| s.green_cells),
            max_red: stats.map(|s| s.max_red),
            counters: detector.counters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;
    use crate::decision::Mode;
    use crate::pipeline::DetectorConfig;
    use std::time::Instant;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            verdict: Some(Verdict::Ok),
            red_ratio: Some(0.0),
            green_ratio: Some(0.07),
            red_cells: Some(0),
            green_cells: Some(5),
            max_red: Some(0),
            counters: SessionCounters {
                ticks: 10,
                tick_errors: 1,
                verdict_changes: 1,
                auto_captures: 1,
                manual_captures: 0,
            },
        };

        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("lamp_shutter_verdict 1"));
        assert!(output.contains("lamp_shutter_green_cells 5"));
        assert!(output.contains("lamp_shutter_ticks_total 10"));
        assert!(output.contains("lamp_shutter_auto_captures_total 1"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();
        let mut snapshot = MetricsSnapshot::default();
        snapshot.counters.ticks = 5;
        registry.update(&snapshot);
        snapshot.counters.ticks = 3;
        registry.update(&snapshot);

        assert!(registry.encode().unwrap().contains("lamp_shutter_ticks_total 5"));
    }

    #[test]
    fn test_snapshot_from_detector() {
        let mut detector = Detector::new(DetectorConfig::default(), Mode::Inspect).unwrap();
        assert!(MetricsSnapshot::from_detector(&detector).verdict.is_none());

        detector
            .tick(&Frame::filled(640, 360, [30, 200, 40], 1), Instant::now())
            .unwrap();
        let snapshot = MetricsSnapshot::from_detector(&detector);

        assert_eq!(snapshot.verdict, Some(Verdict::Inconclusive));
        assert_eq!(snapshot.green_ratio, Some(1.0));
        assert_eq!(snapshot.counters.ticks, 1);
    }
}
