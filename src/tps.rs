//! Ticks-per-second estimation: host probe first, wall-clock fallback second.
//! Used by: snapshot::producer.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::host::HostPerformanceProbe;

pub const NOMINAL_TPS: f64 = 20.0;
const MIN_RECOMPUTE_INTERVAL: Duration = Duration::from_millis(1000);

pub struct TpsEstimator {
    probe: Arc<dyn HostPerformanceProbe>,
    last_poll: Option<Instant>,
    tps: f64,
}

impl TpsEstimator {
    pub fn new(probe: Arc<dyn HostPerformanceProbe>) -> Self {
        Self {
            probe,
            last_poll: None,
            tps: NOMINAL_TPS,
        }
    }

    /// Always in `[0.0, 20.0]`; never fails.
    pub fn sample(&mut self) -> f64 {
        self.sample_at(Instant::now())
    }

    pub fn sample_at(&mut self, now: Instant) -> f64 {
        match self.probe_rate() {
            Some(rate) => clamp(rate),
            None => self.fallback(now),
        }
    }

    fn probe_rate(&self) -> Option<f64> {
        let probe = &self.probe;
        match panic::catch_unwind(AssertUnwindSafe(|| probe.recent_tps())) {
            Ok(Some(rate)) if rate.is_finite() => Some(rate),
            Ok(Some(rate)) => {
                tracing::debug!(rate, "probe returned a non-finite tick rate");
                None
            }
            Ok(None) => None,
            Err(_) => {
                tracing::debug!("tick-rate probe panicked; using manual estimate");
                None
            }
        }
    }

    fn fallback(&mut self, now: Instant) -> f64 {
        let Some(last_poll) = self.last_poll else {
            self.last_poll = Some(now);
            return NOMINAL_TPS;
        };

        let elapsed = now.saturating_duration_since(last_poll);
        if elapsed < MIN_RECOMPUTE_INTERVAL {
            return self.tps;
        }

        let elapsed_ms = elapsed.as_millis() as f64;
        self.tps = clamp(NOMINAL_TPS * (1000.0 / elapsed_ms));
        self.last_poll = Some(now);
        self.tps
    }
}

fn clamp(rate: f64) -> f64 {
    rate.clamp(0.0, NOMINAL_TPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoProbe;

    struct FixedProbe(Option<f64>);

    impl HostPerformanceProbe for FixedProbe {
        fn recent_tps(&self) -> Option<f64> {
            self.0
        }
    }

    struct PanickingProbe;

    impl HostPerformanceProbe for PanickingProbe {
        fn recent_tps(&self) -> Option<f64> {
            panic!("internal field moved in this host build");
        }
    }

    fn manual() -> TpsEstimator {
        TpsEstimator::new(Arc::new(NoProbe))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_fallback_sample_is_nominal() {
        let mut est = manual();
        assert_eq!(est.sample_at(Instant::now()), 20.0);
    }

    #[test]
    fn sub_second_samples_return_cached_value() {
        let mut est = manual();
        let t0 = Instant::now();
        est.sample_at(t0);
        let recomputed = est.sample_at(t0 + ms(4000));
        assert_eq!(recomputed, 5.0);
        assert_eq!(est.sample_at(t0 + ms(4500)), recomputed);
        assert_eq!(est.sample_at(t0 + ms(4999)), recomputed);
    }

    #[test]
    fn recomputes_after_one_second() {
        let mut est = manual();
        let t0 = Instant::now();
        est.sample_at(t0);
        assert_eq!(est.sample_at(t0 + ms(2000)), 10.0);
        // measured from the previous recompute, not the first poll
        assert_eq!(est.sample_at(t0 + ms(3000)), 20.0);
    }

    #[test]
    fn exactly_one_second_recomputes_to_nominal() {
        let mut est = manual();
        let t0 = Instant::now();
        est.sample_at(t0);
        assert_eq!(est.sample_at(t0 + ms(1000)), 20.0);
        assert_eq!(est.last_poll, Some(t0 + ms(1000)));
    }

    #[test]
    fn probe_value_is_used_and_capped() {
        let mut est = TpsEstimator::new(Arc::new(FixedProbe(Some(18.5))));
        assert_eq!(est.sample(), 18.5);

        let mut est = TpsEstimator::new(Arc::new(FixedProbe(Some(21.7))));
        assert_eq!(est.sample(), 20.0);

        let mut est = TpsEstimator::new(Arc::new(FixedProbe(Some(-3.0))));
        assert_eq!(est.sample(), 0.0);
    }

    #[test]
    fn probe_path_leaves_fallback_state_untouched() {
        let mut est = TpsEstimator::new(Arc::new(FixedProbe(Some(19.0))));
        est.sample();
        assert_eq!(est.last_poll, None);
    }

    #[test]
    fn unavailable_probe_falls_back() {
        let mut est = TpsEstimator::new(Arc::new(FixedProbe(None)));
        assert_eq!(est.sample(), 20.0);
        assert!(est.last_poll.is_some());
    }

    #[test]
    fn non_finite_probe_value_falls_back() {
        let mut est = TpsEstimator::new(Arc::new(FixedProbe(Some(f64::NAN))));
        assert_eq!(est.sample(), 20.0);
        assert!(est.last_poll.is_some());
    }

    #[test]
    fn panicking_probe_falls_back() {
        let mut est = TpsEstimator::new(Arc::new(PanickingProbe));
        let t0 = Instant::now();
        assert_eq!(est.sample_at(t0), 20.0);
        assert_eq!(est.sample_at(t0 + ms(4000)), 5.0);
    }

    #[test]
    fn output_always_within_bounds() {
        let mut est = manual();
        let mut now = Instant::now();
        let steps = [0, 1, 999, 1000, 1001, 1500, 20, 60_000, 3, 250, 7_777, 1_000_000];
        for step in steps.iter().cycle().take(120) {
            now += ms(*step);
            let rate = est.sample_at(now);
            assert!((0.0..=20.0).contains(&rate), "rate {rate} out of bounds");
        }
    }
}
