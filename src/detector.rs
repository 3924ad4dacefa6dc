use crate::error::{ConfigError, HostsentryError, Result};
use crate::event::{AnomalySignal, FeatureVector};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Whether the detector keeps firing on every call while the rate stays
/// above threshold (the historical behavior) or fires once per crossing and
/// re-arms when the rate drops back below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FirePolicy {
    #[default]
    EveryCall,
    Once,
}

/// Sliding-window rate detector. Ingests one feature vector per observed
/// event and raises an anomaly when the count of events inside the trailing
/// `window` reaches `threshold`.
///
/// The window is shared mutable state fed from up to three producers
/// (filesystem worker, network poller, process poller); purge, append and
/// count all happen under one mutex.
#[derive(Debug)]
pub struct AnomalyDetector {
    threshold: usize,
    window: Duration,
    policy: FirePolicy,
    state: Mutex<WindowState>,
}

#[derive(Debug)]
struct WindowState {
    timestamps: VecDeque<Instant>,
    /// Tracks whether the `Once` policy has already fired for the current
    /// excursion above threshold.
    fired: bool,
}

impl AnomalyDetector {
    pub fn new(threshold: usize, window: Duration, policy: FirePolicy) -> Result<Self> {
        if threshold == 0 {
            return Err(HostsentryError::Config(ConfigError::InvalidThreshold(0)));
        }
        if window.is_zero() {
            return Err(HostsentryError::Config(ConfigError::InvalidWindow(0)));
        }
        Ok(Self {
            threshold,
            window,
            policy,
            state: Mutex::new(WindowState {
                timestamps: VecDeque::new(),
                fired: false,
            }),
        })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Record one event and check the window. Returns a signal when the
    /// retained count reaches the threshold; delivery is the caller's job.
    pub fn add_event(&self, _features: &FeatureVector) -> Option<AnomalySignal> {
        self.record(Instant::now())
    }

    fn record(&self, now: Instant) -> Option<AnomalySignal> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        state.timestamps.push_back(now);
        let horizon = now.checked_sub(self.window);
        if let Some(horizon) = horizon {
            while let Some(oldest) = state.timestamps.front() {
                if *oldest < horizon {
                    state.timestamps.pop_front();
                } else {
                    break;
                }
            }
        }

        let count = state.timestamps.len();
        if count < self.threshold {
            state.fired = false;
            return None;
        }

        if self.policy == FirePolicy::Once && state.fired {
            return None;
        }
        state.fired = true;

        Some(AnomalySignal {
            timestamp: Local::now(),
            count,
            threshold: self.threshold,
        })
    }

    /// Current number of events retained in the window, without recording
    /// anything. Stale entries are still purged first.
    pub fn window_len(&self) -> usize {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(horizon) = Instant::now().checked_sub(self.window) {
            while let Some(oldest) = state.timestamps.front() {
                if *oldest < horizon {
                    state.timestamps.pop_front();
                } else {
                    break;
                }
            }
        }
        state.timestamps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn detector(threshold: usize, window_secs: u64, policy: FirePolicy) -> AnomalyDetector {
        AnomalyDetector::new(threshold, Duration::from_secs(window_secs), policy).unwrap()
    }

    fn fv() -> FeatureVector {
        FeatureVector {
            event_id: 1001,
            file_size: 0,
        }
    }

    #[test]
    fn zero_threshold_rejected_at_construction() {
        let err = AnomalyDetector::new(0, Duration::from_secs(60), FirePolicy::EveryCall)
            .unwrap_err();
        assert!(matches!(
            err,
            HostsentryError::Config(ConfigError::InvalidThreshold(0))
        ));
    }

    #[test]
    fn zero_window_rejected_at_construction() {
        let err =
            AnomalyDetector::new(10, Duration::ZERO, FirePolicy::EveryCall).unwrap_err();
        assert!(matches!(
            err,
            HostsentryError::Config(ConfigError::InvalidWindow(0))
        ));
    }

    #[test]
    fn fires_on_third_event_within_window() {
        let d = detector(3, 1, FirePolicy::EveryCall);
        let t0 = Instant::now();
        assert!(d.record(t0).is_none());
        assert!(d.record(t0 + Duration::from_millis(100)).is_none());
        let signal = d.record(t0 + Duration::from_millis(200)).unwrap();
        assert_eq!(signal.count, 3);
        assert_eq!(signal.threshold, 3);
    }

    #[test]
    fn stale_entries_are_purged_before_the_count() {
        let d = detector(3, 1, FirePolicy::EveryCall);
        // Anchor well past process start so the purge horizon is computable.
        let t0 = Instant::now() + Duration::from_secs(100);
        assert!(d.record(t0).is_none());
        assert!(d.record(t0 + Duration::from_millis(100)).is_none());
        // Third event arrives 2s later: the first two fall out of the window.
        assert!(d.record(t0 + Duration::from_secs(2)).is_none());
    }

    #[test]
    fn every_call_policy_keeps_firing_above_threshold() {
        let d = detector(2, 10, FirePolicy::EveryCall);
        let t0 = Instant::now() + Duration::from_secs(100);
        assert!(d.record(t0).is_none());
        assert!(d.record(t0 + Duration::from_millis(1)).is_some());
        assert!(d.record(t0 + Duration::from_millis(2)).is_some());
        assert!(d.record(t0 + Duration::from_millis(3)).is_some());
    }

    #[test]
    fn once_policy_fires_a_single_time_per_crossing() {
        let d = detector(2, 1, FirePolicy::Once);
        let t0 = Instant::now() + Duration::from_secs(100);
        assert!(d.record(t0).is_none());
        assert!(d.record(t0 + Duration::from_millis(1)).is_some());
        assert!(d.record(t0 + Duration::from_millis(2)).is_none());
        // Rate drops below threshold: the detector re-arms.
        assert!(d.record(t0 + Duration::from_secs(5)).is_none());
        assert!(d.record(t0 + Duration::from_secs(5) + Duration::from_millis(1)).is_some());
    }

    #[test]
    fn detector_is_debug_printable() {
        // `unwrap_err` in the construction tests needs the Ok side to be
        // Debug; keep that guaranteed.
        let d = detector(3, 1, FirePolicy::EveryCall);
        let rendered = format!("{:?}", d);
        assert!(rendered.contains("AnomalyDetector"));
        assert!(rendered.contains("threshold: 3"));
    }

    #[test]
    fn concurrent_producers_lose_no_updates() {
        let d = Arc::new(detector(50, 10, FirePolicy::EveryCall));
        let mut handles = Vec::new();
        for _ in 0..3 {
            let d = Arc::clone(&d);
            handles.push(std::thread::spawn(move || {
                let mut fired = 0usize;
                for _ in 0..100 {
                    if d.add_event(&fv()).is_some() {
                        fired += 1;
                    }
                }
                fired
            }));
        }
        let fired: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        // 300 ingested, threshold 50, 10s window: the first 49 calls cannot
        // fire, every later call must.
        assert_eq!(d.window_len(), 300);
        assert_eq!(fired, 300 - 49);
    }
}
