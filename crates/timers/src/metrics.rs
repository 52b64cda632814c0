use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Scheduler operational metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimerMetrics {
    /// Firings whose background phase succeeded, per task name.
    pub fired: HashMap<String, u64>,
    /// Firings whose background phase failed, per task name.
    pub failed: HashMap<String, u64>,
    /// Wall-clock time of the last firing, per task name.
    pub last_fired: HashMap<String, DateTime<Utc>>,
    /// Canceled actions discarded from the queue without firing.
    pub discarded: u64,
}

impl TimerMetrics {
    /// Record one firing of `task_name`.
    pub fn record_firing(&mut self, task_name: &str, succeeded: bool) {
        let bucket = if succeeded {
            &mut self.fired
        } else {
            &mut self.failed
        };
        *bucket.entry(task_name.to_string()).or_default() += 1;
        self.last_fired.insert(task_name.to_string(), Utc::now());
    }

    /// Record canceled actions dropped without firing.
    pub fn record_discarded(&mut self, count: usize) {
        self.discarded += count as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_successes_and_failures_separately() {
        let mut m = TimerMetrics::default();
        m.record_firing("poll", true);
        m.record_firing("poll", true);
        m.record_firing("poll", false);

        assert_eq!(m.fired["poll"], 2);
        assert_eq!(m.failed["poll"], 1);
        assert!(m.last_fired.contains_key("poll"));
    }

    #[test]
    fn records_discarded_actions() {
        let mut m = TimerMetrics::default();
        m.record_discarded(2);
        m.record_discarded(1);
        assert_eq!(m.discarded, 3);
    }

    #[test]
    fn default_metrics_are_empty() {
        let m = TimerMetrics::default();
        assert!(m.fired.is_empty());
        assert!(m.failed.is_empty());
        assert_eq!(m.discarded, 0);
    }
}
