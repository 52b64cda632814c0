use serde::{Deserialize, Serialize};

/// Scheduler configuration, typically parsed from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Name given to the worker thread (shows up in debuggers and panics).
    #[serde(default = "default_thread_name")]
    pub worker_thread_name: String,
}

fn default_thread_name() -> String {
    "pacer-timer-worker".to_string()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_thread_name: default_thread_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.worker_thread_name, "pacer-timer-worker");
    }
}
