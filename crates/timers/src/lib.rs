//! Lifecycle-gated background timer scheduler.
//!
//! [`TimerScheduler`] accepts one-shot and repeating [`BackgroundTask`]s,
//! runs their background phase on a single self-managing worker thread
//! while the host is active, and posts each task's continuation (or failure
//! handler) to the host's foreground dispatcher. Work can be scheduled
//! while the host is paused; it stays pending and fires once the host
//! resumes, even if its nominal deadline has already passed.
//!
//! The worker thread exists only while there is pending work and the host
//! is active. It starts lazily on the first eligible action and exits
//! itself once the queue empties or the host deactivates, so paused hosts
//! never leak an idle thread.

pub mod error;
pub mod metrics;
pub mod pending;
pub mod scheduler;
pub mod task;
pub mod types;

pub use error::ScheduleError;
pub use metrics::TimerMetrics;
pub use scheduler::{TimerHandle, TimerScheduler};
pub use task::BackgroundTask;
pub use types::SchedulerConfig;
