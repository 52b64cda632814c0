use thiserror::Error;

/// Errors reported synchronously by the scheduling calls.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A repeating schedule was requested with a zero or negative interval.
    /// Repeating intervals must be positive; a non-positive one is a caller
    /// error, never silently coerced to a one-shot.
    #[error("repeating interval must be positive, got {0}ms")]
    InvalidInterval(i64),
}
