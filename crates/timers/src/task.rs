/// A unit of work that runs in the background and continues in the
/// foreground.
///
/// The scheduler calls [`run_background`](BackgroundTask::run_background)
/// on its worker thread. Exactly one of
/// [`on_success`](BackgroundTask::on_success) /
/// [`on_failure`](BackgroundTask::on_failure) is then posted to the
/// foreground dispatcher, exactly once per firing, never on the worker
/// thread. A failed background phase terminates only that firing; a
/// repeating task keeps its schedule after a failure.
pub trait BackgroundTask: Send + Sync + 'static {
    /// Value produced by the background phase.
    type Output: Send + 'static;

    /// Human-readable name for logging and metrics.
    fn name(&self) -> &str;

    /// Perform the background phase off the controlling thread.
    fn run_background(&self) -> anyhow::Result<Self::Output>;

    /// Continue on the foreground with the background phase's value.
    fn on_success(&self, value: Self::Output);

    /// Handle the background phase's failure on the foreground.
    fn on_failure(&self, error: anyhow::Error);
}
