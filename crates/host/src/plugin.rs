use anyhow::Result;

/// A component that tracks the host's lifecycle.
///
/// Every hook defaults to a no-op so implementors only override the phases
/// they care about. Hooks return `Result` rather than panicking; the
/// [`HostPlugins`](crate::registry::HostPlugins) registry logs a failed hook
/// and still delivers the event to the remaining plugins.
pub trait HostPlugin: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Called once when the host is created.
    fn on_create(&self) -> Result<()> {
        Ok(())
    }

    /// Called when the host becomes visible.
    fn on_start(&self) -> Result<()> {
        Ok(())
    }

    /// Called when the host enters the foreground.
    fn on_resume(&self) -> Result<()> {
        Ok(())
    }

    /// Called when the host leaves the foreground.
    fn on_pause(&self) -> Result<()> {
        Ok(())
    }

    /// Called when the host is no longer visible.
    fn on_stop(&self) -> Result<()> {
        Ok(())
    }

    /// Called when the host is destroyed.
    fn on_destroy(&self) -> Result<()> {
        Ok(())
    }
}
