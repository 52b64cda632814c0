use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, warn};

use crate::plugin::HostPlugin;

/// Fans host lifecycle events out to a set of installed [`HostPlugin`]s.
///
/// Plugins see events in installation order. A plugin whose hook fails is
/// logged and skipped for that event; the remaining plugins still see it.
/// All hooks other than [`on_create`](HostPlugins::on_create) are ignored
/// until `on_create` has been delivered, so a registry wired up before the
/// host finishes initializing cannot leak partial lifecycle sequences to
/// its plugins.
pub struct HostPlugins {
    plugins: Vec<Arc<dyn HostPlugin>>,
    created: AtomicBool,
}

impl HostPlugins {
    /// Create a builder for a plugin registry.
    pub fn builder() -> HostPluginsBuilder {
        HostPluginsBuilder {
            plugins: Vec::new(),
        }
    }

    /// Number of installed plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry has no plugins.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Deliver the create event. Unlocks the remaining hooks.
    pub fn on_create(&self) {
        self.created.store(true, Ordering::SeqCst);
        self.dispatch("on_create", |p| p.on_create());
    }

    /// Deliver the start event.
    pub fn on_start(&self) {
        self.gated("on_start", |p| p.on_start());
    }

    /// Deliver the resume event.
    pub fn on_resume(&self) {
        self.gated("on_resume", |p| p.on_resume());
    }

    /// Deliver the pause event.
    pub fn on_pause(&self) {
        self.gated("on_pause", |p| p.on_pause());
    }

    /// Deliver the stop event.
    pub fn on_stop(&self) {
        self.gated("on_stop", |p| p.on_stop());
    }

    /// Deliver the destroy event and reset the create gate.
    pub fn on_destroy(&self) {
        if !self.created.swap(false, Ordering::SeqCst) {
            return;
        }
        self.dispatch("on_destroy", |p| p.on_destroy());
    }

    fn gated(&self, hook: &str, f: impl Fn(&dyn HostPlugin) -> anyhow::Result<()>) {
        if !self.created.load(Ordering::SeqCst) {
            return;
        }
        self.dispatch(hook, f);
    }

    fn dispatch(&self, hook: &str, f: impl Fn(&dyn HostPlugin) -> anyhow::Result<()>) {
        for plugin in &self.plugins {
            if let Err(e) = f(plugin.as_ref()) {
                error!("Plugin '{}' failed in {}: {:#}", plugin.name(), hook, e);
            }
        }
    }
}

/// Builder for [`HostPlugins`].
pub struct HostPluginsBuilder {
    plugins: Vec<Arc<dyn HostPlugin>>,
}

impl HostPluginsBuilder {
    /// Install a plugin. A plugin instance already installed is skipped
    /// with a warning rather than invoked twice per event.
    pub fn with_plugin(mut self, plugin: Arc<dyn HostPlugin>) -> Self {
        let already = self
            .plugins
            .iter()
            .any(|p| Arc::as_ptr(p) as *const () == Arc::as_ptr(&plugin) as *const ());
        if already {
            warn!("Plugin '{}' already installed, skipping duplicate", plugin.name());
            return self;
        }
        self.plugins.push(plugin);
        self
    }

    /// Build the registry.
    pub fn build(self) -> HostPlugins {
        HostPlugins {
            plugins: self.plugins,
            created: AtomicBool::new(false),
        }
    }
}
