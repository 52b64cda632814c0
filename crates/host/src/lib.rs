//! Host lifecycle boundary.
//!
//! A host (a window, an app screen, an embedding process) moves through
//! create/start/resume/pause/stop/destroy phases. Components that need to
//! track those phases implement [`HostPlugin`] and are installed into a
//! [`HostPlugins`] registry, which fans every lifecycle event out to all
//! installed plugins and keeps one failing plugin from breaking the others.
//!
//! The crate also defines the [`ForegroundDispatcher`] seam: the capability
//! to run a callback later on the host's designated foreground thread.

pub mod dispatch;
pub mod plugin;
pub mod registry;

pub use dispatch::{ChannelDispatcher, ForegroundCallback, ForegroundDispatcher};
pub use plugin::HostPlugin;
pub use registry::{HostPlugins, HostPluginsBuilder};
