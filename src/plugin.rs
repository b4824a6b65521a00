//! Plugins: observers of router lifecycle events.
//!
//! A [`Plugin`] is installed once per router with
//! [`Router::use_plugin`](crate::Router::use_plugin). At installation it may
//! register guards or middleware through the router handle it receives;
//! afterwards the router calls its hooks for every lifecycle event:
//!
//! | Hook | Event |
//! |------|-------|
//! | [`on_start`](Plugin::on_start) | [`ROUTER_START`](crate::constants::ROUTER_START) |
//! | [`on_stop`](Plugin::on_stop) | [`ROUTER_STOP`](crate::constants::ROUTER_STOP) |
//! | [`on_transition_start`](Plugin::on_transition_start) | [`TRANSITION_START`](crate::constants::TRANSITION_START) |
//! | [`on_transition_cancel`](Plugin::on_transition_cancel) | [`TRANSITION_CANCEL`](crate::constants::TRANSITION_CANCEL) |
//! | [`on_transition_error`](Plugin::on_transition_error) | [`TRANSITION_ERROR`](crate::constants::TRANSITION_ERROR) |
//! | [`on_transition_success`](Plugin::on_transition_success) | [`TRANSITION_SUCCESS`](crate::constants::TRANSITION_SUCCESS) |
//!
//! Hooks run synchronously, in installation order, with no router lock held:
//! a hook may call back into the router.
//!
//! # Example
//!
//! ```
//! use navigator_core::{NavigationOptions, Plugin, State};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct PageViews(AtomicUsize);
//!
//! impl Plugin for PageViews {
//!     fn name(&self) -> &str {
//!         "page-views"
//!     }
//!
//!     fn on_transition_success(&self, _to: &State, _from: Option<&State>, _options: &NavigationOptions) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//! ```

use crate::constants::RouterEvent;
use crate::error::RouterError;
use crate::router::Router;
use crate::state::{NavigationOptions, State};
use crate::trace_log;
use std::fmt;
use std::sync::Arc;

/// Lifecycle observer installed on a router.
#[allow(unused_variables)]
pub trait Plugin: Send + Sync + 'static {
    /// Unique name; a second plugin with the same name is not installed.
    fn name(&self) -> &str;

    /// Called once when the plugin is installed.
    fn install(&self, router: &Router) {}

    fn on_start(&self) {}

    fn on_stop(&self) {}

    fn on_transition_start(&self, to: &State, from: Option<&State>) {}

    fn on_transition_cancel(&self, to: Option<&State>, from: Option<&State>) {}

    fn on_transition_error(&self, to: Option<&State>, from: Option<&State>, error: &RouterError) {}

    fn on_transition_success(&self, to: &State, from: Option<&State>, options: &NavigationOptions) {}

    /// Called when the plugin is removed.
    fn teardown(&self) {}
}

/// Identifies an installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginHandle {
    id: u64,
    name: String,
}

impl PluginHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A router lifecycle event with its payload.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PluginEvent<'a> {
    Start,
    Stop,
    TransitionStart {
        to: &'a State,
        from: Option<&'a State>,
    },
    TransitionCancel {
        to: Option<&'a State>,
        from: Option<&'a State>,
    },
    TransitionError {
        to: Option<&'a State>,
        from: Option<&'a State>,
        error: &'a RouterError,
    },
    TransitionSuccess {
        to: &'a State,
        from: Option<&'a State>,
        options: &'a NavigationOptions,
    },
}

impl PluginEvent<'_> {
    pub(crate) fn kind(&self) -> RouterEvent {
        match self {
            Self::Start => RouterEvent::RouterStart,
            Self::Stop => RouterEvent::RouterStop,
            Self::TransitionStart { .. } => RouterEvent::TransitionStart,
            Self::TransitionCancel { .. } => RouterEvent::TransitionCancel,
            Self::TransitionError { .. } => RouterEvent::TransitionError,
            Self::TransitionSuccess { .. } => RouterEvent::TransitionSuccess,
        }
    }

    fn deliver(&self, plugin: &dyn Plugin) {
        match *self {
            Self::Start => plugin.on_start(),
            Self::Stop => plugin.on_stop(),
            Self::TransitionStart { to, from } => plugin.on_transition_start(to, from),
            Self::TransitionCancel { to, from } => plugin.on_transition_cancel(to, from),
            Self::TransitionError { to, from, error } => plugin.on_transition_error(to, from, error),
            Self::TransitionSuccess { to, from, options } => {
                plugin.on_transition_success(to, from, options);
            }
        }
    }
}

/// Installed plugins, in installation order.
#[derive(Clone, Default)]
pub(crate) struct PluginHost {
    entries: Vec<(PluginHandle, Arc<dyn Plugin>)>,
    next_id: u64,
}

impl PluginHost {
    /// Register a plugin. Returns the existing handle (and `false`) when a
    /// plugin with the same name is already installed.
    pub(crate) fn register(&mut self, plugin: Arc<dyn Plugin>) -> (PluginHandle, bool) {
        if let Some(handle) = self.find(plugin.name()) {
            return (handle.clone(), false);
        }
        self.next_id += 1;
        let handle = PluginHandle {
            id: self.next_id,
            name: plugin.name().to_string(),
        };
        self.entries.push((handle.clone(), plugin));
        (handle, true)
    }

    pub(crate) fn remove(&mut self, handle: &PluginHandle) -> Option<Arc<dyn Plugin>> {
        let index = self.entries.iter().position(|(h, _)| h == handle)?;
        Some(self.entries.remove(index).1)
    }

    pub(crate) fn find(&self, name: &str) -> Option<&PluginHandle> {
        self.entries
            .iter()
            .map(|(h, _)| h)
            .find(|h| h.name == name)
    }

    pub(crate) fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.entries.iter().map(|(_, p)| Arc::clone(p)).collect()
    }
}

impl fmt::Debug for PluginHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(h, _)| h.name()))
            .finish()
    }
}

/// Deliver `event` to every plugin of the snapshot.
pub(crate) fn dispatch(plugins: &[Arc<dyn Plugin>], event: PluginEvent<'_>) {
    trace_log!("Dispatching {} to {} plugin(s)", event.kind(), plugins.len());
    for plugin in plugins {
        event.deliver(plugin.as_ref());
    }
}
