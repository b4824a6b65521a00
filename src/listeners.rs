//! Listeners plugin.
//!
//! Callbacks invoked after every successful transition:
//!
//! - **node listeners** fire when their node is the transition's
//!   intersection, i.e. the deepest segment that stayed active (`""` is the
//!   root);
//! - **route listeners** fire when their route is the new state;
//! - **global listeners** fire on every transition.
//!
//! # Example
//!
//! ```
//! use navigator_core::{create_router, ListenersOptions, ListenersPlugin, RouteDef, RouterOptions};
//!
//! let router = create_router(
//!     vec![RouteDef::new("users", "/users").child(RouteDef::new("view", "/:id"))],
//!     RouterOptions::new(),
//!     None,
//! )
//! .unwrap();
//!
//! let plugin = ListenersPlugin::new(ListenersOptions::default());
//! let listeners = plugin.listeners();
//! router.use_plugin(plugin);
//!
//! listeners.add_node_listener("users", |to, _from| {
//!     println!("users content changed to {}", to.name);
//! });
//! ```

use crate::plugin::Plugin;
use crate::state::{NavigationOptions, State};
use crate::transition::transition_path;
use crate::{debug_log, trace_log};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name the plugin is installed under.
pub const LISTENERS_PLUGIN: &str = "LISTENERS";

/// Callback receiving the new state and the previous one.
pub type Listener = Arc<dyn Fn(&State, Option<&State>) + Send + Sync>;

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListenersOptions {
    /// Drop node listeners of deactivated segments.
    pub auto_clean_up: bool,
}

impl Default for ListenersOptions {
    fn default() -> Self {
        Self { auto_clean_up: true }
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    global: Vec<(ListenerId, Listener)>,
    nodes: HashMap<String, Vec<(ListenerId, Listener)>>,
    routes: HashMap<String, Vec<(ListenerId, Listener)>>,
}

impl Registry {
    fn next_id(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }
}

fn remove_from(list: &mut Vec<(ListenerId, Listener)>, id: ListenerId) -> bool {
    let before = list.len();
    list.retain(|(existing, _)| *existing != id);
    list.len() != before
}

/// Cloneable handle to the listener registry of a [`ListenersPlugin`].
#[derive(Clone, Default)]
pub struct Listeners {
    registry: Arc<Mutex<Registry>>,
}

impl Listeners {
    /// Listen to every transition.
    pub fn add_listener<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&State, Option<&State>) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id();
        registry.global.push((id, Arc::new(f)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        remove_from(&mut self.registry.lock().global, id)
    }

    /// Listen to transitions whose intersection is `node`.
    pub fn add_node_listener<F>(&self, node: impl Into<String>, f: F) -> ListenerId
    where
        F: Fn(&State, Option<&State>) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id();
        registry
            .nodes
            .entry(node.into())
            .or_default()
            .push((id, Arc::new(f)));
        id
    }

    pub fn remove_node_listener(&self, node: &str, id: ListenerId) -> bool {
        self.registry
            .lock()
            .nodes
            .get_mut(node)
            .is_some_and(|list| remove_from(list, id))
    }

    /// Listen to transitions into `route`.
    pub fn add_route_listener<F>(&self, route: impl Into<String>, f: F) -> ListenerId
    where
        F: Fn(&State, Option<&State>) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id();
        registry
            .routes
            .entry(route.into())
            .or_default()
            .push((id, Arc::new(f)));
        id
    }

    pub fn remove_route_listener(&self, route: &str, id: ListenerId) -> bool {
        self.registry
            .lock()
            .routes
            .get_mut(route)
            .is_some_and(|list| remove_from(list, id))
    }

    /// Number of node listeners registered for `node`.
    pub fn node_listener_count(&self, node: &str) -> usize {
        self.registry.lock().nodes.get(node).map_or(0, Vec::len)
    }

    fn clear_nodes(&self, nodes: &[String]) {
        let mut registry = self.registry.lock();
        for node in nodes {
            if registry.nodes.remove(node).is_some() {
                trace_log!("Removed node listeners of '{}'", node);
            }
        }
    }

    /// Node, route and global listeners to call, in that order.
    fn collect(&self, intersection: &str, route: &str) -> Vec<Listener> {
        let registry = self.registry.lock();
        let node = registry.nodes.get(intersection).into_iter().flatten();
        let route = registry.routes.get(route).into_iter().flatten();
        node.chain(route)
            .chain(&registry.global)
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("Listeners")
            .field("global", &registry.global.len())
            .field("nodes", &registry.nodes.keys().collect::<Vec<_>>())
            .field("routes", &registry.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Plugin invoking [`Listeners`] after every successful transition.
#[derive(Debug, Clone, Default)]
pub struct ListenersPlugin {
    options: ListenersOptions,
    listeners: Listeners,
}

impl ListenersPlugin {
    pub fn new(options: ListenersOptions) -> Self {
        Self {
            options,
            listeners: Listeners::default(),
        }
    }

    /// Handle to register listeners, usable before and after installation.
    pub fn listeners(&self) -> Listeners {
        self.listeners.clone()
    }
}

impl Plugin for ListenersPlugin {
    fn name(&self) -> &str {
        LISTENERS_PLUGIN
    }

    fn on_transition_success(&self, to: &State, from: Option<&State>, options: &NavigationOptions) {
        let path = transition_path(to, from, options.reload);
        if self.options.auto_clean_up {
            self.listeners.clear_nodes(&path.to_deactivate);
        }

        let listeners = self.listeners.collect(&path.intersection, &to.name);
        debug_log!(
            "Invoking {} listener(s) for '{}' (intersection '{}')",
            listeners.len(),
            to.name,
            path.intersection
        );
        for listener in listeners {
            listener(to, from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RouteParams;

    fn state(name: &str) -> State {
        State::new(name, RouteParams::new(), "")
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Listener) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |tag: &'static str| -> Listener {
            let sink = Arc::clone(&sink);
            Arc::new(move |to: &State, _: Option<&State>| sink.lock().push(format!("{tag}:{}", to.name)))
        };
        (log, make)
    }

    #[test]
    fn test_invocation_order() {
        let plugin = ListenersPlugin::default();
        let listeners = plugin.listeners();
        let (log, make) = recorder();

        let global = make("global");
        let node = make("node");
        let route = make("route");
        listeners.add_listener(move |to, from| global(to, from));
        listeners.add_route_listener("users.edit", move |to, from| route(to, from));
        listeners.add_node_listener("users", move |to, from| node(to, from));

        plugin.on_transition_success(
            &state("users.edit"),
            Some(&state("users.view")),
            &NavigationOptions::default(),
        );

        assert_eq!(
            *log.lock(),
            vec!["node:users.edit", "route:users.edit", "global:users.edit"]
        );
    }

    #[test]
    fn test_root_node_listener() {
        let plugin = ListenersPlugin::default();
        let listeners = plugin.listeners();
        let (log, make) = recorder();
        let root = make("root");
        listeners.add_node_listener("", move |to, from| root(to, from));

        plugin.on_transition_success(&state("home"), None, &NavigationOptions::default());
        plugin.on_transition_success(&state("users"), Some(&state("home")), &NavigationOptions::default());

        assert_eq!(*log.lock(), vec!["root:home", "root:users"]);
    }

    #[test]
    fn test_auto_clean_up_drops_deactivated_nodes() {
        let plugin = ListenersPlugin::default();
        let listeners = plugin.listeners();
        listeners.add_node_listener("users.view", |_, _| {});
        listeners.add_node_listener("users", |_, _| {});

        plugin.on_transition_success(
            &state("home"),
            Some(&state("users.view")),
            &NavigationOptions::default(),
        );

        assert_eq!(listeners.node_listener_count("users.view"), 0);
        assert_eq!(listeners.node_listener_count("users"), 0);
    }

    #[test]
    fn test_no_clean_up_when_disabled() {
        let plugin = ListenersPlugin::new(ListenersOptions { auto_clean_up: false });
        let listeners = plugin.listeners();
        listeners.add_node_listener("users.view", |_, _| {});

        plugin.on_transition_success(
            &state("home"),
            Some(&state("users.view")),
            &NavigationOptions::default(),
        );

        assert_eq!(listeners.node_listener_count("users.view"), 1);
    }

    #[test]
    fn test_remove_listeners() {
        let listeners = Listeners::default();
        let a = listeners.add_listener(|_, _| {});
        let b = listeners.add_node_listener("users", |_, _| {});
        let c = listeners.add_route_listener("home", |_, _| {});

        assert!(listeners.remove_listener(a));
        assert!(!listeners.remove_listener(a));
        assert!(!listeners.remove_node_listener("home", b));
        assert!(listeners.remove_node_listener("users", b));
        assert!(listeners.remove_route_listener("home", c));
        assert_eq!(listeners.node_listener_count("users"), 0);
    }
}
