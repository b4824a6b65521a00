//! The router facade.
//!
//! [`Router`] owns the route tree, the options, the dependencies, the guard
//! registry, the middleware pipeline and the installed plugins, and holds
//! the current state. It is a cheap `Clone` handle: every clone drives the
//! same router.
//!
//! # Example
//!
//! ```
//! use navigator_core::{create_router, RouteDef, RouteParams, RouterOptions, StartTarget};
//!
//! let router = create_router(
//!     vec![
//!         RouteDef::new("home", "/"),
//!         RouteDef::new("users", "/users").child(RouteDef::new("view", "/:id")),
//!     ],
//!     RouterOptions::new().default_route("home"),
//!     None,
//! )
//! .unwrap();
//!
//! futures::executor::block_on(async {
//!     let state = router.start(StartTarget::None).await.unwrap();
//!     assert_eq!(state.name, "home");
//!
//!     let state = router
//!         .navigate("users.view", RouteParams::from([("id", "42")]), Default::default())
//!         .await
//!         .unwrap();
//!     assert_eq!(state.path, "/users/42");
//! });
//! ```
//!
//! # Concurrency
//!
//! Internals live behind `parking_lot` locks that are never held across an
//! await or while a guard, middleware or plugin runs. The current state is
//! an [`ArcSwapOption`]: readers always see the last committed state.

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, MatchCache};
use crate::constants::UNKNOWN_ROUTE;
use crate::dependencies::Dependencies;
use crate::error::{RouteDefinitionError, RouterError};
use crate::guards::{Guard, GuardRegistry};
use crate::lifecycle::RouteTarget;
use crate::middleware::{MiddlewarePipeline, RouteMiddleware};
use crate::options::{RouterOption, RouterOptions};
use crate::params::RouteParams;
use crate::plugin::{dispatch, Plugin, PluginEvent, PluginHandle, PluginHost};
use crate::state::{params_equal, NavigationOptions, SegmentParams, State, StateMeta};
use crate::transition::{self, CancelToken, PendingTransition, TransitionPath, TransitionTarget};
use crate::tree::{RouteDef, RouteMatch, RouteTree};
use crate::{debug_log, info_log, trace_log, warn_log};
use arc_swap::ArcSwapOption;
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Where [`Router::start`] starts from.
#[derive(Debug, Clone, Default)]
pub enum StartTarget {
    /// The default route.
    #[default]
    None,
    /// A path to match.
    Path(String),
    /// A state to commit as is.
    State(State),
}

impl From<&str> for StartTarget {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for StartTarget {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<State> for StartTarget {
    fn from(state: State) -> Self {
        Self::State(state)
    }
}

/// Create a router, register `routes` and merge `dependencies`.
pub fn create_router(
    routes: impl IntoIterator<Item = RouteDef>,
    options: RouterOptions,
    dependencies: Option<Dependencies>,
) -> Result<Router, RouteDefinitionError> {
    let router = Router::new(options);
    router.add(routes)?;
    if let Some(dependencies) = dependencies {
        router.set_dependencies(dependencies);
    }
    Ok(router)
}

struct RouterInner {
    tree: RwLock<RouteTree>,
    options: RwLock<RouterOptions>,
    dependencies: RwLock<Dependencies>,
    guards: RwLock<GuardRegistry>,
    middleware: RwLock<MiddlewarePipeline>,
    plugins: RwLock<PluginHost>,
    state: ArcSwapOption<State>,
    started: AtomicBool,
    in_flight: Mutex<Option<CancelToken>>,
    next_state_id: AtomicU64,
    next_navigation_id: AtomicU64,
    #[cfg(feature = "cache")]
    cache: Mutex<MatchCache>,
}

/// Route transition engine handle.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterOptions::default())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("started", &self.is_started())
            .field("state", &self.get_state().map(|s| s.name.clone()))
            .field("options", &*self.inner.options.read())
            .field("plugins", &*self.inner.plugins.read())
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Router with no routes.
    pub fn new(options: RouterOptions) -> Self {
        Self::from_parts(
            RouteTree::new(),
            options,
            Dependencies::new(),
            GuardRegistry::new(),
            MiddlewarePipeline::new(),
        )
    }

    fn from_parts(
        tree: RouteTree,
        options: RouterOptions,
        dependencies: Dependencies,
        guards: GuardRegistry,
        middleware: MiddlewarePipeline,
    ) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                tree: RwLock::new(tree),
                options: RwLock::new(options),
                dependencies: RwLock::new(dependencies),
                guards: RwLock::new(guards),
                middleware: RwLock::new(middleware),
                plugins: RwLock::new(PluginHost::default()),
                state: ArcSwapOption::empty(),
                started: AtomicBool::new(false),
                in_flight: Mutex::new(None),
                next_state_id: AtomicU64::new(0),
                next_navigation_id: AtomicU64::new(0),
                #[cfg(feature = "cache")]
                cache: Mutex::new(MatchCache::new()),
            }),
        }
    }

    // ========================================================================
    // Routes
    // ========================================================================

    /// Register route definitions. All of them are added or none.
    pub fn add(&self, routes: impl IntoIterator<Item = RouteDef>) -> Result<(), RouteDefinitionError> {
        let guards = self.inner.tree.write().add(routes)?;
        self.register_route_guards(guards);
        self.invalidate_cache();
        info_log!("Routes registered");
        Ok(())
    }

    /// Register a single route by full name.
    pub fn add_node(
        &self,
        name: &str,
        path: &str,
        can_activate: Option<Guard>,
    ) -> Result<(), RouteDefinitionError> {
        let guards = self.inner.tree.write().add_node(name, path, can_activate)?;
        self.register_route_guards(guards);
        self.invalidate_cache();
        info_log!("Registered route '{}' with path '{}'", name, path);
        Ok(())
    }

    /// Set the template of the implicit root node.
    pub fn set_root_path(&self, path: &str) -> Result<(), RouteDefinitionError> {
        self.inner.tree.write().set_root_path(path)?;
        self.invalidate_cache();
        Ok(())
    }

    /// Snapshot of the route tree.
    pub fn tree(&self) -> RouteTree {
        self.inner.tree.read().clone()
    }

    fn register_route_guards(&self, guards: Vec<(String, Guard)>) {
        if guards.is_empty() {
            return;
        }
        let mut registry = self.inner.guards.write();
        for (name, guard) in guards {
            registry.set_can_activate(name, guard);
        }
    }

    // ========================================================================
    // Paths and states
    // ========================================================================

    /// Build the path of a route.
    pub fn build_path(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
        if name == UNKNOWN_ROUTE {
            return params
                .get("path")
                .map(str::to_string)
                .ok_or_else(|| RouterError::route_not_found(name));
        }
        let options = self.get_options();
        self.inner.tree.read().build_path(name, params, &options)
    }

    /// Build a state for a route, with segment metadata and a fresh id.
    pub fn build_state(&self, name: &str, params: &RouteParams) -> Result<State, RouterError> {
        self.build_target_state(name, params, &NavigationOptions::default(), false)
    }

    pub(crate) fn build_target_state(
        &self,
        name: &str,
        params: &RouteParams,
        options: &NavigationOptions,
        redirected: bool,
    ) -> Result<State, RouterError> {
        let meta = self
            .inner
            .tree
            .read()
            .segment_meta(name)
            .ok_or_else(|| RouterError::route_not_found(name))?;
        let path = self.build_path(name, params)?;
        let mut state = self.make_state(name, params.clone(), path, Some(meta), None);
        if let Some(state_meta) = state.meta.as_mut() {
            state_meta.options = options.clone();
            state_meta.redirected = redirected;
        }
        Ok(state)
    }

    /// Match a path. Unmatched paths give `None`, or the not-found state
    /// when `allow_not_found` is set.
    pub fn match_path(&self, path: &str, source: Option<&str>) -> Option<State> {
        match self.match_route(path) {
            Some(m) => Some(self.make_state(
                m.name,
                m.params,
                m.path,
                Some(m.meta),
                source.map(str::to_string),
            )),
            None if self.get_options().allow_not_found => Some(self.make_not_found_state(path)),
            None => None,
        }
    }

    fn match_route(&self, path: &str) -> Option<RouteMatch> {
        #[cfg(feature = "cache")]
        if let Some(cached) = self.inner.cache.lock().get(path) {
            return cached;
        }

        let options = self.get_options();
        let result = self.inner.tree.read().match_path(path, &options);

        #[cfg(feature = "cache")]
        self.inner.cache.lock().insert(path.to_string(), result.clone());

        result
    }

    /// Make a state with a fresh metadata id.
    pub fn make_state(
        &self,
        name: impl Into<String>,
        params: RouteParams,
        path: impl Into<String>,
        meta: Option<SegmentParams>,
        source: Option<String>,
    ) -> State {
        let id = self.inner.next_state_id.fetch_add(1, Ordering::SeqCst) + 1;
        State::new(name, params, path).with_meta(StateMeta {
            id,
            params: meta.unwrap_or_default(),
            source,
            ..StateMeta::default()
        })
    }

    /// The not-found state for `path`.
    pub fn make_not_found_state(&self, path: &str) -> State {
        let sentinel = State::not_found(path);
        self.make_state(sentinel.name, sentinel.params, sentinel.path, None, None)
    }

    /// Compare two states. With `ignore_query_params`, only the url params
    /// of the route are compared.
    pub fn are_states_equal(&self, a: &State, b: &State, ignore_query_params: bool) -> bool {
        if a.name != b.name {
            return false;
        }
        if !ignore_query_params {
            return params_equal(a, b, None);
        }
        let keys = if a.name == UNKNOWN_ROUTE {
            vec!["path".to_string()]
        } else {
            self.inner.tree.read().url_params(&a.name)
        };
        params_equal(a, b, Some(&keys))
    }

    /// `true` when `child` is below `parent` and agrees on `parent`'s params.
    pub fn are_states_descendants(&self, parent: &State, child: &State) -> bool {
        parent.is_ancestor_of(child)
    }

    /// Whether the current state is (or, without `strict_equality`, is
    /// below) the given route.
    pub fn is_active(
        &self,
        name: &str,
        params: &RouteParams,
        strict_equality: bool,
        ignore_query_params: bool,
    ) -> bool {
        let Some(active) = self.get_state() else {
            return false;
        };
        let probe = State::new(name, params.clone(), String::new());
        if strict_equality || active.name == name {
            self.are_states_equal(&probe, &active, ignore_query_params)
        } else {
            self.are_states_descendants(&probe, &active)
        }
    }

    // ========================================================================
    // State, options, dependencies
    // ========================================================================

    /// The last committed state.
    pub fn get_state(&self) -> Option<Arc<State>> {
        self.inner.state.load_full()
    }

    /// Replace the current state without a transition.
    pub fn set_state(&self, state: Option<State>) {
        self.inner.state.store(state.map(Arc::new));
    }

    /// Snapshot of the options.
    pub fn get_options(&self) -> RouterOptions {
        self.inner.options.read().clone()
    }

    /// Override one option.
    pub fn set_option(&self, option: RouterOption) {
        let invalidates = option.affects_matching();
        self.inner.options.write().apply(option);
        if invalidates {
            self.invalidate_cache();
        }
    }

    /// Register or replace a dependency.
    pub fn set_dependency<T: Any + Send + Sync>(&self, name: impl Into<String>, value: Arc<T>) {
        self.inner.dependencies.write().insert(name, value);
    }

    /// Merge dependencies into the router's.
    pub fn set_dependencies(&self, dependencies: Dependencies) {
        self.inner.dependencies.write().extend(&dependencies);
    }

    pub fn get_dependencies(&self) -> Dependencies {
        self.dependencies_snapshot()
    }

    pub(crate) fn dependencies_snapshot(&self) -> Dependencies {
        self.inner.dependencies.read().clone()
    }

    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.lock().stats().clone()
    }

    fn invalidate_cache(&self) {
        #[cfg(feature = "cache")]
        self.inner.cache.lock().clear();
    }

    // ========================================================================
    // Guards and middleware
    // ========================================================================

    /// Register the `canActivate` guard of a route.
    pub fn can_activate(&self, name: impl Into<String>, guard: impl Into<Guard>) {
        self.inner.guards.write().set_can_activate(name, guard.into());
    }

    /// Register the `canDeactivate` guard of a route.
    pub fn can_deactivate(&self, name: impl Into<String>, guard: impl Into<Guard>) {
        self.inner.guards.write().set_can_deactivate(name, guard.into());
    }

    pub fn clear_can_activate(&self, name: &str) {
        self.inner.guards.write().clear_can_activate(name);
    }

    pub fn clear_can_deactivate(&self, name: &str) {
        self.inner.guards.write().clear_can_deactivate(name);
    }

    /// Snapshot of the guard registry.
    pub fn guards(&self) -> GuardRegistry {
        self.inner.guards.read().clone()
    }

    pub(crate) fn activation_guards(&self, segments: &[String]) -> Vec<(String, Guard)> {
        self.inner.guards.read().activation_chain(segments)
    }

    pub(crate) fn deactivation_guards(&self, segments: &[String]) -> Vec<(String, Guard)> {
        self.inner.guards.read().deactivation_chain(segments)
    }

    /// Append middleware to the pipeline.
    pub fn use_middleware<M: RouteMiddleware>(&self, middleware: M) {
        debug_log!("Middleware '{}' registered", middleware.name());
        self.inner.middleware.write().push(Arc::new(middleware));
    }

    pub fn clear_middleware(&self) {
        self.inner.middleware.write().clear();
    }

    pub(crate) fn middleware_snapshot(&self) -> Vec<Arc<dyn RouteMiddleware>> {
        self.inner.middleware.read().iter().cloned().collect()
    }

    // ========================================================================
    // Plugins
    // ========================================================================

    /// Install a plugin. A plugin whose name is already installed is not
    /// installed again; the existing handle is returned.
    pub fn use_plugin<P: Plugin>(&self, plugin: P) -> PluginHandle {
        self.install_plugin(Arc::new(plugin))
    }

    fn install_plugin(&self, plugin: Arc<dyn Plugin>) -> PluginHandle {
        let (handle, installed) = self.inner.plugins.write().register(Arc::clone(&plugin));
        if installed {
            plugin.install(self);
            debug_log!("Plugin '{}' installed", handle.name());
        } else {
            warn_log!("Plugin '{}' is already installed", handle.name());
        }
        handle
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.inner.plugins.read().find(name).is_some()
    }

    /// Remove a plugin and call its `teardown`.
    pub fn remove_plugin(&self, handle: &PluginHandle) -> bool {
        let removed = self.inner.plugins.write().remove(handle);
        match removed {
            Some(plugin) => {
                plugin.teardown();
                debug_log!("Plugin '{}' removed", handle.name());
                true
            }
            None => false,
        }
    }

    pub(crate) fn emit(&self, event: PluginEvent<'_>) {
        let plugins = self.inner.plugins.read().plugins();
        dispatch(&plugins, event);
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// Start the router.
    ///
    /// - a state is committed as is;
    /// - a path is matched and transitioned to, falling back to the default
    ///   route, then to the not-found state when allowed;
    /// - nothing transitions to the default route.
    pub fn start(&self, target: impl Into<StartTarget>) -> PendingTransition {
        let target = target.into();
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return PendingTransition::failed(self.detached_token(), RouterError::RouterAlreadyStarted);
        }
        info_log!("Router started");
        self.emit(PluginEvent::Start);

        let token = self.begin_transition();
        let options = self.get_options();

        match target {
            StartTarget::State(state) => {
                let state = match state.meta {
                    Some(_) => state,
                    None => {
                        let meta = self.inner.tree.read().segment_meta(&state.name);
                        self.make_state(state.name, state.params, state.path, meta, None)
                    }
                };
                let result = self
                    .commit(&token, Arc::new(state), &TransitionPath::default())
                    .inspect(|state| {
                        self.emit(PluginEvent::TransitionSuccess {
                            to: state,
                            from: None,
                            options: &NavigationOptions::default(),
                        });
                    });
                PendingTransition::new(token, futures::future::ready(result).boxed())
            }
            StartTarget::Path(path) => {
                let matched = self.match_route(&path).map(|m| {
                    Arc::new(self.make_state(m.name, m.params, m.path, Some(m.meta), None))
                });
                let router = self.clone();
                let future_token = token.clone();
                let future = async move {
                    let default = options.default_route.clone().map(|name| {
                        RouteTarget::new(name).with_params(options.default_params.clone())
                    });
                    let Some(state) = matched else {
                        let target = match (default, options.allow_not_found) {
                            (Some(default), _) => TransitionTarget::Route(default),
                            (None, true) => TransitionTarget::State(Arc::new(
                                router.make_not_found_state(&path),
                            )),
                            (None, false) => {
                                let error = RouterError::route_not_found(path);
                                router.emit(PluginEvent::TransitionError {
                                    to: None,
                                    from: None,
                                    error: &error,
                                });
                                return Err(error);
                            }
                        };
                        return transition::run(router, target, NavigationOptions::default(), future_token)
                            .await;
                    };

                    let result = transition::run(
                        router.clone(),
                        TransitionTarget::State(state),
                        NavigationOptions::default(),
                        future_token.clone(),
                    )
                    .await;
                    match (result, default) {
                        (Err(error), Some(default)) if !error.is_cancellation() => {
                            debug_log!("Start path failed ({}), using the default route", error);
                            transition::run(
                                router,
                                TransitionTarget::Route(default),
                                NavigationOptions::default(),
                                future_token,
                            )
                            .await
                        }
                        (result, _) => result,
                    }
                };
                PendingTransition::new(token, future.boxed())
            }
            StartTarget::None => match options.default_route {
                Some(name) => {
                    let target = RouteTarget::new(name).with_params(options.default_params);
                    let future = transition::run(
                        self.clone(),
                        TransitionTarget::Route(target),
                        NavigationOptions::default(),
                        token.clone(),
                    );
                    PendingTransition::new(token, future.boxed())
                }
                None => {
                    let error = RouterError::NoStartPathOrState;
                    self.emit(PluginEvent::TransitionError {
                        to: None,
                        from: None,
                        error: &error,
                    });
                    PendingTransition::failed(token, error)
                }
            },
        }
    }

    /// Stop the router: cancel the transition in flight and clear the state.
    pub fn stop(&self) {
        self.cancel();
        if self.inner.started.swap(false, Ordering::SeqCst) {
            self.inner.state.store(None);
            info_log!("Router stopped");
            self.emit(PluginEvent::Stop);
        }
    }

    /// Cancel the transition in flight, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.inner.in_flight.lock().take() {
            debug_log!("Cancelling transition #{}", token.id());
            token.cancel();
        }
    }

    /// Navigate to a route.
    pub fn navigate(
        &self,
        name: &str,
        params: RouteParams,
        options: NavigationOptions,
    ) -> PendingTransition {
        if !self.is_started() {
            return PendingTransition::failed(self.detached_token(), RouterError::RouterNotStarted);
        }
        let token = self.begin_transition();
        let target = RouteTarget::new(name)
            .with_params(params)
            .with_options(options.clone());
        let future = transition::run(
            self.clone(),
            TransitionTarget::Route(target),
            options,
            token.clone(),
        );
        PendingTransition::new(token, future.boxed())
    }

    /// Navigate to the default route.
    pub fn navigate_to_default(&self, options: NavigationOptions) -> PendingTransition {
        let defaults = self.get_options();
        match defaults.default_route {
            Some(name) => self.navigate(&name, defaults.default_params, options),
            None => PendingTransition::failed(
                self.detached_token(),
                RouterError::route_not_found(String::new()),
            ),
        }
    }

    /// Cancel the transition in flight and install a fresh token.
    fn begin_transition(&self) -> CancelToken {
        let id = self.inner.next_navigation_id.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancelToken::new(id);
        let previous = self.inner.in_flight.lock().replace(token.clone());
        if let Some(previous) = previous {
            debug_log!("Transition #{} superseded by #{}", previous.id(), id);
            previous.cancel();
        }
        token
    }

    fn detached_token(&self) -> CancelToken {
        CancelToken::new(self.inner.next_navigation_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Commit `to` if `token` is still live.
    pub(crate) fn commit(
        &self,
        token: &CancelToken,
        to: Arc<State>,
        path: &TransitionPath,
    ) -> Result<Arc<State>, RouterError> {
        {
            let mut in_flight = self.inner.in_flight.lock();
            if token.is_cancelled() {
                return Err(RouterError::TransitionCancelled);
            }
            self.inner.state.store(Some(Arc::clone(&to)));
            if in_flight.as_ref().is_some_and(|t| t.id() == token.id()) {
                *in_flight = None;
            }
        }
        info_log!("Committed state '{}' ({})", to.name, to.path);

        if self.inner.options.read().auto_clean_up && !path.to_deactivate.is_empty() {
            let mut guards = self.inner.guards.write();
            for segment in &path.to_deactivate {
                if guards.clear_can_deactivate(segment).is_some() {
                    trace_log!("Cleared canDeactivate of '{}'", segment);
                }
            }
        }
        Ok(to)
    }

    // ========================================================================
    // Cloning
    // ========================================================================

    /// A fresh, stopped router sharing nothing with this one but copies of
    /// its routes, guards, middleware, options and dependencies. Plugins are
    /// installed again.
    pub fn clone_router(&self, dependencies: Option<Dependencies>) -> Router {
        let mut deps = self.dependencies_snapshot();
        if let Some(extra) = dependencies {
            deps.extend(&extra);
        }
        let clone = Self::from_parts(
            self.tree(),
            self.get_options(),
            deps,
            self.guards(),
            self.inner.middleware.read().clone(),
        );
        let plugins = self.inner.plugins.read().plugins();
        for plugin in plugins {
            clone.install_plugin(plugin);
        }
        clone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::NavigationAction;
    use crate::middleware::middleware_fn;
    use futures::executor::block_on;

    fn router() -> Router {
        create_router(
            vec![
                RouteDef::new("home", "/"),
                RouteDef::new("users", "/users?sort")
                    .child(RouteDef::new("view", "/:id"))
                    .child(RouteDef::new("edit", "/:id/edit")),
            ],
            RouterOptions::new().default_route("home"),
            None,
        )
        .expect("valid routes")
    }

    #[test]
    fn test_navigate_requires_start() {
        let r = router();
        let result = block_on(r.navigate("home", RouteParams::new(), NavigationOptions::default()));
        assert_eq!(result, Err(RouterError::RouterNotStarted));
    }

    #[test]
    fn test_start_twice() {
        let r = router();
        assert!(block_on(r.start(StartTarget::None)).is_ok());
        assert_eq!(
            block_on(r.start(StartTarget::None)),
            Err(RouterError::RouterAlreadyStarted)
        );
    }

    #[test]
    fn test_state_ids_increase() {
        let r = router();
        let a = r.make_state("home", RouteParams::new(), "/", None, None);
        let b = r.make_state("home", RouteParams::new(), "/", None, None);
        assert!(b.id() > a.id());
        assert_eq!(a, b);
    }

    #[test]
    fn test_are_states_equal_ignoring_query() {
        let r = router();
        let a = State::new("users.view", RouteParams::from([("id", "1"), ("sort", "a")]), "");
        let b = State::new("users.view", RouteParams::from([("id", "1"), ("sort", "b")]), "");
        assert!(r.are_states_equal(&a, &b, true));
        assert!(!r.are_states_equal(&a, &b, false));
    }

    #[test]
    fn test_is_active() {
        let r = router();
        block_on(r.start("/users/3")).unwrap();
        let id = RouteParams::from([("id", "3")]);
        assert!(r.is_active("users.view", &id, false, true));
        assert!(r.is_active("users", &RouteParams::new(), false, true));
        assert!(!r.is_active("users", &RouteParams::new(), true, true));
        assert!(!r.is_active("home", &RouteParams::new(), false, true));
    }

    #[test]
    fn test_match_path_not_found() {
        let r = router();
        assert!(r.match_path("/missing", None).is_none());
        r.set_option(RouterOption::AllowNotFound(true));
        let state = r.match_path("/missing", None).unwrap();
        assert!(state.is_not_found());
        assert_eq!(r.build_path(UNKNOWN_ROUTE, &state.params).unwrap(), "/missing");
    }

    #[test]
    fn test_match_path_records_source() {
        let r = router();
        let state = r.match_path("/users/1", Some("popstate")).unwrap();
        assert_eq!(state.source(), Some("popstate"));
        assert!(state.meta.unwrap().params.contains_key("users.view"));
    }

    #[test]
    fn test_middleware_redirect_is_followed() {
        let r = router();
        r.use_middleware(middleware_fn(|ctx| {
            if ctx.to.name == "users.edit" {
                NavigationAction::redirect(("users.view", ctx.to.params.clone()))
            } else {
                NavigationAction::Continue
            }
        }));
        block_on(r.start(StartTarget::None)).unwrap();
        let state = block_on(r.navigate(
            "users.edit",
            RouteParams::from([("id", "9")]),
            NavigationOptions::default(),
        ))
        .unwrap();
        assert_eq!(state.name, "users.view");
        assert!(state.meta.as_ref().is_some_and(|m| m.redirected));
    }

    #[test]
    fn test_clone_router_is_independent() {
        let r = router();
        block_on(r.start(StartTarget::None)).unwrap();
        let copy = r.clone_router(None);
        assert!(!copy.is_started());
        assert!(copy.get_state().is_none());
        assert!(copy.build_path("users.view", &RouteParams::from([("id", "1")])).is_ok());
    }

    #[cfg(feature = "cache")]
    #[test]
    fn test_cache_invalidated_on_add() {
        let r = router();
        assert!(r.match_path("/about", None).is_none());
        r.add([RouteDef::new("about", "/about")]).unwrap();
        assert_eq!(r.match_path("/about", None).unwrap().name, "about");
        assert!(r.cache_stats().invalidations >= 2);
    }
}
