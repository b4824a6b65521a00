//! # navigator-core
//!
//! A framework-agnostic route transition engine.
//!
//! The router owns a hierarchical tree of named routes, the current
//! navigation [`State`], and a guarded, cancellable pipeline that moves from
//! one state to the next:
//!
//! 1. the target is built from the route tree (or matched from a path);
//! 2. `canDeactivate` guards of the segments being left run, innermost first;
//! 3. `canActivate` guards of the segments being entered run, outermost first;
//! 4. middleware runs in registration order;
//! 5. the state is committed and plugins are notified.
//!
//! Any guard or middleware may deny the transition or redirect it. Starting a
//! new navigation cancels the one in flight.
//!
//! ## Quick start
//!
//! ```
//! use navigator_core::*;
//!
//! let router = create_router(
//!     vec![
//!         RouteDef::new("home", "/"),
//!         RouteDef::new("admin", "/admin").can_activate(Guard::Deny),
//!         RouteDef::new("users", "/users?page").child(RouteDef::new("view", "/:id<\\d+>")),
//!     ],
//!     RouterOptions::new().default_route("home"),
//!     None,
//! )
//! .unwrap();
//!
//! futures::executor::block_on(async {
//!     router.start("/users/7?page=2").await.unwrap();
//!     assert_eq!(router.get_state().unwrap().name, "users.view");
//!
//!     let denied = router
//!         .navigate("admin", RouteParams::new(), NavigationOptions::default())
//!         .await;
//!     assert_eq!(denied.unwrap_err().code(), ErrorCode::CannotActivate);
//! });
//! ```
//!
//! ## Features
//!
//! - `log` (default): log through the [`log`](https://docs.rs/log) facade
//! - `tracing`: log through [`tracing`](https://docs.rs/tracing) instead
//! - `cache` (default): LRU cache of path matches
//! - `serde`: `Serialize`/`Deserialize` for states, params and options

pub mod constants;
pub mod dependencies;
pub mod error;
pub mod guards;
pub mod lifecycle;
pub mod listeners;
pub mod logging;
pub mod middleware;
pub mod options;
pub mod params;
pub mod path;
pub mod plugin;
pub mod router;
pub mod state;
pub mod transition;
pub mod tree;

#[cfg(feature = "cache")]
pub mod cache;

pub use constants::{
    ErrorCode, RouterEvent, ROUTER_START, ROUTER_STOP, TRANSITION_CANCEL, TRANSITION_ERROR,
    TRANSITION_START, TRANSITION_SUCCESS, UNKNOWN_ROUTE,
};
pub use dependencies::{Dependencies, Dependency};
pub use error::{RouteDefinitionError, RouterError};
pub use guards::{async_guard_fn, guard_fn, Guard, GuardBuilder, GuardRegistry, Guards, NotGuard, RouteGuard};
pub use lifecycle::{ActionFuture, NavigationAction, RouteTarget, TransitionContext};
pub use listeners::{Listener, ListenerId, Listeners, ListenersOptions, ListenersPlugin, LISTENERS_PLUGIN};
pub use middleware::{async_middleware_fn, middleware_fn, MiddlewarePipeline, RouteMiddleware};
pub use options::{RouterOption, RouterOptions, TrailingSlash};
pub use params::RouteParams;
pub use path::{PathTemplate, PathToken};
pub use plugin::{Plugin, PluginHandle};
pub use router::{create_router, Router, StartTarget};
pub use state::{NavigationOptions, ParamSource, SegmentParams, State, StateMeta};
pub use transition::{
    transition_path, CancelToken, PendingTransition, TransitionPath, TransitionPhase,
    TransitionResult, MAX_REDIRECTS,
};
pub use tree::{RouteDef, RouteMatch, RouteNode, RouteTree};
