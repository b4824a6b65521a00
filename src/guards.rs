//! Route guards: `canActivate` and `canDeactivate`.
//!
//! Guards are checked **before** a transition commits. A `canDeactivate`
//! guard is attached to a route segment and asked whether the segment may be
//! left; a `canActivate` guard is asked whether it may be entered. Either
//! may also redirect the transition elsewhere.
//!
//! Guards are asynchronous: [`RouteGuard::check`] returns a boxed future so
//! a guard can wait on a confirmation dialog or a network call. The engine
//! only resumes a superseded transition to observe its cancellation.
//!
//! # Creating guards
//!
//! | Approach | When to use |
//! |----------|-------------|
//! | `true` / `false` | Constant answer, see [`Guard::Allow`] / [`Guard::Deny`] |
//! | [`guard_fn`] | Synchronous closure |
//! | [`async_guard_fn`] | Closure returning a future |
//! | Implement [`RouteGuard`] | Named guard with its own state |
//!
//! # Composition
//!
//! | Combinator | Logic |
//! |------------|-------|
//! | [`Guards`] | AND, the first non-continue answer wins |
//! | [`NotGuard`] | Invert, allow becomes deny and deny becomes allow |
//!
//! # Example
//!
//! ```
//! use navigator_core::{guard_fn, Guard, NavigationAction};
//!
//! let leave_ok: Guard = true.into();
//! let only_admins = Guard::handler(guard_fn(|ctx| {
//!     if ctx.to.params.get("role") == Some("admin") {
//!         NavigationAction::Continue
//!     } else {
//!         NavigationAction::redirect("login")
//!     }
//! }));
//! # let _ = (leave_ok, only_admins);
//! ```

use crate::lifecycle::{ActionFuture, NavigationAction, TransitionContext};
use futures::future::{self, FutureExt};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

// ============================================================================
// RouteGuard trait
// ============================================================================

/// Asynchronous guard of a route segment.
///
/// # Example
///
/// ```
/// use navigator_core::{ActionFuture, NavigationAction, RouteGuard, TransitionContext};
/// use futures::FutureExt;
///
/// struct RequireId;
///
/// impl RouteGuard for RequireId {
///     fn check<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a> {
///         let action = if ctx.to.params.contains("id") {
///             NavigationAction::Continue
///         } else {
///             NavigationAction::deny("id required")
///         };
///         futures::future::ready(action).boxed()
///     }
///
///     fn name(&self) -> &'static str {
///         "RequireId"
///     }
/// }
/// ```
pub trait RouteGuard: Send + Sync + 'static {
    /// Decide whether the transition may proceed.
    ///
    /// Returns:
    /// - [`NavigationAction::Continue`] to allow
    /// - [`NavigationAction::Deny`] to veto
    /// - [`NavigationAction::Redirect`] to transition somewhere else
    fn check<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a>;

    /// Guard name for logs.
    fn name(&self) -> &'static str {
        "RouteGuard"
    }
}

// ============================================================================
// Guard
// ============================================================================

/// A registered guard: a constant or a handler.
#[derive(Clone)]
pub enum Guard {
    /// Always allow.
    Allow,
    /// Always deny, without a reason.
    Deny,
    /// Ask a handler.
    Handler(Arc<dyn RouteGuard>),
}

impl Guard {
    /// Wrap a [`RouteGuard`].
    pub fn handler<G: RouteGuard>(guard: G) -> Self {
        Self::Handler(Arc::new(guard))
    }

    /// Evaluate the guard.
    pub fn evaluate<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a> {
        match self {
            Self::Allow => future::ready(NavigationAction::Continue).boxed(),
            Self::Deny => future::ready(NavigationAction::deny_silently()).boxed(),
            Self::Handler(guard) => guard.check(ctx),
        }
    }

    /// Name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Handler(guard) => guard.name(),
        }
    }
}

impl From<bool> for Guard {
    fn from(allowed: bool) -> Self {
        if allowed {
            Self::Allow
        } else {
            Self::Deny
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("Guard::Allow"),
            Self::Deny => f.write_str("Guard::Deny"),
            Self::Handler(guard) => f.debug_tuple("Guard::Handler").field(&guard.name()).finish(),
        }
    }
}

// ============================================================================
// guard_fn / async_guard_fn helpers
// ============================================================================

/// Create a guard from a synchronous closure.
///
/// # Example
///
/// ```
/// use navigator_core::{guard_fn, NavigationAction};
///
/// let guard = guard_fn(|ctx| NavigationAction::from(ctx.from.is_some()));
/// # let _ = guard;
/// ```
pub const fn guard_fn<F>(f: F) -> FnGuard<F>
where
    F: Fn(&TransitionContext) -> NavigationAction + Send + Sync + 'static,
{
    FnGuard { f }
}

/// Guard created by [`guard_fn`].
pub struct FnGuard<F> {
    f: F,
}

impl<F> RouteGuard for FnGuard<F>
where
    F: Fn(&TransitionContext) -> NavigationAction + Send + Sync + 'static,
{
    fn check<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a> {
        future::ready((self.f)(ctx)).boxed()
    }
}

/// Create a guard from a closure returning a future.
///
/// The closure receives an owned clone of the context so the future can
/// outlive the call.
///
/// # Example
///
/// ```
/// use navigator_core::{async_guard_fn, NavigationAction};
///
/// let guard = async_guard_fn(|ctx| async move {
///     NavigationAction::from(ctx.to.name != "admin")
/// });
/// # let _ = guard;
/// ```
pub const fn async_guard_fn<F, Fut>(f: F) -> AsyncFnGuard<F>
where
    F: Fn(TransitionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NavigationAction> + Send + 'static,
{
    AsyncFnGuard { f }
}

/// Guard created by [`async_guard_fn`].
pub struct AsyncFnGuard<F> {
    f: F,
}

impl<F, Fut> RouteGuard for AsyncFnGuard<F>
where
    F: Fn(TransitionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NavigationAction> + Send + 'static,
{
    fn check<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a> {
        (self.f)(ctx.clone()).boxed()
    }
}

// ============================================================================
// Guard Composition
// ============================================================================

/// Combines guards with AND logic.
///
/// Guards are checked in insertion order; the first non-continue answer is
/// returned immediately.
///
/// # Example
///
/// ```
/// use navigator_core::{guard_fn, Guards, NavigationAction};
///
/// let guard = Guards::builder()
///     .guard(guard_fn(|_| NavigationAction::Continue))
///     .guard(guard_fn(|ctx| NavigationAction::from(ctx.to.params.contains("id"))))
///     .build();
/// # let _ = guard;
/// ```
pub struct Guards {
    guards: Vec<Box<dyn RouteGuard>>,
}

impl Guards {
    /// Compose boxed guards.
    #[must_use]
    pub fn new(guards: Vec<Box<dyn RouteGuard>>) -> Self {
        Self { guards }
    }

    /// Start building a composition.
    pub fn builder() -> GuardBuilder {
        GuardBuilder::new()
    }
}

impl RouteGuard for Guards {
    fn check<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a> {
        async move {
            for guard in &self.guards {
                let action = guard.check(ctx).await;
                if !action.is_continue() {
                    return action;
                }
            }
            NavigationAction::Continue
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "Guards"
    }
}

/// Builder for [`Guards`].
#[must_use]
pub struct GuardBuilder {
    guards: Vec<Box<dyn RouteGuard>>,
}

impl GuardBuilder {
    pub fn new() -> Self {
        Self { guards: Vec::new() }
    }

    /// Add a guard.
    pub fn guard<G: RouteGuard>(mut self, guard: G) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    #[must_use]
    pub fn build(self) -> Guards {
        Guards::new(self.guards)
    }
}

impl Default for GuardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Inverts a guard.
///
/// - `Continue` becomes `Deny`
/// - `Deny` becomes `Continue`
/// - `Redirect` is kept
pub struct NotGuard {
    guard: Box<dyn RouteGuard>,
}

impl NotGuard {
    pub fn new<G: RouteGuard>(guard: G) -> Self {
        Self {
            guard: Box::new(guard),
        }
    }
}

impl RouteGuard for NotGuard {
    fn check<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a> {
        self.guard
            .check(ctx)
            .map(|action| match action {
                NavigationAction::Continue => NavigationAction::deny_silently(),
                NavigationAction::Deny { .. } => NavigationAction::Continue,
                redirect @ NavigationAction::Redirect { .. } => redirect,
            })
            .boxed()
    }

    fn name(&self) -> &'static str {
        "NotGuard"
    }
}

// ============================================================================
// GuardRegistry
// ============================================================================

/// Per-segment `canActivate` and `canDeactivate` guards.
///
/// A segment without an entry is allowed.
#[derive(Debug, Clone, Default)]
pub struct GuardRegistry {
    activate: HashMap<String, Guard>,
    deactivate: HashMap<String, Guard>,
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the `canActivate` guard of `segment`.
    pub fn set_can_activate(&mut self, segment: impl Into<String>, guard: Guard) {
        self.activate.insert(segment.into(), guard);
    }

    /// Register (or replace) the `canDeactivate` guard of `segment`.
    pub fn set_can_deactivate(&mut self, segment: impl Into<String>, guard: Guard) {
        self.deactivate.insert(segment.into(), guard);
    }

    pub fn clear_can_activate(&mut self, segment: &str) -> Option<Guard> {
        self.activate.remove(segment)
    }

    pub fn clear_can_deactivate(&mut self, segment: &str) -> Option<Guard> {
        self.deactivate.remove(segment)
    }

    pub fn can_activate(&self, segment: &str) -> Option<&Guard> {
        self.activate.get(segment)
    }

    pub fn can_deactivate(&self, segment: &str) -> Option<&Guard> {
        self.deactivate.get(segment)
    }

    /// Guards of `segments`, in the given order, skipping unguarded ones.
    pub(crate) fn activation_chain(&self, segments: &[String]) -> Vec<(String, Guard)> {
        collect_chain(&self.activate, segments)
    }

    pub(crate) fn deactivation_chain(&self, segments: &[String]) -> Vec<(String, Guard)> {
        collect_chain(&self.deactivate, segments)
    }
}

fn collect_chain(guards: &HashMap<String, Guard>, segments: &[String]) -> Vec<(String, Guard)> {
    segments
        .iter()
        .filter_map(|s| guards.get(s).map(|g| (s.clone(), g.clone())))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::Dependencies;
    use crate::params::RouteParams;
    use crate::state::{NavigationOptions, State};
    use futures::executor::block_on;

    fn make_context(to: &str) -> TransitionContext {
        TransitionContext::new(
            Arc::new(State::new(to, RouteParams::new(), format!("/{to}"))),
            None,
            Dependencies::new(),
            NavigationOptions::default(),
        )
    }

    #[test]
    fn test_constant_guards() {
        let ctx = make_context("home");
        assert!(block_on(Guard::from(true).evaluate(&ctx)).is_continue());
        assert!(block_on(Guard::from(false).evaluate(&ctx)).is_deny());
    }

    #[test]
    fn test_guard_fn_helper() {
        let guard = Guard::handler(guard_fn(|ctx| {
            if ctx.to.name == "admin" {
                NavigationAction::redirect("login")
            } else {
                NavigationAction::Continue
            }
        }));
        assert!(block_on(guard.evaluate(&make_context("home"))).is_continue());
        let action = block_on(guard.evaluate(&make_context("admin")));
        assert_eq!(action.redirect_target().map(|t| t.name.as_str()), Some("login"));
    }

    #[test]
    fn test_async_guard_fn_helper() {
        let guard = async_guard_fn(|ctx| async move {
            NavigationAction::from(ctx.to.name.starts_with("public"))
        });
        assert!(block_on(guard.check(&make_context("public.docs"))).is_continue());
        assert!(block_on(guard.check(&make_context("private"))).is_deny());
    }

    #[test]
    fn test_guards_short_circuit() {
        let guard = Guards::builder()
            .guard(guard_fn(|_| NavigationAction::deny("first")))
            .guard(guard_fn(|_| panic!("second guard must not run")))
            .build();
        let action = block_on(guard.check(&make_context("home")));
        assert_eq!(
            action,
            NavigationAction::Deny {
                reason: Some("first".into())
            }
        );
    }

    #[test]
    fn test_not_guard() {
        let ctx = make_context("login");
        let inverted = NotGuard::new(guard_fn(|_| NavigationAction::Continue));
        assert!(block_on(inverted.check(&ctx)).is_deny());

        let inverted = NotGuard::new(guard_fn(|_| NavigationAction::deny("no")));
        assert!(block_on(inverted.check(&ctx)).is_continue());

        let inverted = NotGuard::new(guard_fn(|_| NavigationAction::redirect("home")));
        assert!(block_on(inverted.check(&ctx)).is_redirect());
    }

    #[test]
    fn test_registry_chains_keep_order() {
        let mut registry = GuardRegistry::new();
        registry.set_can_activate("a", Guard::Allow);
        registry.set_can_activate("a.b.c", Guard::Deny);
        registry.set_can_deactivate("a.b", Guard::Deny);

        let segments = vec!["a".to_string(), "a.b".to_string(), "a.b.c".to_string()];
        let chain: Vec<_> = registry
            .activation_chain(&segments)
            .into_iter()
            .map(|(s, _)| s)
            .collect();
        assert_eq!(chain, vec!["a", "a.b.c"]);

        assert!(registry.clear_can_deactivate("a.b").is_some());
        assert!(registry.deactivation_chain(&segments).is_empty());
    }
}
