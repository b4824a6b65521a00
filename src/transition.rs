//! The transition engine.
//!
//! A transition moves the router from its current state to a target state:
//!
//! ```text
//! Idle → Matching → Deactivating → Activating → Middleware → Committing
//!                                                        ↘ Success | Error | Cancelled → Idle
//! ```
//!
//! Only the segments that actually change are guarded. [`transition_path`]
//! finds the *point of difference* between the two states: the first route
//! segment whose name or parameters differ. Segments of the current state
//! from that point are deactivated (innermost first) and segments of the
//! target from that point are activated (outermost first). The last shared
//! segment is the *intersection*.
//!
//! ```
//! use navigator_core::{transition_path, RouteParams, State};
//!
//! let from = State::new("users.view", RouteParams::from([("id", "1")]), "/users/1");
//! let to = State::new("users.edit", RouteParams::from([("id", "1")]), "/users/1/edit");
//!
//! let path = transition_path(&to, Some(&from), false);
//! assert_eq!(path.intersection, "users");
//! assert_eq!(path.to_deactivate, vec!["users.view"]);
//! assert_eq!(path.to_activate, vec!["users.edit"]);
//! ```
//!
//! # Cancellation
//!
//! Each run owns a [`CancelToken`]. Starting a new navigation cancels the
//! token of the one in flight; the superseded run notices at its next
//! resumption point (before matching, after every guard or middleware) and
//! ends with [`RouterError::TransitionCancelled`]. Commit re-checks the
//! token under the router's transition lock, so of several overlapping
//! navigations at most one commits.

use crate::error::RouterError;
use crate::lifecycle::{NavigationAction, RouteTarget, TransitionContext};
use crate::plugin::PluginEvent;
use crate::router::Router;
use crate::state::{segment_ids, NavigationOptions, State};
use crate::{debug_log, error_log, info_log, trace_log, warn_log};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Maximum number of redirects followed by one navigation.
pub const MAX_REDIRECTS: usize = 10;

/// Result of a transition.
pub type TransitionResult = Result<Arc<State>, RouterError>;

// ============================================================================
// Phases
// ============================================================================

/// Phase of a running transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionPhase {
    Idle,
    Matching,
    Deactivating,
    Activating,
    Middleware,
    Committing,
    Success,
    Error,
    Cancelled,
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Matching => "matching",
            Self::Deactivating => "deactivating",
            Self::Activating => "activating",
            Self::Middleware => "middleware",
            Self::Committing => "committing",
            Self::Success => "success",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Transition path
// ============================================================================

/// Segments touched by a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionPath {
    /// Last shared segment, `""` for the root.
    pub intersection: String,
    /// Segments to leave, innermost first.
    pub to_deactivate: Vec<String>,
    /// Segments to enter, outermost first.
    pub to_activate: Vec<String>,
}

/// Compute the segments a transition from `from` to `to` touches.
///
/// Segment parameters are compared per `meta.params` of either state; a
/// segment described by neither is compared on all parameters. With
/// `reload`, every segment is left and re-entered.
pub fn transition_path(to: &State, from: Option<&State>, reload: bool) -> TransitionPath {
    let to_ids = segment_ids(&to.name);
    let Some(from) = from else {
        return TransitionPath {
            intersection: String::new(),
            to_deactivate: Vec::new(),
            to_activate: to_ids.into_iter().map(str::to_string).collect(),
        };
    };
    let from_ids = segment_ids(&from.name);

    let point = if reload {
        0
    } else {
        to_ids
            .iter()
            .zip(&from_ids)
            .position(|(t, f)| t != f || !segment_params_equal(t, to, from))
            .unwrap_or_else(|| to_ids.len().min(from_ids.len()))
    };

    TransitionPath {
        intersection: point
            .checked_sub(1)
            .map(|i| from_ids[i].to_string())
            .unwrap_or_default(),
        to_deactivate: from_ids[point..].iter().rev().map(|s| s.to_string()).collect(),
        to_activate: to_ids[point..].iter().map(|s| s.to_string()).collect(),
    }
}

fn segment_params_equal(segment: &str, to: &State, from: &State) -> bool {
    let keys: Vec<&String> = [to, from]
        .iter()
        .filter_map(|s| s.meta.as_ref()?.params.get(segment))
        .flat_map(|params| params.keys())
        .collect();
    if keys.is_empty() && !has_segment_meta(segment, to) && !has_segment_meta(segment, from) {
        return to.params == from.params;
    }
    keys.iter().all(|k| to.params.get(k) == from.params.get(k))
}

fn has_segment_meta(segment: &str, state: &State) -> bool {
    state
        .meta
        .as_ref()
        .is_some_and(|m| m.params.contains_key(segment))
}

// ============================================================================
// Cancellation
// ============================================================================

/// Cancellation flag shared between a running transition and its handles.
#[derive(Debug, Clone)]
pub struct CancelToken {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Navigation id of the transition.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RouterError> {
        if self.is_cancelled() {
            Err(RouterError::TransitionCancelled)
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// PendingTransition
// ============================================================================

/// A navigation in progress.
///
/// Resolves to the committed state or to the error that ended the
/// transition. Like any future it does nothing until polled.
#[must_use = "a transition only runs while its future is polled"]
pub struct PendingTransition {
    token: CancelToken,
    future: BoxFuture<'static, TransitionResult>,
}

impl PendingTransition {
    pub(crate) fn new(token: CancelToken, future: BoxFuture<'static, TransitionResult>) -> Self {
        Self { token, future }
    }

    pub(crate) fn failed(token: CancelToken, error: RouterError) -> Self {
        Self::new(token, Box::pin(futures::future::ready(Err(error))))
    }

    /// Navigation id.
    pub fn id(&self) -> u64 {
        self.token.id()
    }

    /// Cancel this transition. It ends with
    /// [`RouterError::TransitionCancelled`] at its next resumption point.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A cancel handle that outlives the future.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }
}

impl Future for PendingTransition {
    type Output = TransitionResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransition")
            .field("id", &self.token.id())
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// What a transition is heading to.
#[derive(Debug, Clone)]
pub(crate) enum TransitionTarget {
    /// A route to build.
    Route(RouteTarget),
    /// An already built state, e.g. a matched start path.
    State(Arc<State>),
}

enum Outcome {
    Commit(TransitionPath),
    Redirect(RouteTarget),
}

/// Run a transition to completion.
pub(crate) async fn run(
    router: Router,
    target: TransitionTarget,
    options: NavigationOptions,
    token: CancelToken,
) -> TransitionResult {
    let mut target = target;
    let mut options = options;
    let mut redirects = 0;

    loop {
        let from = router.get_state();
        let to = match prepare(&router, &target, &options, redirects > 0, from.as_deref(), &token) {
            Ok(to) => to,
            Err(error) => {
                let to = match &target {
                    TransitionTarget::State(state) => Some(Arc::clone(state)),
                    TransitionTarget::Route(_) => None,
                };
                report(&router, to.as_deref(), from.as_deref(), &error);
                return Err(error);
            }
        };

        info_log!(
            "Transition #{}: '{}' -> '{}'",
            token.id(),
            from.as_deref().map_or("", |s| s.name.as_str()),
            to.name
        );
        router.emit(PluginEvent::TransitionStart {
            to: &to,
            from: from.as_deref(),
        });

        let ctx = TransitionContext::new(
            Arc::clone(&to),
            from.clone(),
            router.dependencies_snapshot(),
            options.clone(),
        );

        match run_phases(&router, &ctx, &token).await {
            Ok(Outcome::Commit(path)) => {
                trace_log!("Transition #{} phase: {}", token.id(), TransitionPhase::Committing);
                if let Err(error) = router.commit(&token, Arc::clone(&to), &path) {
                    report(&router, Some(&to), from.as_deref(), &error);
                    return Err(error);
                }
                trace_log!("Transition #{} phase: {}", token.id(), TransitionPhase::Success);
                router.emit(PluginEvent::TransitionSuccess {
                    to: &to,
                    from: from.as_deref(),
                    options: &options,
                });
                trace_log!("Transition #{} phase: {}", token.id(), TransitionPhase::Idle);
                return Ok(to);
            }
            Ok(Outcome::Redirect(next)) => {
                redirects += 1;
                if redirects > MAX_REDIRECTS {
                    error_log!(
                        "Redirect loop detected after {} redirects navigating to '{}'",
                        MAX_REDIRECTS,
                        next.name
                    );
                    let error = RouterError::RedirectLoop {
                        redirects: MAX_REDIRECTS,
                        target: next.name,
                    };
                    report(&router, Some(&to), from.as_deref(), &error);
                    return Err(error);
                }
                debug_log!("Redirecting from '{}' to '{}'", to.name, next.name);
                options = next.options.clone();
                target = TransitionTarget::Route(next);
            }
            Err(error) => {
                report(&router, Some(&to), from.as_deref(), &error);
                return Err(error);
            }
        }
    }
}

/// Matching phase: resolve the target and reject no-op transitions.
fn prepare(
    router: &Router,
    target: &TransitionTarget,
    options: &NavigationOptions,
    redirected: bool,
    from: Option<&State>,
    token: &CancelToken,
) -> TransitionResult {
    token.check()?;
    trace_log!("Transition #{} phase: {}", token.id(), TransitionPhase::Matching);

    let to = match target {
        TransitionTarget::Route(route) => {
            Arc::new(router.build_target_state(&route.name, &route.params, options, redirected)?)
        }
        TransitionTarget::State(state) => Arc::clone(state),
    };

    if let Some(from) = from {
        if !options.reload && !options.force && router.are_states_equal(&to, from, false) {
            return Err(RouterError::SameStates);
        }
    }
    Ok(to)
}

async fn run_phases(
    router: &Router,
    ctx: &TransitionContext,
    token: &CancelToken,
) -> Result<Outcome, RouterError> {
    let path = transition_path(&ctx.to, ctx.from.as_deref(), ctx.options.reload);

    trace_log!("Transition #{} phase: {}", token.id(), TransitionPhase::Deactivating);
    for (segment, guard) in router.deactivation_guards(&path.to_deactivate) {
        let action = guard.evaluate(ctx).await;
        token.check()?;
        debug_log!("canDeactivate '{}' ({}): {:?}", segment, guard.name(), action);
        match action {
            NavigationAction::Continue => {}
            NavigationAction::Deny { reason } => {
                warn_log!("Leaving '{}' was vetoed", segment);
                return Err(RouterError::CannotDeactivate { segment, reason });
            }
            NavigationAction::Redirect { to, .. } => return Ok(Outcome::Redirect(to)),
        }
    }

    trace_log!("Transition #{} phase: {}", token.id(), TransitionPhase::Activating);
    for (segment, guard) in router.activation_guards(&path.to_activate) {
        let action = guard.evaluate(ctx).await;
        token.check()?;
        debug_log!("canActivate '{}' ({}): {:?}", segment, guard.name(), action);
        match action {
            NavigationAction::Continue => {}
            NavigationAction::Deny { reason } => {
                warn_log!("Entering '{}' was vetoed", segment);
                return Err(RouterError::CannotActivate { segment, reason });
            }
            NavigationAction::Redirect { to, .. } => return Ok(Outcome::Redirect(to)),
        }
    }

    trace_log!("Transition #{} phase: {}", token.id(), TransitionPhase::Middleware);
    for middleware in router.middleware_snapshot() {
        let action = middleware.handle(ctx).await;
        token.check()?;
        debug_log!("Middleware '{}': {:?}", middleware.name(), action);
        match action {
            NavigationAction::Continue => {}
            NavigationAction::Deny { reason } => {
                warn_log!("Middleware '{}' vetoed the transition", middleware.name());
                return Err(RouterError::MiddlewareVeto {
                    middleware: middleware.name().to_string(),
                    reason,
                });
            }
            NavigationAction::Redirect { to, .. } => return Ok(Outcome::Redirect(to)),
        }
    }

    Ok(Outcome::Commit(path))
}

/// Emit the cancel or error event for a failed transition.
fn report(router: &Router, to: Option<&State>, from: Option<&State>, error: &RouterError) {
    if error.is_cancellation() {
        trace_log!("Transition phase: {}", TransitionPhase::Cancelled);
        debug_log!("Transition cancelled: {}", error);
        router.emit(PluginEvent::TransitionCancel { to, from });
    } else {
        trace_log!("Transition phase: {}", TransitionPhase::Error);
        debug_log!("Transition failed: {}", error);
        router.emit(PluginEvent::TransitionError { to, from, error });
    }
}
