//! Navigation actions and the context handed to guards and middleware.
//!
//! This module defines the vocabulary shared by every decision point of a
//! transition:
//!
//! - [`NavigationAction`]: the unified answer of guards and middleware. It
//!   describes whether the transition should continue, be denied, or be
//!   redirected to another route.
//! - [`RouteTarget`]: a route name plus params and navigation options, used
//!   as a redirect destination.
//! - [`TransitionContext`]: what a guard or middleware sees: the target
//!   state, the state being left, the router dependencies and the options of
//!   the navigation.
//!
//! # Transition pipeline
//!
//! 1. **Matching**: the target is resolved against the route tree
//! 2. **`canDeactivate`**: guards of exiting segments, innermost first
//! 3. **`canActivate`**: guards of entering segments, outermost first
//! 4. **Middleware**: in registration order
//! 5. **Commit**: the target becomes the current state

use crate::dependencies::Dependencies;
use crate::params::RouteParams;
use crate::state::{NavigationOptions, State};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Boxed future resolving to a [`NavigationAction`].
pub type ActionFuture<'a> = BoxFuture<'a, NavigationAction>;

// ============================================================================
// RouteTarget
// ============================================================================

/// Named route destination.
///
/// # Example
///
/// ```
/// use navigator_core::{RouteParams, RouteTarget};
///
/// let target = RouteTarget::new("users.view").with_params(RouteParams::from([("id", "7")]));
/// assert_eq!(target.name, "users.view");
/// assert_eq!(target.params.get("id"), Some("7"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    /// Full route name.
    pub name: String,
    /// Route params.
    pub params: RouteParams,
    /// Options of the navigation.
    pub options: NavigationOptions,
}

impl RouteTarget {
    /// Target with no params and default options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: RouteParams::new(),
            options: NavigationOptions::default(),
        }
    }

    /// Replace the params.
    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the options.
    pub fn with_options(mut self, options: NavigationOptions) -> Self {
        self.options = options;
        self
    }
}

impl From<&str> for RouteTarget {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for RouteTarget {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl<P: Into<RouteParams>> From<(&str, P)> for RouteTarget {
    fn from((name, params): (&str, P)) -> Self {
        Self::new(name).with_params(params.into())
    }
}

// ============================================================================
// NavigationAction
// ============================================================================

/// Answer of a guard or middleware.
///
/// # Example
///
/// ```
/// use navigator_core::NavigationAction;
///
/// let action = NavigationAction::deny("Not authorized");
/// assert!(action.is_deny());
///
/// let action = NavigationAction::redirect("login");
/// assert_eq!(action.redirect_target().map(|t| t.name.as_str()), Some("login"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    /// Allow the transition to proceed.
    Continue,

    /// Veto the transition.
    Deny {
        /// Optional human-readable reason.
        reason: Option<String>,
    },

    /// Abandon the current target and transition to another one.
    Redirect {
        /// Route to redirect to.
        to: RouteTarget,
        /// Optional human-readable reason.
        reason: Option<String>,
    },
}

impl NavigationAction {
    /// Alias for [`Continue`](Self::Continue).
    pub fn allow() -> Self {
        Self::Continue
    }

    /// Deny with a reason.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: Some(reason.into()),
        }
    }

    /// Deny without a reason.
    pub fn deny_silently() -> Self {
        Self::Deny { reason: None }
    }

    /// Redirect to a route.
    pub fn redirect(to: impl Into<RouteTarget>) -> Self {
        Self::Redirect {
            to: to.into(),
            reason: None,
        }
    }

    /// Redirect to a route with a reason.
    pub fn redirect_with_reason(to: impl Into<RouteTarget>, reason: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            reason: Some(reason.into()),
        }
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Redirect destination, if this is a redirect.
    pub fn redirect_target(&self) -> Option<&RouteTarget> {
        match self {
            Self::Redirect { to, .. } => Some(to),
            _ => None,
        }
    }
}

impl From<bool> for NavigationAction {
    fn from(allowed: bool) -> Self {
        if allowed {
            Self::Continue
        } else {
            Self::deny_silently()
        }
    }
}

// ============================================================================
// TransitionContext
// ============================================================================

/// Input of every guard and middleware call.
///
/// Cloning is cheap: states are shared and dependencies are reference counted.
#[derive(Debug, Clone)]
pub struct TransitionContext {
    /// Target state.
    pub to: Arc<State>,
    /// State being left, `None` on the first transition.
    pub from: Option<Arc<State>>,
    /// Snapshot of the router dependencies.
    pub dependencies: Dependencies,
    /// Options of the navigation.
    pub options: NavigationOptions,
}

impl TransitionContext {
    pub(crate) fn new(
        to: Arc<State>,
        from: Option<Arc<State>>,
        dependencies: Dependencies,
        options: NavigationOptions,
    ) -> Self {
        Self {
            to,
            from,
            dependencies,
            options,
        }
    }

    /// Name of the state being left.
    pub fn from_name(&self) -> Option<&str> {
        self.from.as_deref().map(|s| s.name.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
