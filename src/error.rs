//! Error handling for the router.
//!
//! Two error types cover the two kinds of failure:
//!
//! - [`RouterError`]: recoverable outcome of a navigation, `start`, or path
//!   building call. Each variant maps onto an [`ErrorCode`] via
//!   [`RouterError::code`]. These are delivered through the transition
//!   future and the `TRANSITION_ERROR` / `TRANSITION_CANCEL` events; the
//!   router never panics on them.
//! - [`RouteDefinitionError`]: programming misuse while registering routes
//!   (duplicate names, malformed templates). Returned synchronously by
//!   [`Router::add`](crate::Router::add).
//!
//! # Examples
//!
//! ```
//! use navigator_core::{ErrorCode, RouterError};
//!
//! let err = RouterError::CannotActivate {
//!     segment: "admin".into(),
//!     reason: Some("Not authenticated".into()),
//! };
//! assert_eq!(err.code(), ErrorCode::CannotActivate);
//! assert!(!err.is_cancellation());
//! ```

use crate::constants::ErrorCode;
use thiserror::Error;

/// Outcome of a failed navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Router has not been started.
    #[error("router is not started")]
    RouterNotStarted,

    /// `start` had nothing to start from.
    #[error("no start path or state provided and no default route configured")]
    NoStartPathOrState,

    /// `start` called on a started router.
    #[error("router is already started")]
    RouterAlreadyStarted,

    /// Route name or path does not resolve.
    #[error("route not found: {target}")]
    RouteNotFound {
        /// The route name or path that failed to resolve.
        target: String,
    },

    /// A url parameter required by a route template was not supplied.
    #[error("missing parameter '{param}' for route '{route}'")]
    MissingParameter {
        /// Full route name being built.
        route: String,
        /// Name of the missing parameter.
        param: String,
    },

    /// A url parameter does not satisfy its constraint.
    #[error("parameter '{param}' of route '{route}' does not match its constraint: {value}")]
    InvalidParameter {
        /// Full route name being built.
        route: String,
        /// Name of the offending parameter.
        param: String,
        /// Supplied value.
        value: String,
    },

    /// Target equals the current state.
    #[error("target state is the same as the current state")]
    SameStates,

    /// A `canDeactivate` guard vetoed.
    #[error("cannot deactivate '{segment}'{}", fmt_reason(.reason))]
    CannotDeactivate {
        /// Route segment whose guard vetoed.
        segment: String,
        /// Optional reason supplied by the guard.
        reason: Option<String>,
    },

    /// A `canActivate` guard vetoed.
    #[error("cannot activate '{segment}'{}", fmt_reason(.reason))]
    CannotActivate {
        /// Route segment whose guard vetoed.
        segment: String,
        /// Optional reason supplied by the guard.
        reason: Option<String>,
    },

    /// A middleware vetoed the transition.
    #[error("transition vetoed by middleware '{middleware}'{}", fmt_reason(.reason))]
    MiddlewareVeto {
        /// Name of the vetoing middleware.
        middleware: String,
        /// Optional reason supplied by the middleware.
        reason: Option<String>,
    },

    /// Redirect chain exceeded its bound.
    #[error("redirect loop detected after {redirects} redirects (last target '{target}')")]
    RedirectLoop {
        /// Number of redirects followed.
        redirects: usize,
        /// Last redirect target.
        target: String,
    },

    /// Superseded by a newer navigation or cancelled explicitly.
    #[error("transition cancelled")]
    TransitionCancelled,

    /// Generic engine failure.
    #[error("transition error: {message}")]
    TransitionErr {
        /// Human-readable description.
        message: String,
    },
}

fn fmt_reason(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}

impl RouterError {
    /// Taxonomy code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RouterNotStarted => ErrorCode::RouterNotStarted,
            Self::NoStartPathOrState => ErrorCode::NoStartPathOrState,
            Self::RouterAlreadyStarted => ErrorCode::RouterAlreadyStarted,
            Self::RouteNotFound { .. }
            | Self::MissingParameter { .. }
            | Self::InvalidParameter { .. } => ErrorCode::RouteNotFound,
            Self::SameStates => ErrorCode::SameStates,
            Self::CannotDeactivate { .. } => ErrorCode::CannotDeactivate,
            Self::CannotActivate { .. } => ErrorCode::CannotActivate,
            Self::RedirectLoop { .. } | Self::TransitionErr { .. } => ErrorCode::TransitionErr,
            Self::MiddlewareVeto { .. } | Self::TransitionCancelled => {
                ErrorCode::TransitionCancelled
            }
        }
    }

    /// `true` when the error is reported through `TRANSITION_CANCEL` rather
    /// than `TRANSITION_ERROR`.
    pub fn is_cancellation(&self) -> bool {
        self.code() == ErrorCode::TransitionCancelled
    }

    pub(crate) fn route_not_found(target: impl Into<String>) -> Self {
        Self::RouteNotFound {
            target: target.into(),
        }
    }
}

/// Invalid route registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteDefinitionError {
    /// Empty name, or a dotted name inside a nested definition.
    #[error("invalid route name '{name}'")]
    InvalidName {
        /// Offending name.
        name: String,
    },

    /// Full name already registered.
    #[error("route '{name}' is already defined")]
    DuplicateName {
        /// Offending full name.
        name: String,
    },

    /// Parent of a dotted name does not exist.
    #[error("cannot add route '{name}': parent route '{parent}' is missing")]
    MissingParent {
        /// Full name being added.
        name: String,
        /// Missing parent full name.
        parent: String,
    },

    /// A sibling already uses the same path template.
    #[error("path '{path}' is already defined by a sibling of route '{name}'")]
    DuplicatePath {
        /// Full name being added.
        name: String,
        /// Duplicated path template.
        path: String,
    },

    /// Template could not be parsed.
    #[error("malformed path '{path}': {message}")]
    MalformedPath {
        /// The template source.
        path: String,
        /// What went wrong.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            RouterError::route_not_found("/x").code(),
            ErrorCode::RouteNotFound
        );
        assert_eq!(
            RouterError::MissingParameter {
                route: "users.view".into(),
                param: "id".into()
            }
            .code(),
            ErrorCode::RouteNotFound
        );
        assert_eq!(
            RouterError::RedirectLoop {
                redirects: 10,
                target: "a".into()
            }
            .code(),
            ErrorCode::TransitionErr
        );
    }

    #[test]
    fn test_middleware_veto_is_cancellation() {
        let err = RouterError::MiddlewareVeto {
            middleware: "auth".into(),
            reason: None,
        };
        assert!(err.is_cancellation());
        assert!(!RouterError::SameStates.is_cancellation());
    }

    #[test]
    fn test_display() {
        let err = RouterError::CannotDeactivate {
            segment: "users.edit".into(),
            reason: Some("unsaved changes".into()),
        };
        assert_eq!(
            err.to_string(),
            "cannot deactivate 'users.edit': unsaved changes"
        );
        assert_eq!(
            RouterError::route_not_found("/nope").to_string(),
            "route not found: /nope"
        );
    }
}
