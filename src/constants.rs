//! Event names and error codes shared with plugins and adapters.
//!
//! The string values match the ones used by router5 so that transport
//! plugins and devtools written against that vocabulary keep working.

use std::fmt;

/// Reserved route name of the "not found" state.
pub const UNKNOWN_ROUTE: &str = "@@router5/UNKNOWN_ROUTE";
/// Emitted once when the router is started.
pub const ROUTER_START: &str = "$start";
/// Emitted once when the router is stopped.
pub const ROUTER_STOP: &str = "$stop";
/// Emitted when a transition towards a resolved target begins.
pub const TRANSITION_START: &str = "$$start";
/// Emitted when a transition ends cancelled.
pub const TRANSITION_CANCEL: &str = "$$cancel";
/// Emitted after a transition has been committed.
pub const TRANSITION_SUCCESS: &str = "$$success";
/// Emitted when a transition fails for any reason other than cancellation.
pub const TRANSITION_ERROR: &str = "$$error";

/// Router lifecycle events dispatched to plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterEvent {
    /// See [`ROUTER_START`].
    RouterStart,
    /// See [`ROUTER_STOP`].
    RouterStop,
    /// See [`TRANSITION_START`].
    TransitionStart,
    /// See [`TRANSITION_CANCEL`].
    TransitionCancel,
    /// See [`TRANSITION_SUCCESS`].
    TransitionSuccess,
    /// See [`TRANSITION_ERROR`].
    TransitionError,
}

impl RouterEvent {
    /// Wire name of the event.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RouterStart => ROUTER_START,
            Self::RouterStop => ROUTER_STOP,
            Self::TransitionStart => TRANSITION_START,
            Self::TransitionCancel => TRANSITION_CANCEL,
            Self::TransitionSuccess => TRANSITION_SUCCESS,
            Self::TransitionError => TRANSITION_ERROR,
        }
    }
}

impl fmt::Display for RouterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error taxonomy of navigation outcomes.
///
/// Every [`RouterError`](crate::RouterError) maps onto exactly one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An operation that needs a started router was called before `start`.
    RouterNotStarted,
    /// `start` was called without a path or state and no default route exists.
    NoStartPathOrState,
    /// `start` was called twice without an intervening `stop`.
    RouterAlreadyStarted,
    /// A path or route name does not resolve against the route tree.
    RouteNotFound,
    /// The target state equals the current state and no reload was requested.
    SameStates,
    /// A `canDeactivate` guard vetoed the transition.
    CannotDeactivate,
    /// A `canActivate` guard vetoed the transition.
    CannotActivate,
    /// Generic engine failure, such as an exceeded redirect bound.
    TransitionErr,
    /// The transition was superseded, cancelled, or vetoed by middleware.
    TransitionCancelled,
}

impl ErrorCode {
    /// Wire value of the code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RouterNotStarted => "NOT_STARTED",
            Self::NoStartPathOrState => "NO_START_PATH_OR_STATE",
            Self::RouterAlreadyStarted => "ALREADY_STARTED",
            Self::RouteNotFound => "ROUTE_NOT_FOUND",
            Self::SameStates => "SAME_STATES",
            Self::CannotDeactivate => "CANNOT_DEACTIVATE",
            Self::CannotActivate => "CANNOT_ACTIVATE",
            Self::TransitionErr => "TRANSITION_ERR",
            Self::TransitionCancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(RouterEvent::TransitionSuccess.as_str(), "$$success");
        assert_eq!(RouterEvent::RouterStart.to_string(), ROUTER_START);
    }

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::TransitionCancelled.as_str(), "CANCELLED");
        assert_eq!(ErrorCode::RouterNotStarted.to_string(), "NOT_STARTED");
    }
}
