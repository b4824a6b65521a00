//! Transition middleware.
//!
//! Middleware runs **after** every guard has allowed a transition and
//! **before** it commits. Unlike guards, which belong to one route segment,
//! middleware sees every transition: it is the place for logging, data
//! prefetching, analytics, or app-wide redirects.
//!
//! # Execution order
//!
//! Middleware executes in **registration order**. The first answer that is
//! not [`NavigationAction::Continue`] short-circuits the pipeline:
//! a `Deny` cancels the transition, a `Redirect` restarts it towards the new
//! target.
//!
//! # Creating middleware
//!
//! | Approach | When to use |
//! |----------|-------------|
//! | Implement [`RouteMiddleware`] | Named, with its own state |
//! | [`middleware_fn`] | Quick synchronous closure |
//! | [`async_middleware_fn`] | Closure returning a future |
//!
//! # Example
//!
//! ```
//! use navigator_core::{ActionFuture, NavigationAction, RouteMiddleware, TransitionContext};
//! use futures::FutureExt;
//!
//! struct LoggingMiddleware;
//!
//! impl RouteMiddleware for LoggingMiddleware {
//!     fn handle<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a> {
//!         println!("{:?} -> {}", ctx.from_name(), ctx.to.name);
//!         futures::future::ready(NavigationAction::Continue).boxed()
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "LoggingMiddleware"
//!     }
//! }
//! ```

use crate::lifecycle::{ActionFuture, NavigationAction, TransitionContext};
use futures::future::{self, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

// ============================================================================
// RouteMiddleware trait
// ============================================================================

/// Observer of every transition that may veto or redirect it.
pub trait RouteMiddleware: Send + Sync + 'static {
    /// Inspect the transition.
    fn handle<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a>;

    /// Middleware name for logs and [`RouterError::MiddlewareVeto`](crate::RouterError::MiddlewareVeto).
    fn name(&self) -> &'static str {
        "RouteMiddleware"
    }
}

// ============================================================================
// middleware_fn helpers
// ============================================================================

/// Create middleware from a synchronous closure.
///
/// # Example
///
/// ```
/// use navigator_core::{middleware_fn, NavigationAction};
///
/// let mw = middleware_fn(|ctx| {
///     if ctx.to.name == "legacy" {
///         NavigationAction::redirect("home")
///     } else {
///         NavigationAction::Continue
///     }
/// });
/// # let _ = mw;
/// ```
pub const fn middleware_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(&TransitionContext) -> NavigationAction + Send + Sync + 'static,
{
    FnMiddleware { f }
}

/// Middleware created by [`middleware_fn`].
pub struct FnMiddleware<F> {
    f: F,
}

impl<F> RouteMiddleware for FnMiddleware<F>
where
    F: Fn(&TransitionContext) -> NavigationAction + Send + Sync + 'static,
{
    fn handle<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a> {
        future::ready((self.f)(ctx)).boxed()
    }
}

/// Create middleware from a closure returning a future.
pub const fn async_middleware_fn<F, Fut>(f: F) -> AsyncFnMiddleware<F>
where
    F: Fn(TransitionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NavigationAction> + Send + 'static,
{
    AsyncFnMiddleware { f }
}

/// Middleware created by [`async_middleware_fn`].
pub struct AsyncFnMiddleware<F> {
    f: F,
}

impl<F, Fut> RouteMiddleware for AsyncFnMiddleware<F>
where
    F: Fn(TransitionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NavigationAction> + Send + 'static,
{
    fn handle<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a> {
        (self.f)(ctx.clone()).boxed()
    }
}

// ============================================================================
// MiddlewarePipeline
// ============================================================================

/// Ordered list of middleware.
#[derive(Clone, Default)]
pub struct MiddlewarePipeline {
    entries: Vec<Arc<dyn RouteMiddleware>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append middleware at the end of the pipeline.
    pub fn push(&mut self, middleware: Arc<dyn RouteMiddleware>) {
        self.entries.push(middleware);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Middleware in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn RouteMiddleware>> {
        self.entries.iter()
    }
}

impl fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|m| m.name()))
            .finish()
    }
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
    use std::sync::Mutex;

    fn make_context(to: &str) -> TransitionContext {
        TransitionContext::new(
            Arc::new(State::new(to, RouteParams::new(), format!("/{to}"))),
            None,
            Dependencies::new(),
            NavigationOptions::default(),
        )
    }

    struct Recording {
        label: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl RouteMiddleware for Recording {
        fn handle<'a>(&'a self, ctx: &'a TransitionContext) -> ActionFuture<'a> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.label, ctx.to.name));
            future::ready(NavigationAction::Continue).boxed()
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    #[test]
    fn test_pipeline_keeps_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = MiddlewarePipeline::new();
        for label in ["first", "second"] {
            pipeline.push(Arc::new(Recording {
                label,
                calls: calls.clone(),
            }));
        }

        let ctx = make_context("home");
        for mw in pipeline.iter() {
            assert!(block_on(mw.handle(&ctx)).is_continue());
        }

        assert_eq!(*calls.lock().unwrap(), vec!["first:home", "second:home"]);
        assert_eq!(format!("{pipeline:?}"), r#"["first", "second"]"#);

        pipeline.clear();
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_middleware_fn_redirect() {
        let mw = middleware_fn(|ctx| {
            if ctx.to.name == "legacy" {
                NavigationAction::redirect("home")
            } else {
                NavigationAction::Continue
            }
        });
        assert!(block_on(mw.handle(&make_context("legacy"))).is_redirect());
        assert!(block_on(mw.handle(&make_context("home"))).is_continue());
    }

    #[test]
    fn test_async_middleware_fn() {
        let mw = async_middleware_fn(|ctx| async move {
            NavigationAction::from(ctx.from.is_some())
        });
        assert!(block_on(mw.handle(&make_context("home"))).is_deny());
    }
}
