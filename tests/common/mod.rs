//! Test utilities for router integration tests
//!
//! Provides route fixtures, an event-recording plugin, and a guard that
//! suspends until released.

#![allow(dead_code)]

use futures::channel::oneshot;
use futures::FutureExt;
use navigator_core::*;
use parking_lot::Mutex;
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Route table shared by most tests.
pub fn app_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new("home", "/"),
        RouteDef::new("users", "/users").children([
            RouteDef::new("list", "/list"),
            RouteDef::new("view", "/view/:id"),
        ]),
        RouteDef::new("orders", "/orders").children([
            RouteDef::new("pending", "/pending"),
            RouteDef::new("completed", "/completed"),
            RouteDef::new("view", "/view/:id<\\d+>"),
        ]),
        RouteDef::new("settings", "/settings").child(RouteDef::new("account", "/account")),
        RouteDef::new("admin", "/admin"),
        RouteDef::new("search", "/search?q&page"),
    ]
}

/// Router over [`app_routes`] with `home` as default route.
pub fn router() -> Router {
    router_with(RouterOptions::new().default_route("home"))
}

pub fn router_with(options: RouterOptions) -> Router {
    init_logging();
    create_router(app_routes(), options, None).expect("fixture routes are valid")
}

/// Router started on `home`.
pub fn started_router() -> Router {
    let router = router();
    pollster::block_on(router.start(StartTarget::None)).expect("start on home");
    router
}

pub fn params(pairs: &[(&str, &str)]) -> RouteParams {
    pairs.iter().copied().collect()
}

pub fn navigate(router: &Router, name: &str, pairs: &[(&str, &str)]) -> TransitionResult {
    pollster::block_on(router.navigate(name, params(pairs), NavigationOptions::default()))
}

/// Plugin recording every lifecycle event as a short string.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn push(&self, event: String) {
        self.events.lock().push(event);
    }
}

fn name_of(state: Option<&State>) -> &str {
    state.map_or("-", |s| s.name.as_str())
}

impl Plugin for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn on_start(&self) {
        self.push("start".into());
    }

    fn on_stop(&self) {
        self.push("stop".into());
    }

    fn on_transition_start(&self, to: &State, _from: Option<&State>) {
        self.push(format!("transition:{}", to.name));
    }

    fn on_transition_cancel(&self, to: Option<&State>, _from: Option<&State>) {
        self.push(format!("cancel:{}", name_of(to)));
    }

    fn on_transition_error(&self, _to: Option<&State>, _from: Option<&State>, error: &RouterError) {
        self.push(format!("error:{}", error.code()));
    }

    fn on_transition_success(&self, to: &State, from: Option<&State>, _options: &NavigationOptions) {
        self.push(format!("success:{}<-{}", to.name, name_of(from)));
    }
}

/// Guard that suspends until its sender fires, then allows.
pub struct Gate {
    rx: Mutex<Option<oneshot::Receiver<()>>>,
}

impl Gate {
    pub fn new() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Self {
                rx: Mutex::new(Some(rx)),
            },
        )
    }
}

impl RouteGuard for Gate {
    fn check<'a>(&'a self, _ctx: &'a TransitionContext) -> ActionFuture<'a> {
        let rx = self.rx.lock().take();
        async move {
            if let Some(rx) = rx {
                let _ = rx.await;
            }
            NavigationAction::Continue
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "Gate"
    }
}

/// Guard recording the segments it was asked about.
pub fn recording_guard(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Guard {
    let log = Arc::clone(log);
    Guard::handler(guard_fn(move |_| {
        log.lock().push(tag.to_string());
        NavigationAction::Continue
    }))
}
