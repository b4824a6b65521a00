//! Plugin host and listeners plugin tests

mod common;

use common::*;
use navigator_core::*;
use parking_lot::Mutex;
use pollster::block_on;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_duplicate_plugin_is_not_installed_twice() {
    let router = router();
    let recorder = Recorder::default();

    let first = router.use_plugin(recorder.clone());
    let second = router.use_plugin(recorder.clone());

    assert_eq!(first, second);
    assert!(router.has_plugin("recorder"));

    block_on(router.start(StartTarget::None)).unwrap();
    assert_eq!(
        recorder.events(),
        vec!["start", "transition:home", "success:home<--"]
    );
}

#[derive(Default)]
struct Lifecycle {
    installs: AtomicUsize,
    teardowns: AtomicUsize,
}

struct LifecyclePlugin(Arc<Lifecycle>);

impl Plugin for LifecyclePlugin {
    fn name(&self) -> &str {
        "lifecycle"
    }

    fn install(&self, router: &Router) {
        self.0.installs.fetch_add(1, Ordering::SeqCst);
        router.use_middleware(middleware_fn(|ctx| {
            NavigationAction::from(ctx.to.name != "admin")
        }));
    }

    fn teardown(&self) {
        self.0.teardowns.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_plugin_install_and_remove() {
    let router = started_router();
    let counts = Arc::new(Lifecycle::default());

    let handle = router.use_plugin(LifecyclePlugin(Arc::clone(&counts)));
    assert_eq!(handle.name(), "lifecycle");
    assert_eq!(counts.installs.load(Ordering::SeqCst), 1);

    // The middleware registered at install time is active.
    assert!(navigate(&router, "admin", &[]).unwrap_err().is_cancellation());

    assert!(router.remove_plugin(&handle));
    assert!(!router.remove_plugin(&handle));
    assert!(!router.has_plugin("lifecycle"));
    assert_eq!(counts.teardowns.load(Ordering::SeqCst), 1);
}

#[test]
fn test_plugins_called_in_installation_order() {
    struct Tagged(&'static str, Arc<Mutex<Vec<&'static str>>>);

    impl Plugin for Tagged {
        fn name(&self) -> &str {
            self.0
        }

        fn on_transition_success(&self, _: &State, _: Option<&State>, _: &NavigationOptions) {
            self.1.lock().push(self.0);
        }
    }

    let router = router();
    let order = Arc::new(Mutex::new(Vec::new()));
    router.use_plugin(Tagged("b", Arc::clone(&order)));
    router.use_plugin(Tagged("a", Arc::clone(&order)));

    block_on(router.start(StartTarget::None)).unwrap();
    assert_eq!(*order.lock(), vec!["b", "a"]);
}

#[test]
fn test_hooks_may_call_back_into_router() {
    struct Observer(Arc<Mutex<Option<String>>>, Router);

    impl Plugin for Observer {
        fn name(&self) -> &str {
            "observer"
        }

        fn on_transition_success(&self, _: &State, _: Option<&State>, _: &NavigationOptions) {
            *self.0.lock() = self.1.get_state().map(|s| s.name.clone());
        }
    }

    let router = router();
    let seen = Arc::new(Mutex::new(None));
    router.use_plugin(Observer(Arc::clone(&seen), router.clone()));

    block_on(router.start("/settings")).unwrap();
    assert_eq!(seen.lock().as_deref(), Some("settings"));
}

#[test]
fn test_clone_router_reinstalls_plugins() {
    let router = started_router();
    let recorder = Recorder::default();
    router.use_plugin(recorder.clone());
    router.can_activate("admin", false);
    router.set_dependency("answer", Arc::new(42_u32));

    let extra = {
        let mut deps = Dependencies::new();
        deps.insert("extra", Arc::new("yes"));
        deps
    };
    let clone = router.clone_router(Some(extra));

    assert!(!clone.is_started());
    assert!(clone.get_state().is_none());
    assert!(clone.has_plugin("recorder"));
    assert_eq!(clone.get_dependencies().get::<u32>("answer").as_deref(), Some(&42));
    assert!(clone.get_dependencies().contains("extra"));
    assert!(!router.get_dependencies().contains("extra"));

    block_on(clone.start(StartTarget::None)).unwrap();
    assert_eq!(
        navigate(&clone, "admin", &[]).unwrap_err().code(),
        ErrorCode::CannotActivate
    );

    // Both routers report to the shared plugin instance; the original is untouched.
    assert_eq!(router.get_state().unwrap().name, "home");
    assert_eq!(
        recorder.events(),
        vec![
            "start",
            "transition:home",
            "success:home<--",
            "transition:admin",
            "error:CANNOT_ACTIVATE",
        ]
    );
}

#[test]
fn test_clone_install_may_touch_source_plugins() {
    struct Companion;

    impl Plugin for Companion {
        fn name(&self) -> &str {
            "companion"
        }
    }

    // Installing on the clone registers a companion plugin on the source router.
    struct Spreader {
        source: Router,
        installs: AtomicUsize,
    }

    impl Plugin for Spreader {
        fn name(&self) -> &str {
            "spreader"
        }

        fn install(&self, _: &Router) {
            if self.installs.fetch_add(1, Ordering::SeqCst) > 0 {
                self.source.use_plugin(Companion);
            }
        }
    }

    let router = router();
    router.use_plugin(Spreader {
        source: router.clone(),
        installs: AtomicUsize::new(0),
    });

    let clone = router.clone_router(None);

    assert!(clone.has_plugin("spreader"));
    assert!(!clone.has_plugin("companion"));
    assert!(router.has_plugin("companion"));
}

#[test]
fn test_listeners_plugin() {
    let router = started_router();
    let plugin = ListenersPlugin::new(ListenersOptions::default());
    let listeners = plugin.listeners();
    router.use_plugin(plugin);
    assert!(router.has_plugin(LISTENERS_PLUGIN));

    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    listeners.add_node_listener("users", move |to, _| sink.lock().push(format!("node:{}", to.name)));
    let sink = Arc::clone(&log);
    listeners.add_route_listener("users.list", move |to, _| sink.lock().push(format!("route:{}", to.name)));
    let sink = Arc::clone(&log);
    let global = listeners.add_listener(move |to, _| sink.lock().push(format!("global:{}", to.name)));

    navigate(&router, "users.view", &[("id", "1")]).unwrap();
    navigate(&router, "users.list", &[]).unwrap();
    listeners.remove_listener(global);
    navigate(&router, "users.view", &[("id", "2")]).unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "global:users.view",
            "node:users.list",
            "route:users.list",
            "global:users.list",
            "node:users.view",
        ]
    );
}

#[test]
fn test_listeners_not_called_on_failure() {
    let router = started_router();
    let plugin = ListenersPlugin::default();
    let listeners = plugin.listeners();
    router.use_plugin(plugin);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    listeners.add_listener(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    router.can_activate("admin", false);

    assert!(navigate(&router, "admin", &[]).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listeners_auto_clean_up() {
    let router = started_router();
    let plugin = ListenersPlugin::default();
    let listeners = plugin.listeners();
    router.use_plugin(plugin);

    navigate(&router, "users.view", &[("id", "1")]).unwrap();
    listeners.add_node_listener("users", |_, _| {});
    listeners.add_node_listener("users.view", |_, _| {});

    navigate(&router, "users.list", &[]).unwrap();
    assert_eq!(listeners.node_listener_count("users.view"), 0);
    assert_eq!(listeners.node_listener_count("users"), 1);
}
