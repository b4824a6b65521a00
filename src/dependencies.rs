//! Shared dependencies handed to guards and middleware.
//!
//! Applications register services (an auth store, an api client) by name;
//! every guard and middleware call receives a snapshot of the map through
//! its [`TransitionContext`](crate::TransitionContext).
//!
//! ```
//! use navigator_core::Dependencies;
//! use std::sync::Arc;
//!
//! struct Session { user: &'static str }
//!
//! let mut deps = Dependencies::new();
//! deps.insert("session", Arc::new(Session { user: "ada" }));
//!
//! assert_eq!(deps.get::<Session>("session").map(|s| s.user), Some("ada"));
//! assert!(deps.get::<String>("session").is_none());
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type-erased dependency value.
pub type Dependency = Arc<dyn Any + Send + Sync>;

/// Named dependency map.
#[derive(Clone, Default)]
pub struct Dependencies {
    entries: HashMap<String, Dependency>,
}

impl Dependencies {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a dependency.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: Arc<T>) {
        self.entries.insert(name.into(), value);
    }

    /// Insert an already type-erased value.
    pub fn insert_raw(&mut self, name: impl Into<String>, value: Dependency) {
        self.entries.insert(name.into(), value);
    }

    /// Typed lookup. `None` when missing or of another type.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.entries.get(name).cloned()?.downcast::<T>().ok()
    }

    /// Untyped lookup.
    pub fn get_raw(&self, name: &str) -> Option<&Dependency> {
        self.entries.get(name)
    }

    /// `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Remove a dependency.
    pub fn remove(&mut self, name: &str) -> Option<Dependency> {
        self.entries.remove(name)
    }

    /// Registered names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every entry of `other` into `self`, overwriting on collision.
    pub fn extend(&mut self, other: &Dependencies) {
        for (name, value) in &other.entries {
            self.entries.insert(name.clone(), Arc::clone(value));
        }
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Dependencies").field("names", &names).finish()
    }
}
