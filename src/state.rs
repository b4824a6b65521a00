//! Navigation states.
//!
//! A [`State`] is an immutable snapshot of an active (or prospective) route:
//! its dotted name, its parameters, and the path it corresponds to. States
//! are shared as `Arc<State>` and never mutated after construction; the
//! router swaps whole states on commit.
//!
//! [`StateMeta`] records where each parameter came from (url or query, per
//! route segment) and how the state was reached. It takes part in
//! transition-path computation but never in equality.

use crate::constants::UNKNOWN_ROUTE;
use crate::params::RouteParams;
use std::collections::BTreeMap;

/// Separator between levels of a route name.
pub const NAME_SEPARATOR: char = '.';

/// Where a parameter was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ParamSource {
    /// `:param` or `*splat` in the path.
    Url,
    /// Declared query parameter.
    Query,
}

/// Per-segment parameter sources: segment full name → param → source.
pub type SegmentParams = BTreeMap<String, BTreeMap<String, ParamSource>>;

/// Options of a single navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavigationOptions {
    /// Ask transport plugins to replace the current history entry.
    pub replace: bool,
    /// Deactivate and reactivate every segment, even shared ones.
    pub reload: bool,
    /// Skip the same-state check without forcing a full reload.
    pub force: bool,
}

impl NavigationOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `replace`.
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Set `reload`.
    pub fn reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    /// Set `force`.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Metadata attached to states created by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateMeta {
    /// Monotonic id assigned by the router that made the state.
    pub id: u64,
    /// Parameter sources per segment.
    pub params: SegmentParams,
    /// Options of the navigation that produced the state.
    pub options: NavigationOptions,
    /// Origin of the state, e.g. `"popstate"` for transport plugins.
    pub source: Option<String>,
    /// `true` when the state was reached through a redirect.
    pub redirected: bool,
}

/// Immutable navigation state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    /// Full dotted route name.
    pub name: String,
    /// Url and query parameters.
    pub params: RouteParams,
    /// Path (with query string) of the state.
    pub path: String,
    /// Router metadata, absent on hand-made states.
    pub meta: Option<StateMeta>,
}

impl State {
    /// Build a state without metadata.
    ///
    /// # Example
    ///
    /// ```
    /// use navigator_core::{RouteParams, State};
    ///
    /// let state = State::new("users.view", RouteParams::from([("id", "42")]), "/users/42");
    /// assert_eq!(state.segment_ids(), vec!["users", "users.view"]);
    /// ```
    pub fn new(name: impl Into<String>, params: RouteParams, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params,
            path: path.into(),
            meta: None,
        }
    }

    /// Attach metadata.
    pub fn with_meta(mut self, meta: StateMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// The "not found" sentinel for `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            UNKNOWN_ROUTE,
            RouteParams::from([("path", path.as_str())]),
            path,
        )
    }

    /// `true` for the sentinel produced by [`State::not_found`].
    pub fn is_not_found(&self) -> bool {
        self.name == UNKNOWN_ROUTE
    }

    /// Metadata id, `0` when absent.
    pub fn id(&self) -> u64 {
        self.meta.as_ref().map_or(0, |m| m.id)
    }

    /// Source of the state, if recorded.
    pub fn source(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.source.as_deref())
    }

    /// Names of every segment from the outermost down: `a.b.c` →
    /// `[a, a.b, a.b.c]`. The sentinel yields a single id.
    pub fn segment_ids(&self) -> Vec<&str> {
        segment_ids(&self.name)
    }

    /// `true` when `self` is a strict ancestor of `child`: `child`'s name
    /// extends this name past a separator and agrees on every parameter of
    /// `self`.
    pub fn is_ancestor_of(&self, child: &State) -> bool {
        is_ancestor_name(&self.name, &child.name)
            && self
                .params
                .iter()
                .all(|(k, v)| child.params.get(k) == Some(v))
    }
}

/// Equality on name, params and path. Metadata is ignored.
impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params && self.path == other.path
    }
}

impl Eq for State {}

/// Segment ids of a route name.
pub fn segment_ids(name: &str) -> Vec<&str> {
    if name == UNKNOWN_ROUTE {
        return vec![name];
    }
    name.char_indices()
        .filter(|(_, c)| *c == NAME_SEPARATOR)
        .map(|(i, _)| &name[..i])
        .chain(std::iter::once(name))
        .filter(|id| !id.is_empty())
        .collect()
}

/// `true` when `child` is strictly below `parent` in the name hierarchy.
pub fn is_ancestor_name(parent: &str, child: &str) -> bool {
    child.len() > parent.len()
        && child.starts_with(parent)
        && child[parent.len()..].starts_with(NAME_SEPARATOR)
}

/// Compare the parameters of two states of the same route.
///
/// With `keys = Some(..)` only those keys are compared; otherwise both key
/// sets must agree entirely.
pub(crate) fn params_equal(a: &State, b: &State, keys: Option<&[String]>) -> bool {
    match keys {
        Some(keys) => keys.iter().all(|k| a.params.get(k) == b.params.get(k)),
        None => a.params == b.params,
    }
}
