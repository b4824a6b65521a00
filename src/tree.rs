//! Hierarchical route tree: registration, matching and path building.
//!
//! Every route is a node with a local name and a [`PathTemplate`] relative
//! to its parent. Full names are dotted (`users.view`), and the full path of
//! a route is the concatenation of the templates along that chain, starting
//! with the template of the implicit root.
//!
//! # Matching
//!
//! [`RouteTree::match_path`] walks the tree depth first. Each child template
//! is matched as a prefix of what remains of the path; when a child's
//! subtree cannot consume the rest, the walk backtracks and tries the next
//! sibling. Siblings are tried in specificity order: templates without
//! parameters before parametric ones, splats last, longer literals first,
//! registration order for ties.
//!
//! # Example
//!
//! ```
//! use navigator_core::{RouteDef, RouteParams, RouteTree, RouterOptions};
//!
//! let mut tree = RouteTree::new();
//! tree.add(vec![
//!     RouteDef::new("users", "/users")
//!         .child(RouteDef::new("new", "/new"))
//!         .child(RouteDef::new("view", "/:id")),
//! ])
//! .unwrap();
//!
//! let options = RouterOptions::default();
//! let m = tree.match_path("/users/new", &options).unwrap();
//! assert_eq!(m.name, "users.new");
//!
//! let m = tree.match_path("/users/42", &options).unwrap();
//! assert_eq!(m.name, "users.view");
//! assert_eq!(m.params.get("id"), Some("42"));
//!
//! let path = tree
//!     .build_path("users.view", &RouteParams::from([("id", "7")]), &options)
//!     .unwrap();
//! assert_eq!(path, "/users/7");
//! ```

use crate::error::{RouteDefinitionError, RouterError};
use crate::guards::Guard;
use crate::options::{RouterOptions, TrailingSlash};
use crate::params::{build_query, parse_query, split_query, RouteParams};
use crate::path::PathTemplate;
use crate::state::{ParamSource, SegmentParams, NAME_SEPARATOR};
use crate::{debug_log, trace_log};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// RouteDef
// ============================================================================

/// Declarative route definition passed to [`RouteTree::add`].
///
/// Top-level definitions may use a dotted name to attach below an existing
/// route; nested children must use local names.
#[derive(Debug, Clone)]
pub struct RouteDef {
    /// Local (or, at top level, dotted) name.
    pub name: String,
    /// Path template relative to the parent.
    pub path: String,
    /// Optional `canActivate` guard registered with the route.
    pub can_activate: Option<Guard>,
    /// Child definitions.
    pub children: Vec<RouteDef>,
}

impl RouteDef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            can_activate: None,
            children: Vec::new(),
        }
    }

    /// Attach a `canActivate` guard.
    pub fn can_activate(mut self, guard: impl Into<Guard>) -> Self {
        self.can_activate = Some(guard.into());
        self
    }

    /// Add one child.
    pub fn child(mut self, child: RouteDef) -> Self {
        self.children.push(child);
        self
    }

    /// Add several children.
    pub fn children(mut self, children: impl IntoIterator<Item = RouteDef>) -> Self {
        self.children.extend(children);
        self
    }
}

// ============================================================================
// RouteNode
// ============================================================================

/// A registered route.
#[derive(Debug, Clone)]
pub struct RouteNode {
    name: String,
    full_name: String,
    path: PathTemplate,
    children: Vec<RouteNode>,
}

impl RouteNode {
    fn new(name: String, full_name: String, path: PathTemplate) -> Self {
        Self {
            name,
            full_name,
            path,
            children: Vec::new(),
        }
    }

    /// Local name; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted full name; empty for the root.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn path(&self) -> &PathTemplate {
        &self.path
    }

    /// Children in matching order.
    pub fn children(&self) -> &[RouteNode] {
        &self.children
    }

    fn child(&self, name: &str) -> Option<&RouteNode> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut RouteNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    fn insert_child(&mut self, node: RouteNode) {
        self.children.push(node);
        // Stable: registration order breaks ties.
        self.children.sort_by_key(|c| c.path.specificity());
    }

    fn param_sources(&self) -> BTreeMap<String, ParamSource> {
        self.path
            .url_params()
            .map(|p| (p.to_string(), ParamSource::Url))
            .chain(
                self.path
                    .query_params()
                    .iter()
                    .map(|q| (q.clone(), ParamSource::Query)),
            )
            .collect()
    }
}

// ============================================================================
// RouteMatch
// ============================================================================

/// Result of matching a path against the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Full name of the deepest matched route.
    pub name: String,
    /// Url and query parameters.
    pub params: RouteParams,
    /// Parameter sources per matched segment.
    pub meta: SegmentParams,
    /// Path of the resulting state.
    pub path: String,
}

// ============================================================================
// RouteTree
// ============================================================================

/// The route registry.
#[derive(Debug, Clone)]
pub struct RouteTree {
    root: RouteNode,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    /// Empty tree with an empty root path.
    pub fn new() -> Self {
        Self {
            root: RouteNode::new(String::new(), String::new(), PathTemplate::empty()),
        }
    }

    /// The implicit root node.
    pub fn root(&self) -> &RouteNode {
        &self.root
    }

    /// Replace the template of the root node.
    pub fn set_root_path(&mut self, path: &str) -> Result<(), RouteDefinitionError> {
        self.root.path = PathTemplate::parse(path)?;
        debug_log!("Root path set to '{}'", path);
        Ok(())
    }

    /// Register definitions. All of them are added or none.
    ///
    /// Returns the `canActivate` guards carried by the definitions, keyed by
    /// full name, for the caller to register.
    pub fn add(
        &mut self,
        defs: impl IntoIterator<Item = RouteDef>,
    ) -> Result<Vec<(String, Guard)>, RouteDefinitionError> {
        let mut next = self.root.clone();
        let mut guards = Vec::new();
        for def in defs {
            let (parent, local) = match def.name.rsplit_once(NAME_SEPARATOR) {
                Some((parent, local)) => (parent.to_string(), local.to_string()),
                None => (String::new(), def.name.clone()),
            };
            add_definition(&mut next, &parent, local, def, &mut guards)?;
        }
        self.root = next;
        Ok(guards)
    }

    /// Register a single route by full name.
    pub fn add_node(
        &mut self,
        name: &str,
        path: &str,
        can_activate: Option<Guard>,
    ) -> Result<Vec<(String, Guard)>, RouteDefinitionError> {
        let mut def = RouteDef::new(name, path);
        def.can_activate = can_activate;
        self.add([def])
    }

    /// `true` if `name` is registered.
    pub fn has_route(&self, name: &str) -> bool {
        self.segments(name).is_some()
    }

    /// Nodes along `name`, outermost first. `None` when any is missing.
    pub fn segments(&self, name: &str) -> Option<Vec<&RouteNode>> {
        if name.is_empty() {
            return None;
        }
        let mut node = &self.root;
        let mut chain = Vec::new();
        for local in name.split(NAME_SEPARATOR) {
            node = node.child(local)?;
            chain.push(node);
        }
        Some(chain)
    }

    /// Names of url parameters of the root and every segment of `name`.
    pub fn url_params(&self, name: &str) -> Vec<String> {
        let Some(chain) = self.segments(name) else {
            return Vec::new();
        };
        std::iter::once(&self.root)
            .chain(chain)
            .flat_map(|n| n.path.url_params().map(str::to_string))
            .collect()
    }

    /// Parameter sources of every segment of `name`.
    pub fn segment_meta(&self, name: &str) -> Option<SegmentParams> {
        let chain = self.segments(name)?;
        Some(
            chain
                .into_iter()
                .map(|n| (n.full_name.clone(), n.param_sources()))
                .collect(),
        )
    }

    /// Full names of every registered route, depth first.
    pub fn route_names(&self) -> Vec<String> {
        fn walk(node: &RouteNode, out: &mut Vec<String>) {
            for child in &node.children {
                out.push(child.full_name.clone());
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    /// Build the path of `name` with `params`.
    pub fn build_path(
        &self,
        name: &str,
        params: &RouteParams,
        options: &RouterOptions,
    ) -> Result<String, RouterError> {
        let chain = self
            .segments(name)
            .ok_or_else(|| RouterError::route_not_found(name))?;

        let mut url = String::new();
        let mut declared: Vec<&str> = Vec::new();
        let mut in_url: BTreeSet<&str> = BTreeSet::new();
        for node in std::iter::once(&self.root).chain(chain) {
            let part = node.path.render(params).map_err(|(param, value)| match value {
                None => RouterError::MissingParameter {
                    route: name.to_string(),
                    param,
                },
                Some(value) => RouterError::InvalidParameter {
                    route: name.to_string(),
                    param,
                    value,
                },
            })?;
            url.push_str(&part);
            in_url.extend(node.path.url_params());
            declared.extend(node.path.query_params().iter().map(String::as_str));
        }

        match options.trailing_slash {
            TrailingSlash::Never if url.len() > 1 && url.ends_with('/') => {
                url.pop();
            }
            TrailingSlash::Always if !url.ends_with('/') => url.push('/'),
            _ => {}
        }
        if url.is_empty() {
            url.push('/');
        }

        // Loose mode carries undeclared params in the query, after the declared ones.
        let undeclared = params
            .iter()
            .filter(|_| !options.strict_query_params)
            .filter(|(key, _)| !in_url.contains(key) && !declared.contains(key));
        let query = build_query(
            declared
                .iter()
                .filter_map(|&key| params.get(key).map(|value| (key, value)))
                .chain(undeclared),
        );
        if query.is_empty() {
            Ok(url)
        } else {
            Ok(format!("{url}?{query}"))
        }
    }

    /// Match `path` against the tree.
    ///
    /// Returns `None` when nothing matches; producing the not-found state is
    /// left to the caller.
    pub fn match_path(&self, path: &str, options: &RouterOptions) -> Option<RouteMatch> {
        let (url, query) = split_query(path);
        if options.trailing_slash == TrailingSlash::Always && !url.ends_with('/') {
            return None;
        }

        let root = self
            .root
            .path
            .match_prefix(url, options.case_sensitive, options.strong_matching)?;
        let mut params = root.params;

        let mut matched: Vec<(&RouteNode, RouteParams)> = Vec::new();
        if !match_children(&self.root, &url[root.consumed..], options, &mut matched) {
            trace_log!("No route matches '{}'", path);
            return None;
        }

        let mut meta = SegmentParams::new();
        let mut declared: BTreeSet<&str> = self
            .root
            .path
            .query_params()
            .iter()
            .map(String::as_str)
            .collect();
        for (node, node_params) in &matched {
            for (key, value) in node_params.iter() {
                params.insert(key, value);
            }
            declared.extend(node.path.query_params().iter().map(String::as_str));
            meta.insert(node.full_name.clone(), node.param_sources());
        }

        for (key, value) in parse_query(query) {
            if !declared.contains(key.as_str()) && options.strict_query_params {
                trace_log!("Undeclared query parameter '{}' in '{}'", key, path);
                return None;
            }
            params.insert(key, value);
        }

        let name = matched
            .last()
            .map(|(node, _)| node.full_name.clone())
            .unwrap_or_default();
        let path = match options.trailing_slash {
            TrailingSlash::Default => path.to_string(),
            TrailingSlash::Never | TrailingSlash::Always => {
                self.build_path(&name, &params, options).ok()?
            }
        };

        Some(RouteMatch {
            name,
            params,
            meta,
            path,
        })
    }
}

fn add_definition(
    root: &mut RouteNode,
    parent: &str,
    local: String,
    def: RouteDef,
    guards: &mut Vec<(String, Guard)>,
) -> Result<(), RouteDefinitionError> {
    let full_name = if parent.is_empty() {
        local.clone()
    } else {
        format!("{parent}{NAME_SEPARATOR}{local}")
    };
    if local.is_empty() || local.contains(NAME_SEPARATOR) {
        return Err(RouteDefinitionError::InvalidName { name: def.name });
    }

    let parent_node = find_mut(root, parent).ok_or_else(|| RouteDefinitionError::MissingParent {
        name: full_name.clone(),
        parent: parent.to_string(),
    })?;
    if parent_node.child(&local).is_some() {
        return Err(RouteDefinitionError::DuplicateName { name: full_name });
    }
    if parent_node.children.iter().any(|c| c.path.source() == def.path) {
        return Err(RouteDefinitionError::DuplicatePath {
            name: full_name,
            path: def.path,
        });
    }

    let template = PathTemplate::parse(&def.path)?;
    parent_node.insert_child(RouteNode::new(local, full_name.clone(), template));
    debug_log!("Registered route '{}' with path '{}'", full_name, def.path);

    if let Some(guard) = def.can_activate {
        guards.push((full_name.clone(), guard));
    }
    for child in def.children {
        if child.name.contains(NAME_SEPARATOR) {
            return Err(RouteDefinitionError::InvalidName { name: child.name });
        }
        let local = child.name.clone();
        add_definition(root, &full_name, local, child, guards)?;
    }
    Ok(())
}

fn find_mut<'a>(root: &'a mut RouteNode, full_name: &str) -> Option<&'a mut RouteNode> {
    if full_name.is_empty() {
        return Some(root);
    }
    let mut node = root;
    for local in full_name.split(NAME_SEPARATOR) {
        node = node.child_mut(local)?;
    }
    Some(node)
}

fn match_children<'t>(
    node: &'t RouteNode,
    rest: &str,
    options: &RouterOptions,
    matched: &mut Vec<(&'t RouteNode, RouteParams)>,
) -> bool {
    for child in &node.children {
        let Some(m) = child
            .path
            .match_prefix(rest, options.case_sensitive, options.strong_matching)
        else {
            continue;
        };
        let remaining = &rest[m.consumed..];
        matched.push((child, m.params));

        if is_fully_consumed(remaining, options.trailing_slash) {
            return true;
        }
        if match_children(child, remaining, options, matched) {
            return true;
        }
        matched.pop();
    }
    false
}

fn is_fully_consumed(rest: &str, policy: TrailingSlash) -> bool {
    rest.is_empty() || (rest == "/" && policy != TrailingSlash::Never)
}
