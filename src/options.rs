//! Router configuration.
//!
//! # Example
//!
//! ```
//! use navigator_core::{RouterOptions, TrailingSlash};
//!
//! let options = RouterOptions::new()
//!     .default_route("home")
//!     .trailing_slash(TrailingSlash::Never)
//!     .allow_not_found(true);
//!
//! assert_eq!(options.default_route.as_deref(), Some("home"));
//! assert!(options.strict_query_params);
//! ```

use crate::params::RouteParams;

/// Trailing slash policy applied when matching and building paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrailingSlash {
    /// Accept an optional trailing slash and keep paths as written.
    #[default]
    Default,
    /// Reject an extra trailing slash and never build one.
    Never,
    /// Require a trailing slash and always build one.
    Always,
}

/// Options of a router instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouterOptions {
    /// Trailing slash policy.
    pub trailing_slash: TrailingSlash,
    /// Clear `canDeactivate` guards of deactivated segments after commit.
    pub auto_clean_up: bool,
    /// Fail matches whose query string carries undeclared keys.
    pub strict_query_params: bool,
    /// Produce the not-found state for unmatched paths instead of failing.
    pub allow_not_found: bool,
    /// Require templates to end on a segment boundary.
    pub strong_matching: bool,
    /// Compare literals case-sensitively.
    pub case_sensitive: bool,
    /// Route used by `start` and `navigate_to_default`.
    pub default_route: Option<String>,
    /// Params of the default route.
    pub default_params: RouteParams,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            trailing_slash: TrailingSlash::Default,
            auto_clean_up: true,
            strict_query_params: true,
            allow_not_found: false,
            strong_matching: true,
            case_sensitive: false,
            default_route: None,
            default_params: RouteParams::new(),
        }
    }
}

impl RouterOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trailing slash policy.
    pub fn trailing_slash(mut self, policy: TrailingSlash) -> Self {
        self.trailing_slash = policy;
        self
    }

    /// Enable or disable automatic `canDeactivate` clean-up.
    pub fn auto_clean_up(mut self, enabled: bool) -> Self {
        self.auto_clean_up = enabled;
        self
    }

    /// Enable or disable strict query parameters.
    pub fn strict_query_params(mut self, enabled: bool) -> Self {
        self.strict_query_params = enabled;
        self
    }

    /// Enable or disable the not-found state.
    pub fn allow_not_found(mut self, enabled: bool) -> Self {
        self.allow_not_found = enabled;
        self
    }

    /// Enable or disable strong matching.
    pub fn strong_matching(mut self, enabled: bool) -> Self {
        self.strong_matching = enabled;
        self
    }

    /// Enable or disable case-sensitive literals.
    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = enabled;
        self
    }

    /// Set the default route.
    pub fn default_route(mut self, name: impl Into<String>) -> Self {
        self.default_route = Some(name.into());
        self
    }

    /// Set the default route params.
    pub fn default_params(mut self, params: RouteParams) -> Self {
        self.default_params = params;
        self
    }

    /// Apply a single override.
    pub fn apply(&mut self, option: RouterOption) {
        match option {
            RouterOption::TrailingSlash(v) => self.trailing_slash = v,
            RouterOption::AutoCleanUp(v) => self.auto_clean_up = v,
            RouterOption::StrictQueryParams(v) => self.strict_query_params = v,
            RouterOption::AllowNotFound(v) => self.allow_not_found = v,
            RouterOption::StrongMatching(v) => self.strong_matching = v,
            RouterOption::CaseSensitive(v) => self.case_sensitive = v,
            RouterOption::DefaultRoute(v) => self.default_route = v,
            RouterOption::DefaultParams(v) => self.default_params = v,
        }
    }
}

/// A single option override for [`Router::set_option`](crate::Router::set_option).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterOption {
    /// See [`RouterOptions::trailing_slash`].
    TrailingSlash(TrailingSlash),
    /// See [`RouterOptions::auto_clean_up`].
    AutoCleanUp(bool),
    /// See [`RouterOptions::strict_query_params`].
    StrictQueryParams(bool),
    /// See [`RouterOptions::allow_not_found`].
    AllowNotFound(bool),
    /// See [`RouterOptions::strong_matching`].
    StrongMatching(bool),
    /// See [`RouterOptions::case_sensitive`].
    CaseSensitive(bool),
    /// See [`RouterOptions::default_route`].
    DefaultRoute(Option<String>),
    /// See [`RouterOptions::default_params`].
    DefaultParams(RouteParams),
}

impl RouterOption {
    /// `true` when the option changes match results.
    pub(crate) fn affects_matching(&self) -> bool {
        matches!(
            self,
            Self::TrailingSlash(_)
                | Self::StrictQueryParams(_)
                | Self::AllowNotFound(_)
                | Self::StrongMatching(_)
                | Self::CaseSensitive(_)
        )
    }
}
