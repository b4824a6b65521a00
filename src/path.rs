//! Path templates of route nodes.
//!
//! Each route node owns a [`PathTemplate`] describing the part of the url it
//! consumes relative to its parent, plus the query parameters it declares.
//!
//! # Syntax
//!
//! | Token           | Meaning                                        |
//! |-----------------|------------------------------------------------|
//! | `/users`        | literal text                                   |
//! | `:id`           | url parameter, default constraint              |
//! | `:id<\d+>`      | url parameter with a regex constraint          |
//! | `*rest`         | splat, must be last, may contain `/`           |
//! | `?page&sort`    | declared query parameters                      |
//!
//! Templates are matched as a **prefix** of the remaining path, so a node
//! only has to describe its own segment: `users` → `/users`,
//! `users.view` → `/:id`.

use crate::error::RouteDefinitionError;
use crate::params::{decode_component, encode_component, RouteParams};
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Constraint applied to `:param` tokens without an explicit one.
pub const DEFAULT_PARAM_CONSTRAINT: &str = r"[a-zA-Z0-9\-_.~%':|=+*@$]+";

/// One parsed piece of the url part of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// Literal text, matched verbatim (modulo case sensitivity).
    Literal(String),
    /// `:name` or `:name<constraint>`.
    Param {
        /// Parameter name.
        name: String,
        /// Constraint regex source, if given.
        constraint: Option<String>,
    },
    /// `*name`.
    Splat {
        /// Parameter name.
        name: String,
    },
}

/// A parsed and compiled node path.
#[derive(Clone)]
pub struct PathTemplate {
    source: String,
    tokens: Vec<PathToken>,
    query_params: Vec<String>,
    matchers: Option<Matchers>,
    constraints: Vec<(String, Regex)>,
}

/// Case-sensitive and case-insensitive compilations of the url pattern.
#[derive(Clone)]
struct Matchers {
    exact: Regex,
    folded: Regex,
}

impl fmt::Debug for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathTemplate")
            .field("source", &self.source)
            .field("tokens", &self.tokens)
            .field("query_params", &self.query_params)
            .finish_non_exhaustive()
    }
}

/// Successful prefix match of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PrefixMatch {
    pub params: RouteParams,
    pub consumed: usize,
}

impl PathTemplate {
    /// The empty template: no tokens, matches zero characters.
    pub fn empty() -> Self {
        Self {
            source: String::new(),
            tokens: Vec::new(),
            query_params: Vec::new(),
            matchers: None,
            constraints: Vec::new(),
        }
    }

    /// Parse and compile a template.
    pub fn parse(source: &str) -> Result<Self, RouteDefinitionError> {
        let malformed = |message: &str| RouteDefinitionError::MalformedPath {
            path: source.to_string(),
            message: message.to_string(),
        };

        let (url, query) = source.split_once('?').unwrap_or((source, ""));
        let tokens = tokenize(url).map_err(|m| malformed(&m))?;

        let mut query_params = Vec::new();
        if source.contains('?') {
            for name in query.split('&') {
                if !is_param_name(name) {
                    return Err(malformed(&format!("invalid query parameter name '{name}'")));
                }
                query_params.push(name.to_string());
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for name in tokens
            .iter()
            .filter_map(token_param_name)
            .chain(query_params.iter().map(String::as_str))
        {
            if seen.contains(&name) {
                return Err(malformed(&format!("parameter '{name}' declared twice")));
            }
            seen.push(name);
        }

        let matchers = if tokens.is_empty() {
            None
        } else {
            let pattern = compile_pattern(&tokens);
            let build = |case_insensitive: bool| {
                RegexBuilder::new(&pattern)
                    .case_insensitive(case_insensitive)
                    .build()
                    .map_err(|e| malformed(&e.to_string()))
            };
            Some(Matchers {
                exact: build(false)?,
                folded: build(true)?,
            })
        };

        let mut constraints = Vec::new();
        for token in &tokens {
            if let PathToken::Param { name, constraint } = token {
                let body = constraint.as_deref().unwrap_or(DEFAULT_PARAM_CONSTRAINT);
                let full =
                    Regex::new(&format!("^(?:{body})$")).map_err(|e| malformed(&e.to_string()))?;
                constraints.push((name.clone(), full));
            }
        }

        Ok(Self {
            source: source.to_string(),
            tokens,
            query_params,
            matchers,
            constraints,
        })
    }

    /// Original template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed url tokens.
    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    /// Names of url parameters (`:param` and `*splat`), in order.
    pub fn url_params(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(token_param_name)
    }

    /// Names of declared query parameters, in order.
    pub fn query_params(&self) -> &[String] {
        &self.query_params
    }

    /// `true` when the url part ends with `/`.
    pub(crate) fn ends_with_slash(&self) -> bool {
        matches!(self.tokens.last(), Some(PathToken::Literal(l)) if l.ends_with('/'))
    }

    /// Ordering key: literal-heavy templates are tried before parametric ones.
    pub(crate) fn specificity(&self) -> (bool, usize, std::cmp::Reverse<usize>) {
        let mut splat = false;
        let mut params = 0;
        let mut literal = 0;
        for token in &self.tokens {
            match token {
                PathToken::Literal(l) => literal += l.len(),
                PathToken::Param { .. } => params += 1,
                PathToken::Splat { .. } => splat = true,
            }
        }
        (splat, params, std::cmp::Reverse(literal))
    }

    /// Match the url part against the front of `path`.
    ///
    /// With `strong`, the match must stop on a segment boundary.
    pub(crate) fn match_prefix(
        &self,
        path: &str,
        case_sensitive: bool,
        strong: bool,
    ) -> Option<PrefixMatch> {
        let captures = match &self.matchers {
            Some(m) if case_sensitive => Some(m.exact.captures(path)?),
            Some(m) => Some(m.folded.captures(path)?),
            None => None,
        };
        let consumed = match &captures {
            Some(c) => c.get(0)?.end(),
            None => 0,
        };

        if strong && !self.ends_with_slash() {
            let rest = &path[consumed..];
            if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')) {
                return None;
            }
        }

        let mut params = RouteParams::new();
        if let Some(captures) = &captures {
            for (index, name) in self.url_params().enumerate() {
                let raw = captures.name(&group_name(index))?.as_str();
                params.insert(name, decode_param(raw));
            }
        }
        Some(PrefixMatch { params, consumed })
    }

    /// Render the url part with `params` substituted.
    ///
    /// Errors carry the offending parameter name: `Err((name, None))` when
    /// missing, `Err((name, Some(value)))` when its encoded form violates the
    /// parameter's constraint.
    pub(crate) fn render(&self, params: &RouteParams) -> Result<String, (String, Option<String>)> {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                PathToken::Literal(l) => out.push_str(l),
                PathToken::Param { name, .. } => {
                    let value = params.get(name).ok_or_else(|| (name.clone(), None))?;
                    let encoded = encode_component(value);
                    if !self.satisfies_constraint(name, &encoded) {
                        return Err((name.clone(), Some(value.to_string())));
                    }
                    out.push_str(&encoded);
                }
                PathToken::Splat { name } => {
                    let value = params.get(name).ok_or_else(|| (name.clone(), None))?;
                    let encoded: Vec<_> = value.split('/').map(encode_component).collect();
                    out.push_str(&encoded.join("/"));
                }
            }
        }
        Ok(out)
    }

    fn satisfies_constraint(&self, name: &str, value: &str) -> bool {
        self.constraints
            .iter()
            .find(|(n, _)| n == name)
            .is_some_and(|(_, regex)| regex.is_match(value))
    }
}

fn token_param_name(token: &PathToken) -> Option<&str> {
    match token {
        PathToken::Literal(_) => None,
        PathToken::Param { name, .. } | PathToken::Splat { name } => Some(name),
    }
}

fn is_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn decode_param(raw: &str) -> String {
    raw.split('/')
        .map(decode_component)
        .collect::<Vec<_>>()
        .join("/")
}

fn tokenize(url: &str) -> Result<Vec<PathToken>, String> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = url.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        match c {
            ':' | '*' => {
                let mut name = String::new();
                while let Some(&(_, n)) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '_' {
                        name.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if !is_param_name(&name) {
                    return Err(format!("expected a parameter name after '{c}'"));
                }

                let mut constraint = None;
                if c == ':' && matches!(chars.peek(), Some((_, '<'))) {
                    chars.next();
                    let mut depth = 1;
                    let mut body = String::new();
                    for (_, n) in chars.by_ref() {
                        match n {
                            '<' => depth += 1,
                            '>' => depth -= 1,
                            _ => {}
                        }
                        if depth == 0 {
                            break;
                        }
                        body.push(n);
                    }
                    if depth != 0 {
                        return Err(format!("unterminated constraint for parameter '{name}'"));
                    }
                    if body.is_empty() {
                        return Err(format!("empty constraint for parameter '{name}'"));
                    }
                    constraint = Some(body);
                }

                if !literal.is_empty() {
                    tokens.push(PathToken::Literal(std::mem::take(&mut literal)));
                }
                if c == '*' {
                    tokens.push(PathToken::Splat { name });
                    if chars.peek().is_some() {
                        return Err("splat parameter must be the last token".to_string());
                    }
                } else {
                    tokens.push(PathToken::Param { name, constraint });
                }
            }
            '<' | '>' => return Err(format!("unexpected '{c}'")),
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        tokens.push(PathToken::Literal(literal));
    }
    Ok(tokens)
}

// Named groups keep parameter indices stable when constraints contain
// their own capture groups.
fn group_name(index: usize) -> String {
    format!("p{index}")
}

fn compile_pattern(tokens: &[PathToken]) -> String {
    let mut pattern = String::from("^");
    let mut index = 0;
    for token in tokens {
        match token {
            PathToken::Literal(l) => pattern.push_str(&regex::escape(l)),
            PathToken::Param { constraint, .. } => {
                let body = constraint.as_deref().unwrap_or(DEFAULT_PARAM_CONSTRAINT);
                pattern.push_str(&format!("(?P<{}>{body})", group_name(index)));
                index += 1;
            }
            PathToken::Splat { .. } => {
                pattern.push_str(&format!("(?P<{}>[^?#]*)", group_name(index)));
                index += 1;
            }
        }
    }
    pattern
}
