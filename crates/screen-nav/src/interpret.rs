//! Query interpretation: decide how a free-text query should be resolved.
//!
//! Detection runs in priority order: a candidate number, an explicit screen
//! id, a project alias, and a release version.

use regex::Regex;
use screen_core::config::{DefaultsConfig, ProjectAlias};
use screen_core::ident::find_screen_id;
use screen_core::keywords::tokenize;
use std::sync::LazyLock;

/// The whole query is a number, optionally followed by `번`.
static SELECTION_STRICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})\s*(번)?$").expect("valid selection regex"));

/// A `<n>번` token inside a sentence, e.g. `2번 보여줘`.
static SELECTION_SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(\d{1,3})\s*번(?:\s|$|[^\d])").expect("valid selection regex")
});

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+)").expect("valid version regex"));

/// 1-based candidate number the query refers to, if it is a selection.
pub fn detect_selection(query: &str) -> Option<usize> {
    let query = query.trim();
    SELECTION_STRICT
        .captures(query)
        .or_else(|| SELECTION_SENTENCE.captures(query))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Explicit screen id in the query, upper-cased.
pub fn detect_screen_id(query: &str) -> Option<String> {
    find_screen_id(query)
}

/// Canonical project named by an alias in the query.
///
/// Aliases are matched against whole query tokens. Hangul aliases also match
/// tokens they prefix, so particles such as `콘트라베이스의` still count.
pub fn detect_project(query: &str, aliases: &[ProjectAlias]) -> Option<String> {
    let tokens = tokenize(query);
    aliases
        .iter()
        .find(|alias| alias_matches(&tokens, &alias.alias))
        .map(|alias| alias.project.clone())
}

fn alias_matches(tokens: &[String], alias: &str) -> bool {
    let parts = tokenize(alias);
    if parts.is_empty() || parts.len() > tokens.len() {
        return false;
    }
    tokens.windows(parts.len()).any(|window| {
        window.iter().zip(&parts).all(|(token, part)| {
            token == part || (!part.is_ascii() && token.starts_with(part.as_str()))
        })
    })
}

/// A project argument written as an alias maps to its canonical name.
pub fn canonical_project(name: &str, aliases: &[ProjectAlias]) -> String {
    let trimmed = name.trim();
    aliases
        .iter()
        .find(|a| a.alias.eq_ignore_ascii_case(trimmed) || a.project.eq_ignore_ascii_case(trimmed))
        .map(|a| a.project.clone())
        .unwrap_or_else(|| trimmed.to_string())
}

/// First valid semantic version (`X.Y.Z`) in the query.
pub fn detect_version(query: &str) -> Option<String> {
    VERSION
        .captures_iter(query)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|v| semver::Version::parse(v).is_ok())
        .map(String::from)
}

/// Where a project or version value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Argument,
    Query,
    Default,
}

/// A project or version together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoped {
    pub value: String,
    pub origin: Origin,
}

impl Scoped {
    fn new(value: impl Into<String>, origin: Origin) -> Self {
        Self {
            value: value.into(),
            origin,
        }
    }

    /// Named by the caller rather than filled in from configuration.
    pub fn is_explicit(&self) -> bool {
        self.origin != Origin::Default
    }
}

/// How a query will be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Pick entry `index` (1-based) from the caller's pending choices.
    Select { index: usize },
    /// Look a screen id up directly.
    DirectLookup {
        screen_id: String,
        project: Scoped,
        version: Scoped,
    },
    /// Score one version of one project.
    ScopedSearch { project: Scoped, version: Scoped },
    /// Score every version of one project.
    ProjectSearch { project: Scoped },
    /// Score everything, grouped for display, with remote fallback.
    GlobalSearch { version: Option<Scoped> },
}

impl Strategy {
    /// Whether a single match may be confirmed without asking. Only a
    /// version the caller actually named unlocks automatic confirmation.
    pub fn allows_auto_confirm(&self, requested: bool) -> bool {
        let version = match self {
            Self::ScopedSearch { version, .. } => Some(version),
            Self::GlobalSearch { version } => version.as_ref(),
            Self::Select { .. } | Self::DirectLookup { .. } | Self::ProjectSearch { .. } => None,
        };
        requested && version.is_some_and(Scoped::is_explicit)
    }
}

/// Caller-supplied query and optional scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryArgs<'a> {
    pub query: &'a str,
    pub project: Option<&'a str>,
    pub version: Option<&'a str>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Choose the strategy for a query.
pub fn plan(args: &QueryArgs<'_>, aliases: &[ProjectAlias], defaults: &DefaultsConfig) -> Strategy {
    if let Some(index) = detect_selection(args.query) {
        return Strategy::Select { index };
    }

    let project = non_blank(args.project)
        .map(|p| Scoped::new(canonical_project(p, aliases), Origin::Argument))
        .or_else(|| detect_project(args.query, aliases).map(|p| Scoped::new(p, Origin::Query)));
    let version = non_blank(args.version)
        .map(|v| Scoped::new(v, Origin::Argument))
        .or_else(|| detect_version(args.query).map(|v| Scoped::new(v, Origin::Query)));

    if let Some(screen_id) = detect_screen_id(args.query) {
        return Strategy::DirectLookup {
            screen_id,
            project: project
                .unwrap_or_else(|| Scoped::new(defaults.project.clone(), Origin::Default)),
            version: version
                .unwrap_or_else(|| Scoped::new(defaults.version.clone(), Origin::Default)),
        };
    }

    match (project, version) {
        (Some(project), Some(version)) => Strategy::ScopedSearch { project, version },
        (Some(project), None) => Strategy::ProjectSearch { project },
        (None, version) => Strategy::GlobalSearch { version },
    }
}
