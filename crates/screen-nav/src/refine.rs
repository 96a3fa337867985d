//! Refinements applied before a multi-result set is shown.

use crate::score::SearchResult;
use screen_core::config::ProjectAlias;
use screen_core::keywords::{normalize_text, tokenize};
use std::collections::HashSet;

/// Words that carry no information about which screen is wanted.
pub const STOPWORDS: &[&str] = &[
    "screen", "screens", "page", "pages", "show", "find", "open", "search", "view", "display",
    "get", "me", "the", "please", "for", "of", "화면", "페이지", "보여줘", "보여", "찾아줘",
    "찾아", "검색", "검색해줘", "열어줘", "알려줘", "조회",
];

/// What to present for a set of results.
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    /// A numbered list of screens.
    Screens(Vec<SearchResult>),
    /// The same screen exists in several versions; one entry per version.
    Versions(Vec<SearchResult>),
}

impl Presentation {
    pub fn results(&self) -> &[SearchResult] {
        match self {
            Self::Screens(r) | Self::Versions(r) => r,
        }
    }
}

fn is_numeral(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_digit() || c == '_')
}

/// Query tokens left after dropping stopwords, alias words and numerals.
pub fn significant_tokens(query: &str, aliases: &[ProjectAlias]) -> Vec<String> {
    let alias_tokens: HashSet<String> = aliases
        .iter()
        .flat_map(|a| tokenize(&a.alias).into_iter().chain(tokenize(&a.project)))
        .collect();
    tokenize(query)
        .into_iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .filter(|t| !alias_tokens.contains(t))
        .filter(|t| !is_numeral(t))
        .collect()
}

/// Two-word phrase formed by the first two significant tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    spaced: String,
    compact: String,
}

impl Phrase {
    pub fn from_query(query: &str, aliases: &[ProjectAlias]) -> Option<Self> {
        let tokens = significant_tokens(query, aliases);
        let [first, second, ..] = tokens.as_slice() else {
            return None;
        };
        Some(Self {
            spaced: format!("{first} {second}"),
            compact: format!("{first}{second}"),
        })
    }

    /// Whether a title contains the phrase, with or without spacing.
    pub fn matches(&self, title: &str) -> bool {
        let normalized = normalize_text(title);
        normalized.contains(&self.spaced) || normalized.replace(' ', "").contains(&self.compact)
    }
}

/// Keep only results whose title contains the query's leading phrase, when
/// at least one does. Otherwise results are returned unchanged.
pub fn prioritize_phrase(
    results: Vec<SearchResult>,
    query: &str,
    aliases: &[ProjectAlias],
) -> Vec<SearchResult> {
    let Some(phrase) = Phrase::from_query(query, aliases) else {
        return results;
    };
    let (mut matching, rest): (Vec<_>, Vec<_>) = results
        .into_iter()
        .partition(|r| phrase.matches(&r.screen.page_title));
    if matching.is_empty() {
        return rest;
    }
    matching.sort_by(|a, b| b.score.cmp(&a.score));
    matching
}

/// When the top result's (id, title) appears under two or more distinct
/// (project, version) pairs, one result per such pair in candidate order.
pub fn collapse_versions(results: &[SearchResult]) -> Option<Vec<SearchResult>> {
    let top = results.first()?;
    let key = (&top.screen.screen_id, normalize_text(&top.screen.page_title));

    let mut seen = HashSet::new();
    let versions: Vec<SearchResult> = results
        .iter()
        .filter(|r| r.screen.screen_id == *key.0 && normalize_text(&r.screen.page_title) == key.1)
        .filter(|r| seen.insert((r.screen.project.clone(), r.screen.version.clone())))
        .cloned()
        .collect();
    (versions.len() >= 2).then_some(versions)
}

/// Apply phrase priority, then version collapse.
pub fn refine(results: Vec<SearchResult>, query: &str, aliases: &[ProjectAlias]) -> Presentation {
    let results = prioritize_phrase(results, query, aliases);
    match collapse_versions(&results) {
        Some(versions) => Presentation::Versions(versions),
        None => Presentation::Screens(results),
    }
}
