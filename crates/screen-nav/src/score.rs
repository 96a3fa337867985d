//! Weighted keyword scoring over catalog screens.

use screen_core::index::{Screen, ScreenIndex};
use screen_core::keywords::keywords;

/// Keyword found inside the screen id.
pub const ID_WEIGHT: u32 = 10;
/// Keyword found inside the page title.
pub const TITLE_WEIGHT: u32 = 8;
/// Keyword found inside the description.
pub const DESCRIPTION_WEIGHT: u32 = 5;
/// Keyword equal to one of the screen's keywords.
pub const KEYWORD_EXACT_WEIGHT: u32 = 3;
/// Keyword and screen keyword contain one another.
pub const KEYWORD_PARTIAL_WEIGHT: u32 = 1;

/// A screen with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub screen: Screen,
    pub score: u32,
    pub matched_keywords: Vec<String>,
}

/// Score one screen against already tokenized query keywords.
///
/// Returns the total and the query keywords that contributed to it.
pub fn score_screen(screen: &Screen, query_keywords: &[String]) -> (u32, Vec<String>) {
    let id = screen.screen_id.to_lowercase();
    let title = screen.page_title.to_lowercase();
    let description = screen.description.to_lowercase();

    let mut total = 0;
    let mut matched = Vec::new();
    for keyword in query_keywords {
        let mut score = 0;
        if id.contains(keyword.as_str()) {
            score += ID_WEIGHT;
        }
        if title.contains(keyword.as_str()) {
            score += TITLE_WEIGHT;
        }
        if description.contains(keyword.as_str()) {
            score += DESCRIPTION_WEIGHT;
        }
        for screen_keyword in &screen.keywords {
            if screen_keyword == keyword {
                score += KEYWORD_EXACT_WEIGHT;
            } else if screen_keyword.contains(keyword.as_str())
                || keyword.contains(screen_keyword.as_str())
            {
                score += KEYWORD_PARTIAL_WEIGHT;
            }
        }
        if score > 0 {
            matched.push(keyword.clone());
            total += score;
        }
    }
    (total, matched)
}

/// Score `screens`, drop zero scores, sort by descending score (stable) and
/// keep the first `limit`.
///
/// The query is reduced to its keyword set first, so a word repeated in the
/// query is weighted once.
pub fn rank<'a>(
    screens: impl IntoIterator<Item = &'a Screen>,
    query: &str,
    limit: usize,
) -> Vec<SearchResult> {
    let query_keywords = keywords(query);
    if query_keywords.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = screens
        .into_iter()
        .filter_map(|screen| {
            let (score, matched_keywords) = score_screen(screen, &query_keywords);
            (score > 0).then(|| SearchResult {
                screen: screen.clone(),
                score,
                matched_keywords,
            })
        })
        .collect();
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(limit);
    results
}

/// Search one version of one project.
pub fn search_scoped(
    index: &ScreenIndex,
    project: &str,
    version: &str,
    query: &str,
    limit: usize,
) -> Vec<SearchResult> {
    let Some(bundle) = index.project(project).and_then(|p| p.versions.get(version)) else {
        return Vec::new();
    };
    rank(&bundle.screens, query, limit)
}

/// Search every version of one project.
pub fn search_project(
    index: &ScreenIndex,
    project: &str,
    query: &str,
    limit: usize,
) -> Vec<SearchResult> {
    let Some(bundle) = index.project(project) else {
        return Vec::new();
    };
    rank(
        bundle.versions.values().flat_map(|v| v.screens.iter()),
        query,
        limit,
    )
}

/// Search the whole index, optionally restricted to one version string.
pub fn search_all(
    index: &ScreenIndex,
    query: &str,
    version: Option<&str>,
    limit: usize,
) -> Vec<SearchResult> {
    rank(
        index
            .screens()
            .filter(|s| version.is_none_or(|v| s.version == v)),
        query,
        limit,
    )
}

/// Results of one version inside a [`ProjectGroup`].
#[derive(Debug, Clone, PartialEq)]
pub struct VersionGroup {
    pub version: String,
    pub results: Vec<SearchResult>,
}

/// Results of one project, grouped by version.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectGroup {
    pub project: String,
    pub versions: Vec<VersionGroup>,
}

impl ProjectGroup {
    pub fn len(&self) -> usize {
        self.versions.iter().map(|v| v.results.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group ranked results by project, then version, in first-seen order.
pub fn group_results(results: Vec<SearchResult>) -> Vec<ProjectGroup> {
    let mut groups: Vec<ProjectGroup> = Vec::new();
    for result in results {
        let project = result.screen.project.clone();
        let version = result.screen.version.clone();

        let group = match groups.iter().position(|g| g.project == project) {
            Some(i) => &mut groups[i],
            None => {
                groups.push(ProjectGroup {
                    project,
                    versions: Vec::new(),
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        match group.versions.iter_mut().find(|v| v.version == version) {
            Some(v) => v.results.push(result),
            None => group.versions.push(VersionGroup {
                version,
                results: vec![result],
            }),
        }
    }
    groups
}

/// Flatten groups back into display order.
pub fn flatten_groups(groups: &[ProjectGroup]) -> Vec<SearchResult> {
    groups
        .iter()
        .flat_map(|g| g.versions.iter())
        .flat_map(|v| v.results.iter().cloned())
        .collect()
}
