//! The screen catalog: projects → versions → screens.
//!
//! Every mutation goes through [`ScreenIndex`] so that the keyword set of each
//! screen, the cached total and the last-updated timestamp stay consistent.

use crate::keywords::screen_keywords;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current persisted format version.
pub const FORMAT_VERSION: &str = "1.0";

/// Placeholder title for screens whose title could not be extracted.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Placeholder author for screens whose author could not be extracted.
pub const UNKNOWN_AUTHOR: &str = "N/A";

/// The whole catalog as persisted on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenIndex {
    #[serde(alias = "version")]
    pub format_version: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub total_screens: usize,
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectBundle>,
}

/// All collected versions of one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectBundle {
    #[serde(default)]
    pub versions: BTreeMap<String, VersionBundle>,
}

/// One release's full screen set, backed by a single remote file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBundle {
    #[serde(alias = "fileKey")]
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub screens: Vec<Screen>,
}

/// A single design screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub screen_id: String,
    pub page_title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub project: String,
    pub version: String,
    #[serde(alias = "fileKey")]
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    pub node_id: String,
    #[serde(default)]
    pub last_modified: String,
}

impl Screen {
    /// Recompute the keyword set from id, title and description.
    pub fn refresh_keywords(&mut self) {
        self.keywords = screen_keywords(&self.screen_id, &self.page_title, &self.description);
    }

    /// Builder-style variant of [`Screen::refresh_keywords`].
    #[must_use]
    pub fn with_keywords(mut self) -> Self {
        self.refresh_keywords();
        self
    }

    /// A screen whose description has not been fetched yet.
    pub fn needs_enrichment(&self) -> bool {
        self.description.trim().is_empty()
    }

    /// Query string for the companion code-bundle search tool.
    pub fn code_search_hint(&self) -> String {
        format!("{} {} {}", self.project, self.version, self.page_title)
    }
}

/// Fields extracted from a screen's document subtree. `None` means the
/// extractor found nothing usable for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenDetail {
    pub page_title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
}

impl ScreenDetail {
    /// Title, ignoring empty values and the unknown sentinel.
    pub fn usable_title(&self) -> Option<&str> {
        usable(self.page_title.as_deref(), UNKNOWN_TITLE)
    }

    /// Author, ignoring empty values and the unknown sentinel.
    pub fn usable_author(&self) -> Option<&str> {
        usable(self.author.as_deref(), UNKNOWN_AUTHOR)
    }

    /// Description, ignoring blank values.
    pub fn usable_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.usable_title().is_none()
            && self.usable_author().is_none()
            && self.usable_description().is_none()
    }
}

fn usable<'a>(value: Option<&'a str>, sentinel: &str) -> Option<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != sentinel)
}

/// Result of [`ScreenIndex::learn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Result of [`ScreenIndex::merge_project`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub updated_versions: usize,
    pub preserved_versions: usize,
}

/// Summary used by the stats tool and the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub total_screens: usize,
    pub last_updated: DateTime<Utc>,
    pub projects: Vec<ProjectStats>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStats {
    pub name: String,
    /// `(version, screen count)`, newest version first.
    pub versions: Vec<(String, usize)>,
}

impl Default for ScreenIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Current time in the text format used for screen timestamps.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ScreenIndex {
    pub fn new() -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            last_updated: Utc::now(),
            total_screens: 0,
            projects: BTreeMap::new(),
        }
    }

    /// Advance `last_updated`, never moving it backwards.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.last_updated {
            self.last_updated = now;
        }
    }

    /// Recompute `total_screens` from the bundles.
    pub fn recount(&mut self) {
        self.total_screens = self
            .projects
            .values()
            .flat_map(|p| p.versions.values())
            .map(|v| v.screens.len())
            .sum();
    }

    /// The stored key for `name`, matching exactly first, then ignoring case.
    pub fn project_key(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.projects.get_key_value(name) {
            return Some(key.as_str());
        }
        self.projects
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    pub fn project(&self, name: &str) -> Option<&ProjectBundle> {
        self.project_key(name).and_then(|key| self.projects.get(key))
    }

    pub fn find_screen(&self, project: &str, version: &str, screen_id: &str) -> Option<&Screen> {
        self.project(project)?
            .versions
            .get(version)?
            .screens
            .iter()
            .find(|s| s.screen_id == screen_id)
    }

    fn find_screen_mut(
        &mut self,
        project: &str,
        version: &str,
        screen_id: &str,
    ) -> Option<&mut Screen> {
        let key = self.project_key(project)?.to_string();
        self.projects
            .get_mut(&key)?
            .versions
            .get_mut(version)?
            .screens
            .iter_mut()
            .find(|s| s.screen_id == screen_id)
    }

    /// Every screen in project, then version, then insertion order.
    pub fn screens(&self) -> impl Iterator<Item = &Screen> {
        self.projects
            .values()
            .flat_map(|p| p.versions.values())
            .flat_map(|v| v.screens.iter())
    }

    /// Insert `screen` unless its id already exists in the target version.
    ///
    /// Project and version containers are created on demand. Returns whether
    /// the screen was created.
    pub fn add_screen(&mut self, mut screen: Screen) -> bool {
        let key = self
            .project_key(&screen.project)
            .map(str::to_string)
            .unwrap_or_else(|| screen.project.clone());
        screen.project = key.clone();
        screen.refresh_keywords();

        let bundle = self
            .projects
            .entry(key)
            .or_default()
            .versions
            .entry(screen.version.clone())
            .or_insert_with(|| VersionBundle {
                file_id: screen.file_id.clone(),
                file_name: screen.file_name.clone(),
                screens: Vec::new(),
            });
        if bundle.screens.iter().any(|s| s.screen_id == screen.screen_id) {
            return false;
        }
        bundle.screens.push(screen);
        self.total_screens += 1;
        self.touch();
        true
    }

    /// Apply extracted detail to an existing screen.
    ///
    /// Only usable values are written: a sentinel title or author and a blank
    /// description are ignored. Returns `false` when the screen does not
    /// exist; returns `true` when it exists, whether or not anything changed.
    pub fn update_screen_detail(
        &mut self,
        screen_id: &str,
        project: &str,
        version: &str,
        detail: &ScreenDetail,
    ) -> bool {
        let Some(screen) = self.find_screen_mut(project, version, screen_id) else {
            return false;
        };

        let mut changed = false;
        if let Some(title) = detail.usable_title()
            && screen.page_title != title
        {
            screen.page_title = title.to_string();
            changed = true;
        }
        if let Some(author) = detail.usable_author()
            && screen.author != author
        {
            screen.author = author.to_string();
            changed = true;
        }
        if let Some(description) = detail.usable_description()
            && screen.description != description
        {
            screen.description = description.to_string();
            changed = true;
        }

        if changed {
            screen.refresh_keywords();
            screen.last_modified = timestamp_now();
            self.touch();
        }
        true
    }

    /// Upsert a screen discovered outside bulk collection.
    pub fn learn(&mut self, screen: Screen) -> UpsertOutcome {
        let exists = self
            .find_screen(&screen.project, &screen.version, &screen.screen_id)
            .is_some();
        if !exists {
            self.add_screen(screen);
            return UpsertOutcome::Created;
        }

        let detail = ScreenDetail {
            page_title: Some(screen.page_title.clone()),
            author: Some(screen.author.clone()),
            description: Some(screen.description.clone()),
        };
        if let Some(existing) =
            self.find_screen_mut(&screen.project, &screen.version, &screen.screen_id)
        {
            existing.node_id = screen.node_id;
            if !screen.file_id.is_empty() {
                existing.file_id = screen.file_id;
            }
            if !screen.file_name.is_empty() {
                existing.file_name = screen.file_name;
            }
        }
        self.update_screen_detail(&screen.screen_id, &screen.project, &screen.version, &detail);
        UpsertOutcome::Updated
    }

    /// Merge one project's freshly collected versions into the index.
    ///
    /// A version that came back empty keeps its previous screens unless
    /// `allow_empty_overwrite` is set. Versions missing from `collected`
    /// are left as they are.
    pub fn merge_project(
        &mut self,
        project: &str,
        collected: ProjectBundle,
        allow_empty_overwrite: bool,
    ) -> MergeStats {
        let key = self
            .project_key(project)
            .map(str::to_string)
            .unwrap_or_else(|| project.to_string());
        let existing = self.projects.entry(key).or_default();

        let mut stats = MergeStats::default();
        for (version, bundle) in collected.versions {
            let keep_existing = bundle.screens.is_empty()
                && !allow_empty_overwrite
                && existing
                    .versions
                    .get(&version)
                    .is_some_and(|old| !old.screens.is_empty());
            if keep_existing {
                tracing::warn!(
                    "{} {}: collection returned no screens, keeping previous data",
                    project,
                    version
                );
                stats.preserved_versions += 1;
            } else {
                existing.versions.insert(version, bundle);
                stats.updated_versions += 1;
            }
        }

        self.recount();
        self.touch();
        stats
    }

    /// Totals and per-project version lists, newest version first.
    pub fn stats(&self) -> IndexStats {
        let projects = self
            .projects
            .iter()
            .map(|(name, bundle)| {
                let mut versions: Vec<(String, usize)> = bundle
                    .versions
                    .iter()
                    .map(|(v, b)| (v.clone(), b.screens.len()))
                    .collect();
                versions.sort_by(|a, b| compare_versions(&b.0, &a.0));
                ProjectStats {
                    name: name.clone(),
                    versions,
                }
            })
            .collect();
        IndexStats {
            total_screens: self.total_screens,
            last_updated: self.last_updated,
            projects,
        }
    }
}

/// Order version strings semantically; unparsable versions sort before
/// parsable ones and among themselves lexically.
pub fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Greater,
        (Err(_), Ok(_)) => std::cmp::Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
