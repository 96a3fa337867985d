//! Configuration for remote access, collection and search.
//!
//! Load order: `.screen/config.toml` → environment variables → defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub remote: RemoteConfig,
    pub index: IndexConfig,
    pub defaults: DefaultsConfig,
    pub collection: CollectionConfig,
    pub search: SearchConfig,
    /// Natural-language project names mapped to canonical project codes.
    /// Checked in order; the first alias found in a query wins.
    pub aliases: Vec<ProjectAlias>,
}

/// Remote document API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_base: String,
    /// Personal access token. Checked when a remote call is made, not at load.
    pub token: String,
    /// Team whose projects are listed during collection and realtime search.
    pub team_id: String,
    /// Global timeout for one HTTP request.
    pub timeout_secs: u64,
}

/// Index file location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Relative paths resolve against the root directory.
    /// Default: `data/screen-index.json`.
    pub path: Option<PathBuf>,
}

/// Project and version used by direct screen-id lookups when neither the
/// arguments nor the query name one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub project: String,
    pub version: String,
}

/// Bulk collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub projects: Vec<String>,
    /// Tree depth requested per file.
    pub depth: u32,
    /// Replace a version's screens even when the new collection found none.
    pub allow_empty_version_overwrite: bool,
    /// Pause between file fetches, to stay under remote rate limits.
    pub pacing_ms: u64,
}

/// Search, realtime fallback and enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result limit for scoped and per-project searches.
    pub max_results: usize,
    /// Result limit for the global grouped search.
    pub max_grouped_results: usize,
    pub realtime_max_results: usize,
    pub realtime_depth: u32,
    pub realtime_pacing_ms: u64,
    /// Tree depth for node-scoped enrichment fetches.
    pub detail_depth: u32,
    /// Maximum nesting depth visited by any tree traversal.
    pub traversal_depth_cap: usize,
}

/// One alias → project mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAlias {
    pub alias: String,
    pub project: String,
}

impl ProjectAlias {
    fn new(alias: &str, project: &str) -> Self {
        Self {
            alias: alias.to_string(),
            project: project.to_string(),
        }
    }
}

/// Built-in bilingual alias table.
pub fn default_aliases() -> Vec<ProjectAlias> {
    [
        ("콘트라베이스", "CONTRABASS"),
        ("contrabass", "CONTRABASS"),
        ("cont", "CONTRABASS"),
        ("sds플러스", "SDS+"),
        ("sds", "SDS+"),
        ("viola", "VIOLA"),
        ("비올라", "VIOLA"),
        ("bootfactory", "Boot Factory"),
        ("boot factory", "Boot Factory"),
        ("boot", "Boot Factory"),
        ("부트", "Boot Factory"),
    ]
    .into_iter()
    .map(|(alias, project)| ProjectAlias::new(alias, project))
    .collect()
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            index: IndexConfig::default(),
            defaults: DefaultsConfig::default(),
            collection: CollectionConfig::default(),
            search: SearchConfig::default(),
            aliases: default_aliases(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.figma.com/v1".to_string(),
            token: String::new(),
            team_id: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            project: "CONTRABASS".to_string(),
            version: "3.0.6".to_string(),
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            projects: vec!["CONTRABASS".to_string()],
            depth: 8,
            allow_empty_version_overwrite: false,
            pacing_ms: 2000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            max_grouped_results: 20,
            realtime_max_results: 5,
            realtime_depth: 10,
            realtime_pacing_ms: 500,
            detail_depth: 10,
            traversal_depth_cap: 64,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

/// Like [`env_override`], but ignores empty values.
fn env_override_string(var: &str, target: &mut String) {
    if let Ok(v) = std::env::var(var)
        && !v.trim().is_empty()
    {
        *target = v.trim().to_string();
    }
}

impl ScreenConfig {
    /// Load config from `.screen/config.toml` under `root`, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(".screen").join("config.toml");

        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        // Environment variable overrides
        env_override_string("FIGMA_API_BASE", &mut config.remote.api_base);
        env_override_string("FIGMA_TOKEN", &mut config.remote.token);
        env_override_string("FIGMA_TEAM_ID", &mut config.remote.team_id);
        env_override("FIGMA_TIMEOUT_SECS", &mut config.remote.timeout_secs);
        if let Ok(path) = std::env::var("SCREEN_INDEX_PATH")
            && !path.trim().is_empty()
        {
            config.index.path = Some(PathBuf::from(path.trim()));
        }
        env_override_string("DEFAULT_PROJECT", &mut config.defaults.project);
        env_override_string("DEFAULT_VERSION", &mut config.defaults.version);
        if let Ok(list) = std::env::var("SUPPORTED_PROJECTS") {
            let projects: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
            if !projects.is_empty() {
                config.collection.projects = projects;
            }
        }
        env_override("FIGMA_COLLECTION_DEPTH", &mut config.collection.depth);
        env_override(
            "FIGMA_ALLOW_EMPTY_VERSION_OVERWRITE",
            &mut config.collection.allow_empty_version_overwrite,
        );
        env_override(
            "FIGMA_COLLECTION_PACING_MS",
            &mut config.collection.pacing_ms,
        );
        env_override("SCREEN_SEARCH_LIMIT", &mut config.search.max_results);

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, depth) in [
            ("collection.depth", self.collection.depth),
            ("search.realtime_depth", self.search.realtime_depth),
            ("search.detail_depth", self.search.detail_depth),
        ] {
            if depth == 0 {
                anyhow::bail!("{name} must be at least 1");
            }
        }
        if self.search.traversal_depth_cap == 0 {
            anyhow::bail!("search.traversal_depth_cap must be at least 1");
        }
        if self.search.max_results == 0 || self.search.max_grouped_results == 0 {
            anyhow::bail!("search result limits must be at least 1");
        }
        Ok(())
    }

    /// Absolute location of the index file.
    pub fn index_path(&self, root: &Path) -> PathBuf {
        match &self.index.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => root.join(path),
            None => crate::storage::default_index_path(root),
        }
    }

    /// Canonical project names, used to filter labels out of descriptions.
    pub fn known_projects(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .aliases
            .iter()
            .map(|a| a.project.clone())
            .chain(self.collection.projects.iter().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScreenConfig::default();
        assert_eq!(config.defaults.project, "CONTRABASS");
        assert_eq!(config.defaults.version, "3.0.6");
        assert_eq!(config.collection.depth, 8);
        assert_eq!(config.collection.pacing_ms, 2000);
        assert!(!config.collection.allow_empty_version_overwrite);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.max_grouped_results, 20);
        assert_eq!(config.search.traversal_depth_cap, 64);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ScreenConfig = toml::from_str(
            r#"
            [defaults]
            version = "4.1.0"

            [search]
            max_results = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.defaults.version, "4.1.0");
        assert_eq!(config.defaults.project, "CONTRABASS");
        assert_eq!(config.search.max_results, 8);
        assert_eq!(config.search.detail_depth, 10);
        assert!(!config.aliases.is_empty());
    }

    #[test]
    fn test_index_path_resolution() {
        let root = Path::new("/srv/specs");
        let mut config = ScreenConfig::default();
        assert_eq!(
            config.index_path(root),
            PathBuf::from("/srv/specs/data/screen-index.json")
        );
        config.index.path = Some(PathBuf::from("cache/index.json"));
        assert_eq!(
            config.index_path(root),
            PathBuf::from("/srv/specs/cache/index.json")
        );
    }

    #[test]
    fn test_zero_depth_rejected() {
        let mut config = ScreenConfig::default();
        config.search.detail_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_known_projects_dedup() {
        let config = ScreenConfig::default();
        let names = config.known_projects();
        assert_eq!(
            names.iter().filter(|n| n.as_str() == "CONTRABASS").count(),
            1
        );
        assert!(names.contains(&"Boot Factory".to_string()));
    }
}
