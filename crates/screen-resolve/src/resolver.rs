//! The query pipeline: interpret, search, refine, confirm or offer choices.

use crate::enrich::{EnrichStatus, Enricher};
use crate::remote::{self, RealtimeSettings};
use crate::{extract_options, fetch_failed};
use screen_core::config::ScreenConfig;
use screen_core::error::{NotFoundKind, ResolveError};
use screen_core::index::{IndexStats, Screen, ScreenIndex, UpsertOutcome};
use screen_core::keywords::keywords;
use screen_core::storage;
use screen_nav::format::{format_choices, format_confirmed, format_no_match};
use screen_nav::interpret::{QueryArgs, Scoped, Strategy, plan};
use screen_nav::refine::{Presentation, refine};
use screen_nav::score::{
    SearchResult, flatten_groups, group_results, score_screen, search_all, search_project,
    search_scoped,
};
use screen_nav::session::{CandidatePool, CandidateScreen, DEFAULT_SESSION, PoolKind, SessionStore};
use screen_tree::TreeClient;
use screen_tree::extract::ExtractOptions;
use screen_tree::provider::DocumentProvider;
use std::path::{Path, PathBuf};

/// One query as received from a caller.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub query: String,
    pub project: Option<String>,
    pub version: Option<String>,
    /// Confirm a lone match without asking. Only honored when the version
    /// was named explicitly.
    pub auto_confirm: bool,
    /// Caller identity for pending choices. Blank means the shared default.
    pub session: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            project: None,
            version: None,
            auto_confirm: true,
            session: None,
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    fn caller(&self) -> &str {
        self.session
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION)
    }
}

/// How a screen came to be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmedVia {
    /// Screen id found in the local index.
    DirectLookup,
    /// Screen id or keywords resolved against the remote files.
    RemoteLookup,
    /// The only match of a search with an explicit version.
    AutoConfirm,
    /// Picked by number from pending choices.
    Selection(usize),
}

#[derive(Debug, Clone)]
pub struct Confirmed {
    pub screen: Screen,
    pub via: ConfirmedVia,
    pub enrichment: EnrichStatus,
    /// Set when the screen was written to the index during this query.
    pub learned: Option<UpsertOutcome>,
}

/// The answer to one query.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Confirmed(Confirmed),
    Choices {
        kind: PoolKind,
        query: String,
        results: Vec<SearchResult>,
        /// Screens added to the index by a remote fallback.
        learned: usize,
    },
    NoMatch {
        query: String,
        project: Option<String>,
        version: Option<String>,
    },
}

impl QueryOutcome {
    /// Human and agent readable text.
    pub fn render(&self) -> String {
        match self {
            Self::Confirmed(confirmed) => {
                let mut notes = Vec::new();
                if let ConfirmedVia::Selection(n) = confirmed.via {
                    notes.push(format!("selected: #{n}"));
                }
                if confirmed.learned == Some(UpsertOutcome::Created)
                    || confirmed.enrichment == EnrichStatus::Learned
                {
                    notes.push("learned: this screen was added to the local index".to_string());
                }
                if let EnrichStatus::Failed(reason) = &confirmed.enrichment {
                    notes.push(format!("note: description could not be fetched ({reason})"));
                }
                format_confirmed(&confirmed.screen, &notes)
            }
            Self::Choices {
                kind,
                query,
                results,
                learned,
            } => {
                let mut out = format_choices(*kind, query, results);
                if *learned > 0 {
                    out.push_str(&format!(
                        "\n({learned} screens found remotely were added to the local index)"
                    ));
                }
                out
            }
            Self::NoMatch {
                query,
                project,
                version,
            } => format_no_match(query, project.as_deref(), version.as_deref()),
        }
    }
}

/// Long-lived query service. Holds the index in memory once loaded.
pub struct Resolver<P> {
    config: ScreenConfig,
    index_path: PathBuf,
    index: Option<ScreenIndex>,
    sessions: SessionStore,
    client: TreeClient<P>,
    extract: ExtractOptions,
}

/// Load the index into `slot` on first use.
fn loaded_index<'a>(
    slot: &'a mut Option<ScreenIndex>,
    path: &Path,
) -> Result<&'a mut ScreenIndex, ResolveError> {
    let index = match slot.take() {
        Some(index) => index,
        None => {
            let index = storage::load(path)?;
            tracing::info!(
                "loaded screen index from {} ({} screens)",
                path.display(),
                index.total_screens
            );
            index
        }
    };
    Ok(slot.insert(index))
}

/// Fail with the narrowest missing stage when the scope is not in the index.
fn require_scope(
    index: &ScreenIndex,
    project: &str,
    version: Option<&str>,
) -> Result<(), ResolveError> {
    let bundle = index
        .project(project)
        .ok_or_else(|| ResolveError::not_found(NotFoundKind::Project, project))?;
    if let Some(version) = version
        && !bundle.versions.contains_key(version)
    {
        return Err(ResolveError::not_found(
            NotFoundKind::Version,
            format!("{project} {version}"),
        ));
    }
    Ok(())
}

fn persist(path: &Path, index: &ScreenIndex) {
    if let Err(e) = storage::save(path, index) {
        tracing::warn!("failed to persist screen index: {}", e);
    }
}

impl<P: DocumentProvider> Resolver<P> {
    pub fn new(config: ScreenConfig, index_path: PathBuf, provider: P) -> Self {
        let extract = extract_options(&config);
        Self {
            config,
            index_path,
            index: None,
            sessions: SessionStore::new(),
            client: TreeClient::new(provider),
            extract,
        }
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Drop the cached index and read it again from disk.
    pub fn reload(&mut self) -> Result<IndexStats, ResolveError> {
        self.index = None;
        self.stats()
    }

    pub fn stats(&mut self) -> Result<IndexStats, ResolveError> {
        Ok(loaded_index(&mut self.index, &self.index_path)?.stats())
    }

    /// Resolve one query.
    pub fn query(&mut self, request: &QueryRequest) -> Result<QueryOutcome, ResolveError> {
        let query = request.query.trim();
        let strategy = plan(
            &QueryArgs {
                query,
                project: request.project.as_deref(),
                version: request.version.as_deref(),
            },
            &self.config.aliases,
            &self.config.defaults,
        );
        let auto_confirm = strategy.allows_auto_confirm(request.auto_confirm);
        let caller = request.caller();
        tracing::debug!("query {:?} from {}: {:?}", query, caller, strategy);

        match strategy {
            Strategy::Select { index } => self.select(caller, index),
            Strategy::DirectLookup {
                screen_id,
                project,
                version,
            } => self.direct_lookup(&screen_id, &project.value, &version.value),
            Strategy::ScopedSearch { project, version } => {
                let limit = self.config.search.max_results;
                let index = loaded_index(&mut self.index, &self.index_path)?;
                require_scope(index, &project.value, Some(&version.value))?;
                let results = search_scoped(index, &project.value, &version.value, query, limit);
                self.settle(
                    caller,
                    query,
                    results,
                    auto_confirm,
                    Some(project.value),
                    Some(version.value),
                )
            }
            Strategy::ProjectSearch { project } => {
                let limit = self.config.search.max_results;
                let index = loaded_index(&mut self.index, &self.index_path)?;
                require_scope(index, &project.value, None)?;
                let results = search_project(index, &project.value, query, limit);
                self.settle(caller, query, results, auto_confirm, Some(project.value), None)
            }
            Strategy::GlobalSearch { version } => {
                self.global_search(caller, query, version, auto_confirm)
            }
        }
    }

    fn select(&mut self, caller: &str, n: usize) -> Result<QueryOutcome, ResolveError> {
        let candidate = self.sessions.select(caller, n)?.clone();
        let index = loaded_index(&mut self.index, &self.index_path)?;
        let screen = index
            .find_screen(&candidate.project, &candidate.version, &candidate.screen_id)
            .cloned()
            .unwrap_or_else(|| candidate.to_screen());
        self.confirm(screen, ConfirmedVia::Selection(n), None)
    }

    fn direct_lookup(
        &mut self,
        screen_id: &str,
        project: &str,
        version: &str,
    ) -> Result<QueryOutcome, ResolveError> {
        let index = loaded_index(&mut self.index, &self.index_path)?;
        if let Some(screen) = index.find_screen(project, version, screen_id).cloned() {
            return self.confirm(screen, ConfirmedVia::DirectLookup, None);
        }

        tracing::info!(
            "{} not in the local index for {} {}, looking it up remotely",
            screen_id,
            project,
            version
        );
        let screen = remote::lookup_screen(
            &self.client,
            screen_id,
            project,
            version,
            self.config.search.realtime_depth,
            &self.extract,
        )?;
        let index = loaded_index(&mut self.index, &self.index_path)?;
        let outcome = index.learn(screen.clone());
        persist(&self.index_path, index);
        self.confirm(screen, ConfirmedVia::RemoteLookup, Some(outcome))
    }

    fn global_search(
        &mut self,
        caller: &str,
        query: &str,
        version: Option<Scoped>,
        auto_confirm: bool,
    ) -> Result<QueryOutcome, ResolveError> {
        let version = version.map(|v| v.value);
        let limit = self.config.search.max_grouped_results;
        let index = loaded_index(&mut self.index, &self.index_path)?;
        let results = search_all(index, query, version.as_deref(), limit);
        if !results.is_empty() {
            return self.settle(caller, query, results, auto_confirm, None, version);
        }

        let query_keywords = keywords(query);
        if query_keywords.is_empty() {
            return Ok(no_match(query, None, version));
        }
        tracing::info!("no local match for {:?}, scanning remote files", query);
        let found = remote::realtime_search(
            &self.client,
            &query_keywords,
            None,
            version.as_deref(),
            &self.config.aliases,
            &RealtimeSettings::from(&self.config.search),
            &self.extract,
        )
        .map_err(fetch_failed)?;
        if found.is_empty() {
            return Ok(no_match(query, None, version));
        }

        let index = loaded_index(&mut self.index, &self.index_path)?;
        let mut outcomes: Vec<UpsertOutcome> =
            found.iter().map(|s| index.learn(s.clone())).collect();
        persist(&self.index_path, index);
        let learned = outcomes
            .iter()
            .filter(|o| **o == UpsertOutcome::Created)
            .count();
        tracing::info!("learned {} screens from the realtime scan", learned);

        if found.len() == 1 && auto_confirm {
            let outcome = outcomes.pop();
            let screen = found.first().cloned();
            if let Some(screen) = screen {
                return self.confirm(screen, ConfirmedVia::RemoteLookup, outcome);
            }
        }

        let mut results: Vec<SearchResult> = found
            .into_iter()
            .map(|screen| {
                let (score, matched_keywords) = score_screen(&screen, &query_keywords);
                SearchResult {
                    screen,
                    score,
                    matched_keywords,
                }
            })
            .collect();
        results.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(self.offer(caller, query, results, true, learned))
    }

    /// Confirm a lone match when allowed, otherwise offer the results.
    fn settle(
        &mut self,
        caller: &str,
        query: &str,
        results: Vec<SearchResult>,
        auto_confirm: bool,
        project: Option<String>,
        version: Option<String>,
    ) -> Result<QueryOutcome, ResolveError> {
        if results.len() == 1
            && auto_confirm
            && let Some(result) = results.first()
        {
            let screen = result.screen.clone();
            return self.confirm(screen, ConfirmedVia::AutoConfirm, None);
        }
        if results.is_empty() {
            return Ok(no_match(query, project, version));
        }
        let grouped = project.is_none();
        Ok(self.offer(caller, query, results, grouped, 0))
    }

    /// Refine results into a numbered pool for the caller.
    fn offer(
        &mut self,
        caller: &str,
        query: &str,
        results: Vec<SearchResult>,
        grouped: bool,
        learned: usize,
    ) -> QueryOutcome {
        let (kind, results) = match refine(results, query, &self.config.aliases) {
            Presentation::Screens(results) if grouped => (
                PoolKind::Screens,
                flatten_groups(&group_results(results)),
            ),
            Presentation::Screens(results) => (PoolKind::Screens, results),
            Presentation::Versions(results) => (PoolKind::Versions, results),
        };

        self.sessions.publish(
            caller,
            CandidatePool {
                kind,
                query: query.to_string(),
                candidates: results
                    .iter()
                    .map(|r| CandidateScreen::from(&r.screen))
                    .collect(),
            },
        );
        QueryOutcome::Choices {
            kind,
            query: query.to_string(),
            results,
            learned,
        }
    }

    fn confirm(
        &mut self,
        screen: Screen,
        via: ConfirmedVia,
        learned: Option<UpsertOutcome>,
    ) -> Result<QueryOutcome, ResolveError> {
        let index = loaded_index(&mut self.index, &self.index_path)?;
        let enricher = Enricher::new(&self.client, &self.extract, self.config.search.detail_depth);
        let (screen, enrichment) = enricher.ensure_complete(index, &self.index_path, screen);
        tracing::info!(
            "confirmed {} ({} {}) via {:?}",
            screen.screen_id,
            screen.project,
            screen.version,
            via
        );
        Ok(QueryOutcome::Confirmed(Confirmed {
            screen,
            via,
            enrichment,
            learned,
        }))
    }
}

fn no_match(query: &str, project: Option<String>, version: Option<String>) -> QueryOutcome {
    QueryOutcome::NoMatch {
        query: query.to_string(),
        project,
        version,
    }
}
