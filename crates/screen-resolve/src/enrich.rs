//! Lazy completion of screens whose description has not been fetched yet.

use screen_core::index::{Screen, ScreenDetail, ScreenIndex};
use screen_core::storage;
use screen_tree::TreeClient;
use screen_tree::extract::{ExtractOptions, extract_detail};
use screen_tree::provider::DocumentProvider;
use std::path::Path;

/// What enrichment did for one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichStatus {
    /// The screen already had a description; nothing was fetched.
    AlreadyComplete,
    /// The index entry was updated with fetched detail.
    Updated,
    /// The screen was missing from the index and has been inserted.
    Learned,
    /// The fetched subtree held nothing new.
    NoDetail,
    /// The fetch failed; the screen is returned as it was.
    Failed(String),
}

/// Fetches node-scoped trees to fill in missing screen detail.
pub struct Enricher<'a, P> {
    client: &'a TreeClient<P>,
    options: &'a ExtractOptions,
    depth: u32,
}

impl<'a, P: DocumentProvider> Enricher<'a, P> {
    pub fn new(client: &'a TreeClient<P>, options: &'a ExtractOptions, depth: u32) -> Self {
        Self {
            client,
            options,
            depth,
        }
    }

    /// Make sure `screen` has a description, updating (or learning) its index
    /// entry and persisting the index when new detail is found.
    ///
    /// Never fails: remote and disk errors are logged and the best known
    /// screen is returned.
    pub fn ensure_complete(
        &self,
        index: &mut ScreenIndex,
        index_path: &Path,
        screen: Screen,
    ) -> (Screen, EnrichStatus) {
        if !screen.needs_enrichment() {
            return (screen, EnrichStatus::AlreadyComplete);
        }

        let tree = match self
            .client
            .fetch(&screen.file_id, Some(&screen.node_id), self.depth)
        {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(
                    "could not fetch detail for {} ({} {}): {}",
                    screen.screen_id,
                    screen.project,
                    screen.version,
                    e
                );
                return (screen, EnrichStatus::Failed(e.to_string()));
            }
        };

        let detail = extract_detail(&tree, self.options);
        if !improves(&screen, &detail) {
            return (screen, EnrichStatus::NoDetail);
        }

        let enriched = with_detail(screen, &detail);
        let status = if index.update_screen_detail(
            &enriched.screen_id,
            &enriched.project,
            &enriched.version,
            &detail,
        ) {
            EnrichStatus::Updated
        } else {
            index.learn(enriched.clone());
            tracing::info!(
                "learned {} ({} {}) while enriching",
                enriched.screen_id,
                enriched.project,
                enriched.version
            );
            EnrichStatus::Learned
        };

        if let Err(e) = storage::save(index_path, index) {
            tracing::warn!("failed to persist enriched index: {}", e);
        }

        let stored = index
            .find_screen(&enriched.project, &enriched.version, &enriched.screen_id)
            .cloned()
            .unwrap_or(enriched);
        (stored, status)
    }
}

/// Whether `detail` would change anything visible about `screen`.
fn improves(screen: &Screen, detail: &ScreenDetail) -> bool {
    detail.usable_description().is_some()
        || detail.usable_title().is_some_and(|t| t != screen.page_title)
        || detail.usable_author().is_some_and(|a| a != screen.author)
}

fn with_detail(mut screen: Screen, detail: &ScreenDetail) -> Screen {
    if let Some(title) = detail.usable_title() {
        screen.page_title = title.to_string();
    }
    if let Some(author) = detail.usable_author() {
        screen.author = author.to_string();
    }
    if let Some(description) = detail.usable_description() {
        screen.description = description.to_string();
    }
    screen.with_keywords()
}
