//! Pending choices per caller, for numbered follow-up selection.

use screen_core::error::ResolveError;
use screen_core::index::Screen;
use std::collections::HashMap;

/// Caller id used when none is supplied.
pub const DEFAULT_SESSION: &str = "default";

/// Enough of a screen to redisplay it and resolve it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateScreen {
    pub screen_id: String,
    pub page_title: String,
    pub author: String,
    pub project: String,
    pub version: String,
    pub file_id: String,
    pub file_name: String,
    pub node_id: String,
}

impl From<&Screen> for CandidateScreen {
    fn from(screen: &Screen) -> Self {
        Self {
            screen_id: screen.screen_id.clone(),
            page_title: screen.page_title.clone(),
            author: screen.author.clone(),
            project: screen.project.clone(),
            version: screen.version.clone(),
            file_id: screen.file_id.clone(),
            file_name: screen.file_name.clone(),
            node_id: screen.node_id.clone(),
        }
    }
}

impl CandidateScreen {
    /// Rebuild a screen record with an empty description.
    pub fn to_screen(&self) -> Screen {
        Screen {
            screen_id: self.screen_id.clone(),
            page_title: self.page_title.clone(),
            author: self.author.clone(),
            description: String::new(),
            keywords: Vec::new(),
            project: self.project.clone(),
            version: self.version.clone(),
            file_id: self.file_id.clone(),
            file_name: self.file_name.clone(),
            node_id: self.node_id.clone(),
            last_modified: String::new(),
        }
        .with_keywords()
    }
}

/// What the numbers of a pool refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Screens,
    Versions,
}

/// An ordered list of choices shown to one caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePool {
    pub kind: PoolKind,
    pub query: String,
    pub candidates: Vec<CandidateScreen>,
}

/// Pending choices keyed by caller id.
#[derive(Debug, Default)]
pub struct SessionStore {
    pools: HashMap<String, CandidatePool>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the caller's pending choices.
    pub fn publish(&mut self, caller: &str, pool: CandidatePool) {
        self.pools.insert(caller.to_string(), pool);
    }

    pub fn pool(&self, caller: &str) -> Option<&CandidatePool> {
        self.pools.get(caller)
    }

    /// The `index`-th (1-based) pending choice. The pool is left as it is,
    /// whether or not the selection succeeds.
    pub fn select(&self, caller: &str, index: usize) -> Result<&CandidateScreen, ResolveError> {
        let pool = self.pool(caller).ok_or(ResolveError::NoActiveSelection)?;
        index
            .checked_sub(1)
            .and_then(|i| pool.candidates.get(i))
            .ok_or(ResolveError::SelectionOutOfRange {
                index,
                len: pool.candidates.len(),
            })
    }
}
