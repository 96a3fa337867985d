//! Tree fetching with depth fallback, plus project/file discovery.

use crate::node::DocumentNode;
use crate::provider::{DocumentProvider, FetchError, RemoteFile, RemoteProject};

/// Fallback depths tried after the requested one.
pub const DEPTH_LADDER: [u32; 8] = [10, 8, 6, 5, 4, 3, 2, 1];

/// Depth used when the caller asks for 0.
pub const DEFAULT_DEPTH: u32 = 5;

/// Largest depth ever requested.
pub const MAX_DEPTH: u32 = 32;

/// Depths to try, largest first: the (capped) request, then every ladder
/// rung below it.
pub fn depth_candidates(requested: u32) -> Vec<u32> {
    let requested = match requested {
        0 => DEFAULT_DEPTH,
        d => d.min(MAX_DEPTH),
    };
    let mut candidates = vec![requested];
    candidates.extend(DEPTH_LADDER.iter().copied().filter(|&d| d < requested));
    candidates
}

/// Wraps a [`DocumentProvider`] with depth fallback and discovery helpers.
pub struct TreeClient<P> {
    provider: P,
}

impl<P: DocumentProvider> TreeClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch a tree, stepping down the depth ladder while the remote reports
    /// the payload as too large. Other errors surface immediately.
    pub fn fetch(
        &self,
        file_id: &str,
        node_id: Option<&str>,
        depth: u32,
    ) -> Result<DocumentNode, FetchError> {
        let candidates = depth_candidates(depth);
        let last = candidates.len() - 1;
        let mut outcome = Err(FetchError::Http("no depth candidates".to_string()));

        for (i, depth) in candidates.into_iter().enumerate() {
            outcome = self.provider.fetch_tree(file_id, node_id, depth);
            match &outcome {
                Err(e) if e.is_payload_too_large() && i < last => {
                    tracing::warn!(
                        "{} {}: payload too large at depth {}, retrying shallower",
                        file_id,
                        node_id.unwrap_or("(file)"),
                        depth
                    );
                }
                _ => break,
            }
        }
        outcome
    }

    /// First project whose name contains `name`, ignoring case.
    pub fn find_project(&self, name: &str) -> Result<Option<RemoteProject>, FetchError> {
        let needle = name.to_lowercase();
        Ok(self
            .provider
            .list_projects()?
            .into_iter()
            .find(|p| p.name.to_lowercase().contains(&needle)))
    }

    /// First file of the project whose name contains `version`.
    pub fn find_file_by_version(
        &self,
        project_id: &str,
        version: &str,
    ) -> Result<Option<RemoteFile>, FetchError> {
        Ok(self
            .provider
            .list_files(project_id)?
            .into_iter()
            .find(|f| f.name.contains(version)))
    }
}
