//! Remote lookups used when the local index cannot answer.

use crate::fetch_failed;
use screen_core::config::{ProjectAlias, SearchConfig};
use screen_core::error::{NotFoundKind, ResolveError};
use screen_core::index::Screen;
use screen_nav::interpret::detect_project;
use screen_tree::TreeClient;
use screen_tree::extract::ExtractOptions;
use screen_tree::provider::{DocumentProvider, FetchError};
use screen_tree::scan::{ScanContext, locate_screen, scan_screens, screen_from_container, version_from_file_name};
use std::time::Duration;

/// Limits for the realtime scan.
#[derive(Debug, Clone, Copy)]
pub struct RealtimeSettings {
    pub depth: u32,
    pub pacing: Duration,
    pub max_results: usize,
}

impl From<&SearchConfig> for RealtimeSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            depth: config.realtime_depth,
            pacing: Duration::from_millis(config.realtime_pacing_ms),
            max_results: config.realtime_max_results,
        }
    }
}

/// Scan remote files for screens whose id, title or description contains
/// any of `keywords`.
///
/// Listing failures abort the scan. A file that fails to load is logged and
/// skipped. Stops as soon as `max_results` screens are found. Screens are
/// filed under the canonical project name when `aliases` recognise the
/// remote project.
pub fn realtime_search<P: DocumentProvider>(
    client: &TreeClient<P>,
    keywords: &[String],
    project: Option<&str>,
    version: Option<&str>,
    aliases: &[ProjectAlias],
    settings: &RealtimeSettings,
    options: &ExtractOptions,
) -> Result<Vec<Screen>, FetchError> {
    let mut found = Vec::new();
    if keywords.is_empty() || settings.max_results == 0 {
        return Ok(found);
    }

    let projects = client.provider().list_projects()?;
    let wanted = project.map(str::to_lowercase);
    let mut fetched_any = false;

    for remote_project in projects
        .iter()
        .filter(|p| wanted.as_ref().is_none_or(|w| p.name.to_lowercase().contains(w)))
    {
        let project_name = detect_project(&remote_project.name, aliases)
            .unwrap_or_else(|| remote_project.name.clone());
        let files = client.provider().list_files(&remote_project.id)?;
        for file in files
            .iter()
            .filter(|f| version.is_none_or(|v| f.name.contains(v)))
        {
            if fetched_any {
                std::thread::sleep(settings.pacing);
            }
            fetched_any = true;

            let tree = match client.fetch(&file.key, None, settings.depth) {
                Ok(tree) => tree,
                Err(e) => {
                    tracing::warn!("realtime scan skipped {}: {}", file.name, e);
                    continue;
                }
            };
            let file_version =
                version_from_file_name(&file.name).unwrap_or_else(|| "unknown".to_string());
            let ctx = ScanContext {
                project: &project_name,
                version: &file_version,
                file_id: &file.key,
                file_name: &file.name,
                last_modified: &file.last_modified,
            };
            for screen in scan_screens(&tree, &ctx, options) {
                let haystack = format!(
                    "{} {} {}",
                    screen.screen_id, screen.page_title, screen.description
                )
                .to_lowercase();
                if keywords.iter().any(|k| haystack.contains(k.as_str())) {
                    found.push(screen);
                    if found.len() >= settings.max_results {
                        return Ok(found);
                    }
                }
            }
        }
    }
    Ok(found)
}

/// Find one screen remotely by id: project → file for the version → node.
pub fn lookup_screen<P: DocumentProvider>(
    client: &TreeClient<P>,
    screen_id: &str,
    project: &str,
    version: &str,
    depth: u32,
    options: &ExtractOptions,
) -> Result<Screen, ResolveError> {
    let remote_project = client
        .find_project(project)
        .map_err(fetch_failed)?
        .ok_or_else(|| ResolveError::not_found(NotFoundKind::Project, project))?;
    let file = client
        .find_file_by_version(&remote_project.id, version)
        .map_err(fetch_failed)?
        .ok_or_else(|| ResolveError::not_found(NotFoundKind::Version, format!("{project} {version}")))?;

    let tree = client.fetch(&file.key, None, depth).map_err(fetch_failed)?;
    let missing =
        || ResolveError::not_found(NotFoundKind::Screen, format!("{screen_id} in {project} {version}"));
    let node = locate_screen(&tree, screen_id, options.depth_cap).ok_or_else(missing)?;

    let ctx = ScanContext {
        project,
        version,
        file_id: &file.key,
        file_name: &file.name,
        last_modified: &file.last_modified,
    };
    screen_from_container(node, &ctx, options).ok_or_else(missing)
}
