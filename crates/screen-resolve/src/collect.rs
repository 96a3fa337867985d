//! Bulk collection: walk every configured project's files and rebuild the
//! index from them, merging with what is already on disk.

use crate::fetch_failed;
use screen_core::config::CollectionConfig;
use screen_core::error::{NotFoundKind, ResolveError, StoreError};
use screen_core::index::{MergeStats, ProjectBundle, ScreenIndex, VersionBundle};
use screen_core::storage;
use screen_tree::TreeClient;
use screen_tree::extract::ExtractOptions;
use screen_tree::provider::DocumentProvider;
use screen_tree::scan::{ScanContext, scan_screens, version_from_file_name};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub projects: Vec<String>,
    pub depth: u32,
    pub allow_empty_overwrite: bool,
    /// Pause between consecutive file fetches.
    pub pacing: Duration,
}

impl From<&CollectionConfig> for CollectOptions {
    fn from(config: &CollectionConfig) -> Self {
        Self {
            projects: config.projects.clone(),
            depth: config.depth,
            allow_empty_overwrite: config.allow_empty_version_overwrite,
            pacing: Duration::from_millis(config.pacing_ms),
        }
    }
}

/// Progress notifications emitted while collecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectEvent {
    ProjectStarted { project: String, files: usize },
    FileSkipped { file_name: String },
    VersionScanned {
        project: String,
        version: String,
        screens: usize,
    },
    FileFailed { file_name: String, error: String },
    ProjectFailed { project: String, error: String },
}

#[derive(Debug, Clone, Default)]
pub struct CollectReport {
    pub collected_projects: Vec<String>,
    pub failed_projects: Vec<String>,
    pub merge: MergeStats,
    pub total_screens: usize,
    /// Copy of the previous index file, if one existed.
    pub backup: Option<PathBuf>,
    /// Whether the index file was written.
    pub saved: bool,
}

pub struct Collector<'a, P> {
    client: &'a TreeClient<P>,
    options: &'a CollectOptions,
    extract: &'a ExtractOptions,
}

impl<'a, P: DocumentProvider> Collector<'a, P> {
    pub fn new(
        client: &'a TreeClient<P>,
        options: &'a CollectOptions,
        extract: &'a ExtractOptions,
    ) -> Self {
        Self {
            client,
            options,
            extract,
        }
    }

    /// Scan every versioned file of one project.
    ///
    /// Files without a version in their name are skipped. A file that fails
    /// to load is reported and skipped; listing failures abort the project.
    pub fn collect_project(
        &self,
        project: &str,
        on_event: &mut dyn FnMut(CollectEvent),
    ) -> Result<ProjectBundle, ResolveError> {
        let remote_project = self
            .client
            .find_project(project)
            .map_err(fetch_failed)?
            .ok_or_else(|| ResolveError::not_found(NotFoundKind::Project, project))?;
        let files = self
            .client
            .provider()
            .list_files(&remote_project.id)
            .map_err(fetch_failed)?;
        on_event(CollectEvent::ProjectStarted {
            project: project.to_string(),
            files: files.len(),
        });

        let mut bundle = ProjectBundle::default();
        let mut fetched_any = false;
        for file in &files {
            let Some(version) = version_from_file_name(&file.name) else {
                tracing::debug!("{}: no version in file name, skipping", file.name);
                on_event(CollectEvent::FileSkipped {
                    file_name: file.name.clone(),
                });
                continue;
            };

            if fetched_any {
                std::thread::sleep(self.options.pacing);
            }
            fetched_any = true;

            let tree = match self.client.fetch(&file.key, None, self.options.depth) {
                Ok(tree) => tree,
                Err(e) => {
                    tracing::warn!("{}: fetch failed: {}", file.name, e);
                    on_event(CollectEvent::FileFailed {
                        file_name: file.name.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let ctx = ScanContext {
                project,
                version: &version,
                file_id: &file.key,
                file_name: &file.name,
                last_modified: &file.last_modified,
            };
            let screens = scan_screens(&tree, &ctx, self.extract);
            tracing::info!("{} {}: {} screens", project, version, screens.len());
            on_event(CollectEvent::VersionScanned {
                project: project.to_string(),
                version: version.clone(),
                screens: screens.len(),
            });

            if bundle.versions.contains_key(&version) {
                tracing::warn!(
                    "{} {}: several files carry this version, {} replaces the earlier one",
                    project,
                    version,
                    file.name
                );
            }
            bundle.versions.insert(
                version,
                VersionBundle {
                    file_id: file.key.clone(),
                    file_name: file.name.clone(),
                    screens,
                },
            );
        }
        Ok(bundle)
    }

    /// Collect every configured project and merge the results into the
    /// index at `index_path`, backing up the previous file.
    ///
    /// An existing index that cannot be read is an error rather than a
    /// reason to start over. Nothing is written when no project succeeded.
    pub fn run(
        &self,
        index_path: &Path,
        on_event: &mut dyn FnMut(CollectEvent),
    ) -> Result<CollectReport, ResolveError> {
        let mut index = match storage::load(index_path) {
            Ok(index) => index,
            Err(StoreError::Missing { .. }) => ScreenIndex::new(),
            Err(e) => return Err(ResolveError::Storage(e)),
        };

        let mut report = CollectReport::default();
        for project in &self.options.projects {
            match self.collect_project(project, on_event) {
                Ok(bundle) => {
                    let stats =
                        index.merge_project(project, bundle, self.options.allow_empty_overwrite);
                    report.merge.updated_versions += stats.updated_versions;
                    report.merge.preserved_versions += stats.preserved_versions;
                    report.collected_projects.push(project.clone());
                }
                Err(e) => {
                    tracing::warn!("{}: collection failed: {}", project, e);
                    on_event(CollectEvent::ProjectFailed {
                        project: project.clone(),
                        error: e.to_string(),
                    });
                    report.failed_projects.push(project.clone());
                }
            }
        }

        index.recount();
        report.total_screens = index.total_screens;
        if report.collected_projects.is_empty() {
            tracing::warn!("no project was collected, leaving the index untouched");
            return Ok(report);
        }

        index.touch();
        report.backup = storage::save_with_backup(index_path, &index)?;
        report.saved = true;
        tracing::info!(
            "saved {} screens to {}",
            report.total_screens,
            index_path.display()
        );
        Ok(report)
    }
}
