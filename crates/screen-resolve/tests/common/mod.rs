#![allow(dead_code)]

use screen_core::config::ScreenConfig;
use screen_core::index::{Screen, ScreenIndex};
use screen_core::storage;
use screen_tree::node::DocumentNode;
use screen_tree::provider::{DocumentProvider, FetchError, RemoteFile, RemoteProject};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Tree {
        file_id: String,
        node_id: Option<String>,
        depth: u32,
    },
    Projects,
    Files(String),
}

/// In-memory remote that serves fixed trees and records every call.
#[derive(Default)]
pub struct MockProvider {
    pub projects: Vec<RemoteProject>,
    pub files: HashMap<String, Vec<RemoteFile>>,
    pub trees: HashMap<String, DocumentNode>,
    pub failing_files: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl MockProvider {
    pub fn with_project(mut self, id: &str, name: &str) -> Self {
        self.projects.push(RemoteProject {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_file(mut self, project_id: &str, key: &str, name: &str, tree: DocumentNode) -> Self {
        self.files
            .entry(project_id.to_string())
            .or_default()
            .push(RemoteFile {
                key: key.to_string(),
                name: name.to_string(),
                last_modified: "2024-10-01T00:00:00Z".to_string(),
            });
        self.trees.insert(key.to_string(), tree);
        self
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.failing_files.insert(key.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tree_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Tree { .. }))
            .collect()
    }
}

impl DocumentProvider for MockProvider {
    fn fetch_tree(
        &self,
        file_id: &str,
        node_id: Option<&str>,
        depth: u32,
    ) -> Result<DocumentNode, FetchError> {
        self.calls.lock().unwrap().push(Call::Tree {
            file_id: file_id.to_string(),
            node_id: node_id.map(str::to_string),
            depth,
        });
        if self.failing_files.contains(file_id) {
            return Err(FetchError::Api {
                status: 500,
                message: "Internal error".to_string(),
            });
        }
        let tree = self.trees.get(file_id).ok_or_else(|| FetchError::Api {
            status: 404,
            message: "Not found".to_string(),
        })?;
        match node_id {
            None => Ok(tree.clone()),
            Some(id) => tree
                .find_by_id(id, 64)
                .cloned()
                .ok_or_else(|| FetchError::NodeMissing {
                    file_id: file_id.to_string(),
                    node_id: id.to_string(),
                }),
        }
    }

    fn list_projects(&self) -> Result<Vec<RemoteProject>, FetchError> {
        self.calls.lock().unwrap().push(Call::Projects);
        Ok(self.projects.clone())
    }

    fn list_files(&self, project_id: &str) -> Result<Vec<RemoteFile>, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Files(project_id.to_string()));
        Ok(self.files.get(project_id).cloned().unwrap_or_default())
    }
}

/// A screen sheet: header labels, then a description block.
pub fn make_sheet(node_id: &str, screen_id: &str, title: &str, description: &str) -> DocumentNode {
    DocumentNode::frame(
        node_id,
        screen_id,
        vec![
            DocumentNode::other(
                &format!("{node_id}-h"),
                "Header",
                "GROUP",
                vec![
                    DocumentNode::text(&format!("{node_id}-1"), "Label", "Page Title"),
                    DocumentNode::text(&format!("{node_id}-2"), "Value", title),
                    DocumentNode::text(&format!("{node_id}-3"), "Label", "Author"),
                    DocumentNode::text(&format!("{node_id}-4"), "Value", "park"),
                ],
            ),
            DocumentNode::text(&format!("{node_id}-5"), "Description", "Description"),
            DocumentNode::text(&format!("{node_id}-6"), "line", description),
        ],
    )
}

/// A design file whose single page holds `sheets`.
pub fn make_file(sheets: Vec<DocumentNode>) -> DocumentNode {
    DocumentNode::other(
        "0:0",
        "Document",
        "DOCUMENT",
        vec![DocumentNode::other("0:1", "Screens", "CANVAS", sheets)],
    )
}

pub fn make_screen(
    project: &str,
    version: &str,
    id: &str,
    title: &str,
    description: &str,
    node_id: &str,
) -> Screen {
    Screen {
        screen_id: id.to_string(),
        page_title: title.to_string(),
        author: "N/A".to_string(),
        description: description.to_string(),
        keywords: Vec::new(),
        project: project.to_string(),
        version: version.to_string(),
        file_id: format!("file-{}", version.replace('.', "")),
        file_name: format!("{project} {version}"),
        node_id: node_id.to_string(),
        last_modified: String::new(),
    }
}

/// Config with pacing switched off.
pub fn test_config() -> ScreenConfig {
    let mut config = ScreenConfig::default();
    config.search.realtime_pacing_ms = 0;
    config.collection.pacing_ms = 0;
    config
}

pub fn write_index(path: &Path, screens: Vec<Screen>) {
    let mut index = ScreenIndex::new();
    for screen in screens {
        index.add_screen(screen);
    }
    storage::save(path, &index).unwrap();
}
