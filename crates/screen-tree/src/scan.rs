//! Turn a document tree into catalog screens.

use crate::extract::{ExtractOptions, extract_detail};
use crate::node::DocumentNode;
use regex::Regex;
use screen_core::ident::leading_screen_id;
use screen_core::index::{Screen, UNKNOWN_AUTHOR, UNKNOWN_TITLE};
use std::collections::HashSet;
use std::sync::LazyLock;

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+)").expect("valid version regex"));

/// Where the scanned tree came from.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    pub project: &'a str,
    pub version: &'a str,
    pub file_id: &'a str,
    pub file_name: &'a str,
    pub last_modified: &'a str,
}

/// The `X.Y.Z` version embedded in a remote file name.
pub fn version_from_file_name(name: &str) -> Option<String> {
    VERSION
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Build a screen from a container whose name starts with a screen id.
/// Containers without children are not screens.
pub fn screen_from_container(
    node: &DocumentNode,
    ctx: &ScanContext<'_>,
    options: &ExtractOptions,
) -> Option<Screen> {
    if !node.is_container() || node.children().is_empty() {
        return None;
    }
    let screen_id = leading_screen_id(node.name())?;
    let detail = extract_detail(node, options);

    Some(
        Screen {
            screen_id: screen_id.to_string(),
            page_title: detail
                .page_title
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            author: detail.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            description: detail.description.unwrap_or_default(),
            keywords: Vec::new(),
            project: ctx.project.to_string(),
            version: ctx.version.to_string(),
            file_id: ctx.file_id.to_string(),
            file_name: ctx.file_name.to_string(),
            node_id: node.id().to_string(),
            last_modified: ctx.last_modified.to_string(),
        }
        .with_keywords(),
    )
}

/// Every screen in the tree, in document order. When a screen id occurs
/// more than once the first occurrence wins.
pub fn scan_screens(
    root: &DocumentNode,
    ctx: &ScanContext<'_>,
    options: &ExtractOptions,
) -> Vec<Screen> {
    let mut seen = HashSet::new();
    root.containers(options.depth_cap)
        .into_iter()
        .filter_map(|node| screen_from_container(node, ctx, options))
        .filter(|screen| seen.insert(screen.screen_id.clone()))
        .collect()
}

/// The container for `screen_id`, if present in the tree.
pub fn locate_screen<'a>(
    root: &'a DocumentNode,
    screen_id: &str,
    depth_cap: usize,
) -> Option<&'a DocumentNode> {
    root.walk(depth_cap)
        .find(|n| n.is_container() && leading_screen_id(n.name()) == Some(screen_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_file_name() {
        assert_eq!(
            version_from_file_name("[CONTRABASS] 3.0.6 화면설계서"),
            Some("3.0.6".to_string())
        );
        assert_eq!(version_from_file_name("Drafts v2"), None);
    }
}
