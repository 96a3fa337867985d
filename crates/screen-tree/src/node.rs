//! Document tree model and bounded traversals.
//!
//! Remote nodes arrive as `{id, name, type, children?, characters?}` and are
//! folded into [`DocumentNode`] variants. Traversals use an explicit stack and
//! never descend past a caller-supplied depth cap, so deeply nested files
//! cannot exhaust the call stack.

use serde::Deserialize;

/// A node of a remote design document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawNode")]
pub enum DocumentNode {
    Frame {
        id: String,
        name: String,
        children: Vec<DocumentNode>,
    },
    Section {
        id: String,
        name: String,
        children: Vec<DocumentNode>,
    },
    Text {
        id: String,
        name: String,
        characters: String,
    },
    /// Pages, groups, components and anything else.
    Other {
        id: String,
        name: String,
        kind: String,
        children: Vec<DocumentNode>,
    },
}

#[derive(Deserialize)]
struct RawNode {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    children: Vec<DocumentNode>,
    #[serde(default)]
    characters: Option<String>,
}

impl From<RawNode> for DocumentNode {
    fn from(raw: RawNode) -> Self {
        let RawNode {
            id,
            name,
            kind,
            children,
            characters,
        } = raw;
        match kind.as_str() {
            "FRAME" => Self::Frame { id, name, children },
            "SECTION" => Self::Section { id, name, children },
            "TEXT" => Self::Text {
                id,
                name,
                characters: characters.unwrap_or_default(),
            },
            _ => Self::Other {
                id,
                name,
                kind,
                children,
            },
        }
    }
}

/// A text leaf in depth-first order: the layer name and its visible content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLeaf {
    pub name: String,
    pub content: String,
}

impl DocumentNode {
    pub fn frame(id: &str, name: &str, children: Vec<DocumentNode>) -> Self {
        Self::Frame {
            id: id.to_string(),
            name: name.to_string(),
            children,
        }
    }

    pub fn section(id: &str, name: &str, children: Vec<DocumentNode>) -> Self {
        Self::Section {
            id: id.to_string(),
            name: name.to_string(),
            children,
        }
    }

    pub fn text(id: &str, name: &str, characters: &str) -> Self {
        Self::Text {
            id: id.to_string(),
            name: name.to_string(),
            characters: characters.to_string(),
        }
    }

    pub fn other(id: &str, name: &str, kind: &str, children: Vec<DocumentNode>) -> Self {
        Self::Other {
            id: id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            children,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Frame { id, .. }
            | Self::Section { id, .. }
            | Self::Text { id, .. }
            | Self::Other { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Frame { name, .. }
            | Self::Section { name, .. }
            | Self::Text { name, .. }
            | Self::Other { name, .. } => name,
        }
    }

    pub fn children(&self) -> &[DocumentNode] {
        match self {
            Self::Frame { children, .. }
            | Self::Section { children, .. }
            | Self::Other { children, .. } => children,
            Self::Text { .. } => &[],
        }
    }

    /// Frames and sections are the only nodes that can hold a screen.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Frame { .. } | Self::Section { .. })
    }

    /// Pre-order walk, visiting `self` at depth 0 and skipping anything
    /// deeper than `depth_cap`.
    pub fn walk(&self, depth_cap: usize) -> Walk<'_> {
        Walk {
            stack: vec![(self, 0)],
            depth_cap,
        }
    }

    /// Non-empty text leaves of this subtree, depth-first.
    pub fn text_leaves(&self, depth_cap: usize) -> Vec<TextLeaf> {
        self.walk(depth_cap)
            .filter_map(|node| match node {
                Self::Text {
                    name, characters, ..
                } if !characters.is_empty() => Some(TextLeaf {
                    name: name.clone(),
                    content: characters.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Frames and sections of this subtree, depth-first, including `self`.
    pub fn containers(&self, depth_cap: usize) -> Vec<&DocumentNode> {
        self.walk(depth_cap).filter(|n| n.is_container()).collect()
    }

    /// First descendant (or self) with the given id.
    pub fn find_by_id(&self, id: &str, depth_cap: usize) -> Option<&DocumentNode> {
        self.walk(depth_cap).find(|n| n.id() == id)
    }
}

/// Iterator returned by [`DocumentNode::walk`].
pub struct Walk<'a> {
    stack: Vec<(&'a DocumentNode, usize)>,
    depth_cap: usize,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a DocumentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        if depth < self.depth_cap {
            // reversed so the first child is visited first
            for child in node.children().iter().rev() {
                self.stack.push((child, depth + 1));
            }
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentNode {
        DocumentNode::frame(
            "1:1",
            "CONT-01_01_01 Login",
            vec![
                DocumentNode::text("1:2", "Page Title", "Page Title"),
                DocumentNode::other(
                    "1:3",
                    "group",
                    "GROUP",
                    vec![DocumentNode::text("1:4", "value", "Login")],
                ),
                DocumentNode::text("1:5", "empty", ""),
                DocumentNode::section("1:6", "Notes", vec![]),
            ],
        )
    }

    #[test]
    fn test_deserialize_variants() {
        let json = r#"{
            "id": "0:1", "name": "Page 1", "type": "CANVAS",
            "children": [
                {"id": "1:1", "name": "CONT-01_01_01", "type": "FRAME", "children": [
                    {"id": "1:2", "name": "Title", "type": "TEXT", "characters": "Login"}
                ]},
                {"id": "2:1", "name": "Block", "type": "SECTION"}
            ]
        }"#;
        let node: DocumentNode = serde_json::from_str(json).unwrap();
        assert!(matches!(node, DocumentNode::Other { ref kind, .. } if kind == "CANVAS"));
        assert!(matches!(node.children()[0], DocumentNode::Frame { .. }));
        assert!(matches!(node.children()[1], DocumentNode::Section { .. }));
        assert_eq!(
            node.children()[0].children()[0],
            DocumentNode::text("1:2", "Title", "Login")
        );
    }

    #[test]
    fn test_text_leaves_depth_first_skips_empty() {
        let leaves = sample().text_leaves(64);
        let contents: Vec<&str> = leaves.iter().map(|l| l.content.as_str()).collect();
        assert_eq!(contents, vec!["Page Title", "Login"]);
    }

    #[test]
    fn test_depth_cap_limits_traversal() {
        let leaves = sample().text_leaves(1);
        assert_eq!(leaves.len(), 1);
        assert_eq!(sample().walk(0).count(), 1);
    }

    #[test]
    fn test_containers_and_find_by_id() {
        let root = sample();
        let ids: Vec<&str> = root.containers(64).iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["1:1", "1:6"]);
        assert_eq!(root.find_by_id("1:4", 64).map(|n| n.name()), Some("value"));
    }
}
