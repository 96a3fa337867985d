//! Label-value heuristics over a screen's text leaves.
//!
//! Spec sheets lay fields out as a label text ("Page Title", "작성자") followed
//! somewhere nearby by the value text. The scanner finds a label occurrence and
//! looks a few leaves ahead for the first plausible value.

use crate::node::{DocumentNode, TextLeaf};
use screen_core::ident::{is_screen_id, leading_screen_id};
use screen_core::index::ScreenDetail;
use screen_core::keywords::normalize_text;

/// Leaves examined per label occurrence, the label itself included.
pub const LOOKAHEAD_WINDOW: usize = 8;

/// Description lines of this many characters or fewer are treated as noise.
pub const MIN_DESCRIPTION_CHARS: usize = 20;

/// Container holding a screen's description block.
pub const DESCRIPTION_FRAME: &str = "description frame";

const SCREEN_ID_LABELS: &[&str] = &["screen id", "화면 id", "화면 아이디"];
const PAGE_TITLE_LABELS: &[&str] = &["page title", "title", "페이지 타이틀"];
const AUTHOR_LABELS: &[&str] = &["author", "작성자"];
const DESCRIPTION_LABELS: &[&str] = &["description", "설명"];
const CHANGELOG_LABELS: &[&str] = &["changelog", "변경 이력", "변경이력"];

/// A field located by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelField {
    PageTitle,
    Author,
}

impl LabelField {
    /// Normalized label spellings for this field.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::PageTitle => PAGE_TITLE_LABELS,
            Self::Author => AUTHOR_LABELS,
        }
    }
}

/// Section labels that can never be a field value. `title` alone is only a
/// label when looking for the page title.
fn is_reserved(normalized: &str, field: Option<LabelField>) -> bool {
    let section = [
        SCREEN_ID_LABELS,
        DESCRIPTION_LABELS,
        CHANGELOG_LABELS,
        AUTHOR_LABELS,
    ]
    .iter()
    .any(|labels| labels.contains(&normalized));
    section
        || normalized == "page title"
        || normalized == "페이지 타이틀"
        || field.is_some_and(|f| f.aliases().contains(&normalized))
}

/// Options shared by every extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Traversal depth cap.
    pub depth_cap: usize,
    /// Texts dropped from description frames, typically project names.
    pub excluded_texts: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            depth_cap: 64,
            excluded_texts: Vec::new(),
        }
    }
}

/// Label scanner over a fixed, depth-first ordered list of text leaves.
pub struct LabelScanner<'a> {
    leaves: &'a [TextLeaf],
    names: Vec<String>,
    contents: Vec<String>,
}

impl<'a> LabelScanner<'a> {
    pub fn new(leaves: &'a [TextLeaf]) -> Self {
        Self {
            leaves,
            names: leaves.iter().map(|l| normalize_text(&l.name)).collect(),
            contents: leaves.iter().map(|l| normalize_text(&l.content)).collect(),
        }
    }

    fn is_label(&self, i: usize, labels: &[&str]) -> bool {
        labels.contains(&self.names[i].as_str()) || labels.contains(&self.contents[i].as_str())
    }

    /// Value following the first label occurrence of `field` that has one.
    pub fn find_value_after_label(&self, field: LabelField) -> Option<String> {
        let aliases = field.aliases();
        for i in 0..self.leaves.len() {
            if !self.is_label(i, aliases) {
                continue;
            }
            let end = (i + LOOKAHEAD_WINDOW).min(self.leaves.len());
            for j in i + 1..end {
                let raw = self.leaves[j].content.trim();
                let normalized = &self.contents[j];
                if normalized.is_empty()
                    || is_reserved(normalized, Some(field))
                    || is_screen_id(raw)
                {
                    continue;
                }
                return Some(raw.to_string());
            }
        }
        None
    }

    /// Long text lines between a description label and the next changelog
    /// label, joined by newlines.
    pub fn collect_description_section(&self) -> Option<String> {
        let mut lines = Vec::new();
        let mut in_section = false;
        for i in 0..self.leaves.len() {
            if self.is_label(i, DESCRIPTION_LABELS) {
                in_section = true;
                continue;
            }
            if self.is_label(i, CHANGELOG_LABELS) {
                in_section = false;
                continue;
            }
            let content = self.leaves[i].content.trim();
            if in_section && content.chars().count() > MIN_DESCRIPTION_CHARS {
                lines.push(content);
            }
        }
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

/// Description of a screen container: the texts of its description frame if
/// it has one, otherwise the description section of its leaves.
pub fn description_of(container: &DocumentNode, options: &ExtractOptions) -> Option<String> {
    let frame = container
        .walk(options.depth_cap)
        .find(|n| normalize_text(n.name()) == DESCRIPTION_FRAME);

    if let Some(frame) = frame {
        let excluded: Vec<String> = options
            .excluded_texts
            .iter()
            .map(|t| normalize_text(t))
            .collect();
        let texts: Vec<String> = frame
            .text_leaves(options.depth_cap)
            .into_iter()
            .map(|leaf| leaf.content.trim().to_string())
            .filter(|text| {
                let normalized = normalize_text(text);
                text.chars().count() > 1
                    && !is_reserved(&normalized, Some(LabelField::PageTitle))
                    && !excluded.contains(&normalized)
            })
            .collect();
        if !texts.is_empty() {
            return Some(texts.join("\n"));
        }
    }

    let leaves = container.text_leaves(options.depth_cap);
    LabelScanner::new(&leaves).collect_description_section()
}

/// Title derived from a container name such as `CONT-01_02_03 - User List`.
pub fn title_from_container_name(name: &str) -> Option<String> {
    let rest = match leading_screen_id(name) {
        Some(id) => &name.trim_start()[id.len()..],
        None => name,
    };
    let title = rest
        .trim_start_matches(|c: char| matches!(c, '-' | ':' | '_') || c.is_whitespace())
        .trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Title, author and description of a screen container.
pub fn extract_detail(container: &DocumentNode, options: &ExtractOptions) -> ScreenDetail {
    let leaves = container.text_leaves(options.depth_cap);
    let scanner = LabelScanner::new(&leaves);
    let page_title = scanner
        .find_value_after_label(LabelField::PageTitle)
        .or_else(|| title_from_container_name(container.name()));
    ScreenDetail {
        page_title,
        author: scanner.find_value_after_label(LabelField::Author),
        description: description_of(container, options),
    }
}
