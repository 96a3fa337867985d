//! Text output for query outcomes and index statistics.
//!
//! Tabular parts are TOON (Token-Oriented Object Notation) so agents can read
//! candidate lists compactly. TOON format: <https://github.com/toon-format/toon>

use crate::score::SearchResult;
use crate::session::PoolKind;
use screen_core::index::{IndexStats, Screen};
use serde::Serialize;
use toon_format::{EncodeOptions, encode};

/// Get default encoding options: pipe delimiter, 2-space indent.
fn encode_opts() -> EncodeOptions {
    EncodeOptions::default()
        .with_delimiter(toon_format::Delimiter::Pipe)
        .with_indent(toon_format::Indent::Spaces(2))
}

fn encode_or_debug<T: Serialize + std::fmt::Debug>(value: &T) -> String {
    encode(value, &encode_opts()).unwrap_or_else(|_| format!("{value:?}"))
}

// ---------------------------------------------------------------------------
// Confirmed screen
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ConfirmedOutput<'a> {
    screen_id: &'a str,
    title: &'a str,
    project: &'a str,
    version: &'a str,
    author: &'a str,
    file: &'a str,
    file_id: &'a str,
    node_id: &'a str,
}

/// Full detail of one resolved screen. `notes` are appended as-is.
pub fn format_confirmed(screen: &Screen, notes: &[String]) -> String {
    let header = ConfirmedOutput {
        screen_id: &screen.screen_id,
        title: &screen.page_title,
        project: &screen.project,
        version: &screen.version,
        author: &screen.author,
        file: &screen.file_name,
        file_id: &screen.file_id,
        node_id: &screen.node_id,
    };

    let mut out = format!("Screen confirmed: {}\n", screen.screen_id);
    out.push_str(&encode_or_debug(&header));
    out.push_str("\n\ndescription:\n");
    let lines: Vec<&str> = screen
        .description
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        out.push_str("  (no description found in the design file)\n");
    } else {
        for line in lines {
            out.push_str(&format!("  - {}\n", line));
        }
    }
    out.push_str(&format!(
        "\ncode_search_hint: \"{}\"",
        screen.code_search_hint()
    ));
    for note in notes {
        out.push_str(&format!("\n{}", note));
    }
    out
}

// ---------------------------------------------------------------------------
// Choices
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ScreenRow {
    no: usize,
    screen_id: String,
    title: String,
    project: String,
    version: String,
    score: u32,
    matched: String,
}

#[derive(Debug, Serialize)]
struct ScreenChoices {
    query: String,
    candidates: Vec<ScreenRow>,
}

#[derive(Debug, Serialize)]
struct VersionRow {
    no: usize,
    project: String,
    version: String,
    screen_id: String,
    title: String,
}

#[derive(Debug, Serialize)]
struct VersionChoices {
    query: String,
    versions: Vec<VersionRow>,
}

/// Numbered candidates, in the order the numbers resolve to.
pub fn format_choices(kind: PoolKind, query: &str, results: &[SearchResult]) -> String {
    let body = match kind {
        PoolKind::Screens => encode_or_debug(&ScreenChoices {
            query: query.to_string(),
            candidates: results
                .iter()
                .enumerate()
                .map(|(i, r)| ScreenRow {
                    no: i + 1,
                    screen_id: r.screen.screen_id.clone(),
                    title: r.screen.page_title.clone(),
                    project: r.screen.project.clone(),
                    version: r.screen.version.clone(),
                    score: r.score,
                    matched: r.matched_keywords.join(", "),
                })
                .collect(),
        }),
        PoolKind::Versions => encode_or_debug(&VersionChoices {
            query: query.to_string(),
            versions: results
                .iter()
                .enumerate()
                .map(|(i, r)| VersionRow {
                    no: i + 1,
                    project: r.screen.project.clone(),
                    version: r.screen.version.clone(),
                    screen_id: r.screen.screen_id.clone(),
                    title: r.screen.page_title.clone(),
                })
                .collect(),
        }),
    };

    let heading = match kind {
        PoolKind::Screens => format!("{} matching screens. Which one did you mean?", results.len()),
        PoolKind::Versions => {
            "The same screen exists in several versions. Which version did you mean?".to_string()
        }
    };
    format!(
        "{}\n{}\n\nReply with the number (e.g. \"1\") to confirm.",
        heading, body
    )
}

/// Nothing matched in the index or remotely.
pub fn format_no_match(query: &str, project: Option<&str>, version: Option<&str>) -> String {
    let scope = match (project, version) {
        (Some(p), Some(v)) => format!(" in {} {}", p, v),
        (Some(p), None) => format!(" in {}", p),
        (None, Some(v)) => format!(" in version {}", v),
        (None, None) => String::new(),
    };
    format!(
        "No screens match \"{}\"{}.\nTry a screen id (e.g. CONT-05_04_54), different keywords, or name the project and version (e.g. \"contrabass 3.0.6 {}\").",
        query, scope, query
    )
}

// ---------------------------------------------------------------------------
// Index statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct VersionInfo {
    project: String,
    version: String,
    screens: usize,
}

#[derive(Debug, Serialize)]
struct StatsOutput {
    total_screens: usize,
    last_updated: String,
    projects: Vec<String>,
    versions: Vec<VersionInfo>,
}

/// Index statistics as TOON.
pub fn format_stats(stats: &IndexStats) -> String {
    let output = StatsOutput {
        total_screens: stats.total_screens,
        last_updated: stats.last_updated.to_rfc3339(),
        projects: stats.projects.iter().map(|p| p.name.clone()).collect(),
        versions: stats
            .projects
            .iter()
            .flat_map(|p| {
                p.versions.iter().map(|(version, count)| VersionInfo {
                    project: p.name.clone(),
                    version: version.clone(),
                    screens: *count,
                })
            })
            .collect(),
    };
    encode_or_debug(&output)
}
