//! Keyword tokenization shared by the index and the scoring engine.
//!
//! The tokenizer keeps ASCII word characters and Hangul syllables, folds case,
//! and drops single-character tokens so that particles and stray digits do not
//! dominate matching.

/// Hangul syllables block (가..힣).
const HANGUL_SYLLABLES: std::ops::RangeInclusive<char> = '\u{AC00}'..='\u{D7A3}';

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || HANGUL_SYLLABLES.contains(&c)
}

/// Split `text` into lowercase tokens longer than one character.
///
/// Duplicates are kept; use [`keywords`] for a deduplicated list.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .map(|c| if is_token_char(c) { c } else { ' ' })
        .collect();
    cleaned
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 1)
        .map(String::from)
        .collect()
}

/// Tokenize and deduplicate, preserving first-occurrence order.
pub fn keywords(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Keywords for a catalog entry, derived from its id, title and description.
pub fn screen_keywords(screen_id: &str, page_title: &str, description: &str) -> Vec<String> {
    keywords(&format!("{screen_id} {page_title} {description}"))
}

/// Collapse internal whitespace and fold case, for label comparisons.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
