//! Substring relevance ranking over notes.
//!
//! A note matches when the normalized query occurs in its lowercased title or
//! content. Each matching field scores its field weight plus a position bonus
//! that shrinks the later the first occurrence starts; the note keeps its best
//! field score. Ties fall back to most recently updated, then id.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{Note, SearchHit};
use crate::text::clean_text;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchWeights {
    pub title: f64,
    pub content: f64,
    pub position: f64,
}

impl Default for SearchWeights {
    fn default() -> Self {
        Self {
            title: 3.0,
            content: 2.0,
            position: 1.0,
        }
    }
}

/// Normalizes a raw query into its cache key form.
pub fn normalize_query(raw: &str) -> String {
    clean_text(raw).to_lowercase()
}

/// Scores one note, or `None` if the query occurs in neither field.
pub fn score_note(note: &Note, query: &str, weights: &SearchWeights) -> Option<f64> {
    let title = field_score(&note.title, query, weights.title, weights.position);
    let content = note
        .content
        .as_deref()
        .and_then(|c| field_score(c, query, weights.content, weights.position));

    match (title, content) {
        (Some(t), Some(c)) => Some(t.max(c)),
        (t, c) => t.or(c),
    }
}

fn field_score(text: &str, query: &str, weight: f64, position_weight: f64) -> Option<f64> {
    let haystack = text.to_lowercase();
    let byte_pos = haystack.find(query)?;
    let char_pos = haystack[..byte_pos].chars().count();
    Some(weight + position_weight / (1.0 + char_pos as f64))
}

/// Ranks `notes` against an already-normalized query.
pub fn rank<I>(notes: I, query: &str, weights: &SearchWeights) -> Vec<SearchHit>
where
    I: IntoIterator<Item = Note>,
{
    let mut hits: Vec<SearchHit> = notes
        .into_iter()
        .filter_map(|note| score_note(&note, query, weights).map(|score| SearchHit { score, note }))
        .collect();

    hits.sort_by(compare_hits);
    hits
}

fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.note.updated_at.cmp(&a.note.updated_at))
        .then_with(|| a.note.id.cmp(&b.note.id))
}
