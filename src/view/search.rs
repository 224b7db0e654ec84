//! Keystroke-driven quick search over already-fetched content.
//!
//! Case-insensitive substring match against document title/description and
//! algorithm title/short-title. No ranking beyond insertion order
//! (algorithms first, then documents), capped for the dropdown.

use crate::db::models::{DbAlgorithmRecord, DbFileRecord};

/// Dropdown result cap.
pub const MAX_RESULTS: usize = 8;

/// Queries shorter than this yield no results.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Algorithm,
    Document,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub kind: HitKind,
    pub id: String,
    pub title: String,
    /// Navigation target: an in-page anchor for algorithms, the viewer route
    /// for documents.
    pub url: String,
}

pub fn quick_search(
    files: &[DbFileRecord],
    algorithms: &[DbAlgorithmRecord],
    query: &str,
) -> Vec<SearchHit> {
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    let mut hits = Vec::new();

    for algo in algorithms {
        if contains(&algo.title, &needle) || contains(&algo.short_title, &needle) {
            hits.push(SearchHit {
                kind: HitKind::Algorithm,
                id: algo.id.clone(),
                title: algo.title.clone(),
                url: format!("#{}", algo.id),
            });
        }
    }

    for file in files {
        let in_description = file
            .description
            .as_deref()
            .is_some_and(|d| contains(d, &needle));
        if contains(&file.title, &needle) || in_description {
            hits.push(SearchHit {
                kind: HitKind::Document,
                id: file.id.clone(),
                title: file.title.clone(),
                url: format!("/viewer/{}", file.id),
            });
        }
    }

    hits.truncate(MAX_RESULTS);
    hits
}

fn contains(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}

/// Keys the dropdown reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    Escape,
}

/// Selection state for the rendered result list. The index moves with
/// simple clamping at the bounds; enter resolves the selected hit and
/// escape closes the dropdown.
#[derive(Debug, Clone, Default)]
pub struct Dropdown {
    hits: Vec<SearchHit>,
    selected: usize,
    open: bool,
}

impl Dropdown {
    /// Replace the result list (a new keystroke ran the search). Selection
    /// resets to the top; the dropdown opens only when there are hits.
    pub fn set_hits(&mut self, hits: Vec<SearchHit>) {
        self.open = !hits.is_empty();
        self.hits = hits;
        self.selected = 0;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Handle a key press; returns the hit to navigate to on enter.
    pub fn on_key(&mut self, key: Key) -> Option<SearchHit> {
        if !self.open {
            return None;
        }
        match key {
            Key::Down => {
                self.selected = (self.selected + 1).min(self.hits.len().saturating_sub(1));
                None
            }
            Key::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            Key::Enter => self.hits.get(self.selected).cloned(),
            Key::Escape => {
                self.open = false;
                None
            }
        }
    }
}
