//! URL detection over soft-wrapped grid rows.
//!
//! Coordinates are 1-based. A link's `end` is exclusive and sits on the row
//! that holds the URL's last character, so a URL that fills a row to the edge
//! ends at `x = row_width + 1` on that row rather than at column 1 of the
//! continuation row.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

use crate::surface::GridReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: usize,
    pub y: usize,
}

impl GridPoint {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub uri: String,
    pub start: GridPoint,
    pub end: GridPoint,
}

impl Link {
    /// Whether the cell at `(x, y)` belongs to this link.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        let point = (y, x);
        point >= (self.start.y, self.start.x) && point < (self.end.y, self.end.x)
    }
}

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"https?://\S+").expect("valid url regex"))
}

/// Finds every URL on the logical line that contains row `y` (1-based).
pub fn scan_links<G: GridReader + ?Sized>(grid: &G, y: usize) -> Vec<Link> {
    if y == 0 || y > grid.row_count() {
        return Vec::new();
    }
    let (first, last) = logical_span(grid, y - 1);
    let rows: Vec<String> = (first..=last)
        .map(|i| grid.read_row(i).map(|row| row.text).unwrap_or_default())
        .collect();
    let logical = rows.concat();

    url_regex()
        .find_iter(&logical)
        .map(|m| {
            let start = logical[..m.start()].chars().count();
            let end = start + m.as_str().chars().count();
            Link {
                uri: m.as_str().to_string(),
                start: locate(&rows, first, start, false),
                end: locate(&rows, first, end, true),
            }
        })
        .collect()
}

/// Row indices (0-based, inclusive) of the soft-wrapped line holding `index`.
fn logical_span<G: GridReader + ?Sized>(grid: &G, index: usize) -> (usize, usize) {
    let is_continuation =
        |i: usize| grid.read_row(i).is_some_and(|row| row.is_wrap_continuation);

    let mut first = index;
    while first > 0 && is_continuation(first) {
        first -= 1;
    }
    let mut last = first;
    while is_continuation(last + 1) {
        last += 1;
    }
    (first, last.max(index))
}

/// Maps a char offset into the concatenated rows back onto the grid.
fn locate(rows: &[String], first: usize, offset: usize, exclusive_end: bool) -> GridPoint {
    let mut remaining = offset;
    for (i, text) in rows.iter().enumerate() {
        let len = text.chars().count();
        let on_this_row = if exclusive_end {
            remaining <= len
        } else {
            remaining < len
        };
        if on_this_row {
            return GridPoint::new(cell_column(text, remaining), first + i + 1);
        }
        remaining -= len;
    }
    let last = rows.last().map(String::as_str).unwrap_or_default();
    GridPoint::new(cell_column(last, last.chars().count()), first + rows.len())
}

/// 1-based cell column of the char at `chars_before` within `text`.
fn cell_column(text: &str, chars_before: usize) -> usize {
    text.chars()
        .take(chars_before)
        .map(|ch| ch.width().unwrap_or(0))
        .sum::<usize>()
        + 1
}
