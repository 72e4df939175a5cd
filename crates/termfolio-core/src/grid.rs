//! In-memory soft-wrapping character grid.
//!
//! Understands the control vocabulary the console emits and nothing more:
//! CR, LF, BS (with reverse wrap onto a soft-wrapped row), `ESC [ n A`,
//! `ESC [ K`, `ESC [ 2K`, `ESC [ J`, `ESC [ 2J` and `ESC [ H`. OSC strings and
//! other CSI sequences are consumed and dropped.

use unicode_width::UnicodeWidthChar;

use crate::links::Link;
use crate::surface::{GridReader, GridRow, Surface};

/// Filler for the right half of a double-width glyph.
const WIDE_TAIL: char = '\0';

#[derive(Debug, Clone, Default)]
struct Row {
    cells: Vec<char>,
    wrapped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Start,
    Csi,
    Osc,
    OscEsc,
}

#[derive(Debug, Clone)]
pub struct MemoryGrid {
    width: usize,
    rows: Vec<Row>,
    row: usize,
    col: usize,
    viewport_top: usize,
    escape: Escape,
    csi_params: String,
    links: Vec<Link>,
}

impl MemoryGrid {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            rows: vec![Row::default()],
            row: 0,
            col: 0,
            viewport_top: 0,
            escape: Escape::None,
            csi_params: String::new(),
            links: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Changes the wrap width for output written from now on. Rows already
    /// written keep their wrapping.
    pub fn set_width(&mut self, width: usize) {
        self.width = width.max(1);
        self.col = self.col.min(self.width);
    }

    /// Cursor as (0-based column, 0-based row index).
    pub fn cursor(&self) -> (usize, usize) {
        (self.col.min(self.width.saturating_sub(1)), self.row)
    }

    /// First row index of the current screen after the last clear.
    pub fn viewport_top(&self) -> usize {
        self.viewport_top
    }

    /// First row index shown by a host that displays `height` rows.
    pub fn visible_top(&self, height: usize) -> usize {
        self.viewport_top
            .max(self.rows.len().saturating_sub(height.max(1)))
    }

    /// Every row's text, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        (0..self.rows.len())
            .map(|i| self.row_text(i))
            .collect()
    }

    /// Rows from the current screen only.
    pub fn screen_lines(&self) -> Vec<String> {
        (self.viewport_top..self.rows.len())
            .map(|i| self.row_text(i))
            .collect()
    }

    pub fn registered_links(&self) -> &[Link] {
        &self.links
    }

    fn row_text(&self, index: usize) -> String {
        let Some(row) = self.rows.get(index) else {
            return String::new();
        };
        let text: String = row.cells.iter().filter(|c| **c != WIDE_TAIL).collect();
        let continued = self.rows.get(index + 1).is_some_and(|next| next.wrapped);
        if continued {
            text
        } else {
            text.trim_end_matches(' ').to_string()
        }
    }

    fn ensure_row(&mut self, index: usize) {
        while self.rows.len() <= index {
            self.rows.push(Row::default());
        }
    }

    fn line_feed(&mut self) {
        self.row += 1;
        self.ensure_row(self.row);
    }

    fn put(&mut self, ch: char) {
        let cell_width = match ch.width() {
            Some(w) if w > 0 => w.min(2),
            _ => return,
        };
        if self.col + cell_width > self.width {
            self.row += 1;
            self.ensure_row(self.row);
            let row = &mut self.rows[self.row];
            row.wrapped = true;
            row.cells.clear();
            self.col = 0;
        }
        let col = self.col;
        let cells = &mut self.rows[self.row].cells;
        if cells.len() < col + cell_width {
            cells.resize(col + cell_width, ' ');
        }
        cells[col] = ch;
        if cell_width == 2 {
            cells[col + 1] = WIDE_TAIL;
        }
        self.col += cell_width;
    }

    fn backspace(&mut self) {
        if self.col >= self.width {
            self.col = self.width - 1;
        } else if self.col > 0 {
            self.col -= 1;
        } else if self.rows[self.row].wrapped && self.row > 0 {
            self.row -= 1;
            self.col = self.width - 1;
        }
    }

    fn erase_line(&mut self, mode: &str) {
        let col = self.col.min(self.width);
        let row = &mut self.rows[self.row];
        match mode {
            "2" => {
                row.cells.clear();
                row.wrapped = false;
            }
            "1" => {
                for cell in row.cells.iter_mut().take(col + 1) {
                    *cell = ' ';
                }
            }
            _ => row.cells.truncate(col),
        }
    }

    /// Erases from the cursor to the end of the screen.
    fn erase_below(&mut self) {
        let col = self.col.min(self.width);
        let row = &mut self.rows[self.row];
        row.cells.truncate(col);
        if col == 0 {
            row.wrapped = false;
        }
        self.rows.truncate(self.row + 1);
    }

    fn cursor_up(&mut self, params: &str) {
        let count = params.parse::<usize>().unwrap_or(1).max(1);
        self.row = self.row.saturating_sub(count).max(self.viewport_top);
    }

    fn finish_csi(&mut self, final_byte: char) {
        let params = std::mem::take(&mut self.csi_params);
        match final_byte {
            'A' => self.cursor_up(&params),
            'K' => self.erase_line(&params),
            'J' if params.is_empty() || params == "0" => self.erase_below(),
            'J' if params == "2" || params == "3" => self.clear_screen(),
            'H' if params.is_empty() => {
                self.row = self.viewport_top;
                self.col = 0;
            }
            _ => {}
        }
    }

    fn feed(&mut self, ch: char) {
        match self.escape {
            Escape::Start => {
                self.escape = match ch {
                    '[' => Escape::Csi,
                    ']' => Escape::Osc,
                    _ => Escape::None,
                };
            }
            Escape::Csi => {
                if ('@'..='~').contains(&ch) {
                    self.escape = Escape::None;
                    self.finish_csi(ch);
                } else {
                    self.csi_params.push(ch);
                }
            }
            Escape::Osc => match ch {
                '\x07' => self.escape = Escape::None,
                '\x1b' => self.escape = Escape::OscEsc,
                _ => {}
            },
            Escape::OscEsc => {
                self.escape = if ch == '\\' {
                    Escape::None
                } else {
                    Escape::Osc
                };
            }
            Escape::None => match ch {
                '\x1b' => {
                    self.escape = Escape::Start;
                    self.csi_params.clear();
                }
                '\r' => self.col = 0,
                '\n' => self.line_feed(),
                '\x08' => self.backspace(),
                c if c.is_control() => {}
                c => self.put(c),
            },
        }
    }
}

impl GridReader for MemoryGrid {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn read_row(&self, index: usize) -> Option<GridRow> {
        let row = self.rows.get(index)?;
        Some(GridRow {
            text: self.row_text(index),
            is_wrap_continuation: row.wrapped,
        })
    }
}

impl Surface for MemoryGrid {
    fn columns(&self) -> usize {
        self.width
    }

    fn write(&mut self, text: &str) {
        for ch in text.chars() {
            self.feed(ch);
        }
    }

    fn clear_screen(&mut self) {
        // Keep the old screen as scrollback and start a fresh one below it.
        self.rows.push(Row::default());
        self.row = self.rows.len() - 1;
        self.col = 0;
        self.viewport_top = self.row;
        self.links.clear();
    }

    fn reset_screen(&mut self) {
        self.rows = vec![Row::default()];
        self.row = 0;
        self.col = 0;
        self.viewport_top = 0;
        self.links.clear();
    }

    fn register_link_region(&mut self, link: &Link) {
        if !self.links.contains(link) {
            self.links.push(link.clone());
        }
    }
}
