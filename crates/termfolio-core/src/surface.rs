//! Contracts between the console core and the pieces it drives.
//!
//! The core never renders glyphs or opens URLs itself. It writes text (with a
//! small set of control sequences) to a [`Surface`], reads rows back through
//! [`GridReader`] for link detection, and asks a [`Host`] to open resources.

use anyhow::Result;

use crate::links::Link;

/// Return to column 0 and erase everything from there to the end of screen.
pub const ERASE_BELOW: &str = "\r\x1b[J";
/// Visual backspace: step left, blank the cell, step left again.
pub const RUB_OUT: &str = "\x08 \x08";
pub const CRLF: &str = "\r\n";

/// Moves the cursor up `rows` rows, staying in the same column.
pub fn cursor_up(rows: usize) -> String {
    format!("\x1b[{rows}A")
}

/// One physical row of the rendered grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRow {
    pub text: String,
    /// True when this row continues the row above after a soft wrap.
    pub is_wrap_continuation: bool,
}

/// Read access to rendered rows, addressed by 0-based index.
pub trait GridReader {
    fn row_count(&self) -> usize;
    fn read_row(&self, index: usize) -> Option<GridRow>;
}

/// Output side of the renderer.
pub trait Surface: GridReader {
    /// Column count at which new output soft-wraps.
    fn columns(&self) -> usize;

    fn write(&mut self, text: &str);

    fn write_line(&mut self, text: &str) {
        self.write(text);
        self.write(CRLF);
    }

    /// Wipes the visible rows; scrollback is kept.
    fn clear_screen(&mut self);

    /// Wipes visible rows and scrollback.
    fn reset_screen(&mut self);

    /// Makes the link's cells activatable. Hosts without pointer support may
    /// ignore this.
    fn register_link_region(&mut self, _link: &Link) {}
}

/// Page/window integration: opening mail, phone and web links.
pub trait Host {
    fn open_external(&mut self, uri: &str) -> Result<()>;
}

/// A host that remembers what it was asked to open.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    pub opened: Vec<String>,
}

impl Host for RecordingHost {
    fn open_external(&mut self, uri: &str) -> Result<()> {
        self.opened.push(uri.to_string());
        Ok(())
    }
}
