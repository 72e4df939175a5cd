/// Submitted commands in order, with a browsing cursor.
///
/// `cursor == entries.len()` means the user is not browsing and the line
/// buffer holds live input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStore {
    entries: Vec<String>,
    cursor: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Records a submission. Empty and repeated commands are kept.
    pub fn append(&mut self, command: impl Into<String>) {
        self.entries.push(command.into());
        self.cursor = self.entries.len();
    }

    /// Steps to the previous entry; `None` when already at the oldest.
    pub fn navigate_up(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Steps to the next entry. Leaving the newest entry yields `""` and ends
    /// browsing; `None` when not browsing.
    pub fn navigate_down(&mut self) -> Option<&str> {
        let len = self.entries.len();
        if self.cursor >= len {
            return None;
        }
        if self.cursor + 1 < len {
            self.cursor += 1;
            return self.entries.get(self.cursor).map(String::as_str);
        }
        self.cursor = len;
        Some("")
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = self.entries.len();
    }
}
