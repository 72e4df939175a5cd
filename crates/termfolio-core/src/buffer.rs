use crate::keys::KeyEvent;

/// The in-progress command line. The cursor always trails the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    text: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Appends the event's character; returns it when accepted.
    pub fn insert(&mut self, event: &KeyEvent) -> Option<char> {
        let ch = event.printable()?;
        self.text.push(ch);
        Some(ch)
    }

    pub fn delete_last(&mut self) -> Option<char> {
        self.text.pop()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Overwrites the buffer, dropping any control characters from `text`.
    pub fn replace(&mut self, text: &str) {
        self.text = text.chars().filter(|ch| !ch.is_control()).collect();
    }

    /// Takes the current text, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}
