use serde::{Deserialize, Serialize};

/// Logical meaning of a key press, independent of the host's key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalKey {
    Enter,
    Backspace,
    ArrowUp,
    ArrowDown,
    Tab,
    Escape,
    CtrlC,
    CtrlL,
    Printable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// One physical key press as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub character: Option<char>,
    pub key: LogicalKey,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: LogicalKey) -> Self {
        Self {
            character: None,
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn char(ch: char) -> Self {
        Self {
            character: Some(ch),
            key: LogicalKey::Printable,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// The character this event would insert into the line buffer, if any.
    ///
    /// Control characters and ctrl/meta chords never insert; alt is let
    /// through because some layouts compose printable glyphs with it.
    pub fn printable(&self) -> Option<char> {
        if self.key != LogicalKey::Printable || self.modifiers.ctrl || self.modifiers.meta {
            return None;
        }
        self.character.filter(|ch| !ch.is_control())
    }

    /// Case-insensitive match against a single-letter answer key.
    pub fn is_letter(&self, letter: char) -> bool {
        self.printable()
            .is_some_and(|ch| ch.eq_ignore_ascii_case(&letter))
    }

    /// Escape and Ctrl-C back out of any pending prompt.
    pub fn is_cancel(&self) -> bool {
        matches!(self.key, LogicalKey::Escape | LogicalKey::CtrlC)
    }
}
