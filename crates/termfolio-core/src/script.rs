//! Textual key scripts for headless runs and tests.
//!
//! Plain characters are typed as-is; named keys go in angle brackets:
//! `help<Enter>`, `ab<Tab>`, `<Up><Up><Enter>`, `<ctrl+c>` (also `<C-c>`),
//! `<lt>` for a literal `<`. Line breaks in the script are ignored so long
//! scripts can be wrapped.

use thiserror::Error;

use crate::keys::{KeyEvent, LogicalKey, Modifiers};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyScriptError {
    #[error("unterminated key token starting at char {0}")]
    Unterminated(usize),
    #[error("unsupported key token: <{0}>")]
    UnknownToken(String),
    #[error("missing key in token: <{0}>")]
    MissingKey(String),
}

pub fn parse_key_script(script: &str) -> Result<Vec<KeyEvent>, KeyScriptError> {
    let mut events = Vec::new();
    let mut chars = script.char_indices();
    while let Some((pos, ch)) = chars.next() {
        match ch {
            '\r' | '\n' => {}
            '<' => {
                let mut token = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == '>' {
                        closed = true;
                        break;
                    }
                    token.push(next);
                }
                if !closed {
                    return Err(KeyScriptError::Unterminated(pos));
                }
                events.push(parse_key_token(&token)?);
            }
            other => events.push(KeyEvent::char(other)),
        }
    }
    Ok(events)
}

/// Parses one bracketed token such as `enter`, `up` or `ctrl+l`.
pub fn parse_key_token(token: &str) -> Result<KeyEvent, KeyScriptError> {
    let normalized = token.trim().to_ascii_lowercase();
    if normalized == "lt" {
        return Ok(KeyEvent::char('<'));
    }
    if normalized.ends_with(['+', '-']) {
        return Err(KeyScriptError::MissingKey(token.to_string()));
    }
    let parts: Vec<&str> = normalized
        .split(['+', '-'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    let Some((key_part, modifier_parts)) = parts.split_last() else {
        return Err(KeyScriptError::MissingKey(token.to_string()));
    };
    let mut modifiers = Modifiers::NONE;
    for part in modifier_parts {
        match *part {
            "ctrl" | "control" | "c" => modifiers.ctrl = true,
            "alt" | "option" | "m" => modifiers.alt = true,
            "meta" | "cmd" | "super" => modifiers.meta = true,
            _ => return Err(KeyScriptError::UnknownToken(token.to_string())),
        }
    }
    let event =
        named_key(key_part).ok_or_else(|| KeyScriptError::UnknownToken(token.to_string()))?;
    Ok(apply_modifiers(event, modifiers))
}

fn named_key(name: &str) -> Option<KeyEvent> {
    let key = match name {
        "enter" | "return" | "cr" => LogicalKey::Enter,
        "backspace" | "bs" => LogicalKey::Backspace,
        "up" => LogicalKey::ArrowUp,
        "down" => LogicalKey::ArrowDown,
        "tab" => LogicalKey::Tab,
        "esc" | "escape" => LogicalKey::Escape,
        "space" => return Some(KeyEvent::char(' ')),
        single if single.chars().count() == 1 => return single.chars().next().map(KeyEvent::char),
        _ => return None,
    };
    Some(KeyEvent::new(key))
}

fn apply_modifiers(event: KeyEvent, modifiers: Modifiers) -> KeyEvent {
    if modifiers.ctrl && !modifiers.alt && !modifiers.meta {
        match event.character {
            Some('c') => return KeyEvent::new(LogicalKey::CtrlC),
            Some('l') => return KeyEvent::new(LogicalKey::CtrlL),
            _ => {}
        }
    }
    event.with_modifiers(modifiers)
}
