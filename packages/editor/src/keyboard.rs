//! Keyboard chords bound to commands.
//!
//! Chords are written as `+`-joined names (`ctrl+shift+z`). Modifiers are
//! normalised into the order `ctrl`, `shift`, `alt`; `meta`/`cmd` fold into
//! `ctrl` so one binding covers both platforms.

use std::fmt;
use std::str::FromStr;

use crate::CommandError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub key: String,
}

impl KeyChord {
    /// A bare key with no modifiers
    pub fn new(key: &str) -> Self {
        Self {
            ctrl: false,
            shift: false,
            alt: false,
            key: normalize_key(key),
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

fn normalize_key(key: &str) -> String {
    let key = key.trim().to_ascii_lowercase();
    match key.as_str() {
        "arrowup" => "up".to_string(),
        "arrowdown" => "down".to_string(),
        "arrowleft" => "left".to_string(),
        "arrowright" => "right".to_string(),
        "del" => "delete".to_string(),
        "esc" => "escape".to_string(),
        _ => key,
    }
}

impl FromStr for KeyChord {
    type Err = CommandError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || CommandError::InvalidChord(text.to_string());
        let mut chord = KeyChord::new("");
        let mut key: Option<String> = None;

        for part in text.split('+') {
            let part = part.trim().to_ascii_lowercase();
            match part.as_str() {
                "ctrl" | "control" | "meta" | "cmd" | "command" => chord.ctrl = true,
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                "" => return Err(invalid()),
                _ => {
                    if key.is_some() {
                        return Err(invalid());
                    }
                    key = Some(normalize_key(&part));
                }
            }
        }

        chord.key = key.ok_or_else(invalid)?;
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.shift {
            write!(f, "shift+")?;
        }
        if self.alt {
            write!(f, "alt+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// A key-down event as seen by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub chord: KeyChord,

    /// Key events typed into a form field never trigger commands
    pub in_text_field: bool,
}

impl KeyInput {
    pub fn new(chord: KeyChord) -> Self {
        Self {
            chord,
            in_text_field: false,
        }
    }

    /// Build from raw key-down data
    pub fn from_keydown(key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        Self::new(KeyChord {
            ctrl: ctrl || meta,
            shift,
            alt,
            key: normalize_key(key),
        })
    }

    pub fn in_text_field(mut self) -> Self {
        self.in_text_field = true;
        self
    }
}
