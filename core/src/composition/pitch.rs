// Copyright (c) 2024 Mike Tsao. All rights reserved.

use crate::{
    error::{CompileError, Result},
    midi::u7,
};
use std::{fmt, str::FromStr};

/// A pitch spelled with a letter, an optional accidental, and an octave, like
/// `C3`, `F#4`, or `Bb-1`.
///
/// Octaves follow the convention where C3 is MIDI key 60, so the playable
/// range runs from `C-2` (0) to `G8` (127).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NoteName {
    spelling: String,
    key: u7,
}
impl NoteName {
    const SEMITONES: [(char, i32); 7] = [
        ('C', 0),
        ('D', 2),
        ('E', 4),
        ('F', 5),
        ('G', 7),
        ('A', 9),
        ('B', 11),
    ];

    /// The MIDI key this name resolves to.
    pub fn key(&self) -> u7 {
        self.key
    }

    /// The name as it was written (with the letter uppercased).
    pub fn spelling(&self) -> &str {
        &self.spelling
    }
}
impl FromStr for NoteName {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CompileError::InvalidNoteName(s.to_string());

        let mut chars = s.trim().chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        let semitone = Self::SEMITONES
            .iter()
            .find(|(l, _)| *l == letter)
            .map(|(_, semitone)| *semitone)
            .ok_or_else(invalid)?;

        let rest = chars.as_str();
        let (accidental, octave) = match rest.chars().next() {
            Some('#') => (1, &rest[1..]),
            Some('b') => (-1, &rest[1..]),
            _ => (0, rest),
        };
        let octave: i32 = octave.parse().map_err(|_| invalid())?;

        let value = (octave + 2) * 12 + semitone + accidental;
        if !(0..=127).contains(&value) {
            return Err(invalid());
        }
        Ok(Self {
            spelling: format!("{letter}{rest}"),
            key: u7::new(value as u8),
        })
    }
}
impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}

/// A pitch supplied by whoever decides the musical content. Either form is
/// checked once, when it's made, and resolves to a MIDI key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pitch {
    /// A MIDI key number, 0..=127.
    Raw(u7),
    #[allow(missing_docs)]
    Named(NoteName),
}
impl Default for Pitch {
    fn default() -> Self {
        Self::Raw(u7::new(Self::DEFAULT_KEY))
    }
}
impl Pitch {
    /// Middle C (C3 in this crate's octave numbering).
    pub const DEFAULT_KEY: u8 = 60;

    /// A raw key number, rejected if it's outside 0..=127.
    pub fn new_raw(key: u32) -> Result<Self> {
        if key > 127 {
            Err(CompileError::InvalidPitch(key))
        } else {
            Ok(Self::Raw(u7::new(key as u8)))
        }
    }

    #[allow(missing_docs)]
    pub fn key(&self) -> u7 {
        match self {
            Pitch::Raw(key) => *key,
            Pitch::Named(name) => name.key(),
        }
    }
}
impl From<u7> for Pitch {
    fn from(value: u7) -> Self {
        Self::Raw(value)
    }
}
impl From<NoteName> for Pitch {
    fn from(value: NoteName) -> Self {
        Self::Named(value)
    }
}
impl TryFrom<u8> for Pitch {
    type Error = CompileError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new_raw(value as u32)
    }
}
impl FromStr for Pitch {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::Named(s.parse()?))
    }
}
impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pitch::Raw(key) => write!(f, "{}", key.as_int()),
            Pitch::Named(name) => write!(f, "{name}"),
        }
    }
}
