// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! The flat integer exchange format between rhythm trees and the compiler.
//!
//! On the wire a state array is a sequence of signed integers: `-1` marks a
//! Part boundary, `-2` a Measure boundary, and `-3` opens a Beat. A beat
//! header is followed by the beat's subdivision count and then exactly that
//! many activation values in {0, 1, 2}. Inside the crate the same information
//! travels as [StateToken]s, and [decode()]/[encode()] convert at the edge.

use crate::error::{CompileError, Result};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, FromRepr};

/// Part boundary marker.
pub const PART_SENTINEL: i32 = -1;
/// Measure boundary marker.
pub const MEASURE_SENTINEL: i32 = -2;
/// Beat header marker. Always followed by a subdivision count.
pub const BEAT_SENTINEL: i32 = -3;

/// What a single time unit is doing.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumIter,
    FromRepr,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Activation {
    /// Silence begins (or continues) here.
    #[default]
    Release = 0,
    /// A new note starts here.
    Attack = 1,
    /// The previous attack keeps sounding.
    Sustain = 2,
}
impl Activation {
    /// The integer used in state arrays.
    pub const fn value(self) -> i32 {
        self as i32
    }

    /// Reads an activation from a state-array integer. `index` is only used
    /// for error reporting.
    pub fn from_state_value(value: i32, index: usize) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .and_then(Self::from_repr)
            .ok_or(CompileError::InvalidActivation { index, value })
    }

    /// True for anything that produces a wire event (everything except
    /// sustain).
    pub const fn is_emittable(self) -> bool {
        !matches!(self, Self::Sustain)
    }
}
impl TryFrom<i32> for Activation {
    type Error = CompileError;

    fn try_from(value: i32) -> Result<Self> {
        Self::from_state_value(value, 0)
    }
}

/// One element of a state array, with the structural meaning made explicit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateToken {
    #[allow(missing_docs)]
    PartBoundary,
    #[allow(missing_docs)]
    MeasureBoundary,
    /// Opens a beat of `subdivision` time units.
    BeatHeader { subdivision: usize },
    /// One time unit of the currently open beat.
    Unit(Activation),
}

/// Parses a state array, checking that every beat header carries a valid
/// subdivision count followed by exactly that many activation values.
pub fn decode(state: &[i32]) -> Result<Vec<StateToken>> {
    let mut tokens = Vec::with_capacity(state.len());
    let mut index = 0;
    while index < state.len() {
        let value = state[index];
        match value {
            PART_SENTINEL => tokens.push(StateToken::PartBoundary),
            MEASURE_SENTINEL => tokens.push(StateToken::MeasureBoundary),
            BEAT_SENTINEL => {
                let header_index = index;
                let subdivision = match state.get(index + 1) {
                    None => return Err(CompileError::MissingSubdivision { index }),
                    Some(&count) if count < 1 => {
                        return Err(CompileError::InvalidSubdivision {
                            index,
                            value: count,
                        })
                    }
                    Some(&count) => count as usize,
                };
                tokens.push(StateToken::BeatHeader { subdivision });
                index += 2;

                let mut found = 0;
                while found < subdivision {
                    match state.get(index) {
                        Some(&v) if v >= 0 => {
                            tokens.push(StateToken::Unit(Activation::from_state_value(v, index)?));
                            found += 1;
                            index += 1;
                        }
                        _ => {
                            return Err(CompileError::TruncatedBeat {
                                index: header_index,
                                expected: subdivision,
                                found,
                            })
                        }
                    }
                }
                continue;
            }
            v if v >= 0 => {
                // A well-formed activation value still needs a beat to live in.
                Activation::from_state_value(v, index)?;
                return Err(CompileError::UnitOutsideBeat { index });
            }
            _ => return Err(CompileError::UnexpectedSentinel { index, value }),
        }
        index += 1;
    }
    Ok(tokens)
}

/// Serializes tokens back into the integer exchange format.
pub fn encode(tokens: &[StateToken]) -> Vec<i32> {
    let mut state = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            StateToken::PartBoundary => state.push(PART_SENTINEL),
            StateToken::MeasureBoundary => state.push(MEASURE_SENTINEL),
            StateToken::BeatHeader { subdivision } => {
                state.push(BEAT_SENTINEL);
                state.push(*subdivision as i32);
            }
            StateToken::Unit(activation) => state.push(activation.value()),
        }
    }
    state
}
