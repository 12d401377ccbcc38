// Copyright (c) 2024 Mike Tsao. All rights reserved.

use crate::error::{CompileError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An absolute or relative position on a compiled timeline, measured in MIDI
/// ticks.
pub type Tick = u32;

/// The fixed resolution that converts beats into ticks. Every voice in one
/// compile shares the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TicksPerBeat(Tick);
impl Default for TicksPerBeat {
    fn default() -> Self {
        Self(Self::DEFAULT_VALUE)
    }
}
impl fmt::Display for TicksPerBeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{} TPB", self.0))
    }
}
impl TryFrom<u32> for TicksPerBeat {
    type Error = CompileError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}
impl From<TicksPerBeat> for u32 {
    fn from(value: TicksPerBeat) -> Self {
        value.0
    }
}
impl TicksPerBeat {
    /// The resolution used when nobody asks for anything else.
    pub const DEFAULT_VALUE: Tick = 480;

    /// The largest resolution a Standard MIDI File header can express.
    pub const MAX_SMF_VALUE: Tick = 0x7fff;

    /// Zero ticks per beat would collapse every beat onto one instant.
    pub fn new(value: Tick) -> Result<Self> {
        if value == 0 {
            Err(CompileError::InvalidTicksPerBeat(value))
        } else {
            Ok(Self(value))
        }
    }

    #[allow(missing_docs)]
    pub const fn value(&self) -> Tick {
        self.0
    }

    /// How many ticks each of a beat's `subdivision` time units gets. The
    /// remainder, if any, is dropped. A beat with no units gets nothing.
    pub fn ticks_per_unit(&self, subdivision: usize) -> Tick {
        self.0.checked_div(subdivision as Tick).unwrap_or_default()
    }

    /// Whether `subdivision` splits a beat into whole ticks.
    pub fn divides_evenly(&self, subdivision: usize) -> bool {
        self.0.checked_rem(subdivision as Tick) == Some(0)
    }
}

/// Differences between successive timestamps. The first delta is the offset
/// of the first timestamp from tick zero, so a running sum of the result
/// reproduces the input.
pub fn deltas_from_timestamps(timestamps: &[Tick]) -> Vec<Tick> {
    let mut previous = 0;
    timestamps
        .iter()
        .map(|&t| {
            let delta = t - previous;
            previous = t;
            delta
        })
        .collect()
}

/// The inverse of [deltas_from_timestamps()].
pub fn timestamps_from_deltas(deltas: &[Tick]) -> Vec<Tick> {
    let mut running = 0;
    deltas
        .iter()
        .map(|&d| {
            running += d;
            running
        })
        .collect()
}
