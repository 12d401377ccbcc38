// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Everything that can go wrong during a single compile call.

use thiserror::Error;

/// Shorthand for results produced by this crate.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Failures are always local to one flatten/derive/consolidate/emit call. The
/// computation is pure, so retrying with the same input never helps.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A negative value that isn't one of the known structural markers.
    #[error("unexpected sentinel {value} at index {index}")]
    UnexpectedSentinel { index: usize, value: i32 },

    /// A beat header was the last element of the state array.
    #[error("beat header at index {index} has no subdivision count")]
    MissingSubdivision { index: usize },

    /// A beat header was followed by a count that can't be a subdivision.
    #[error("beat header at index {index} has invalid subdivision {value}")]
    InvalidSubdivision { index: usize, value: i32 },

    /// A beat promised more time units than the array holds before the next
    /// marker or the end of input.
    #[error("beat at index {index} expects {expected} time units but found {found}")]
    TruncatedBeat {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// A time-unit value appeared where no beat header claims it.
    #[error("time unit at index {index} does not belong to any beat")]
    UnitOutsideBeat { index: usize },

    /// A time-unit value outside {0, 1, 2}.
    #[error("invalid activation value {value} at index {index}")]
    InvalidActivation { index: usize, value: i32 },

    /// The number of active units doesn't equal the total of the subdivision
    /// flags.
    #[error("state has {active} active units but its subdivisions total {expected}")]
    UnitCountMismatch { active: usize, expected: usize },

    /// A rhythm-tree node was attached somewhere the hierarchy doesn't allow.
    #[error("malformed nesting: {child} node #{child_id} cannot live under {parent}")]
    MalformedNesting {
        child: &'static str,
        child_id: usize,
        parent: &'static str,
    },

    /// A node id that the tree never handed out.
    #[error("unknown rhythm-tree node #{0}")]
    UnknownNode(usize),

    /// Ticks-per-beat must be positive (and fit the output format).
    #[error("invalid ticks-per-beat {0}")]
    InvalidTicksPerBeat(u32),

    /// Consolidation needs at least one voice.
    #[error("no voices to consolidate")]
    NoVoices,

    /// Voices disagree about the ticks-per-beat resolution.
    #[error("all voices must share ticks-per-beat (voice 0 has {expected}, voice {voice} has {found})")]
    TicksPerBeatMismatch {
        voice: usize,
        expected: u32,
        found: u32,
    },

    /// Voices of different length cannot share one timeline.
    #[error("all voices must share total ticks (voice 0 has {expected}, voice {voice} has {found})")]
    TotalTicksMismatch {
        voice: usize,
        expected: u32,
        found: u32,
    },

    /// One voice has two events at the same tick (a beat subdivided finer
    /// than ticks-per-beat), so it can't be placed on a shared timeline.
    #[error("voice {voice} has more than one event at tick {tick}")]
    CoincidentEvents { voice: usize, tick: u32 },

    /// A melody has the wrong number of pitches for the rhythm it's paired
    /// with.
    #[error("voice {voice} needs {expected} pitches but its melody has {found}")]
    MelodyLengthMismatch {
        voice: usize,
        expected: usize,
        found: usize,
    },

    /// Per-note velocities don't line up with the melody's pitches.
    #[error("melody has {pitches} pitches but {velocities} velocities")]
    VelocityLengthMismatch { pitches: usize, velocities: usize },

    /// The number of voice assignments doesn't match the number of voices.
    #[error("expected {expected} voice assignments but got {found}")]
    VoiceCountMismatch { expected: usize, found: usize },

    /// A raw pitch outside 0..=127.
    #[error("pitch {0} is outside 0..=127")]
    InvalidPitch(u32),

    /// A velocity outside 0..=127.
    #[error("velocity {0} is outside 0..=127")]
    InvalidVelocity(u32),

    /// A channel outside 0..=15.
    #[error("channel {0} is outside 0..=15")]
    InvalidChannel(u32),

    /// A named pitch that doesn't parse, or falls outside C-2..=G8.
    #[error("invalid note name {0:?}")]
    InvalidNoteName(String),

    /// A timeline that runs past the [u32] tick range, or a delta too large
    /// for the 28-bit MIDI variable-length quantity.
    #[error("tick overflow at {0}")]
    TickOverflow(u32),
}
