// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Turns one voice's state array into absolute timestamps, tick deltas, and
//! classified message kinds.

use crate::{
    error::{CompileError, Result},
    rhythm::{decode, Activation, StateToken},
    time::{deltas_from_timestamps, Tick, TicksPerBeat},
};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How a compressed event reaches the wire.
#[derive(
    Clone, Copy, Debug, Display, EnumString, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[allow(missing_docs)]
    NoteOn,
    #[allow(missing_docs)]
    NoteOff,
    /// An attack right after another attack. On the wire this is a note-off
    /// immediately followed (zero delta) by a note-on.
    Ofn,
}
impl MessageKind {
    /// True if this event starts a note, and so consumes a pitch.
    pub fn starts_note(&self) -> bool {
        matches!(self, MessageKind::NoteOn | MessageKind::Ofn)
    }
}

/// Everything derived from one state array. Recomputed on every call and
/// never cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StateAttributes {
    /// Time units in order, with all structure stripped.
    pub active_state: Vec<Activation>,
    /// One subdivision count per beat.
    pub subdivision_flags: Vec<usize>,
    /// Ticks allotted to each active unit.
    pub unit_ticks: Vec<Tick>,
    #[allow(missing_docs)]
    pub total_ticks: Tick,
    #[allow(missing_docs)]
    pub ticks_per_beat: TicksPerBeat,
    /// Tick boundaries before and after every unit, so one longer than
    /// `active_state`.
    pub timestamps: Vec<Tick>,
    /// `active_state` without sustains.
    pub compressed_state: Vec<Activation>,
    /// The start tick of each compressed unit.
    pub compressed_timestamps: Vec<Tick>,
    /// Ticks since the previous compressed event.
    pub deltas: Vec<Tick>,
    /// One classification per compressed event.
    pub message_kinds: Vec<MessageKind>,
}
impl StateAttributes {
    /// Parses and derives in one step.
    pub fn derive(state: &[i32], ticks_per_beat: TicksPerBeat) -> Result<Self> {
        Self::derive_from_tokens(&decode(state)?, ticks_per_beat)
    }

    /// Derives from already-decoded tokens. Errors report token positions
    /// where [StateAttributes::derive] would report array indexes.
    pub fn derive_from_tokens(tokens: &[StateToken], ticks_per_beat: TicksPerBeat) -> Result<Self> {
        let active_state = active_state(tokens);
        let subdivision_flags = subdivision_flags(tokens);
        if let Some(index) = tokens
            .iter()
            .position(|t| matches!(t, StateToken::BeatHeader { subdivision: 0 }))
        {
            return Err(CompileError::InvalidSubdivision { index, value: 0 });
        }

        let expected: usize = subdivision_flags.iter().sum();
        if expected != active_state.len() {
            return Err(CompileError::UnitCountMismatch {
                active: active_state.len(),
                expected,
            });
        }

        let uneven: Vec<usize> = subdivision_flags
            .iter()
            .copied()
            .filter(|&s| !ticks_per_beat.divides_evenly(s))
            .collect();
        if !uneven.is_empty() {
            log::warn!(
                "{ticks_per_beat} does not divide evenly by subdivisions {uneven:?}; remainder ticks dropped"
            );
        }

        let unit_ticks = unit_ticks(&subdivision_flags, ticks_per_beat);
        let timestamps = timestamps(&unit_ticks)?;
        let total_ticks = timestamps.last().copied().unwrap_or_default();
        let compressed_state = compress_state(&active_state);
        let compressed_timestamps = compressed_timestamps(&active_state, &timestamps);
        let deltas = deltas_from_timestamps(&compressed_timestamps);
        let message_kinds = classify(&compressed_state);

        log::debug!(
            "derived {} units in {} beats: {} events over {total_ticks} ticks",
            active_state.len(),
            subdivision_flags.len(),
            message_kinds.len()
        );

        Ok(Self {
            active_state,
            subdivision_flags,
            unit_ticks,
            total_ticks,
            ticks_per_beat,
            timestamps,
            compressed_state,
            compressed_timestamps,
            deltas,
            message_kinds,
        })
    }

    /// Derives each state independently with a shared resolution.
    pub fn derive_many<S: AsRef<[i32]>>(
        states: &[S],
        ticks_per_beat: TicksPerBeat,
    ) -> Result<Vec<Self>> {
        states
            .iter()
            .map(|s| Self::derive(s.as_ref(), ticks_per_beat))
            .collect()
    }

    /// `(absolute tick, kind)` for each emittable event.
    pub fn events(&self) -> impl Iterator<Item = (Tick, MessageKind)> + '_ {
        self.compressed_timestamps
            .iter()
            .copied()
            .zip(self.message_kinds.iter().copied())
    }

    /// How many pitches a melody needs to cover this voice.
    pub fn n_note_on(&self) -> usize {
        self.message_kinds.iter().filter(|k| k.starts_note()).count()
    }
}

/// Every time unit, in order, with markers and subdivision counts removed.
pub fn active_state(tokens: &[StateToken]) -> Vec<Activation> {
    tokens
        .iter()
        .filter_map(|t| match t {
            StateToken::Unit(a) => Some(*a),
            _ => None,
        })
        .collect()
}

/// The subdivision count of each beat, in order.
pub fn subdivision_flags(tokens: &[StateToken]) -> Vec<usize> {
    tokens
        .iter()
        .filter_map(|t| match t {
            StateToken::BeatHeader { subdivision } => Some(*subdivision),
            _ => None,
        })
        .collect()
}

/// Each of a beat's `n` units gets `ticks_per_beat / n` ticks (truncating).
pub fn unit_ticks(subdivision_flags: &[usize], ticks_per_beat: TicksPerBeat) -> Vec<Tick> {
    subdivision_flags
        .iter()
        .flat_map(|&n| std::iter::repeat(ticks_per_beat.ticks_per_unit(n)).take(n))
        .collect()
}

/// Starts at 0 and accumulates every unit's duration, giving one more entry
/// than there are units. Fails if the running total leaves the [Tick] range.
pub fn timestamps(unit_ticks: &[Tick]) -> Result<Vec<Tick>> {
    let mut timestamps = Vec::with_capacity(unit_ticks.len() + 1);
    let mut running: Tick = 0;
    timestamps.push(running);
    for &t in unit_ticks {
        running = running
            .checked_add(t)
            .ok_or(CompileError::TickOverflow(running))?;
        timestamps.push(running);
    }
    Ok(timestamps)
}

/// Drops sustains. They only lengthen the note before them.
pub fn compress_state(active_state: &[Activation]) -> Vec<Activation> {
    active_state
        .iter()
        .copied()
        .filter(|a| a.is_emittable())
        .collect()
}

/// The start boundary of every unit that survives compression.
pub fn compressed_timestamps(active_state: &[Activation], timestamps: &[Tick]) -> Vec<Tick> {
    active_state
        .iter()
        .zip(timestamps)
        .filter(|(a, _)| a.is_emittable())
        .map(|(_, &t)| t)
        .collect()
}

/// Releases become note-offs and attacks note-ons, except that an attack
/// whose predecessor is also an attack becomes [MessageKind::Ofn]. A run of
/// attacks is judged pairwise, so `[1, 1, 1]` is on, ofn, ofn.
pub fn classify(compressed_state: &[Activation]) -> Vec<MessageKind> {
    compressed_state
        .iter()
        .enumerate()
        .map(|(i, a)| match a {
            Activation::Attack if i > 0 && compressed_state[i - 1] == Activation::Attack => {
                MessageKind::Ofn
            }
            Activation::Attack => MessageKind::NoteOn,
            _ => MessageKind::NoteOff,
        })
        .collect()
}
