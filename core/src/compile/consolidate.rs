// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Merges several voices onto one shared timeline without losing track of
//! which event belongs to which voice.

use super::derive::{MessageKind, StateAttributes};
use crate::{
    error::{CompileError, Result},
    time::{deltas_from_timestamps, Tick, TicksPerBeat},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The integer stand-in for "no event here" when adjusted timestamps are
/// exported as plain integers.
pub const ABSENT_SENTINEL: i64 = -4;

/// The shared timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsolidatedAttributes {
    /// Sorted union of every voice's event ticks, always starting at 0.
    pub timestamps: Vec<Tick>,
    /// Successive differences of `timestamps`.
    pub deltas: Vec<Tick>,
    #[allow(missing_docs)]
    pub total_ticks: Tick,
    #[allow(missing_docs)]
    pub ticks_per_beat: TicksPerBeat,
}

/// One voice re-indexed onto the shared timeline. Both vectors are as long as
/// [ConsolidatedAttributes::timestamps]; `None` means the voice has nothing
/// at that instant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdjustedAttributes {
    #[allow(missing_docs)]
    pub timestamps: Vec<Option<Tick>>,
    #[allow(missing_docs)]
    pub message_kinds: Vec<Option<MessageKind>>,
}
impl AdjustedAttributes {
    /// The voice's own events, in order, exactly as they were before
    /// consolidation.
    pub fn events(&self) -> impl Iterator<Item = (Tick, MessageKind)> + '_ {
        self.timestamps
            .iter()
            .zip(self.message_kinds.iter())
            .filter_map(|(t, k)| Some(((*t)?, (*k)?)))
    }

    /// The voice's original compressed timestamps.
    pub fn present_timestamps(&self) -> Vec<Tick> {
        self.timestamps.iter().filter_map(|t| *t).collect()
    }

    /// The voice's original deltas, rebuilt from its present timestamps.
    pub fn original_deltas(&self) -> Vec<Tick> {
        deltas_from_timestamps(&self.present_timestamps())
    }

    /// Timestamps with [ABSENT_SENTINEL] in place of `None`.
    pub fn sentinel_timestamps(&self) -> Vec<i64> {
        self.timestamps
            .iter()
            .map(|t| t.map_or(ABSENT_SENTINEL, i64::from))
            .collect()
    }
}

/// Everything the multi-voice emitter needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParallelAttributes {
    #[allow(missing_docs)]
    pub consolidated: ConsolidatedAttributes,
    /// One entry per input voice, in input order.
    pub adjusted: Vec<AdjustedAttributes>,
}

/// Builds the shared timeline for `voices`, which must all agree on
/// ticks-per-beat and total length. Both are checked before any merging.
pub fn consolidate(voices: &[StateAttributes]) -> Result<ParallelAttributes> {
    let (ticks_per_beat, total_ticks) = check_uniform(voices)?;

    let timeline: BTreeSet<Tick> = std::iter::once(0)
        .chain(
            voices
                .iter()
                .flat_map(|v| v.compressed_timestamps.iter().copied()),
        )
        .collect();
    let timestamps: Vec<Tick> = timeline.into_iter().collect();
    let deltas = deltas_from_timestamps(&timestamps);

    let adjusted = voices
        .iter()
        .enumerate()
        .map(|(i, v)| adjust(i, v, &timestamps))
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "consolidated {} voices onto {} instants over {total_ticks} ticks",
        voices.len(),
        timestamps.len()
    );

    Ok(ParallelAttributes {
        consolidated: ConsolidatedAttributes {
            timestamps,
            deltas,
            total_ticks,
            ticks_per_beat,
        },
        adjusted,
    })
}

fn check_uniform(voices: &[StateAttributes]) -> Result<(TicksPerBeat, Tick)> {
    let first = voices.first().ok_or(CompileError::NoVoices)?;
    for (voice, v) in voices.iter().enumerate().skip(1) {
        if v.ticks_per_beat != first.ticks_per_beat {
            return Err(CompileError::TicksPerBeatMismatch {
                voice,
                expected: first.ticks_per_beat.value(),
                found: v.ticks_per_beat.value(),
            });
        }
        if v.total_ticks != first.total_ticks {
            return Err(CompileError::TotalTicksMismatch {
                voice,
                expected: first.total_ticks,
                found: v.total_ticks,
            });
        }
    }
    Ok((first.ticks_per_beat, first.total_ticks))
}

// Both `timeline` and the voice's timestamps are sorted, so one forward walk
// lines them up.
fn adjust(voice: usize, v: &StateAttributes, timeline: &[Tick]) -> Result<AdjustedAttributes> {
    let mut adjusted = AdjustedAttributes {
        timestamps: vec![None; timeline.len()],
        message_kinds: vec![None; timeline.len()],
    };
    let mut slot = 0;
    let mut previous: Option<Tick> = None;
    for (tick, kind) in v.events() {
        if previous == Some(tick) {
            return Err(CompileError::CoincidentEvents { voice, tick });
        }
        previous = Some(tick);
        while timeline[slot] < tick {
            slot += 1;
        }
        adjusted.timestamps[slot] = Some(tick);
        adjusted.message_kinds[slot] = Some(kind);
    }
    log::trace!(
        "voice {voice}: {} of {} instants occupied",
        v.message_kinds.len(),
        timeline.len()
    );
    Ok(adjusted)
}
