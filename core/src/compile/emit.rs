// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Assigns pitches to classified events and writes them out as delta-timed
//! note messages.

use super::{
    consolidate::ParallelAttributes,
    derive::{MessageKind, StateAttributes},
};
use crate::{
    composition::{Pitch, VoiceAssignment},
    error::{CompileError, Result},
    midi::{u7, MidiChannel, WireMessage},
    time::Tick,
};

/// Walks one voice's melody as its events are emitted.
#[derive(Debug)]
struct VoiceCursor<'a> {
    voice: usize,
    assignment: &'a VoiceAssignment,
    next_note: usize,
    sounding: Option<(u7, u7)>,
}
impl<'a> VoiceCursor<'a> {
    fn new(voice: usize, assignment: &'a VoiceAssignment) -> Self {
        Self {
            voice,
            assignment,
            next_note: 0,
            sounding: None,
        }
    }

    fn emit(&mut self, kind: MessageKind, delta: Tick, messages: &mut Vec<WireMessage>) -> Result<()> {
        match kind {
            MessageKind::NoteOn => messages.push(self.start(delta)?),
            MessageKind::NoteOff => messages.push(self.stop(delta)),
            MessageKind::Ofn => {
                messages.push(self.stop(delta));
                messages.push(self.start(0)?);
            }
        }
        Ok(())
    }

    fn start(&mut self, delta: Tick) -> Result<WireMessage> {
        let melody = &self.assignment.melody;
        let (key, velocity) =
            melody
                .note(self.next_note)
                .ok_or(CompileError::MelodyLengthMismatch {
                    voice: self.voice,
                    expected: self.next_note + 1,
                    found: melody.len(),
                })?;
        self.next_note += 1;
        self.sounding = Some((key, velocity));
        Ok(WireMessage::note_on(
            delta,
            key,
            velocity,
            self.assignment.channel,
        ))
    }

    // Releases whatever sounded last. A release with nothing ever sounded
    // still goes out, addressed to the melody's first pitch.
    fn stop(&self, delta: Tick) -> WireMessage {
        let (key, velocity) = self.sounding.unwrap_or_else(|| {
            let melody = &self.assignment.melody;
            (
                melody
                    .pitches()
                    .first()
                    .map_or_else(|| Pitch::default().key(), Pitch::key),
                melody.fallback_velocity(),
            )
        });
        WireMessage::note_off(delta, key, velocity, self.assignment.channel)
    }
}

fn check_channel(assignment: &VoiceAssignment) -> Result<()> {
    MidiChannel::try_new(assignment.channel.0 as u32).map(|_| ())
}

fn check_melody(voice: usize, expected: usize, assignment: &VoiceAssignment) -> Result<()> {
    check_channel(assignment)?;
    if assignment.melody.len() == expected {
        Ok(())
    } else {
        Err(CompileError::MelodyLengthMismatch {
            voice,
            expected,
            found: assignment.melody.len(),
        })
    }
}

/// Emits one voice. Every note-on and ofn consumes the next pitch of the
/// melody, which must therefore hold exactly [StateAttributes::n_note_on()]
/// pitches, and whose channel must be one of the sixteen MIDI channels. A
/// final note-off closes the voice at `total_ticks`.
pub fn emit_single(
    attributes: &StateAttributes,
    assignment: &VoiceAssignment,
) -> Result<Vec<WireMessage>> {
    check_melody(0, attributes.n_note_on(), assignment)?;

    let mut cursor = VoiceCursor::new(0, assignment);
    let mut messages = Vec::with_capacity(attributes.message_kinds.len() * 2 + 1);
    let mut consumed: Tick = 0;
    for (&delta, &kind) in attributes.deltas.iter().zip(&attributes.message_kinds) {
        cursor.emit(kind, delta, &mut messages)?;
        consumed += delta;
    }
    messages.push(cursor.stop(attributes.total_ticks.saturating_sub(consumed)));

    log::debug!(
        "emitted {} messages for one voice on channel {}",
        messages.len(),
        assignment.channel
    );
    Ok(messages)
}

/// Emits several consolidated voices as one stream. Messages at the same
/// instant are ordered by voice index, and only the first of them carries
/// the elapsed ticks; the rest have a delta of zero. Each voice then gets a
/// closing note-off at `total_ticks`.
pub fn emit_parallel(
    attributes: &ParallelAttributes,
    assignments: &[VoiceAssignment],
) -> Result<Vec<WireMessage>> {
    if assignments.len() != attributes.adjusted.len() {
        return Err(CompileError::VoiceCountMismatch {
            expected: attributes.adjusted.len(),
            found: assignments.len(),
        });
    }
    for (voice, (adjusted, assignment)) in attributes.adjusted.iter().zip(assignments).enumerate()
    {
        let expected = adjusted.events().filter(|(_, k)| k.starts_note()).count();
        check_melody(voice, expected, assignment)?;
    }

    let mut cursors: Vec<VoiceCursor> = assignments
        .iter()
        .enumerate()
        .map(|(voice, a)| VoiceCursor::new(voice, a))
        .collect();
    let mut messages = Vec::default();
    let mut last_emitted: Tick = 0;
    for (step, &now) in attributes.consolidated.timestamps.iter().enumerate() {
        for (adjusted, cursor) in attributes.adjusted.iter().zip(cursors.iter_mut()) {
            if let Some(Some(kind)) = adjusted.message_kinds.get(step) {
                cursor.emit(*kind, now - last_emitted, &mut messages)?;
                last_emitted = now;
            }
        }
    }

    let mut remaining = attributes
        .consolidated
        .total_ticks
        .saturating_sub(last_emitted);
    for cursor in &cursors {
        messages.push(cursor.stop(remaining));
        remaining = 0;
    }

    log::debug!(
        "emitted {} messages for {} voices",
        messages.len(),
        assignments.len()
    );
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compile::consolidate,
        composition::Melody,
        midi::WireKind,
        time::TicksPerBeat,
    };

    fn derive(state: &[i32], tpb: u32) -> StateAttributes {
        StateAttributes::derive(state, TicksPerBeat::new(tpb).unwrap()).unwrap()
    }

    fn voice(keys: &[u8], channel: u8) -> VoiceAssignment {
        let pitches = keys.iter().map(|&k| Pitch::try_from(k).unwrap()).collect();
        VoiceAssignment::new_with(
            Melody::new_with(pitches, 100).unwrap(),
            MidiChannel::new(channel),
        )
    }

    fn summarize(messages: &[WireMessage]) -> Vec<(WireKind, Tick, u8, u8)> {
        messages
            .iter()
            .map(|m| (m.kind, m.delta, m.key.as_int(), m.channel.0))
            .collect()
    }

    #[test]
    fn retrigger_splits_into_off_then_on() {
        let sa = derive(&[-3, 3, 1, 1, 0], 6);
        let messages = emit_single(&sa, &voice(&[60, 62], 0)).unwrap();
        assert_eq!(
            summarize(&messages),
            vec![
                (WireKind::NoteOn, 0, 60, 0),
                (WireKind::NoteOff, 2, 60, 0),
                (WireKind::NoteOn, 0, 62, 0),
                (WireKind::NoteOff, 2, 62, 0),
                (WireKind::NoteOff, 2, 62, 0),
            ]
        );
        let total: Tick = messages.iter().map(|m| m.delta).sum();
        assert_eq!(total, sa.total_ticks, "deltas should add up to the length");
    }

    #[test]
    fn trailing_sustain_is_closed() {
        let sa = derive(&[-3, 2, 1, 0, -3, 2, 1, 2, -3, 1, 2], 4);
        let messages = emit_single(&sa, &voice(&[60, 64], 3)).unwrap();
        assert_eq!(
            summarize(&messages),
            vec![
                (WireKind::NoteOn, 0, 60, 3),
                (WireKind::NoteOff, 2, 60, 3),
                (WireKind::NoteOn, 2, 64, 3),
                (WireKind::NoteOff, 8, 64, 3),
            ]
        );
        assert_eq!(messages[0].velocity, u7::new(100));
    }

    #[test]
    fn release_before_any_attack_uses_first_pitch() {
        let sa = derive(&[-3, 2, 0, 1], 4);
        let messages = emit_single(&sa, &voice(&[70], 0)).unwrap();
        assert_eq!(
            summarize(&messages),
            vec![
                (WireKind::NoteOff, 0, 70, 0),
                (WireKind::NoteOn, 2, 70, 0),
                (WireKind::NoteOff, 2, 70, 0),
            ]
        );
    }

    #[test]
    fn melody_must_cover_every_attack() {
        let sa = derive(&[-3, 3, 1, 1, 0], 6);
        assert_eq!(
            emit_single(&sa, &voice(&[60], 0)),
            Err(CompileError::MelodyLengthMismatch {
                voice: 0,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn simultaneous_events_share_one_carrier() {
        let v1 = derive(&[-3, 2, 1, 2, -3, 2, 0, 2], 4);
        let v2 = derive(&[-3, 2, 1, 0, -3, 2, 1, 2], 4);
        let p = consolidate(&[v1, v2]).unwrap();
        let messages = emit_parallel(&p, &[voice(&[60], 0), voice(&[48, 50], 1)]).unwrap();
        assert_eq!(
            summarize(&messages),
            vec![
                (WireKind::NoteOn, 0, 60, 0),
                (WireKind::NoteOn, 0, 48, 1),
                (WireKind::NoteOff, 2, 48, 1),
                (WireKind::NoteOff, 2, 60, 0),
                (WireKind::NoteOn, 0, 50, 1),
                (WireKind::NoteOff, 4, 60, 0),
                (WireKind::NoteOff, 0, 50, 1),
            ]
        );

        // Rebuilding absolute time per voice gives back each voice's own
        // events.
        let mut now = 0;
        let mut voice0 = Vec::default();
        for m in &messages {
            now += m.delta;
            if m.channel.0 == 0 {
                voice0.push(now);
            }
        }
        assert_eq!(voice0, vec![0, 4, 8]);
        assert_eq!(now, 8);
    }

    #[test]
    fn channels_past_fifteen_are_refused() {
        let sa = derive(&[-3, 2, 1, 0], 4);
        assert_eq!(
            emit_single(&sa, &voice(&[60], 20)),
            Err(CompileError::InvalidChannel(20))
        );

        let p = consolidate(&[sa.clone(), sa]).unwrap();
        assert_eq!(
            emit_parallel(&p, &[voice(&[60], 15), voice(&[62], 16)]),
            Err(CompileError::InvalidChannel(16))
        );
        assert!(emit_parallel(&p, &[voice(&[60], 15), voice(&[62], 0)]).is_ok());
    }

    #[test]
    fn voice_count_must_match() {
        let v = derive(&[-3, 1, 1], 4);
        let p = consolidate(&[v.clone(), v]).unwrap();
        assert_eq!(
            emit_parallel(&p, &[voice(&[60], 0)]),
            Err(CompileError::VoiceCountMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            emit_parallel(&p, &[voice(&[60], 0), voice(&[], 1)]),
            Err(CompileError::MelodyLengthMismatch {
                voice: 1,
                expected: 1,
                found: 0
            })
        );
    }
}
