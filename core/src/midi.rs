// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! The MIDI end of the pipeline: channel numbers, the note messages that the
//! emitter produces, and Standard MIDI File rendering.

use crate::{
    error::{CompileError, Result},
    time::{Tick, TicksPerBeat},
};
use derive_more::Display as DeriveDisplay;
use midly::{Format, Header, MetaMessage, Smf, Timing, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::io::Write;
use strum_macros::Display;

pub use midly::{
    num::{u15, u28, u4, u7},
    MidiMessage,
};

/// Recommended imports for easy onboarding.
pub mod prelude {
    pub use super::{
        new_note_off, new_note_on, render_smf, u4, u7, MidiChannel, MidiMessage, WireKind,
        WireMessage,
    };
}

/// Newtype for MIDI channel.
#[derive(
    Clone, Copy, Debug, Default, DeriveDisplay, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub struct MidiChannel(pub u8);
#[allow(missing_docs)]
impl MidiChannel {
    pub const MIN_VALUE: u8 = 0;
    pub const MAX_VALUE: u8 = 15; // inclusive

    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Like [MidiChannel::new], but refuses anything past channel 15.
    pub fn try_new(value: u32) -> Result<Self> {
        if value > Self::MAX_VALUE as u32 {
            Err(CompileError::InvalidChannel(value))
        } else {
            Ok(Self(value as u8))
        }
    }

    /// The wire form. Out-of-range channels wrap into 0..=15, so the emitter
    /// refuses them before they get here.
    pub fn as_u4(&self) -> u4 {
        u4::new(self.0 & 0x0f)
    }
}
impl From<u4> for MidiChannel {
    fn from(value: u4) -> Self {
        Self(value.as_int())
    }
}
impl From<MidiChannel> for u8 {
    fn from(value: MidiChannel) -> Self {
        value.0
    }
}

/// Convenience function to make a note-on [MidiMessage].
pub fn new_note_on(key: u7, vel: u7) -> MidiMessage {
    MidiMessage::NoteOn { key, vel }
}

/// Convenience function to make a note-off [MidiMessage].
pub fn new_note_off(key: u7, vel: u7) -> MidiMessage {
    MidiMessage::NoteOff { key, vel }
}

/// The two message types that reach the wire. [crate::compile::MessageKind]'s
/// `Ofn` is always split into one of each before this point.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WireKind {
    #[allow(missing_docs)]
    NoteOn,
    #[allow(missing_docs)]
    NoteOff,
}

/// One delta-timed note message, ready to be written to a track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WireMessage {
    #[allow(missing_docs)]
    pub kind: WireKind,
    /// Ticks since the previous message in the same stream.
    pub delta: Tick,
    #[allow(missing_docs)]
    pub key: u7,
    #[allow(missing_docs)]
    pub velocity: u7,
    #[allow(missing_docs)]
    pub channel: MidiChannel,
}
impl WireMessage {
    /// The largest delta a variable-length quantity can carry.
    pub const MAX_DELTA: Tick = 0x0fff_ffff;

    #[allow(missing_docs)]
    pub fn note_on(delta: Tick, key: u7, velocity: u7, channel: MidiChannel) -> Self {
        Self {
            kind: WireKind::NoteOn,
            delta,
            key,
            velocity,
            channel,
        }
    }

    #[allow(missing_docs)]
    pub fn note_off(delta: Tick, key: u7, velocity: u7, channel: MidiChannel) -> Self {
        Self {
            kind: WireKind::NoteOff,
            delta,
            key,
            velocity,
            channel,
        }
    }

    #[allow(missing_docs)]
    pub fn message(&self) -> MidiMessage {
        match self.kind {
            WireKind::NoteOn => new_note_on(self.key, self.velocity),
            WireKind::NoteOff => new_note_off(self.key, self.velocity),
        }
    }

    /// Converts to a midly track event, failing if the delta doesn't fit.
    pub fn to_track_event(&self) -> Result<TrackEvent<'static>> {
        if self.delta > Self::MAX_DELTA {
            return Err(CompileError::TickOverflow(self.delta));
        }
        Ok(TrackEvent {
            delta: u28::new(self.delta),
            kind: TrackEventKind::Midi {
                channel: self.channel.as_u4(),
                message: self.message(),
            },
        })
    }
}

/// A complete track: every message in order, then end-of-track.
pub fn to_track(messages: &[WireMessage]) -> Result<Vec<TrackEvent<'static>>> {
    let mut track = messages
        .iter()
        .map(|m| m.to_track_event())
        .collect::<Result<Vec<_>>>()?;
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    Ok(track)
}

/// Writes a Standard MIDI File with one track per entry in `tracks`. A
/// single track produces a format-0 file, several produce format 1.
pub fn render_smf<W: Write>(
    tracks: &[Vec<WireMessage>],
    ticks_per_beat: TicksPerBeat,
    writer: W,
) -> anyhow::Result<()> {
    if ticks_per_beat.value() > TicksPerBeat::MAX_SMF_VALUE {
        return Err(CompileError::InvalidTicksPerBeat(ticks_per_beat.value()).into());
    }
    let format = if tracks.len() == 1 {
        Format::SingleTrack
    } else {
        Format::Parallel
    };
    let mut smf = Smf::new(Header::new(
        format,
        Timing::Metrical(u15::new(ticks_per_beat.value() as u16)),
    ));
    for messages in tracks {
        smf.tracks.push(to_track(messages)?);
    }
    smf.write_std(writer)?;
    log::info!(
        "wrote {} track(s) of {} message(s) at {ticks_per_beat}",
        tracks.len(),
        tracks.iter().map(Vec::len).sum::<usize>()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_are_range_checked() {
        assert_eq!(MidiChannel::try_new(15).unwrap(), MidiChannel(15));
        assert_eq!(
            MidiChannel::try_new(16),
            Err(CompileError::InvalidChannel(16))
        );
        assert_eq!(MidiChannel::new(9).as_u4(), u4::new(9));
        assert_eq!(MidiChannel::from(u4::new(3)).to_string(), "3");
    }

    #[test]
    fn wire_messages_become_track_events() {
        let m = WireMessage::note_on(240, u7::new(60), u7::new(100), MidiChannel(2));
        let event = m.to_track_event().unwrap();
        assert_eq!(event.delta.as_int(), 240);
        assert_eq!(
            event.kind,
            TrackEventKind::Midi {
                channel: u4::new(2),
                message: new_note_on(u7::new(60), u7::new(100)),
            }
        );

        let m = WireMessage::note_off(
            WireMessage::MAX_DELTA + 1,
            u7::new(60),
            u7::new(0),
            MidiChannel(0),
        );
        assert_eq!(
            m.to_track_event(),
            Err(CompileError::TickOverflow(WireMessage::MAX_DELTA + 1))
        );
    }

    #[test]
    fn rendered_file_parses_back() {
        let channel = MidiChannel::default();
        let messages = vec![
            WireMessage::note_on(0, u7::new(60), u7::new(64), channel),
            WireMessage::note_off(480, u7::new(60), u7::new(64), channel),
        ];
        let mut bytes = Vec::new();
        render_smf(&[messages], TicksPerBeat::default(), &mut bytes).unwrap();

        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, Format::SingleTrack);
        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(480)));
        assert_eq!(smf.tracks.len(), 1);
        assert_eq!(smf.tracks[0].len(), 3, "two notes plus end-of-track");
        assert_eq!(smf.tracks[0][1].delta.as_int(), 480);
    }

    #[test]
    fn oversized_resolution_is_refused() {
        let tpb = TicksPerBeat::new(TicksPerBeat::MAX_SMF_VALUE + 1).unwrap();
        assert!(render_smf(&[vec![]], tpb, Vec::new()).is_err());
    }
}
