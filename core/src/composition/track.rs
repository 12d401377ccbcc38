// Copyright (c) 2024 Mike Tsao. All rights reserved.

use super::melody::{MelodySource, VoiceAssignment};
use crate::{
    compile::{consolidate, emit_parallel, emit_single, StateAttributes},
    error::{CompileError, Result},
    midi::{render_smf, MidiChannel, WireMessage},
    rhythm::{flatten_to_state, Part, RhythmTree},
    settings::CompileSettings,
};
use derive_builder::Builder;
use std::io::Write;

impl TrackCompilerBuilder {
    /// Builds the [TrackCompiler], checking that every voice's melody fits
    /// its rhythm.
    pub fn build(&self) -> anyhow::Result<TrackCompiler> {
        let mut c = self.build_from_builder()?;
        c.voices = c.resolve_voices()?;
        Ok(c)
    }
}

/// Pairs rhythms with melodies and compiles them into note messages.
///
/// With one [Part], every melody becomes a voice that plays that Part's
/// rhythm, so several melodies make a chord. With several Parts, there must
/// be one melody per Part.
///
/// Unless channels are given, voice `i` plays on the default channel plus
/// `i`. A bare pitch is repeated once for every attack of its Part.
#[derive(Clone, Debug, Builder)]
#[builder(build_fn(private, name = "build_from_builder"))]
pub struct TrackCompiler {
    #[builder(default, setter(each(name = "part", into)))]
    parts: Vec<Part>,

    #[builder(default, setter(each(name = "melody", into)))]
    melodies: Vec<MelodySource>,

    #[builder(default, setter(each(name = "channel")))]
    channels: Vec<MidiChannel>,

    #[builder(default)]
    settings: CompileSettings,

    // (index into `parts`, assignment) for each voice, in voice order.
    #[builder(setter(skip))]
    voices: Vec<(usize, VoiceAssignment)>,
}
impl TrackCompiler {
    fn resolve_voices(&self) -> Result<Vec<(usize, VoiceAssignment)>> {
        self.settings.validate()?;
        if self.parts.is_empty() || self.melodies.is_empty() {
            return Err(CompileError::NoVoices);
        }
        if self.parts.len() > 1 && self.parts.len() != self.melodies.len() {
            return Err(CompileError::VoiceCountMismatch {
                expected: self.parts.len(),
                found: self.melodies.len(),
            });
        }
        if !self.channels.is_empty() && self.channels.len() != self.melodies.len() {
            return Err(CompileError::VoiceCountMismatch {
                expected: self.melodies.len(),
                found: self.channels.len(),
            });
        }

        self.melodies
            .iter()
            .enumerate()
            .map(|(voice, source)| {
                let part_index = if self.parts.len() == 1 { 0 } else { voice };
                let note_count = self.parts[part_index].n_note_on();
                let melody = source.clone().into_melody(
                    note_count,
                    self.settings.default_velocity(),
                    voice,
                )?;
                let channel = match self.channels.get(voice) {
                    Some(channel) => MidiChannel::try_new(channel.0 as u32)?,
                    None => MidiChannel::try_new(
                        self.settings.default_channel().0 as u32 + voice as u32,
                    )?,
                };
                Ok((part_index, VoiceAssignment::new_with(melody, channel)))
            })
            .collect()
    }

    #[allow(missing_docs)]
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    fn derive_voices(&self) -> Result<Vec<StateAttributes>> {
        let ticks_per_beat = self.settings.ticks_per_beat();
        self.voices
            .iter()
            .map(|(part_index, _)| {
                let tree = RhythmTree::from(&self.parts[*part_index]);
                StateAttributes::derive(&flatten_to_state(&tree)?, ticks_per_beat)
            })
            .collect()
    }

    fn assignments(&self) -> Vec<VoiceAssignment> {
        self.voices.iter().map(|(_, a)| a.clone()).collect()
    }

    /// All voices merged into one delta-timed stream.
    pub fn compile(&self) -> Result<Vec<WireMessage>> {
        let attributes = self.derive_voices()?;
        if let ([single], [(_, assignment)]) = (attributes.as_slice(), self.voices.as_slice()) {
            return emit_single(single, assignment);
        }
        emit_parallel(&consolidate(&attributes)?, &self.assignments())
    }

    /// One independent stream per voice, each timed from zero.
    pub fn compile_per_voice(&self) -> Result<Vec<Vec<WireMessage>>> {
        self.derive_voices()?
            .iter()
            .zip(self.voices.iter())
            .map(|(attributes, (_, assignment))| emit_single(attributes, assignment))
            .collect()
    }

    /// Writes the merged stream as a single-track Standard MIDI File.
    pub fn write_smf<W: Write>(&self, writer: W) -> anyhow::Result<()> {
        render_smf(&[self.compile()?], self.settings.ticks_per_beat(), writer)
    }

    /// Writes one track per voice.
    pub fn write_multitrack_smf<W: Write>(&self, writer: W) -> anyhow::Result<()> {
        render_smf(
            &self.compile_per_voice()?,
            self.settings.ticks_per_beat(),
            writer,
        )
    }
}
