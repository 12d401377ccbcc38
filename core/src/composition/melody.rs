// Copyright (c) 2024 Mike Tsao. All rights reserved.

use super::pitch::Pitch;
use crate::{
    error::{CompileError, Result},
    midi::{u7, MidiChannel},
};

/// An ordered list of pitches, consumed one per note-on, with either one
/// velocity for everything or one velocity per pitch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Melody {
    pitches: Vec<Pitch>,
    velocities: Velocities,
}
#[derive(Clone, Debug, PartialEq, Eq)]
enum Velocities {
    Uniform(u7),
    PerNote(Vec<u7>),
}
impl Default for Melody {
    fn default() -> Self {
        Self {
            pitches: Vec::default(),
            velocities: Velocities::Uniform(u7::new(Self::DEFAULT_VELOCITY)),
        }
    }
}
impl Melody {
    /// Used when nobody specifies a velocity.
    pub const DEFAULT_VELOCITY: u8 = 64;

    /// Every note shares `velocity`.
    pub fn new_with(pitches: Vec<Pitch>, velocity: u8) -> Result<Self> {
        Ok(Self {
            pitches,
            velocities: Velocities::Uniform(checked_velocity(velocity as u32)?),
        })
    }

    /// One velocity per pitch.
    pub fn new_with_velocities(pitches: Vec<Pitch>, velocities: &[u8]) -> Result<Self> {
        if pitches.len() != velocities.len() {
            return Err(CompileError::VelocityLengthMismatch {
                pitches: pitches.len(),
                velocities: velocities.len(),
            });
        }
        Ok(Self {
            pitches,
            velocities: Velocities::PerNote(
                velocities
                    .iter()
                    .map(|&v| checked_velocity(v as u32))
                    .collect::<Result<Vec<_>>>()?,
            ),
        })
    }

    /// The same pitch `count` times.
    pub fn new_repeated(pitch: Pitch, count: usize, velocity: u8) -> Result<Self> {
        Self::new_with(vec![pitch; count], velocity)
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    #[allow(missing_docs)]
    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    /// The key and velocity of the `index`th note.
    pub fn note(&self, index: usize) -> Option<(u7, u7)> {
        let pitch = self.pitches.get(index)?;
        let velocity = match &self.velocities {
            Velocities::Uniform(v) => *v,
            Velocities::PerNote(v) => *v.get(index)?,
        };
        Some((pitch.key(), velocity))
    }

    /// The velocity used for a note-off when nothing has sounded yet.
    pub fn fallback_velocity(&self) -> u7 {
        match &self.velocities {
            Velocities::Uniform(v) => *v,
            Velocities::PerNote(v) => v
                .first()
                .copied()
                .unwrap_or(u7::new(Self::DEFAULT_VELOCITY)),
        }
    }
}

fn checked_velocity(value: u32) -> Result<u7> {
    if value > 127 {
        Err(CompileError::InvalidVelocity(value))
    } else {
        Ok(u7::new(value as u8))
    }
}

/// What an external melody source hands over for one voice: either a whole
/// melody, or a single pitch to repeat for every attack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MelodySource {
    #[allow(missing_docs)]
    Pitch(Pitch),
    #[allow(missing_docs)]
    Melody(Melody),
}
impl From<Pitch> for MelodySource {
    fn from(value: Pitch) -> Self {
        Self::Pitch(value)
    }
}
impl From<Melody> for MelodySource {
    fn from(value: Melody) -> Self {
        Self::Melody(value)
    }
}
impl MelodySource {
    /// Resolves to a melody with exactly `note_count` pitches, repeating a
    /// bare pitch as needed. `voice` is only used for error reporting.
    pub fn into_melody(self, note_count: usize, velocity: u8, voice: usize) -> Result<Melody> {
        match self {
            MelodySource::Pitch(pitch) => Melody::new_repeated(pitch, note_count, velocity),
            MelodySource::Melody(melody) if melody.len() == note_count => Ok(melody),
            MelodySource::Melody(melody) => Err(CompileError::MelodyLengthMismatch {
                voice,
                expected: note_count,
                found: melody.len(),
            }),
        }
    }
}

/// Everything the emitter needs to turn one voice's events into messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoiceAssignment {
    #[allow(missing_docs)]
    pub melody: Melody,
    #[allow(missing_docs)]
    pub channel: MidiChannel,
}
impl VoiceAssignment {
    #[allow(missing_docs)]
    pub fn new_with(melody: Melody, channel: MidiChannel) -> Self {
        Self { melody, channel }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitches(keys: &[u8]) -> Vec<Pitch> {
        keys.iter().map(|&k| Pitch::try_from(k).unwrap()).collect()
    }

    #[test]
    fn uniform_and_per_note_velocities() {
        let m = Melody::new_with(pitches(&[60, 62]), 90).unwrap();
        assert_eq!(m.note(1), Some((u7::new(62), u7::new(90))));
        assert_eq!(m.note(2), None);

        let m = Melody::new_with_velocities(pitches(&[60, 62]), &[10, 20]).unwrap();
        assert_eq!(m.note(0), Some((u7::new(60), u7::new(10))));
        assert_eq!(m.note(1), Some((u7::new(62), u7::new(20))));
        assert_eq!(m.fallback_velocity(), u7::new(10));
    }

    #[test]
    fn velocities_are_validated() {
        assert_eq!(
            Melody::new_with(pitches(&[60]), 128),
            Err(CompileError::InvalidVelocity(128))
        );
        assert_eq!(
            Melody::new_with_velocities(pitches(&[60, 61]), &[1]),
            Err(CompileError::VelocityLengthMismatch {
                pitches: 2,
                velocities: 1
            })
        );
    }

    #[test]
    fn sources_resolve_to_sized_melodies() {
        let source = MelodySource::from(Pitch::try_from(64u8).unwrap());
        let melody = source.into_melody(3, 80, 0).unwrap();
        assert_eq!(melody.len(), 3);
        assert!(melody.pitches().iter().all(|p| p.key().as_int() == 64));

        let source = MelodySource::from(Melody::new_with(pitches(&[1, 2]), 64).unwrap());
        assert_eq!(
            source.into_melody(3, 64, 4),
            Err(CompileError::MelodyLengthMismatch {
                voice: 4,
                expected: 3,
                found: 2
            })
        );
    }
}
