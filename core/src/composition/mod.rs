// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! The musical content that rides on a rhythm: pitches, melodies, and the
//! track compiler that pairs them with [Parts](crate::rhythm::Part).

pub mod melody;
pub mod pitch;
pub mod track;

pub use melody::{Melody, MelodySource, VoiceAssignment};
pub use pitch::{NoteName, Pitch};
pub use track::{TrackCompiler, TrackCompilerBuilder};

pub mod prelude {
    pub use super::{
        Melody, MelodySource, NoteName, Pitch, TrackCompiler, TrackCompilerBuilder,
        VoiceAssignment,
    };
}
