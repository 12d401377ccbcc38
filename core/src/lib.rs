// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Core of the tactus rhythm compiler: turns nested beat/measure/part rhythm
//! trees into delta-timed MIDI note messages.

/// Compiles state arrays into note messages.
pub mod compile;
/// Pitches, melodies, and whole-track compilation.
pub mod composition;
/// The crate's error type.
pub mod error;
/// MIDI types, wire messages, and Standard MIDI File output.
pub mod midi;
/// Rhythm trees and their flat state-array encoding.
pub mod rhythm;
/// Provides a random-number generator for rhythm generation and testing.
pub mod rng;
/// Serializable compile configuration.
pub mod settings;
/// Ticks and the ticks-per-beat resolution.
pub mod time;

pub use error::{CompileError, Result};

/// Recommended imports for easy onboarding.
pub mod prelude {
    pub use super::compile::prelude::*;
    pub use super::composition::prelude::*;
    pub use super::error::{CompileError, Result};
    pub use super::midi::prelude::*;
    pub use super::rhythm::prelude::*;
    pub use super::rng::Rng;
    pub use super::settings::CompileSettings;
    pub use super::time::{Tick, TicksPerBeat};
}
