// Copyright (c) 2024 Mike Tsao. All rights reserved.

#![warn(missing_docs)]

//! The `tactus` crate compiles quantized rhythms into MIDI.
//!
//! A rhythm is a tree of [Parts](rhythm::Part), each holding
//! [Measures](rhythm::Measure) of [Beats](rhythm::Beat). A beat is split into
//! time units, and each unit either attacks a new note, sustains the current
//! one, or releases it. The compiler flattens the tree into a state array,
//! works out when every attack and release happens in MIDI ticks, merges
//! several voices onto one timeline if needed, and finally emits note-on and
//! note-off messages carrying pitches from a [Melody](composition::Melody).
//!
//! ```
//! use tactus::prelude::*;
//!
//! let mut beat = Beat::new_with_subdivision(4).unwrap();
//! beat.set_state(&[1, 2, 1, 0]).unwrap();
//! let part = Part::new_with_measures(vec![Measure::new_with_beats(vec![beat])]);
//!
//! let compiler = TrackCompilerBuilder::default()
//!     .part(part)
//!     .melody("C3".parse::<Pitch>().unwrap())
//!     .build()
//!     .unwrap();
//! let messages = compiler.compile().unwrap();
//! // on, off + on for the retrigger, off, and the closing off
//! assert_eq!(messages.len(), 5);
//! ```

pub mod rhythm {
    //! Rhythm trees and the state arrays they flatten into.
    //!
    //! The state array is the exchange format between the tree and the
    //! compiler. It's a flat list of integers where `-1` marks a Part
    //! boundary, `-2` starts a Measure, and `-3` starts a Beat and is followed
    //! by the beat's subdivision count and then that many time-unit values
    //! (0 release, 1 attack, 2 sustain). A Part encodes as
    //! `[-1, measures..., -1]`, a Measure as `[-2, beats...]`, and a Beat as
    //! `[-3, N, units...]`.
    //!
    //! [RhythmTree] is an arena of nodes with index links, so any subtree can
    //! be flattened on its own with [flatten_node].

    pub use tactus_core::rhythm::{
        decode, encode, flatten, flatten_node, flatten_to_state, Activation, Beat, Measure, Node,
        NodeId, NodeKind, Part, RhythmTree, StateToken,
    };
    pub use tactus_core::rng::Rng;

    /// The most commonly used imports.
    pub mod prelude {
        pub use super::{flatten_to_state, Activation, Beat, Measure, Part, RhythmTree};
    }
}

pub mod compile {
    //! The three compiler stages.
    //!
    //! [StateAttributes::derive] analyzes one voice: how many ticks each unit
    //! lasts, where every attack and release falls, and how each becomes a
    //! [MessageKind]. [consolidate] merges several voices onto the union of
    //! their timelines, marking instants where a voice has nothing to say.
    //! [emit_single] and [emit_parallel] turn the result into
    //! [WireMessages](crate::midi::WireMessage).

    pub use tactus_core::compile::{
        consolidate, emit_parallel, emit_single, AdjustedAttributes, ConsolidatedAttributes,
        MessageKind, ParallelAttributes, StateAttributes, ABSENT_SENTINEL,
    };
    pub use tactus_core::error::{CompileError, Result};

    /// The most commonly used imports.
    pub mod prelude {
        pub use super::{
            consolidate, emit_parallel, emit_single, CompileError, MessageKind, StateAttributes,
        };
    }
}

pub mod composition {
    //! Pitches and melodies, and the [TrackCompiler] that pairs them with
    //! rhythms.

    pub use tactus_core::composition::{
        Melody, MelodySource, NoteName, Pitch, TrackCompiler, TrackCompilerBuilder,
        VoiceAssignment,
    };

    /// The most commonly used imports.
    pub mod prelude {
        pub use super::{Melody, Pitch, TrackCompilerBuilder, VoiceAssignment};
    }
}

pub mod midi {
    //! MIDI channels, the note messages the compiler produces, and Standard
    //! MIDI File output.
    pub use tactus_core::midi::{
        new_note_off, new_note_on, render_smf, to_track, u4, u7, MidiChannel, MidiMessage,
        WireKind, WireMessage,
    };

    /// The most commonly used imports.
    pub mod prelude {
        pub use super::{render_smf, MidiChannel, WireKind, WireMessage};
    }
}

pub mod settings {
    //! Configuration that applies to a whole compile.
    pub use tactus_core::settings::CompileSettings;
}

pub mod types {
    //! Common time types.
    pub use tactus_core::time::{
        deltas_from_timestamps, timestamps_from_deltas, Tick, TicksPerBeat,
    };
}

/// A collection of imports that are useful to users of this crate. `use
/// tactus::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::compile::prelude::*;
    pub use super::composition::prelude::*;
    pub use super::midi::prelude::*;
    pub use super::rhythm::prelude::*;
    pub use super::settings::CompileSettings;
    pub use super::types::{Tick, TicksPerBeat};
}
