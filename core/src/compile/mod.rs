// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! The compiler proper: state arrays in, delta-timed note messages out.
//!
//! One voice goes straight from [derive] to [emit]. Several voices are
//! first merged onto one timeline by [consolidate](mod@consolidate).

pub mod consolidate;
pub mod derive;
pub mod emit;

pub use consolidate::{
    consolidate, AdjustedAttributes, ConsolidatedAttributes, ParallelAttributes, ABSENT_SENTINEL,
};
pub use derive::{MessageKind, StateAttributes};
pub use emit::{emit_parallel, emit_single};

/// Recommended imports for easy onboarding.
pub mod prelude {
    pub use super::{
        consolidate, emit_parallel, emit_single, MessageKind, ParallelAttributes,
        StateAttributes,
    };
}
