// Copyright (c) 2024 Mike Tsao. All rights reserved.

pub mod containers;
pub mod flatten;
pub mod state;
pub mod tree;

pub use containers::{Beat, Measure, Part};
pub use flatten::{flatten, flatten_node, flatten_to_state};
pub use state::{decode, encode, Activation, StateToken};
pub use tree::{Node, NodeId, NodeKind, RhythmTree};

pub mod prelude {
    pub use super::{
        flatten, Activation, Beat, Measure, NodeId, Part, RhythmTree, StateToken,
    };
}
