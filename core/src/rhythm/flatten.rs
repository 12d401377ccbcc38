// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Serializes a [RhythmTree] into the state-array exchange format.

use super::{
    state::{self, StateToken},
    tree::{NodeId, NodeKind, RhythmTree},
};
use crate::error::{CompileError, Result};

enum Visit {
    Enter(NodeId),
    ClosePart,
}

/// Flattens every root of `tree`, in insertion order.
pub fn flatten(tree: &RhythmTree) -> Result<Vec<StateToken>> {
    let mut tokens = Vec::default();
    for &root in tree.roots() {
        flatten_node_into(tree, root, &mut tokens)?;
    }
    Ok(tokens)
}

/// Flattens the subtree rooted at `id`: depth first, left to right. Each
/// beat contributes `[-3, N, s_1..s_N]`, each measure a leading `-2`, and
/// each part is wrapped in `-1`s.
pub fn flatten_node(tree: &RhythmTree, id: NodeId) -> Result<Vec<StateToken>> {
    let mut tokens = Vec::default();
    flatten_node_into(tree, id, &mut tokens)?;
    Ok(tokens)
}

/// [flatten()], encoded as integers.
pub fn flatten_to_state(tree: &RhythmTree) -> Result<Vec<i32>> {
    Ok(state::encode(&flatten(tree)?))
}

fn flatten_node_into(tree: &RhythmTree, id: NodeId, tokens: &mut Vec<StateToken>) -> Result<()> {
    let mut stack = vec![Visit::Enter(id)];
    while let Some(visit) = stack.pop() {
        let id = match visit {
            Visit::ClosePart => {
                tokens.push(StateToken::PartBoundary);
                continue;
            }
            Visit::Enter(id) => id,
        };
        let node = tree.node(id)?;
        match &node.kind {
            NodeKind::Part => {
                tokens.push(StateToken::PartBoundary);
                stack.push(Visit::ClosePart);
            }
            NodeKind::Measure => tokens.push(StateToken::MeasureBoundary),
            NodeKind::Beat(beat) => tokens.extend(beat.tokens()),
        }
        for &child_id in node.children.iter().rev() {
            let child = tree.node(child_id)?;
            if !node.kind.accepts(&child.kind) {
                return Err(CompileError::MalformedNesting {
                    child: child.kind.name(),
                    child_id: child_id.0,
                    parent: node.kind.name(),
                });
            }
            stack.push(Visit::Enter(child_id));
        }
    }
    Ok(())
}
