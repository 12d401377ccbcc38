// Copyright (c) 2024 Mike Tsao. All rights reserved.

use super::containers::{Beat, Measure, Part};
use crate::error::{CompileError, Result};
use derive_more::Display as DeriveDisplay;

/// Index of a node inside a [RhythmTree].
#[derive(Clone, Copy, Debug, DeriveDisplay, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// What kind of container a node is. Beats carry their time units inline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    #[allow(missing_docs)]
    Part,
    #[allow(missing_docs)]
    Measure,
    #[allow(missing_docs)]
    Beat(Beat),
}
impl NodeKind {
    /// Lowercase name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Part => "part",
            NodeKind::Measure => "measure",
            NodeKind::Beat(_) => "beat",
        }
    }

    /// Whether a node of kind `child` may hang directly under this one.
    pub fn accepts(&self, child: &NodeKind) -> bool {
        matches!(
            (self, child),
            (NodeKind::Part, NodeKind::Measure) | (NodeKind::Measure, NodeKind::Beat(_))
        )
    }
}

/// One container in the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    #[allow(missing_docs)]
    pub kind: NodeKind,
    #[allow(missing_docs)]
    pub parent: Option<NodeId>,
    #[allow(missing_docs)]
    pub children: Vec<NodeId>,
}

/// Arena storage for Part → Measure → Beat hierarchies. Nodes refer to each
/// other by [NodeId], and top-level nodes (no parent) are the roots, kept in
/// insertion order.
///
/// [RhythmTree::add_node()] links anything to anything; the typed helpers
/// ([RhythmTree::add_part()] and friends) exist for convenience. Whether the
/// result is well nested is checked when the tree is flattened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RhythmTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}
impl RhythmTree {
    /// Adds a node under `parent`, or as a new root if `parent` is `None`.
    pub fn add_node(&mut self, kind: NodeKind, parent: Option<NodeId>) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());
        match parent {
            Some(parent_id) => {
                let parent = self
                    .nodes
                    .get_mut(parent_id.0)
                    .ok_or(CompileError::UnknownNode(parent_id.0))?;
                parent.children.push(id);
            }
            None => self.roots.push(id),
        }
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::default(),
        });
        Ok(id)
    }

    /// Starts a new, empty part at the top level.
    pub fn add_part(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.roots.push(id);
        self.nodes.push(Node {
            kind: NodeKind::Part,
            parent: None,
            children: Vec::default(),
        });
        id
    }

    #[allow(missing_docs)]
    pub fn add_measure(&mut self, part: NodeId) -> Result<NodeId> {
        self.add_node(NodeKind::Measure, Some(part))
    }

    #[allow(missing_docs)]
    pub fn add_beat(&mut self, measure: NodeId, beat: Beat) -> Result<NodeId> {
        self.add_node(NodeKind::Beat(beat), Some(measure))
    }

    /// Copies a [Part] into the arena as a new root.
    pub fn add_part_from(&mut self, part: &Part) -> NodeId {
        let part_id = self.add_part();
        for measure in part.measures() {
            self.push_measure(part_id, measure);
        }
        part_id
    }

    fn push_measure(&mut self, part_id: NodeId, measure: &Measure) {
        let measure_id = NodeId(self.nodes.len());
        self.nodes[part_id.0].children.push(measure_id);
        self.nodes.push(Node {
            kind: NodeKind::Measure,
            parent: Some(part_id),
            children: Vec::default(),
        });
        for beat in measure.beats() {
            let beat_id = NodeId(self.nodes.len());
            self.nodes[measure_id.0].children.push(beat_id);
            self.nodes.push(Node {
                kind: NodeKind::Beat(beat.clone()),
                parent: Some(measure_id),
                children: Vec::default(),
            });
        }
    }

    #[allow(missing_docs)]
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(CompileError::UnknownNode(id.0))
    }

    #[allow(missing_docs)]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[allow(missing_docs)]
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    #[allow(missing_docs)]
    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attacks in the subtree rooted at `id`.
    pub fn n_note_on(&self, id: NodeId) -> Result<usize> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Beat(beat) => Ok(beat.n_note_on()),
            _ => node
                .children
                .iter()
                .try_fold(0, |sum, &child| Ok(sum + self.n_note_on(child)?)),
        }
    }
}
impl From<&Part> for RhythmTree {
    fn from(part: &Part) -> Self {
        let mut tree = Self::default();
        tree.add_part_from(part);
        tree
    }
}
impl From<&[Part]> for RhythmTree {
    fn from(parts: &[Part]) -> Self {
        let mut tree = Self::default();
        parts.iter().for_each(|p| {
            tree.add_part_from(p);
        });
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_links_parents_and_children() {
        let mut tree = RhythmTree::default();
        assert!(tree.is_empty());
        let part = tree.add_part();
        let measure = tree.add_measure(part).unwrap();
        let b1 = tree
            .add_beat(measure, Beat::new_with_states(&[1, 0]).unwrap())
            .unwrap();
        let b2 = tree
            .add_beat(measure, Beat::new_with_states(&[1, 1, 2]).unwrap())
            .unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.roots(), &[part]);
        assert_eq!(tree.children(part).unwrap(), &[measure]);
        assert_eq!(tree.children(measure).unwrap(), &[b1, b2]);
        assert_eq!(tree.parent(b2).unwrap(), Some(measure));
        assert_eq!(tree.parent(part).unwrap(), None);
        assert_eq!(tree.n_note_on(part).unwrap(), 3);
    }

    #[test]
    fn unknown_parents_are_rejected() {
        let mut tree = RhythmTree::default();
        assert_eq!(
            tree.add_measure(NodeId(5)),
            Err(CompileError::UnknownNode(5))
        );
        assert!(tree.is_empty(), "failed insert must not leave a node behind");
    }

    #[test]
    fn building_from_parts_matches_part_shape() {
        let part = Part::new_with_measures(vec![
            Measure::new_with_subdivisions(&[2, 3]).unwrap(),
            Measure::new_with_subdivisions(&[4]).unwrap(),
        ]);
        let tree = RhythmTree::from(&part);
        let root = tree.roots()[0];
        assert_eq!(tree.children(root).unwrap().len(), 2);
        let second_measure = tree.children(root).unwrap()[1];
        assert_eq!(tree.children(second_measure).unwrap().len(), 1);
        assert!(NodeKind::Part.accepts(&NodeKind::Measure));
        assert!(!NodeKind::Part.accepts(&NodeKind::Beat(Beat::default())));
    }
}
