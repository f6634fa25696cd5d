//! Node arena for AST storage.

use crate::node::{Node, NodeData, NodeIndex, SyntaxKind};
use jsdfa_common::{Position, SourceLocation};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Arena-based storage for AST nodes.
/// Nodes are stored contiguously and referenced by index.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena { nodes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Add a node to the arena and return its index
    pub fn add(&mut self, node: Node) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeIndex(index)
    }

    /// Add a node without a source location
    pub fn alloc(&mut self, data: NodeData) -> NodeIndex {
        self.add(Node::new(data))
    }

    /// Get a node by index
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0 as usize)
    }

    /// Get a mutable node by index
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(index.0 as usize)
    }

    /// Node at an index produced by this arena.
    ///
    /// # Panics
    ///
    /// Panics if `index` was not produced by this arena.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.0 as usize]
    }

    #[inline]
    pub fn kind(&self, index: NodeIndex) -> Option<SyntaxKind> {
        self.get(index).map(Node::kind)
    }

    pub fn loc(&self, index: NodeIndex) -> Option<SourceLocation> {
        self.get(index).and_then(|node| node.loc)
    }

    pub fn start(&self, index: NodeIndex) -> Option<Position> {
        self.get(index).and_then(Node::start)
    }

    pub fn end(&self, index: NodeIndex) -> Option<Position> {
        self.get(index).and_then(Node::end)
    }

    pub fn identifier_name(&self, index: NodeIndex) -> Option<&str> {
        self.get(index).and_then(Node::identifier_name)
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child nodes of `index` in source order.
    pub fn children(&self, index: NodeIndex) -> SmallVec<[NodeIndex; 4]> {
        match self.get(index) {
            Some(node) => node.data.children(),
            None => SmallVec::new(),
        }
    }

    /// Overwrite the `slot`-th child of `parent` (numbering as in
    /// [`NodeArena::children`]). Returns false if the slot does not exist.
    pub fn set_child(&mut self, parent: NodeIndex, slot: usize, child: NodeIndex) -> bool {
        let Some(node) = self.get_mut(parent) else {
            return false;
        };
        let mut slots = node.data.child_slots_mut();
        match slots.get_mut(slot) {
            Some(target) => {
                **target = child;
                true
            }
            None => false,
        }
    }

    /// Deep-copy the subtree rooted at `root`.
    ///
    /// Nodes for which `share` returns true are not copied; the clone points
    /// at the original node instead. `on_clone(original, copy)` is called for
    /// every copied node, after its children were copied. A node reachable
    /// through several parents is copied once. Runs without recursion.
    pub fn clone_subtree(
        &mut self,
        root: NodeIndex,
        share: impl Fn(&Node) -> bool,
        mut on_clone: impl FnMut(NodeIndex, NodeIndex),
    ) -> NodeIndex {
        let mut copies: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
        let mut entered: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut stack: Vec<(NodeIndex, bool)> = vec![(root, false)];

        while let Some((index, children_done)) = stack.pop() {
            if copies.contains_key(&index) {
                continue;
            }
            let Some(node) = self.get(index) else {
                continue;
            };
            if share(node) {
                copies.insert(index, index);
                continue;
            }
            if !children_done {
                if !entered.insert(index) {
                    // Already pending further up: a cycle. Leave the edge as is.
                    continue;
                }
                stack.push((index, true));
                for child in node.data.children().into_iter().rev() {
                    if !copies.contains_key(&child) {
                        stack.push((child, false));
                    }
                }
                continue;
            }

            let mut copy = node.clone();
            for slot in copy.data.child_slots_mut() {
                if let Some(&mapped) = copies.get(&*slot) {
                    *slot = mapped;
                }
            }
            let new_index = self.add(copy);
            copies.insert(index, new_index);
            on_clone(index, new_index);
        }

        copies.get(&root).copied().unwrap_or(root)
    }

    /// Structural equality of two subtrees, ignoring locations.
    pub fn same_shape(&self, a: NodeIndex, b: NodeIndex) -> bool {
        let mut stack = vec![(a, b)];
        let mut seen: FxHashSet<(NodeIndex, NodeIndex)> = FxHashSet::default();
        while let Some((left, right)) = stack.pop() {
            if left == right || !seen.insert((left, right)) {
                continue;
            }
            let (Some(l), Some(r)) = (self.get(left), self.get(right)) else {
                return false;
            };
            if shape_of(&l.data) != shape_of(&r.data) {
                return false;
            }
            let lc = l.data.children();
            let rc = r.data.children();
            if lc.len() != rc.len() {
                return false;
            }
            stack.extend(lc.into_iter().zip(rc));
        }
        true
    }
}

/// Node payload with every child slot zeroed, for shape comparison.
fn shape_of(data: &NodeData) -> NodeData {
    let mut shape = data.clone();
    for slot in shape.child_slots_mut() {
        *slot = NodeIndex(0);
    }
    shape
}

#[cfg(test)]
#[path = "tests/arena_tests.rs"]
mod arena_tests;
