//! Non-recursive AST traversal.
//!
//! The walker keeps an explicit stack of open nodes, so arbitrarily deep trees
//! are traversed without growing the call stack. Visitors see every node twice:
//!
//! - [`Visitor::before`] in pre-order, which may skip the subtree or replace
//!   the node (the replacement is spliced into the parent and traversed instead);
//! - [`Visitor::after`] in post-order, which may return a replacement that is
//!   spliced into the parent slot.
//!
//! # Substitution
//!
//! Before a node is entered the walker asks [`Visitor::substitution`] whether
//! the node stands for a previously derived value. If it does, the walker
//! calls [`Visitor::expand`] to produce the node that is traversed in its
//! place. The produced node is not spliced into the tree; a visitor that wants
//! the expansion kept returns it from `after`, which receives the replaced
//! node as `origin`.
//!
//! A node is expanded at most once per traversal, and an expansion whose
//! target is still open (an ancestor of the current position) is refused;
//! both cases are reported through [`Visitor::circular_reference`] and the
//! node is visited unreplaced. A child that is itself open is reported
//! through [`Visitor::circular_ast`] and skipped.

use crate::arena::NodeArena;
use crate::node::NodeIndex;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::trace;

/// Pre-order decision for a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Visit the children.
    Descend,
    /// Treat the node as a leaf. `after` still fires.
    Skip,
    /// Splice this node into the parent and traverse it instead.
    Replace(NodeIndex),
}

pub trait Visitor {
    fn arena(&mut self) -> &mut NodeArena;

    fn before(&mut self, _node: NodeIndex) -> Visit {
        Visit::Descend
    }

    /// Post-order hook. `origin` is the node this one was expanded from.
    fn after(&mut self, _node: NodeIndex, _origin: Option<NodeIndex>) -> Option<NodeIndex> {
        None
    }

    /// Target AST of the value `node` stands for, when it should be
    /// substituted.
    fn substitution(&mut self, _node: NodeIndex) -> Option<NodeIndex> {
        None
    }

    /// Node to traverse in place of `node`. Only called after `substitution`
    /// returned a target.
    fn expand(&mut self, node: NodeIndex) -> NodeIndex {
        node
    }

    fn circular_reference(&mut self, _node: NodeIndex) {}

    fn circular_ast(&mut self, _node: NodeIndex) {}
}

struct Frame {
    node: NodeIndex,
    children: SmallVec<[NodeIndex; 4]>,
    next: usize,
}

struct Walk {
    stack: Vec<Frame>,
    open: FxHashSet<NodeIndex>,
    expanded: FxHashSet<NodeIndex>,
    origins: FxHashMap<NodeIndex, NodeIndex>,
    root: NodeIndex,
}

impl Walk {
    /// Write `node` into the slot currently being visited.
    fn splice<V: Visitor + ?Sized>(&mut self, visitor: &mut V, node: NodeIndex) {
        match self.stack.last() {
            Some(parent) => {
                let slot = parent.next - 1;
                let parent_node = parent.node;
                if let Some(frame) = self.stack.last_mut() {
                    frame.children[slot] = node;
                }
                visitor.arena().set_child(parent_node, slot, node);
            }
            None => self.root = node,
        }
    }

    /// Run the post-order hook and drop per-node bookkeeping.
    fn leave<V: Visitor + ?Sized>(&mut self, visitor: &mut V, node: NodeIndex) {
        let origin = self.origins.remove(&node);
        if let Some(replacement) = visitor.after(node, origin) {
            self.splice(visitor, replacement);
        }
    }

    /// Next child to enter, leaving every finished frame on the way.
    fn advance<V: Visitor + ?Sized>(&mut self, visitor: &mut V) -> Option<NodeIndex> {
        loop {
            let frame = self.stack.last_mut()?;
            if frame.next < frame.children.len() {
                let child = frame.children[frame.next];
                frame.next += 1;
                if self.open.contains(&child) {
                    trace!(node = child.0, "skipping child that is its own ancestor");
                    visitor.circular_ast(child);
                    continue;
                }
                return Some(child);
            }
            let Some(done) = self.stack.pop() else {
                return None;
            };
            self.open.remove(&done.node);
            self.leave(visitor, done.node);
        }
    }

    fn enter<V: Visitor + ?Sized>(&mut self, visitor: &mut V, mut node: NodeIndex) {
        if let Some(target) = visitor.substitution(node) {
            if self.expanded.contains(&node) || self.open.contains(&target) {
                trace!(node = node.0, "substitution would re-expand a live node");
                visitor.circular_reference(node);
            } else {
                self.expanded.insert(node);
                let replacement = visitor.expand(node);
                if replacement != node {
                    self.origins.insert(replacement, node);
                    node = replacement;
                }
            }
        }

        let descend = match visitor.before(node) {
            Visit::Skip => false,
            Visit::Descend => true,
            Visit::Replace(replacement) => {
                self.splice(visitor, replacement);
                if let Some(origin) = self.origins.remove(&node) {
                    self.origins.insert(replacement, origin);
                }
                node = replacement;
                true
            }
        };

        let children = if descend {
            visitor.arena().children(node)
        } else {
            SmallVec::new()
        };
        if children.is_empty() {
            self.leave(visitor, node);
            return;
        }
        self.open.insert(node);
        self.stack.push(Frame {
            node,
            children,
            next: 0,
        });
    }
}

/// Traverse the tree under `root`. Returns the root, which differs from the
/// argument when a hook replaced it.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, root: NodeIndex) -> NodeIndex {
    let mut state = Walk {
        stack: Vec::new(),
        open: FxHashSet::default(),
        expanded: FxHashSet::default(),
        origins: FxHashMap::default(),
        root,
    };
    let mut current = Some(root);
    while let Some(node) = current {
        state.enter(visitor, node);
        current = state.advance(visitor);
    }
    state.root
}

/// Traverse each root of a top-level sequence in order.
pub fn walk_all<V: Visitor + ?Sized>(visitor: &mut V, roots: &[NodeIndex]) -> Vec<NodeIndex> {
    roots.iter().map(|&root| walk(visitor, root)).collect()
}

#[cfg(test)]
#[path = "tests/walk_tests.rs"]
mod walk_tests;
