use std::{
    fmt,
    iter,
};

use crate::errs::SkipListError;

/// Arena index of the head sentinel. It precedes every key.
pub(crate) const HEAD: usize = 0;
/// Arena index of the tail sentinel. Every level's chain ends here.
pub(crate) const TAIL: usize = 1;

// ////////////////////////////////////////////////////////////////////////////
// Node
// ////////////////////////////////////////////////////////////////////////////

/// Nodes make up the list. They live in the list's arena and refer to each
/// other by arena index, so the list is the single owner of every node.
///
/// `levels[i]` is the next node at height `i` and the vector's length is the
/// height the node was created with. A link always names a live node; when
/// there is no real successor it names [`TAIL`].
///
/// `entry` is `None` for the two sentinels and for vacated arena slots.
/// Neither can be reached from a real node, so a node with no entry that is
/// met during traversal is the tail and compares as greater than any key.
pub(crate) struct Node<K, V> {
    pub(crate) entry: Option<(K, V)>,
    pub(crate) levels: Vec<usize>,
}

impl<K, V> Node<K, V> {
    /// A sentinel with `height` links, all pointing at the tail.
    pub(crate) fn sentinel(height: usize) -> Self {
        Node {
            entry: None,
            levels: iter::repeat(TAIL).take(height).collect(),
        }
    }

    /// A data node with `height` links. `height` has to fall in
    /// `1..=max_level`, the same range the head sentinel was sized for.
    pub(crate) fn new(key: K, value: V, height: usize, max_level: usize) -> Result<Self, SkipListError> {
        if height == 0 || height > max_level {
            return Err(SkipListError::LevelOutOfBounds {
                requested: height,
                max: max_level,
            });
        }
        Ok(Node {
            entry: Some((key, value)),
            levels: iter::repeat(TAIL).take(height).collect(),
        })
    }

    #[inline]
    pub(crate) fn key(&self) -> Option<&K> {
        self.entry.as_ref().map(|(key, _)| key)
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.levels.len()
    }

    /// Takes the entry out and drops every link, leaving an empty slot.
    pub(crate) fn vacate(&mut self) -> Option<(K, V)> {
        self.levels.clear();
        self.entry.take()
    }
}

impl<K, V> fmt::Debug for Node<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            | Some((key, value)) => f
                .debug_struct("Node")
                .field("key", key)
                .field("value", value)
                .field("height", &self.height())
                .finish(),
            | None => f
                .debug_struct("Sentinel")
                .field("height", &self.height())
                .finish(),
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Arena
// ////////////////////////////////////////////////////////////////////////////

/// Backing storage for the nodes. Slots freed by removals are recycled before
/// the vector grows. Slots [`HEAD`] and [`TAIL`] are never freed.
pub(crate) struct Arena<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<usize>,
}

impl<K, V> Arena<K, V> {
    /// A fresh arena holding only the sentinels. The head gets `max_level`
    /// links up front so it never has to grow.
    pub(crate) fn new(max_level: usize) -> Self {
        Arena {
            nodes: vec![Node::sentinel(max_level), Node::sentinel(0)],
            free: Vec::new(),
        }
    }

    pub(crate) fn allocate(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            | Some(idx) => {
                self.nodes[idx] = node;
                idx
            },
            | None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            },
        }
    }

    /// Releases a data node. The caller must have unlinked it already.
    pub(crate) fn release(&mut self, idx: usize) -> Option<(K, V)> {
        debug_assert!(idx != HEAD && idx != TAIL, "sentinels are never released");
        let entry = self.nodes[idx].vacate();
        if entry.is_some() {
            self.free.push(idx);
        }
        entry
    }

    /// Drops every data node and relinks the head straight to the tail.
    pub(crate) fn reset(&mut self) {
        self.nodes.truncate(2);
        self.free.clear();
        self.nodes[HEAD].levels.fill(TAIL);
    }

    #[inline]
    pub(crate) fn node(&self, idx: usize) -> &Node<K, V> {
        &self.nodes[idx]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        &mut self.nodes[idx]
    }

    #[inline]
    pub(crate) fn next(&self, idx: usize, level: usize) -> usize {
        self.nodes[idx].levels[level]
    }

    #[inline]
    pub(crate) fn set_next(&mut self, idx: usize, level: usize, next: usize) {
        self.nodes[idx].levels[level] = next;
    }

    /// Number of slots in use, sentinels included.
    #[cfg(test)]
    pub(crate) fn occupied(&self) -> usize {
        self.nodes.len() - self.free.len()
    }
}
