use derivative::Derivative;
use std::collections::VecDeque;

use crate::tree::Node;

#[derive(Debug, Derivative)]
#[derivative(PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    frequency: u64,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    node: Node,
}

/// Nodes waiting to be merged, lowest frequency first.
///
/// Equal frequencies keep their insertion order: a new node goes after every
/// node whose frequency is less than or equal to its own. That rule alone
/// decides the tree shape for a given histogram.
#[derive(Debug, Default)]
pub struct OrderedNodeList {
    entries: VecDeque<Entry>,
}

impl OrderedNodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: Node) {
        let entry = Entry {
            frequency: node.frequency(),
            node,
        };
        let at = self.entries.partition_point(|e| *e <= entry);
        self.entries.insert(at, entry);
    }

    pub fn pop_front(&mut self) -> Option<Node> {
        self.entries.pop_front().map(|e| e.node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
