use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::node_list::OrderedNodeList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        frequency: u64,
    },
    Internal {
        frequency: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn merge(left: Node, right: Node) -> Self {
        Node::Internal {
            frequency: left.frequency() + right.frequency(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn frequency(&self) -> u64 {
        match self {
            Node::Leaf { frequency, .. } | Node::Internal { frequency, .. } => *frequency,
        }
    }

    /// The byte a leaf stands for; internal nodes have none.
    pub fn symbol(&self) -> Option<u8> {
        match self {
            Node::Leaf { symbol, .. } => Some(*symbol),
            Node::Internal { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(&Node, &Node)> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => Some((left, right)),
        }
    }

    /// Longest root-to-leaf path in edges. A lone leaf has height 0.
    pub fn height(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.height().max(right.height()),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Builds the tree by repeatedly merging the two lightest nodes.
    ///
    /// Leaves are seeded in ascending byte order and the first node popped
    /// becomes the left child, so the same histogram always gives the same
    /// tree.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        let mut list = OrderedNodeList::new();
        for (symbol, frequency) in frequencies.symbols() {
            list.insert(Node::Leaf { symbol, frequency });
        }

        while let Some(left) = list.pop_front() {
            match list.pop_front() {
                Some(right) => list.insert(Node::merge(left, right)),
                None => {
                    log::debug!(
                        "built huffman tree: {} leaves, height {}",
                        left.leaf_count(),
                        left.height()
                    );
                    return Ok(Self { root: left });
                }
            }
        }

        Err(Error::DegenerateInput)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// Total weight of the tree, i.e. the number of input bytes.
    pub fn frequency(&self) -> u64 {
        self.root.frequency()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }
}
