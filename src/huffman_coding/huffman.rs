use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::tools::freq_count::FrequencyTable;

/// A node of the prefix-code tree. Children are owned by their parent.
///
/// Children are optional because a tree rebuilt from a compressed file only
/// has the branches its code table names. A tree built from frequencies has
/// both children on every internal node, except the root of a one-symbol
/// tree, which only has a left leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Option<Box<TreeNode>>,
        right: Option<Box<TreeNode>>,
    },
}

impl TreeNode {
    pub fn leaf(symbol: u8, weight: u64) -> Self {
        TreeNode::Leaf { symbol, weight }
    }

    /// An internal node with no children yet.
    pub fn empty_internal() -> Self {
        TreeNode::Internal {
            weight: 0,
            left: None,
            right: None,
        }
    }

    /// Join two nodes under a new parent. `left` is the first node removed
    /// from the queue.
    pub fn merge(left: Self, right: Self) -> Self {
        TreeNode::Internal {
            weight: left.weight() + right.weight(),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            TreeNode::Leaf { weight, .. } => *weight,
            TreeNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// Follow one edge: false (bit 0) goes left, true (bit 1) goes right.
    pub fn child(&self, bit: bool) -> Option<&TreeNode> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Internal { left, right, .. } => {
                if bit {
                    right.as_deref()
                } else {
                    left.as_deref()
                }
            }
        }
    }

    /// Number of leaves below (and including) this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Internal { left, right, .. } => {
                left.as_ref().map_or(0, |n| n.leaf_count())
                    + right.as_ref().map_or(0, |n| n.leaf_count())
            }
        }
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Internal { left, right, .. } => {
                1 + left
                    .as_ref()
                    .map_or(0, |n| n.depth())
                    .max(right.as_ref().map_or(0, |n| n.depth()))
            }
        }
    }
}

/// Queue entry. Ordered by weight, then by the order the entry was created,
/// both ascending; `BinaryHeap` is a max-heap so the comparison is reversed.
#[derive(Debug)]
struct Queued {
    weight: u64,
    seq: usize,
    node: TreeNode,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    /// Lightest (then oldest) entry is the greatest, so it pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Build the prefix-code tree for a frequency table.
///
/// Leaves enter the queue in `FrequencyTable::ranked` order, which also hands
/// out their sequence numbers; each merged node takes the next number. The two
/// lightest entries are merged until one remains. Returns None when no symbol
/// has a nonzero count.
pub fn build_tree(freqs: &FrequencyTable) -> Option<TreeNode> {
    let ranked = freqs.ranked();
    let mut queue: BinaryHeap<Queued> = ranked
        .iter()
        .enumerate()
        .map(|(seq, &(symbol, weight))| Queued {
            weight,
            seq,
            node: TreeNode::leaf(symbol, weight),
        })
        .collect();
    let mut next_seq = ranked.len();

    if queue.len() == 1 {
        // One symbol: hang it off a root so it still gets a one-bit code.
        let only = queue.pop()?.node;
        debug!("Single-symbol tree");
        return Some(TreeNode::Internal {
            weight: only.weight(),
            left: Some(Box::new(only)),
            right: None,
        });
    }

    while queue.len() > 1 {
        let (first, second) = match (queue.pop(), queue.pop()) {
            (Some(a), Some(b)) => (a, b),
            _ => break,
        };
        trace!(
            "Merging weights {} (#{}) and {} (#{})",
            first.weight,
            first.seq,
            second.weight,
            second.seq
        );
        let node = TreeNode::merge(first.node, second.node);
        queue.push(Queued {
            weight: node.weight(),
            seq: next_seq,
            node,
        });
        next_seq += 1;
    }

    let root = queue.pop().map(|q| q.node);
    if let Some(root) = &root {
        debug!(
            "Built tree with {} leaves, depth {}",
            root.leaf_count(),
            root.depth()
        );
    }
    root
}
