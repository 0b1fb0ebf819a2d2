//! Walks a finished tree and hands every leaf its bit-string code.
//!
//! Left edges append a 0 and right edges append a 1, so a leaf's code is its
//! path from the root. The table is written once by the walk and only read
//! after that.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use super::huffman::TreeNode;
use crate::error::Result;
use crate::tools::worker_pool::WorkerPool;

/// Longest code the on-disk code field can hold.
pub const MAX_CODE_LEN: u8 = 127;

/// A code of up to 127 bits, stored right-aligned: the last bit of the path is
/// bit 0 of `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Code {
    bits: u128,
    len: u8,
}

impl Code {
    pub fn new(bits: u128, len: u8) -> Self {
        debug_assert!(len <= MAX_CODE_LEN);
        let mask = if len == 0 { 0 } else { u128::MAX >> (128 - len as u32) };
        Self {
            bits: bits & mask,
            len,
        }
    }

    /// This code with one more bit on the end.
    pub fn push(self, bit: bool) -> Self {
        Self {
            bits: (self.bits << 1) | bit as u128,
            len: self.len + 1,
        }
    }

    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn len(&self) -> u8 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit `i` counted from the root end of the path.
    pub fn bit(&self, i: u8) -> bool {
        debug_assert!(i < self.len);
        (self.bits >> (self.len - 1 - i)) & 1 == 1
    }

    /// True if `self` is a proper or equal prefix of `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.bit(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Symbol to code mapping for every leaf of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: FxHashMap<u8, Code>,
}

impl CodeTable {
    pub fn get(&self, symbol: u8) -> Option<Code> {
        self.codes.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        let mut entries = self.codes.iter().map(|(&s, &c)| (s, c)).collect::<Vec<_>>();
        entries.sort_unstable_by_key(|&(s, _)| s);
        entries.into_iter()
    }
}

/// Depth-first walk from `root`, recording every leaf's path.
pub fn assign_codes(root: &TreeNode) -> CodeTable {
    let mut table = CodeTable::default();
    walk(root, Code::default(), &mut table);
    debug!("Assigned {} codes", table.len());
    table
}

/// Run the walk as one task on the pool and wait for it. Serialization reads
/// the table, so it has to be complete before this returns.
pub fn assign_codes_on(pool: &WorkerPool, root: Arc<TreeNode>) -> Result<CodeTable> {
    pool.run_synchronously(move || assign_codes(&root))
}

fn walk(node: &TreeNode, code: Code, table: &mut CodeTable) {
    match node {
        TreeNode::Leaf { symbol, .. } => {
            trace!("Symbol {} gets code {}", symbol, code);
            table.codes.insert(*symbol, code);
        }
        TreeNode::Internal { left, right, .. } => {
            if let Some(left) = left {
                walk(left, code.push(false), table);
            }
            if let Some(right) = right {
                walk(right, code.push(true), table);
            }
        }
    }
}
