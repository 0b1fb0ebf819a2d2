//! The huffman module builds the prefix-code tree and derives the codes from it.
//!
//! Nodes are merged lightest-first from a priority queue keyed on frequency,
//! with creation order breaking ties, so the same input always produces the
//! same tree. The code walk then gives each leaf its root-to-leaf path, left
//! being 0 and right being 1.
//!
//! An input with a single distinct symbol still gets a tree: its one leaf hangs
//! off the left of the root, so the symbol's code is "0".
//!

pub mod code_table;
pub mod huffman;
