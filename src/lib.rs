//! Huffman coding of 7-bit byte streams.
//!
//! Builds a prefix-code tree from symbol frequencies, then writes the code
//! table and the packed bitstream to a compact binary file. Decoding rebuilds
//! the tree from the table and walks it bit by bit.
//!
//! Frequency counting and code assignment run on a small fixed-size worker
//! pool. Only byte values 0-127 are accepted.
//!
//! Basic usage from the command line:
//!
//! `$> huffpool -encode notes.txt notes.huff`
//!
//! `$> huffpool -decode notes.huff notes.txt`
//!
pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use error::{HuffError, Result};
