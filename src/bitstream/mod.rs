//! The bitstream module is the bit-level I/O for the codec.
//!
//! `BitPacker` turns a run of codes into whole bytes and reports how many zero
//! bits it had to add to finish the last one. `BitReader` walks those bytes
//! back out bit by bit, stopping before the padding.
pub mod bitpacker;
pub mod bitreader;
