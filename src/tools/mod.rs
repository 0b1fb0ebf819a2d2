//! The tools module provides the supporting pieces around the codec.
//!
//! The tools are:
//! - cli: Command line options for the binary.
//! - freq_count: Frequency count over the 128-symbol alphabet, sharded across the pool.
//! - int_gen: Writes a file of cycling integers, handy skewed test data.
//! - worker_pool: Fixed-size thread pool used by counting and code assignment.
//!
pub mod cli;
pub mod freq_count;
pub mod int_gen;
pub mod worker_pool;
