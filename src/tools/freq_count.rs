use std::ops::Range;
use std::sync::Arc;

use log::debug;

use crate::error::{HuffError, Result};
use crate::tools::worker_pool::WorkerPool;

/// Number of symbol values the codec handles (0..128).
pub const ALPHABET_SIZE: usize = 128;

/// Occurrence count for every symbol in the alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
        }
    }

    /// Count the input on the calling thread.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_alphabet(data)?;
        let mut table = Self::new();
        data.iter().for_each(|&b| table.counts[b as usize] += 1);
        Ok(table)
    }

    /// Count the input on the pool. The symbol index space is cut into `shards`
    /// disjoint ranges and each range is counted by its own task, so merging is
    /// a plain copy of each shard's slice. Returns once every shard is done.
    pub fn count_parallel(data: Arc<[u8]>, pool: &WorkerPool, shards: usize) -> Result<Self> {
        check_alphabet(&data)?;

        let handles = shard_ranges(shards)
            .into_iter()
            .map(|range| {
                let data = Arc::clone(&data);
                pool.submit(move || {
                    let counts = count_range(&data, range.clone());
                    (range, counts)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut table = Self::new();
        for handle in handles {
            let (range, counts) = handle.join()?;
            table.counts[range].copy_from_slice(&counts);
        }
        debug!(
            "Counted {} bytes, {} distinct symbols",
            table.total(),
            table.distinct()
        );
        Ok(table)
    }

    /// Build a table from explicit counts. Symbols >= 128 are rejected.
    pub fn from_counts(pairs: &[(u8, u64)]) -> Result<Self> {
        let mut table = Self::new();
        for (offset, &(symbol, count)) in pairs.iter().enumerate() {
            if symbol as usize >= ALPHABET_SIZE {
                return Err(HuffError::UnsupportedSymbol { symbol, offset });
            }
            table.counts[symbol as usize] = count;
        }
        Ok(table)
    }

    pub fn get(&self, symbol: u8) -> u64 {
        self.counts.get(symbol as usize).copied().unwrap_or(0)
    }

    /// Number of symbols with a nonzero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Symbols with a nonzero count, sorted by ascending count and then by
    /// symbol value. This is the priority order used everywhere downstream.
    pub fn ranked(&self) -> Vec<(u8, u64)> {
        let mut ranked = self
            .counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(s, c)| (s as u8, *c))
            .collect::<Vec<_>>();
        ranked.sort_unstable_by_key(|&(s, c)| (c, s));
        ranked
    }
}

/// Fail on the first byte outside the alphabet.
pub fn check_alphabet(data: &[u8]) -> Result<()> {
    match data.iter().position(|&b| b as usize >= ALPHABET_SIZE) {
        Some(offset) => Err(HuffError::UnsupportedSymbol {
            symbol: data[offset],
            offset,
        }),
        None => Ok(()),
    }
}

/// Split 0..128 into `shards` contiguous, non-overlapping ranges.
fn shard_ranges(shards: usize) -> Vec<Range<usize>> {
    let shards = shards.clamp(1, ALPHABET_SIZE);
    (0..shards)
        .map(|i| (i * ALPHABET_SIZE / shards)..((i + 1) * ALPHABET_SIZE / shards))
        .collect()
}

/// Count only the symbols that fall inside `range`.
fn count_range(data: &[u8], range: Range<usize>) -> Vec<u64> {
    let mut counts = vec![0_u64; range.len()];
    for &b in data {
        let b = b as usize;
        if range.contains(&b) {
            counts[b - range.start] += 1;
        }
    }
    counts
}
