use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use super::format::{file_len, write_header, SymbolEntry};
use crate::bitstream::bitpacker::BitPacker;
use crate::error::{HuffError, Result};
use crate::huffman_coding::code_table::{assign_codes_on, Code, CodeTable};
use crate::huffman_coding::huffman::build_tree;
use crate::tools::freq_count::{FrequencyTable, ALPHABET_SIZE};
use crate::tools::worker_pool::WorkerPool;

/// A finished compressed image and the numbers that describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    /// Distinct symbols in the table.
    pub symbols: usize,
    /// Code bits in the payload, not counting padding.
    pub payload_bits: u64,
    /// Zero bits added to finish the last payload byte.
    pub pad: u8,
}

/// Summary of one file encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeReport {
    pub bytes_in: usize,
    pub bytes_out: usize,
    pub symbols: usize,
}

/// Compress `data`. Counting is spread across `shards` pool tasks and the code
/// walk runs as one pool task; both are waited on before the next step starts.
pub fn encode_bytes(data: Arc<[u8]>, pool: &WorkerPool, shards: usize) -> Result<Encoded> {
    let freqs = FrequencyTable::count_parallel(Arc::clone(&data), pool, shards)?;

    let codes = match build_tree(&freqs) {
        Some(root) => assign_codes_on(pool, Arc::new(root))?,
        None => CodeTable::default(),
    };

    serialize(&data, &freqs, &codes)
}

/// Write the symbol table and packed payload for `data`.
///
/// Table rows go out in the same ascending (count, symbol) order the tree
/// builder used. Every byte of `data` must have a code in `codes`.
pub fn serialize(data: &[u8], freqs: &FrequencyTable, codes: &CodeTable) -> Result<Encoded> {
    let mut lookup: [Option<Code>; ALPHABET_SIZE] = [None; ALPHABET_SIZE];
    let entries = freqs
        .ranked()
        .into_iter()
        .map(|(symbol, _)| -> Result<SymbolEntry> {
            let code = codes.get(symbol).ok_or(HuffError::UnsupportedSymbol {
                symbol,
                offset: 0,
            })?;
            lookup[symbol as usize] = Some(code);
            Ok(SymbolEntry { symbol, code })
        })
        .collect::<Result<Vec<_>>>()?;

    let code_bits: u64 = entries
        .iter()
        .map(|e| e.code.len() as u64 * freqs.get(e.symbol))
        .sum();
    let size = file_len(entries.len(), code_bits) as usize;

    let mut bytes = Vec::with_capacity(size);
    write_header(&mut bytes, &entries);

    let mut bp = BitPacker::new(size - bytes.len());
    for (offset, &symbol) in data.iter().enumerate() {
        let code = lookup
            .get(symbol as usize)
            .copied()
            .flatten()
            .ok_or(HuffError::UnsupportedSymbol { symbol, offset })?;
        bp.out_code(&code);
    }
    let pad = bp.flush();
    debug!(
        "Payload is {} bits in {} bytes, {} pad bits",
        bp.bit_count(),
        bp.output.len(),
        pad
    );

    bytes.extend_from_slice(&bp.output);
    bytes.push(pad);
    debug_assert_eq!(bytes.len(), size);

    Ok(Encoded {
        bytes,
        symbols: entries.len(),
        payload_bits: bp.bit_count(),
        pad,
    })
}

/// Compress the file at `input` into `output`.
pub fn encode_file(
    input: &Path,
    output: &Path,
    pool: &WorkerPool,
    shards: usize,
) -> Result<EncodeReport> {
    let data = fs::read(input).map_err(|source| HuffError::FileOpen {
        path: input.to_path_buf(),
        source,
    })?;
    let mut f_out = File::create(output).map_err(|source| HuffError::FileOpen {
        path: output.to_path_buf(),
        source,
    })?;

    let bytes_in = data.len();
    info!("Read {} bytes from {}", bytes_in, input.display());

    let encoded = encode_bytes(Arc::from(data), pool, shards)?;
    f_out.write_all(&encoded.bytes)?;

    info!(
        "Wrote {} bytes ({} symbols) to {}",
        encoded.bytes.len(),
        encoded.symbols,
        output.display()
    );
    Ok(EncodeReport {
        bytes_in,
        bytes_out: encoded.bytes.len(),
        symbols: encoded.symbols,
    })
}
