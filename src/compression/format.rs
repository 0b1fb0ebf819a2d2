//! Layout of a compressed file.
//!
//! ```text
//! [S: u8] [S x (symbol: u8, code field: 16 bytes)] [payload ...] [pad: u8]
//! ```
//!
//! The code field is a 128-bit big-endian word: zeros, a single sentinel 1,
//! then the code bits. There is no magic number and no version field.

use crate::error::{HuffError, Result};
use crate::huffman_coding::code_table::{Code, MAX_CODE_LEN};
use crate::tools::freq_count::ALPHABET_SIZE;

/// Bytes in one code field.
pub const CODE_FIELD_LEN: usize = 16;
/// Bytes in one symbol table entry: the symbol, then its code field.
pub const ENTRY_LEN: usize = 1 + CODE_FIELD_LEN;

/// One row of the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    pub symbol: u8,
    pub code: Code,
}

/// A compressed file split into its sections. Nothing is decoded yet.
#[derive(Debug, PartialEq, Eq)]
pub struct CompressedFile<'a> {
    pub entries: Vec<SymbolEntry>,
    pub payload: &'a [u8],
    pub pad: u8,
}

/// Offset of the first payload byte for a table of `symbols` entries.
pub fn header_len(symbols: usize) -> usize {
    1 + ENTRY_LEN * symbols
}

/// Exact file size for `symbols` table entries and `code_bits` payload bits.
pub fn file_len(symbols: usize, code_bits: u64) -> u64 {
    header_len(symbols) as u64 + (code_bits + 7) / 8 + 1
}

/// Encode a code as its sentinel-prefixed 128-bit field.
pub fn encode_code_field(code: &Code) -> [u8; CODE_FIELD_LEN] {
    debug_assert!(code.len() <= MAX_CODE_LEN);
    ((1_u128 << code.len()) | code.bits()).to_be_bytes()
}

/// Recover a code from its field by dropping everything up to and including
/// the sentinel bit.
pub fn decode_code_field(field: [u8; CODE_FIELD_LEN]) -> Result<Code> {
    let word = u128::from_be_bytes(field);
    if word == 0 {
        return Err(HuffError::format("code field has no sentinel bit"));
    }
    let len = (127 - word.leading_zeros()) as u8;
    Ok(Code::new(word ^ (1_u128 << len), len))
}

/// Append the symbol count and symbol table.
pub fn write_header(out: &mut Vec<u8>, entries: &[SymbolEntry]) {
    debug_assert!(entries.len() <= ALPHABET_SIZE);
    out.push(entries.len() as u8);
    for entry in entries {
        out.push(entry.symbol);
        out.extend_from_slice(&encode_code_field(&entry.code));
    }
}

impl<'a> CompressedFile<'a> {
    /// Split `data` into its sections, checking every length before it is used.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let (&count, rest) = data
            .split_first()
            .ok_or_else(|| HuffError::format("file is empty"))?;
        let count = count as usize;
        if count > ALPHABET_SIZE {
            return Err(HuffError::format(format!(
                "symbol count {} exceeds alphabet size {}",
                count, ALPHABET_SIZE
            )));
        }

        let table_len = ENTRY_LEN * count;
        if rest.len() < table_len + 1 {
            return Err(HuffError::format(format!(
                "file is {} bytes, too short for {} symbol entries",
                data.len(),
                count
            )));
        }
        let (table, rest) = rest.split_at(table_len);

        let mut entries = Vec::with_capacity(count);
        for (i, raw) in table.chunks_exact(ENTRY_LEN).enumerate() {
            let symbol = raw[0];
            if symbol as usize >= ALPHABET_SIZE {
                return Err(HuffError::UnsupportedSymbol {
                    symbol,
                    offset: 1 + i * ENTRY_LEN,
                });
            }
            let mut field = [0_u8; CODE_FIELD_LEN];
            field.copy_from_slice(&raw[1..]);
            entries.push(SymbolEntry {
                symbol,
                code: decode_code_field(field)?,
            });
        }

        let (&pad, payload) = rest
            .split_last()
            .ok_or_else(|| HuffError::format("missing pad count"))?;
        if pad > 7 {
            return Err(HuffError::format(format!("pad count {} is not in 0..=7", pad)));
        }
        if payload.is_empty() && pad != 0 {
            return Err(HuffError::format("pad count set but payload is empty"));
        }

        Ok(Self {
            entries,
            payload,
            pad,
        })
    }

    /// Number of real (unpadded) payload bits.
    pub fn payload_bits(&self) -> u64 {
        (self.payload.len() as u64 * 8).saturating_sub(self.pad as u64)
    }
}
