use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use log::{debug, info, trace};

use super::format::{CompressedFile, SymbolEntry};
use crate::bitstream::bitreader::BitReader;
use crate::error::{HuffError, Result};
use crate::huffman_coding::huffman::TreeNode;
use crate::tools::freq_count::ALPHABET_SIZE;

/// Summary of one file decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeReport {
    pub bytes_in: usize,
    pub bytes_out: usize,
    pub symbols: usize,
}

/// Rebuild the code tree from a symbol table.
///
/// Each code is walked from the root, creating internal nodes along the way,
/// and the symbol is attached where the walk ends. An existing branch is never
/// replaced: a code that runs through a leaf, or lands on an occupied slot,
/// is reported as a format error. Returns None for an empty table.
pub fn rebuild_tree(entries: &[SymbolEntry]) -> Result<Option<TreeNode>> {
    if entries.is_empty() {
        return Ok(None);
    }

    let mut seen = [false; ALPHABET_SIZE];
    let mut root = TreeNode::empty_internal();
    for entry in entries {
        let slot = seen
            .get_mut(entry.symbol as usize)
            .ok_or(HuffError::UnsupportedSymbol {
                symbol: entry.symbol,
                offset: 0,
            })?;
        if *slot {
            return Err(HuffError::format(format!(
                "symbol {} appears twice in the table",
                entry.symbol
            )));
        }
        *slot = true;
        insert(&mut root, entry)?;
        trace!("Placed symbol {} at {}", entry.symbol, entry.code);
    }
    Ok(Some(root))
}

fn insert(root: &mut TreeNode, entry: &SymbolEntry) -> Result<()> {
    let code = entry.code;
    if code.is_empty() {
        return Err(HuffError::format(format!(
            "symbol {} has an empty code",
            entry.symbol
        )));
    }

    let mut node = root;
    for i in 0..code.len() {
        let slot = match node {
            TreeNode::Internal { left, right, .. } => {
                if code.bit(i) {
                    right
                } else {
                    left
                }
            }
            TreeNode::Leaf { symbol, .. } => {
                return Err(HuffError::format(format!(
                    "code {} for symbol {} runs through the leaf for symbol {}",
                    code, entry.symbol, symbol
                )));
            }
        };

        if i + 1 == code.len() {
            if slot.is_some() {
                return Err(HuffError::format(format!(
                    "code {} for symbol {} collides with another code",
                    code, entry.symbol
                )));
            }
            *slot = Some(Box::new(TreeNode::leaf(entry.symbol, 0)));
            return Ok(());
        }
        node = &mut **slot.get_or_insert_with(|| Box::new(TreeNode::empty_internal()));
    }
    Ok(())
}

/// Walk the tree once per payload bit, emitting a symbol at every leaf. The
/// walk has to finish back at the root.
pub fn decode_payload(root: &TreeNode, payload: &[u8], bits: u64) -> Result<Vec<u8>> {
    let mut br = BitReader::new(payload, bits);
    let mut out = Vec::with_capacity(payload.len() * 2);
    let mut node = root;
    let mut depth = 0_usize;

    while let Some(bit) = br.bool_bit() {
        node = node.child(bit).ok_or_else(|| {
            HuffError::format(format!("payload bit at {} leads to no symbol", br.loc()))
        })?;
        depth += 1;
        if let TreeNode::Leaf { symbol, .. } = node {
            out.push(*symbol);
            node = root;
            depth = 0;
        }
    }

    if depth != 0 {
        return Err(HuffError::format(format!(
            "payload ends {} bits into an unfinished code",
            depth
        )));
    }
    Ok(out)
}

/// Decompress an in-memory image produced by `encode_bytes`.
pub fn decode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let file = CompressedFile::parse(data)?;
    debug!(
        "{} symbols, {} payload bytes, {} pad bits",
        file.entries.len(),
        file.payload.len(),
        file.pad
    );

    match rebuild_tree(&file.entries)? {
        Some(root) => decode_payload(&root, file.payload, file.payload_bits()),
        None if file.payload.is_empty() => Ok(Vec::new()),
        None => Err(HuffError::format("payload present but the symbol table is empty")),
    }
}

/// Decompress the file at `input` into `output`.
pub fn decode_file(input: &Path, output: &Path) -> Result<DecodeReport> {
    let data = fs::read(input).map_err(|source| HuffError::FileOpen {
        path: input.to_path_buf(),
        source,
    })?;
    let mut f_out = File::create(output).map_err(|source| HuffError::FileOpen {
        path: output.to_path_buf(),
        source,
    })?;
    info!("Read {} bytes from {}", data.len(), input.display());

    let decoded = decode_bytes(&data)?;
    f_out.write_all(&decoded)?;

    info!("Wrote {} bytes to {}", decoded.len(), output.display());
    Ok(DecodeReport {
        bytes_in: data.len(),
        bytes_out: decoded.len(),
        symbols: data.first().copied().unwrap_or(0) as usize,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::format::{encode_code_field, write_header};
    use crate::huffman_coding::code_table::Code;

    fn entry(symbol: u8, bits: u128, len: u8) -> SymbolEntry {
        SymbolEntry {
            symbol,
            code: Code::new(bits, len),
        }
    }

    #[test]
    fn rebuild_aaab_tree_test() {
        let root = rebuild_tree(&[entry(b'b', 0, 1), entry(b'a', 1, 1)])
            .unwrap()
            .unwrap();
        assert_eq!(root.leaf_count(), 2);
        assert!(matches!(root.child(false), Some(TreeNode::Leaf { symbol: b'b', .. })));
        assert!(matches!(root.child(true), Some(TreeNode::Leaf { symbol: b'a', .. })));
    }

    #[test]
    fn decode_aaab_test() {
        let mut data = Vec::new();
        write_header(&mut data, &[entry(b'b', 0, 1), entry(b'a', 1, 1)]);
        data.push(0b1110_0000);
        data.push(4);
        assert_eq!(decode_bytes(&data).unwrap(), b"aaab");
    }

    #[test]
    fn decode_empty_test() {
        assert!(decode_bytes(&[0, 0]).unwrap().is_empty());
        assert!(decode_bytes(&[0, 0x55, 0]).is_err());
    }

    #[test]
    fn conflicting_codes_test() {
        // "0" and "01": the second runs through the first one's leaf.
        assert!(rebuild_tree(&[entry(b'x', 0, 1), entry(b'y', 0b01, 2)]).is_err());
        // "01" then "0": the second lands on an internal node.
        assert!(rebuild_tree(&[entry(b'y', 0b01, 2), entry(b'x', 0, 1)]).is_err());
        // Same code twice.
        assert!(rebuild_tree(&[entry(b'x', 1, 1), entry(b'y', 1, 1)]).is_err());
        // Same symbol twice.
        assert!(rebuild_tree(&[entry(b'x', 1, 1), entry(b'x', 0, 1)]).is_err());
        // Empty code.
        assert!(rebuild_tree(&[entry(b'x', 0, 0)]).is_err());
    }

    #[test]
    fn unfinished_code_test() {
        // Codes a = "00", b = "01", c = "1"; payload "000" stops inside a code.
        let mut data = Vec::new();
        write_header(
            &mut data,
            &[entry(b'a', 0b00, 2), entry(b'b', 0b01, 2), entry(b'c', 1, 1)],
        );
        data.push(0b0000_0000);
        data.push(5);
        assert!(matches!(decode_bytes(&data), Err(HuffError::Format(_))));
    }

    #[test]
    fn missing_branch_test() {
        // Only "00" exists; a 1 bit has nowhere to go.
        let mut data = vec![1_u8, b'a'];
        data.extend_from_slice(&encode_code_field(&Code::new(0, 2)));
        data.push(0b0010_0000);
        data.push(5);
        assert!(matches!(decode_bytes(&data), Err(HuffError::Format(_))));
    }

    #[test]
    fn truncated_file_test() {
        let mut data = Vec::new();
        write_header(&mut data, &[entry(b'b', 0, 1), entry(b'a', 1, 1)]);
        data.push(0b1110_0000);
        data.push(4);
        for len in 0..data.len() - 1 {
            assert!(decode_bytes(&data[..len]).is_err(), "length {}", len);
        }
    }

    #[test]
    fn missing_input_file_test() {
        let err = decode_file(
            Path::new("/nonexistent/definitely/not/here.huff"),
            Path::new("/tmp/never_written.txt"),
        )
        .unwrap_err();
        assert!(matches!(err, HuffError::FileOpen { .. }));
    }
}
