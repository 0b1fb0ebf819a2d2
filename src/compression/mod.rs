//! The compression module holds both directions of the codec and the file
//! format between them.
//!
//! Encoding happens in these steps:
//! - Frequency count: tally each of the 128 symbols, one pool task per shard of
//!   the symbol range.
//! - Tree build: merge the two lightest nodes until one root remains.
//! - Code assignment: walk the tree on the pool and wait for the table.
//! - Serialize: symbol count, one 17-byte row per symbol, the packed payload,
//!   and the pad count.
//!
//! Decoding reads the symbol table back into a tree, then walks that tree one
//! payload bit at a time.
//!

pub mod compress;
pub mod decompress;
pub mod format;

#[cfg(test)]
mod test {
    use std::fs;
    use std::sync::Arc;

    use rand::{Rng, SeedableRng};
    use tempdir::TempDir;

    use super::compress::{encode_bytes, encode_file};
    use super::decompress::{decode_bytes, decode_file};
    use super::format::file_len;
    use crate::huffman_coding::code_table::assign_codes;
    use crate::huffman_coding::huffman::build_tree;
    use crate::tools::freq_count::FrequencyTable;
    use crate::tools::int_gen::int_gen;
    use crate::tools::worker_pool::WorkerPool;

    fn round_trip(data: &[u8], pool: &WorkerPool) -> Vec<u8> {
        let encoded = encode_bytes(Arc::from(data), pool, 2).unwrap();
        decode_bytes(&encoded.bytes).unwrap()
    }

    #[test]
    fn aaab_round_trip_test() {
        let pool = WorkerPool::new(2);
        assert_eq!(round_trip(b"aaab", &pool), b"aaab");
    }

    #[test]
    fn degenerate_round_trip_test() {
        let pool = WorkerPool::new(2);
        assert!(round_trip(&[], &pool).is_empty());
        assert_eq!(round_trip(b"x", &pool), b"x");
        assert_eq!(round_trip(&[0; 1000], &pool), vec![0; 1000]);
        assert_eq!(round_trip(&[127; 9], &pool), vec![127; 9]);
    }

    #[test]
    fn random_round_trip_test() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        let pool = WorkerPool::new(4);
        for _ in 0..40 {
            let len = rng.gen_range(0, 5000);
            let alphabet = rng.gen_range(1, 129);
            let data = (0..len)
                .map(|_| rng.gen_range(0, alphabet) as u8)
                .collect::<Vec<_>>();
            assert_eq!(round_trip(&data, &pool), data);
        }
    }

    #[test]
    fn full_alphabet_round_trip_test() {
        let pool = WorkerPool::new(3);
        let data = (0..128_u8).cycle().take(10_000).collect::<Vec<_>>();
        assert_eq!(round_trip(&data, &pool), data);
    }

    #[test]
    fn deep_tree_round_trip_test() {
        // Fibonacci-like counts give codes far longer than a byte.
        let mut data = Vec::new();
        let (mut a, mut b) = (1_usize, 1_usize);
        for symbol in 0..24_u8 {
            data.extend(std::iter::repeat(b'A' + symbol).take(a));
            let next = a + b;
            a = b;
            b = next;
        }
        let freqs = FrequencyTable::from_bytes(&data).unwrap();
        let longest = assign_codes(&build_tree(&freqs).unwrap())
            .iter()
            .map(|(_, c)| c.len())
            .max()
            .unwrap();
        assert!(longest >= 20);

        let pool = WorkerPool::new(2);
        assert_eq!(round_trip(&data, &pool), data);
    }

    #[test]
    fn skewed_input_compresses_test() {
        let mut data = Vec::new();
        int_gen(&mut data, 1_000_000).unwrap();
        let pool = WorkerPool::with_available_parallelism();
        let encoded = encode_bytes(Arc::from(&data[..]), &pool, 2).unwrap();
        assert!(encoded.bytes.len() < data.len());
        assert_eq!(
            encoded.bytes.len() as u64,
            file_len(encoded.symbols, encoded.payload_bits)
        );
        assert_eq!(decode_bytes(&encoded.bytes).unwrap(), data);
    }

    #[test]
    fn cycling_bytes_compress_test() {
        let data = (1..=100_u8).cycle().take(1_000_000).collect::<Vec<_>>();
        let pool = WorkerPool::new(2);
        let encoded = encode_bytes(Arc::from(&data[..]), &pool, 2).unwrap();
        assert!(encoded.bytes.len() < data.len());
    }

    #[test]
    fn file_round_trip_test() {
        let dir = TempDir::new("huffpool").unwrap();
        let original = dir.path().join("original.txt");
        let compressed = dir.path().join("original.huff");
        let restored = dir.path().join("restored.txt");

        let text = "The quick brown fox jumps over the lazy dog.\n".repeat(200);
        fs::write(&original, &text).unwrap();

        let pool = WorkerPool::new(2);
        let enc = encode_file(&original, &compressed, &pool, 2).unwrap();
        assert_eq!(enc.bytes_in, text.len());
        assert_eq!(enc.bytes_out as u64, fs::metadata(&compressed).unwrap().len());
        assert!(enc.bytes_out < enc.bytes_in);

        let dec = decode_file(&compressed, &restored).unwrap();
        assert_eq!(dec.bytes_out, text.len());
        assert_eq!(dec.symbols, enc.symbols);
        assert_eq!(fs::read(&restored).unwrap(), text.as_bytes());
    }

    #[test]
    fn unwritable_output_test() {
        let dir = TempDir::new("huffpool").unwrap();
        let original = dir.path().join("in.txt");
        fs::write(&original, "abc").unwrap();
        let pool = WorkerPool::new(1);
        let missing_dir = dir.path().join("no_such_dir").join("out.huff");
        assert!(encode_file(&original, &missing_dir, &pool, 2).is_err());
    }

    #[test]
    fn pool_shared_across_sessions_test() {
        let pool = WorkerPool::new(2);
        for text in ["first", "second session", "", "z"] {
            assert_eq!(round_trip(text.as_bytes(), &pool), text.as_bytes());
        }
    }
}
