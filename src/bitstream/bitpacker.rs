use log::error;

use crate::huffman_coding::code_table::Code;

/// Largest slice of a code moved into the queue at once. With at most 7 bits
/// left over from the previous write the queue never exceeds 39 bits.
const CHUNK_BITS: u8 = 32;

/// Packs variable-length codes into bytes, most significant bit first.
pub struct BitPacker {
    pub output: Vec<u8>,
    queue: u64,
    q_bits: u8,
    total_bits: u64,
}

impl BitPacker {
    /// Create a new BitPacker with an output buffer of the size specified. Call
    /// flush() to push the last partial byte before reading the output.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            queue: 0,
            q_bits: 0,
            total_bits: 0,
        }
    }

    /// Move every complete byte from the queue to the output buffer.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte);
            self.q_bits -= 8;
        }
    }

    /// Put the low `depth` bits of `data` on the stream (depth <= 32).
    fn out_bits(&mut self, data: u32, depth: u8) {
        debug_assert!(depth <= CHUNK_BITS);
        if depth == 0 {
            return;
        }
        self.queue <<= depth;
        self.queue |= (data as u64) & (u64::MAX >> (64 - depth as u32));
        self.q_bits += depth;
        self.total_bits += depth as u64;
        self.write_stream();
    }

    /// Put a whole code on the stream, root-end bit first.
    pub fn out_code(&mut self, code: &Code) {
        let mut left = code.len();
        while left > 0 {
            let n = left.min(CHUNK_BITS);
            let chunk = (code.bits() >> (left - n)) as u32;
            self.out_bits(chunk, n);
            left -= n;
        }
    }

    /// Put a full byte on the stream.
    pub fn out8(&mut self, data: u8) {
        self.out_bits(data as u32, 8);
    }

    /// Zero-fill the last partial byte and push it out. Returns how many pad
    /// bits were added (0 when the stream was already byte aligned).
    pub fn flush(&mut self) -> u8 {
        let mut pad = 0;
        if self.q_bits > 0 {
            pad = 8 - self.q_bits;
            self.queue <<= pad;
            self.q_bits += pad;
            self.write_stream();
            if self.q_bits > 0 {
                error!("Stuff left in the BitPacker queue.");
            }
        }
        pad
    }

    /// Code bits written so far, not counting padding.
    pub fn bit_count(&self) -> u64 {
        self.total_bits
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        let bits = (self.output.len() * 8) + self.q_bits as usize;
        format!("[{}.{}]", bits / 8, bits % 8)
    }
}
