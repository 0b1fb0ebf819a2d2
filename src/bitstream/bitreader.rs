//! BitReader: reads the packed payload of a compressed file.
//!
//! Bits come out most significant first. The reader is told how many bits are
//! real, so the zero padding on the final byte is never returned.

const BIT_MASK: u8 = 0x80;

/// Reads bits from a byte slice, stopping after `limit` bits.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
    bit_index: u8,
    remaining: u64,
}

impl<'a> BitReader<'a> {
    /// Reader over `buffer` that yields `limit` bits (clamped to the buffer size).
    pub fn new(buffer: &'a [u8], limit: u64) -> Self {
        Self {
            buffer,
            cursor: 0,
            bit_index: 0,
            remaining: limit.min(buffer.len() as u64 * 8),
        }
    }

    /// Return Some(true) for a 1 bit, Some(false) for a 0, or None once the
    /// limit has been reached.
    pub fn bool_bit(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }
        let byte = *self.buffer.get(self.cursor)?;
        let bit = byte & (BIT_MASK >> self.bit_index) != 0;
        self.bit_index += 1;
        if self.bit_index == 8 {
            self.bit_index = 0;
            self.cursor += 1;
        }
        self.remaining -= 1;
        Some(bit)
    }

    /// Bits still to be read.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.bit_index)
    }
}

#[cfg(test)]
mod test {
    use super::BitReader;

    #[test]
    fn basic_test() {
        let x = [0b10000001_u8];
        let mut br = BitReader::new(&x, 8);
        assert_eq!(br.bool_bit(), Some(true));
        for _ in 0..6 {
            assert_eq!(br.bool_bit(), Some(false));
        }
        assert_eq!(br.bool_bit(), Some(true));
        assert_eq!(br.bool_bit(), None);
    }

    #[test]
    fn limit_test() {
        let x = [0xff_u8, 0b1010_0000];
        let mut br = BitReader::new(&x, 11);
        for _ in 0..8 {
            assert_eq!(br.bool_bit(), Some(true));
        }
        assert_eq!(br.loc(), "[1.0]");
        assert_eq!(br.bool_bit(), Some(true));
        assert_eq!(br.bool_bit(), Some(false));
        assert_eq!(br.remaining(), 1);
        assert_eq!(br.bool_bit(), Some(true));
        assert_eq!(br.bool_bit(), None);
        assert_eq!(br.loc(), "[1.3]");
    }

    #[test]
    fn limit_clamped_to_buffer_test() {
        let x = [0_u8];
        let mut br = BitReader::new(&x, 1000);
        assert_eq!(br.remaining(), 8);
        for _ in 0..8 {
            assert_eq!(br.bool_bit(), Some(false));
        }
        assert_eq!(br.bool_bit(), None);
    }

    #[test]
    fn empty_test() {
        let mut br = BitReader::new(&[], 0);
        assert_eq!(br.bool_bit(), None);
    }
}
