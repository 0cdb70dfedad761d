//! Bit-level reading of frame data
//!
//! Frame bytes are packed into big-endian 32-bit cells by [`WordBuffer`] and
//! consumed MSB first by [`BitReader`]. A single read extracts at most 17 bits;
//! reads that straddle two cells combine the low half of the current cell with
//! the high half of the next one.

use crate::error::{HeaderError, HeaderResult};
use crate::tables::{BITMASK, MAX_READ_BITS};

/// Reusable arena of packed 32-bit cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBuffer {
    words: Vec<u32>,
    bit_len: usize,
}

impl WordBuffer {
    /// Create an arena able to hold `bytes` bytes without reallocating
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            words: Vec::with_capacity(bytes.div_ceil(4)),
            bit_len: 0,
        }
    }

    /// Replace the contents with `bytes`, zero-padding the last cell
    pub fn pack(&mut self, bytes: &[u8]) {
        self.words.clear();
        self.words.extend(bytes.chunks(4).map(|chunk| {
            let mut cell = [0u8; 4];
            cell[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(cell)
        }));
        self.bit_len = bytes.len() * 8;
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of meaningful bits, excluding the padding of the last cell
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Reader positioned at the first bit
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(&self.words, self.bit_len)
    }
}

/// MSB-first reader over packed 32-bit cells
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    words: &'a [u32],
    /// Index of the current cell
    word_index: usize,
    /// Bits already consumed from the current cell, always below 32
    bit_index: u32,
    bit_len: usize,
}

impl<'a> BitReader<'a> {
    /// Read at most `bit_len` bits of `words`
    pub fn new(words: &'a [u32], bit_len: usize) -> Self {
        Self {
            words,
            word_index: 0,
            bit_index: 0,
            bit_len: bit_len.min(words.len() * 32),
        }
    }

    /// Read `n` bits, `n` in `1..=17`
    pub fn read_bits(&mut self, n: u32) -> HeaderResult<u32> {
        if n == 0 || n > MAX_READ_BITS {
            return Err(HeaderError::InvalidBitWidth(n));
        }
        self.ensure(n)?;

        let mask = BITMASK[n as usize];
        let sum = self.bit_index + n;
        let current = self.words[self.word_index];

        if sum <= 32 {
            let value = (current >> (32 - sum)) & mask;
            if sum == 32 {
                self.word_index += 1;
                self.bit_index = 0;
            } else {
                self.bit_index = sum;
            }
            return Ok(value);
        }

        // sum > 32 implies bit_index >= 16, so the window below covers the read
        let next = self.words.get(self.word_index + 1).copied().unwrap_or(0);
        let window = ((current & 0xFFFF) << 16) | (next >> 16);
        let value = (window >> (48 - sum)) & mask;
        self.word_index += 1;
        self.bit_index = sum - 32;
        Ok(value)
    }

    pub fn read_bit(&mut self) -> HeaderResult<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Read up to 64 bits as a sequence of narrow reads
    pub fn read_bits_u64(&mut self, n: u32) -> HeaderResult<u64> {
        if n == 0 || n > 64 {
            return Err(HeaderError::InvalidBitWidth(n));
        }
        self.ensure(n)?;

        let mut value = 0u64;
        let mut left = n;
        while left > 0 {
            let chunk = left.min(MAX_READ_BITS);
            value = (value << chunk) | self.read_bits(chunk)? as u64;
            left -= chunk;
        }
        Ok(value)
    }

    pub fn skip_bits(&mut self, n: usize) -> HeaderResult<()> {
        if n > self.remaining() {
            return Err(HeaderError::BufferExhausted {
                requested: n.min(u32::MAX as usize) as u32,
                remaining: self.remaining(),
            });
        }
        let target = self.position() + n;
        self.word_index = target / 32;
        self.bit_index = (target % 32) as u32;
        Ok(())
    }

    /// Bits consumed so far
    pub fn position(&self) -> usize {
        self.word_index * 32 + self.bit_index as usize
    }

    pub fn remaining(&self) -> usize {
        self.bit_len - self.position()
    }

    /// True when the reader sits on a byte boundary
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_index % 8 == 0
    }

    fn ensure(&self, n: u32) -> HeaderResult<()> {
        if n as usize > self.remaining() {
            return Err(HeaderError::BufferExhausted {
                requested: n,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }
}
