//! Byte source with a bounded pushback window
//!
//! The sync engine reads ahead to validate a candidate frame and has to give
//! the bytes back when the candidate is rejected. [`ByteCursor`] wraps any
//! [`std::io::Read`] and serves pushed-back bytes before touching the source.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::error::FramerError;
use crate::Result;

/// Buffered byte source supporting `unread`
pub struct ByteCursor<R> {
    /// `None` once the cursor has been closed
    source: Option<R>,
    /// Bytes returned to the stream, front is read first
    pushback: VecDeque<u8>,
    capacity: usize,
    /// Absolute offset of the next byte to be read
    position: u64,
}

impl<R: Read> ByteCursor<R> {
    /// Wrap `source` with a pushback window of `capacity` bytes
    pub fn new(source: R, capacity: usize) -> Self {
        Self {
            source: Some(source),
            pushback: VecDeque::with_capacity(capacity),
            capacity,
            position: 0,
        }
    }

    /// Fill `buf` from the pushback window, then from the source
    ///
    /// Returns the number of bytes read. A count shorter than `buf.len()`
    /// means the end of the stream was reached.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let source = self.source.as_mut().ok_or(FramerError::StreamClosed)?;

        let mut filled = 0;
        while filled < buf.len() {
            match self.pushback.pop_front() {
                Some(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }

        while filled < buf.len() {
            match source.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FramerError::Io(e)),
            }
        }

        self.position += filled as u64;
        Ok(filled)
    }

    /// Read a single byte, `None` at end of stream
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Return `bytes` to the front of the stream
    ///
    /// The next `read` of `bytes.len()` bytes yields exactly `bytes`.
    pub fn unread(&mut self, bytes: &[u8]) -> Result<()> {
        if self.source.is_none() {
            return Err(FramerError::StreamClosed);
        }
        if self.pushback.len() + bytes.len() > self.capacity {
            return Err(FramerError::PushbackOverflow {
                requested: bytes.len(),
                used: self.pushback.len(),
                capacity: self.capacity,
            });
        }

        for &byte in bytes.iter().rev() {
            self.pushback.push_front(byte);
        }
        self.position = self.position.saturating_sub(bytes.len() as u64);
        Ok(())
    }

    /// Absolute offset of the next byte to be read
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes currently held in the pushback window
    pub fn pushback_len(&self) -> usize {
        self.pushback.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop the source. Later reads and unreads fail with [`FramerError::StreamClosed`].
    pub fn close(&mut self) {
        self.source = None;
        self.pushback.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }
}
