//! Configuration management for the frame reader
//!
//! This module provides the configuration structure and validation logic
//! for stream tolerance, lookahead sizing and tag handling.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{HEADER_LEN, MAX_FRAME_LENGTH, MAX_LAYER3_FRAME_LENGTH};

/// Smallest usable pushback window
///
/// Rejecting a candidate after peeking past its body returns the body, the
/// peeked header and three of its own header bytes to the stream.
pub const MIN_PUSHBACK_CAPACITY: usize = MAX_LAYER3_FRAME_LENGTH + HEADER_LEN - 1;

/// How the 4-byte ID3v2 tag size field is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSizeDecoding {
    /// 7 bits per byte: `b0 << 21 | b1 << 14 | b2 << 7 | b3`
    Synchsafe,
    /// Plain big-endian integer: `b0 << 24 | b1 << 16 | b2 << 8 | b3`.
    /// Only useful for byte compatibility with tools that mis-decode the field.
    PlainBigEndian,
}

/// Main configuration structure for the frame reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramerConfig {
    /// Capacity in bytes of the pushback window used to roll back rejected candidates
    pub pushback_capacity: usize,
    /// Reject headers with the padding bit set outside the 44.1 kHz family
    pub reject_invalid_padding: bool,
    /// Skip a leading ID3v2 tag before synchronizing
    pub skip_id3v2: bool,
    /// Interpretation of the ID3v2 size field
    pub tag_size_decoding: TagSizeDecoding,
    /// Stop after this many frames
    pub max_frames: Option<u64>,
}

impl FramerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pushback window capacity
    pub fn pushback_capacity(mut self, capacity: usize) -> Self {
        self.pushback_capacity = capacity;
        self
    }

    /// Set whether invalid padding rejects a candidate
    pub fn reject_invalid_padding(mut self, reject: bool) -> Self {
        self.reject_invalid_padding = reject;
        self
    }

    /// Set whether a leading ID3v2 tag is skipped
    pub fn skip_id3v2(mut self, skip: bool) -> Self {
        self.skip_id3v2 = skip;
        self
    }

    /// Set the ID3v2 size decoding
    pub fn tag_size_decoding(mut self, decoding: TagSizeDecoding) -> Self {
        self.tag_size_decoding = decoding;
        self
    }

    /// Limit the number of frames yielded
    pub fn max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.pushback_capacity < MIN_PUSHBACK_CAPACITY {
            return Err(ConfigError::PushbackCapacityTooSmall {
                capacity: self.pushback_capacity,
                minimum: MIN_PUSHBACK_CAPACITY,
            });
        }

        if self.max_frames == Some(0) {
            return Err(ConfigError::ZeroFrameLimit);
        }

        Ok(())
    }
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            pushback_capacity: MAX_FRAME_LENGTH,
            reject_invalid_padding: true,
            skip_id3v2: true,
            tag_size_decoding: TagSizeDecoding::Synchsafe,
            max_frames: None,
        }
    }
}
