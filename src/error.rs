//! Error types for the frame synchronizer
//!
//! This module defines all error types used throughout the framer,
//! separating recoverable header rejections from fatal stream failures.

use thiserror::Error;

use crate::types::Layer;

/// Main error type for the frame synchronizer
#[derive(Debug, Error)]
pub enum FramerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Header or bitstream errors that escaped candidate rejection
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    /// Underlying byte source failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source was closed while a read or unread was in progress
    #[error("Byte source has been closed")]
    StreamClosed,

    /// The pushback window cannot hold the bytes being returned to the stream
    #[error("Pushback overflow: {requested} bytes requested, {used} of {capacity} already in use")]
    PushbackOverflow {
        requested: usize,
        used: usize,
        capacity: usize,
    },

    /// The first header of the stream uses the reserved sample rate index
    #[error("Reserved sample rate index in first frame header at offset {offset}")]
    ReservedSampleRate { offset: u64 },
}

/// Header decoding and bit cursor errors
///
/// These are cheap to construct and compare, since the sync engine produces
/// and discards them for every rejected candidate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// Top 12 bits are not the sync pattern
    #[error("No sync pattern in header word {0:#010x}")]
    NoSync(u32),

    /// Layer bits are `00`
    #[error("Reserved layer")]
    ReservedLayer,

    /// Sample rate index is `11`
    #[error("Reserved sample rate index")]
    ReservedSampleRate,

    /// Padding bit set outside the 44.1 kHz family
    #[error("Padding bit set for sample rate index {sample_rate_index}")]
    InvalidPadding { sample_rate_index: u8 },

    /// Bitrate index 0, free format streams are not supported
    #[error("Free format bitrate is not supported")]
    FreeFormatBitrate,

    /// Bitrate index 15
    #[error("Reserved bitrate index")]
    ReservedBitrate,

    /// Only Layer III frames are assembled
    #[error("Unsupported layer: {0}")]
    UnsupportedLayer(Layer),

    /// Declared frame length cannot hold header, CRC and side information
    #[error("Frame length {frame_length} is too short for {required} bytes of header data")]
    FrameTooShort { frame_length: u32, required: u32 },

    /// Read past the declared end of a bit buffer
    #[error("Bit buffer exhausted: {requested} bits requested, {remaining} remaining")]
    BufferExhausted { requested: u32, remaining: usize },

    /// Bit width outside 1..=17 (or 1..=64 for wide reads)
    #[error("Invalid bit width: {0}")]
    InvalidBitWidth(u32),
}

/// Configuration validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The pushback window must hold the rollback of the longest Layer III candidate
    #[error("Pushback capacity {capacity} is below the minimum of {minimum} bytes")]
    PushbackCapacityTooSmall { capacity: usize, minimum: usize },

    /// A frame limit of zero would never yield anything
    #[error("Maximum frame count must be greater than zero")]
    ZeroFrameLimit,
}

/// Specialized result types for different modules
pub type HeaderResult<T> = std::result::Result<T, HeaderError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
