//! # MP3 Frame Synchronizer
//!
//! A pure Rust MPEG-1/2 Layer III frame synchronizer. This library locates
//! frame boundaries in an untrusted byte stream, decodes frame headers,
//! computes frame geometry, slices the side information and exposes the
//! main data through a bit reader for downstream decoding.
//!
//! ```no_run
//! use std::fs::File;
//! use mp3_framer::FrameReader;
//!
//! # fn main() -> mp3_framer::Result<()> {
//! let reader = FrameReader::new(File::open("audio.mp3")?)?;
//! for frame in reader {
//!     let frame = frame?;
//!     println!("{} bytes at offset {}", frame.frame_length, frame.offset);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bitstream;
pub mod config;
pub mod cursor;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod header;
pub mod side_info;
pub mod stats;
pub mod sync;
pub mod tables;
pub mod tag;
pub mod types;

pub use bitstream::{BitReader, WordBuffer};
pub use config::{FramerConfig, TagSizeDecoding, MIN_PUSHBACK_CAPACITY};
pub use cursor::ByteCursor;
pub use error::{ConfigError, FramerError, HeaderError};
pub use frame::{Frame, FrameReader};
pub use geometry::FrameGeometry;
pub use header::HeaderFields;
pub use side_info::{ChannelSideInfo, GranuleSlice, SideInformation};
pub use stats::StreamStats;
pub use sync::{SyncMode, SyncState};
pub use types::{ChannelMode, Emphasis, Layer, MpegVersion};

#[cfg(feature = "diagnostics")]
pub use stats::{FrameRecord, StreamReport};

/// Result type for stream operations
pub type Result<T> = std::result::Result<T, FramerError>;

#[cfg(test)]
mod tests;
