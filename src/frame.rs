//! Frame assembly
//!
//! [`FrameReader`] drives the whole pipeline for one stream: tag skip, sync,
//! CRC and side information slicing, and extraction of the main data.

use std::io::Read;

use log::debug;

use crate::bitstream::{BitReader, WordBuffer};
use crate::config::FramerConfig;
use crate::cursor::ByteCursor;
use crate::geometry::{samples_per_frame, FrameGeometry};
use crate::header::HeaderFields;
use crate::side_info::{self, SideInformation};
use crate::sync::{AcquiredFrame, SyncEngine, SyncState};
use crate::tag::skip_leading_tag;
use crate::types::MAX_FRAME_LENGTH;
use crate::Result;

/// One complete Layer III frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Stream offset of the first header byte
    pub offset: u64,
    pub header_word: u32,
    pub header: HeaderFields,
    pub geometry: FrameGeometry,
    /// Total frame length including the header
    pub frame_length: u32,
    /// Main data bytes in this frame
    pub slot_count: u32,
    /// Checksum following the header, read but not verified
    pub crc: Option<u16>,
    pub side_info: SideInformation,
    /// Main data: the frame bytes after header, CRC and side information
    pub payload: Vec<u8>,
}

impl Frame {
    /// Bit reader positioned at the first bit of main data
    ///
    /// The payload is packed into `words`, which can be reused across frames.
    pub fn main_data<'a>(&self, words: &'a mut WordBuffer) -> BitReader<'a> {
        words.pack(&self.payload);
        let words: &'a WordBuffer = words;
        words.reader()
    }

    pub fn bitrate_bps(&self) -> u32 {
        self.geometry.bitrate_bps
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.geometry.sample_rate_hz
    }

    /// PCM samples per channel decoded from this frame
    pub fn samples(&self) -> u32 {
        samples_per_frame(self.header.version, self.header.layer)
    }

    /// Stream offset one past the last byte of this frame
    pub fn end_offset(&self) -> u64 {
        self.offset + self.frame_length as u64
    }
}

/// Pull-based frame iterator over a byte source
pub struct FrameReader<R> {
    cursor: ByteCursor<R>,
    engine: SyncEngine,
    config: FramerConfig,
    tag_len: u64,
    /// Frame bytes after the header, reused across frames
    body: Vec<u8>,
    words: WordBuffer,
    frames_read: u64,
    failed: bool,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader with the default configuration
    pub fn new(source: R) -> Result<Self> {
        Self::with_config(source, FramerConfig::default())
    }

    /// Create a reader, skipping a leading ID3v2 tag if configured to
    pub fn with_config(source: R, config: FramerConfig) -> Result<Self> {
        config.validate()?;

        let mut cursor = ByteCursor::new(source, config.pushback_capacity);
        let tag_len = if config.skip_id3v2 {
            skip_leading_tag(&mut cursor, config.tag_size_decoding)?
        } else {
            0
        };
        let engine = SyncEngine::new(config.reject_invalid_padding, cursor.position());

        Ok(Self {
            cursor,
            engine,
            config,
            tag_len,
            body: Vec::with_capacity(MAX_FRAME_LENGTH),
            words: WordBuffer::with_capacity(MAX_FRAME_LENGTH),
            frames_read: 0,
            failed: false,
        })
    }

    /// Read the next frame, `Ok(None)` at end of stream
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(max) = self.config.max_frames {
            if self.frames_read >= max {
                return Ok(None);
            }
        }

        let acquired = match self.engine.next_frame(&mut self.cursor, &mut self.body)? {
            Some(acquired) => acquired,
            None => {
                debug!("End of stream after {} frames", self.frames_read);
                return Ok(None);
            }
        };

        let frame = self.assemble(acquired)?;
        self.frames_read += 1;
        Ok(Some(frame))
    }

    fn assemble(&mut self, acquired: AcquiredFrame) -> Result<Frame> {
        let AcquiredFrame {
            offset,
            header_word,
            header,
            geometry,
        } = acquired;

        self.words.pack(&self.body);
        let mut reader = self.words.reader();

        let crc = if header.has_crc() {
            Some(reader.read_bits(16)? as u16)
        } else {
            None
        };
        let side_info = side_info::parse(&mut reader, header.version, header.mode)?;

        let payload = self.body[reader.position() / 8..].to_vec();

        Ok(Frame {
            offset,
            header_word,
            header,
            geometry,
            frame_length: geometry.frame_length,
            slot_count: geometry.slot_count,
            crc,
            side_info,
            payload,
        })
    }

    /// Bytes consumed by the leading ID3v2 tag
    pub fn tag_len(&self) -> u64 {
        self.tag_len
    }

    pub fn sync_state(&self) -> &SyncState {
        self.engine.state()
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Stream offset of the next unread byte
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn config(&self) -> &FramerConfig {
        &self.config
    }

    /// Release the source. Later reads fail with [`crate::FramerError::StreamClosed`].
    pub fn close(&mut self) {
        self.cursor.close();
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    /// Yields frames until end of stream or the first error
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_frame() {
            Ok(frame) => frame.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
