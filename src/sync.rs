//! Frame synchronization
//!
//! The engine locates frame boundaries in an untrusted byte stream. A
//! scanned candidate header is only trusted once the frame it describes is
//! followed by another header with the same signature. The first confirmed
//! frame locks a template that every later header must match. Once locked,
//! headers read in place only need to match the template; a frame followed by
//! anything else is still returned and the engine scans from its end.
//!
//! ```text
//! InitialSync --(confirmed frame)--> StrictSync
//!                                     |    ^
//!                           mismatch  v    | confirmed frame
//!                                   resyncing (byte scan, template kept)
//! ```

use std::io::Read;

use log::{debug, info, trace, warn};

use crate::cursor::ByteCursor;
use crate::error::{FramerError, HeaderError, HeaderResult};
use crate::geometry::FrameGeometry;
use crate::header::{decode, decode_unchecked_padding, has_sync, HeaderFields};
use crate::types::HEADER_LEN;
use crate::Result;

/// Header bits compared against the locked template: sync, version and sample rate
pub const TEMPLATE_MASK: u32 = 0xFFF8_0C00;
/// Channel mode bits
const MODE_MASK: u32 = 0x0000_00C0;

/// Synchronization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Scanning for the first confirmed frame
    InitialSync,
    /// Template locked, headers are read in place
    StrictSync,
}

/// Per-stream synchronization state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncState {
    pub mode: SyncMode,
    /// Locked header bits, see [`TEMPLATE_MASK`]
    pub template: u32,
    pub single_channel_locked: bool,
}

impl SyncState {
    pub fn new() -> Self {
        Self {
            mode: SyncMode::InitialSync,
            template: 0,
            single_channel_locked: false,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.mode == SyncMode::StrictSync
    }

    /// True if `word` carries the locked signature. Always true before locking.
    pub fn matches(&self, word: u32) -> bool {
        !self.is_locked()
            || ((word & TEMPLATE_MASK) == self.template
                && is_single_channel_word(word) == self.single_channel_locked)
    }

    fn lock(&mut self, word: u32) {
        // Mode bits are cleared from the template, only their class is kept
        self.template = word & 0xFFF8_0CC0 & !MODE_MASK;
        self.single_channel_locked = is_single_channel_word(word);
        self.mode = SyncMode::StrictSync;
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn is_single_channel_word(word: u32) -> bool {
    word & MODE_MASK == MODE_MASK
}

/// True if two header words share version, sample rate and channel class
pub fn same_signature(a: u32, b: u32) -> bool {
    (a & TEMPLATE_MASK) == (b & TEMPLATE_MASK)
        && is_single_channel_word(a) == is_single_channel_word(b)
}

/// A frame whose boundaries have been validated
///
/// The bytes following the header are left in the body buffer passed to
/// [`SyncEngine::next_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquiredFrame {
    /// Stream offset of the first header byte
    pub offset: u64,
    pub header_word: u32,
    pub header: HeaderFields,
    pub geometry: FrameGeometry,
}

/// Frame boundary detector for one stream
#[derive(Debug, Clone)]
pub struct SyncEngine {
    state: SyncState,
    reject_invalid_padding: bool,
    /// Offset of the first byte after any leading tag
    stream_start: u64,
    frames_accepted: u64,
    /// Sync was lost after locking; scan until a confirmed frame
    resyncing: bool,
}

impl SyncEngine {
    /// Create an engine for a stream whose audio starts at `stream_start`
    pub fn new(reject_invalid_padding: bool, stream_start: u64) -> Self {
        Self {
            state: SyncState::new(),
            reject_invalid_padding,
            stream_start,
            frames_accepted: 0,
            resyncing: false,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn frames_accepted(&self) -> u64 {
        self.frames_accepted
    }

    /// True while scanning for a frame after losing a locked stream
    pub fn is_resyncing(&self) -> bool {
        self.resyncing
    }

    /// Acquire the next frame
    ///
    /// On success the `frame_length - 4` bytes after the header are in `body`.
    /// Returns `Ok(None)` at end of stream.
    pub fn next_frame<R: Read>(
        &mut self,
        cursor: &mut ByteCursor<R>,
        body: &mut Vec<u8>,
    ) -> Result<Option<AcquiredFrame>> {
        loop {
            let direct = self.state.is_locked() && !self.resyncing;
            let candidate = if direct {
                Self::read_in_place(cursor)?
            } else {
                Self::scan(cursor)?
            };
            let (offset, word) = match candidate {
                Some(candidate) => candidate,
                None => return Ok(None),
            };

            if direct && !(has_sync(word) && self.state.matches(word)) {
                self.lose_sync(offset, word);
                Self::roll_back(cursor, word, &[])?;
                continue;
            }

            let (header, geometry) = match self.evaluate(word, offset)? {
                Some(accepted) => accepted,
                None => {
                    if direct {
                        self.lose_sync(offset, word);
                    }
                    Self::roll_back(cursor, word, &[])?;
                    continue;
                }
            };

            body.clear();
            body.resize(geometry.body_len(), 0);
            let read = cursor.read(body)?;
            if read < body.len() {
                debug!(
                    "Frame at offset {} declares {} bytes but the stream ends after {}",
                    offset,
                    geometry.frame_length,
                    read + HEADER_LEN
                );
                Self::roll_back(cursor, word, &body[..read])?;
                continue;
            }

            let mut next = [0u8; HEADER_LEN];
            let peeked = cursor.read(&mut next)?;
            cursor.unread(&next[..peeked])?;

            if peeked == HEADER_LEN {
                let next_word = u32::from_be_bytes(next);
                if !self.confirms(word, next_word) {
                    debug!(
                        "Frame at offset {} is followed by inconsistent header {:#010x}",
                        offset, next_word
                    );
                    if direct {
                        // The header matched the template in place, keep the
                        // frame and scan from its end
                        self.lose_sync(offset + geometry.frame_length as u64, next_word);
                        self.frames_accepted += 1;
                        return Ok(Some(AcquiredFrame {
                            offset,
                            header_word: word,
                            header,
                            geometry,
                        }));
                    }
                    Self::roll_back(cursor, word, &body[..])?;
                    continue;
                }

                if !self.state.is_locked() {
                    self.state.lock(word);
                    info!(
                        "Locked onto {} {} {} Hz stream at offset {}",
                        header.version, header.layer, geometry.sample_rate_hz, offset
                    );
                } else if self.resyncing {
                    self.resyncing = false;
                    debug!("Regained sync at offset {}", offset);
                }
            } else {
                trace!("Stream ends after frame at offset {}", offset);
            }

            self.frames_accepted += 1;
            return Ok(Some(AcquiredFrame {
                offset,
                header_word: word,
                header,
                geometry,
            }));
        }
    }

    /// Read the header word at the current position
    fn read_in_place<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Option<(u64, u32)>> {
        let offset = cursor.position();
        let mut bytes = [0u8; HEADER_LEN];
        let read = cursor.read(&mut bytes)?;
        if read < HEADER_LEN {
            if read > 0 {
                debug!("Discarding {} trailing bytes at offset {}", read, offset);
            }
            return Ok(None);
        }
        Ok(Some((offset, u32::from_be_bytes(bytes))))
    }

    /// Slide a 32-bit window over the stream until it holds a sync pattern
    fn scan<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Option<(u64, u32)>> {
        let mut window = 0u32;
        let mut filled = 0usize;
        loop {
            let byte = match cursor.read_byte()? {
                Some(byte) => byte,
                None => return Ok(None),
            };
            window = (window << 8) | byte as u32;
            filled += 1;
            if filled < HEADER_LEN {
                continue;
            }

            let offset = cursor.position() - HEADER_LEN as u64;
            if has_sync(window) {
                return Ok(Some((offset, window)));
            }
            trace!("No sync at offset {}", offset);
        }
    }

    fn decode(&self, word: u32) -> HeaderResult<HeaderFields> {
        if self.reject_invalid_padding {
            decode(word)
        } else {
            decode_unchecked_padding(word)
        }
    }

    /// Decide whether a sync-bearing word starts a frame
    ///
    /// `Ok(None)` rejects the candidate. A reserved sample rate in the first
    /// header of the stream is fatal.
    fn evaluate(&self, word: u32, offset: u64) -> Result<Option<(HeaderFields, FrameGeometry)>> {
        let header = match self.decode(word) {
            Ok(header) => header,
            Err(HeaderError::ReservedSampleRate)
                if offset == self.stream_start && self.frames_accepted == 0 =>
            {
                return Err(FramerError::ReservedSampleRate { offset });
            }
            Err(e) => {
                debug!("Rejected header {:#010x} at offset {}: {}", word, offset, e);
                return Ok(None);
            }
        };

        if !self.state.matches(word) {
            debug!(
                "Rejected header {:#010x} at offset {}: does not match template {:#010x}",
                word, offset, self.state.template
            );
            return Ok(None);
        }

        match FrameGeometry::from_header(&header) {
            Ok(geometry) => Ok(Some((header, geometry))),
            Err(e) => {
                debug!("Rejected header {:#010x} at offset {}: {}", word, offset, e);
                Ok(None)
            }
        }
    }

    /// True if `next` is a valid header continuing the stream started by `word`
    fn confirms(&self, word: u32, next: u32) -> bool {
        self.decode(next).is_ok() && same_signature(word, next) && self.state.matches(next)
    }

    fn lose_sync(&mut self, offset: u64, word: u32) {
        if !self.resyncing {
            warn!("Lost sync at offset {} (header {:#010x})", offset, word);
            self.resyncing = true;
        }
    }

    /// Return a rejected candidate to the stream so scanning resumes one byte
    /// after its first header byte
    fn roll_back<R: Read>(cursor: &mut ByteCursor<R>, word: u32, body: &[u8]) -> Result<()> {
        cursor.unread(body)?;
        cursor.unread(&word.to_be_bytes()[1..])
    }
}
