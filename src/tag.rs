//! Leading ID3v2 tag skipping
//!
//! Only the 10-byte tag header is interpreted: enough to know how many bytes
//! to skip before the first audio frame. Tag contents are discarded.

use std::io::Read;

use log::debug;

use crate::config::TagSizeDecoding;
use crate::cursor::ByteCursor;
use crate::Result;

/// Length of the ID3v2 tag header, and of the optional v2.4 footer
pub const TAG_HEADER_LEN: usize = 10;

const TAG_MARKER: &[u8; 3] = b"ID3";
const FOOTER_FLAG: u8 = 0x10;
const SKIP_CHUNK: usize = 4096;

/// Parsed ID3v2 tag header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub major_version: u8,
    pub minor_version: u8,
    pub flags: u8,
    /// Size of the tag body, excluding header and footer
    pub size: u32,
}

impl TagHeader {
    /// Parse a 10-byte tag header, `None` if it is not a supported ID3v2 header
    pub fn parse(bytes: &[u8; TAG_HEADER_LEN], decoding: TagSizeDecoding) -> Option<Self> {
        if &bytes[..3] != TAG_MARKER {
            return None;
        }

        let major_version = bytes[3];
        let minor_version = bytes[4];
        if major_version == 0xFF || minor_version == 0xFF {
            return None;
        }
        if !(2..=4).contains(&major_version) {
            return None;
        }

        let size = decode_size(&bytes[6..10], decoding)?;
        Some(Self {
            major_version,
            minor_version,
            flags: bytes[5],
            size,
        })
    }

    pub fn has_footer(&self) -> bool {
        self.major_version == 4 && self.flags & FOOTER_FLAG != 0
    }

    /// Bytes occupied by the whole tag, header and footer included
    pub fn total_len(&self) -> u64 {
        let footer = if self.has_footer() { TAG_HEADER_LEN } else { 0 };
        (TAG_HEADER_LEN + footer) as u64 + self.size as u64
    }
}

/// Decode the 4-byte size field
///
/// A synchsafe size with any high bit set is malformed.
pub fn decode_size(bytes: &[u8], decoding: TagSizeDecoding) -> Option<u32> {
    match decoding {
        TagSizeDecoding::Synchsafe => bytes.iter().try_fold(0u32, |size, &b| {
            if b & 0x80 != 0 {
                None
            } else {
                Some((size << 7) | b as u32)
            }
        }),
        TagSizeDecoding::PlainBigEndian => {
            Some(bytes.iter().fold(0u32, |size, &b| (size << 8) | b as u32))
        }
    }
}

/// Skip an ID3v2 tag at the cursor's position
///
/// Returns the number of bytes consumed, 0 when there is no tag. When the
/// stream ends inside the tag, the bytes actually consumed are returned.
pub fn skip_leading_tag<R: Read>(
    cursor: &mut ByteCursor<R>,
    decoding: TagSizeDecoding,
) -> Result<u64> {
    let mut marker = [0u8; 3];
    let n = cursor.read(&mut marker)?;
    if n < marker.len() || &marker != TAG_MARKER {
        cursor.unread(&marker[..n])?;
        return Ok(0);
    }

    let mut bytes = [0u8; TAG_HEADER_LEN];
    bytes[..3].copy_from_slice(&marker);
    let n = 3 + cursor.read(&mut bytes[3..])?;

    let parsed = if n == TAG_HEADER_LEN {
        TagHeader::parse(&bytes, decoding)
    } else {
        None
    };
    let header = match parsed {
        Some(header) => header,
        None => {
            debug!("Ignoring malformed ID3v2 header");
            cursor.unread(&bytes[..n])?;
            return Ok(0);
        }
    };

    let total = header.total_len();
    let mut left = total - TAG_HEADER_LEN as u64;
    let mut scratch = [0u8; SKIP_CHUNK];
    while left > 0 {
        let chunk = left.min(SKIP_CHUNK as u64) as usize;
        let read = cursor.read(&mut scratch[..chunk])?;
        left -= read as u64;
        if read < chunk {
            debug!("Stream ended inside ID3v2 tag, {} bytes missing", left);
            return Ok(total - left);
        }
    }

    debug!(
        "Skipped ID3v2.{}.{} tag of {} bytes",
        header.major_version, header.minor_version, total
    );
    Ok(total)
}
