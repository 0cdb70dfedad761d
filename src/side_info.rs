//! Layer III side information
//!
//! The side information block sits between the header (and optional CRC) and
//! the main data. It is sliced structurally here: the fixed leading fields are
//! decoded, and each granule/channel block is kept as a raw bit slice for the
//! downstream decoder.

use crate::bitstream::BitReader;
use crate::error::HeaderResult;
use crate::types::{ChannelMode, MpegVersion, MAX_CHANNELS, MAX_GRANULES, SCFSI_BANDS};

#[cfg(feature = "diagnostics")]
use serde::Serialize;

/// Bits per granule/channel block in MPEG-1
const MPEG1_GRANULE_BITS: u32 = 59;
/// Bits per granule/channel block in MPEG-2 (wider scalefac_compress)
const MPEG2_GRANULE_BITS: u32 = 63;

/// Raw granule/channel block, right-aligned in `bits`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub struct GranuleSlice {
    pub bits: u64,
    pub len: u8,
}

impl GranuleSlice {
    /// Extract `width` bits starting `offset` bits from the MSB of the slice
    pub fn field(&self, offset: u32, width: u32) -> Option<u32> {
        let len = self.len as u32;
        if width == 0 || width > 32 || offset + width > len {
            return None;
        }
        let shifted = self.bits >> (len - offset - width);
        Some((shifted & ((1u64 << width) - 1)) as u32)
    }

    /// Bits of scale factors and Huffman data for this granule/channel
    pub fn part2_3_length(&self) -> Option<u32> {
        self.field(0, 12)
    }

    pub fn big_values(&self) -> Option<u32> {
        self.field(12, 9)
    }
}

/// Per-channel side information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub struct ChannelSideInfo {
    /// Scale factor selection information, always false for MPEG-2
    pub scfsi: [bool; SCFSI_BANDS],
    pub granules: [GranuleSlice; MAX_GRANULES],
}

/// Side information of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub struct SideInformation {
    /// Bit reservoir back-pointer in bytes
    pub main_data_begin: u32,
    pub private_bits: u32,
    pub channels: [ChannelSideInfo; MAX_CHANNELS],
    pub channel_count: usize,
    pub granule_count: usize,
}

impl SideInformation {
    /// Granule slices in bitstream order (granule-major)
    pub fn slices(&self) -> impl Iterator<Item = &GranuleSlice> + '_ {
        (0..self.granule_count).flat_map(move |gr| {
            self.channels[..self.channel_count]
                .iter()
                .map(move |channel| &channel.granules[gr])
        })
    }

    /// Total main data bits claimed by all granules
    pub fn part2_3_bits(&self) -> u32 {
        self.slices().filter_map(GranuleSlice::part2_3_length).sum()
    }
}

/// Parse the side information block at the reader's position
///
/// The reader must be positioned right after the header and optional CRC.
/// On success it is left on the first bit of main data.
pub fn parse(
    reader: &mut BitReader<'_>,
    version: MpegVersion,
    mode: ChannelMode,
) -> HeaderResult<SideInformation> {
    let channel_count = mode.channel_count();
    let granule_count = version.granules();
    let mono = mode.is_single_channel();

    let mut side_info = SideInformation {
        channel_count,
        granule_count,
        ..Default::default()
    };

    let granule_bits = match version {
        MpegVersion::Mpeg1 => {
            side_info.main_data_begin = reader.read_bits(9)?;
            side_info.private_bits = reader.read_bits(if mono { 5 } else { 3 })?;
            for channel in side_info.channels[..channel_count].iter_mut() {
                for band in channel.scfsi.iter_mut() {
                    *band = reader.read_bit()?;
                }
            }
            MPEG1_GRANULE_BITS
        }
        MpegVersion::Mpeg2 => {
            side_info.main_data_begin = reader.read_bits(8)?;
            side_info.private_bits = reader.read_bits(if mono { 1 } else { 2 })?;
            MPEG2_GRANULE_BITS
        }
    };

    for gr in 0..granule_count {
        for channel in side_info.channels[..channel_count].iter_mut() {
            channel.granules[gr] = GranuleSlice {
                bits: reader.read_bits_u64(granule_bits)?,
                len: granule_bits as u8,
            };
        }
    }

    Ok(side_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::WordBuffer;
    use crate::error::HeaderError;

    fn parse_bytes(
        bytes: &[u8],
        version: MpegVersion,
        mode: ChannelMode,
    ) -> (HeaderResult<SideInformation>, usize) {
        let mut buffer = WordBuffer::default();
        buffer.pack(bytes);
        let mut reader = buffer.reader();
        let result = parse(&mut reader, version, mode);
        (result, reader.position())
    }

    #[test]
    fn test_mono_main_data_begin() {
        let mut bytes = [0u8; 17];
        bytes[0] = 0x12;
        bytes[1] = 0x34;
        let (side_info, consumed) =
            parse_bytes(&bytes, MpegVersion::Mpeg1, ChannelMode::SingleChannel);
        let side_info = side_info.unwrap();
        assert_eq!(side_info.main_data_begin, 0x1234 >> 7);
        // Next five bits of the second byte
        assert_eq!(side_info.private_bits, (0x34 >> 2) & 0x1F);
        assert_eq!(consumed, 17 * 8);
    }

    #[test]
    fn test_block_sizes_match_side_info_lengths() {
        let bytes = [0xA5u8; 32];
        let cases = [
            (MpegVersion::Mpeg1, ChannelMode::SingleChannel, 17),
            (MpegVersion::Mpeg1, ChannelMode::Stereo, 32),
            (MpegVersion::Mpeg2, ChannelMode::SingleChannel, 9),
            (MpegVersion::Mpeg2, ChannelMode::JointStereo, 17),
        ];
        for (version, mode, len) in cases {
            let (result, consumed) = parse_bytes(&bytes[..len], version, mode);
            assert!(result.is_ok(), "{} {} should parse", version, mode);
            assert_eq!(consumed, len * 8, "{} {}", version, mode);
        }
    }

    #[test]
    fn test_scfsi_and_slices() {
        // MPEG-1 stereo: 9 + 3 bits, then scfsi 1010 for ch0 and 0101 for ch1
        let mut bytes = [0u8; 32];
        bytes[1] = 0x0A;
        bytes[2] = 0x50;
        let (side_info, _) = parse_bytes(&bytes, MpegVersion::Mpeg1, ChannelMode::Stereo);
        let side_info = side_info.unwrap();
        assert_eq!(side_info.channels[0].scfsi, [true, false, true, false]);
        assert_eq!(side_info.channels[1].scfsi, [false, true, false, true]);
        assert_eq!(side_info.slices().count(), 4);
        assert!(side_info.slices().all(|slice| slice.len == 59));
    }

    #[test]
    fn test_slice_fields() {
        let slice = GranuleSlice {
            bits: (0xABCu64 << 47) | (0x1F0 << 38),
            len: 59,
        };
        assert_eq!(slice.part2_3_length(), Some(0xABC));
        assert_eq!(slice.big_values(), Some(0x1F0));
        assert_eq!(slice.field(50, 10), None);
    }

    #[test]
    fn test_truncated_block() {
        let (result, _) = parse_bytes(&[0u8; 16], MpegVersion::Mpeg1, ChannelMode::SingleChannel);
        assert!(matches!(result, Err(HeaderError::BufferExhausted { .. })));
    }
}
