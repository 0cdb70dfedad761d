//! Frame size arithmetic
//!
//! Implements the frame length formula of ISO/IEC 11172-3 section 2.4.3.1
//! together with the Layer III side information and slot accounting:
//!
//! ```text
//! frame_length = floor(144 * bitrate / sample_rate) + padding      (MPEG-1 Layer III)
//! slot_count   = frame_length - side_info_len - crc_len - 4
//! ```

use lazy_static::lazy_static;

use crate::error::{HeaderError, HeaderResult};
use crate::header::HeaderFields;
use crate::tables::{get_bitrate_kbps, get_sample_rate, BITRATES_KBPS};
use crate::types::{ChannelMode, Layer, MpegVersion, CRC_LEN, HEADER_LEN};

#[cfg(feature = "diagnostics")]
use serde::Serialize;

/// Frame length coefficient for Layer II and MPEG-1 Layer III
const COEFF_144: u32 = 144;
/// Frame length coefficient for MPEG-2 Layer III (one granule per frame)
const COEFF_72: u32 = 72;

lazy_static! {
    /// Unpadded Layer III frame lengths indexed by `[version][sample_rate_index][bitrate_index]`.
    /// Free format and reserved bitrates hold 0.
    static ref LAYER3_FRAME_LENGTHS: [[[u32; 16]; 3]; 2] = {
        let mut table = [[[0u32; 16]; 3]; 2];
        for (v, version) in [MpegVersion::Mpeg1, MpegVersion::Mpeg2].into_iter().enumerate() {
            for sr in 0..3u8 {
                for br in 0..BITRATES_KBPS.len() as u8 {
                    if let (Some(bitrate), Some(sample_rate)) =
                        (bitrate_bps(version, Layer::Layer3, br), sample_rate_hz(version, sr))
                    {
                        table[v][sr as usize][br as usize] =
                            layer3_coefficient(version) * bitrate / sample_rate;
                    }
                }
            }
        }
        table
    };
}

fn layer3_coefficient(version: MpegVersion) -> u32 {
    match version {
        MpegVersion::Mpeg1 => COEFF_144,
        MpegVersion::Mpeg2 => COEFF_72,
    }
}

/// Bitrate in bits per second, `None` for free format or reserved indices
pub fn bitrate_bps(version: MpegVersion, layer: Layer, bitrate_index: u8) -> Option<u32> {
    get_bitrate_kbps(version, layer, bitrate_index).map(|kbps| kbps * 1000)
}

/// Sample rate in Hz, `None` for the reserved index
pub fn sample_rate_hz(version: MpegVersion, sample_rate_index: u8) -> Option<u32> {
    get_sample_rate(version, sample_rate_index)
}

/// MPEG-1 Layer III frame length in bytes
pub fn frame_length(bitrate_bps: u32, sample_rate_hz: u32, padding: bool) -> u32 {
    COEFF_144 * bitrate_bps / sample_rate_hz + padding as u32
}

/// Frame length in bytes for any layer and version
///
/// A slot is 4 bytes in Layer I and 1 byte otherwise.
pub fn frame_length_for(
    version: MpegVersion,
    layer: Layer,
    bitrate_bps: u32,
    sample_rate_hz: u32,
    padding: bool,
) -> u32 {
    match layer {
        Layer::Layer1 => (12 * bitrate_bps / sample_rate_hz + padding as u32) * 4,
        Layer::Layer3 if version == MpegVersion::Mpeg2 => {
            COEFF_72 * bitrate_bps / sample_rate_hz + padding as u32
        }
        _ => frame_length(bitrate_bps, sample_rate_hz, padding),
    }
}

/// Side information length in bytes for a Layer III frame
pub fn side_info_len(version: MpegVersion, mode: ChannelMode) -> u32 {
    match (version, mode.is_single_channel()) {
        (MpegVersion::Mpeg1, true) => 17,
        (MpegVersion::Mpeg1, false) => 32,
        (MpegVersion::Mpeg2, true) => 9,
        (MpegVersion::Mpeg2, false) => 17,
    }
}

/// PCM samples per channel carried by one frame
pub fn samples_per_frame(version: MpegVersion, layer: Layer) -> u32 {
    match (version, layer) {
        (_, Layer::Layer1) => 384,
        (MpegVersion::Mpeg2, Layer::Layer3) => 576,
        _ => 1152,
    }
}

/// Number of coded subbands
///
/// Depends on the layer, version, sample rate and bitrate per channel.
pub fn subband_count(header: &HeaderFields) -> u32 {
    if header.layer == Layer::Layer1 {
        return 32;
    }

    let mut channel_bitrate = header.bitrate_index as u32;
    if header.mode != ChannelMode::SingleChannel {
        channel_bitrate = if channel_bitrate == 4 {
            1
        } else {
            channel_bitrate.saturating_sub(4)
        };
    }

    if header.version == MpegVersion::Mpeg2 {
        30
    } else if channel_bitrate == 1 || channel_bitrate == 2 {
        if header.sample_rate_index == 2 {
            12
        } else {
            8
        }
    } else if header.sample_rate_index == 1 || (3..=5).contains(&channel_bitrate) {
        27
    } else {
        30
    }
}

/// First subband coded with intensity stereo, 0 outside joint stereo
pub fn intensity_stereo_bound(header: &HeaderFields) -> u32 {
    if header.mode != ChannelMode::JointStereo {
        return 0;
    }
    let bound = ((header.mode_extension as u32) << 2) + 4;
    bound.min(subband_count(header))
}

/// Derived sizes of one Layer III frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub struct FrameGeometry {
    pub bitrate_bps: u32,
    pub sample_rate_hz: u32,
    /// Total frame length including the header
    pub frame_length: u32,
    pub side_info_len: u32,
    /// Main data bytes following header, CRC and side information
    pub slot_count: u32,
    pub subband_count: u32,
    pub intensity_stereo_bound: u32,
}

impl FrameGeometry {
    /// Compute the geometry of a Layer III frame
    ///
    /// Rejects free format and reserved bitrates, other layers, and frames
    /// too short to hold their own header and side information.
    pub fn from_header(header: &HeaderFields) -> HeaderResult<Self> {
        if header.layer != Layer::Layer3 {
            return Err(HeaderError::UnsupportedLayer(header.layer));
        }

        let bitrate_bps = match header.bitrate_index {
            0 => return Err(HeaderError::FreeFormatBitrate),
            index => bitrate_bps(header.version, header.layer, index)
                .ok_or(HeaderError::ReservedBitrate)?,
        };
        let sample_rate_hz = sample_rate_hz(header.version, header.sample_rate_index)
            .ok_or(HeaderError::ReservedSampleRate)?;

        let version_row = match header.version {
            MpegVersion::Mpeg1 => 0,
            MpegVersion::Mpeg2 => 1,
        };
        let frame_length = LAYER3_FRAME_LENGTHS[version_row][header.sample_rate_index as usize]
            [header.bitrate_index as usize]
            + header.padding as u32;

        let side_info_len = side_info_len(header.version, header.mode);
        let crc_len = if header.has_crc() { CRC_LEN as u32 } else { 0 };
        let required = HEADER_LEN as u32 + crc_len + side_info_len;
        let slot_count = frame_length
            .checked_sub(required)
            .ok_or(HeaderError::FrameTooShort {
                frame_length,
                required,
            })?;

        Ok(Self {
            bitrate_bps,
            sample_rate_hz,
            frame_length,
            side_info_len,
            slot_count,
            subband_count: subband_count(header),
            intensity_stereo_bound: intensity_stereo_bound(header),
        })
    }

    /// Bytes following the header word
    pub fn body_len(&self) -> usize {
        self.frame_length as usize - HEADER_LEN
    }
}
