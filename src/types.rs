//! Type definitions shared across the framer
//!
//! Constants and enumerations describing the MPEG audio frame layout
//! as defined in ISO/IEC 11172-3 and 13818-3.

use std::fmt;

#[cfg(feature = "diagnostics")]
use serde::Serialize;

/// Length in bytes of the frame header word
pub const HEADER_LEN: usize = 4;
/// Length in bytes of the optional CRC following the header
pub const CRC_LEN: usize = 2;
/// Samples per granule
pub const GRANULE_SIZE: usize = 576;
pub const MAX_CHANNELS: usize = 2;
pub const MAX_GRANULES: usize = 2;
/// Number of scfsi bands per channel (MPEG-1 only)
pub const SCFSI_BANDS: usize = 4;
/// Upper bound on the length of any MPEG audio frame including the header
pub const MAX_FRAME_LENGTH: usize = 2881;
/// Longest Layer III frame: MPEG-1, 320 kbps at 32 kHz, padded
pub const MAX_LAYER3_FRAME_LENGTH: usize = 1441;
/// Bit pattern of the 12-bit sync word
pub const SYNC_WORD: u32 = 0xFFF;

/// MPEG version as selected by the ID bit
///
/// MPEG-2.5 is not recognised: its headers fail the 12-bit sync test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub enum MpegVersion {
    /// ISO/IEC 11172-3
    Mpeg1,
    /// ISO/IEC 13818-3 low sample rate extension
    Mpeg2,
}

/// Audio layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub enum Layer {
    Layer1,
    Layer2,
    Layer3,
    Reserved,
}

/// Channel mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub enum ChannelMode {
    /// Standard stereo
    Stereo,
    /// Joint stereo (intensity and/or mid/side)
    JointStereo,
    /// Dual channel (independent channels)
    DualChannel,
    /// Mono
    SingleChannel,
}

/// De-emphasis to apply after decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub enum Emphasis {
    /// No emphasis
    None,
    /// 50/15 microseconds emphasis
    Microseconds50_15,
    Reserved,
    /// CCITT J.17 emphasis
    CcittJ17,
}

impl MpegVersion {
    /// Granules carried by one Layer III frame
    pub fn granules(self) -> usize {
        match self {
            MpegVersion::Mpeg1 => 2,
            MpegVersion::Mpeg2 => 1,
        }
    }
}

impl ChannelMode {
    /// Number of coded channels
    pub fn channel_count(self) -> usize {
        match self {
            ChannelMode::SingleChannel => 1,
            _ => 2,
        }
    }

    pub fn is_single_channel(self) -> bool {
        self == ChannelMode::SingleChannel
    }
}

impl fmt::Display for MpegVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MpegVersion::Mpeg1 => write!(f, "MPEG-1"),
            MpegVersion::Mpeg2 => write!(f, "MPEG-2"),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Layer1 => write!(f, "Layer I"),
            Layer::Layer2 => write!(f, "Layer II"),
            Layer::Layer3 => write!(f, "Layer III"),
            Layer::Reserved => write!(f, "reserved layer"),
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelMode::Stereo => "stereo",
            ChannelMode::JointStereo => "joint stereo",
            ChannelMode::DualChannel => "dual channel",
            ChannelMode::SingleChannel => "single channel",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Emphasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Emphasis::None => "none",
            Emphasis::Microseconds50_15 => "50/15 us",
            Emphasis::Reserved => "reserved",
            Emphasis::CcittJ17 => "CCITT J.17",
        };
        f.write_str(name)
    }
}
