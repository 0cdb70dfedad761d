//! Frame header decoding
//!
//! The first 32 bits of every frame are the header word, common to all layers:
//!
//! ```text
//! 1111 1111 1111 vlly rrrr sspx mmee coee
//! ^sync (12)     ^version, layer, protection
//!                     ^bitrate index, sample rate index, padding, private
//!                               ^mode, mode extension, copyright, original, emphasis
//! ```
//!
//! [`decode`] is the single decode table for the whole crate. It validates
//! in a fixed order so that callers can tell sync noise from structural
//! violations.

use crate::error::{HeaderError, HeaderResult};
use crate::types::{ChannelMode, Emphasis, Layer, MpegVersion, SYNC_WORD};

#[cfg(feature = "diagnostics")]
use serde::Serialize;

const SYNC_SHIFT: u32 = 20;
const VERSION_SHIFT: u32 = 19;
const LAYER_SHIFT: u32 = 17;
const PROTECTION_SHIFT: u32 = 16;
const BITRATE_SHIFT: u32 = 12;
const SAMPLE_RATE_SHIFT: u32 = 10;
const PADDING_SHIFT: u32 = 9;
const PRIVATE_SHIFT: u32 = 8;
const MODE_SHIFT: u32 = 6;
const MODE_EXTENSION_SHIFT: u32 = 4;
const COPYRIGHT_SHIFT: u32 = 3;
const ORIGINAL_SHIFT: u32 = 2;

/// Sample rate index reserved by the standard
pub const RESERVED_SAMPLE_RATE_INDEX: u8 = 3;

/// Decoded header fields
///
/// Derived values (bitrate in bps, sample rate in Hz, frame length) are
/// computed by [`crate::geometry::FrameGeometry`], not stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub struct HeaderFields {
    pub version: MpegVersion,
    pub layer: Layer,
    /// True when no CRC follows the header
    pub protection_absent: bool,
    pub bitrate_index: u8,
    pub sample_rate_index: u8,
    pub padding: bool,
    pub private_bit: bool,
    pub mode: ChannelMode,
    pub mode_extension: u8,
    pub copyright: bool,
    pub original: bool,
    pub emphasis: Emphasis,
}

#[inline]
fn field(word: u32, shift: u32, width: u32) -> u32 {
    (word >> shift) & ((1 << width) - 1)
}

#[inline]
fn flag(word: u32, shift: u32) -> bool {
    field(word, shift, 1) == 1
}

/// Returns true if the top 12 bits of `word` are the sync pattern
#[inline]
pub fn has_sync(word: u32) -> bool {
    word >> SYNC_SHIFT == SYNC_WORD
}

/// Decode the layer bits. `00` is reserved.
pub fn decode_layer(bits: u32) -> Layer {
    match bits & 0x3 {
        0b11 => Layer::Layer1,
        0b10 => Layer::Layer2,
        0b01 => Layer::Layer3,
        _ => Layer::Reserved,
    }
}

fn decode_mode(bits: u32) -> ChannelMode {
    match bits & 0x3 {
        0b00 => ChannelMode::Stereo,
        0b01 => ChannelMode::JointStereo,
        0b10 => ChannelMode::DualChannel,
        _ => ChannelMode::SingleChannel,
    }
}

fn decode_emphasis(bits: u32) -> Emphasis {
    match bits & 0x3 {
        0b00 => Emphasis::None,
        0b01 => Emphasis::Microseconds50_15,
        0b10 => Emphasis::Reserved,
        _ => Emphasis::CcittJ17,
    }
}

/// Decode a 32-bit header word into its fields
///
/// Validation order:
/// 1. sync pattern ([`HeaderError::NoSync`])
/// 2. version bit (never fails)
/// 3. layer ([`HeaderError::ReservedLayer`])
/// 4. sample rate index ([`HeaderError::ReservedSampleRate`])
/// 5. padding consistency ([`HeaderError::InvalidPadding`]): padding is only
///    legal in the 44.1 kHz family (sample rate index 0)
///
/// Bitrate indices are not validated here; see [`crate::geometry`].
pub fn decode(word: u32) -> HeaderResult<HeaderFields> {
    let fields = decode_unchecked_padding(word)?;

    if fields.padding && fields.sample_rate_index != 0 {
        return Err(HeaderError::InvalidPadding {
            sample_rate_index: fields.sample_rate_index,
        });
    }

    Ok(fields)
}

/// Same as [`decode`] without the padding consistency check
///
/// Used when the stream is configured to tolerate padded frames outside
/// the 44.1 kHz family.
pub fn decode_unchecked_padding(word: u32) -> HeaderResult<HeaderFields> {
    if !has_sync(word) {
        return Err(HeaderError::NoSync(word));
    }

    let version = if flag(word, VERSION_SHIFT) {
        MpegVersion::Mpeg1
    } else {
        MpegVersion::Mpeg2
    };

    let layer = decode_layer(field(word, LAYER_SHIFT, 2));
    if layer == Layer::Reserved {
        return Err(HeaderError::ReservedLayer);
    }

    let sample_rate_index = field(word, SAMPLE_RATE_SHIFT, 2) as u8;
    if sample_rate_index == RESERVED_SAMPLE_RATE_INDEX {
        return Err(HeaderError::ReservedSampleRate);
    }

    Ok(HeaderFields {
        version,
        layer,
        protection_absent: flag(word, PROTECTION_SHIFT),
        bitrate_index: field(word, BITRATE_SHIFT, 4) as u8,
        sample_rate_index,
        padding: flag(word, PADDING_SHIFT),
        private_bit: flag(word, PRIVATE_SHIFT),
        mode: decode_mode(field(word, MODE_SHIFT, 2)),
        mode_extension: field(word, MODE_EXTENSION_SHIFT, 2) as u8,
        copyright: flag(word, COPYRIGHT_SHIFT),
        original: flag(word, ORIGINAL_SHIFT),
        emphasis: decode_emphasis(word),
    })
}

impl HeaderFields {
    /// Re-encode the fields into a header word
    pub fn to_word(&self) -> u32 {
        let version = match self.version {
            MpegVersion::Mpeg1 => 1,
            MpegVersion::Mpeg2 => 0,
        };
        let layer = match self.layer {
            Layer::Layer1 => 0b11,
            Layer::Layer2 => 0b10,
            Layer::Layer3 => 0b01,
            Layer::Reserved => 0b00,
        };
        let mode = match self.mode {
            ChannelMode::Stereo => 0b00,
            ChannelMode::JointStereo => 0b01,
            ChannelMode::DualChannel => 0b10,
            ChannelMode::SingleChannel => 0b11,
        };
        let emphasis = match self.emphasis {
            Emphasis::None => 0b00,
            Emphasis::Microseconds50_15 => 0b01,
            Emphasis::Reserved => 0b10,
            Emphasis::CcittJ17 => 0b11,
        };

        (SYNC_WORD << SYNC_SHIFT)
            | (version << VERSION_SHIFT)
            | (layer << LAYER_SHIFT)
            | ((self.protection_absent as u32) << PROTECTION_SHIFT)
            | (((self.bitrate_index & 0xF) as u32) << BITRATE_SHIFT)
            | (((self.sample_rate_index & 0x3) as u32) << SAMPLE_RATE_SHIFT)
            | ((self.padding as u32) << PADDING_SHIFT)
            | ((self.private_bit as u32) << PRIVATE_SHIFT)
            | (mode << MODE_SHIFT)
            | (((self.mode_extension & 0x3) as u32) << MODE_EXTENSION_SHIFT)
            | ((self.copyright as u32) << COPYRIGHT_SHIFT)
            | ((self.original as u32) << ORIGINAL_SHIFT)
            | emphasis
    }

    /// True when a 16-bit CRC follows the header
    pub fn has_crc(&self) -> bool {
        !self.protection_absent
    }

    pub fn channel_count(&self) -> usize {
        self.mode.channel_count()
    }
}

impl Default for HeaderFields {
    /// MPEG-1 Layer III, 128 kbps, 44.1 kHz, joint stereo, no CRC
    fn default() -> Self {
        Self {
            version: MpegVersion::Mpeg1,
            layer: Layer::Layer3,
            protection_absent: true,
            bitrate_index: 9,
            sample_rate_index: 0,
            padding: false,
            private_bit: false,
            mode: ChannelMode::JointStereo,
            mode_extension: 0,
            copyright: false,
            original: true,
            emphasis: Emphasis::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_common_header() {
        // MPEG-1 Layer III, no CRC, 128 kbps, 44.1 kHz, stereo
        let fields = decode(0xFFFB_9000).unwrap();
        assert_eq!(fields.version, MpegVersion::Mpeg1);
        assert_eq!(fields.layer, Layer::Layer3);
        assert!(fields.protection_absent);
        assert_eq!(fields.bitrate_index, 9);
        assert_eq!(fields.sample_rate_index, 0);
        assert!(!fields.padding);
        assert_eq!(fields.mode, ChannelMode::Stereo);
        assert_eq!(fields.emphasis, Emphasis::None);
    }

    #[test]
    fn test_decode_mono_with_crc() {
        let fields = decode(0xFFFA_90C4).unwrap();
        assert!(!fields.protection_absent);
        assert!(fields.has_crc());
        assert_eq!(fields.mode, ChannelMode::SingleChannel);
        assert!(fields.original);
        assert_eq!(fields.channel_count(), 1);
    }

    #[test]
    fn test_decode_mpeg2() {
        let fields = decode(0xFFF3_8000).unwrap();
        assert_eq!(fields.version, MpegVersion::Mpeg2);
        assert_eq!(fields.layer, Layer::Layer3);
    }

    #[test]
    fn test_validation_order() {
        assert_eq!(decode(0xFFEB_9000), Err(HeaderError::NoSync(0xFFEB_9000)));
        // Reserved layer wins over reserved sample rate
        assert_eq!(decode(0xFFF9_9C00), Err(HeaderError::ReservedLayer));
        assert_eq!(decode(0xFFFB_9C00), Err(HeaderError::ReservedSampleRate));
        // Padding at 48 kHz
        assert_eq!(
            decode(0xFFFB_9600),
            Err(HeaderError::InvalidPadding { sample_rate_index: 1 })
        );
        assert!(decode_unchecked_padding(0xFFFB_9600).unwrap().padding);
        // Padding at 44.1 kHz is fine
        assert!(decode(0xFFFB_9200).unwrap().padding);
    }

    #[test]
    fn test_layer_table() {
        assert_eq!(decode_layer(0b11), Layer::Layer1);
        assert_eq!(decode_layer(0b10), Layer::Layer2);
        assert_eq!(decode_layer(0b01), Layer::Layer3);
        assert_eq!(decode_layer(0b00), Layer::Reserved);
    }

    #[test]
    fn test_to_word_matches_default() {
        let word = HeaderFields::default().to_word();
        assert_eq!(word, 0xFFFB_9044);
        assert_eq!(decode(word).unwrap(), HeaderFields::default());
    }

    proptest! {
        #[test]
        fn property_decode_is_total_and_bit_exact(low in 0u32..0x0010_0000) {
            let word = 0xFFF0_0000 | low;
            prop_assume!((word >> 10) & 0x3 != 3);
            prop_assume!((word >> 17) & 0x3 != 0);

            let fields = decode_unchecked_padding(word).unwrap();

            prop_assert_eq!(fields.version == MpegVersion::Mpeg1, (word >> 19) & 1 == 1);
            prop_assert_eq!(fields.protection_absent, (word >> 16) & 1 == 1);
            prop_assert_eq!(fields.bitrate_index as u32, (word >> 12) & 0xF);
            prop_assert_eq!(fields.sample_rate_index as u32, (word >> 10) & 0x3);
            prop_assert_eq!(fields.padding, (word >> 9) & 1 == 1);
            prop_assert_eq!(fields.private_bit, (word >> 8) & 1 == 1);
            prop_assert_eq!(fields.mode_extension as u32, (word >> 4) & 0x3);
            prop_assert_eq!(fields.copyright, (word >> 3) & 1 == 1);
            prop_assert_eq!(fields.original, (word >> 2) & 1 == 1);
            prop_assert_eq!(fields.to_word(), word);
        }

        #[test]
        fn property_decode_never_panics(word in any::<u32>()) {
            let _ = decode(word);
        }
    }
}
