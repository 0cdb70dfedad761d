//! Lookup tables and constants for frame header decoding
//!
//! This module contains the static lookup tables required to turn header
//! indices into physical quantities, and the bit masks used by the bit reader.

use crate::types::{Layer, MpegVersion};

/// Sample rates in Hz, indexed by `[version][sample_rate_index]`
/// (row 0: MPEG-1, row 1: MPEG-2). Index 3 is reserved and has no entry.
pub const SAMPLE_RATES: [[u32; 3]; 2] = [
    [44100, 48000, 32000], // MPEG-1
    [22050, 24000, 16000], // MPEG-2
];

/// Bitrate table in kbps.
/// Index: `[bitrate_index][column]` where column:
/// 0 = MPEG-1 Layer I, 1 = MPEG-1 Layer II, 2 = MPEG-1 Layer III,
/// 3 = MPEG-2 Layer I, 4 = MPEG-2 Layer II & III.
/// Row 0 is free format and row 15 is reserved; both hold 0.
pub const BITRATES_KBPS: [[u32; 5]; 16] = [
    [0, 0, 0, 0, 0],            // 0000 free
    [32, 32, 32, 32, 8],        // 0001
    [64, 48, 40, 48, 16],       // 0010
    [96, 56, 48, 56, 24],       // 0011
    [128, 64, 56, 64, 32],      // 0100
    [160, 80, 64, 80, 40],      // 0101
    [192, 96, 80, 96, 48],      // 0110
    [224, 112, 96, 112, 56],    // 0111
    [256, 128, 112, 128, 64],   // 1000
    [288, 160, 128, 144, 80],   // 1001
    [320, 192, 160, 160, 96],   // 1010
    [352, 224, 192, 176, 112],  // 1011
    [384, 256, 224, 192, 128],  // 1100
    [416, 320, 256, 224, 144],  // 1101
    [448, 384, 320, 256, 160],  // 1110
    [0, 0, 0, 0, 0],            // 1111 reserved
];

/// Masks selecting the low `n` bits, for `n` in `0..=17`
pub const BITMASK: [u32; 18] = [
    0x00000000,
    0x00000001, 0x00000003, 0x00000007, 0x0000000F,
    0x0000001F, 0x0000003F, 0x0000007F, 0x000000FF,
    0x000001FF, 0x000003FF, 0x000007FF, 0x00000FFF,
    0x00001FFF, 0x00003FFF, 0x00007FFF, 0x0000FFFF,
    0x0001FFFF,
];

/// Widest field the bit reader extracts in one call
pub const MAX_READ_BITS: u32 = 17;

fn version_row(version: MpegVersion) -> usize {
    match version {
        MpegVersion::Mpeg1 => 0,
        MpegVersion::Mpeg2 => 1,
    }
}

fn bitrate_column(version: MpegVersion, layer: Layer) -> Option<usize> {
    match (version, layer) {
        (_, Layer::Reserved) => None,
        (MpegVersion::Mpeg1, Layer::Layer1) => Some(0),
        (MpegVersion::Mpeg1, Layer::Layer2) => Some(1),
        (MpegVersion::Mpeg1, Layer::Layer3) => Some(2),
        (MpegVersion::Mpeg2, Layer::Layer1) => Some(3),
        (MpegVersion::Mpeg2, _) => Some(4),
    }
}

/// Helper function to get the bitrate in kbps for a header bitrate index
///
/// Returns `None` for free format (0), reserved (15) and out of range indices.
pub fn get_bitrate_kbps(version: MpegVersion, layer: Layer, bitrate_index: u8) -> Option<u32> {
    let column = bitrate_column(version, layer)?;
    match BITRATES_KBPS.get(bitrate_index as usize)?[column] {
        0 => None,
        kbps => Some(kbps),
    }
}

/// Helper function to get the sample rate in Hz for a header sample rate index
pub fn get_sample_rate(version: MpegVersion, sample_rate_index: u8) -> Option<u32> {
    SAMPLE_RATES[version_row(version)]
        .get(sample_rate_index as usize)
        .copied()
}
