//! Synthetic stream builder shared by the integration tests

#![allow(dead_code)]

use mp3_framer::FrameGeometry;

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, stereo, no CRC (417 bytes)
pub const STEREO_128: u32 = 0xFFFB_9000;
/// Same as [`STEREO_128`] in single channel mode
pub const MONO_128: u32 = 0xFFFB_90C0;
/// Single channel with CRC
pub const MONO_128_CRC: u32 = 0xFFFA_90C0;
/// MPEG-1 Layer III, 128 kbps, 48 kHz, padding bit set (385 bytes)
pub const PADDED_48K: u32 = 0xFFFB_9600;
/// Same as [`PADDED_48K`] without padding (384 bytes)
pub const UNPADDED_48K: u32 = 0xFFFB_9400;
/// MPEG-1 Layer III, 320 kbps, 32 kHz, stereo (1440 bytes)
pub const LONGEST_32K: u32 = 0xFFFB_E800;
/// MPEG-2 Layer III, 64 kbps, 22.05 kHz, stereo (208 bytes)
pub const MPEG2_STEREO_64: u32 = 0xFFF3_8000;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn geometry(word: u32) -> FrameGeometry {
    let header =
        mp3_framer::header::decode_unchecked_padding(word).expect("fixture header must decode");
    FrameGeometry::from_header(&header).expect("fixture header must be Layer III")
}

/// One frame whose body bytes never contain 0xFF
pub fn frame(word: u32, seed: usize) -> Vec<u8> {
    let mut bytes = word.to_be_bytes().to_vec();
    bytes.extend((0..geometry(word).body_len()).map(|i| ((i + seed) % 251) as u8));
    bytes
}

/// Minimal ID3v2.3 tag with a synchsafe size
pub fn id3v2_tag(body_len: u32) -> Vec<u8> {
    let size = [
        ((body_len >> 21) & 0x7F) as u8,
        ((body_len >> 14) & 0x7F) as u8,
        ((body_len >> 7) & 0x7F) as u8,
        (body_len & 0x7F) as u8,
    ];
    let mut bytes = vec![b'I', b'D', b'3', 3, 0, 0];
    bytes.extend_from_slice(&size);
    bytes.extend((0..body_len).map(|i| (i % 0x7F) as u8));
    bytes
}

/// Stream builder recording where each frame starts
#[derive(Default)]
pub struct StreamBuilder {
    pub bytes: Vec<u8>,
    pub frame_offsets: Vec<u64>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, body_len: u32) -> Self {
        self.bytes.extend(id3v2_tag(body_len));
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn frames(mut self, word: u32, count: usize) -> Self {
        for _ in 0..count {
            self.frame_offsets.push(self.bytes.len() as u64);
            let seed = self.frame_offsets.len();
            self.bytes.extend(frame(word, seed));
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
