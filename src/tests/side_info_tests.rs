//! Unit tests for side information slicing
//!
//! Builds side information blocks bit by bit and checks that the parser
//! recovers every field and leaves the reader on the main data.

use crate::bitstream::WordBuffer;
use crate::side_info::*;
use crate::types::{ChannelMode, MpegVersion};

/// MSB-first bit writer used to build fixtures
#[derive(Default)]
struct BitWriter {
    bytes: Vec<u8>,
    bits: usize,
}

impl BitWriter {
    fn put(&mut self, value: u64, n: u32) {
        for i in (0..n).rev() {
            if self.bits % 8 == 0 {
                self.bytes.push(0);
            }
            let bit = ((value >> i) & 1) as u8;
            let last = self.bytes.len() - 1;
            self.bytes[last] |= bit << (7 - self.bits % 8);
            self.bits += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpeg1_stereo_fields() {
        let mut writer = BitWriter::default();
        writer.put(511, 9); // main_data_begin
        writer.put(0b101, 3); // private bits
        writer.put(0b1100, 4);
        writer.put(0b0011, 4);
        let slices = [0x1AAAu64, 0x2BBB, 0x3CCC, 0x4DDD];
        for slice in slices {
            writer.put(slice, 59);
        }
        writer.put(0xEE, 8); // first main data byte
        assert_eq!(writer.bytes.len(), 33);

        let mut buffer = WordBuffer::default();
        buffer.pack(&writer.bytes);
        let mut reader = buffer.reader();
        let side_info = parse(&mut reader, MpegVersion::Mpeg1, ChannelMode::Stereo).unwrap();

        assert_eq!(side_info.main_data_begin, 511);
        assert_eq!(side_info.private_bits, 0b101);
        assert_eq!(side_info.channels[0].scfsi, [true, true, false, false]);
        assert_eq!(side_info.channels[1].scfsi, [false, false, true, true]);
        // Granule-major order: gr0 ch0, gr0 ch1, gr1 ch0, gr1 ch1
        assert_eq!(side_info.channels[0].granules[0].bits, 0x1AAA);
        assert_eq!(side_info.channels[1].granules[0].bits, 0x2BBB);
        assert_eq!(side_info.channels[0].granules[1].bits, 0x3CCC);
        assert_eq!(side_info.channels[1].granules[1].bits, 0x4DDD);
        assert_eq!(reader.read_bits(8).unwrap(), 0xEE);
    }

    #[test]
    fn test_mpeg2_mono_fields() {
        let mut writer = BitWriter::default();
        writer.put(0x81, 8);
        writer.put(1, 1);
        writer.put((0xFFFu64 << 51) | 0x7, 63);
        assert_eq!(writer.bytes.len(), 9);

        let mut buffer = WordBuffer::default();
        buffer.pack(&writer.bytes);
        let mut reader = buffer.reader();
        let side_info = parse(&mut reader, MpegVersion::Mpeg2, ChannelMode::SingleChannel).unwrap();

        assert_eq!(side_info.main_data_begin, 0x81);
        assert_eq!(side_info.private_bits, 1);
        assert_eq!(side_info.granule_count, 1);
        assert_eq!(side_info.channel_count, 1);
        let slice = side_info.channels[0].granules[0];
        assert_eq!(slice.len, 63);
        assert_eq!(slice.part2_3_length(), Some(0xFFF));
        assert_eq!(side_info.part2_3_bits(), 0xFFF);
        assert_eq!(side_info.channels[0].scfsi, [false; 4]);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_unused_channel_stays_empty() {
        let bytes = [0xFFu8; 17];
        let mut buffer = WordBuffer::default();
        buffer.pack(&bytes);
        let side_info =
            parse(&mut buffer.reader(), MpegVersion::Mpeg1, ChannelMode::SingleChannel).unwrap();
        assert_eq!(side_info.channels[1], ChannelSideInfo::default());
        assert_eq!(side_info.slices().count(), 2);
    }
}
