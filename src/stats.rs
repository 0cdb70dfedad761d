//! Stream statistics
//!
//! Aggregates per-frame information while a stream is read, and with the
//! `diagnostics` feature produces a JSON report of the whole stream.

use std::io::Read;

use crate::frame::{Frame, FrameReader};
use crate::Result;

#[cfg(feature = "diagnostics")]
use serde::Serialize;

/// Running totals over the frames of a stream
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "diagnostics", derive(Serialize))]
pub struct StreamStats {
    pub frame_count: u64,
    /// Bytes covered by frames, headers included
    pub total_bytes: u64,
    pub min_bitrate_bps: Option<u32>,
    pub max_bitrate_bps: Option<u32>,
    /// Sum of per-frame bitrates, for the average
    bitrate_sum: u64,
    /// Samples per channel
    pub total_samples: u64,
    pub sample_rate_hz: Option<u32>,
    pub crc_frames: u64,
}

impl StreamStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one frame
    pub fn record(&mut self, frame: &Frame) {
        let bitrate = frame.bitrate_bps();

        self.frame_count += 1;
        self.total_bytes += frame.frame_length as u64;
        self.bitrate_sum += bitrate as u64;
        self.min_bitrate_bps = Some(self.min_bitrate_bps.map_or(bitrate, |min| min.min(bitrate)));
        self.max_bitrate_bps = Some(self.max_bitrate_bps.map_or(bitrate, |max| max.max(bitrate)));
        self.total_samples += frame.samples() as u64;
        self.sample_rate_hz = Some(frame.sample_rate_hz());
        if frame.crc.is_some() {
            self.crc_frames += 1;
        }
    }

    /// Drain `reader`, accumulating every frame
    pub fn from_reader<R: Read>(reader: &mut FrameReader<R>) -> Result<Self> {
        let mut stats = Self::new();
        while let Some(frame) = reader.next_frame()? {
            stats.record(&frame);
        }
        Ok(stats)
    }

    pub fn average_bitrate_bps(&self) -> Option<u32> {
        if self.frame_count == 0 {
            return None;
        }
        Some((self.bitrate_sum / self.frame_count) as u32)
    }

    /// True when frames with different bitrates were seen
    pub fn is_vbr(&self) -> bool {
        self.min_bitrate_bps != self.max_bitrate_bps
    }

    /// Playback duration in seconds
    pub fn duration_secs(&self) -> f64 {
        match self.sample_rate_hz {
            Some(rate) if rate > 0 => self.total_samples as f64 / rate as f64,
            _ => 0.0,
        }
    }
}

/// Per-frame entry of a [`StreamReport`]
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub offset: u64,
    pub header_word: u32,
    pub bitrate_bps: u32,
    pub frame_length: u32,
    pub slot_count: u32,
    pub main_data_begin: u32,
    pub part2_3_bits: u32,
    pub has_crc: bool,
}

/// Serializable summary of a stream
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Serialize)]
pub struct StreamReport {
    pub generated_at: String,
    pub tag_len: u64,
    pub stats: StreamStats,
    pub average_bitrate_bps: Option<u32>,
    pub duration_secs: f64,
    pub frames: Vec<FrameRecord>,
}

#[cfg(feature = "diagnostics")]
impl StreamReport {
    /// Read the whole stream into a report
    pub fn from_reader<R: Read>(reader: &mut FrameReader<R>) -> Result<Self> {
        let mut stats = StreamStats::new();
        let mut frames = Vec::new();
        while let Some(frame) = reader.next_frame()? {
            stats.record(&frame);
            frames.push(FrameRecord {
                offset: frame.offset,
                header_word: frame.header_word,
                bitrate_bps: frame.bitrate_bps(),
                frame_length: frame.frame_length,
                slot_count: frame.slot_count,
                main_data_begin: frame.side_info.main_data_begin,
                part2_3_bits: frame.side_info.part2_3_bits(),
                has_crc: frame.crc.is_some(),
            });
        }

        Ok(Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            tag_len: reader.tag_len(),
            average_bitrate_bps: stats.average_bitrate_bps(),
            duration_secs: stats.duration_secs(),
            stats,
            frames,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
