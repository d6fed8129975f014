/*!
    Decoded frame types.
*/

use std::time::Duration;

use crate::{ChannelLayout, PixelFormat, Pts, Rational, SampleFormat};

/**
    A decoded video frame.

    Owns its pixel buffer exclusively until consumed. For packed formats
    the buffer holds `height` rows of `stride` bytes. For planar formats the
    planes are stored back to back with tightly packed rows, and `stride`
    refers to the first (luma) plane.
*/
#[derive(Clone, Debug)]
pub struct VideoFrame {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Bytes per row of the first plane.
    pub stride: usize,
    /// Pixel format of the data.
    pub format: PixelFormat,
    /// Repeat-field count reported by the decoder; extends the display
    /// time of this frame during pacing.
    pub repeat: i32,
    /// Presentation timestamp, if the stream carried one.
    pub pts: Option<Pts>,
    /// Time base for interpreting the timestamp.
    pub time_base: Rational,
}

impl VideoFrame {
    /// The presentation time in seconds, if a timestamp is set.
    pub fn presentation_time(&self) -> Option<Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }
}

/**
    A decoded audio frame.

    Sample data is interleaved for multi-channel audio and interpreted
    according to `format` and `channels`.
*/
#[derive(Clone, Debug)]
pub struct AudioFrame {
    /// Raw sample data as bytes.
    pub data: Vec<u8>,
    /// Samples per channel.
    pub samples: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel layout.
    pub channels: ChannelLayout,
    /// Sample format.
    pub format: SampleFormat,
    /// Presentation timestamp, if the stream carried one.
    pub pts: Option<Pts>,
    /// Time base for interpreting the timestamp.
    pub time_base: Rational,
}

impl AudioFrame {
    /// The presentation time in seconds, if a timestamp is set.
    pub fn presentation_time(&self) -> Option<Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }

    /// Play-out time of this frame, from sample count and rate.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples as f64 / self.sample_rate as f64)
    }

    /// Total sample count across channels.
    pub fn total_samples(&self) -> usize {
        self.samples * self.channels.channels() as usize
    }
}

// Frames move from decoder threads to the presentation side.
static_assertions::assert_impl_all!(VideoFrame: Send, Sync);
static_assertions::assert_impl_all!(AudioFrame: Send, Sync);
