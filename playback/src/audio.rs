/*!
    The audio pull callback.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::warn;

use media_types::{AudioFrame, AudioResampler};

use crate::clock::PlaybackClock;
use crate::queue::BoundedQueue;

/// Longest the feeder will wait for a decoded frame before padding with
/// silence. The sink's real-time thread must never be parked open-ended.
const FRAME_WAIT: Duration = Duration::from_millis(100);

/**
    Fills the audio sink's buffers from the decoded audio frame queue.

    The sink calls [`fill`](Self::fill) from its own thread whenever it
    wants samples; the feeder drains frames, runs them through the
    resampler, and carries any unconsumed remainder over to the next call.
    Whenever decoding yields nothing in time — or has ended, or the
    resampler fails — the rest of the request is zero-filled so the sink
    always gets exactly the bytes it asked for.

    Consuming a frame advances the shared audio presentation clock to that
    frame's end time.
*/
pub struct AudioFeeder<R: AudioResampler> {
    frames: Arc<BoundedQueue<AudioFrame>>,
    resampler: R,
    clock: Arc<PlaybackClock>,
    stop: Arc<AtomicBool>,
    pending: Vec<f32>,
    pending_at: usize,
}

impl<R: AudioResampler> AudioFeeder<R> {
    pub fn new(
        frames: Arc<BoundedQueue<AudioFrame>>,
        resampler: R,
        clock: Arc<PlaybackClock>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            frames,
            resampler,
            clock,
            stop,
            pending: Vec::new(),
            pending_at: 0,
        }
    }

    /**
        Fill `out` completely with converted samples, silence-padding
        whatever cannot be produced right now.
    */
    pub fn fill(&mut self, out: &mut [f32]) {
        let mut filled = 0;
        while filled < out.len() {
            if self.pending_at >= self.pending.len() && !self.refill() {
                out[filled..].fill(0.0);
                return;
            }
            let take = (out.len() - filled).min(self.pending.len() - self.pending_at);
            out[filled..filled + take]
                .copy_from_slice(&self.pending[self.pending_at..self.pending_at + take]);
            self.pending_at += take;
            filled += take;
        }
    }

    /// Pull and convert one frame into the pending buffer. Returns false
    /// when no samples could be produced.
    fn refill(&mut self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return false;
        }

        let Some(frame) = self.frames.pop_timeout(FRAME_WAIT) else {
            return false;
        };

        if let Some(starts_at) = frame.presentation_time() {
            let ends_at = starts_at + frame.duration();
            self.clock.advance_audio(ends_at.as_secs_f64());
        }

        match self.resampler.convert(&frame) {
            Ok(samples) => {
                self.pending = samples;
                self.pending_at = 0;
                !self.pending.is_empty()
            }
            Err(e) => {
                warn!("audio convert failed, inserting silence: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_types::{ChannelLayout, Error, Pts, Rational, Result, SampleFormat};

    const TB_MS: Rational = Rational { num: 1, den: 1000 };

    /// Resampler double that emits one constant sample per input sample.
    struct FlatTone {
        fail: bool,
    }

    impl AudioResampler for FlatTone {
        fn convert(&mut self, frame: &AudioFrame) -> Result<Vec<f32>> {
            if self.fail {
                return Err(Error::convert("resample failed"));
            }
            Ok(vec![0.25; frame.samples])
        }
    }

    fn frame(pts: i64, samples: usize) -> AudioFrame {
        AudioFrame {
            data: vec![0u8; samples * 2],
            samples,
            sample_rate: 1000,
            channels: ChannelLayout::Mono,
            format: SampleFormat::S16,
            pts: Some(Pts(pts)),
            time_base: TB_MS,
        }
    }

    fn feeder(fail: bool) -> (Arc<BoundedQueue<AudioFrame>>, AudioFeeder<FlatTone>) {
        let frames = Arc::new(BoundedQueue::new(8));
        let feeder = AudioFeeder::new(
            Arc::clone(&frames),
            FlatTone { fail },
            Arc::new(PlaybackClock::new()),
            Arc::new(AtomicBool::new(false)),
        );
        (frames, feeder)
    }

    #[test]
    fn fills_exactly_the_requested_length() {
        let (frames, mut feeder) = feeder(false);
        assert!(frames.push(frame(0, 32)));
        frames.close();

        let mut out = [1.0f32; 16];
        feeder.fill(&mut out);
        assert!(out.iter().all(|&s| s == 0.25));

        // The remainder of the frame carries over to the next call.
        let mut out = [1.0f32; 16];
        feeder.fill(&mut out);
        assert!(out.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn silence_pads_when_no_frames_arrive() {
        let (frames, mut feeder) = feeder(false);
        frames.close();

        let mut out = [1.0f32; 8];
        feeder.fill(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn silence_pads_past_the_last_frame() {
        let (frames, mut feeder) = feeder(false);
        assert!(frames.push(frame(0, 4)));
        frames.close();

        let mut out = [1.0f32; 10];
        feeder.fill(&mut out);
        assert!(out[..4].iter().all(|&s| s == 0.25));
        assert!(out[4..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn resample_failure_becomes_silence() {
        let (frames, mut feeder) = feeder(true);
        assert!(frames.push(frame(0, 8)));
        frames.close();

        let mut out = [1.0f32; 8];
        feeder.fill(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn consuming_frames_advances_the_audio_clock() {
        let frames = Arc::new(BoundedQueue::new(8));
        let clock = Arc::new(PlaybackClock::new());
        let mut feeder = AudioFeeder::new(
            Arc::clone(&frames),
            FlatTone { fail: false },
            Arc::clone(&clock),
            Arc::new(AtomicBool::new(false)),
        );

        // 500ms of samples starting at pts 1000ms.
        assert!(frames.push(frame(1000, 500)));
        frames.close();

        let mut out = [0.0f32; 500];
        feeder.fill(&mut out);
        assert!((clock.audio() - 1.5).abs() < 1e-9);
    }
}
