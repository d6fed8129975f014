/*!
    Video frame pacing.
*/

use std::sync::Arc;
use std::time::Duration;

use media_types::{Rational, VideoFrame};

use crate::clock::PlaybackClock;

/**
    Computes the display delay for each video frame.

    The schedule is fixed, derived from the stream time base: every frame
    earns a base delay of one time-base tick in seconds, plus half a tick
    per repeated field. The video clock is first synchronized to the
    frame's own timestamp (when it has one) and then advanced by the
    delay just spent.

    The schedule is never reconciled against the audio clock; video runs
    on its own fixed cadence. This is a known limitation kept from the
    original pipeline, not an attempt at A/V sync.
*/
pub struct FramePacer {
    frame_delay: f64,
    clock: Arc<PlaybackClock>,
}

impl FramePacer {
    pub fn new(time_base: Rational, clock: Arc<PlaybackClock>) -> Self {
        Self {
            frame_delay: time_base.to_f64(),
            clock,
        }
    }

    /**
        Account for one shown frame and return the delay until the next
        presentation tick.
    */
    pub fn delay_for(&self, frame: &VideoFrame) -> Duration {
        if let Some(shown_at) = frame.presentation_time() {
            self.clock.advance_video(shown_at.as_secs_f64());
        }

        let base = self.frame_delay;
        let extra = frame.repeat as f64 * base * 0.5;
        self.clock.advance_video(self.clock.video() + base + extra);

        Duration::from_secs_f64(base + extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_types::{PixelFormat, Pts};

    const TB_25FPS: Rational = Rational { num: 1, den: 25 };

    fn frame(pts: Option<Pts>, repeat: i32) -> VideoFrame {
        VideoFrame {
            data: Vec::new(),
            width: 4,
            height: 4,
            stride: 16,
            format: PixelFormat::Rgba,
            repeat,
            pts,
            time_base: TB_25FPS,
        }
    }

    #[test]
    fn base_delay_is_one_time_base_tick() {
        let clock = Arc::new(PlaybackClock::new());
        let pacer = FramePacer::new(TB_25FPS, Arc::clone(&clock));
        let delay = pacer.delay_for(&frame(None, 0));
        assert_eq!(delay, Duration::from_millis(40));
    }

    #[test]
    fn repeated_fields_extend_the_delay() {
        let clock = Arc::new(PlaybackClock::new());
        let pacer = FramePacer::new(TB_25FPS, Arc::clone(&clock));
        // One repeated field adds half a tick: 40ms + 20ms.
        let delay = pacer.delay_for(&frame(None, 1));
        assert_eq!(delay, Duration::from_millis(60));
    }

    #[test]
    fn video_clock_tracks_shown_frames() {
        let clock = Arc::new(PlaybackClock::new());
        let pacer = FramePacer::new(TB_25FPS, Arc::clone(&clock));

        // Frame at pts 2s: clock syncs to 2.0 then advances one tick.
        pacer.delay_for(&frame(Some(Pts(50)), 0));
        assert!((clock.video() - 2.04).abs() < 1e-9);

        // An older frame cannot move the clock backwards.
        pacer.delay_for(&frame(Some(Pts(10)), 0));
        assert!(clock.video() >= 2.04);
    }
}
