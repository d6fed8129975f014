/*!
    The timer-driven video presentation loop.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::debug;

use media_types::{DisplaySink, Result, VideoFrame, VideoScaler};

use crate::pace::FramePacer;
use crate::queue::BoundedQueue;

/// Delay before the very first presentation step.
pub const INITIAL_DELAY: Duration = Duration::from_millis(40);
/// Retry delay when the frame queue is empty but still open.
pub const EMPTY_RETRY_DELAY: Duration = Duration::from_millis(10);
/// Idle delay when no video stream exists at all.
pub const IDLE_DELAY: Duration = Duration::from_millis(100);

/**
    Outcome of one presentation step.
*/
#[derive(Debug, PartialEq, Eq)]
pub enum Tick {
    /// Run the next step after this delay.
    Next(Duration),
    /// Playback is over; stop stepping.
    Finished,
}

/**
    Dequeues video frames, converts them for display, and pushes them to
    the sink — exactly one frame per tick, on a variable-interval schedule.

    The contract is "delay N, then run exactly one step": [`run`](Self::run)
    is nothing but that loop, and [`step`](Self::step) is the whole
    per-tick behavior, which keeps the scheduling testable without a
    display.
*/
pub struct PresentationLoop<C: VideoScaler, S: DisplaySink> {
    video: Option<(Arc<BoundedQueue<VideoFrame>>, FramePacer)>,
    scaler: C,
    sink: S,
    stop: Arc<AtomicBool>,
    frames_shown: u64,
}

impl<C: VideoScaler, S: DisplaySink> PresentationLoop<C, S> {
    pub fn new(
        video: Option<(Arc<BoundedQueue<VideoFrame>>, FramePacer)>,
        scaler: C,
        sink: S,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            video,
            scaler,
            sink,
            stop,
            frames_shown: 0,
        }
    }

    /// Frames presented so far.
    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }

    /// Drive steps until playback finishes, a sink/scaler error occurs,
    /// or shutdown is requested.
    pub fn run(&mut self) -> Result<()> {
        let mut delay = INITIAL_DELAY;
        loop {
            thread::sleep(delay);
            if self.stop.load(Ordering::Relaxed) {
                debug!("presentation: stop requested");
                return Ok(());
            }
            match self.step()? {
                Tick::Next(next) => delay = next,
                Tick::Finished => {
                    debug!("presentation: video stream finished");
                    return Ok(());
                }
            }
        }
    }

    /**
        Run exactly one presentation step and report when to run the next.

        With a frame available, one frame is consumed, converted, and
        presented, and the pacer decides the next delay. An empty-but-open
        queue reschedules a short retry without consuming anything; an
        empty-and-closed queue finishes; no video stream at all idles on a
        long tick.
    */
    pub fn step(&mut self) -> Result<Tick> {
        let Some((frames, pacer)) = &self.video else {
            return Ok(Tick::Next(IDLE_DELAY));
        };

        match frames.try_pop() {
            Some(frame) => {
                let converted = self.scaler.convert(&frame)?;
                self.sink.present(&converted)?;
                self.frames_shown += 1;
                Ok(Tick::Next(pacer.delay_for(&frame)))
            }
            None if frames.is_closed() => Ok(Tick::Finished),
            None => Ok(Tick::Next(EMPTY_RETRY_DELAY)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_types::{Error, PixelFormat, Pts, Rational};

    use crate::clock::PlaybackClock;

    const TB_25FPS: Rational = Rational { num: 1, den: 25 };

    /// Scaler double that passes frames through untouched.
    struct PassThrough;

    impl VideoScaler for PassThrough {
        fn convert(&mut self, frame: &VideoFrame) -> Result<VideoFrame> {
            Ok(frame.clone())
        }
    }

    /// Sink double that records presented timestamps.
    #[derive(Default)]
    struct RecordingSink {
        presented: Vec<Option<Pts>>,
        fail: bool,
    }

    impl DisplaySink for &mut RecordingSink {
        fn present(&mut self, frame: &VideoFrame) -> Result<()> {
            if self.fail {
                return Err(Error::convert("sink refused frame"));
            }
            self.presented.push(frame.pts);
            Ok(())
        }
    }

    fn frame(pts: i64) -> VideoFrame {
        VideoFrame {
            data: vec![0u8; 4],
            width: 1,
            height: 1,
            stride: 4,
            format: PixelFormat::Rgba,
            repeat: 0,
            pts: Some(Pts(pts)),
            time_base: TB_25FPS,
        }
    }

    fn video_pair(capacity: usize) -> (Arc<BoundedQueue<VideoFrame>>, FramePacer) {
        let queue = Arc::new(BoundedQueue::new(capacity));
        let pacer = FramePacer::new(TB_25FPS, Arc::new(PlaybackClock::new()));
        (queue, pacer)
    }

    #[test]
    fn no_video_stream_idles() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut sink = RecordingSink::default();
        let mut looper = PresentationLoop::new(None, PassThrough, &mut sink, stop);
        assert_eq!(looper.step().unwrap(), Tick::Next(IDLE_DELAY));
    }

    #[test]
    fn empty_open_queue_reschedules_short_retry() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut sink = RecordingSink::default();
        let mut looper =
            PresentationLoop::new(Some(video_pair(1)), PassThrough, &mut sink, stop);
        assert_eq!(looper.step().unwrap(), Tick::Next(EMPTY_RETRY_DELAY));
        assert_eq!(looper.frames_shown(), 0);
    }

    #[test]
    fn consumes_exactly_one_frame_per_step() {
        let stop = Arc::new(AtomicBool::new(false));
        let (queue, pacer) = video_pair(4);
        assert!(queue.push(frame(1)));
        assert!(queue.push(frame(2)));

        let mut sink = RecordingSink::default();
        let mut looper = PresentationLoop::new(
            Some((Arc::clone(&queue), pacer)),
            PassThrough,
            &mut sink,
            stop,
        );

        // One tick, one frame; the pacer sets a one-tick delay.
        assert_eq!(
            looper.step().unwrap(),
            Tick::Next(Duration::from_millis(40))
        );
        assert_eq!(queue.len(), 1);
        looper.step().unwrap();
        assert_eq!(looper.frames_shown(), 2);
        assert_eq!(sink.presented, vec![Some(Pts(1)), Some(Pts(2))]);
    }

    #[test]
    fn closed_and_drained_queue_finishes() {
        let stop = Arc::new(AtomicBool::new(false));
        let (queue, pacer) = video_pair(1);
        assert!(queue.push(frame(1)));
        queue.close();

        let mut sink = RecordingSink::default();
        let mut looper =
            PresentationLoop::new(Some((queue, pacer)), PassThrough, &mut sink, stop);

        assert!(matches!(looper.step().unwrap(), Tick::Next(_)));
        assert_eq!(looper.step().unwrap(), Tick::Finished);
    }

    #[test]
    fn sink_failure_surfaces() {
        let stop = Arc::new(AtomicBool::new(false));
        let (queue, pacer) = video_pair(1);
        assert!(queue.push(frame(1)));

        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let mut looper =
            PresentationLoop::new(Some((queue, pacer)), PassThrough, &mut sink, stop);
        assert!(looper.step().is_err());
    }
}
