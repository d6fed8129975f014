/*!
    Pipeline lifecycle.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use log::debug;

use media_types::{AudioFrame, DecodeUnit, Packet, PacketSource, Result, VideoFrame};

use crate::clock::PlaybackClock;
use crate::decoder::StreamDecoder;
use crate::demux::{Demuxer, StreamMap};
use crate::queue::BoundedQueue;

/// Packet queues absorb container read jitter.
pub const PACKET_QUEUE_CAPACITY: usize = 100;
/// The video frame queue stays minimal so presentation latency is one
/// frame.
pub const VIDEO_FRAME_QUEUE_CAPACITY: usize = 1;
/// Audio gets a little slack so the pull callback rarely waits.
pub const AUDIO_FRAME_QUEUE_CAPACITY: usize = 8;

/**
    One playback pipeline: queues, producer threads, the stop flag, and
    the shared clock.

    Construction wires and starts the demultiplexer and decoder threads;
    the presentation loop and the audio sink attach to the frame queues
    afterwards, from whichever threads they live on. There is no ambient
    state: everything a component needs is handed to it here, and the
    lifecycle is construct, run, [`stop`](Self::stop), drop.

    Shutdown order matters and is owned by [`stop`](Self::stop): raise the
    flag, then close every queue — packet queues to wake a blocked
    demultiplexer, frame queues to wake a decoder parked on a full one —
    and only then join the producer threads. Queued frames stay poppable
    after the close, so consumers still observe the end-of-stream token.
*/
pub struct PlaybackSession {
    stop: Arc<AtomicBool>,
    clock: Arc<PlaybackClock>,
    video_frames: Option<Arc<BoundedQueue<VideoFrame>>>,
    audio_frames: Option<Arc<BoundedQueue<AudioFrame>>>,
    video_packets: Option<Arc<BoundedQueue<Packet>>>,
    audio_packets: Option<Arc<BoundedQueue<Packet>>>,
    demux: Option<JoinHandle<Result<()>>>,
    video_decode: Option<JoinHandle<Result<()>>>,
    audio_decode: Option<JoinHandle<Result<()>>>,
}

impl PlaybackSession {
    /**
        Wire the pipeline and start its producer threads.

        A stream is activated only when both a mapping for it and a decode
        unit exist; anything else the demultiplexer drops.
    */
    pub fn spawn<S, V, A>(
        source: S,
        map: StreamMap,
        video_unit: Option<V>,
        audio_unit: Option<A>,
    ) -> Self
    where
        S: PacketSource + 'static,
        V: DecodeUnit<Frame = VideoFrame> + 'static,
        A: DecodeUnit<Frame = AudioFrame> + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let clock = Arc::new(PlaybackClock::new());

        let video_active = map.video.is_some() && video_unit.is_some();
        let audio_active = map.audio.is_some() && audio_unit.is_some();

        let video_packets =
            video_active.then(|| Arc::new(BoundedQueue::new(PACKET_QUEUE_CAPACITY)));
        let audio_packets =
            audio_active.then(|| Arc::new(BoundedQueue::new(PACKET_QUEUE_CAPACITY)));
        let video_frames =
            video_active.then(|| Arc::new(BoundedQueue::new(VIDEO_FRAME_QUEUE_CAPACITY)));
        let audio_frames =
            audio_active.then(|| Arc::new(BoundedQueue::new(AUDIO_FRAME_QUEUE_CAPACITY)));

        let demux = {
            let map = StreamMap {
                video: map.video.filter(|_| video_active),
                audio: map.audio.filter(|_| audio_active),
            };
            let demuxer = Demuxer::new(
                source,
                map,
                video_packets.clone(),
                audio_packets.clone(),
                Arc::clone(&stop),
            );
            thread::spawn(move || demuxer.run())
        };

        let video_decode = match (video_unit, video_packets.clone(), video_frames.clone()) {
            (Some(unit), Some(packets), Some(frames)) => {
                let worker =
                    StreamDecoder::new("video", unit, packets, frames, Arc::clone(&stop));
                Some(thread::spawn(move || worker.run()))
            }
            _ => None,
        };

        let audio_decode = match (audio_unit, audio_packets.clone(), audio_frames.clone()) {
            (Some(unit), Some(packets), Some(frames)) => {
                let worker =
                    StreamDecoder::new("audio", unit, packets, frames, Arc::clone(&stop));
                Some(thread::spawn(move || worker.run()))
            }
            _ => None,
        };

        Self {
            stop,
            clock,
            video_frames,
            audio_frames,
            video_packets,
            audio_packets,
            demux: Some(demux),
            video_decode,
            audio_decode,
        }
    }

    /// The flag every pipeline loop checks at its iteration boundary.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// The shared presentation clock.
    pub fn clock(&self) -> Arc<PlaybackClock> {
        Arc::clone(&self.clock)
    }

    /// The decoded video frame queue, when a video stream is active.
    pub fn video_frames(&self) -> Option<Arc<BoundedQueue<VideoFrame>>> {
        self.video_frames.clone()
    }

    /// The decoded audio frame queue, when an audio stream is active.
    pub fn audio_frames(&self) -> Option<Arc<BoundedQueue<AudioFrame>>> {
        self.audio_frames.clone()
    }

    /**
        Quiesce the pipeline and join its threads. Idempotent; also runs
        on drop.
    */
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);

        if let Some(queue) = &self.video_packets {
            queue.close();
        }
        if let Some(queue) = &self.audio_packets {
            queue.close();
        }
        if let Some(queue) = &self.video_frames {
            queue.close();
        }
        if let Some(queue) = &self.audio_frames {
            queue.close();
        }

        if let Some(handle) = self.demux.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.video_decode.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.audio_decode.take() {
            let _ = handle.join();
        }

        debug!("session stopped");
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.stop();
    }
}
