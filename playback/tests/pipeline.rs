//! End-to-end pipeline tests over scripted collaborator doubles.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use media_types::{
    AudioFrame, ChannelLayout, DecodeStatus, DecodeUnit, Error, MediaDuration, Packet,
    PacketSource, PixelFormat, Pts, Rational, Result, SampleFormat, VideoFrame,
};
use playback::{BoundedQueue, Demuxer, PlaybackSession, StreamDecoder, StreamMap};

const TB_MS: Rational = Rational { num: 1, den: 1000 };

const VIDEO_STREAM: usize = 0;
const AUDIO_STREAM: usize = 1;

fn packet(stream_index: usize, pts: i64) -> Packet {
    Packet::new(stream_index, vec![0u8; 16], Some(Pts(pts)), MediaDuration(40))
}

fn video_frame(pts: Option<Pts>) -> VideoFrame {
    VideoFrame {
        data: vec![0u8; 4],
        width: 1,
        height: 1,
        stride: 4,
        format: PixelFormat::Rgba,
        repeat: 0,
        pts,
        time_base: TB_MS,
    }
}

fn audio_frame(pts: Option<Pts>) -> AudioFrame {
    AudioFrame {
        data: vec![0u8; 8],
        samples: 4,
        sample_rate: 1000,
        channels: ChannelLayout::Mono,
        format: SampleFormat::S16,
        pts,
        time_base: TB_MS,
    }
}

/// Source double that plays back a fixed packet script, counting reads.
struct ScriptedSource {
    script: VecDeque<Packet>,
    reads: Arc<AtomicUsize>,
}

impl ScriptedSource {
    fn new(script: Vec<Packet>) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        (
            Self {
                script: script.into(),
                reads: Arc::clone(&reads),
            },
            reads,
        )
    }
}

impl PacketSource for ScriptedSource {
    fn read_packet(&mut self) -> Result<Packet> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.script.pop_front().ok_or(Error::Eof)
    }
}

/// Source double that never runs out of video packets.
struct EndlessSource {
    next_pts: i64,
}

impl PacketSource for EndlessSource {
    fn read_packet(&mut self) -> Result<Packet> {
        self.next_pts += 40;
        Ok(packet(VIDEO_STREAM, self.next_pts))
    }
}

/// Decode unit double producing one frame per packet, in submission
/// order.
struct OneToOneVideoUnit {
    ready: VecDeque<VideoFrame>,
    flushed: bool,
}

impl OneToOneVideoUnit {
    fn new() -> Self {
        Self {
            ready: VecDeque::new(),
            flushed: false,
        }
    }
}

impl DecodeUnit for OneToOneVideoUnit {
    type Frame = VideoFrame;

    fn submit(&mut self, packet: &Packet) -> Result<()> {
        self.ready.push_back(video_frame(packet.pts));
        Ok(())
    }

    fn submit_eof(&mut self) -> Result<()> {
        self.flushed = true;
        Ok(())
    }

    fn receive(&mut self) -> Result<DecodeStatus<VideoFrame>> {
        match self.ready.pop_front() {
            Some(frame) => Ok(DecodeStatus::Frame(frame)),
            None if self.flushed => Ok(DecodeStatus::Finished),
            None => Ok(DecodeStatus::NeedsInput),
        }
    }
}

struct OneToOneAudioUnit {
    ready: VecDeque<AudioFrame>,
    flushed: bool,
}

impl OneToOneAudioUnit {
    fn new() -> Self {
        Self {
            ready: VecDeque::new(),
            flushed: false,
        }
    }
}

impl DecodeUnit for OneToOneAudioUnit {
    type Frame = AudioFrame;

    fn submit(&mut self, packet: &Packet) -> Result<()> {
        self.ready.push_back(audio_frame(packet.pts));
        Ok(())
    }

    fn submit_eof(&mut self) -> Result<()> {
        self.flushed = true;
        Ok(())
    }

    fn receive(&mut self) -> Result<DecodeStatus<AudioFrame>> {
        match self.ready.pop_front() {
            Some(frame) => Ok(DecodeStatus::Frame(frame)),
            None if self.flushed => Ok(DecodeStatus::Finished),
            None => Ok(DecodeStatus::NeedsInput),
        }
    }
}

/// Decode unit double that hoards every frame until flushed, like a codec
/// with deep internal buffering.
struct HoardingVideoUnit {
    buffered: VecDeque<VideoFrame>,
    flushed: bool,
}

impl DecodeUnit for HoardingVideoUnit {
    type Frame = VideoFrame;

    fn submit(&mut self, packet: &Packet) -> Result<()> {
        self.buffered.push_back(video_frame(packet.pts));
        Ok(())
    }

    fn submit_eof(&mut self) -> Result<()> {
        self.flushed = true;
        Ok(())
    }

    fn receive(&mut self) -> Result<DecodeStatus<VideoFrame>> {
        if !self.flushed {
            return Ok(DecodeStatus::NeedsInput);
        }
        match self.buffered.pop_front() {
            Some(frame) => Ok(DecodeStatus::Frame(frame)),
            None => Ok(DecodeStatus::Finished),
        }
    }
}

#[test]
fn backpressure_stalls_the_read_loop() {
    // Ten video packets before any audio; a held-full video queue must
    // stall reading before the audio ever gets routed.
    let mut script: Vec<_> = (0..10).map(|n| packet(VIDEO_STREAM, n * 40)).collect();
    script.extend((0..5).map(|n| packet(AUDIO_STREAM, n * 40)));
    let (source, reads) = ScriptedSource::new(script);

    let video_packets = Arc::new(BoundedQueue::new(2));
    let audio_packets = Arc::new(BoundedQueue::new(100));
    let stop = Arc::new(AtomicBool::new(false));

    let demux = Demuxer::new(
        source,
        StreamMap {
            video: Some(VIDEO_STREAM),
            audio: Some(AUDIO_STREAM),
        },
        Some(Arc::clone(&video_packets)),
        Some(Arc::clone(&audio_packets)),
        stop,
    );
    let handle = thread::spawn(move || demux.run());

    // Two packets fit, the third read blocks on push. No audio routing
    // can happen while the loop is stalled.
    thread::sleep(Duration::from_millis(100));
    assert_eq!(reads.load(Ordering::SeqCst), 3);
    assert_eq!(audio_packets.len(), 0);

    // Draining the video queue releases the loop.
    let mut drained = 0;
    while video_packets.pop_timeout(Duration::from_secs(1)).is_some() {
        drained += 1;
    }
    assert_eq!(drained, 10);
    handle.join().unwrap().unwrap();

    assert_eq!(audio_packets.len(), 5);
    assert!(audio_packets.is_closed());
}

#[test]
fn decoder_drains_buffered_frames_on_flush() {
    let packets = Arc::new(BoundedQueue::new(8));
    let frames = Arc::new(BoundedQueue::new(8));
    for n in 0..3 {
        assert!(packets.push(packet(VIDEO_STREAM, n)));
    }
    packets.close();

    let worker = StreamDecoder::new(
        "video",
        HoardingVideoUnit {
            buffered: VecDeque::new(),
            flushed: false,
        },
        Arc::clone(&packets),
        Arc::clone(&frames),
        Arc::new(AtomicBool::new(false)),
    );
    worker.run().unwrap();

    // Every buffered frame came out, in order, before the close.
    for n in 0..3 {
        assert_eq!(frames.pop().unwrap().pts, Some(Pts(n)));
    }
    assert!(frames.pop().is_none());
}

#[test]
fn pipeline_delivers_every_frame_in_order() {
    // 10 video and 10 audio packets, one frame each, interleaved the way
    // a container would hand them out.
    let mut script = Vec::new();
    for n in 0..10 {
        script.push(packet(VIDEO_STREAM, n * 40));
        script.push(packet(AUDIO_STREAM, n * 40));
    }
    let (source, _) = ScriptedSource::new(script);

    let mut session = PlaybackSession::spawn(
        source,
        StreamMap {
            video: Some(VIDEO_STREAM),
            audio: Some(AUDIO_STREAM),
        },
        Some(OneToOneVideoUnit::new()),
        Some(OneToOneAudioUnit::new()),
    );

    let video_frames = session.video_frames().unwrap();
    let video_consumer = thread::spawn(move || {
        let mut seen = Vec::new();
        while let Some(frame) = video_frames.pop() {
            seen.push(frame.pts.unwrap());
        }
        seen
    });

    let audio_frames = session.audio_frames().unwrap();
    let audio_consumer = thread::spawn(move || {
        let mut seen = Vec::new();
        while let Some(frame) = audio_frames.pop() {
            seen.push(frame.pts.unwrap());
        }
        seen
    });

    let expected: Vec<_> = (0..10).map(|n| Pts(n * 40)).collect();
    assert_eq!(video_consumer.join().unwrap(), expected);
    assert_eq!(audio_consumer.join().unwrap(), expected);

    session.stop();
}

#[test]
fn stop_unblocks_every_stalled_thread() {
    // No consumers anywhere: the video frame queue (capacity 1) jams the
    // decoder, the packet queue jams the demultiplexer, and the source
    // never ends. stop() has to wake all of them and join.
    let mut session = PlaybackSession::spawn(
        EndlessSource { next_pts: 0 },
        StreamMap {
            video: Some(VIDEO_STREAM),
            audio: None,
        },
        Some(OneToOneVideoUnit::new()),
        None::<OneToOneAudioUnit>,
    );

    // Give the pipeline time to fill up and block.
    thread::sleep(Duration::from_millis(100));
    session.stop();

    // After stop, the frame queue is closed and drained reads signal the
    // end of the stream.
    let frames = session.video_frames().unwrap();
    while frames.try_pop().is_some() {}
    assert!(frames.pop().is_none());
}
