/*!
    The demultiplexer read loop.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error};

use media_types::{Error, Packet, PacketSource, Result};

use crate::queue::BoundedQueue;

/**
    Which container streams feed the pipeline.

    Only the selected video and audio stream are routed; packets from any
    other stream are dropped without blocking.
*/
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamMap {
    pub video: Option<usize>,
    pub audio: Option<usize>,
}

/**
    Reads packets from the source and routes them into the per-stream
    packet queues.

    Routing uses the queues' blocking `push`, which is what carries
    backpressure all the way to the read loop: once the destination queue
    is full no further packets are read from the container, for any
    stream.

    End of container closes both queues — that closure is the end-of-stream
    token every downstream stage reacts to. A read failure closes them the
    same way and surfaces the error.
*/
pub struct Demuxer<S: PacketSource> {
    source: S,
    map: StreamMap,
    video_packets: Option<Arc<BoundedQueue<Packet>>>,
    audio_packets: Option<Arc<BoundedQueue<Packet>>>,
    stop: Arc<AtomicBool>,
}

impl<S: PacketSource> Demuxer<S> {
    pub fn new(
        source: S,
        map: StreamMap,
        video_packets: Option<Arc<BoundedQueue<Packet>>>,
        audio_packets: Option<Arc<BoundedQueue<Packet>>>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            map,
            video_packets,
            audio_packets,
            stop,
        }
    }

    /// Run the read loop until end of stream, a read error, or shutdown.
    pub fn run(mut self) -> Result<()> {
        let result = self.read_loop();
        self.close_queues();
        if let Err(e) = &result {
            error!("demux: {e}");
        }
        result
    }

    fn read_loop(&mut self) -> Result<()> {
        loop {
            if self.stop.load(Ordering::Relaxed) {
                debug!("demux: stop requested");
                return Ok(());
            }
            if self.video_packets.is_none() && self.audio_packets.is_none() {
                debug!("demux: no consumers left");
                return Ok(());
            }

            let packet = match self.source.read_packet() {
                Ok(packet) => packet,
                Err(Error::Eof) => {
                    debug!("demux: end of container");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            let queue = if self.map.video == Some(packet.stream_index) {
                &mut self.video_packets
            } else if self.map.audio == Some(packet.stream_index) {
                &mut self.audio_packets
            } else {
                // Unselected stream, drop without blocking.
                continue;
            };

            let routed = match queue.as_ref() {
                Some(target) => target.push(packet),
                None => true,
            };
            if !routed {
                // The stream's consumer is gone; stop routing to it and
                // keep any other stream playing.
                *queue = None;
            }
        }
    }

    fn close_queues(&self) {
        if let Some(queue) = &self.video_packets {
            queue.close();
        }
        if let Some(queue) = &self.audio_packets {
            queue.close();
        }
    }
}
