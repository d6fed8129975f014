/*!
    The per-stream decode worker.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error};

use media_types::{DecodeStatus, DecodeUnit, Packet, Result};

use crate::queue::BoundedQueue;

/**
    Drives one decode unit from a packet queue into a frame queue.

    Each worker runs on its own thread and owns its unit exclusively. The
    iteration is: blocking pop for a packet, submit it, then drain every
    frame the unit has ready. When the packet queue closes, the unit is
    flushed with an EOF submission so buffered frames drain out, and the
    frame queue is closed behind them — propagating the end-of-stream
    token one stage further.

    Failures here are fatal for this stream only: the worker logs, closes
    its frame queue so consumers finish cleanly, and exits. Other streams
    play on.
*/
pub struct StreamDecoder<D: DecodeUnit> {
    label: &'static str,
    unit: D,
    packets: Arc<BoundedQueue<Packet>>,
    frames: Arc<BoundedQueue<D::Frame>>,
    stop: Arc<AtomicBool>,
}

impl<D: DecodeUnit> StreamDecoder<D> {
    pub fn new(
        label: &'static str,
        unit: D,
        packets: Arc<BoundedQueue<Packet>>,
        frames: Arc<BoundedQueue<D::Frame>>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            label,
            unit,
            packets,
            frames,
            stop,
        }
    }

    /// Run the decode loop until end of stream, a decode error, or
    /// shutdown.
    pub fn run(mut self) -> Result<()> {
        let result = self.decode_loop();
        // Close both ends: the frame queue carries the end-of-stream token
        // downstream, and a closed packet queue tells the demultiplexer to
        // stop routing to a stream nobody consumes anymore.
        self.frames.close();
        self.packets.close();
        if let Err(e) = &result {
            error!("{} decoder: {e}", self.label);
        }
        result
    }

    fn decode_loop(&mut self) -> Result<()> {
        loop {
            if self.stop.load(Ordering::Relaxed) {
                debug!("{} decoder: stop requested", self.label);
                return Ok(());
            }

            let Some(packet) = self.packets.pop() else {
                // Closing token: flush buffered frames, then finish.
                debug!("{} decoder: packet queue closed, draining", self.label);
                self.unit.submit_eof()?;
                self.drain()?;
                return Ok(());
            };

            self.unit.submit(&packet)?;
            drop(packet);

            if !self.drain()? {
                // Frame queue closed: shutdown in progress.
                return Ok(());
            }
        }
    }

    /**
        Pull frames out of the unit until it wants more input or is done.
        Returns `false` when the frame queue refused a frame (closed).
    */
    fn drain(&mut self) -> Result<bool> {
        loop {
            match self.unit.receive()? {
                DecodeStatus::Frame(frame) => {
                    if !self.frames.push(frame) {
                        return Ok(false);
                    }
                }
                DecodeStatus::NeedsInput | DecodeStatus::Finished => return Ok(true),
            }
        }
    }
}
