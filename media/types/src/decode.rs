/*!
    The decode unit send/receive protocol.
*/

use crate::{Packet, Result};

/**
    Outcome of one [`DecodeUnit::receive`] call.
*/
#[derive(Debug)]
pub enum DecodeStatus<F> {
    /// A decoded frame is ready.
    Frame(F),
    /// The unit needs another packet before it can produce more frames.
    NeedsInput,
    /// The unit is fully drained; no further frames will appear.
    Finished,
}

/**
    A decoder for one elementary stream.

    Units follow an explicit two-step protocol: [`submit`](Self::submit) one
    packet, then [`receive`](Self::receive) until the unit asks for more
    input. At end of stream, [`submit_eof`](Self::submit_eof) flushes the
    unit so that receive yields every buffered frame before reporting
    [`DecodeStatus::Finished`].

    Units are not thread-safe; each one is owned by a single decoder worker
    thread for its whole life.
*/
pub trait DecodeUnit: Send {
    /// The decoded frame type this unit produces.
    type Frame: Send + 'static;

    /// Hand one packet to the unit. Rejection is fatal for the stream.
    fn submit(&mut self, packet: &Packet) -> Result<()>;

    /// Signal end of stream so buffered frames can be drained.
    fn submit_eof(&mut self) -> Result<()>;

    /// Pull the next decoded frame, or learn that more input is needed.
    fn receive(&mut self) -> Result<DecodeStatus<Self::Frame>>;
}
