/*!
    Container reading contract.
*/

use crate::{Packet, Result};

/**
    A blocking packet source.

    One call reads the next packet from the container, regardless of which
    stream it belongs to; routing is the demultiplexer's job. The source
    reports [`Error::Eof`](crate::Error::Eof) once the container is
    exhausted and any other error exactly once, after which the session
    shuts down.
*/
pub trait PacketSource: Send {
    /// Read the next packet, blocking until one is available.
    fn read_packet(&mut self) -> Result<Packet>;
}
