/*!
    Encoded packet type.
*/

use crate::{MediaDuration, Pts};

/**
    An encoded media packet.

    One compressed unit belonging to exactly one elementary stream, as read
    from the container. Ownership of the payload moves into a packet queue on
    push and out again on pop; the consuming decoder drops it after
    submission.
*/
#[derive(Clone, Debug)]
pub struct Packet {
    /// Index of the stream this packet belongs to.
    pub stream_index: usize,
    /// Compressed payload.
    pub data: Vec<u8>,
    /// Presentation timestamp in stream time_base units, if the container
    /// provided one.
    pub pts: Option<Pts>,
    /// Duration of this packet's content in stream time_base units.
    pub duration: MediaDuration,
}

impl Packet {
    /**
        Create a new packet.
    */
    pub fn new(
        stream_index: usize,
        data: Vec<u8>,
        pts: Option<Pts>,
        duration: MediaDuration,
    ) -> Self {
        Self {
            stream_index,
            data,
            pts,
            duration,
        }
    }
}

// Packets move between the demux thread and decoder threads.
static_assertions::assert_impl_all!(Packet: Send, Sync);
