/*!
    The playback engine.

    A producer/consumer pipeline that demultiplexes a container, decodes
    its elementary streams on worker threads, and paces the results out to
    a display and an audio sink:

    ```text
    source ─ Demuxer ─┬─ packet queue ─ StreamDecoder ─ frame queue ─ PresentationLoop ─ display
                      └─ packet queue ─ StreamDecoder ─ frame queue ─ AudioFeeder ─ audio sink
    ```

    Every stage boundary is a [`BoundedQueue`]; full queues block their
    producer, which is how backpressure reaches all the way back to the
    container read loop. End of stream travels forward as queue closure,
    and shutdown travels everywhere at once through the session stop flag
    plus the same closures.

    The engine is generic over the [`media_types`] collaborator traits, so
    the whole pipeline runs against scripted doubles in tests and against
    the FFmpeg-backed service crates in the player.
*/

mod audio;
mod clock;
mod decoder;
mod demux;
mod pace;
mod present;
mod queue;
mod session;

pub use audio::AudioFeeder;
pub use clock::PlaybackClock;
pub use decoder::StreamDecoder;
pub use demux::{Demuxer, StreamMap};
pub use pace::FramePacer;
pub use present::{
    EMPTY_RETRY_DELAY, IDLE_DELAY, INITIAL_DELAY, PresentationLoop, Tick,
};
pub use queue::BoundedQueue;
pub use session::{
    AUDIO_FRAME_QUEUE_CAPACITY, PACKET_QUEUE_CAPACITY, PlaybackSession,
    VIDEO_FRAME_QUEUE_CAPACITY,
};
