/*!
    Shared types for the media playback crate ecosystem.

    This crate defines the vocabulary of the ecosystem — the types and trait
    contracts that cross crate boundaries. It has no dependency on FFmpeg,
    so the playback engine and its tests can depend on it without pulling
    in codec bindings.

    # Core Types

    - [`Rational`] - Rational time bases
    - [`Pts`] and [`MediaDuration`] - Timestamps in time_base units
    - [`Packet`] - Encoded packet data
    - [`VideoFrame`] and [`AudioFrame`] - Decoded frame data

    # Format Types

    - [`PixelFormat`] - Video pixel formats
    - [`SampleFormat`] - Audio sample formats
    - [`ChannelLayout`] - Audio channel layouts

    # Collaborator Contracts

    - [`PacketSource`] - Container reading
    - [`DecodeUnit`] and [`DecodeStatus`] - The decode send/receive protocol
    - [`VideoScaler`] and [`AudioResampler`] - Frame conversion services
    - [`DisplaySink`] - Video output

    # Error Handling

    - [`Error`] and [`Result`] - Common error types; [`Error::Eof`] is the
      normal end-of-stream signal, not a failure
*/

mod decode;
mod error;
mod format;
mod frame;
mod packet;
mod sink;
mod source;
mod time;
mod transform;

pub use decode::{DecodeStatus, DecodeUnit};
pub use error::{Error, Result};
pub use format::{ChannelLayout, PixelFormat, SampleFormat};
pub use frame::{AudioFrame, VideoFrame};
pub use packet::Packet;
pub use sink::DisplaySink;
pub use source::PacketSource;
pub use time::{MediaDuration, Pts, Rational};
pub use transform::{AudioResampler, VideoScaler};
