/*!
    Decode units for the media playback crate ecosystem.

    This crate turns encoded packets into raw frames behind the
    [`DecodeUnit`](media_types::DecodeUnit) send/receive protocol:
    submit one packet, then receive until the unit asks for more input.
    At end of stream an EOF submission flushes the unit so every buffered
    frame drains out before it reports finished.

    One unit instance decodes one elementary stream and is owned by a
    single thread; units are deliberately not shareable.
*/

use ffmpeg_next::{self as ffmpeg, packet::Mut as PacketMut};

use media_types::Packet;

mod audio;
mod video;

pub use audio::AudioDecoder;
pub use video::VideoDecoder;

/// Rebuild an FFmpeg packet, timing fields included, from an ecosystem
/// packet. The payload is copied; FFmpeg owns its own reference counting.
pub(crate) fn make_ffmpeg_packet(packet: &Packet) -> ffmpeg::Packet {
    let mut pkt = if packet.data.is_empty() {
        ffmpeg::Packet::empty()
    } else {
        ffmpeg::Packet::copy(&packet.data)
    };

    unsafe {
        let raw = pkt.as_mut_ptr();
        if let Some(pts) = packet.pts {
            (*raw).pts = pts.0;
        }
        (*raw).duration = packet.duration.0;
    }

    pkt
}
