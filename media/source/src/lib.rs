/*!
    Container input for the media playback crate ecosystem.

    Opens a container by path, enumerates its streams, and exposes the
    blocking "read next packet" operation the demultiplexer drives. Wraps
    FFmpeg; nothing FFmpeg-specific leaks past the crate boundary.

    The first video stream and the first audio stream found during probing
    are selected; further streams of either kind are ignored by the
    pipeline (their packets are still returned by [`Source::read_packet`]
    and dropped downstream).
*/

use std::path::Path;

use ffmpeg_next::{self as ffmpeg, media, util::error::EAGAIN};
use log::debug;

use media_types::{Error, MediaDuration, Packet, PacketSource, Pts, Rational, Result};

/**
    Codec parameters for one selected stream, handed to the matching
    decode unit.
*/
pub struct CodecConfig {
    parameters: ffmpeg::codec::Parameters,
}

impl CodecConfig {
    /// Consume the config, yielding the underlying codec parameters.
    pub fn into_parameters(self) -> ffmpeg::codec::Parameters {
        self.parameters
    }
}

/**
    Description of a selected elementary stream.
*/
pub struct StreamDesc {
    /// Stream index within the container.
    pub index: usize,
    /// The stream's time base.
    pub time_base: Rational,
}

/**
    An open media container.
*/
pub struct Source {
    input: ffmpeg::format::context::Input,
    video: Option<StreamDesc>,
    audio: Option<StreamDesc>,
}

impl Source {
    /**
        Open a container and probe its streams.

        Fails with [`Error::Open`] if the path cannot be opened or probed,
        and with [`Error::StreamInfo`] if the container holds neither an
        audio nor a video stream.
    */
    pub fn open(path: &Path) -> Result<Self> {
        ffmpeg::init().map_err(|e| Error::open(e.to_string()))?;

        let input = ffmpeg::format::input(&path).map_err(|e| Error::open(e.to_string()))?;

        // First stream of each kind wins.
        let mut video = None;
        let mut audio = None;
        for stream in input.streams() {
            let desc = StreamDesc {
                index: stream.index(),
                time_base: convert_rational(stream.time_base()),
            };
            match stream.parameters().medium() {
                media::Type::Video if video.is_none() => video = Some(desc),
                media::Type::Audio if audio.is_none() => audio = Some(desc),
                _ => {}
            }
        }

        if video.is_none() && audio.is_none() {
            return Err(Error::stream_info("no audio or video streams found"));
        }

        debug!(
            "opened {:?}: video stream {:?}, audio stream {:?}",
            path,
            video.as_ref().map(|s| s.index),
            audio.as_ref().map(|s| s.index),
        );

        Ok(Self {
            input,
            video,
            audio,
        })
    }

    /// The selected video stream, if the container has one.
    pub fn video(&self) -> Option<&StreamDesc> {
        self.video.as_ref()
    }

    /// The selected audio stream, if the container has one.
    pub fn audio(&self) -> Option<&StreamDesc> {
        self.audio.as_ref()
    }

    /// Codec parameters of the selected video stream.
    pub fn video_codec_config(&self) -> Option<CodecConfig> {
        self.stream_codec_config(self.video.as_ref()?.index)
    }

    /// Codec parameters of the selected audio stream.
    pub fn audio_codec_config(&self) -> Option<CodecConfig> {
        self.stream_codec_config(self.audio.as_ref()?.index)
    }

    fn stream_codec_config(&self, index: usize) -> Option<CodecConfig> {
        let stream = self.input.stream(index)?;
        Some(CodecConfig {
            parameters: stream.parameters(),
        })
    }
}

impl PacketSource for Source {
    fn read_packet(&mut self) -> Result<Packet> {
        let mut packet = ffmpeg::Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => {}
            // The source treats a transiently empty container like a
            // finished one; there is no retry path.
            Err(ffmpeg::Error::Eof) => return Err(Error::Eof),
            Err(ffmpeg::Error::Other { errno }) if errno == EAGAIN => {
                return Err(Error::Eof);
            }
            Err(e) => return Err(Error::read(e.to_string())),
        }

        Ok(Packet::new(
            packet.stream(),
            packet.data().map(<[u8]>::to_vec).unwrap_or_default(),
            packet.pts().map(Pts),
            MediaDuration(packet.duration()),
        ))
    }
}

fn convert_rational(r: ffmpeg::Rational) -> Rational {
    Rational::new(r.numerator(), r.denominator())
}
