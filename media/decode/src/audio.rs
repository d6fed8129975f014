/*!
    Audio decode unit.
*/

use ffmpeg_next::{
    self as ffmpeg,
    codec,
    util::error::EAGAIN,
    util::frame::audio::Audio as FfmpegAudioFrame,
};
use log::warn;

use media_source::CodecConfig;
use media_types::{
    AudioFrame, ChannelLayout, DecodeStatus, DecodeUnit, Error, Packet, Pts, Rational, Result,
    SampleFormat,
};

/**
    Decodes audio packets into [`AudioFrame`]s.

    Planar codec output is interleaved during conversion so every frame
    leaving the unit has the packed layout the resampler expects.
*/
pub struct AudioDecoder {
    decoder: codec::decoder::Audio,
    time_base: Rational,
}

impl AudioDecoder {
    /**
        Create a decoder from the stream's codec configuration.

        Fails with [`Error::DecoderNotFound`] when no decoder exists for
        the stream's codec.
    */
    pub fn new(config: CodecConfig, time_base: Rational) -> Result<Self> {
        ffmpeg::init().map_err(|e| Error::decoder_not_found(e.to_string()))?;

        let context = codec::context::Context::from_parameters(config.into_parameters())
            .map_err(|e| Error::decoder_not_found(e.to_string()))?;
        let decoder = context
            .decoder()
            .audio()
            .map_err(|e| Error::decoder_not_found(e.to_string()))?;

        Ok(Self { decoder, time_base })
    }

    /// The stream's time base.
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// Sample rate of the decoded audio in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.decoder.rate()
    }

    /// Channel count of the decoded audio.
    pub fn channels(&self) -> u16 {
        self.decoder.channels()
    }

    fn convert_frame(&self, decoded: &FfmpegAudioFrame) -> Result<AudioFrame> {
        let samples = decoded.samples();
        if samples == 0 {
            return Err(Error::decode_receive("audio frame has zero samples"));
        }

        let format = sample_format_from_ffmpeg(decoded.format()).ok_or_else(|| {
            Error::convert(format!(
                "unsupported sample format {:?}",
                decoded.format()
            ))
        })?;

        let channel_count = decoded.channels() as usize;
        let channels = match channel_count {
            1 => ChannelLayout::Mono,
            2 => ChannelLayout::Stereo,
            n => {
                // Downstream only handles mono and stereo; treat the first
                // two channels of anything wider as a stereo pair.
                warn!("audio frame has {n} channels, taking the first two");
                ChannelLayout::Stereo
            }
        };
        let out_channels = channels.channels() as usize;

        let bps = format.bytes_per_sample();
        let mut data = vec![0u8; samples * out_channels * bps];
        if decoded.is_planar() {
            for ch in 0..out_channels {
                let plane = decoded.data(ch);
                for (s, sample) in plane.chunks_exact(bps).take(samples).enumerate() {
                    let at = (s * out_channels + ch) * bps;
                    data[at..at + bps].copy_from_slice(sample);
                }
            }
        } else if channel_count == out_channels {
            data.copy_from_slice(&decoded.data(0)[..data.len()]);
        } else {
            // Packed with extra channels: keep the leading pair per sample.
            let src_step = channel_count * bps;
            let dst_step = out_channels * bps;
            let src = decoded.data(0);
            for s in 0..samples {
                data[s * dst_step..(s + 1) * dst_step]
                    .copy_from_slice(&src[s * src_step..s * src_step + dst_step]);
            }
        }

        Ok(AudioFrame {
            data,
            samples,
            sample_rate: decoded.rate(),
            channels,
            format,
            pts: decoded.pts().map(Pts),
            time_base: self.time_base,
        })
    }
}

impl DecodeUnit for AudioDecoder {
    type Frame = AudioFrame;

    fn submit(&mut self, packet: &Packet) -> Result<()> {
        let pkt = crate::make_ffmpeg_packet(packet);
        self.decoder
            .send_packet(&pkt)
            .map_err(|e| Error::decode_submit(e.to_string()))
    }

    fn submit_eof(&mut self) -> Result<()> {
        match self.decoder.send_eof() {
            Ok(()) | Err(ffmpeg::Error::Eof) => Ok(()),
            Err(e) => Err(Error::decode_submit(e.to_string())),
        }
    }

    fn receive(&mut self) -> Result<DecodeStatus<AudioFrame>> {
        let mut decoded = FfmpegAudioFrame::empty();
        match self.decoder.receive_frame(&mut decoded) {
            Ok(()) => Ok(DecodeStatus::Frame(self.convert_frame(&decoded)?)),
            Err(ffmpeg::Error::Other { errno }) if errno == EAGAIN => {
                Ok(DecodeStatus::NeedsInput)
            }
            Err(ffmpeg::Error::Eof) => Ok(DecodeStatus::Finished),
            Err(e) => Err(Error::decode_receive(e.to_string())),
        }
    }
}

fn sample_format_from_ffmpeg(format: ffmpeg::format::Sample) -> Option<SampleFormat> {
    use ffmpeg::format::Sample;

    match format {
        Sample::U8(_) => Some(SampleFormat::U8),
        Sample::I16(_) => Some(SampleFormat::S16),
        Sample::I32(_) => Some(SampleFormat::S32),
        Sample::F32(_) => Some(SampleFormat::F32),
        Sample::F64(_) => Some(SampleFormat::F64),
        _ => None,
    }
}

impl std::fmt::Debug for AudioDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDecoder")
            .field("time_base", &self.time_base)
            .field("sample_rate", &self.decoder.rate())
            .field("channels", &self.decoder.channels())
            .finish_non_exhaustive()
    }
}
