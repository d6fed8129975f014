/*!
    Audio resample service.
*/

use ffmpeg_next::{
    format::sample::{Sample, Type},
    software::resampling::Context as Resampler,
    util::channel_layout::ChannelLayout as FfmpegChannelLayout,
    util::frame::audio::Audio as FfmpegAudioFrame,
};

use media_types::{AudioFrame, AudioResampler, ChannelLayout, Error, Result, SampleFormat};

/**
    Resamples decoded audio to interleaved f32 at a fixed output rate and
    channel layout.

    The resampler context is created on the first frame and rebuilt when
    the input format changes. Filter history lives in the context, so
    frames must be converted in presentation order.
*/
pub struct AudioTransform {
    resampler: Option<Resampler>,
    input: Option<(SampleFormat, ChannelLayout, u32)>,
    out_rate: u32,
    out_channels: ChannelLayout,
}

impl AudioTransform {
    pub fn new(out_rate: u32, out_channels: ChannelLayout) -> Self {
        Self {
            resampler: None,
            input: None,
            out_rate,
            out_channels,
        }
    }

    /// The configured output sample rate in Hz.
    pub fn out_rate(&self) -> u32 {
        self.out_rate
    }

    fn resampler_for(&mut self, frame: &AudioFrame) -> Result<&mut Resampler> {
        let key = (frame.format, frame.channels, frame.sample_rate);
        if self.input != Some(key) {
            let resampler = Resampler::get(
                sample_to_ffmpeg(frame.format),
                layout_to_ffmpeg(frame.channels),
                frame.sample_rate,
                Sample::F32(Type::Packed),
                layout_to_ffmpeg(self.out_channels),
                self.out_rate,
            )
            .map_err(|e| Error::convert(e.to_string()))?;
            self.resampler = Some(resampler);
            self.input = Some(key);
        }
        Ok(self.resampler.as_mut().unwrap())
    }
}

impl AudioResampler for AudioTransform {
    fn convert(&mut self, frame: &AudioFrame) -> Result<Vec<f32>> {
        let source = fill_ffmpeg_frame(frame)?;
        let mut converted = FfmpegAudioFrame::empty();
        self.resampler_for(frame)?
            .run(&source, &mut converted)
            .map_err(|e| Error::convert(e.to_string()))?;

        let total = converted.samples() * self.out_channels.channels() as usize;
        let bytes = &converted.data(0)[..total * 4];
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}

/// Rebuild an FFmpeg frame from an interleaved [`AudioFrame`] buffer.
fn fill_ffmpeg_frame(frame: &AudioFrame) -> Result<FfmpegAudioFrame> {
    let len = frame.total_samples() * frame.format.bytes_per_sample();
    if frame.data.len() < len {
        return Err(Error::convert(format!(
            "audio frame buffer too small: {} < {}",
            frame.data.len(),
            len
        )));
    }

    let mut out = FfmpegAudioFrame::new(
        sample_to_ffmpeg(frame.format),
        frame.samples,
        layout_to_ffmpeg(frame.channels),
    );
    out.set_rate(frame.sample_rate);
    out.data_mut(0)[..len].copy_from_slice(&frame.data[..len]);
    Ok(out)
}

fn sample_to_ffmpeg(format: SampleFormat) -> Sample {
    match format {
        SampleFormat::U8 => Sample::U8(Type::Packed),
        SampleFormat::S16 => Sample::I16(Type::Packed),
        SampleFormat::S32 => Sample::I32(Type::Packed),
        SampleFormat::F32 => Sample::F32(Type::Packed),
        SampleFormat::F64 => Sample::F64(Type::Packed),
    }
}

fn layout_to_ffmpeg(layout: ChannelLayout) -> FfmpegChannelLayout {
    match layout {
        ChannelLayout::Mono => FfmpegChannelLayout::MONO,
        ChannelLayout::Stereo => FfmpegChannelLayout::STEREO,
    }
}

// SAFETY: SwrContext is not Sync, but it has no thread affinity. The
// transform is moved to the audio feeder thread at setup and only ever
// used there.
unsafe impl Send for AudioTransform {}
