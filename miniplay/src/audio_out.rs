//! cpal-backed audio output.
//!
//! The output device runs its own real-time thread and pulls samples by
//! invoking the stream's data callback; the callback delegates straight
//! to the pipeline's [`AudioFeeder`], which fills or silence-pads exactly
//! the requested length.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};

use media_transform::AudioTransform;
use media_types::{AudioFrame, ChannelLayout, Error, Result};
use playback::{AudioFeeder, BoundedQueue, PlaybackClock};

/**
    A usable output device, found by [`probe`] before the pipeline is
    wired. Probing first matters: once the session routes an audio stream,
    something has to drain it, so the audio stream is only activated when
    a device is known to exist.
*/
pub struct OutputDevice {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
    layout: ChannelLayout,
    sample_rate: u32,
}

impl OutputDevice {
    /// The device's native sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The device's channel layout.
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }
}

/**
    Find the default output device and check that the pipeline can feed
    it: f32 samples, mono or stereo.
*/
pub fn probe() -> Result<OutputDevice> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::open("no audio output device"))?;
    let config = device
        .default_output_config()
        .map_err(|e| Error::open(e.to_string()))?;

    if config.sample_format() != cpal::SampleFormat::F32 {
        return Err(Error::open(format!(
            "audio device wants {:?}, only f32 output is supported",
            config.sample_format()
        )));
    }
    let layout = match config.channels() {
        1 => ChannelLayout::Mono,
        2 => ChannelLayout::Stereo,
        n => {
            return Err(Error::open(format!(
                "audio device wants {n} channels, only mono/stereo output is supported"
            )));
        }
    };
    let sample_rate = config.sample_rate().0;

    Ok(OutputDevice {
        device,
        config,
        layout,
        sample_rate,
    })
}

/**
    An open output stream on a probed device.

    Dropping it stops the callbacks.
*/
pub struct AudioOutput {
    _stream: cpal::Stream,
}

impl AudioOutput {
    /**
        Start pulling from the decoded audio frame queue.

        The resampler is configured from the device's own rate and channel
        layout, so whatever the decoder emits ends up in the format the
        device wants.
    */
    pub fn start(
        output: OutputDevice,
        frames: Arc<BoundedQueue<AudioFrame>>,
        clock: Arc<PlaybackClock>,
        stop: Arc<AtomicBool>,
    ) -> Result<Self> {
        let resampler = AudioTransform::new(output.sample_rate, output.layout);
        let mut feeder = AudioFeeder::new(frames, resampler, clock, stop);

        let stream = output
            .device
            .build_output_stream(
                &output.config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| feeder.fill(data),
                |err| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| Error::open(e.to_string()))?;
        stream.play().map_err(|e| Error::open(e.to_string()))?;

        info!(
            "audio output: {} Hz, {} channel(s)",
            output.sample_rate,
            output.layout.channels()
        );
        Ok(Self { _stream: stream })
    }
}
