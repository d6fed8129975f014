/*!
    Frame conversion services for the media playback crate ecosystem.

    Two adapters sit between decoders and output:

    - [`VideoTransform`] converts decoded frames to packed RGBA for
      display. Stateless per frame.
    - [`AudioTransform`] resamples decoded audio to interleaved f32 at the
      output device rate. Stateful — the resampler keeps filter history, so
      frames must arrive in order.

    Both lazily initialize their FFmpeg contexts from the first frame they
    see and rebuild them if the input format changes mid-stream.
*/

mod audio;
mod video;

pub use audio::AudioTransform;
pub use video::VideoTransform;
