/*!
    Frame conversion contracts.

    Decoders emit frames in whatever format the codec dictates; these
    services adapt them for output. The math behind them (scaling,
    colorspace conversion, resampling) is delegated to an external library
    and consumed opaquely.
*/

use crate::{AudioFrame, Result, VideoFrame};

/**
    Pixel-format normalization for display.

    Conversion is stateless per frame: any frame can be converted in any
    order.
*/
pub trait VideoScaler: Send {
    /// Convert a decoded frame into a display-ready frame.
    fn convert(&mut self, frame: &VideoFrame) -> Result<VideoFrame>;
}

/**
    Sample-format and rate conversion for the audio sink.

    Resampling is stateful (filter history), so frames must be converted in
    presentation order.
*/
pub trait AudioResampler: Send {
    /// Convert a decoded frame into interleaved f32 samples at the
    /// output rate.
    fn convert(&mut self, frame: &AudioFrame) -> Result<Vec<f32>>;
}
