/*!
    Video decode unit.
*/

use ffmpeg_next::{
    self as ffmpeg,
    codec,
    format::Pixel,
    util::error::EAGAIN,
    util::frame::video::Video as FfmpegVideoFrame,
};

use media_source::CodecConfig;
use media_types::{
    DecodeStatus, DecodeUnit, Error, Packet, PixelFormat, Pts, Rational, Result, VideoFrame,
};

/**
    Decodes video packets into [`VideoFrame`]s.

    Frames come out stamped with the stream's time base so downstream
    components can derive presentation seconds without knowing where the
    frame came from.
*/
pub struct VideoDecoder {
    decoder: codec::decoder::Video,
    time_base: Rational,
}

impl VideoDecoder {
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
            .video()
            .map_err(|e| Error::decoder_not_found(e.to_string()))?;

        Ok(Self { decoder, time_base })
    }

    /// The stream's time base.
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// Coded frame width in pixels.
    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    /// Coded frame height in pixels.
    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    fn convert_frame(&self, decoded: &FfmpegVideoFrame) -> Result<VideoFrame> {
        let width = decoded.width();
        let height = decoded.height();
        let format = pixel_format_from_ffmpeg(decoded.format()).ok_or_else(|| {
            Error::convert(format!(
                "unsupported pixel format {:?}",
                decoded.format()
            ))
        })?;

        // Serialize the planes tightly, dropping FFmpeg's row padding.
        let layout = format.plane_layout(width, height);
        let mut data = Vec::with_capacity(format.frame_size(width, height));
        for (plane, &(row_bytes, rows)) in layout.iter().enumerate() {
            let src = decoded.data(plane);
            let src_stride = decoded.stride(plane);
            for row in 0..rows {
                let start = row * src_stride;
                data.extend_from_slice(&src[start..start + row_bytes]);
            }
        }

        // repeat_pict is not surfaced by the bindings.
        let repeat = unsafe { (*decoded.as_ptr()).repeat_pict };

        Ok(VideoFrame {
            data,
            width,
            height,
            stride: layout[0].0,
            format,
            repeat,
            pts: decoded.pts().map(Pts),
            time_base: self.time_base,
        })
    }
}

impl DecodeUnit for VideoDecoder {
    type Frame = VideoFrame;

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

    fn receive(&mut self) -> Result<DecodeStatus<VideoFrame>> {
        let mut decoded = FfmpegVideoFrame::empty();
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

fn pixel_format_from_ffmpeg(format: Pixel) -> Option<PixelFormat> {
    match format {
        Pixel::YUV420P | Pixel::YUVJ420P => Some(PixelFormat::Yuv420p),
        Pixel::NV12 => Some(PixelFormat::Nv12),
        Pixel::RGBA => Some(PixelFormat::Rgba),
        Pixel::BGRA => Some(PixelFormat::Bgra),
        Pixel::RGB24 => Some(PixelFormat::Rgb24),
        _ => None,
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("time_base", &self.time_base)
            .field("width", &self.decoder.width())
            .field("height", &self.decoder.height())
            .finish_non_exhaustive()
    }
}
