/*!
    Video scale/convert service.
*/

use ffmpeg_next::{
    format::Pixel,
    software::scaling::{Context as Scaler, Flags},
    util::frame::video::Video as FfmpegVideoFrame,
};

use media_types::{Error, PixelFormat, Result, VideoFrame, VideoScaler};

/**
    Converts decoded frames to packed RGBA for display.

    The scaler context is created on the first frame and rebuilt whenever
    the input dimensions or pixel format change.
*/
pub struct VideoTransform {
    scaler: Option<Scaler>,
    input: Option<(u32, u32, PixelFormat)>,
}

impl VideoTransform {
    pub fn new() -> Self {
        Self {
            scaler: None,
            input: None,
        }
    }

    fn scaler_for(&mut self, frame: &VideoFrame) -> Result<&mut Scaler> {
        let key = (frame.width, frame.height, frame.format);
        if self.input != Some(key) {
            let scaler = Scaler::get(
                pixel_to_ffmpeg(frame.format),
                frame.width,
                frame.height,
                Pixel::RGBA,
                frame.width,
                frame.height,
                Flags::BILINEAR,
            )
            .map_err(|e| Error::convert(e.to_string()))?;
            self.scaler = Some(scaler);
            self.input = Some(key);
        }
        Ok(self.scaler.as_mut().unwrap())
    }
}

impl Default for VideoTransform {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: SwsContext is not Sync, but it has no thread affinity. The
// transform is moved to the presentation thread at setup and only ever
// used there.
unsafe impl Send for VideoTransform {}

impl VideoScaler for VideoTransform {
    fn convert(&mut self, frame: &VideoFrame) -> Result<VideoFrame> {
        if frame.format == PixelFormat::Rgba {
            return Ok(frame.clone());
        }

        let source = fill_ffmpeg_frame(frame)?;
        let mut converted = FfmpegVideoFrame::new(Pixel::RGBA, frame.width, frame.height);
        self.scaler_for(frame)?
            .run(&source, &mut converted)
            .map_err(|e| Error::convert(e.to_string()))?;

        // Tightly repack the RGBA rows; sws output rows may be padded.
        let row_bytes = frame.width as usize * 4;
        let src_stride = converted.stride(0);
        let src = converted.data(0);
        let mut data = Vec::with_capacity(row_bytes * frame.height as usize);
        for row in 0..frame.height as usize {
            let start = row * src_stride;
            data.extend_from_slice(&src[start..start + row_bytes]);
        }

        Ok(VideoFrame {
            data,
            width: frame.width,
            height: frame.height,
            stride: row_bytes,
            format: PixelFormat::Rgba,
            repeat: frame.repeat,
            pts: frame.pts,
            time_base: frame.time_base,
        })
    }
}

/// Rebuild an FFmpeg frame from a tightly packed [`VideoFrame`] buffer.
fn fill_ffmpeg_frame(frame: &VideoFrame) -> Result<FfmpegVideoFrame> {
    let expected = frame.format.frame_size(frame.width, frame.height);
    if frame.data.len() < expected {
        return Err(Error::convert(format!(
            "video frame buffer too small: {} < {}",
            frame.data.len(),
            expected
        )));
    }

    let mut out = FfmpegVideoFrame::new(
        pixel_to_ffmpeg(frame.format),
        frame.width,
        frame.height,
    );
    let layout = frame.format.plane_layout(frame.width, frame.height);
    let mut offset = 0;
    for (plane, &(row_bytes, rows)) in layout.iter().enumerate() {
        let dst_stride = out.stride(plane);
        let dst = out.data_mut(plane);
        for row in 0..rows {
            dst[row * dst_stride..row * dst_stride + row_bytes]
                .copy_from_slice(&frame.data[offset..offset + row_bytes]);
            offset += row_bytes;
        }
    }
    Ok(out)
}

fn pixel_to_ffmpeg(format: PixelFormat) -> Pixel {
    match format {
        PixelFormat::Yuv420p => Pixel::YUV420P,
        PixelFormat::Nv12 => Pixel::NV12,
        PixelFormat::Rgba => Pixel::RGBA,
        PixelFormat::Bgra => Pixel::BGRA,
        PixelFormat::Rgb24 => Pixel::RGB24,
    }
}
