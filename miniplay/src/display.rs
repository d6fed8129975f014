//! Display sink for the player.

use std::path::PathBuf;

use image::RgbaImage;
use log::debug;

use media_types::{DisplaySink, Error, Result, VideoFrame};

/**
    Accepts presented frames, keeps playback statistics, and optionally
    writes each frame out as a PNG.
*/
pub struct FrameStats {
    dump_dir: Option<PathBuf>,
    presented: u64,
}

impl FrameStats {
    pub fn new(dump_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = &dump_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self {
            dump_dir,
            presented: 0,
        })
    }
}

impl DisplaySink for FrameStats {
    fn present(&mut self, frame: &VideoFrame) -> Result<()> {
        self.presented += 1;
        if self.presented % 100 == 0 {
            debug!(
                "presented {} frames, latest pts {:?}",
                self.presented, frame.pts
            );
        }

        if let Some(dir) = &self.dump_dir {
            let image = RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
                .ok_or_else(|| Error::convert("frame buffer does not match its dimensions"))?;
            let path = dir.join(format!("frame-{:06}.png", self.presented));
            image.save(&path).map_err(|e| Error::convert(e.to_string()))?;
        }

        Ok(())
    }
}
