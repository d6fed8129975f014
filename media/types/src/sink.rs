/*!
    Video output contract.
*/

use crate::{Result, VideoFrame};

/**
    A display surface.

    Receives display-ready frames (a rectangular pixel buffer plus stride)
    from the presentation loop. What happens to them — a window, a texture
    upload, a file — is outside the pipeline's concern.
*/
pub trait DisplaySink: Send {
    /// Present one frame. Failure ends playback.
    fn present(&mut self, frame: &VideoFrame) -> Result<()>;
}
