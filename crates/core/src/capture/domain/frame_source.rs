use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to open camera {index}: {message}")]
    Open { index: u32, message: String },
    #[error("failed to read frame: {0}")]
    Read(String),
    #[error("failed to decode frame: {0}")]
    Decode(String),
    #[error("frame source already released")]
    Released,
}

/// Domain interface for a live stream of RGB frames.
///
/// A failed `read` ends the stream from the caller's point of view; sources
/// do not retry internally.
pub trait FrameSource {
    fn read(&mut self) -> Result<Frame, CaptureError>;

    /// Stop the stream and free the device. Calling it twice is a no-op.
    fn release(&mut self);
}
