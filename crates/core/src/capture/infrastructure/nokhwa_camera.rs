use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::capture::domain::frame_source::{CaptureError, FrameSource};
use crate::shared::frame::Frame;

/// Webcam frame source backed by nokhwa's native backend.
///
/// Frames are decoded to packed RGB before they leave this type.
pub struct NokhwaCamera {
    camera: Camera,
    frames_read: usize,
    released: bool,
}

impl NokhwaCamera {
    /// Open camera `index` at its highest available frame rate and start the stream.
    pub fn open(index: u32) -> Result<Self, CaptureError> {
        let open_error = |e: nokhwa::NokhwaError| CaptureError::Open {
            index,
            message: e.to_string(),
        };

        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested).map_err(open_error)?;
        camera.open_stream().map_err(open_error)?;

        let resolution = camera.resolution();
        log::info!(
            "Opened camera {index} ({}) at {}x{}",
            camera.info().human_name(),
            resolution.width(),
            resolution.height()
        );

        Ok(Self {
            camera,
            frames_read: 0,
            released: false,
        })
    }
}

impl FrameSource for NokhwaCamera {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        if self.released {
            return Err(CaptureError::Released);
        }
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::Read(e.to_string()))?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Decode(e.to_string()))?;

        let frame = Frame::from_rgb_image(image, self.frames_read);
        self.frames_read += 1;
        Ok(frame)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("Error stopping camera stream: {e}");
        }
        log::debug!("Camera released after {} frames", self.frames_read);
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.release();
    }
}
