use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for locating frontal faces.
///
/// Takes the grayscale derivative of a frame. Zero boxes is a valid result;
/// callers must not rely on any ordering between boxes.
pub trait FaceLocator {
    fn locate(&mut self, gray: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>>;
}
