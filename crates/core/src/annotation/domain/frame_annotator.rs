use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for drawing inference results onto a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`). Coordinates are
/// not validated: anything drawn off-canvas is silently dropped.
pub trait FrameAnnotator {
    /// Box outline plus the label text just above the box.
    fn annotate_face(
        &self,
        frame: &mut Frame,
        bbox: &BoundingBox,
        label: &str,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Frame-rate readout at a fixed frame-relative position.
    fn annotate_fps(
        &self,
        frame: &mut Frame,
        fps: Option<f64>,
    ) -> Result<(), Box<dyn std::error::Error>>;
}

/// `"FPS: 27"`, truncated toward zero; `"FPS: --"` when unknown.
pub fn fps_text(fps: Option<f64>) -> String {
    match fps {
        Some(v) if v.is_finite() => format!("FPS: {}", v as i64),
        _ => "FPS: --".to_string(),
    }
}
