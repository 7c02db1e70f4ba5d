use image::{ImageBuffer, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use thiserror::Error;

use crate::annotation::domain::frame_annotator::{fps_text, FrameAnnotator};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{
    FACE_BOX_COLOR, FACE_BOX_THICKNESS, FPS_ANCHOR, FPS_COLOR, FPS_TEXT_SCALE, LABEL_OFFSET,
    LABEL_TEXT_SCALE,
};
use crate::shared::frame::Frame;

use super::bitmap_font;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("overlay needs a 3-channel RGB frame, got {0} channel(s)")]
    NotRgb(u8),
}

type RgbCanvas<'a> = ImageBuffer<Rgb<u8>, &'a mut [u8]>;

/// Draws face boxes, labels and the FPS readout directly into the frame
/// buffer using imageproc primitives and the built-in bitmap font.
pub struct OverlayAnnotator {
    box_color: Rgb<u8>,
    fps_color: Rgb<u8>,
    thickness: u32,
    label_scale: u32,
    fps_scale: u32,
}

impl OverlayAnnotator {
    pub fn new() -> Self {
        Self {
            box_color: Rgb(FACE_BOX_COLOR),
            fps_color: Rgb(FPS_COLOR),
            thickness: FACE_BOX_THICKNESS,
            label_scale: LABEL_TEXT_SCALE,
            fps_scale: FPS_TEXT_SCALE,
        }
    }
}

impl Default for OverlayAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

fn canvas(frame: &mut Frame) -> Result<RgbCanvas<'_>, AnnotateError> {
    let channels = frame.channels();
    if channels != 3 {
        return Err(AnnotateError::NotRgb(channels));
    }
    let (width, height) = (frame.width(), frame.height());
    ImageBuffer::from_raw(width, height, frame.data_mut()).ok_or(AnnotateError::NotRgb(channels))
}

impl FrameAnnotator for OverlayAnnotator {
    fn annotate_face(
        &self,
        frame: &mut Frame,
        bbox: &BoundingBox,
        label: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut canvas = canvas(frame)?;

        // Thicker outlines are nested 1px rectangles growing inward.
        for inset in 0..self.thickness as i32 {
            let w = bbox.width - 2 * inset;
            let h = bbox.height - 2 * inset;
            if w <= 0 || h <= 0 {
                break;
            }
            let rect = Rect::at(bbox.x + inset, bbox.y + inset).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut canvas, rect, self.box_color);
        }

        let (x, baseline) = bbox.anchor_above(LABEL_OFFSET);
        bitmap_font::draw_text(&mut canvas, label, x, baseline, self.label_scale, self.box_color);
        Ok(())
    }

    fn annotate_fps(
        &self,
        frame: &mut Frame,
        fps: Option<f64>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut canvas = canvas(frame)?;
        let (x, baseline) = FPS_ANCHOR;
        bitmap_font::draw_text(&mut canvas, &fps_text(fps), x, baseline, self.fps_scale, self.fps_color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![0; (width * height * 3) as usize], width, height, 3, 0)
    }

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * frame.width() + x) * 3) as usize;
        [frame.data()[i], frame.data()[i + 1], frame.data()[i + 2]]
    }

    fn lit_in(frame: &Frame, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>, color: [u8; 3]) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| pixel(frame, x, y) == color)
            .count()
    }

    #[test]
    fn test_box_outline_is_two_pixels_thick() {
        let mut frame = black_frame(200, 200);
        let annotator = OverlayAnnotator::new();
        let bbox = BoundingBox::new(50, 60, 40, 40);
        annotator.annotate_face(&mut frame, &bbox, "Happy").unwrap();

        assert_eq!(pixel(&frame, 50, 60), FACE_BOX_COLOR);
        assert_eq!(pixel(&frame, 51, 61), FACE_BOX_COLOR);
        assert_eq!(pixel(&frame, 89, 99), FACE_BOX_COLOR);
        assert_eq!(pixel(&frame, 88, 98), FACE_BOX_COLOR);
        // interior stays untouched
        assert_eq!(pixel(&frame, 70, 80), [0, 0, 0]);
        assert_eq!(pixel(&frame, 52, 62), [0, 0, 0]);
    }

    #[test]
    fn test_label_drawn_above_box() {
        let mut frame = black_frame(200, 200);
        let annotator = OverlayAnnotator::new();
        let bbox = BoundingBox::new(50, 60, 40, 40);
        annotator.annotate_face(&mut frame, &bbox, "Sad").unwrap();

        // baseline at y = 50, glyphs fill the 21 rows above it
        let text_w = bitmap_font::text_width("Sad", LABEL_TEXT_SCALE);
        assert!(lit_in(&frame, 50..50 + text_w, 29..50, FACE_BOX_COLOR) > 0);
        // nothing between the baseline and the box top
        assert_eq!(lit_in(&frame, 50..90, 50..60, FACE_BOX_COLOR), 0);
    }

    #[test]
    fn test_label_for_box_at_top_edge_is_clipped() {
        let mut frame = black_frame(64, 64);
        let annotator = OverlayAnnotator::new();
        let bbox = BoundingBox::new(0, 0, 30, 30);
        annotator.annotate_face(&mut frame, &bbox, "Surprise").unwrap();
        // only the outline is visible
        assert_eq!(pixel(&frame, 0, 0), FACE_BOX_COLOR);
        assert_eq!(pixel(&frame, 15, 15), [0, 0, 0]);
    }

    #[test]
    fn test_box_partially_outside_frame_does_not_panic() {
        let mut frame = black_frame(50, 50);
        let annotator = OverlayAnnotator::new();
        let bbox = BoundingBox::new(30, 30, 60, 60);
        annotator.annotate_face(&mut frame, &bbox, "Fear").unwrap();
        assert_eq!(pixel(&frame, 30, 30), FACE_BOX_COLOR);
    }

    #[test]
    fn test_fps_text_drawn_at_anchor() {
        let mut frame = black_frame(200, 100);
        let annotator = OverlayAnnotator::new();
        annotator.annotate_fps(&mut frame, Some(24.6)).unwrap();

        let text_w = bitmap_font::text_width("FPS: 24", FPS_TEXT_SCALE);
        assert!(lit_in(&frame, 10..10 + text_w, 16..30, FPS_COLOR) > 0);
        assert_eq!(lit_in(&frame, 0..200, 30..100, FPS_COLOR), 0);
        assert_eq!(lit_in(&frame, 0..10, 0..100, FPS_COLOR), 0);
    }

    #[test]
    fn test_unknown_fps_still_drawn() {
        let mut frame = black_frame(200, 100);
        OverlayAnnotator::new().annotate_fps(&mut frame, None).unwrap();
        assert!(lit_in(&frame, 10..200, 16..30, FPS_COLOR) > 0);
    }

    #[test]
    fn test_grayscale_frame_rejected() {
        let mut frame = Frame::new(vec![0; 100], 10, 10, 1, 0);
        let annotator = OverlayAnnotator::new();
        assert!(annotator.annotate_fps(&mut frame, Some(1.0)).is_err());
        let bbox = BoundingBox::new(1, 1, 5, 5);
        assert!(annotator.annotate_face(&mut frame, &bbox, "Angry").is_err());
    }
}
