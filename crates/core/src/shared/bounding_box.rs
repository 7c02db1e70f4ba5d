/// An axis-aligned face box in frame pixel coordinates.
///
/// Produced by a face locator and consumed within the same loop iteration by
/// the crop normaliser and the annotator. The locator is expected to keep it
/// inside the frame; consumers that index pixels clamp it first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection with the `frame_width` x `frame_height` canvas.
    ///
    /// Returns `None` when nothing of the box lies on the canvas.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<BoundingBox> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(frame_width as i32);
        let y2 = self.bottom().min(frame_height as i32);
        let clamped = BoundingBox::new(x1, y1, x2 - x1, y2 - y1);
        if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        }
    }

    /// Point `offset` pixels above the top-left corner. May be negative.
    pub fn anchor_above(&self, offset: i32) -> (i32, i32) {
        (self.x, self.y - offset)
    }
}
