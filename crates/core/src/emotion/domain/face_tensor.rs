use image::GrayImage;
use ndarray::{Array3, Array4, ArrayView3, Axis};

use crate::shared::constants::FACE_INPUT_CHANNELS;

/// Classifier input: `size x size x 3` floats in `[0, 1]`, channels last.
///
/// The three channels carry the same grayscale intensity; the model was
/// trained on 3-channel input while faces are located on a 1-channel image.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceTensor {
    data: Array3<f32>,
}

impl FaceTensor {
    /// Build from a square grayscale image, replicating to 3 channels and
    /// scaling `[0, 255]` to `[0, 1]`.
    pub fn from_gray(image: &GrayImage) -> Self {
        let (w, h) = image.dimensions();
        debug_assert_eq!(w, h, "face tensor source must be square");
        let data = Array3::from_shape_fn((h as usize, w as usize, FACE_INPUT_CHANNELS), |(y, x, _)| {
            image.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
        });
        Self { data }
    }

    /// `(height, width, channels)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// `[1, H, W, C]` batch of one, as exported Keras models expect.
    pub fn to_nhwc_batch(&self) -> Array4<f32> {
        self.data.clone().insert_axis(Axis(0))
    }

    /// `[1, C, H, W]` batch of one.
    pub fn to_nchw_batch(&self) -> Array4<f32> {
        self.data
            .view()
            .permuted_axes([2, 0, 1])
            .to_owned()
            .insert_axis(Axis(0))
    }
}
