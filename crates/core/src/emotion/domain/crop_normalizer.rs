use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use thiserror::Error;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::FACE_INPUT_SIZE;
use crate::shared::frame::{luma, Frame};

use super::face_tensor::FaceTensor;

#[derive(Error, Debug, PartialEq)]
pub enum CropError {
    #[error("box {bbox:?} has no overlap with the {width}x{height} frame")]
    OutOfFrame {
        bbox: BoundingBox,
        width: u32,
        height: u32,
    },
    #[error("unsupported channel count {0}, expected 1 or 3")]
    Channels(u8),
}

/// Turns a face box into classifier input.
///
/// The box is clamped to the frame, the grayscale region is resized (not
/// letterboxed, so non-square boxes are stretched) to `size x size` with
/// bilinear filtering, then replicated to 3 channels and scaled to `[0, 1]`.
pub struct CropNormalizer {
    size: u32,
}

impl CropNormalizer {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// `frame` may be the color frame or its grayscale derivative.
    pub fn normalize(&self, frame: &Frame, bbox: &BoundingBox) -> Result<FaceTensor, CropError> {
        if frame.channels() != 1 && frame.channels() != 3 {
            return Err(CropError::Channels(frame.channels()));
        }
        let clamped =
            bbox.clamp_to(frame.width(), frame.height())
                .ok_or(CropError::OutOfFrame {
                    bbox: *bbox,
                    width: frame.width(),
                    height: frame.height(),
                })?;
        if clamped != *bbox {
            log::debug!("Clamped face box {bbox:?} to {clamped:?}");
        }

        let crop = gray_region(frame, &clamped);
        Ok(normalize_gray(&crop, self.size))
    }
}

impl Default for CropNormalizer {
    fn default() -> Self {
        Self::new(FACE_INPUT_SIZE)
    }
}

/// Resize an arbitrary grayscale image to `size x size` and build the tensor.
pub fn normalize_gray(image: &GrayImage, size: u32) -> FaceTensor {
    let resized = if image.dimensions() == (size, size) {
        image.clone()
    } else {
        imageops::resize(image, size, size, FilterType::Triangle)
    };
    FaceTensor::from_gray(&resized)
}

/// Copy the grayscale pixels of an in-bounds box.
fn gray_region(frame: &Frame, bbox: &BoundingBox) -> GrayImage {
    let src = frame.as_ndarray();
    let (x0, y0) = (bbox.x as usize, bbox.y as usize);
    GrayImage::from_fn(bbox.width as u32, bbox.height as u32, |x, y| {
        let (row, col) = (y0 + y as usize, x0 + x as usize);
        let value = if frame.is_grayscale() {
            src[[row, col, 0]]
        } else {
            luma(src[[row, col, 0]], src[[row, col, 1]], src[[row, col, 2]])
        };
        Luma([value])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn gray_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(vec![value; (width * height) as usize], width, height, 1, 0)
    }

    #[rstest]
    #[case::square(BoundingBox::new(10, 10, 40, 40))]
    #[case::wide(BoundingBox::new(0, 20, 90, 15))]
    #[case::tall(BoundingBox::new(30, 0, 8, 100))]
    #[case::single_pixel(BoundingBox::new(5, 5, 1, 1))]
    #[case::whole_frame(BoundingBox::new(0, 0, 100, 100))]
    fn test_output_shape_ignores_aspect_ratio(#[case] bbox: BoundingBox) {
        let frame = gray_frame(100, 100, 128);
        let tensor = CropNormalizer::default().normalize(&frame, &bbox).unwrap();
        assert_eq!(tensor.shape(), (48, 48, 3));
    }

    #[test]
    fn test_values_in_unit_interval() {
        let data: Vec<u8> = (0..100 * 100).map(|i| (i % 256) as u8).collect();
        let frame = Frame::new(data, 100, 100, 1, 0);
        let tensor = CropNormalizer::default()
            .normalize(&frame, &BoundingBox::new(10, 10, 40, 40))
            .unwrap();
        assert!(tensor.view().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_uniform_region_keeps_intensity() {
        let frame = gray_frame(100, 100, 51);
        let tensor = CropNormalizer::default()
            .normalize(&frame, &BoundingBox::new(10, 10, 40, 40))
            .unwrap();
        assert!(tensor
            .view()
            .iter()
            .all(|&v| (v - 51.0 / 255.0).abs() < 1e-6));
    }

    #[test]
    fn test_color_frame_is_converted_to_gray() {
        let frame = Frame::new(vec![255; 20 * 20 * 3], 20, 20, 3, 0);
        let tensor = CropNormalizer::default()
            .normalize(&frame, &BoundingBox::new(0, 0, 10, 10))
            .unwrap();
        assert!(tensor.view().iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_only_box_pixels_are_used() {
        // left half black, right half white; crop the right half only
        let mut data = vec![0u8; 100 * 100];
        for row in 0..100 {
            for col in 50..100 {
                data[row * 100 + col] = 255;
            }
        }
        let frame = Frame::new(data, 100, 100, 1, 0);
        let tensor = CropNormalizer::default()
            .normalize(&frame, &BoundingBox::new(50, 0, 50, 100))
            .unwrap();
        assert!(tensor.view().iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_partially_outside_box_is_clamped() {
        let frame = gray_frame(100, 100, 128);
        let tensor = CropNormalizer::default()
            .normalize(&frame, &BoundingBox::new(80, 80, 50, 50))
            .unwrap();
        assert_eq!(tensor.shape(), (48, 48, 3));
    }

    #[test]
    fn test_fully_outside_box_is_rejected() {
        let frame = gray_frame(100, 100, 128);
        let bbox = BoundingBox::new(150, 10, 20, 20);
        let err = CropNormalizer::default().normalize(&frame, &bbox).unwrap_err();
        assert_eq!(
            err,
            CropError::OutOfFrame {
                bbox,
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn test_unsupported_channels_rejected() {
        let frame = Frame::new(vec![0; 4 * 4 * 4], 4, 4, 4, 0);
        let err = CropNormalizer::default()
            .normalize(&frame, &BoundingBox::new(0, 0, 2, 2))
            .unwrap_err();
        assert_eq!(err, CropError::Channels(4));
    }

    #[test]
    fn test_custom_size() {
        let frame = gray_frame(64, 64, 10);
        let normalizer = CropNormalizer::new(32);
        assert_eq!(normalizer.size(), 32);
        let tensor = normalizer
            .normalize(&frame, &BoundingBox::new(0, 0, 64, 64))
            .unwrap();
        assert_eq!(tensor.shape(), (32, 32, 3));
    }
}
