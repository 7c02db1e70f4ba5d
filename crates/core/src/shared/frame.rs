use image::{ImageBuffer, Rgb};
use ndarray::{ArrayView3, ArrayViewMut3};

/// A single captured frame: contiguous pixel bytes in row-major order.
///
/// Color frames carry RGB (3 channels); the grayscale derivative used for
/// face location carries 1 channel. Format conversion happens at the capture
/// boundary only.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Wraps a decoded RGB image buffer without copying.
    pub fn from_rgb_image(image: ImageBuffer<Rgb<u8>, Vec<u8>>, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_grayscale(&self) -> bool {
        self.channels == 1
    }

    /// Single-channel luma derivative of this frame.
    ///
    /// Uses BT.601 weights (0.299, 0.587, 0.114) in 8-bit fixed point, the
    /// same conversion the cascade and the classifier were trained against.
    /// A frame that is already grayscale is cloned.
    pub fn to_grayscale(&self) -> Frame {
        if self.is_grayscale() {
            return self.clone();
        }
        let channels = self.channels as usize;
        let gray = self
            .data
            .chunks_exact(channels)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect();
        Frame::new(gray, self.width, self.height, 1, self.index)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

/// BT.601 luma with weights 77/150/29 over 256.
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
        assert!(!frame.is_grayscale());
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_from_rgb_image_keeps_pixels() {
        let mut img = ImageBuffer::<Rgb<u8>, Vec<u8>>::new(3, 2);
        img.put_pixel(2, 1, Rgb([10, 20, 30]));
        let frame = Frame::from_rgb_image(img, 7);
        assert_eq!(frame.width(), 3);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 7);
        assert_eq!(frame.as_ndarray()[[1, 2, 1]], 20);
    }

    #[test]
    fn test_to_grayscale_single_channel_same_size() {
        let frame = Frame::new(vec![100u8; 4 * 3 * 3], 4, 3, 3, 9);
        let gray = frame.to_grayscale();
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.width(), 4);
        assert_eq!(gray.height(), 3);
        assert_eq!(gray.index(), 9);
        assert_eq!(gray.data().len(), 12);
        assert!(gray.data().iter().all(|&v| v == 100));
    }

    #[test]
    fn test_to_grayscale_weights_green_most() {
        // red, green, blue pixels
        let frame = Frame::new(vec![255, 0, 0, 0, 255, 0, 0, 0, 255], 3, 1, 3, 0);
        let gray = frame.to_grayscale();
        let (r, g, b) = (gray.data()[0], gray.data()[1], gray.data()[2]);
        assert!(g > r && r > b);
        assert_eq!(r, 77);
        assert_eq!(g, 149);
        assert_eq!(b, 29);
    }

    #[test]
    fn test_to_grayscale_on_gray_frame_is_identity() {
        let frame = Frame::new(vec![1, 2, 3, 4], 2, 2, 1, 0);
        let gray = frame.to_grayscale();
        assert_eq!(gray.data(), frame.data());
    }

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
    }

    #[test]
    fn test_as_ndarray_mut_modification() {
        let data = vec![0u8; 12]; // 2x2x3
        let mut frame = Frame::new(data, 2, 2, 3, 0);
        {
            let mut arr = frame.as_ndarray_mut();
            arr[[0, 1, 2]] = 128; // row=0, col=1, B channel
        }
        assert_eq!(frame.as_ndarray()[[0, 1, 2]], 128);
    }
}
