//! Frontal face locator backed by an OpenCV Haar cascade.
use std::path::Path;

use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use thiserror::Error;

use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{CASCADE_MIN_NEIGHBORS, CASCADE_SCALE_FACTOR};
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CascadeLoadError {
    #[error("cascade path is not valid UTF-8: {0}")]
    InvalidPath(std::path::PathBuf),
    #[error("failed to load cascade {path}: {source}")]
    Load {
        path: std::path::PathBuf,
        #[source]
        source: opencv::Error,
    },
    #[error("cascade {0} loaded but contains no stages")]
    Empty(std::path::PathBuf),
}

pub struct HaarCascadeLocator {
    classifier: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
}

impl HaarCascadeLocator {
    /// Load a cascade XML with the default detection parameters
    /// (scale factor 1.3, min neighbors 5).
    pub fn new(cascade_path: &Path) -> Result<Self, CascadeLoadError> {
        let path_str = cascade_path
            .to_str()
            .ok_or_else(|| CascadeLoadError::InvalidPath(cascade_path.to_path_buf()))?;

        let classifier =
            CascadeClassifier::new(path_str).map_err(|e| CascadeLoadError::Load {
                path: cascade_path.to_path_buf(),
                source: e,
            })?;

        let empty = classifier.empty().map_err(|e| CascadeLoadError::Load {
            path: cascade_path.to_path_buf(),
            source: e,
        })?;
        if empty {
            return Err(CascadeLoadError::Empty(cascade_path.to_path_buf()));
        }

        log::debug!("Loaded Haar cascade from {}", cascade_path.display());
        Ok(Self {
            classifier,
            scale_factor: CASCADE_SCALE_FACTOR,
            min_neighbors: CASCADE_MIN_NEIGHBORS,
        })
    }
}

impl FaceLocator for HaarCascadeLocator {
    fn locate(&mut self, gray: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        if !gray.is_grayscale() {
            return Err(format!(
                "cascade expects a 1-channel frame, got {} channels",
                gray.channels()
            )
            .into());
        }

        let mat = Mat::from_slice(gray.data())?;
        let mat = mat.reshape(1, gray.height() as i32)?;

        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &mat,
            &mut faces,
            self.scale_factor,
            self.min_neighbors,
            0,
            Size::new(0, 0),
            Size::new(0, 0),
        )?;

        Ok(faces.iter().map(to_bounding_box).collect())
    }
}

fn to_bounding_box(rect: Rect) -> BoundingBox {
    BoundingBox::new(rect.x, rect.y, rect.width, rect.height)
}
