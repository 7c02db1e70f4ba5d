use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use thiserror::Error;

use crate::dataset::domain::sample_source::{Batch, SampleSource};
use crate::emotion::domain::crop_normalizer::normalize_gray;
use crate::emotion::domain::face_tensor::FaceTensor;
use crate::emotion::domain::label_table::LabelTable;
use crate::shared::constants::{FACE_INPUT_SIZE, IMAGE_EXTENSIONS};
use crate::shared::frame::luma;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("dataset directory not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no class directories under {0}")]
    NoClasses(PathBuf),
    #[error("class directory \"{name}\" does not match any label in {labels:?}")]
    UnknownClass { name: String, labels: Vec<String> },
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let io_error = |source| DatasetError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort();
    Ok(entries)
}

/// Decode an image file into classifier input: BT.601 grayscale, resized to
/// the input size, replicated to 3 channels and scaled to `[0, 1]`.
pub fn load_face(path: &Path, size: u32) -> Result<FaceTensor, image::ImageError> {
    let rgb = image::open(path)?.to_rgb8();
    let gray = GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let p = rgb.get_pixel(x, y);
        Luma([luma(p[0], p[1], p[2])])
    });
    Ok(normalize_gray(&gray, size))
}

/// Class-per-subdirectory image tree (`<root>/<class>/<image>`).
///
/// Directory names are matched case-insensitively against the label table,
/// so `happy/` maps to "Happy". Classes and files are visited in sorted order.
pub struct ImageFolderDataset {
    root: PathBuf,
    samples: Vec<(PathBuf, usize)>,
    size: u32,
}

impl ImageFolderDataset {
    pub fn open(root: &Path, labels: &LabelTable) -> Result<Self, DatasetError> {
        if !root.is_dir() {
            return Err(DatasetError::NotFound(root.to_path_buf()));
        }

        let mut samples = Vec::new();
        let mut classes = 0;
        for class_dir in sorted_entries(root)?.into_iter().filter(|p| p.is_dir()) {
            let name = class_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let label = labels
                .index_of(&name)
                .ok_or_else(|| DatasetError::UnknownClass {
                    name: name.clone(),
                    labels: labels.labels().to_vec(),
                })?;

            let before = samples.len();
            samples.extend(
                sorted_entries(&class_dir)?
                    .into_iter()
                    .filter(|p| p.is_file() && is_image(p))
                    .map(|p| (p, label)),
            );
            log::debug!("{name}: {} images", samples.len() - before);
            classes += 1;
        }

        if classes == 0 {
            return Err(DatasetError::NoClasses(root.to_path_buf()));
        }
        log::info!(
            "Found {} images in {classes} classes under {}",
            samples.len(),
            root.display()
        );

        Ok(Self {
            root: root.to_path_buf(),
            samples,
            size: FACE_INPUT_SIZE,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn samples(&self) -> &[(PathBuf, usize)] {
        &self.samples
    }
}

impl SampleSource for ImageFolderDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn batches(&self, batch_size: usize) -> Box<dyn Iterator<Item = Batch> + '_> {
        let size = self.size;
        Box::new(self.samples.chunks(batch_size.max(1)).map(move |chunk| {
            let mut tensors = Vec::with_capacity(chunk.len());
            let mut labels = Vec::with_capacity(chunk.len());
            for (path, label) in chunk {
                match load_face(path, size) {
                    Ok(tensor) => {
                        tensors.push(tensor);
                        labels.push(*label);
                    }
                    Err(e) => log::warn!("Skipping {}: {e}", path.display()),
                }
            }
            (tensors, labels)
        }))
    }
}
