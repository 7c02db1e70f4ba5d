//! Emotion classifier backed by an ONNX Runtime session.
//!
//! Expects the ONNX export of the trained Keras model: one `[1, 48, 48, 3]`
//! float input and one `[1, 7]` softmax output. Channels-first exports are
//! detected from the declared input shape.
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::emotion::domain::emotion_classifier::{is_distribution, softmax, EmotionClassifier};
use crate::emotion::domain::face_tensor::FaceTensor;

use super::execution_provider::preferred_execution_providers;

/// Allowed drift of the output sum from 1 before softmax is applied.
const DISTRIBUTION_TOLERANCE: f32 = 1e-3;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to load model {path}: {message}")]
    Session { path: PathBuf, message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputLayout {
    Nhwc,
    Nchw,
}

pub struct OnnxEmotionClassifier {
    session: ort::session::Session,
    layout: InputLayout,
}

impl OnnxEmotionClassifier {
    pub fn new(model_path: &Path) -> Result<Self, ModelLoadError> {
        if !model_path.exists() {
            return Err(ModelLoadError::NotFound(model_path.to_path_buf()));
        }
        let session = build_session(model_path).map_err(|e| ModelLoadError::Session {
            path: model_path.to_path_buf(),
            message: e.to_string(),
        })?;

        let layout = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    layout_from_shape(shape)
                } else {
                    None
                }
            })
            .unwrap_or(InputLayout::Nhwc);

        log::info!(
            "Loaded emotion model {} ({:?} input)",
            model_path.display(),
            layout
        );
        Ok(Self { session, layout })
    }
}

fn build_session(model_path: &Path) -> Result<ort::session::Session, Box<dyn std::error::Error>> {
    let session = ort::session::Session::builder()?
        .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
        .with_execution_providers(preferred_execution_providers())?
        .commit_from_file(model_path)?;
    Ok(session)
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn predict(&mut self, tensor: &FaceTensor) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let batch = match self.layout {
            InputLayout::Nhwc => tensor.to_nhwc_batch(),
            InputLayout::Nchw => tensor.to_nchw_batch(),
        };

        let input_value = ort::value::Tensor::from_array(batch)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("emotion model produced no outputs".into());
        }
        let scores = outputs[0].try_extract_array::<f32>()?;
        let raw: Vec<f32> = scores.iter().copied().collect();

        Ok(to_distribution(raw))
    }
}

/// Channels sit at index 3 for NHWC and index 1 for NCHW.
fn layout_from_shape(shape: &[i64]) -> Option<InputLayout> {
    if shape.len() != 4 {
        return None;
    }
    match (shape[1], shape[3]) {
        (_, 3) => Some(InputLayout::Nhwc),
        (3, _) => Some(InputLayout::Nchw),
        _ => None,
    }
}

fn to_distribution(raw: Vec<f32>) -> Vec<f32> {
    if is_distribution(&raw, DISTRIBUTION_TOLERANCE) {
        raw
    } else {
        softmax(&raw)
    }
}
