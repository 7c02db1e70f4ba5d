use super::face_tensor::FaceTensor;

/// Domain interface for a trained emotion model.
///
/// Returns one non-negative score per label, summing to 1. Implementations
/// hold inference state (sessions, buffers), hence `&mut self`.
pub trait EmotionClassifier {
    fn predict(&mut self, tensor: &FaceTensor) -> Result<Vec<f32>, Box<dyn std::error::Error>>;
}

/// Index of the largest score.
///
/// Ties go to the lowest index; NaN never wins. `None` for an empty slice or
/// one holding only NaN.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// True when `scores` already looks like a probability distribution.
pub fn is_distribution(scores: &[f32], tolerance: f32) -> bool {
    if scores.is_empty() || scores.iter().any(|&s| !(0.0..=1.0).contains(&s)) {
        return false;
    }
    (scores.iter().sum::<f32>() - 1.0).abs() <= tolerance
}
