use thiserror::Error;

use crate::shared::constants::EMOTION_LABELS;

use super::emotion_classifier::argmax;

#[derive(Error, Debug, PartialEq)]
pub enum LabelError {
    #[error("classifier produced {actual} scores but the label table has {expected} labels")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("classifier produced no usable score")]
    NoScore,
}

/// Ordered, index-addressed emotion names.
///
/// Index `i` names the classifier's `i`-th output. Immutable once built and
/// handed to the live loop at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Case-insensitive reverse lookup, used to map dataset folder names.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| l.eq_ignore_ascii_case(name))
    }

    /// Map a classifier distribution to `(index, label)` of its argmax.
    pub fn resolve(&self, distribution: &[f32]) -> Result<(usize, &str), LabelError> {
        if distribution.len() != self.labels.len() {
            return Err(LabelError::WidthMismatch {
                expected: self.labels.len(),
                actual: distribution.len(),
            });
        }
        let index = argmax(distribution).ok_or(LabelError::NoScore)?;
        Ok((index, &self.labels[index]))
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new(EMOTION_LABELS)
    }
}
