use crate::emotion::domain::face_tensor::FaceTensor;

/// Classifier inputs paired with their ground-truth label indices.
pub type Batch = (Vec<FaceTensor>, Vec<usize>);

/// Domain interface for a labelled collection of face images.
pub trait SampleSource {
    /// Number of samples discovered, including ones that may fail to load.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Yields batches of at most `batch_size` samples. Unreadable samples are
    /// skipped, so a batch may come out shorter.
    fn batches(&self, batch_size: usize) -> Box<dyn Iterator<Item = Batch> + '_>;
}
