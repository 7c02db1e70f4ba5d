use std::fmt;
use std::time::Instant;

use crate::dataset::domain::sample_source::SampleSource;
use crate::emotion::domain::emotion_classifier::EmotionClassifier;
use crate::emotion::domain::label_table::LabelTable;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::constants::EVALUATION_BATCH_SIZE;

/// Accuracy figures for a classifier over a labelled dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationReport {
    labels: Vec<String>,
    /// `confusion[actual][predicted]`
    confusion: Vec<Vec<usize>>,
}

impl EvaluationReport {
    pub fn new(labels: &LabelTable) -> Self {
        let n = labels.len();
        Self {
            labels: labels.labels().to_vec(),
            confusion: vec![vec![0; n]; n],
        }
    }

    pub fn record(&mut self, actual: usize, predicted: usize) {
        self.confusion[actual][predicted] += 1;
    }

    pub fn total(&self) -> usize {
        self.confusion.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.confusion.len()).map(|i| self.confusion[i][i]).sum()
    }

    /// Overall accuracy, `None` for an empty report.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.correct() as f64 / total as f64)
    }

    /// Recall for one class, `None` when the class had no samples.
    pub fn class_accuracy(&self, class: usize) -> Option<f64> {
        let row = self.confusion.get(class)?;
        let support: usize = row.iter().sum();
        (support > 0).then(|| row[class] as f64 / support as f64)
    }

    pub fn confusion(&self) -> &[Vec<usize>] {
        &self.confusion
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = |v: Option<f64>| match v {
            Some(v) => format!("{:5.1}%", v * 100.0),
            None => "    --".to_string(),
        };

        writeln!(
            f,
            "Accuracy: {} ({}/{})",
            pct(self.accuracy()),
            self.correct(),
            self.total()
        )?;
        for (i, label) in self.labels.iter().enumerate() {
            let support: usize = self.confusion[i].iter().sum();
            writeln!(f, "  {label:10} {}  (n={support})", pct(self.class_accuracy(i)))?;
        }

        writeln!(f, "Confusion matrix (rows = actual, columns = predicted):")?;
        write!(f, "  {:10}", "")?;
        for label in &self.labels {
            write!(f, " {:>8}", truncate(label, 8))?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.confusion) {
            write!(f, "  {label:10}")?;
            for count in row {
                write!(f, " {count:>8}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    s.char_indices().nth(max).map_or(s, |(i, _)| &s[..i])
}

/// Runs the classifier over every sample and tallies predictions.
pub struct EvaluateModelUseCase {
    classifier: Box<dyn EmotionClassifier>,
    labels: LabelTable,
    logger: Box<dyn PipelineLogger>,
    batch_size: usize,
}

impl EvaluateModelUseCase {
    pub fn new(
        classifier: Box<dyn EmotionClassifier>,
        labels: LabelTable,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            classifier,
            labels,
            logger,
            batch_size: EVALUATION_BATCH_SIZE,
        }
    }

    pub fn execute(
        &mut self,
        dataset: &dyn SampleSource,
    ) -> Result<EvaluationReport, Box<dyn std::error::Error>> {
        let mut report = EvaluationReport::new(&self.labels);
        let total = dataset.len();
        let mut seen = 0;

        for (tensors, expected) in dataset.batches(self.batch_size) {
            let start = Instant::now();
            for (tensor, &actual) in tensors.iter().zip(&expected) {
                let scores = self.classifier.predict(tensor)?;
                let (predicted, _) = self.labels.resolve(&scores)?;
                report.record(actual, predicted);
            }
            self.logger
                .timing("classify", start.elapsed().as_secs_f64() * 1000.0);
            seen += self.batch_size;
            self.logger.progress(seen.min(total), total);
        }

        if report.total() < total {
            self.logger.info(&format!(
                "Skipped {} unreadable images",
                total - report.total()
            ));
        }
        self.logger.summary();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::dataset::domain::sample_source::Batch;
    use crate::emotion::domain::face_tensor::FaceTensor;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use image::GrayImage;

    /// Each sample's tensor encodes the class the stub classifier will predict.
    struct StubSamples {
        samples: Vec<(u8, usize)>,
    }

    fn tensor_for(predicted: u8) -> FaceTensor {
        FaceTensor::from_gray(&GrayImage::from_pixel(48, 48, image::Luma([predicted])))
    }

    impl SampleSource for StubSamples {
        fn len(&self) -> usize {
            self.samples.len()
        }

        fn batches(&self, batch_size: usize) -> Box<dyn Iterator<Item = Batch> + '_> {
            Box::new(self.samples.chunks(batch_size).map(|chunk| {
                (
                    chunk.iter().map(|(p, _)| tensor_for(*p)).collect(),
                    chunk.iter().map(|(_, a)| *a).collect(),
                )
            }))
        }
    }

    /// One-hot on the class encoded in the tensor's first pixel.
    struct PixelClassifier;

    impl EmotionClassifier for PixelClassifier {
        fn predict(&mut self, tensor: &FaceTensor) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
            let class = (tensor.view()[[0, 0, 0]] * 255.0).round() as usize;
            let mut scores = vec![0.0; 7];
            scores[class] = 1.0;
            Ok(scores)
        }
    }

    fn use_case() -> EvaluateModelUseCase {
        EvaluateModelUseCase::new(
            Box::new(PixelClassifier),
            LabelTable::default(),
            Box::new(NullPipelineLogger),
        )
    }

    #[test]
    fn test_report_counts_and_accuracy() {
        // (predicted, actual)
        let samples = StubSamples {
            samples: vec![(3, 3), (3, 3), (5, 3), (0, 0), (6, 2)],
        };
        let report = use_case().execute(&samples).unwrap();

        assert_eq!(report.total(), 5);
        assert_eq!(report.correct(), 3);
        assert_relative_eq!(report.accuracy().unwrap(), 0.6);
        assert_relative_eq!(report.class_accuracy(3).unwrap(), 2.0 / 3.0);
        assert_relative_eq!(report.class_accuracy(0).unwrap(), 1.0);
        assert_relative_eq!(report.class_accuracy(2).unwrap(), 0.0);
        assert_eq!(report.class_accuracy(1), None);
        assert_eq!(report.confusion()[3][5], 1);
        assert_eq!(report.confusion()[2][6], 1);
    }

    #[test]
    fn test_batching_covers_every_sample() {
        let samples = StubSamples {
            samples: (0..70).map(|i| ((i % 7) as u8, i % 7)).collect(),
        };
        let report = use_case().execute(&samples).unwrap();
        assert_eq!(report.total(), 70);
        assert_relative_eq!(report.accuracy().unwrap(), 1.0);
    }

    #[test]
    fn test_empty_dataset() {
        let samples = StubSamples { samples: vec![] };
        let report = use_case().execute(&samples).unwrap();
        assert_eq!(report.total(), 0);
        assert_eq!(report.accuracy(), None);
    }

    #[test]
    fn test_display_lists_every_label() {
        let mut report = EvaluationReport::new(&LabelTable::default());
        report.record(4, 4);
        report.record(4, 1);
        let text = report.to_string();
        assert!(text.starts_with("Accuracy:  50.0% (1/2)"));
        for label in crate::shared::constants::EMOTION_LABELS {
            assert!(text.contains(label));
        }
        assert!(text.contains("Confusion matrix"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Surprise", 8), "Surprise");
        assert_eq!(truncate("Surprised", 8), "Surprise");
        assert_eq!(truncate("Sad", 8), "Sad");
    }
}
