use std::time::Instant;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::capture::domain::display::Display;
use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::face_locator::FaceLocator;
use crate::emotion::domain::crop_normalizer::CropNormalizer;
use crate::emotion::domain::emotion_classifier::EmotionClassifier;
use crate::emotion::domain::label_table::LabelTable;
use crate::pipeline::fps_meter::instantaneous_fps;
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Outcome of one loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    /// The source produced no frame; the stream is over.
    StopCaptureFailed,
    /// Quit key pressed or window closed.
    StopUserQuit,
}

impl LoopControl {
    pub fn is_terminal(self) -> bool {
        self != LoopControl::Continue
    }
}

fn ms_since(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Capture, locate, classify, annotate, display; repeated until the source
/// runs dry or the user quits.
///
/// The use case exclusively owns the frame source and the display. Both are
/// released exactly once when [`run`](Self::run) returns, on every exit path,
/// or when the use case is dropped.
pub struct LiveLoopUseCase {
    source: Box<dyn FrameSource>,
    locator: Box<dyn FaceLocator>,
    normalizer: CropNormalizer,
    classifier: Box<dyn EmotionClassifier>,
    labels: LabelTable,
    annotator: Box<dyn FrameAnnotator>,
    display: Box<dyn Display>,
    logger: Box<dyn PipelineLogger>,
    iterations: usize,
    released: bool,
}

impl LiveLoopUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        locator: Box<dyn FaceLocator>,
        normalizer: CropNormalizer,
        classifier: Box<dyn EmotionClassifier>,
        labels: LabelTable,
        annotator: Box<dyn FrameAnnotator>,
        display: Box<dyn Display>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            source,
            locator,
            normalizer,
            classifier,
            labels,
            annotator,
            display,
            logger,
            iterations: 0,
            released: false,
        }
    }

    /// Completed iterations so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Run one iteration.
    pub fn step(&mut self) -> Result<LoopControl, Box<dyn std::error::Error>> {
        let t0 = Instant::now();
        let mut frame = match self.source.read() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Capture failed: {e}");
                return Ok(LoopControl::StopCaptureFailed);
            }
        };
        self.logger.timing("capture", ms_since(t0));

        let start = Instant::now();
        let gray = frame.to_grayscale();
        let faces = self.locator.locate(&gray)?;
        self.logger.timing("detect", ms_since(start));
        self.logger.metric("faces", faces.len() as f64);

        let t0 = Instant::now();
        for bbox in &faces {
            let tensor = match self.normalizer.normalize(&gray, bbox) {
                Ok(tensor) => tensor,
                Err(e) => {
                    log::warn!("Skipping face: {e}");
                    continue;
                }
            };
            let scores = self.classifier.predict(&tensor)?;
            let (index, label) = self.labels.resolve(&scores)?;
            log::trace!("Frame {}: {bbox:?} -> {label} ({:.2})", frame.index(), scores[index]);
            self.annotator.annotate_face(&mut frame, bbox, label)?;
        }
        self.logger.timing("classify", ms_since(t0));

        let fps = instantaneous_fps(start.elapsed());
        if let Some(fps) = fps {
            self.logger.metric("fps", fps);
        }
        self.annotator.annotate_fps(&mut frame, fps)?;

        let t0 = Instant::now();
        self.display.show(&frame)?;
        let quit = self.display.quit_requested();
        self.logger.timing("display", ms_since(t0));

        self.iterations += 1;
        self.logger.progress(self.iterations, 0);

        if quit {
            log::info!("Quit requested");
            return Ok(LoopControl::StopUserQuit);
        }
        Ok(LoopControl::Continue)
    }

    /// Step until a terminal result, then release the source and the display.
    pub fn run(&mut self) -> Result<LoopControl, Box<dyn std::error::Error>> {
        let outcome = self.run_until_stop();
        self.release();
        self.logger.summary();
        outcome
    }

    fn run_until_stop(&mut self) -> Result<LoopControl, Box<dyn std::error::Error>> {
        loop {
            let control = self.step()?;
            if control.is_terminal() {
                return Ok(control);
            }
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.source.release();
        self.display.close();
        log::debug!("Released capture device and window after {} frames", self.iterations);
    }
}

impl Drop for LiveLoopUseCase {
    fn drop(&mut self) {
        self.release();
    }
}
