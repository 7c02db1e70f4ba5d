use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};

use moodcam_core::annotation::infrastructure::overlay_annotator::OverlayAnnotator;
use moodcam_core::capture::infrastructure::minifb_display::MinifbDisplay;
use moodcam_core::capture::infrastructure::nokhwa_camera::NokhwaCamera;
use moodcam_core::dataset::infrastructure::image_folder_dataset::ImageFolderDataset;
use moodcam_core::detection::infrastructure::haar_cascade_locator::HaarCascadeLocator;
use moodcam_core::emotion::domain::crop_normalizer::CropNormalizer;
use moodcam_core::emotion::domain::label_table::LabelTable;
use moodcam_core::emotion::infrastructure::onnx_emotion_classifier::OnnxEmotionClassifier;
use moodcam_core::pipeline::evaluate_model_use_case::EvaluateModelUseCase;
use moodcam_core::pipeline::live_loop_use_case::{LiveLoopUseCase, LoopControl};
use moodcam_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use moodcam_core::shared::constants::{
    CAMERA_INDEX, CASCADE_MODEL_NAME, CASCADE_MODEL_URL, EMOTION_MODEL_NAME, QUIT_KEY,
    WINDOW_TITLE,
};
use moodcam_core::shared::model_resolver;

/// Live facial emotion classification from the default camera.
#[derive(Parser)]
#[command(name = "moodcam", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify faces from the camera until 'q' is pressed (default).
    Live,
    /// Score the model against a class-per-directory image tree.
    Evaluate {
        /// Dataset root containing one subdirectory per emotion.
        dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Command::Live) {
        Command::Live => run_live(),
        Command::Evaluate { dir } => run_evaluate(&dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Load the emotion model from the working directory, exiting on failure.
fn load_classifier() -> OnnxEmotionClassifier {
    let loaded = model_resolver::resolve_local(EMOTION_MODEL_NAME, Path::new("."))
        .map_err(|e| e.to_string())
        .and_then(|path| OnnxEmotionClassifier::new(&path).map_err(|e| e.to_string()));
    match loaded {
        Ok(classifier) => {
            log::info!("Model loaded successfully");
            classifier
        }
        Err(e) => {
            println!("Error loading model: {e}");
            process::exit(1);
        }
    }
}

fn run_live() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = load_classifier();

    log::info!("Resolving model: {CASCADE_MODEL_NAME}");
    let cascade_path = model_resolver::resolve(
        CASCADE_MODEL_NAME,
        CASCADE_MODEL_URL,
        Some(Path::new(".")),
        Some(Box::new(download_progress)),
    )?;
    let locator = HaarCascadeLocator::new(&cascade_path)?;

    let camera = NokhwaCamera::open(CAMERA_INDEX)?;
    let display = MinifbDisplay::new(WINDOW_TITLE, QUIT_KEY);

    let mut use_case = LiveLoopUseCase::new(
        Box::new(camera),
        Box::new(locator),
        CropNormalizer::default(),
        Box::new(classifier),
        LabelTable::default(),
        Box::new(OverlayAnnotator::new()),
        Box::new(display),
        Box::new(StdoutPipelineLogger::default()),
    );

    match use_case.run()? {
        LoopControl::StopCaptureFailed => log::warn!("Camera stopped delivering frames"),
        LoopControl::StopUserQuit | LoopControl::Continue => {}
    }
    Ok(())
}

fn run_evaluate(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = load_classifier();
    let labels = LabelTable::default();
    let dataset = ImageFolderDataset::open(dir, &labels)?;

    let mut use_case = EvaluateModelUseCase::new(
        Box::new(classifier),
        labels,
        Box::new(StdoutPipelineLogger::new(320)),
    );
    let report = use_case.execute(&dataset)?;
    print!("{report}");
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face cascade... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading face cascade... {downloaded} bytes");
    }
}
