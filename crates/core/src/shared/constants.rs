pub const CASCADE_MODEL_NAME: &str = "haarcascade_frontalface_default.xml";
pub const CASCADE_MODEL_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_default.xml";

/// Trained classifier artifact, exported from the Keras model to ONNX.
pub const EMOTION_MODEL_NAME: &str = "emotion_recognition_model.onnx";

/// Cascade pyramid step between detection scales.
pub const CASCADE_SCALE_FACTOR: f64 = 1.3;
/// Overlapping candidates required before a detection is kept.
pub const CASCADE_MIN_NEIGHBORS: i32 = 5;

/// Side length of the square classifier input.
pub const FACE_INPUT_SIZE: u32 = 48;
pub const FACE_INPUT_CHANNELS: usize = 3;

pub const EMOTION_LABELS: [&str; 7] = [
    "Angry", "Disgust", "Fear", "Happy", "Neutral", "Sad", "Surprise",
];

pub const CAMERA_INDEX: u32 = 0;
pub const WINDOW_TITLE: &str = "Emotion Detection";
pub const QUIT_KEY: char = 'q';

/// RGB colors.
pub const FACE_BOX_COLOR: [u8; 3] = [0, 0, 255];
pub const FPS_COLOR: [u8; 3] = [0, 255, 0];
pub const FACE_BOX_THICKNESS: u32 = 2;

/// Label baseline sits this many pixels above the box top.
pub const LABEL_OFFSET: i32 = 10;
/// Bitmap font pixel scale for face labels and the FPS readout.
pub const LABEL_TEXT_SCALE: u32 = 3;
pub const FPS_TEXT_SCALE: u32 = 2;
/// Baseline-left anchor of the FPS readout.
pub const FPS_ANCHOR: (i32, i32) = (10, 30);

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
pub const EVALUATION_BATCH_SIZE: usize = 32;
