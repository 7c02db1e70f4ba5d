//! Live facial emotion classification.
//!
//! Each context is split into `domain` (traits and pure logic) and
//! `infrastructure` (adapters over OpenCV, ONNX Runtime, nokhwa and minifb).
//! Use cases in [`pipeline`] wire them together.

pub mod shared {
    pub mod bounding_box;
    pub mod constants;
    pub mod frame;
    pub mod model_resolver;
}

pub mod detection {
    pub mod domain {
        pub mod face_locator;
    }
    pub mod infrastructure;
}

pub mod emotion {
    pub mod domain {
        pub mod crop_normalizer;
        pub mod emotion_classifier;
        pub mod face_tensor;
        pub mod label_table;
    }
    pub mod infrastructure;
}

pub mod annotation {
    pub mod domain {
        pub mod frame_annotator;
    }
    pub mod infrastructure;
}

pub mod capture {
    pub mod domain {
        pub mod display;
        pub mod frame_source;
    }
    pub mod infrastructure;
}

pub mod dataset {
    pub mod domain {
        pub mod sample_source;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod evaluate_model_use_case;
    pub mod fps_meter;
    pub mod live_loop_use_case;
    pub mod pipeline_logger;
}
