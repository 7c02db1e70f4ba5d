pub mod minifb_display;
pub mod nokhwa_camera;
