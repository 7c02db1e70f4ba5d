use crate::shared::frame::Frame;

/// Domain interface for the on-screen preview window.
pub trait Display {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Polled once per iteration, after `show`.
    ///
    /// True when the quit key is held or the window was closed by the user.
    fn quit_requested(&mut self) -> bool;

    /// Tear down the window. Calling it twice is a no-op.
    fn close(&mut self);
}
