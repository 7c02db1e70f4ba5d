use minifb::{Key, Window, WindowOptions};
use thiserror::Error;

use crate::capture::domain::display::Display;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("failed to create window: {0}")]
    Create(String),
    #[error("failed to update window: {0}")]
    Update(String),
    #[error("window needs a 3-channel RGB frame, got {0} channel(s)")]
    NotRgb(u8),
    #[error("window already closed")]
    Closed,
}

/// Pack an RGB byte buffer into the `0RGB` words minifb expects, reusing `out`.
pub fn rgb_to_argb(rgb: &[u8], out: &mut Vec<u32>) {
    out.clear();
    out.extend(
        rgb.chunks_exact(3)
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32),
    );
}

fn quit_key(c: char) -> Key {
    match c.to_ascii_lowercase() {
        'q' => Key::Q,
        'x' => Key::X,
        _ => Key::Escape,
    }
}

/// Preview window. Created lazily on the first frame so it can match the
/// camera resolution.
pub struct MinifbDisplay {
    title: String,
    quit_key: Key,
    window: Option<Window>,
    buffer: Vec<u32>,
    size: (usize, usize),
    closed: bool,
}

impl MinifbDisplay {
    pub fn new(title: &str, quit_key: char) -> Self {
        Self {
            title: title.to_string(),
            quit_key: self::quit_key(quit_key),
            window: None,
            buffer: Vec::new(),
            size: (0, 0),
            closed: false,
        }
    }

    fn window_for(&mut self, width: usize, height: usize) -> Result<&mut Window, DisplayError> {
        if self.window.is_none() || self.size != (width, height) {
            let window = Window::new(&self.title, width, height, WindowOptions::default())
                .map_err(|e| DisplayError::Create(e.to_string()))?;
            log::debug!("Opened {width}x{height} window \"{}\"", self.title);
            self.window = Some(window);
            self.size = (width, height);
        }
        self.window
            .as_mut()
            .ok_or_else(|| DisplayError::Create("window unavailable".to_string()))
    }
}

impl Display for MinifbDisplay {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if self.closed {
            return Err(DisplayError::Closed.into());
        }
        if frame.channels() != 3 {
            return Err(DisplayError::NotRgb(frame.channels()).into());
        }
        let (width, height) = (frame.width() as usize, frame.height() as usize);

        let mut buffer = std::mem::take(&mut self.buffer);
        rgb_to_argb(frame.data(), &mut buffer);
        let result = self
            .window_for(width, height)
            .and_then(|window| {
                window
                    .update_with_buffer(&buffer, width, height)
                    .map_err(|e| DisplayError::Update(e.to_string()))
            });
        self.buffer = buffer;
        result?;
        Ok(())
    }

    fn quit_requested(&mut self) -> bool {
        match &self.window {
            Some(window) => !window.is_open() || window.is_key_down(self.quit_key),
            None => self.closed,
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.window.take().is_some() {
            log::debug!("Closed window \"{}\"", self.title);
        }
    }
}
