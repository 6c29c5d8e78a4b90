/// Fallback display shown when the multi-target path is unavailable

use glam::Vec4;
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, PassAction};
use crate::debug_text::DebugText;
use crate::app::{MrtConfig, MRT_FEATURE_NAME};

pub struct FallbackDisplay {
    text: DebugText,
    message: String,
    clear_color: Vec4,
}

impl FallbackDisplay {
    pub fn new(config: &MrtConfig) -> Self {
        let mut text = DebugText::new();
        text.set_text_scale(config.fallback_text_scale);
        text.set_text_color(config.fallback_text_color);
        Self {
            text,
            message: format!("This demo needs {}", MRT_FEATURE_NAME),
            clear_color: config.fallback_clear_color,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Clear the screen to the warning color and print the centered message
    pub fn draw(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let display = device.display_attributes();
        let (column, row) = self.text.centered_cursor(
            &self.message,
            display.framebuffer_width,
            display.framebuffer_height,
        );

        device.begin_pass(None, &PassAction::clear(self.clear_color))?;
        self.text.cursor_pos(column, row);
        self.text.print(&self.message);
        self.text.flush(device)?;
        device.end_pass()
    }
}
