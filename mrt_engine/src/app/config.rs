/// Application configuration

use glam::{Vec2, Vec3, Vec4};

/// Tunables of the MRT sample
///
/// Every field has a default matching the reference scene: a 640x480 window,
/// three 200x200 4x multisampled targets tinted red, green and blue.
#[derive(Debug, Clone, PartialEq)]
pub struct MrtConfig {
    pub display_width: u32,
    pub display_height: u32,
    pub window_title: String,

    pub offscreen_width: u32,
    pub offscreen_height: u32,
    /// Requested sample count of the offscreen targets (clamped to 1 without MSAA support)
    pub sample_count: u32,
    /// Clear color of each offscreen attachment, in attachment order
    pub attachment_clear_colors: [Vec4; 3],

    pub display_clear_color: Vec4,
    pub fallback_clear_color: Vec4,
    pub fallback_text_scale: Vec2,
    pub fallback_text_color: Vec4,

    pub cube_position: Vec3,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Radians added to the X and Y rotation angles every frame
    pub angle_step: Vec2,
}

impl Default for MrtConfig {
    fn default() -> Self {
        Self {
            display_width: 640,
            display_height: 480,
            window_title: "MRT Sample".to_string(),
            offscreen_width: 200,
            offscreen_height: 200,
            sample_count: 4,
            attachment_clear_colors: [
                Vec4::new(0.25, 0.0, 0.0, 1.0),
                Vec4::new(0.0, 0.25, 0.0, 1.0),
                Vec4::new(0.0, 0.0, 0.25, 1.0),
            ],
            display_clear_color: Vec4::new(0.5, 0.5, 0.5, 1.0),
            fallback_clear_color: Vec4::new(0.5, 0.0, 0.0, 1.0),
            fallback_text_scale: Vec2::splat(2.0),
            fallback_text_color: Vec4::ONE,
            cube_position: Vec3::new(0.0, 0.0, -3.0),
            fov_y_degrees: 45.0,
            z_near: 0.01,
            z_far: 100.0,
            angle_step: Vec2::new(0.02, 0.01),
        }
    }
}

impl MrtConfig {
    pub fn with_display_size(mut self, width: u32, height: u32) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn with_offscreen_size(mut self, width: u32, height: u32) -> Self {
        self.offscreen_width = width;
        self.offscreen_height = height;
        self
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_attachment_clear_colors(mut self, colors: [Vec4; 3]) -> Self {
        self.attachment_clear_colors = colors;
        self
    }

    pub fn with_display_clear_color(mut self, color: Vec4) -> Self {
        self.display_clear_color = color;
        self
    }

    pub fn with_fallback_clear_color(mut self, color: Vec4) -> Self {
        self.fallback_clear_color = color;
        self
    }

    pub fn with_angle_step(mut self, x: f32, y: f32) -> Self {
        self.angle_step = Vec2::new(x, y);
        self
    }

    /// Width/height ratio of the offscreen targets
    pub fn offscreen_aspect(&self) -> f32 {
        self.offscreen_width as f32 / self.offscreen_height.max(1) as f32
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
