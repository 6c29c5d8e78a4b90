/// Rotating cube transform and its vertex-stage uniform block

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use crate::app::MrtConfig;

/// Vertex-stage uniform block of the offscreen shader
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VsParams {
    pub model_view_projection: Mat4,
}

/// Two rotation angles advanced every frame on top of a fixed projection
#[derive(Debug, Clone, PartialEq)]
pub struct CubeTransform {
    angle_x: f32,
    angle_y: f32,
    step: Vec2,
    position: Vec3,
    projection: Mat4,
}

impl CubeTransform {
    pub fn new(config: &MrtConfig) -> Self {
        Self {
            angle_x: 0.0,
            angle_y: 0.0,
            step: config.angle_step,
            position: config.cube_position,
            projection: Mat4::perspective_rh(
                config.fov_y_degrees.to_radians(),
                config.offscreen_aspect(),
                config.z_near,
                config.z_far,
            ),
        }
    }

    /// Advance both angles by one frame step
    pub fn advance(&mut self) {
        self.angle_x += self.step.x;
        self.angle_y += self.step.y;
    }

    pub fn angles(&self) -> (f32, f32) {
        (self.angle_x, self.angle_y)
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// `proj * translate(position) * rotX(angle_x) * rotY(angle_y)`
    pub fn model_view_projection(&self) -> Mat4 {
        self.projection
            * Mat4::from_translation(self.position)
            * Mat4::from_rotation_x(self.angle_x)
            * Mat4::from_rotation_y(self.angle_y)
    }

    pub fn uniforms(&self) -> VsParams {
        VsParams { model_view_projection: self.model_view_projection() }
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
