use crate::colour::Colour;
use nalgebra_glm as glm;

/// Trait for camera matrices, needed for rendering
pub trait CameraTrait {
    fn view_matrix(&self) -> glm::Mat4;
    fn proj_matrix(&self) -> glm::Mat4;
}

/// Matrix slots available to a single draw packet. This matches the size of
/// the transform palette in the target format, so a packet matrix table can
/// never index past it.
pub const MAX_DRAW_SLOTS: usize = 10;

/// Texture coordinate generators per material, and therefore texture
/// matrices and texture slots per material.
pub const TEX_MTX_COUNT: usize = 8;

/// Indirect texture matrix slots per material
pub const IND_TEX_COUNT: usize = 3;

/// Hardware light slots per model instance
pub const LIGHT_COUNT: usize = 8;

/// Matrix table entry meaning "leave the previous transform in this slot
/// unchanged"
pub const MATRIX_UNCHANGED: u16 = 0xFFFF;

/// One light in the set carried by a model instance and copied into the
/// parameters of every material. Values are passed through to the renderer
/// without interpretation, so positions and directions should be in whatever
/// space its shading expects.
#[derive(Clone, Copy, Debug)]
pub struct Light {
    pub position: glm::Vec3,
    pub direction: glm::Vec3,
    pub dist_atten: glm::Vec3,
    pub cos_atten: glm::Vec3,
    pub colour: Colour,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: glm::vec3(0.0f32, 0.0f32, 0.0f32),
            direction: glm::vec3(0.0f32, 0.0f32, 0.0f32),
            dist_atten: glm::vec3(1.0f32, 0.0f32, 0.0f32),
            cos_atten: glm::vec3(1.0f32, 0.0f32, 0.0f32),
            colour: Colour::new(0.0f32, 0.0f32, 0.0f32, 0.0f32),
        }
    }
}
