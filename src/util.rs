/// A module of utility functions
use nalgebra_glm as glm;

/// Transforms a 3D position using a 4x4 matrix and return as a `glm::Vec3`
#[must_use]
pub fn transform(position: &glm::Vec3, matrix: &glm::Mat4) -> glm::Vec3 {
    let ws = glm::vec4(position.x, position.y, position.z, 1.0f32);
    let vs = matrix * ws;
    glm::vec3(vs.x, vs.y, vs.z)
}

/// Returns the matrix with its translation column zeroed
#[must_use]
pub fn without_translation(m: &glm::Mat4) -> glm::Mat4 {
    let mut ret = *m;
    ret[(0, 3)] = 0.0f32;
    ret[(1, 3)] = 0.0f32;
    ret[(2, 3)] = 0.0f32;
    ret
}

/// Composes translation, rotation and scale into a single matrix. Rotation
/// is Euler angles in radians applied in X then Y then Z order, matching
/// the composition used for joint poses.
#[must_use]
pub fn srt_matrix(
    scale: &glm::Vec3,
    rotation: &glm::Vec3,
    translation: &glm::Vec3,
) -> glm::Mat4 {
    let m = glm::translation(translation);
    let m = glm::rotate_z(&m, rotation.z);
    let m = glm::rotate_y(&m, rotation.y);
    let m = glm::rotate_x(&m, rotation.x);
    glm::scale(&m, scale)
}

/// Composes a texture coordinate transform. Scale and rotation are applied
/// about `centre`, then the translation on top.
#[must_use]
pub fn texture_srt_matrix(
    scale_s: f32,
    scale_t: f32,
    rotation: f32,
    trans_s: f32,
    trans_t: f32,
    centre: &glm::Vec3,
) -> glm::Mat4 {
    let m = glm::translation(&glm::vec3(trans_s, trans_t, 0.0f32));
    let m = glm::translate(&m, centre);
    let m = glm::rotate_z(&m, rotation);
    let m = glm::scale(&m, &glm::vec3(scale_s, scale_t, 1.0f32));
    glm::translate(&m, &-centre)
}

/// Creates the basis matrix for environment mapped texture coordinates. It
/// expects normals in view space and maps the unit range into the middle
/// of the texture. The T axis is flipped because textures are sampled top
/// down.
#[must_use]
pub fn env_map_matrix(
    scale_s: f32,
    scale_t: f32,
    trans_s: f32,
    trans_t: f32,
) -> glm::Mat4 {
    glm::mat4(
        scale_s, 0.0f32, 0.0f32, trans_s, //
        0.0f32, -scale_t, 0.0f32, trans_t, //
        0.0f32, 0.0f32, 0.0f32, 1.0f32, //
        0.0f32, 0.0f32, 0.0f32, 1.0f32,
    )
}

/// Creates a perspective transform for projection mapped texture
/// coordinates, scaled from the camera projection. This is for a left
/// handed view space looking down positive z. The third row carries z
/// through for the perspective divide done when the coordinates are
/// sampled.
#[must_use]
pub fn projection_map_matrix(
    proj: &glm::Mat4,
    scale_s: f32,
    scale_t: f32,
    trans_s: f32,
    trans_t: f32,
) -> glm::Mat4 {
    let ss = proj[(0, 0)] * scale_s;
    let st = proj[(1, 1)] * scale_t;
    glm::mat4(
        ss, 0.0f32, trans_s, 0.0f32, //
        0.0f32, st, trans_t, 0.0f32, //
        0.0f32, 0.0f32, 1.0f32, 0.0f32, //
        0.0f32, 0.0f32, 0.0f32, 1.0f32,
    )
}

/// Swaps the translation column of a texture transform with its third
/// column. Texture coordinate generation multiplies a three component
/// input, so a transform built for two component ST input needs its
/// translation where the third component's coefficients normally live.
#[must_use]
pub fn swap_translation_columns(m: &glm::Mat4) -> glm::Mat4 {
    let mut ret = *m;
    ret[(0, 2)] = m[(0, 3)];
    ret[(0, 3)] = m[(0, 2)];
    ret[(1, 2)] = m[(1, 3)];
    ret[(1, 3)] = m[(1, 2)];
    ret
}

/// Creates the rotation of the camera in world space from a view matrix.
/// Shapes flagged to face the camera are multiplied by this.
#[must_use]
pub fn billboard_rotation(view: &glm::Mat4) -> glm::Mat4 {
    glm::mat3_to_mat4(&glm::mat4_to_mat3(view).transpose())
}

/// Like `billboard_rotation` but keeping the world up axis, for shapes
/// that only swivel about y
#[must_use]
pub fn y_billboard_rotation(view: &glm::Mat4) -> glm::Mat4 {
    let r = glm::mat4_to_mat3(view);
    let mut ret = glm::Mat4::identity();
    ret[(0, 0)] = r[(0, 0)];
    ret[(1, 0)] = r[(0, 1)];
    ret[(2, 0)] = r[(0, 2)];
    ret[(0, 2)] = r[(2, 0)];
    ret[(1, 2)] = r[(2, 1)];
    ret[(2, 2)] = r[(2, 2)];
    ret
}
