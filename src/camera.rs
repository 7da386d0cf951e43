use crate::{aabb::Aabb, types::CameraTrait};
use nalgebra_glm as glm;

const DEFAULT_NEAR_CLIP: f32 = 0.1;
const DEFAULT_FAR_CLIP: f32 = 1000.0;

#[derive(Debug, Copy, Clone)]
pub struct CameraProperties {
    pub aspect_ratio: f32,
    pub fovy: f32,
    pub near_clip: f32,
    pub far_clip: f32,
    pub position: glm::Vec3,
    pub target: glm::Vec3,
}

impl Default for CameraProperties {
    fn default() -> Self {
        Self {
            aspect_ratio: 16.0f32 / 9.0f32,
            fovy: 0.471f32,
            near_clip: DEFAULT_NEAR_CLIP,
            far_clip: DEFAULT_FAR_CLIP,
            position: glm::vec3(0.0f32, 0.0f32, 0.0f32),
            target: glm::vec3(0.0f32, 0.0f32, 1.0f32),
        }
    }
}

/// The projection matrix depends on fovy, aspect ratio and the clip planes,
/// so all of those are stored so that a caller can change one without
/// having to know the others. The view matrix depends on both position and
/// target, so both are stored so that a caller can change one without
/// having to know the other.
#[derive(Debug, Copy, Clone)]
pub struct Camera {
    aspect_ratio: f32,
    fovy: f32,
    near_clip: f32,
    far_clip: f32,
    position: glm::Vec3,
    target: glm::Vec3,
    view: glm::Mat4,
    proj: glm::Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraProperties::default())
    }
}

/// Pose resolution requires access to the matrices, implemented as this
/// trait.
impl CameraTrait for Camera {
    fn view_matrix(&self) -> glm::Mat4 {
        self.view
    }

    fn proj_matrix(&self) -> glm::Mat4 {
        self.proj
    }
}

impl Camera {
    pub fn new(properties: CameraProperties) -> Self {
        Self {
            aspect_ratio: properties.aspect_ratio,
            fovy: properties.fovy,
            near_clip: properties.near_clip,
            far_clip: properties.far_clip,
            position: properties.position,
            target: properties.target,
            view: Self::build_view(&properties.position, &properties.target),
            proj: Self::build_proj(&properties),
        }
    }

    pub fn aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.rebuild_proj();
    }

    pub fn zoom(&mut self, fovy: f32) {
        self.fovy = fovy;
        self.rebuild_proj();
    }

    pub fn clip_planes(&mut self, near_clip: f32, far_clip: f32) {
        self.near_clip = near_clip;
        self.far_clip = far_clip;
        self.rebuild_proj();
    }

    pub fn position(&mut self, position: &glm::Vec3) {
        self.view = Self::build_view(position, &self.target);
        self.position = *position;
    }

    pub fn target(&mut self, target: &glm::Vec3) {
        self.view = Self::build_view(&self.position, target);
        self.target = *target;
    }

    pub fn update_view(&mut self, position: glm::Vec3, target: glm::Vec3) {
        self.view = Self::build_view(&position, &target);
        self.position = position;
        self.target = target;
    }

    fn rebuild_proj(&mut self) {
        self.proj = glm::perspective_lh_zo(
            self.aspect_ratio,
            self.fovy,
            self.near_clip,
            self.far_clip,
        );
    }

    fn build_proj(properties: &CameraProperties) -> glm::Mat4 {
        glm::perspective_lh_zo(
            properties.aspect_ratio,
            properties.fovy,
            properties.near_clip,
            properties.far_clip,
        )
    }

    fn build_view(position: &glm::Vec3, target: &glm::Vec3) -> glm::Mat4 {
        // Left handed with y up, so z increases into the scene
        glm::look_at_lh(position, target, &glm::vec3(0.0, 1.0, 0.0))
    }
}

/// View frustum as six inward facing planes in world space, for visibility
/// culling. Built from the combined projection and view matrices of a
/// camera with zero to one depth range.
#[derive(Debug, Copy, Clone)]
pub struct Frustum {
    planes: [glm::Vec4; 6],
}

impl Frustum {
    #[must_use]
    pub fn new(view_proj: &glm::Mat4) -> Self {
        let r0 = view_proj.row(0).transpose();
        let r1 = view_proj.row(1).transpose();
        let r2 = view_proj.row(2).transpose();
        let r3 = view_proj.row(3).transpose();
        Self {
            planes: [
                r3 + r0, // Left
                r3 - r0, // Right
                r3 + r1, // Bottom
                r3 - r1, // Top
                r2,      // Near
                r3 - r2, // Far
            ],
        }
    }

    /// True unless the box is entirely on the outside of one of the
    /// planes. This can report true for a box slightly outside a corner
    /// but never reports false for a visible one.
    #[must_use]
    pub fn intersects(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            let p = glm::vec3(
                if plane.x >= 0.0f32 { aabb.max.x } else { aabb.min.x },
                if plane.y >= 0.0f32 { aabb.max.y } else { aabb.min.y },
                if plane.z >= 0.0f32 { aabb.max.z } else { aabb.min.z },
            );
            if glm::dot(&glm::vec4_to_vec3(plane), &p) + plane.w < 0.0f32 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frustum_culls_behind_camera() {
        let camera = Camera::default();
        let frustum =
            Frustum::new(&(camera.proj_matrix() * camera.view_matrix()));
        let ahead = Aabb::new(
            glm::vec3(-1.0f32, -1.0f32, 9.0f32),
            glm::vec3(1.0f32, 1.0f32, 11.0f32),
        );
        let behind = Aabb::new(
            glm::vec3(-1.0f32, -1.0f32, -11.0f32),
            glm::vec3(1.0f32, 1.0f32, -9.0f32),
        );
        assert!(frustum.intersects(&ahead));
        assert!(!frustum.intersects(&behind));
    }
}
