use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

/// Axis aligned bounding box. The default value is the empty box, with
/// `min` above `max` on every axis, which unions correctly with any other
/// box.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Aabb {
    pub min: glm::Vec3,
    pub max: glm::Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: glm::vec3(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: glm::vec3(
                f32::NEG_INFINITY,
                f32::NEG_INFINITY,
                f32::NEG_INFINITY,
            ),
        }
    }
}

impl Aabb {
    #[must_use]
    pub const fn new(min: glm::Vec3, max: glm::Vec3) -> Self {
        Self { min, max }
    }

    /// True if the box contains no points. Joints that do not contribute
    /// geometry carry empty boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
            || self.min.y > self.max.y
            || self.min.z > self.max.z
    }

    #[must_use]
    pub fn centre(&self) -> glm::Vec3 {
        (self.min + self.max) * 0.5f32
    }

    /// Smallest box containing both `self` and `other`
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: glm::min2(&self.min, &other.min),
            max: glm::max2(&self.max, &other.max),
        }
    }

    /// Box containing all eight corners of `self` after transformation by
    /// `m`. An empty box stays empty instead of picking up the transform's
    /// translation.
    #[must_use]
    pub fn transformed(&self, m: &glm::Mat4) -> Self {
        if self.is_empty() {
            return Self::default();
        }
        let mut ret = Self::default();
        for i in 0..8 {
            let corner = glm::vec4(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
                1.0f32,
            );
            let p = glm::vec4_to_vec3(&(m * corner));
            ret.min = glm::min2(&ret.min, &p);
            ret.max = glm::max2(&ret.max, &p);
        }
        ret
    }
}
