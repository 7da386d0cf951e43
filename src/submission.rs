use crate::{
    colour::{Colour, ColourKind},
    types::{IND_TEX_COUNT, Light, LIGHT_COUNT, MAX_DRAW_SLOTS, TEX_MTX_COUNT},
};
use nalgebra_glm as glm;

/// Depth is normalized against this distance when packed into a sort key
const MAX_SORT_DEPTH: f32 = 65536.0;

/// Broad draw ordering bucket. Lower layers draw first. The background
/// layer is for sky and backdrop materials drawn without depth testing.
#[derive(Copy, Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum RenderLayer {
    Background = 0x00,
    Opaque = 0x20,
    Translucent = 0x80,
}

/// Packed draw ordering key. From the high bits down: the layer, sixteen
/// bits of quantized view space depth, and a tie breaking bias. The depth
/// field is reversed for the translucent layer, so sorting keys ascending
/// draws opaque geometry front to back and translucent geometry back to
/// front.
#[derive(Copy, Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct SortKey(u32);

impl SortKey {
    #[must_use]
    pub const fn new(layer: RenderLayer) -> Self {
        Self((layer as u32) << 24)
    }

    /// Replaces the depth field, clamping into the sortable range
    #[must_use]
    pub fn with_depth(self, depth: f32) -> Self {
        let normalized = (depth / MAX_SORT_DEPTH).clamp(0.0f32, 1.0f32);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut quantized = (normalized * 65535.0f32) as u32;
        if self.layer() == RenderLayer::Translucent {
            quantized = 0xFFFF - quantized;
        }
        Self((self.0 & 0xFF00_00FF) | (quantized << 8))
    }

    /// Replaces the bias field. Only translucent keys take a bias, for
    /// any other layer this does nothing.
    #[must_use]
    pub fn with_bias(self, bias: u8) -> Self {
        if self.layer() == RenderLayer::Translucent {
            Self((self.0 & 0xFFFF_FF00) | u32::from(bias))
        } else {
            self
        }
    }

    #[must_use]
    pub const fn layer(self) -> RenderLayer {
        match self.0 >> 24 {
            0x80 => RenderLayer::Translucent,
            0x20 => RenderLayer::Opaque,
            _ => RenderLayer::Background,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn depth_bits(self) -> u16 {
        ((self.0 >> 8) & 0xFFFF) as u16
    }

    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn bias(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

/// Fully resolved material inputs for one material of one instance for
/// one frame. An external renderer copies these into its uniforms.
#[derive(Clone, Debug)]
pub struct MaterialParams {
    /// Colour registers indexed by `ColourKind`
    pub colours: [Colour; ColourKind::COUNT],
    /// Texture transform per texture slot
    pub tex_mtx: [glm::Mat4; TEX_MTX_COUNT],
    /// Post transform applied after coordinate generation, identity
    /// where the material has none
    pub post_tex_mtx: [glm::Mat4; TEX_MTX_COUNT],
    /// Indirect stage transforms, identity where the material has none
    pub ind_tex_mtx: [glm::Mat2x3; IND_TEX_COUNT],
    /// Texture table index per texture slot, `None` where nothing is
    /// bound
    pub textures: [Option<usize>; TEX_MTX_COUNT],
    pub lights: [Light; LIGHT_COUNT],
    /// False stops the renderer writing colour output for this material
    pub colour_write: bool,
    /// False disables depth testing for this material
    pub depth_test: bool,
    /// Face culling mode, passed through from the model file
    pub cull_mode: u8,
    /// False means vertex colours should be treated as white
    pub vertex_colours: bool,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            colours: [Colour::default(); ColourKind::COUNT],
            tex_mtx: std::array::from_fn(|_| glm::Mat4::identity()),
            post_tex_mtx: std::array::from_fn(|_| glm::Mat4::identity()),
            ind_tex_mtx: std::array::from_fn(|_| glm::Mat2x3::identity()),
            textures: [None; TEX_MTX_COUNT],
            lights: [Light::default(); LIGHT_COUNT],
            colour_write: true,
            depth_test: true,
            cull_mode: 0,
            vertex_colours: true,
        }
    }
}

/// One packet of one shape occurrence, ready for an external renderer.
/// Submissions are created up front and updated in place each frame, so
/// their order is stable and a renderer draws them sorted by key.
#[derive(Clone, Debug)]
pub struct DrawSubmission {
    pub shape: usize,
    pub packet: usize,
    pub material: usize,
    /// False means skip this packet. The transforms are left alone.
    pub visible: bool,
    pub sort_key: SortKey,
    /// Render pass bits copied from the instance, for a renderer that
    /// draws in multiple passes
    pub pass_mask: u32,
    pub transforms: [glm::Mat4; MAX_DRAW_SLOTS],
    /// Number of entries of `transforms` the packet uses
    pub transform_count: usize,
}

impl Default for DrawSubmission {
    fn default() -> Self {
        Self {
            shape: 0,
            packet: 0,
            material: 0,
            visible: false,
            sort_key: SortKey::default(),
            pass_mask: 0x01,
            transforms: std::array::from_fn(|_| glm::Mat4::identity()),
            transform_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_layers_and_depth() {
        let near_opaque = SortKey::new(RenderLayer::Opaque).with_depth(1.0);
        let far_opaque = SortKey::new(RenderLayer::Opaque).with_depth(5000.0);
        let background = SortKey::new(RenderLayer::Background).with_depth(1.0);
        assert!(near_opaque < far_opaque);
        assert!(background < near_opaque);

        // Translucent draws back to front so a nearer key sorts later
        let near = SortKey::new(RenderLayer::Translucent).with_depth(1.0);
        let far = SortKey::new(RenderLayer::Translucent).with_depth(5000.0);
        assert!(far < near);
        assert_eq!(near.layer(), RenderLayer::Translucent);
    }

    #[test]
    fn bias_only_applies_to_translucent() {
        let opaque = SortKey::new(RenderLayer::Opaque).with_bias(3);
        assert_eq!(opaque.bias(), 0);
        let translucent = SortKey::new(RenderLayer::Translucent).with_bias(3);
        assert_eq!(translucent.bias(), 3);
    }
}
