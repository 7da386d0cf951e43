use crate::{
    aabb::Aabb,
    colour::{Colour, ColourKind},
    ga_error::GaError,
    types::{IND_TEX_COUNT, MAX_DRAW_SLOTS, TEX_MTX_COUNT},
};
use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Skeletal hierarchy node with its bind pose transform relative to its
/// parent. The bounding box covers the geometry weighted to the joint and
/// may be empty for joints that only position children.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Joint {
    pub name: String,
    pub transform: glm::Mat4,
    pub bbox: Aabb,
}

/// What a scene graph node refers to. The index interpretation depends on
/// the variant.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum NodeKind {
    Joint(usize),
    Material(usize),
    Shape(usize),
}

/// Scene graph node. Children are indices back into the node arena, in
/// draw order.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HierarchyNode {
    pub kind: NodeKind,
    pub children: Vec<usize>,
}

/// How one slot of the transform palette is derived
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum MatrixDefinition {
    /// Rigid copy of a joint's world matrix
    Joint(usize),
    /// Weighted blend from the envelope table
    Envelope(usize),
}

#[derive(Copy, Clone, Debug, Deserialize, Serialize)]
pub struct WeightedBone {
    pub joint: usize,
    pub weight: f32,
}

/// Weighted set of joints blended into one skinning matrix. Weights are
/// used exactly as stored, not renormalized.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Envelope {
    pub bones: SmallVec<[WeightedBone; 4]>,
}

/// An independently drawn batch within a shape. The matrix table selects
/// entries of the transform palette, and a `MATRIX_UNCHANGED` entry keeps
/// whatever transform the previous packet left in that slot. The bounding
/// box covers the packet's geometry in bind pose.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Packet {
    pub matrix_table: SmallVec<[u16; MAX_DRAW_SLOTS]>,
    pub bbox: Aabb,
}

/// How the transforms of a shape are built each frame
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DisplayMode {
    /// Single rigid transform
    Normal,
    /// Rotated to fully face the camera
    Billboard,
    /// Rotated about the vertical axis to face the camera
    YBillboard,
    /// Vertices select their transform from the palette
    MultiMatrix,
}

impl DisplayMode {
    /// Resolves the tag stored in the model file. Unknown tags are an
    /// unsupported format variant, not a default.
    ///
    /// # Errors
    /// Returns `GaError::UnsupportedDisplayTag` for an unknown tag
    pub fn from_tag(tag: u8) -> Result<Self, GaError> {
        match tag {
            0x00 => Ok(Self::Normal),
            0x01 => Ok(Self::Billboard),
            0x02 => Ok(Self::YBillboard),
            0x03 => Ok(Self::MultiMatrix),
            _ => Err(GaError::UnsupportedDisplayTag(tag)),
        }
    }
}

/// Shape description as loaded from a model file
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ShapeDesc {
    pub display_tag: u8,
    pub bbox: Aabb,
    pub packets: Vec<Packet>,
}

/// Shape with its display tag resolved
#[derive(Clone, Debug)]
pub struct Shape {
    pub display_mode: DisplayMode,
    pub bbox: Aabb,
    pub packets: Vec<Packet>,
}

/// How texture coordinates are generated before the scroll transform is
/// applied
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TexMtxMapping {
    /// Coordinates come straight from the mesh
    Basic,
    /// Environment map from view space normals
    EnvMap,
    /// Environment map fed through a projection
    EnvProj,
    /// Projection of the effect matrix only
    EffectProj,
    /// Projection of the view, for camera locked effects
    ViewProj,
}

impl TexMtxMapping {
    /// Resolves the tag stored in the model file. Unknown tags are an
    /// unsupported format variant, not a default.
    ///
    /// # Errors
    /// Returns `GaError::UnsupportedMappingTag` for an unknown tag
    pub fn from_tag(tag: u8) -> Result<Self, GaError> {
        match tag {
            0x00 | 0x01 | 0x02 | 0x0A | 0x0B => Ok(Self::Basic),
            0x06 => Ok(Self::EnvMap),
            0x07 => Ok(Self::EnvProj),
            0x08 => Ok(Self::EffectProj),
            0x09 => Ok(Self::ViewProj),
            _ => Err(GaError::UnsupportedMappingTag(tag)),
        }
    }
}

/// Texture matrix description as loaded from a model file. The scale,
/// rotation and translation describe the static scroll transform used
/// when no animation is bound.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TexMtxDesc {
    pub mapping_tag: u8,
    pub effect: glm::Mat4,
    pub centre: glm::Vec3,
    pub scale_s: f32,
    pub scale_t: f32,
    pub rotation: f32,
    pub trans_s: f32,
    pub trans_t: f32,
}

/// Texture matrix with its mapping tag resolved and the static scroll
/// transform composed
#[derive(Clone, Debug)]
pub struct TexMtx {
    pub mapping: TexMtxMapping,
    pub effect: glm::Mat4,
    pub srt: glm::Mat4,
}

/// Material description as loaded from a model file. The texture matrix,
/// texture and post transform lists may hold up to one entry per texture
/// slot, and the indirect matrix list up to one entry per indirect slot.
/// The depth test flag, cull mode, post transform matrices and indirect
/// matrices are carried through to the renderer without interpretation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MaterialDesc {
    pub name: String,
    pub translucent: bool,
    pub depth_test: bool,
    pub cull_mode: u8,
    pub colours: [Colour; ColourKind::COUNT],
    pub tex_mtx: Vec<Option<TexMtxDesc>>,
    pub post_tex_mtx: Vec<Option<glm::Mat4>>,
    pub ind_tex_mtx: Vec<glm::Mat2x3>,
    pub textures: Vec<Option<usize>>,
}

/// Material with its texture matrices resolved into fixed slots
#[derive(Clone, Debug)]
pub struct MaterialEntry {
    pub name: String,
    pub translucent: bool,
    pub depth_test: bool,
    pub cull_mode: u8,
    pub colours: [Colour; ColourKind::COUNT],
    pub tex_mtx: [Option<TexMtx>; TEX_MTX_COUNT],
    pub post_tex_mtx: [Option<glm::Mat4>; TEX_MTX_COUNT],
    pub ind_tex_mtx: [Option<glm::Mat2x3>; IND_TEX_COUNT],
    pub textures: [Option<usize>; TEX_MTX_COUNT],
}

/// One shape occurrence in draw order, with the material that was current
/// in the scene graph when it was reached
#[derive(Copy, Clone, Debug)]
pub struct DrawItem {
    pub shape: usize,
    pub material: usize,
    /// Tie break for translucent sorting, assigned in draw order
    pub sort_key_bias: u8,
}

/// Everything the loader provides for one model
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ModelDesc {
    pub joints: Vec<Joint>,
    pub hierarchy: Vec<HierarchyNode>,
    pub root: usize,
    pub matrix_definitions: Vec<MatrixDefinition>,
    pub envelopes: Vec<Envelope>,
    pub inverse_binds: Vec<glm::Mat4>,
    pub shapes: Vec<ShapeDesc>,
    pub materials: Vec<MaterialDesc>,
}
