mod model;
mod types;

// Re-exports
pub use {
    model::Model,
    types::{
        DisplayMode, DrawItem, Envelope, HierarchyNode, Joint, MaterialDesc,
        MaterialEntry, MatrixDefinition, ModelDesc, NodeKind, Packet, Shape,
        ShapeDesc, TexMtx, TexMtxDesc, TexMtxMapping, WeightedBone,
    },
};
