use super::types::{
    DisplayMode, DrawItem, Envelope, HierarchyNode, Joint, MaterialDesc,
    MaterialEntry, MatrixDefinition, ModelDesc, NodeKind, Shape, ShapeDesc,
    TexMtx, TexMtxMapping,
};
use crate::{
    ga_error::GaError,
    types::{IND_TEX_COUNT, MATRIX_UNCHANGED, MAX_DRAW_SLOTS, TEX_MTX_COUNT},
    util,
};
use ahash::{HashMap, HashMapExt};
use nalgebra_glm as glm;

#[allow(unused_imports)]
use log::{debug, error, info, trace};

/// Validated model data shared by every instance of the model. Instances
/// hold it behind an `Arc` and only read it, so all index checking is
/// done once here and per frame code can trust the contents.
pub struct Model {
    pub joints: Vec<Joint>,
    pub hierarchy: Vec<HierarchyNode>,
    pub root: usize,
    pub matrix_definitions: Vec<MatrixDefinition>,
    pub envelopes: Vec<Envelope>,
    pub inverse_binds: Vec<glm::Mat4>,
    pub shapes: Vec<Shape>,
    pub materials: Vec<MaterialEntry>,
    /// Shapes in scene graph draw order with their resolved materials
    pub draw_items: Vec<DrawItem>,
    /// True if any shape is camera facing. These models get their model
    /// matrix applied per shape instead of through the joints.
    pub has_billboard: bool,
    joint_names: HashMap<String, usize>,
    material_names: HashMap<String, usize>,
}

impl Model {
    /// Validates a model description and prepares it for instancing
    ///
    /// # Errors
    /// May return `GaError` if the description references indices out of
    /// range, uses unsupported display or mapping tags, or has a scene
    /// graph that is not a tree
    pub fn new(desc: ModelDesc) -> Result<Self, GaError> {
        validate(&desc)?;
        let (shapes, has_billboard) = resolve_shapes(desc.shapes)?;
        let materials = resolve_materials(desc.materials)?;
        let draw_items =
            build_draw_items(&desc.hierarchy, desc.root, &materials)?;

        let mut joint_names = HashMap::with_capacity(desc.joints.len());
        for (i, joint) in desc.joints.iter().enumerate() {
            // First joint wins if names are reused
            joint_names.entry(joint.name.clone()).or_insert(i);
        }
        let mut material_names = HashMap::with_capacity(materials.len());
        for (i, material) in materials.iter().enumerate() {
            material_names.entry(material.name.clone()).or_insert(i);
        }

        info!(
            "Model created: {} joints, {} shapes, {} materials, {} draw items",
            desc.joints.len(),
            shapes.len(),
            materials.len(),
            draw_items.len()
        );

        Ok(Self {
            joints: desc.joints,
            hierarchy: desc.hierarchy,
            root: desc.root,
            matrix_definitions: desc.matrix_definitions,
            envelopes: desc.envelopes,
            inverse_binds: desc.inverse_binds,
            shapes,
            materials,
            draw_items,
            has_billboard,
            joint_names,
            material_names,
        })
    }

    /// Index of a joint by name
    ///
    /// # Errors
    /// Returns `GaError::JointNotFound` if no joint has that name
    pub fn joint_index(&self, name: &str) -> Result<usize, GaError> {
        self.joint_names
            .get(name)
            .copied()
            .ok_or_else(|| GaError::JointNotFound(name.to_owned()))
    }

    /// Index of a material by name
    ///
    /// # Errors
    /// Returns `GaError::MaterialNotFound` if no material has that name
    pub fn material_index(&self, name: &str) -> Result<usize, GaError> {
        self.material_names
            .get(name)
            .copied()
            .ok_or_else(|| GaError::MaterialNotFound(name.to_owned()))
    }
}

/// Checks every index in the description before anything trusts it
fn validate(desc: &ModelDesc) -> Result<(), GaError> {
    if desc.joints.is_empty() {
        return Err(GaError::NoJoints);
    }
    if desc.root >= desc.hierarchy.len() {
        return Err(GaError::NodeIndexOutOfRange(desc.root));
    }
    for node in &desc.hierarchy {
        for child in &node.children {
            if *child >= desc.hierarchy.len() {
                return Err(GaError::NodeIndexOutOfRange(*child));
            }
        }
        match node.kind {
            NodeKind::Joint(joint) => {
                if joint >= desc.joints.len() {
                    return Err(GaError::JointIndexOutOfRange(joint));
                }
            }
            NodeKind::Material(material) => {
                if material >= desc.materials.len() {
                    return Err(GaError::MaterialIndexOutOfRange(material));
                }
            }
            NodeKind::Shape(shape) => {
                if shape >= desc.shapes.len() {
                    return Err(GaError::ShapeIndexOutOfRange(shape));
                }
            }
        }
    }
    for definition in &desc.matrix_definitions {
        match *definition {
            MatrixDefinition::Joint(joint) => {
                if joint >= desc.joints.len() {
                    return Err(GaError::JointIndexOutOfRange(joint));
                }
            }
            MatrixDefinition::Envelope(envelope) => {
                if envelope >= desc.envelopes.len() {
                    return Err(GaError::EnvelopeIndexOutOfRange(envelope));
                }
            }
        }
    }
    for envelope in &desc.envelopes {
        for bone in &envelope.bones {
            if bone.joint >= desc.joints.len() {
                return Err(GaError::JointIndexOutOfRange(bone.joint));
            }
        }
    }
    // Inverse binds are indexed by joint, but only envelopes read them
    if !desc.envelopes.is_empty()
        && desc.inverse_binds.len() != desc.joints.len()
    {
        return Err(GaError::InverseBindCount);
    }
    for shape in &desc.shapes {
        for packet in &shape.packets {
            if packet.matrix_table.len() > MAX_DRAW_SLOTS {
                return Err(GaError::MatrixTableTooLong(
                    packet.matrix_table.len(),
                ));
            }
            for entry in &packet.matrix_table {
                if *entry != MATRIX_UNCHANGED
                    && usize::from(*entry) >= desc.matrix_definitions.len()
                {
                    return Err(GaError::MatrixIndexOutOfRange(usize::from(
                        *entry,
                    )));
                }
            }
        }
    }
    Ok(())
}

fn resolve_shapes(
    shapes: Vec<ShapeDesc>,
) -> Result<(Vec<Shape>, bool), GaError> {
    let mut ret = Vec::with_capacity(shapes.len());
    let mut has_billboard = false;
    for shape in shapes {
        let display_mode = DisplayMode::from_tag(shape.display_tag)?;
        has_billboard |= matches!(
            display_mode,
            DisplayMode::Billboard | DisplayMode::YBillboard
        );
        ret.push(Shape {
            display_mode,
            bbox: shape.bbox,
            packets: shape.packets,
        });
    }
    Ok((ret, has_billboard))
}

fn resolve_materials(
    materials: Vec<MaterialDesc>,
) -> Result<Vec<MaterialEntry>, GaError> {
    let mut ret = Vec::with_capacity(materials.len());
    for material in materials {
        if material.tex_mtx.len() > TEX_MTX_COUNT {
            return Err(GaError::TooManyTextureSlots(material.tex_mtx.len()));
        }
        if material.post_tex_mtx.len() > TEX_MTX_COUNT {
            return Err(GaError::TooManyTextureSlots(
                material.post_tex_mtx.len(),
            ));
        }
        if material.textures.len() > TEX_MTX_COUNT {
            return Err(GaError::TooManyTextureSlots(material.textures.len()));
        }
        if material.ind_tex_mtx.len() > IND_TEX_COUNT {
            return Err(GaError::TooManyIndirectSlots(
                material.ind_tex_mtx.len(),
            ));
        }
        let mut tex_mtx: [Option<TexMtx>; TEX_MTX_COUNT] =
            std::array::from_fn(|_| None);
        for (slot, desc) in material.tex_mtx.iter().enumerate() {
            if let Some(desc) = desc {
                tex_mtx[slot] = Some(TexMtx {
                    mapping: TexMtxMapping::from_tag(desc.mapping_tag)?,
                    effect: desc.effect,
                    srt: util::texture_srt_matrix(
                        desc.scale_s,
                        desc.scale_t,
                        desc.rotation,
                        desc.trans_s,
                        desc.trans_t,
                        &desc.centre,
                    ),
                });
            }
        }
        let mut post_tex_mtx = [None; TEX_MTX_COUNT];
        for (slot, matrix) in material.post_tex_mtx.iter().enumerate() {
            post_tex_mtx[slot] = *matrix;
        }
        let mut ind_tex_mtx = [None; IND_TEX_COUNT];
        for (slot, matrix) in material.ind_tex_mtx.iter().enumerate() {
            ind_tex_mtx[slot] = Some(*matrix);
        }
        let mut textures = [None; TEX_MTX_COUNT];
        for (slot, texture) in material.textures.iter().enumerate() {
            textures[slot] = *texture;
        }
        ret.push(MaterialEntry {
            name: material.name,
            translucent: material.translucent,
            depth_test: material.depth_test,
            cull_mode: material.cull_mode,
            colours: material.colours,
            tex_mtx,
            post_tex_mtx,
            ind_tex_mtx,
            textures,
        });
    }
    Ok(ret)
}

/// Walks the scene graph in draw order, pairing each shape with the
/// material most recently passed and numbering translucent shapes for
/// sort tie breaking
fn build_draw_items(
    hierarchy: &[HierarchyNode],
    root: usize,
    materials: &[MaterialEntry],
) -> Result<Vec<DrawItem>, GaError> {
    let mut visited = vec![false; hierarchy.len()];
    let mut stack = vec![root];
    let mut current_material = None;
    let mut translucent_index = 0u32;
    let mut draw_items = Vec::new();
    while let Some(index) = stack.pop() {
        if visited[index] {
            return Err(GaError::HierarchyNotATree(index));
        }
        visited[index] = true;
        let node = &hierarchy[index];
        match node.kind {
            NodeKind::Joint(_) => {}
            NodeKind::Material(material) => {
                current_material = Some(material);
            }
            NodeKind::Shape(shape) => {
                let material = current_material
                    .ok_or(GaError::ShapeWithoutMaterial(shape))?;
                let sort_key_bias = if materials[material].translucent {
                    translucent_index += 1;
                    u8::try_from(translucent_index).unwrap_or(u8::MAX)
                } else {
                    0
                };
                draw_items.push(DrawItem {
                    shape,
                    material,
                    sort_key_bias,
                });
            }
        }
        // Reversed so that children pop in listed order
        for child in node.children.iter().rev() {
            stack.push(*child);
        }
    }
    Ok(draw_items)
}
