use super::{
    material::{FillContext, MaterialInstance},
    shape::{MatrixPalette, ShapeInstance, ShapeRenderState},
};
use crate::{
    anim::{
        AnimationClock, ColourAnimator, ColourTrackSet, PoseAnimator,
        PoseTrackSet, TexMtxAnimator, TexMtxTrackSet, VisibilityAnimator,
        VisibilityTrackSet,
    },
    camera::Frustum,
    colour::{Colour, ColourKind},
    ga_error::GaError,
    model::{MatrixDefinition, Model, NodeKind},
    submission::{DrawSubmission, MaterialParams, RenderLayer, SortKey},
    types::{CameraTrait, Light, LIGHT_COUNT, TEX_MTX_COUNT},
    util,
};
use nalgebra_glm as glm;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::sync::Arc;

#[allow(unused_imports)]
use log::{debug, error, info, trace};

/// A renderable occurrence of a `Model`. Instances share the static
/// model data through an `Arc` and keep their own transform, animation
/// bindings, overrides and per frame output.
#[allow(clippy::struct_excessive_bools)]
pub struct ModelInstance {
    model: Arc<Model>,
    pub model_matrix: glm::Mat4,
    pub visible: bool,
    /// Skyboxes are drawn centred on the camera and are never culled
    pub is_skybox: bool,
    pass_mask: u32,

    // Instance wide render controls
    lights: [Light; LIGHT_COUNT],
    colour_overrides: [Option<Colour>; ColourKind::COUNT],
    alpha_overrides: [bool; ColourKind::COUNT],
    disable_textures: bool,
    disable_vertex_colours: bool,

    // Animation bindings
    clock: Arc<AnimationClock>,
    pose_animators: Vec<Option<PoseAnimator>>,
    visibility_animators: Vec<Option<VisibilityAnimator>>,

    // Per frame working state
    world_matrices: Vec<glm::Mat4>,
    joint_visibility: Vec<bool>,
    palette: MatrixPalette,
    stack: Vec<(usize, glm::Mat4)>,

    // Per frame output
    material_instances: Vec<MaterialInstance>,
    material_params: Vec<MaterialParams>,
    shape_instances: Vec<ShapeInstance>,
    submissions: Vec<DrawSubmission>,
}

impl ModelInstance {
    #[must_use]
    pub fn new(model: Arc<Model>) -> Self {
        let joint_count = model.joints.len();
        let palette = MatrixPalette::new(model.matrix_definitions.len());
        let material_instances: Vec<MaterialInstance> =
            model.materials.iter().map(MaterialInstance::new).collect();
        let material_params =
            vec![MaterialParams::default(); model.materials.len()];

        // One submission per packet, in scene graph draw order. The
        // list never changes size so renderers can hold indices into it.
        let mut shape_instances = Vec::with_capacity(model.draw_items.len());
        let mut submissions = Vec::new();
        for item in &model.draw_items {
            shape_instances.push(ShapeInstance::new(submissions.len()));
            for packet in 0..model.shapes[item.shape].packets.len() {
                submissions.push(DrawSubmission {
                    shape: item.shape,
                    packet,
                    material: item.material,
                    ..DrawSubmission::default()
                });
            }
        }
        debug!(
            "Instance with {} joints, {} draw items, {} submissions",
            joint_count,
            model.draw_items.len(),
            submissions.len()
        );

        Self {
            model_matrix: glm::Mat4::identity(),
            visible: true,
            is_skybox: false,
            pass_mask: 0x01,
            lights: [Light::default(); LIGHT_COUNT],
            colour_overrides: [None; ColourKind::COUNT],
            alpha_overrides: [false; ColourKind::COUNT],
            disable_textures: false,
            disable_vertex_colours: false,
            clock: Arc::new(AnimationClock::default()),
            pose_animators: vec![None; joint_count],
            visibility_animators: vec![None; model.shapes.len()],
            world_matrices: vec![glm::Mat4::identity(); joint_count],
            joint_visibility: vec![true; joint_count],
            palette,
            stack: Vec::new(),
            material_instances,
            material_params,
            shape_instances,
            submissions,
            model,
        }
    }

    #[must_use]
    pub const fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// The submission list as of the last `update`, one entry per
    /// packet in scene graph draw order
    #[must_use]
    pub fn submissions(&self) -> &[DrawSubmission] {
        &self.submissions
    }

    /// Shader parameters as of the last `update`, indexed by material
    #[must_use]
    pub fn material_params(&self) -> &[MaterialParams] {
        &self.material_params
    }

    #[must_use]
    pub const fn pass_mask(&self) -> u32 {
        self.pass_mask
    }

    /// Sets which render passes draw this instance. The mask goes out
    /// with every submission.
    pub fn set_pass_mask(&mut self, mask: u32) {
        self.pass_mask = mask;
        for submission in &mut self.submissions {
            submission.pass_mask = mask;
        }
    }

    #[must_use]
    pub const fn lights(&self) -> &[Light; LIGHT_COUNT] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut [Light; LIGHT_COUNT] {
        &mut self.lights
    }

    /// Moves every material that is not translucent to `layer`.
    /// Translucent materials have to stay in the translucent layer.
    pub fn set_layer(&mut self, layer: RenderLayer) {
        for material in &mut self.material_instances {
            material.set_layer(layer);
        }
    }

    /// Sets or clears a colour override for one register. Overrides
    /// apply to every material but lose to a bound colour animation for
    /// the same register. By default the material alpha shows through;
    /// set `use_alpha` to take the alpha from `colour` as well.
    pub fn set_colour_override(
        &mut self,
        kind: ColourKind,
        colour: Option<Colour>,
        use_alpha: bool,
    ) {
        self.colour_overrides[kind.index()] = colour;
        self.alpha_overrides[kind.index()] = use_alpha;
    }

    /// Turns colour output on or off for one material by name. Some
    /// games disable colour write briefly to draw depth only.
    ///
    /// # Errors
    /// Returns `GaError::MaterialNotFound` if no material has that name
    pub fn set_material_colour_write(
        &mut self,
        name: &str,
        enable: bool,
    ) -> Result<(), GaError> {
        let index = self.model.material_index(name)?;
        self.material_instances[index].set_colour_write(enable);
        Ok(())
    }

    /// Render hack that substitutes opaque white for every texture
    /// sample when disabled
    pub fn set_textures_enabled(&mut self, enable: bool) {
        self.disable_textures = !enable;
    }

    /// Render hack that substitutes opaque white for vertex colours
    /// when disabled
    pub fn set_vertex_colours_enabled(&mut self, enable: bool) {
        self.disable_vertex_colours = !enable;
    }

    /// World matrix of a joint by name, as of the last `update`. Useful
    /// for attaching things to a bone.
    ///
    /// # Errors
    /// Returns `GaError::JointNotFound` if no joint has that name
    pub fn joint_matrix(&self, name: &str) -> Result<&glm::Mat4, GaError> {
        let index = self.model.joint_index(name)?;
        Ok(&self.world_matrices[index])
    }

    /// Clock owned by this instance, for animations played on its own
    /// time. The bind methods take a clock explicitly so that several
    /// instances can also share one cursor.
    #[must_use]
    pub const fn clock(&self) -> &Arc<AnimationClock> {
        &self.clock
    }

    /// Binds a pose animation to the joints it covers. Joints the set
    /// does not cover keep whatever binding they already had, so a
    /// partial animation can play over a full body one.
    pub fn bind_pose_animation(
        &mut self,
        set: &Arc<PoseTrackSet>,
        clock: &Arc<AnimationClock>,
    ) {
        let animator = PoseAnimator::new(Arc::clone(set), Arc::clone(clock));
        for joint in 0..self.pose_animators.len() {
            if animator.covers(joint) {
                self.pose_animators[joint] = Some(animator.clone());
            }
        }
    }

    /// Binds texture transform animations to the material slots the set
    /// names. Entries for materials this model does not have are
    /// skipped.
    pub fn bind_tex_mtx_animation(
        &mut self,
        set: &Arc<TexMtxTrackSet>,
        clock: &Arc<AnimationClock>,
    ) {
        for (entry_index, entry) in set.entries.iter().enumerate() {
            if entry.slot >= TEX_MTX_COUNT {
                debug!(
                    "Texture animation for {} names bad slot {}",
                    entry.material, entry.slot
                );
                continue;
            }
            let Ok(material) = self.model.material_index(&entry.material)
            else {
                debug!("No material {} for texture animation", entry.material);
                continue;
            };
            self.material_instances[material].bind_tex_animator(
                entry.slot,
                TexMtxAnimator::new(
                    Arc::clone(set),
                    Arc::clone(clock),
                    entry_index,
                ),
            );
        }
    }

    /// Binds colour register animations to the materials the set names.
    /// Entries for materials this model does not have are skipped.
    pub fn bind_colour_animation(
        &mut self,
        set: &Arc<ColourTrackSet>,
        clock: &Arc<AnimationClock>,
    ) {
        for (entry_index, entry) in set.entries.iter().enumerate() {
            let Ok(material) = self.model.material_index(&entry.material)
            else {
                debug!("No material {} for colour animation", entry.material);
                continue;
            };
            self.material_instances[material].bind_colour_animator(
                entry.kind,
                ColourAnimator::new(
                    Arc::clone(set),
                    Arc::clone(clock),
                    entry_index,
                ),
            );
        }
    }

    /// Binds a shape visibility animation. Unlike the other bindings
    /// this one is all or nothing, so the set must have exactly one
    /// track per shape.
    ///
    /// # Errors
    /// Returns `GaError::ShapeTrackCountMismatch` if the track count is
    /// wrong
    pub fn bind_visibility_animation(
        &mut self,
        set: &Arc<VisibilityTrackSet>,
        clock: &Arc<AnimationClock>,
    ) -> Result<(), GaError> {
        if set.tracks.len() != self.model.shapes.len() {
            error!(
                "Visibility animation has {} tracks but the model has {} shapes",
                set.tracks.len(),
                self.model.shapes.len()
            );
            return Err(GaError::ShapeTrackCountMismatch(
                set.tracks.len(),
                self.model.shapes.len(),
            ));
        }
        for shape in 0..self.visibility_animators.len() {
            self.visibility_animators[shape] = Some(VisibilityAnimator::new(
                Arc::clone(set),
                Arc::clone(clock),
                shape,
            ));
        }
        Ok(())
    }

    /// Advances this instance for the frame. Joint and skinning
    /// matrices are rebuilt from any bound animations, each joint is
    /// tested against the view frustum, and the submission list and
    /// material parameters are rewritten. Pass `visible` as false to
    /// keep the instance hidden this frame without changing its state.
    pub fn update(&mut self, camera: &impl CameraTrait, visible: bool) {
        let view = camera.view_matrix();
        let proj = camera.proj_matrix();

        let mut model_visible = visible && self.visible;
        if model_visible {
            // Camera facing shapes get the instance transform applied
            // per shape instead, so the joints stay in model space
            let root_parent = if self.model.has_billboard {
                glm::Mat4::identity()
            } else {
                self.model_matrix
            };

            // Skyboxes follow the camera and camera facing shapes are
            // rebuilt to look at it, so the world space joint bounds of
            // either can't be culled against the frustum
            let disable_culling = self.is_skybox || self.model.has_billboard;
            let frustum = Frustum::new(&(proj * view));
            self.update_joints(&frustum, root_parent, disable_culling);
            self.update_palette();

            // Everything off screen?
            if !self.palette.any_visible() {
                model_visible = false;
            }
        }

        let depth = if model_visible {
            // Sorting depth for the whole model comes from the root
            // joint bounds
            let bbox =
                self.model.joints[0].bbox.transformed(&self.model_matrix);
            util::transform(&bbox.centre(), &view).z.max(0.0)
        } else {
            0.0
        };

        if model_visible {
            let ctx = FillContext {
                view: &view,
                proj: &proj,
                lights: &self.lights,
                colour_overrides: &self.colour_overrides,
                alpha_overrides: &self.alpha_overrides,
                disable_textures: self.disable_textures,
                disable_vertex_colours: self.disable_vertex_colours,
            };
            for (i, material) in self.material_instances.iter().enumerate() {
                material.fill_params(
                    &mut self.material_params[i],
                    &self.model.materials[i],
                    &ctx,
                );
            }
        }

        let state = ShapeRenderState {
            model_matrix: if self.model.has_billboard {
                self.model_matrix
            } else {
                glm::Mat4::identity()
            },
            view,
            skybox_view: util::without_translation(&view),
            billboard: util::billboard_rotation(&view),
            y_billboard: util::y_billboard_rotation(&view),
            is_skybox: self.is_skybox,
        };

        for (item_index, item) in self.model.draw_items.iter().enumerate() {
            let shape = &self.model.shapes[item.shape];
            let shape_visible = model_visible
                && self.visibility_animators[item.shape]
                    .as_ref()
                    .map_or(true, VisibilityAnimator::visible);
            let sort_key =
                SortKey::new(self.material_instances[item.material].layer())
                    .with_depth(depth)
                    .with_bias(item.sort_key_bias);
            let first = self.shape_instances[item_index].first_submission;
            let last = first + shape.packets.len();
            self.shape_instances[item_index].update(
                shape,
                &state,
                &self.palette,
                shape_visible,
                sort_key,
                &mut self.submissions[first..last],
            );
        }
    }

    /// Walks the scene graph composing joint transforms and testing
    /// each joint's bounds against the frustum. Joint bounds do not
    /// contain child joints, so a parent off screen never hides its
    /// children.
    fn update_joints(
        &mut self,
        frustum: &Frustum,
        root_parent: glm::Mat4,
        disable_culling: bool,
    ) {
        let mut stack = std::mem::take(&mut self.stack);
        stack.push((self.model.root, root_parent));
        while let Some((index, parent)) = stack.pop() {
            let node = &self.model.hierarchy[index];
            let matrix = if let NodeKind::Joint(joint) = node.kind {
                let local = self.pose_animators[joint]
                    .as_ref()
                    .and_then(|a| a.joint_matrix(joint))
                    .unwrap_or_else(|| self.model.joints[joint].transform);
                let world = parent * local;
                self.world_matrices[joint] = world;
                self.joint_visibility[joint] = disable_culling
                    || self.model.joints[joint].bbox.is_empty()
                    || frustum.intersects(
                        &self.model.joints[joint].bbox.transformed(&world),
                    );
                world
            } else {
                parent
            };
            // Reversed so that children pop in listed order
            for child in node.children.iter().rev() {
                stack.push((*child, matrix));
            }
        }
        self.stack = stack;
    }

    /// Rebuilds the transform palette. Rigid entries copy a joint
    /// matrix. Skinned entries blend bind relative joint matrices with
    /// the stored weights, which are used as is even when they don't
    /// sum to one. A blended entry is visible if any of its joints is.
    fn update_palette(&mut self) {
        for (i, definition) in
            self.model.matrix_definitions.iter().enumerate()
        {
            match *definition {
                MatrixDefinition::Joint(joint) => {
                    self.palette.transforms[i] = self.world_matrices[joint];
                    self.palette.visibility[i] = self.joint_visibility[joint];
                }
                MatrixDefinition::Envelope(envelope) => {
                    let mut blended = glm::Mat4::zeros();
                    let mut any_visible = false;
                    for bone in &self.model.envelopes[envelope].bones {
                        blended += (self.world_matrices[bone.joint]
                            * self.model.inverse_binds[bone.joint])
                            * bone.weight;
                        if self.joint_visibility[bone.joint] {
                            any_visible = true;
                        }
                    }
                    self.palette.transforms[i] = blended;
                    self.palette.visibility[i] = any_visible;
                }
            }
        }
    }
}

/// Updates a set of instances for the frame. With the "rayon" feature
/// enabled the work is spread across a thread pool.
pub fn update_instances(
    instances: &mut [ModelInstance],
    camera: &(impl CameraTrait + Sync),
    visible: bool,
) {
    #[cfg(feature = "rayon")]
    let it = instances.par_iter_mut();
    #[cfg(not(feature = "rayon"))]
    let it = instances.iter_mut();
    it.for_each(|instance| instance.update(camera, visible));
}
