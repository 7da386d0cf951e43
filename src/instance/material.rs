use crate::{
    anim::{ColourAnimator, TexMtxAnimator},
    colour::{Colour, ColourKind},
    model::{MaterialEntry, TexMtxMapping},
    submission::{MaterialParams, RenderLayer},
    types::{IND_TEX_COUNT, Light, LIGHT_COUNT, TEX_MTX_COUNT},
    util,
};
use nalgebra_glm as glm;

/// Per frame inputs shared by every material of one instance
pub struct FillContext<'a> {
    pub view: &'a glm::Mat4,
    pub proj: &'a glm::Mat4,
    pub lights: &'a [Light; LIGHT_COUNT],
    pub colour_overrides: &'a [Option<Colour>; ColourKind::COUNT],
    pub alpha_overrides: &'a [bool; ColourKind::COUNT],
    pub disable_textures: bool,
    pub disable_vertex_colours: bool,
}

/// Runtime state for one material of one instance. The static data stays
/// in the shared `MaterialEntry` and this holds what can differ per
/// instance, mostly bound animations.
pub struct MaterialInstance {
    translucent: bool,
    layer: RenderLayer,
    colour_write: bool,
    colour_animators: [Option<ColourAnimator>; ColourKind::COUNT],
    tex_animators: [Option<TexMtxAnimator>; TEX_MTX_COUNT],
}

impl MaterialInstance {
    #[must_use]
    pub fn new(entry: &MaterialEntry) -> Self {
        let layer = if entry.translucent {
            RenderLayer::Translucent
        } else {
            RenderLayer::Opaque
        };
        Self {
            translucent: entry.translucent,
            layer,
            colour_write: true,
            colour_animators: std::array::from_fn(|_| None),
            tex_animators: std::array::from_fn(|_| None),
        }
    }

    #[must_use]
    pub const fn layer(&self) -> RenderLayer {
        self.layer
    }

    /// Moves the material to a different layer. Translucent materials
    /// have to draw after everything else to blend properly, so for
    /// those the request is ignored.
    pub fn set_layer(&mut self, layer: RenderLayer) {
        if !self.translucent {
            self.layer = layer;
        }
    }

    pub fn set_colour_write(&mut self, enable: bool) {
        self.colour_write = enable;
    }

    pub fn bind_colour_animator(
        &mut self,
        kind: ColourKind,
        animator: ColourAnimator,
    ) {
        self.colour_animators[kind.index()] = Some(animator);
    }

    pub fn bind_tex_animator(&mut self, slot: usize, animator: TexMtxAnimator) {
        self.tex_animators[slot] = Some(animator);
    }

    /// Computes the shader parameters for one frame. A colour register
    /// takes the value of a bound animation if there is one, otherwise
    /// an instance override if set, otherwise the value imported with
    /// the material. Animated colours are clamped at zero. Konst
    /// registers are clamped at zero on every path.
    pub fn fill_params(
        &self,
        params: &mut MaterialParams,
        entry: &MaterialEntry,
        ctx: &FillContext,
    ) {
        for kind in ColourKind::ALL {
            let i = kind.index();
            params.colours[i] =
                if let Some(animator) = &self.colour_animators[i] {
                    animator.colour().clamp_negative()
                } else {
                    let mut colour = entry.colours[i];
                    if let Some(over) = ctx.colour_overrides[i] {
                        colour.r = over.r;
                        colour.g = over.g;
                        colour.b = over.b;
                        // Override alpha is opt-in and otherwise the
                        // imported alpha shows through
                        if ctx.alpha_overrides[i] {
                            colour.a = over.a;
                        }
                    }
                    if kind.clamped() {
                        colour.clamp_negative()
                    } else {
                        colour
                    }
                };
        }

        for slot in 0..TEX_MTX_COUNT {
            let Some(tex_mtx) = &entry.tex_mtx[slot] else {
                // Slot is unused so the identity from `MaterialParams`
                // default stays in place
                continue;
            };

            // Coordinate generation input. Environment mappings read
            // view space normals so they take the view rotation without
            // its translation.
            let input = match tex_mtx.mapping {
                TexMtxMapping::Basic | TexMtxMapping::EffectProj => {
                    glm::Mat4::identity()
                }
                TexMtxMapping::EnvMap | TexMtxMapping::EnvProj => {
                    util::without_translation(ctx.view)
                }
                TexMtxMapping::ViewProj => *ctx.view,
            };

            // The effect matrix for `ViewProj` is skipped because it
            // comes preconfigured for the original hardware projection
            let dst = match tex_mtx.mapping {
                TexMtxMapping::Basic => input,
                TexMtxMapping::EnvMap => {
                    tex_mtx.effect
                        * (util::env_map_matrix(-0.5, -0.5, 0.5, 0.5) * input)
                }
                TexMtxMapping::EnvProj | TexMtxMapping::EffectProj => {
                    util::projection_map_matrix(ctx.proj, 0.5, -0.5, 0.5, 0.5)
                        * (tex_mtx.effect * input)
                }
                TexMtxMapping::ViewProj => {
                    util::projection_map_matrix(ctx.proj, 0.5, -0.5, 0.5, 0.5)
                        * input
                }
            };

            // Scroll transform, animated if bound. It keeps translation
            // in the fourth column but the mapping expects it in the
            // third, so swap before combining.
            let srt = self.tex_animators[slot]
                .as_ref()
                .map_or(tex_mtx.srt, TexMtxAnimator::matrix);
            params.tex_mtx[slot] = util::swap_translation_columns(&srt) * dst;
        }

        // Post and indirect transforms are static, unused slots keep the
        // identity from the params default
        for slot in 0..TEX_MTX_COUNT {
            if let Some(matrix) = &entry.post_tex_mtx[slot] {
                params.post_tex_mtx[slot] = *matrix;
            }
        }
        for slot in 0..IND_TEX_COUNT {
            if let Some(matrix) = &entry.ind_tex_mtx[slot] {
                params.ind_tex_mtx[slot] = *matrix;
            }
        }

        for slot in 0..TEX_MTX_COUNT {
            params.textures[slot] = if ctx.disable_textures {
                None
            } else {
                entry.textures[slot]
            };
        }
        params.lights = *ctx.lights;
        params.colour_write = self.colour_write;
        params.depth_test = entry.depth_test;
        params.cull_mode = entry.cull_mode;
        params.vertex_colours = !ctx.disable_vertex_colours;
    }
}
