use crate::{
    model::{DisplayMode, Shape},
    submission::{DrawSubmission, SortKey},
    types::{MATRIX_UNCHANGED, MAX_DRAW_SLOTS},
};
use nalgebra_glm as glm;

/// Skinning palette for one instance. Packet matrix tables index into
/// the transforms, and each entry carries a visibility flag derived from
/// the joints that feed it.
pub struct MatrixPalette {
    pub transforms: Vec<glm::Mat4>,
    pub visibility: Vec<bool>,
}

impl MatrixPalette {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            transforms: vec![glm::Mat4::identity(); len],
            visibility: vec![true; len],
        }
    }

    #[must_use]
    pub fn any_visible(&self) -> bool {
        self.visibility.iter().any(|v| *v)
    }
}

/// Camera derived matrices shared by every shape of one instance for one
/// frame
pub struct ShapeRenderState {
    /// Identity normally. Camera facing models keep the joints in local
    /// space, so for those this carries the instance transform instead.
    pub model_matrix: glm::Mat4,
    pub view: glm::Mat4,
    /// View with its translation removed, used by skyboxes so they stay
    /// centred on the camera
    pub skybox_view: glm::Mat4,
    pub billboard: glm::Mat4,
    pub y_billboard: glm::Mat4,
    pub is_skybox: bool,
}

/// Builds the draw submissions for one occurrence of a shape in the draw
/// order
pub struct ShapeInstance {
    pub first_submission: usize,
    draw_mtx: [glm::Mat4; MAX_DRAW_SLOTS],
}

impl ShapeInstance {
    #[must_use]
    pub fn new(first_submission: usize) -> Self {
        Self {
            first_submission,
            draw_mtx: std::array::from_fn(|_| glm::Mat4::identity()),
        }
    }

    /// Fills this shape's slice of the submission list, one entry per
    /// packet. The transform scratch is rebuilt from identity and then
    /// carried across the packets, so a `MATRIX_UNCHANGED` slot reuses
    /// whatever the previous packet put there and a slot nothing writes
    /// stays at identity.
    pub fn update(
        &mut self,
        shape: &Shape,
        state: &ShapeRenderState,
        palette: &MatrixPalette,
        visible: bool,
        sort_key: SortKey,
        submissions: &mut [DrawSubmission],
    ) {
        if !visible {
            for submission in &mut *submissions {
                submission.visible = false;
            }
            return;
        }

        for m in &mut self.draw_mtx {
            *m = glm::Mat4::identity();
        }
        let model_view = model_view(shape, state);

        for (packet, submission) in
            shape.packets.iter().zip(submissions.iter_mut())
        {
            // A packet draws if any palette entry it references is
            // visible. Slots left unchanged don't count.
            let mut any_visible = false;
            for (slot, entry) in packet.matrix_table.iter().enumerate() {
                if *entry == MATRIX_UNCHANGED {
                    continue;
                }
                let index = usize::from(*entry);
                if palette.visibility[index] {
                    any_visible = true;
                }
                self.draw_mtx[slot] = model_view * palette.transforms[index];
            }
            submission.visible = any_visible;
            submission.sort_key = sort_key;
            submission.transforms = self.draw_mtx;
            submission.transform_count = packet.matrix_table.len();
        }
    }
}

/// Combines the camera with the per shape model transform
fn model_view(shape: &Shape, state: &ShapeRenderState) -> glm::Mat4 {
    let model = match shape.display_mode {
        DisplayMode::Normal | DisplayMode::MultiMatrix => state.model_matrix,
        DisplayMode::Billboard => state.model_matrix * state.billboard,
        DisplayMode::YBillboard => state.model_matrix * state.y_billboard,
    };
    let view = if state.is_skybox {
        &state.skybox_view
    } else {
        &state.view
    };
    view * model
}
