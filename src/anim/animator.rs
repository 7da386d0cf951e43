use super::{
    clock::AnimationClock,
    types::{
        ColourTrackSet, PoseTrackSet, TexMtxTrackSet, VisibilityTrackSet,
    },
    util::{pose_matrix, sample},
};
use crate::{colour::Colour, util::texture_srt_matrix};
use nalgebra_glm as glm;
use std::sync::Arc;

/// Joint pose animation bound to a clock. One of these is installed per
/// covered joint, all sharing the track set.
#[derive(Clone, Debug)]
pub struct PoseAnimator {
    set: Arc<PoseTrackSet>,
    clock: Arc<AnimationClock>,
}

impl PoseAnimator {
    #[must_use]
    pub fn new(set: Arc<PoseTrackSet>, clock: Arc<AnimationClock>) -> Self {
        Self { set, clock }
    }

    /// True if the track set has channels for the joint
    #[must_use]
    pub fn covers(&self, joint: usize) -> bool {
        matches!(self.set.joints.get(joint), Some(Some(_)))
    }

    /// Local matrix for a joint at the current clock time, or `None` for
    /// a joint the track set does not cover
    #[must_use]
    pub fn joint_matrix(&self, joint: usize) -> Option<glm::Mat4> {
        let channels = self.set.joints.get(joint)?.as_ref()?;
        let frame = self.set.timing.frame_at(self.clock.seconds());
        Some(pose_matrix(channels, frame))
    }
}

/// One entry of a texture transform track set bound to a clock
#[derive(Clone, Debug)]
pub struct TexMtxAnimator {
    set: Arc<TexMtxTrackSet>,
    clock: Arc<AnimationClock>,
    entry: usize,
}

impl TexMtxAnimator {
    /// `entry` is an index into the entries of the set
    #[must_use]
    pub fn new(
        set: Arc<TexMtxTrackSet>,
        clock: Arc<AnimationClock>,
        entry: usize,
    ) -> Self {
        Self { set, clock, entry }
    }

    /// Texture transform at the current clock time
    #[must_use]
    pub fn matrix(&self) -> glm::Mat4 {
        let frame = self.set.timing.frame_at(self.clock.seconds());
        let e = &self.set.entries[self.entry];
        texture_srt_matrix(
            sample(&e.scale_s, frame),
            sample(&e.scale_t, frame),
            sample(&e.rotation, frame),
            sample(&e.trans_s, frame),
            sample(&e.trans_t, frame),
            &e.centre,
        )
    }
}

/// One entry of a colour track set bound to a clock
#[derive(Clone, Debug)]
pub struct ColourAnimator {
    set: Arc<ColourTrackSet>,
    clock: Arc<AnimationClock>,
    entry: usize,
}

impl ColourAnimator {
    /// `entry` is an index into the entries of the set
    #[must_use]
    pub fn new(
        set: Arc<ColourTrackSet>,
        clock: Arc<AnimationClock>,
        entry: usize,
    ) -> Self {
        Self { set, clock, entry }
    }

    /// Colour at the current clock time. Values are sampled as they are
    /// in the tracks, without any clamping.
    #[must_use]
    pub fn colour(&self) -> Colour {
        let frame = self.set.timing.frame_at(self.clock.seconds());
        let e = &self.set.entries[self.entry];
        Colour::new(
            sample(&e.r, frame),
            sample(&e.g, frame),
            sample(&e.b, frame),
            sample(&e.a, frame),
        )
    }
}

/// One track of a shape visibility set bound to a clock
#[derive(Clone, Debug)]
pub struct VisibilityAnimator {
    set: Arc<VisibilityTrackSet>,
    clock: Arc<AnimationClock>,
    track: usize,
}

impl VisibilityAnimator {
    /// `track` is an index into the tracks of the set
    #[must_use]
    pub fn new(
        set: Arc<VisibilityTrackSet>,
        clock: Arc<AnimationClock>,
        track: usize,
    ) -> Self {
        Self { set, clock, track }
    }

    /// Visibility at the current clock time. An empty track reports
    /// visible.
    #[must_use]
    pub fn visible(&self) -> bool {
        let frames = &self.set.tracks[self.track];
        if frames.is_empty() {
            return true;
        }
        let frame = self.set.timing.frame_at(self.clock.seconds());
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let idx = (frame.floor() as usize).min(frames.len() - 1);
        frames[idx]
    }
}
