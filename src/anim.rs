mod animator;
mod clock;
mod types;
mod util;

// Re-exports
pub use {
    animator::{
        ColourAnimator, PoseAnimator, TexMtxAnimator, VisibilityAnimator,
    },
    clock::AnimationClock,
    types::{
        ColourTrack, ColourTrackSet, Interpolation, Keyframe, LoopMode,
        PoseChannels, PoseTrackSet, TexMtxTrack, TexMtxTrackSet, Timing,
        Track, VisibilityTrackSet,
    },
    util::{apply_loop, pose_matrix, sample},
};
