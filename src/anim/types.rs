use crate::colour::ColourKind;
use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

use super::util;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub enum Interpolation {
    #[default]
    Step,
    Linear,
    Hermite,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub enum LoopMode {
    Once,
    #[default]
    Repeat,
    MirroredRepeat,
}

/// One key of a track. Frames do not have to be whole numbers. The
/// tangents are in value units per frame and only Hermite interpolation
/// reads them.
#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize)]
pub struct Keyframe {
    pub frame: f32,
    pub value: f32,
    pub tangent_in: f32,
    pub tangent_out: f32,
}

/// A single animated scalar. Values are in final units, so radians for
/// rotation tracks and the zero to one range for colour channels.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Track {
    pub interpolation: Interpolation,
    pub keys: Vec<Keyframe>,
}

impl Track {
    /// Creates a track that holds one value forever
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self {
            interpolation: Interpolation::Step,
            keys: vec![Keyframe {
                frame: 0.0f32,
                value,
                ..Keyframe::default()
            }],
        }
    }
}

/// Playback parameters shared by every track in a set
#[derive(Copy, Clone, Debug, Deserialize, Serialize)]
pub struct Timing {
    /// Length in frames
    pub duration: f32,
    /// Frames per second of clock time
    pub rate: f32,
    pub loop_mode: LoopMode,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            duration: 0.0f32,
            rate: 30.0f32,
            loop_mode: LoopMode::default(),
        }
    }
}

impl Timing {
    /// Converts a clock time in seconds to a frame within the duration
    #[must_use]
    pub fn frame_at(&self, seconds: f32) -> f32 {
        util::apply_loop(seconds * self.rate, self.duration, self.loop_mode)
    }
}

/// Scale, rotation and translation tracks for one joint
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PoseChannels {
    pub scale_x: Track,
    pub scale_y: Track,
    pub scale_z: Track,
    pub rotation_x: Track,
    pub rotation_y: Track,
    pub rotation_z: Track,
    pub translation_x: Track,
    pub translation_y: Track,
    pub translation_z: Track,
}

/// Joint pose animation, indexed by joint. `None` entries leave the
/// joint to whatever animator was bound before, or to its bind pose.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PoseTrackSet {
    pub timing: Timing,
    pub joints: Vec<Option<PoseChannels>>,
}

/// Texture transform animation for one slot of one material
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TexMtxTrack {
    pub material: String,
    pub slot: usize,
    pub centre: glm::Vec3,
    pub scale_s: Track,
    pub scale_t: Track,
    pub rotation: Track,
    pub trans_s: Track,
    pub trans_t: Track,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TexMtxTrackSet {
    pub timing: Timing,
    pub entries: Vec<TexMtxTrack>,
}

/// Colour register animation for one register of one material
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ColourTrack {
    pub material: String,
    pub kind: ColourKind,
    pub r: Track,
    pub g: Track,
    pub b: Track,
    pub a: Track,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ColourTrackSet {
    pub timing: Timing,
    pub entries: Vec<ColourTrack>,
}

/// Per shape visibility animation. Each track is sampled by frame number,
/// one entry per frame, and there must be exactly one track per shape of
/// the model it is bound to.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct VisibilityTrackSet {
    pub timing: Timing,
    pub tracks: Vec<Vec<bool>>,
}
