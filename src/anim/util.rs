use super::types::{
    Interpolation, Keyframe, LoopMode, PoseChannels, Track,
};
use crate::util::srt_matrix;
use nalgebra_glm as glm;

/// Maps a raw frame count onto the duration of a track set according to
/// its loop mode. The result is always within zero to duration.
#[must_use]
pub fn apply_loop(frame: f32, duration: f32, mode: LoopMode) -> f32 {
    match mode {
        LoopMode::Once => frame.clamp(0.0f32, duration.max(0.0f32)),
        LoopMode::Repeat => {
            if duration <= 0.0f32 {
                0.0f32
            } else {
                frame.rem_euclid(duration)
            }
        }
        LoopMode::MirroredRepeat => {
            if duration <= 0.0f32 {
                0.0f32
            } else {
                duration - (frame.rem_euclid(2.0f32 * duration) - duration).abs()
            }
        }
    }
}

/// Cubic interpolation between two keys with the tangents scaled to the
/// key spacing
fn hermite(k0: &Keyframe, k1: &Keyframe, frame: f32) -> f32 {
    let length = k1.frame - k0.frame;
    let t = (frame - k0.frame) / length;
    let p0 = k0.value;
    let p1 = k1.value;
    let s0 = k0.tangent_out * length;
    let s1 = k1.tangent_in * length;
    let cf0 = 2.0f32.mul_add(p0, -(2.0f32 * p1)) + s0 + s1;
    let cf1 = 3.0f32.mul_add(p1, -(3.0f32 * p0)) - 2.0f32.mul_add(s0, s1);
    cf0.mul_add(t, cf1).mul_add(t, s0).mul_add(t, p0)
}

/// Samples a track at a frame. Outside the keyed range the value of the
/// nearest key is held.
#[must_use]
pub fn sample(track: &Track, frame: f32) -> f32 {
    let keys = &track.keys;
    let Some(first) = keys.first() else {
        return 0.0f32;
    };
    if keys.len() == 1 {
        return first.value;
    }
    // Find the first key past the requested frame. The key before it is
    // then the one being interpolated from.
    match keys.iter().position(|k| frame < k.frame) {
        Some(0) => first.value,
        None => keys[keys.len() - 1].value,
        Some(idx1) => {
            let k0 = &keys[idx1 - 1];
            let k1 = &keys[idx1];
            match track.interpolation {
                Interpolation::Step => k0.value,
                Interpolation::Linear => {
                    let t = (frame - k0.frame) / (k1.frame - k0.frame);
                    (k1.value - k0.value).mul_add(t, k0.value)
                }
                Interpolation::Hermite => hermite(k0, k1, frame),
            }
        }
    }
}

/// Samples all nine channels of a joint pose and composes them into a
/// local matrix
#[must_use]
pub fn pose_matrix(channels: &PoseChannels, frame: f32) -> glm::Mat4 {
    srt_matrix(
        &glm::vec3(
            sample(&channels.scale_x, frame),
            sample(&channels.scale_y, frame),
            sample(&channels.scale_z, frame),
        ),
        &glm::vec3(
            sample(&channels.rotation_x, frame),
            sample(&channels.rotation_y, frame),
            sample(&channels.rotation_z, frame),
        ),
        &glm::vec3(
            sample(&channels.translation_x, frame),
            sample(&channels.translation_y, frame),
            sample(&channels.translation_z, frame),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0005;

    #[test]
    fn loop_modes() {
        let x = apply_loop(25.0f32, 10.0f32, LoopMode::Once);
        assert!((x - 10.0f32).abs() < EPSILON);
        let x = apply_loop(25.0f32, 10.0f32, LoopMode::Repeat);
        assert!((x - 5.0f32).abs() < EPSILON);
        let x = apply_loop(-3.0f32, 10.0f32, LoopMode::Repeat);
        assert!((x - 7.0f32).abs() < EPSILON);
        // 15 frames into a 10 frame mirrored loop is 5 frames back from
        // the end
        let x = apply_loop(15.0f32, 10.0f32, LoopMode::MirroredRepeat);
        assert!((x - 5.0f32).abs() < EPSILON);
        let x = apply_loop(7.0f32, 0.0f32, LoopMode::Repeat);
        assert!(x.abs() < EPSILON);
    }

    #[test]
    fn hermite_passes_through_keys() {
        let track = Track {
            interpolation: Interpolation::Hermite,
            keys: vec![
                Keyframe {
                    frame: 0.0f32,
                    value: 1.0f32,
                    tangent_in: 0.0f32,
                    tangent_out: 2.0f32,
                },
                Keyframe {
                    frame: 10.0f32,
                    value: 3.0f32,
                    tangent_in: -1.0f32,
                    tangent_out: 0.0f32,
                },
            ],
        };
        let x = sample(&track, 0.0f32);
        assert!((x - 1.0f32).abs() < EPSILON);
        let x = sample(&track, 10.0f32);
        assert!((x - 3.0f32).abs() < EPSILON);
        // Just before the second key the curve approaches it along the
        // incoming tangent
        let x = sample(&track, 9.99f32);
        assert!((x - 3.01f32).abs() < 0.005f32);
    }
}
