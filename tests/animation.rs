//! Tests for track sampling and animation binding
//!
//! Keyframe values are chosen so that the interpolation results are exact
//! in f32, which keeps most comparisons exact. The clock times are chosen
//! so that seconds times rate also lands on an exactly representable
//! frame. Where a linear blend factor rounds, the comparison uses a small
//! epsilon instead.

use galatea::{
    aabb::Aabb,
    anim::{
        apply_loop, sample, AnimationClock, Interpolation, Keyframe,
        LoopMode, PoseChannels, PoseTrackSet, Timing, Track,
        VisibilityTrackSet,
    },
    camera::Camera,
    colour::{Colour, ColourKind},
    ga_error::GaError,
    instance::ModelInstance,
    model::{
        HierarchyNode, Joint, MaterialDesc, MatrixDefinition, Model,
        ModelDesc, NodeKind, Packet, ShapeDesc,
    },
};
use log::info;
use nalgebra_glm as glm;
use std::sync::{Arc, Once};

const EPSILON: f32 = 0.0001f32; // Small value for float comparisons
static INIT: Once = Once::new();

/// Initializes logging in a "once per test run" manner. Call at the start of
/// each test that needs logging.
fn init_tests() {
    INIT.call_once(|| {
        env_logger::init();
    });
}

/// Builds a translation matrix
fn translation(x: f32, y: f32, z: f32) -> glm::Mat4 {
    glm::translation(&glm::vec3(x, y, z))
}

/// Builds a joint with no bounds, which is never culled
fn joint(name: &str, transform: glm::Mat4) -> Joint {
    Joint {
        name: name.to_owned(),
        transform,
        bbox: Aabb::default(),
    }
}

/// Builds a scene graph node
fn node(kind: NodeKind, children: Vec<usize>) -> HierarchyNode {
    HierarchyNode { kind, children }
}

/// Builds an untextured material
fn material(name: &str) -> MaterialDesc {
    MaterialDesc {
        name: name.to_owned(),
        translucent: false,
        depth_test: true,
        cull_mode: 0,
        colours: [Colour::WHITE; ColourKind::COUNT],
        tex_mtx: Vec::new(),
        post_tex_mtx: Vec::new(),
        ind_tex_mtx: Vec::new(),
        textures: Vec::new(),
    }
}

/// Builds a shape with one packet drawing the given palette slots
fn shape(slots: &[u16]) -> ShapeDesc {
    ShapeDesc {
        display_tag: 0x00,
        bbox: Aabb::default(),
        packets: vec![Packet {
            matrix_table: slots.iter().copied().collect(),
            ..Packet::default()
        }],
    }
}

/// Builds a key with zero tangents
fn key(frame: f32, value: f32) -> Keyframe {
    Keyframe {
        frame,
        value,
        tangent_in: 0.0f32,
        tangent_out: 0.0f32,
    }
}

/// Builds constant channels that translate a joint along y. The scale
/// channels have to be explicit ones because an empty track samples as
/// zero.
fn y_channels(y: f32) -> PoseChannels {
    PoseChannels {
        scale_x: Track::constant(1.0f32),
        scale_y: Track::constant(1.0f32),
        scale_z: Track::constant(1.0f32),
        rotation_x: Track::constant(0.0f32),
        rotation_y: Track::constant(0.0f32),
        rotation_z: Track::constant(0.0f32),
        translation_x: Track::constant(0.0f32),
        translation_y: Track::constant(y),
        translation_z: Track::constant(0.0f32),
    }
}

/// Tests `sample` with each interpolation kind
#[test]
fn sample_interpolations() {
    init_tests();
    let step = Track {
        interpolation: Interpolation::Step,
        keys: vec![key(0.0f32, 1.0f32), key(10.0f32, 2.0f32)],
    };
    assert_eq!(sample(&step, 5.0f32), 1.0f32);
    assert_eq!(sample(&step, 10.0f32), 2.0f32);
    // Outside the keyed range the nearest key is held
    assert_eq!(sample(&step, -1.0f32), 1.0f32);
    assert_eq!(sample(&step, 99.0f32), 2.0f32);

    let linear = Track {
        interpolation: Interpolation::Linear,
        keys: vec![key(0.0f32, 0.0f32), key(10.0f32, 20.0f32)],
    };
    assert_eq!(sample(&linear, 2.5f32), 5.0f32);
    assert_eq!(sample(&linear, 10.0f32), 20.0f32);

    // With zero tangents the cubic is the classic smoothstep shape, which
    // passes through half the value range at the halfway point
    let hermite = Track {
        interpolation: Interpolation::Hermite,
        keys: vec![key(0.0f32, 0.0f32), key(10.0f32, 10.0f32)],
    };
    assert_eq!(sample(&hermite, 0.0f32), 0.0f32);
    assert_eq!(sample(&hermite, 5.0f32), 5.0f32);
    assert_eq!(sample(&hermite, 2.5f32), 1.5625f32);
    assert_eq!(sample(&hermite, 10.0f32), 10.0f32);

    // A single key holds its value everywhere
    assert_eq!(sample(&Track::constant(7.0f32), -3.0f32), 7.0f32);
    assert_eq!(sample(&Track::constant(7.0f32), 42.0f32), 7.0f32);
}

/// Tests `Timing::frame_at` with each loop mode
#[test]
fn frame_at() {
    init_tests();
    let mut timing = Timing {
        duration: 10.0f32,
        rate: 30.0f32,
        loop_mode: LoopMode::Once,
    };
    assert_eq!(timing.frame_at(0.1f32), 3.0f32);
    assert_eq!(timing.frame_at(0.5f32), 10.0f32);
    assert_eq!(timing.frame_at(-0.5f32), 0.0f32);

    timing.loop_mode = LoopMode::Repeat;
    assert_eq!(timing.frame_at(0.5f32), 5.0f32);

    // Frame 15 of a 10 frame mirrored loop plays 5 frames back from the
    // end
    timing.loop_mode = LoopMode::MirroredRepeat;
    assert_eq!(timing.frame_at(0.5f32), 5.0f32);

    assert_eq!(
        apply_loop(25.0f32, 10.0f32, LoopMode::MirroredRepeat),
        5.0f32
    );
    assert_eq!(apply_loop(-5.0f32, 10.0f32, LoopMode::Repeat), 5.0f32);
    // A zero length repeat holds frame zero
    assert_eq!(apply_loop(7.0f32, 0.0f32, LoopMode::Repeat), 0.0f32);
}

/// Tests pose animation binding and partial rebinding over it
#[test]
fn pose_binding() {
    init_tests();
    let desc = ModelDesc {
        joints: vec![
            joint("hip", translation(0.0f32, 1.0f32, 0.0f32)),
            joint("knee", translation(0.0f32, 2.0f32, 0.0f32)),
            joint("foot", translation(0.0f32, 3.0f32, 0.0f32)),
        ],
        hierarchy: vec![
            node(NodeKind::Joint(0), vec![1, 2]),
            node(NodeKind::Joint(1), vec![]),
            node(NodeKind::Joint(2), vec![]),
        ],
        root: 0,
        matrix_definitions: vec![MatrixDefinition::Joint(0)],
        ..ModelDesc::default()
    };
    let model = Arc::new(Model::new(desc).unwrap());
    let mut instance = ModelInstance::new(Arc::clone(&model));
    let camera = Camera::default();
    instance.update(&camera, true);
    // Bind pose before any animation
    assert_eq!(
        *instance.joint_matrix("knee").unwrap(),
        translation(0.0f32, 3.0f32, 0.0f32)
    );

    // Nothing advances the time here, so the clock the instance owns
    // serves as well as a fresh one
    let clock = Arc::clone(instance.clock());
    let full = Arc::new(PoseTrackSet {
        timing: Timing::default(),
        joints: vec![
            Some(y_channels(5.0f32)),
            Some(y_channels(6.0f32)),
            Some(y_channels(7.0f32)),
        ],
    });
    instance.bind_pose_animation(&full, &clock);
    instance.update(&camera, true);
    assert_eq!(
        *instance.joint_matrix("hip").unwrap(),
        translation(0.0f32, 5.0f32, 0.0f32)
    );
    assert_eq!(
        *instance.joint_matrix("knee").unwrap(),
        translation(0.0f32, 11.0f32, 0.0f32)
    );
    assert_eq!(
        *instance.joint_matrix("foot").unwrap(),
        translation(0.0f32, 12.0f32, 0.0f32)
    );

    // A shorter set only rebinds the joints it covers, so the foot keeps
    // playing the full body animation
    let partial = Arc::new(PoseTrackSet {
        timing: Timing::default(),
        joints: vec![None, Some(y_channels(9.0f32))],
    });
    instance.bind_pose_animation(&partial, &clock);
    instance.update(&camera, true);
    assert_eq!(
        *instance.joint_matrix("hip").unwrap(),
        translation(0.0f32, 5.0f32, 0.0f32)
    );
    assert_eq!(
        *instance.joint_matrix("knee").unwrap(),
        translation(0.0f32, 14.0f32, 0.0f32)
    );
    assert_eq!(
        *instance.joint_matrix("foot").unwrap(),
        translation(0.0f32, 12.0f32, 0.0f32)
    );
}

/// Tests that animators bound to the same clock stay in step
#[test]
fn shared_clock() {
    init_tests();
    let desc = ModelDesc {
        joints: vec![joint("root", glm::Mat4::identity())],
        hierarchy: vec![node(NodeKind::Joint(0), vec![])],
        root: 0,
        matrix_definitions: vec![MatrixDefinition::Joint(0)],
        ..ModelDesc::default()
    };
    let model = Arc::new(Model::new(desc).unwrap());
    let clock = Arc::new(AnimationClock::new(0.0f32));
    let set = Arc::new(PoseTrackSet {
        timing: Timing {
            duration: 10.0f32,
            rate: 30.0f32,
            loop_mode: LoopMode::Once,
        },
        joints: vec![Some(PoseChannels {
            translation_y: Track {
                interpolation: Interpolation::Linear,
                keys: vec![key(0.0f32, 0.0f32), key(10.0f32, 20.0f32)],
            },
            ..y_channels(0.0f32)
        })],
    });
    let mut first = ModelInstance::new(Arc::clone(&model));
    let mut second = ModelInstance::new(Arc::clone(&model));
    first.bind_pose_animation(&set, &clock);
    second.bind_pose_animation(&set, &clock);

    let camera = Camera::default();
    clock.set_seconds(0.1f32);
    first.update(&camera, true);
    second.update(&camera, true);
    let y = first.joint_matrix("root").unwrap()[(1, 3)];
    info!("y at 3 frames={:?}", y);
    assert!((y - 6.0f32).abs() < EPSILON);
    assert_eq!(
        first.joint_matrix("root").unwrap(),
        second.joint_matrix("root").unwrap()
    );

    // Advancing the clock moves every bound instance without rebinding
    clock.advance(0.1f32);
    first.update(&camera, true);
    let y = first.joint_matrix("root").unwrap()[(1, 3)];
    assert!((y - 12.0f32).abs() < EPSILON);
}

/// Tests shape visibility animation binding and sampling
#[test]
fn visibility_binding() {
    init_tests();
    let desc = ModelDesc {
        joints: vec![joint("root", glm::Mat4::identity())],
        hierarchy: vec![
            node(NodeKind::Joint(0), vec![1]),
            node(NodeKind::Material(0), vec![2, 3]),
            node(NodeKind::Shape(0), vec![]),
            node(NodeKind::Shape(1), vec![]),
        ],
        root: 0,
        matrix_definitions: vec![MatrixDefinition::Joint(0)],
        shapes: vec![shape(&[0]), shape(&[0])],
        materials: vec![material("m")],
        ..ModelDesc::default()
    };
    let model = Arc::new(Model::new(desc).unwrap());
    let mut instance = ModelInstance::new(Arc::clone(&model));
    let camera = Camera::default();
    let clock = Arc::new(AnimationClock::new(0.0f32));

    // A track count mismatch is rejected without binding anything
    let bad = Arc::new(VisibilityTrackSet {
        timing: Timing::default(),
        tracks: vec![vec![false]],
    });
    assert!(matches!(
        instance.bind_visibility_animation(&bad, &clock),
        Err(GaError::ShapeTrackCountMismatch(1, 2))
    ));
    instance.update(&camera, true);
    assert!(instance.submissions()[0].visible);
    assert!(instance.submissions()[1].visible);

    let set = Arc::new(VisibilityTrackSet {
        timing: Timing {
            duration: 2.0f32,
            rate: 30.0f32,
            loop_mode: LoopMode::Repeat,
        },
        tracks: vec![vec![false, true], vec![true, false]],
    });
    instance.bind_visibility_animation(&set, &clock).unwrap();
    instance.update(&camera, true);
    assert!(!instance.submissions()[0].visible);
    assert!(instance.submissions()[1].visible);

    // At frame 1.5 the floor of the frame selects the second entry
    clock.set_seconds(0.05f32);
    instance.update(&camera, true);
    assert!(instance.submissions()[0].visible);
    assert!(!instance.submissions()[1].visible);
}
