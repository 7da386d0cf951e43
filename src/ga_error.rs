use std::{error, fmt};

/// Unified error type
///
/// Everything fallible in the library fails at asset validation time, at
/// animation bind time, or at named lookup time, so these variants cover
/// structural problems with assets and precondition violations by callers.
/// The per frame update path has nothing left to report once those checks
/// have passed.
#[derive(Debug)]
pub enum GaError {
    NoJoints,
    NodeIndexOutOfRange(usize),
    JointIndexOutOfRange(usize),
    MaterialIndexOutOfRange(usize),
    ShapeIndexOutOfRange(usize),
    EnvelopeIndexOutOfRange(usize),
    MatrixIndexOutOfRange(usize),
    MatrixTableTooLong(usize),
    TooManyTextureSlots(usize),
    TooManyIndirectSlots(usize),
    InverseBindCount,
    HierarchyNotATree(usize),
    ShapeWithoutMaterial(usize),
    UnsupportedDisplayTag(u8),
    UnsupportedMappingTag(u8),
    ShapeTrackCountMismatch(usize, usize),
    JointNotFound(String),
    MaterialNotFound(String),
}

impl error::Error for GaError {}

impl fmt::Display for GaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoJoints => {
                write!(f, "a model requires at least one joint")
            }
            Self::NodeIndexOutOfRange(a) => {
                write!(f, "hierarchy node index {a} is out of range")
            }
            Self::JointIndexOutOfRange(a) => {
                write!(f, "joint index {a} is out of range")
            }
            Self::MaterialIndexOutOfRange(a) => {
                write!(f, "material index {a} is out of range")
            }
            Self::ShapeIndexOutOfRange(a) => {
                write!(f, "shape index {a} is out of range")
            }
            Self::EnvelopeIndexOutOfRange(a) => {
                write!(f, "envelope index {a} is out of range")
            }
            Self::MatrixIndexOutOfRange(a) => {
                write!(f, "matrix definition index {a} is out of range")
            }
            Self::MatrixTableTooLong(a) => {
                write!(f, "matrix table with {a} entries exceeds the slots available to a packet")
            }
            Self::TooManyTextureSlots(a) => {
                write!(f, "material with {a} texture slots exceeds the supported count")
            }
            Self::TooManyIndirectSlots(a) => {
                write!(f, "material with {a} indirect matrix slots exceeds the supported count")
            }
            Self::InverseBindCount => {
                write!(f, "inverse bind count does not match joint count")
            }
            Self::HierarchyNotATree(a) => {
                write!(f, "hierarchy node {a} is reachable more than once")
            }
            Self::ShapeWithoutMaterial(a) => {
                write!(f, "shape node {a} appears before any material node")
            }
            Self::UnsupportedDisplayTag(a) => {
                write!(f, "display mode tag {a:#04x} is not supported")
            }
            Self::UnsupportedMappingTag(a) => {
                write!(f, "texture matrix mapping tag {a:#04x} is not supported")
            }
            Self::ShapeTrackCountMismatch(a, b) => {
                write!(f, "visibility track count {a} does not match shape count {b}")
            }
            Self::JointNotFound(a) => write!(f, "no joint named \"{a}\""),
            Self::MaterialNotFound(a) => {
                write!(f, "no material named \"{a}\"")
            }
        }
    }
}
