pub mod aabb;
pub mod anim;
pub mod camera;
pub mod colour;
pub mod ga_error;
pub mod instance;
pub mod model;
pub mod submission;
pub mod types;
pub mod util;
