mod material;
mod model;
mod shape;

// Re-exports
pub use model::{update_instances, ModelInstance};
