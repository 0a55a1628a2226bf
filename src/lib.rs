pub mod inputs;
pub mod rasterize;
pub mod scene;

pub use nalgebra_glm as glm;
