mod transform;
mod types;
mod world;

pub use transform::sys_propagate_scene_transforms;
pub use types::*;
pub use world::SceneGraph;
