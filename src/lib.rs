pub mod app;
pub mod camera3d;
pub mod cli;
pub mod config;
pub mod ecs;
pub mod editor;
pub mod events;
pub mod input;
pub mod intake;
pub mod mesh;
pub mod mesh_list;
pub mod mesh_registry;
pub mod renderer;
pub mod shape;
pub mod time;
pub mod viewport;

pub use app::{run, run_with_overrides, App};

pub(crate) fn wrap_angle(mut radians: f32) -> f32 {
    let two_pi = 2.0 * std::f32::consts::PI;
    while radians > std::f32::consts::PI {
        radians -= two_pi;
    }
    while radians < -std::f32::consts::PI {
        radians += two_pi;
    }
    radians
}
