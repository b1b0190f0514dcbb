use anyhow::{bail, Result};
use glam::{Mat4, Vec2, Vec3};
use rand::Rng;
use winit::dpi::PhysicalSize;

use crate::camera3d::{Camera3D, OrbitControls};
use crate::config::{BoundsConfig, CameraConfig, ViewportConfig};
use crate::ecs::{AmbientLight, CameraNode, DirectionalLight, GridHelper, SceneGraph, Transform3D};

/// Axis-aligned volume new meshes are placed in. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBounds {
    pub min: Vec3,
    pub max: Vec3,
}

pub const SPAWN_BOUNDS: SpawnBounds =
    SpawnBounds { min: Vec3::new(-30.0, 0.0, -30.0), max: Vec3::new(30.0, 30.0, 30.0) };

impl SpawnBounds {
    /// Rejects any axis whose min exceeds its max.
    pub fn from_config(config: &BoundsConfig) -> Result<Self> {
        let min = Vec3::from_array(config.min);
        let max = Vec3::from_array(config.max);
        if min.cmpgt(max).any() {
            bail!("spawn.bounds min {:?} exceeds max {:?}", config.min, config.max);
        }
        Ok(Self { min, max })
    }

    /// Draws each axis independently and uniformly.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec3 {
        Vec3::new(
            rng.gen_range(self.min.x..=self.max.x),
            rng.gen_range(self.min.y..=self.max.y),
            rng.gen_range(self.min.z..=self.max.z),
        )
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

impl Default for SpawnBounds {
    fn default() -> Self {
        SPAWN_BOUNDS
    }
}

pub fn initial_camera(config: &CameraConfig) -> Camera3D {
    Camera3D::new(
        Vec3::from_array(config.position),
        Vec3::from_array(config.target),
        config.fov_degrees.to_radians(),
        config.near,
        config.far,
    )
}

/// Adds the fixed scene furniture: lights, camera, grid, background.
pub fn populate_scene(graph: &mut SceneGraph, config: &ViewportConfig) {
    graph.set_background(config.background.linear());
    graph.attach(AmbientLight { color: config.ambient.color.linear(), intensity: config.ambient.intensity });
    graph.attach((
        DirectionalLight {
            color: config.directional.color.linear(),
            intensity: config.directional.intensity,
            target: Vec3::ZERO,
        },
        Transform3D::from_translation(Vec3::from_array(config.directional.position)),
    ));
    let camera = initial_camera(&config.camera);
    graph.attach((Transform3D::from_translation(camera.position), CameraNode(camera)));
    graph.attach((
        GridHelper {
            size: config.grid.size,
            divisions: config.grid.divisions.max(1),
            center_color: config.grid.center_color.linear(),
            line_color: config.grid.line_color.linear(),
        },
        Transform3D::default(),
    ));
}

/// Window-sized view onto the scene, steered by orbit controls.
pub struct Viewport {
    pub controls: OrbitControls,
    size: PhysicalSize<u32>,
}

impl Viewport {
    pub fn new(config: &ViewportConfig, size: PhysicalSize<u32>) -> Self {
        let controls = OrbitControls::from_camera(&initial_camera(&config.camera), config.orbit.clone());
        Self { controls, size }
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
    }

    pub fn height(&self) -> f32 {
        self.size.height as f32
    }

    pub fn rotate(&mut self, delta: Vec2) {
        let height = self.height();
        self.controls.rotate(delta, height);
    }

    pub fn pan(&mut self, delta: Vec2) {
        let height = self.height();
        self.controls.pan(delta, height);
    }

    pub fn zoom(&mut self, steps: f32) {
        self.controls.zoom(steps);
    }

    /// Advances the controls and writes the resulting camera into the scene graph.
    pub fn update(&mut self, graph: &mut SceneGraph) {
        self.controls.update();
        graph.set_camera(self.controls.camera());
    }

    pub fn view_projection(&self) -> Mat4 {
        self.controls.camera().view_projection(self.size)
    }
}
