use bevy_ecs::prelude::*;
use glam::{Mat4, Quat, Vec3};
use std::sync::Arc;
use uuid::Uuid;

use crate::camera3d::Camera3D;
use crate::editor::SharedMaterial;
use crate::shape::ShapeKind;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl Transform3D {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Component, Clone, Copy, Default, Debug)]
pub struct WorldTransform3D(pub Mat4);
#[derive(Component, Clone, Copy)]
pub struct Parent(pub Entity);
#[derive(Component, Default)]
pub struct Children(pub Vec<Entity>);

/// Marks the single node every other scene node hangs from.
#[derive(Component)]
pub struct SceneRoot;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub Uuid);
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeRef(pub ShapeKind);
#[derive(Component, Clone)]
pub struct MaterialRef(pub Arc<SharedMaterial>);

#[derive(Component, Clone, Copy, Debug)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// Parallel light placed at the node's translation, shining at `target`.
#[derive(Component, Clone, Copy, Debug)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub target: Vec3,
}

#[derive(Component, Clone, Debug)]
pub struct CameraNode(pub Camera3D);

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub center_color: Vec3,
    pub line_color: Vec3,
}

#[derive(Resource, Clone, Copy, Debug)]
pub struct SceneBackground(pub Vec3);

/// Render-side snapshot of one mesh node.
#[derive(Clone, Copy, Debug)]
pub struct MeshInstance {
    pub id: Uuid,
    pub shape: ShapeKind,
    pub model: Mat4,
    pub base_color: Vec3,
}

/// Light terms already multiplied by intensity. `light_direction` points towards the light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLighting {
    pub ambient: Vec3,
    pub light_direction: Vec3,
    pub light_color: Vec3,
}

impl Default for SceneLighting {
    fn default() -> Self {
        Self { ambient: Vec3::ZERO, light_direction: Vec3::Y, light_color: Vec3::ZERO }
    }
}
