//! Spawn and delete lifecycle for scene meshes.
//!
//! [`SceneEditor`] owns the scene graph, the mesh list and the `id -> entity` index, and keeps the
//! three in step: every spawn and every delete updates all of them in one call, so the set of list
//! identifiers always equals the set of mesh identifiers in the scene.

use bevy_ecs::prelude::Entity;
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{SpawnConfig, ViewportConfig};
use crate::ecs::{MaterialRef, MeshId, SceneGraph, ShapeRef, Transform3D};
use crate::events::EditorEvent;
use crate::intake::{IntakeError, SpawnForm};
use crate::mesh_list::MeshList;
use crate::shape::ShapeKind;
use crate::viewport::{populate_scene, SpawnBounds};

/// Surface parameters shared by every spawned mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedMaterial {
    pub base_color: Vec3,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for SharedMaterial {
    fn default() -> Self {
        Self { base_color: Vec3::ONE, roughness: 1.0, metalness: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("no mesh with id {0}")]
    UnknownMesh(Uuid),
    #[error("scale must be a positive finite number, got {0}")]
    InvalidScale(f32),
}

pub struct SceneEditor {
    graph: SceneGraph,
    list: MeshList,
    index: HashMap<Uuid, Entity>,
    material: Arc<SharedMaterial>,
    rng: StdRng,
    bounds: SpawnBounds,
}

impl SceneEditor {
    pub fn new(viewport: &ViewportConfig, spawn: &SpawnConfig) -> Self {
        let mut graph = SceneGraph::new();
        populate_scene(&mut graph, viewport);
        let rng = match spawn.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let bounds = SpawnBounds::from_config(&spawn.bounds).unwrap_or_else(|err| {
            log::warn!("[editor] {err:#}. Using default spawn bounds.");
            SpawnBounds::default()
        });
        Self {
            graph,
            list: MeshList::default(),
            index: HashMap::new(),
            material: Arc::new(SharedMaterial::default()),
            rng,
            bounds,
        }
    }

    /// Editor over the default scene with a fixed RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let spawn = SpawnConfig { seed: Some(seed), ..SpawnConfig::default() };
        Self::new(&ViewportConfig::default(), &spawn)
    }

    pub fn spawn(&mut self, shape: ShapeKind, scale: f32) -> Result<Uuid, EditorError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(EditorError::InvalidScale(scale));
        }
        Ok(self.spawn_checked(shape, scale))
    }

    fn spawn_checked(&mut self, shape: ShapeKind, scale: f32) -> Uuid {
        let id = Uuid::new_v4();
        let translation = self.bounds.sample(&mut self.rng);
        let transform = Transform3D { translation, rotation: Quat::IDENTITY, scale: Vec3::splat(scale) };
        let entity = self.graph.attach((MeshId(id), ShapeRef(shape), transform, MaterialRef(self.material.clone())));
        self.index.insert(id, entity);
        self.list.prepend(id);
        log::info!("[editor] spawned {shape} {id} at {translation} scale {scale}");
        self.graph.push_event(EditorEvent::MeshSpawned { id, shape, scale });
        id
    }

    /// Validates the form and spawns what it describes. A rejected form spawns nothing.
    pub fn submit(&mut self, form: &mut SpawnForm) -> Result<Uuid, IntakeError> {
        match form.submit() {
            Ok(request) => Ok(self.spawn_checked(request.shape, request.scale)),
            Err(reason) => {
                log::debug!("[editor] spawn rejected: {reason}");
                self.graph.push_event(EditorEvent::SpawnRejected { reason: reason.clone() });
                Err(reason)
            }
        }
    }

    pub fn delete(&mut self, id: Uuid) -> Result<(), EditorError> {
        let Some(&entity) = self.index.get(&id) else {
            log::warn!("[editor] delete requested for unknown mesh {id}");
            return Err(EditorError::UnknownMesh(id));
        };
        let shape = self.graph.world.get::<ShapeRef>(entity).map(|s| s.0);
        self.graph.despawn_entity(entity);
        self.index.remove(&id);
        self.list.remove(id);
        if let Some(shape) = shape {
            log::info!("[editor] deleted {shape} {id}");
            self.graph.push_event(EditorEvent::MeshDeleted { id, shape });
        }
        Ok(())
    }

    /// Deletes every spawned mesh. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let ids: Vec<Uuid> = self.list.ids().collect();
        ids.into_iter().filter(|&id| self.delete(id).is_ok()).count()
    }

    /// Identifiers of the meshes in the scene graph, oldest first.
    pub fn mesh_ids(&self) -> Vec<Uuid> {
        self.graph.mesh_ids()
    }

    pub fn list(&self) -> &MeshList {
        &self.list
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    fn transform_of(&self, id: Uuid) -> Option<&Transform3D> {
        let entity = *self.index.get(&id)?;
        self.graph.world.get::<Transform3D>(entity)
    }

    pub fn position_of(&self, id: Uuid) -> Option<Vec3> {
        self.transform_of(id).map(|t| t.translation)
    }

    pub fn scale_of(&self, id: Uuid) -> Option<Vec3> {
        self.transform_of(id).map(|t| t.scale)
    }

    pub fn shape_of(&self, id: Uuid) -> Option<ShapeKind> {
        let entity = *self.index.get(&id)?;
        self.graph.world.get::<ShapeRef>(entity).map(|s| s.0)
    }

    pub fn material(&self) -> &Arc<SharedMaterial> {
        &self.material
    }

    pub fn bounds(&self) -> SpawnBounds {
        self.bounds
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.graph.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::ShapeSelection;

    #[test]
    fn spawn_rejects_non_positive_scale() {
        let mut editor = SceneEditor::with_seed(1);
        assert_eq!(editor.spawn(ShapeKind::Box, 0.0), Err(EditorError::InvalidScale(0.0)));
        assert!(matches!(editor.spawn(ShapeKind::Box, f32::NAN), Err(EditorError::InvalidScale(_))));
        assert!(editor.is_empty());
        assert!(editor.list().is_empty());
    }

    #[test]
    fn meshes_share_one_material() {
        let mut editor = SceneEditor::with_seed(2);
        let a = editor.spawn(ShapeKind::Sphere, 1.0).unwrap();
        let b = editor.spawn(ShapeKind::Torus, 1.0).unwrap();
        let material_of = |id: Uuid| {
            let entity = editor.index[&id];
            editor.graph.world.get::<MaterialRef>(entity).map(|m| m.0.clone()).expect("material")
        };
        assert!(Arc::ptr_eq(&material_of(a), &material_of(b)));
        assert_eq!(Arc::strong_count(editor.material()), 3);
        assert_eq!(editor.material().base_color, Vec3::ONE);
    }

    #[test]
    fn same_seed_gives_same_positions() {
        let mut first = SceneEditor::with_seed(42);
        let mut second = SceneEditor::with_seed(42);
        for shape in [ShapeKind::Box, ShapeKind::Ring, ShapeKind::Lathe] {
            let a = first.spawn(shape, 1.0).unwrap();
            let b = second.spawn(shape, 1.0).unwrap();
            assert_ne!(a, b, "ids are random even with a seeded placement rng");
            assert_eq!(first.position_of(a), second.position_of(b));
        }
    }

    #[test]
    fn submit_records_events() {
        let mut editor = SceneEditor::with_seed(3);
        let mut form = SpawnForm::default();
        assert_eq!(editor.submit(&mut form), Err(IntakeError::NoShapeSelected));
        form.select(ShapeSelection::Shape(ShapeKind::Cone));
        let id = editor.submit(&mut form).expect("spawned");
        editor.delete(id).expect("deleted");

        let events = editor.drain_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], EditorEvent::SpawnRejected { reason: IntakeError::NoShapeSelected }));
        assert_eq!(events[1], EditorEvent::MeshSpawned { id, shape: ShapeKind::Cone, scale: 1.0 });
        assert_eq!(events[2], EditorEvent::MeshDeleted { id, shape: ShapeKind::Cone });
        assert!(editor.drain_events().is_empty());
    }

    #[test]
    fn inverted_bounds_fall_back_to_defaults() {
        let spawn = SpawnConfig {
            seed: Some(5),
            bounds: crate::config::BoundsConfig { min: [10.0, 0.0, 0.0], max: [-10.0, 1.0, 1.0] },
            ..SpawnConfig::default()
        };
        let mut editor = SceneEditor::new(&ViewportConfig::default(), &spawn);
        assert_eq!(editor.bounds(), SpawnBounds::default());
        let id = editor.spawn(ShapeKind::Box, 1.0).unwrap();
        assert!(editor.bounds().contains(editor.position_of(id).unwrap()));
    }

    #[test]
    fn clear_removes_everything() {
        let mut editor = SceneEditor::with_seed(4);
        for shape in ShapeKind::ALL {
            editor.spawn(shape, 0.5).unwrap();
        }
        assert_eq!(editor.clear(), ShapeKind::ALL.len());
        assert!(editor.is_empty());
        assert!(editor.list().is_empty());
        assert!(editor.mesh_ids().is_empty());
        assert_eq!(editor.graph().root_children().len(), 4, "lights, camera and grid remain");
    }
}
