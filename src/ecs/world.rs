use super::*;
use crate::camera3d::Camera3D;
use crate::events::{EditorEvent, EventBus};
use bevy_ecs::prelude::{Bundle, Entity, Schedule, World};
use glam::{Mat4, Vec3};
use uuid::Uuid;

/// Scene graph stored in a bevy_ecs world: one root node with ordered children.
pub struct SceneGraph {
    pub world: World,
    schedule: Schedule,
    root: Entity,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(EventBus::default());
        world.insert_resource(SceneBackground(Vec3::ZERO));

        let mut schedule = Schedule::default();
        schedule.add_systems(sys_propagate_scene_transforms);

        let root =
            world.spawn((SceneRoot, Transform3D::default(), WorldTransform3D::default(), Children::default())).id();
        Self { world, schedule, root }
    }

    pub fn root(&self) -> Entity {
        self.root
    }

    /// Spawns `bundle` as the newest child of the root.
    pub fn attach<B: Bundle>(&mut self, bundle: B) -> Entity {
        let root_world = self.world.get::<WorldTransform3D>(self.root).map(|w| w.0).unwrap_or(Mat4::IDENTITY);
        let entity = self.world.spawn(bundle).insert(Parent(self.root)).id();
        let local = self.world.get::<Transform3D>(entity).map(Transform3D::matrix).unwrap_or(Mat4::IDENTITY);
        self.world.entity_mut(entity).insert(WorldTransform3D(root_world * local));
        if let Some(mut children) = self.world.get_mut::<Children>(self.root) {
            children.0.push(entity);
        }
        entity
    }

    /// Detaches `entity` from its parent and despawns it with its subtree.
    pub fn despawn_entity(&mut self, entity: Entity) -> bool {
        if entity == self.root {
            return false;
        }
        if let Some(parent) = self.world.get::<Parent>(entity).copied() {
            if let Some(mut siblings) = self.world.get_mut::<Children>(parent.0) {
                siblings.0.retain(|&child| child != entity);
            }
        }
        let child_ids = self.world.get::<Children>(entity).map(|c| c.0.clone()).unwrap_or_default();
        for child in child_ids {
            self.despawn_entity(child);
        }
        self.world.despawn(entity)
    }

    pub fn root_children(&self) -> &[Entity] {
        self.world.get::<Children>(self.root).map(|c| c.0.as_slice()).unwrap_or(&[])
    }

    pub fn update(&mut self) {
        self.schedule.run(&mut self.world);
    }

    fn mesh_nodes(&self) -> impl Iterator<Item = (Entity, Uuid)> + '_ {
        self.root_children()
            .iter()
            .filter_map(move |&entity| self.world.get::<MeshId>(entity).map(|id| (entity, id.0)))
    }

    /// Identifiers of every mesh node, in attach order.
    pub fn mesh_ids(&self) -> Vec<Uuid> {
        self.mesh_nodes().map(|(_, id)| id).collect()
    }

    pub fn collect_mesh_instances(&self) -> Vec<MeshInstance> {
        self.mesh_nodes()
            .filter_map(|(entity, id)| {
                let shape = self.world.get::<ShapeRef>(entity)?.0;
                let model = self.world.get::<WorldTransform3D>(entity)?.0;
                let base_color =
                    self.world.get::<MaterialRef>(entity).map(|m| m.0.base_color).unwrap_or(Vec3::ONE);
                Some(MeshInstance { id, shape, model, base_color })
            })
            .collect()
    }

    /// Sums every ambient light and picks the first directional light.
    pub fn lighting(&self) -> SceneLighting {
        let mut lighting = SceneLighting::default();
        let mut has_directional = false;
        for &entity in self.root_children() {
            if let Some(ambient) = self.world.get::<AmbientLight>(entity) {
                lighting.ambient += ambient.color * ambient.intensity;
            }
            if has_directional {
                continue;
            }
            if let Some(light) = self.world.get::<DirectionalLight>(entity) {
                let position = self.world.get::<Transform3D>(entity).map(|t| t.translation).unwrap_or(Vec3::Y);
                lighting.light_direction = (position - light.target).try_normalize().unwrap_or(Vec3::Y);
                lighting.light_color = light.color * light.intensity;
                has_directional = true;
            }
        }
        lighting
    }

    pub fn grid(&self) -> Option<GridHelper> {
        self.root_children().iter().find_map(|&entity| self.world.get::<GridHelper>(entity).copied())
    }

    fn camera_entity(&self) -> Option<Entity> {
        self.root_children().iter().copied().find(|&entity| self.world.get::<CameraNode>(entity).is_some())
    }

    pub fn camera(&self) -> Option<&Camera3D> {
        let entity = self.camera_entity()?;
        self.world.get::<CameraNode>(entity).map(|node| &node.0)
    }

    pub fn set_camera(&mut self, camera: Camera3D) {
        let Some(entity) = self.camera_entity() else {
            return;
        };
        if let Some(mut transform) = self.world.get_mut::<Transform3D>(entity) {
            transform.translation = camera.position;
        }
        if let Some(mut node) = self.world.get_mut::<CameraNode>(entity) {
            node.0 = camera;
        }
    }

    pub fn background(&self) -> Vec3 {
        self.world.get_resource::<SceneBackground>().map(|bg| bg.0).unwrap_or(Vec3::ZERO)
    }

    pub fn set_background(&mut self, color: Vec3) {
        self.world.insert_resource(SceneBackground(color));
    }

    pub fn push_event(&mut self, event: EditorEvent) {
        self.world.resource_mut::<EventBus>().push(event);
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.world.resource_mut::<EventBus>().drain()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl SceneGraph {
    pub(crate) fn entity_exists(&self, entity: Entity) -> bool {
        self.world.get_entity(entity).is_ok()
    }

    pub(crate) fn mesh_count(&self) -> usize {
        self.mesh_nodes().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeKind;

    fn mesh_bundle(translation: Vec3) -> (MeshId, ShapeRef, Transform3D) {
        (MeshId(Uuid::new_v4()), ShapeRef(ShapeKind::Box), Transform3D::from_translation(translation))
    }

    #[test]
    fn attach_appends_to_root_in_order() {
        let mut graph = SceneGraph::new();
        let a = graph.attach(mesh_bundle(Vec3::X));
        let b = graph.attach(mesh_bundle(Vec3::Y));
        assert_eq!(graph.root_children(), &[a, b]);
        assert_eq!(graph.world.get::<Parent>(a).map(|p| p.0), Some(graph.root()));
        assert_eq!(graph.mesh_count(), 2);
    }

    #[test]
    fn attach_sets_world_transform_immediately() {
        let mut graph = SceneGraph::new();
        let entity = graph.attach(mesh_bundle(Vec3::new(1.0, 2.0, 3.0)));
        let world = graph.world.get::<WorldTransform3D>(entity).expect("world transform").0;
        assert_eq!(world.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
        graph.update();
        let world = graph.world.get::<WorldTransform3D>(entity).expect("world transform").0;
        assert_eq!(world.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn despawn_detaches_from_root() {
        let mut graph = SceneGraph::new();
        let keep = graph.attach(mesh_bundle(Vec3::ZERO));
        let gone = graph.attach(mesh_bundle(Vec3::ONE));
        assert!(graph.despawn_entity(gone));
        assert!(!graph.entity_exists(gone));
        assert_eq!(graph.root_children(), &[keep]);
        assert!(!graph.despawn_entity(gone));
        assert!(!graph.despawn_entity(graph.root()), "root is never despawned");
    }

    #[test]
    fn lighting_combines_scene_lights() {
        let mut graph = SceneGraph::new();
        graph.attach(AmbientLight { color: Vec3::ONE, intensity: 0.5 });
        graph.attach((
            DirectionalLight { color: Vec3::ONE, intensity: 10.0, target: Vec3::ZERO },
            Transform3D::from_translation(Vec3::new(-10.0, 10.0, 0.0)),
        ));
        let lighting = graph.lighting();
        assert_eq!(lighting.ambient, Vec3::splat(0.5));
        assert_eq!(lighting.light_color, Vec3::splat(10.0));
        assert!(lighting.light_direction.x < 0.0 && lighting.light_direction.y > 0.0);
    }
}
