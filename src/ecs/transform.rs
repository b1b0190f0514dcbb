use super::{Children, Parent, Transform3D, WorldTransform3D};
use bevy_ecs::prelude::*;
use glam::Mat4;

/// Recomputes world matrices top-down from every parentless node.
pub fn sys_propagate_scene_transforms(
    roots: Query<Entity, (With<WorldTransform3D>, Without<Parent>)>,
    locals: Query<(Option<&Transform3D>, Option<&Children>)>,
    mut worlds: Query<&mut WorldTransform3D>,
) {
    let mut stack: Vec<(Entity, Mat4)> = roots.iter().map(|entity| (entity, Mat4::IDENTITY)).collect();
    while let Some((entity, parent_world)) = stack.pop() {
        let Ok((local, children)) = locals.get(entity) else {
            continue;
        };
        let world = parent_world * local.map(Transform3D::matrix).unwrap_or(Mat4::IDENTITY);
        if let Ok(mut target) = worlds.get_mut(entity) {
            target.0 = world;
        }
        if let Some(children) = children {
            stack.extend(children.0.iter().map(|&child| (child, world)));
        }
    }
}
