use std::collections::HashSet;

use glam::Vec3;
use shapeyard::editor::{EditorError, SceneEditor};
use shapeyard::events::EditorEvent;
use shapeyard::intake::{IntakeError, ShapeSelection, SpawnForm};
use shapeyard::shape::ShapeKind;
use shapeyard::viewport::SPAWN_BOUNDS;
use uuid::Uuid;

fn id_sets(editor: &SceneEditor) -> (HashSet<Uuid>, HashSet<Uuid>) {
    let scene: HashSet<Uuid> = editor.mesh_ids().into_iter().collect();
    let list: HashSet<Uuid> = editor.list().ids().collect();
    (scene, list)
}

fn assert_in_sync(editor: &SceneEditor) {
    let (scene, list) = id_sets(editor);
    assert_eq!(scene, list);
    assert_eq!(scene.len(), editor.len());
    assert_eq!(editor.list().len(), editor.len());
}

#[test]
fn every_shape_key_spawns_one_mesh_and_one_entry() {
    let mut editor = SceneEditor::with_seed(7);
    for kind in ShapeKind::ALL {
        let before = editor.len();
        let id = editor.spawn(kind, 1.0).expect("spawn succeeds");
        assert_eq!(editor.len(), before + 1);
        assert_eq!(editor.list().entries()[0].id, id, "{kind} entry is newest");
        assert_eq!(editor.list().entries()[0].label, id.to_string());
        assert_eq!(editor.shape_of(id), Some(kind));
        assert_in_sync(&editor);
    }
    assert_eq!(editor.len(), 14);
}

#[test]
fn keys_parse_to_the_fourteen_kinds() {
    let keys = [
        "box",
        "capsule",
        "circle",
        "cone",
        "cylinder",
        "dodecahedron",
        "icosahedron",
        "lathe",
        "octahedron",
        "ring",
        "sphere",
        "tetrahedron",
        "torus",
        "torus-knot",
    ];
    let parsed: HashSet<ShapeKind> = keys.iter().map(|key| key.parse().expect("known key")).collect();
    assert_eq!(parsed.len(), 14);
    assert!("Box".parse::<ShapeKind>().is_err(), "keys are case-sensitive");
    assert!("pyramid".parse::<ShapeKind>().is_err());
}

#[test]
fn id_sets_stay_equal_through_mixed_sequences() {
    let mut editor = SceneEditor::with_seed(99);
    let mut live: Vec<Uuid> = Vec::new();
    for step in 0..60usize {
        if step % 3 == 2 && !live.is_empty() {
            let id = live.remove((step * 7) % live.len());
            editor.delete(id).expect("live mesh deletes");
        } else {
            let kind = ShapeKind::ALL[step % ShapeKind::ALL.len()];
            live.push(editor.spawn(kind, 0.25 + step as f32 * 0.1).expect("spawn"));
        }
        assert_in_sync(&editor);
    }
    let (scene, _) = id_sets(&editor);
    assert_eq!(scene, live.into_iter().collect::<HashSet<_>>());
}

#[test]
fn list_is_newest_first() {
    let mut editor = SceneEditor::with_seed(5);
    let first = editor.spawn(ShapeKind::Box, 1.0).unwrap();
    let second = editor.spawn(ShapeKind::Torus, 1.0).unwrap();
    let third = editor.spawn(ShapeKind::Ring, 1.0).unwrap();
    let order: Vec<Uuid> = editor.list().ids().collect();
    assert_eq!(order, vec![third, second, first]);
    assert_eq!(editor.mesh_ids(), vec![first, second, third]);
}

#[test]
fn placeholder_submit_flags_only_the_shape_control() {
    let mut editor = SceneEditor::with_seed(1);
    let mut form = SpawnForm::new("2");
    assert_eq!(editor.submit(&mut form), Err(IntakeError::NoShapeSelected));
    assert!(form.shape_invalid());
    assert!(!form.scale_invalid());
    assert!(editor.is_empty());
    assert!(editor.list().is_empty());
}

#[test]
fn empty_scale_flags_only_the_scale_control() {
    let mut editor = SceneEditor::with_seed(1);
    let mut form = SpawnForm::new("   ");
    form.select(ShapeSelection::Shape(ShapeKind::Sphere));
    assert_eq!(editor.submit(&mut form), Err(IntakeError::EmptyScale));
    assert!(form.scale_invalid());
    assert!(!form.shape_invalid());
    assert!(editor.is_empty());
}

#[test]
fn non_numeric_and_non_positive_scales_are_rejected() {
    let mut editor = SceneEditor::with_seed(1);
    for text in ["abc", "0", "-3", "NaN", "inf"] {
        let mut form = SpawnForm::new(text);
        form.select(ShapeSelection::Shape(ShapeKind::Cone));
        let err = editor.submit(&mut form).expect_err(text);
        assert!(
            matches!(err, IntakeError::InvalidScale { .. } | IntakeError::NonPositiveScale { .. }),
            "{text}: {err:?}"
        );
        assert!(form.scale_invalid());
    }
    assert!(editor.is_empty());
}

#[test]
fn spawn_positions_stay_in_bounds() {
    let mut editor = SceneEditor::with_seed(2024);
    for i in 0..500 {
        let id = editor.spawn(ShapeKind::ALL[i % 14], 1.0).unwrap();
        let p = editor.position_of(id).expect("position");
        assert!(SPAWN_BOUNDS.contains(p), "{p:?}");
        assert!(p.y >= 0.0);
        assert!((-30.0..=30.0).contains(&p.x) && (-30.0..=30.0).contains(&p.z));
    }
}

#[test]
fn delete_removes_exactly_one_mesh() {
    let mut editor = SceneEditor::with_seed(3);
    let ids: Vec<Uuid> = ShapeKind::ALL.iter().take(5).map(|&k| editor.spawn(k, 1.5).unwrap()).collect();
    let positions: Vec<Vec3> = ids.iter().map(|&id| editor.position_of(id).unwrap()).collect();

    editor.delete(ids[2]).expect("delete");
    assert_eq!(editor.len(), 4);
    assert!(!editor.contains(ids[2]));
    assert!(!editor.list().contains(ids[2]));
    for (i, &id) in ids.iter().enumerate().filter(|(i, _)| *i != 2) {
        assert_eq!(editor.position_of(id), Some(positions[i]));
        assert_eq!(editor.scale_of(id), Some(Vec3::splat(1.5)));
    }
    assert_in_sync(&editor);
}

#[test]
fn box_with_scale_two_scenario() {
    let mut editor = SceneEditor::with_seed(8);
    let mut form = SpawnForm::default();
    form.select(ShapeSelection::Shape("box".parse().unwrap()));
    form.set_scale_text("2");
    let id = editor.submit(&mut form).expect("box spawns");

    assert_eq!(editor.scale_of(id), Some(Vec3::new(2.0, 2.0, 2.0)));
    assert_eq!(editor.list().len(), 1);
    assert_eq!(editor.list().entries()[0].label, id.to_string());

    editor.delete(id).expect("delete");
    assert!(editor.list().is_empty());
    assert!(!editor.mesh_ids().contains(&id));
    assert!(editor.position_of(id).is_none());
}

#[test]
fn deleting_a_missing_id_changes_nothing() {
    let mut editor = SceneEditor::with_seed(4);
    let kept = editor.spawn(ShapeKind::Icosahedron, 1.0).unwrap();
    editor.drain_events();

    let missing = Uuid::new_v4();
    assert_eq!(editor.delete(missing), Err(EditorError::UnknownMesh(missing)));
    assert_eq!(editor.mesh_ids(), vec![kept]);
    assert!(editor.drain_events().is_empty());

    editor.delete(kept).unwrap();
    assert_eq!(editor.delete(kept), Err(EditorError::UnknownMesh(kept)));
}

#[test]
fn lifecycle_events_describe_each_change() {
    let mut editor = SceneEditor::with_seed(12);
    let id = editor.spawn(ShapeKind::TorusKnot, 1.5).unwrap();
    editor.delete(id).unwrap();
    let events = editor.drain_events();
    assert_eq!(
        events,
        vec![
            EditorEvent::MeshSpawned { id, shape: ShapeKind::TorusKnot, scale: 1.5 },
            EditorEvent::MeshDeleted { id, shape: ShapeKind::TorusKnot },
        ]
    );
    assert!(events[0].to_string().contains("torus-knot"));
}
