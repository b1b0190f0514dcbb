use bevy_ecs::prelude::Resource;
use std::fmt;
use uuid::Uuid;

use crate::intake::IntakeError;
use crate::shape::ShapeKind;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    MeshSpawned { id: Uuid, shape: ShapeKind, scale: f32 },
    MeshDeleted { id: Uuid, shape: ShapeKind },
    SpawnRejected { reason: IntakeError },
}

impl fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorEvent::MeshSpawned { id, shape, scale } => {
                write!(f, "MeshSpawned id={id} shape={shape} scale={scale:.3}")
            }
            EditorEvent::MeshDeleted { id, shape } => write!(f, "MeshDeleted id={id} shape={shape}"),
            EditorEvent::SpawnRejected { reason } => write!(f, "SpawnRejected {reason}"),
        }
    }
}

#[derive(Default, Resource)]
pub struct EventBus {
    events: Vec<EditorEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
