use std::collections::HashMap;

use anyhow::Result;

use crate::mesh::Mesh;
use crate::renderer::{GpuMesh, Renderer};
use crate::shape::ShapeKind;

/// Geometry cache keyed by shape. Every mesh of a kind draws from the same buffers; nothing is
/// freed per mesh, the cache drops with the renderer at teardown.
#[derive(Default)]
pub struct MeshRegistry {
    entries: HashMap<ShapeKind, MeshEntry>,
}

struct MeshEntry {
    mesh: Mesh,
    gpu: Option<GpuMesh>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, shape: ShapeKind) -> &mut MeshEntry {
        self.entries.entry(shape).or_insert_with(|| MeshEntry { mesh: shape.build_mesh(), gpu: None })
    }

    pub fn mesh(&mut self, shape: ShapeKind) -> &Mesh {
        &self.entry(shape).mesh
    }

    pub fn has(&self, shape: ShapeKind) -> bool {
        self.entries.contains_key(&shape)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ensure_gpu<'a>(&'a mut self, shape: ShapeKind, renderer: &Renderer) -> Result<&'a GpuMesh> {
        let entry = self.entry(shape);
        let gpu = match entry.gpu.take() {
            Some(gpu) => gpu,
            None => renderer.create_gpu_mesh(&entry.mesh)?,
        };
        Ok(entry.gpu.insert(gpu))
    }

    pub fn gpu_mesh(&self, shape: ShapeKind) -> Option<&GpuMesh> {
        self.entries.get(&shape).and_then(|entry| entry.gpu.as_ref())
    }
}
