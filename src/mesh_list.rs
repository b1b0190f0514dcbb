use uuid::Uuid;

/// One row of the mesh list. The label is the identifier text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshListEntry {
    pub id: Uuid,
    pub label: String,
}

impl MeshListEntry {
    pub fn new(id: Uuid) -> Self {
        Self { id, label: id.to_string() }
    }
}

/// Newest-first list of spawned meshes.
#[derive(Debug, Default, Clone)]
pub struct MeshList {
    entries: Vec<MeshListEntry>,
}

impl MeshList {
    pub fn prepend(&mut self, id: Uuid) {
        self.entries.insert(0, MeshListEntry::new(id));
    }

    pub fn remove(&mut self, id: Uuid) -> Option<MeshListEntry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[MeshListEntry] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
