use super::vertex::{TypeVertex, VertexId, VertexKind};

/// Insertion-ordered arena of all type vertices produced while walking
/// one source file. The arena owns every vertex; the bidirectional
/// dependency/dependent edges are integer handles into it.
#[derive(Debug, Default)]
pub struct TypeVertexRegistry {
    vertices: Vec<TypeVertex>,
}

impl TypeVertexRegistry {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    /// Allocate a fresh vertex with empty edge sets. Ids increase
    /// monotonically in creation order.
    pub fn add(&mut self, name: impl Into<String>, kind: VertexKind, scope: String) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices
            .push(TypeVertex::new(id, name.into(), kind, scope));
        id
    }

    pub fn get(&self, id: VertexId) -> &TypeVertex {
        &self.vertices[id.0]
    }

    pub fn get_mut(&mut self, id: VertexId) -> &mut TypeVertex {
        &mut self.vertices[id.0]
    }

    /// All vertices in insertion order
    pub fn all(&self) -> &[TypeVertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Record that `parent`'s type depends on `child`'s type. Updates
    /// both edge sides and is idempotent on repeated identical edges, so
    /// re-evaluation of the same subtree never produces parallel edges.
    pub fn add_dependency(&mut self, parent: VertexId, child: VertexId) {
        if self.vertices[parent.0].dependencies.contains(&child) {
            return;
        }
        self.vertices[parent.0].dependencies.push(child);
        self.vertices[child.0].dependents.push(parent);
    }
}
