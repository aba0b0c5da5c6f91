use crate::graph::VertexId;
use std::collections::HashMap;

/// Identity of an AST node within one parse: the byte span of its
/// location. Stable across repeated visits of the same tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub start: usize,
    pub end: usize,
}

impl NodeKey {
    pub fn of(node: &ruby_prism::Node<'_>) -> Self {
        Self::from_location(&node.location())
    }

    pub fn from_location(location: &ruby_prism::Location<'_>) -> Self {
        Self {
            start: location.start_offset(),
            end: location.end_offset(),
        }
    }
}

/// Maps AST node identity to the primary vertex produced for it,
/// enabling identity-stable re-reference of a node later in the walk.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: HashMap<NodeKey, VertexId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    pub fn add(&mut self, key: NodeKey, vertex: VertexId) {
        self.nodes.insert(key, vertex);
    }

    pub fn find(&self, key: NodeKey) -> Option<VertexId> {
        self.nodes.get(&key).copied()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_find() {
        let mut registry = NodeRegistry::new();
        let key = NodeKey { start: 4, end: 9 };

        registry.add(key, VertexId(7));
        assert_eq!(registry.find(key), Some(VertexId(7)));
        assert_eq!(registry.find(NodeKey { start: 0, end: 1 }), None);
    }

    #[test]
    fn test_clear() {
        let mut registry = NodeRegistry::new();
        registry.add(NodeKey { start: 0, end: 3 }, VertexId(0));
        registry.clear();
        assert_eq!(registry.find(NodeKey { start: 0, end: 3 }), None);
    }
}
