use crate::env::const_registry::ConstRegistry;
use crate::env::method_registry::MethodRegistry;
use crate::env::node_registry::NodeRegistry;
use crate::graph::TypeVertexRegistry;

/// The registries populated while walking one source file. Plain owned
/// state: the driver clears it before each walk, and no two walks may
/// interleave on the same instance.
#[derive(Debug, Default)]
pub struct GlobalEnv {
    pub type_vertex_registry: TypeVertexRegistry,
    pub const_registry: ConstRegistry,
    pub method_registry: MethodRegistry,
    pub node_registry: NodeRegistry,
}

impl GlobalEnv {
    pub fn new() -> Self {
        Self {
            type_vertex_registry: TypeVertexRegistry::new(),
            const_registry: ConstRegistry::new(),
            method_registry: MethodRegistry::new(),
            node_registry: NodeRegistry::new(),
        }
    }

    /// Reclaim everything in bulk between walks
    pub fn clear(&mut self) {
        self.type_vertex_registry.clear();
        self.const_registry.clear();
        self.method_registry.clear();
        self.node_registry.clear();
    }
}
