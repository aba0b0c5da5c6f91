use crate::env::node_registry::NodeKey;
use crate::graph::VertexId;
use crate::types::Type;
use std::collections::HashMap;

/// Method ID (index into the method registry)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MethodId(pub usize);

/// Ruby method visibility
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

/// How a method came to exist
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    /// Ordinary `def`
    Def,
    /// Synthesized by an `attr_reader` / `attr_accessor` call
    AttrReader,
    /// Synthesized by an `attr_writer` / `attr_accessor` call
    AttrWriter,
}

/// A registered method, identified by (receiver qualified name, name,
/// singleton?). The receiver name is `""` for top-level methods.
#[derive(Clone, Debug)]
pub struct Method {
    pub receiver_name: String,
    pub name: String,
    pub singleton: bool,
    pub visibility: Visibility,
    pub kind: MethodKind,
    /// Files in which this method is declared. A method with no paths is
    /// dangling and awaits deletion by the host.
    pub paths: Vec<std::path::PathBuf>,
    pub node: Option<NodeKey>,
    /// Argument vertices in declaration order, keyed by parameter name
    pub arg_tvs: Vec<(String, VertexId)>,
    /// One vertex per explicit `return` plus the body's trailing expression
    pub return_tvs: Vec<VertexId>,
    /// Explicit declared argument types (empty until a signature is loaded)
    pub arg_types: HashMap<String, Type>,
    /// Explicit declared return type (None until a signature is loaded)
    pub return_type: Option<Type>,
}

impl Method {
    pub fn is_dangling(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn arg_tv(&self, name: &str) -> Option<VertexId> {
        self.arg_tvs
            .iter()
            .find(|(arg_name, _)| arg_name == name)
            .map(|(_, vtx)| *vtx)
    }

    fn add_path(&mut self, path: &std::path::Path) {
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_path_buf());
        }
    }

    pub fn remove_path(&mut self, path: &std::path::Path) {
        self.paths.retain(|p| p != path);
    }
}

/// Registry of all methods discovered during a walk
#[derive(Debug, Default)]
pub struct MethodRegistry {
    methods: Vec<Method>,
    index: HashMap<(String, String, bool), MethodId>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self {
            methods: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a method. Re-adding the same (receiver, name, singleton)
    /// key augments the existing method's paths and returns its id.
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        receiver_name: &str,
        name: &str,
        node: Option<NodeKey>,
        path: &std::path::Path,
        singleton: bool,
        visibility: Visibility,
        kind: MethodKind,
    ) -> MethodId {
        let key = (receiver_name.to_string(), name.to_string(), singleton);
        if let Some(&id) = self.index.get(&key) {
            self.methods[id.0].add_path(path);
            return id;
        }

        let id = MethodId(self.methods.len());
        let mut method = Method {
            receiver_name: receiver_name.to_string(),
            name: name.to_string(),
            singleton,
            visibility,
            kind,
            paths: Vec::new(),
            node,
            arg_tvs: Vec::new(),
            return_tvs: Vec::new(),
            arg_types: HashMap::new(),
            return_type: None,
        };
        method.add_path(path);
        self.methods.push(method);
        self.index.insert(key, id);
        id
    }

    /// Find a method with the given visibility
    pub fn find(
        &self,
        receiver_name: &str,
        name: &str,
        visibility: Visibility,
        singleton: bool,
    ) -> Option<&Method> {
        self.resolve(receiver_name, name, singleton)
            .map(|(_, m)| m)
            .filter(|m| m.visibility == visibility)
    }

    /// Find a method regardless of visibility (call inference)
    pub fn resolve(
        &self,
        receiver_name: &str,
        name: &str,
        singleton: bool,
    ) -> Option<(MethodId, &Method)> {
        let key = (receiver_name.to_string(), name.to_string(), singleton);
        self.index.get(&key).map(|&id| (id, &self.methods[id.0]))
    }

    pub fn get(&self, id: MethodId) -> &Method {
        &self.methods[id.0]
    }

    pub fn get_mut(&mut self, id: MethodId) -> &mut Method {
        &mut self.methods[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn clear(&mut self) {
        self.methods.clear();
        self.index.clear();
    }
}
