use crate::env::method_registry::{MethodId, Visibility};
use crate::graph::VertexId;
use std::collections::HashMap;

/// Traversal state of the visitor: the current constant path, current
/// method, visibility, singleton flag, and the local-variable
/// environment. Each push is paired with a pop at a single call-site in
/// the matching AST handler.
#[derive(Debug)]
pub struct ScopeStack {
    /// Constant path segments; a segment may itself be qualified
    /// (e.g. "Api::User" from `class Api::User`)
    const_path: Vec<String>,
    method_stack: Vec<MethodId>,
    /// One visibility per constant frame, plus the top-level frame
    visibility_stack: Vec<Visibility>,
    /// One singleton flag per `class << self` body
    singleton_depth: usize,
    /// Local environments; reads see only the innermost frame
    locals: Vec<HashMap<String, VertexId>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            const_path: Vec::new(),
            method_stack: Vec::new(),
            visibility_stack: vec![Visibility::Public],
            singleton_depth: 0,
            locals: vec![HashMap::new()],
        }
    }

    // Constant scope

    pub fn push_constant(&mut self, name: &str) {
        self.const_path.push(name.to_string());
        self.visibility_stack.push(Visibility::Public);
    }

    pub fn pop_constant(&mut self) {
        self.const_path.pop();
        self.visibility_stack.pop();
    }

    /// Self-type name for vertex scopes: "Object" at top level
    pub fn self_type_name(&self) -> String {
        if self.const_path.is_empty() {
            "Object".to_string()
        } else {
            self.const_path.join("::")
        }
    }

    /// Receiver name for method-registry keys: "" at top level
    pub fn receiver_name(&self) -> String {
        self.const_path.join("::")
    }

    /// Qualified name a child constant would get in the current scope
    pub fn qualify(&self, name: &str) -> String {
        if self.const_path.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self.const_path.join("::"), name)
        }
    }

    /// Enclosing constant paths from innermost to outermost, used for
    /// relative constant resolution. For path [A, B] yields "A::B", "A".
    pub fn nesting(&self) -> Vec<String> {
        let mut result = Vec::new();
        for i in (1..=self.const_path.len()).rev() {
            result.push(self.const_path[..i].join("::"));
        }
        result
    }

    // Method scope

    pub fn push_method(&mut self, method: MethodId) {
        self.method_stack.push(method);
        self.push_locals();
    }

    pub fn pop_method(&mut self) {
        self.method_stack.pop();
        self.pop_locals();
    }

    pub fn current_method(&self) -> Option<MethodId> {
        self.method_stack.last().copied()
    }

    // Singleton flag

    pub fn enter_singleton(&mut self) {
        self.singleton_depth += 1;
    }

    pub fn exit_singleton(&mut self) {
        self.singleton_depth = self.singleton_depth.saturating_sub(1);
    }

    pub fn in_singleton(&self) -> bool {
        self.singleton_depth > 0
    }

    // Visibility

    pub fn visibility(&self) -> Visibility {
        *self.visibility_stack.last().unwrap()
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        *self.visibility_stack.last_mut().unwrap() = visibility;
    }

    // Local environment

    pub fn push_locals(&mut self) {
        self.locals.push(HashMap::new());
    }

    pub fn pop_locals(&mut self) {
        self.locals.pop();
    }

    /// Bind a local name to its most recent write vertex. Re-binding
    /// replaces the mapping without touching the prior vertex.
    pub fn bind_local(&mut self, name: &str, vertex: VertexId) {
        self.locals
            .last_mut()
            .unwrap()
            .insert(name.to_string(), vertex);
    }

    pub fn lookup_local(&self, name: &str) -> Option<VertexId> {
        self.locals.last().unwrap().get(name).copied()
    }

    /// Bindings of the outermost local frame in vertex creation order,
    /// for reporting top-level variables after a walk
    pub fn top_frame_locals(&self) -> Vec<(String, VertexId)> {
        let mut bindings: Vec<(String, VertexId)> = self
            .locals
            .first()
            .unwrap()
            .iter()
            .map(|(name, &vertex)| (name.clone(), vertex))
            .collect();
        bindings.sort_by_key(|(_, vertex)| *vertex);
        bindings
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
