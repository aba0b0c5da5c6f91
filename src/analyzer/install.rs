//! AST walk driver - traversal and graph construction
//!
//! This module is responsible for:
//! - Depth-first traversal of the Prism AST
//! - Dispatching each node kind to its handler
//! - Recording node identity in the node registry

use crate::env::{GlobalEnv, NodeKey, ScopeStack};
use crate::graph::{VertexId, VertexKind};
use ruby_prism::{Node, ParseResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::hooks::HookTable;

/// Build the type-vertex graph from an AST
pub struct AstInstaller<'a> {
    pub(super) genv: &'a mut GlobalEnv,
    pub(super) scopes: ScopeStack,
    pub(super) hooks: HookTable,
    /// Instance-variable writes accumulated per (constant scope, name)
    pub(super) ivar_writes: HashMap<(String, String), Vec<VertexId>>,
    /// Branch tail vertices per If vertex, pre-expanded through nesting
    pub(super) if_tails: HashMap<VertexId, Vec<VertexId>>,
    pub(super) file: PathBuf,
    pub(super) source: &'a str,
}

impl<'a> AstInstaller<'a> {
    pub fn new(genv: &'a mut GlobalEnv, source: &'a str, file: &Path) -> Self {
        Self {
            genv,
            scopes: ScopeStack::new(),
            hooks: HookTable::new(),
            ivar_writes: HashMap::new(),
            if_tails: HashMap::new(),
            file: file.to_path_buf(),
            source,
        }
    }

    /// Walk a whole parsed file
    pub fn install_program(&mut self, parse_result: &ParseResult) {
        let root = parse_result.node();
        if let Some(program) = root.as_program_node() {
            self.install_statements(&program.statements());
        }
        debug!(
            vertices = self.genv.type_vertex_registry.len(),
            methods = self.genv.method_registry.len(),
            constants = self.genv.const_registry.len(),
            "walk complete"
        );
    }

    /// Local-variable bindings left at top level after the walk, in
    /// vertex creation order
    pub fn top_level_locals(&self) -> Vec<(String, VertexId)> {
        self.scopes.top_frame_locals()
    }

    /// Install one node (returns its vertex, if it produces one)
    pub fn install_node(&mut self, node: &Node) -> Option<VertexId> {
        let result = self.dispatch_node(node);
        if let Some(vtx) = result {
            self.genv.node_registry.add(NodeKey::of(node), vtx);
        }
        result
    }

    fn dispatch_node(&mut self, node: &Node) -> Option<VertexId> {
        // Definitions
        if let Some(class_node) = node.as_class_node() {
            return self.install_class(&class_node);
        }
        if let Some(module_node) = node.as_module_node() {
            return self.install_module(&module_node);
        }
        if let Some(sclass_node) = node.as_singleton_class_node() {
            return self.install_singleton_class(&sclass_node);
        }
        if let Some(def_node) = node.as_def_node() {
            return self.install_def(&def_node);
        }

        // Variables
        if let Some(write_node) = node.as_local_variable_write_node() {
            return self.install_local_write(&write_node);
        }
        if let Some(read_node) = node.as_local_variable_read_node() {
            return self.install_local_read(&read_node);
        }
        if let Some(ivar_write) = node.as_instance_variable_write_node() {
            return self.install_ivar_write(&ivar_write);
        }
        if let Some(ivar_read) = node.as_instance_variable_read_node() {
            return self.install_ivar_read(&ivar_read);
        }
        if let Some(multi_write) = node.as_multi_write_node() {
            return self.install_multi_write(&multi_write);
        }

        // Constants
        if node.as_constant_read_node().is_some() || node.as_constant_path_node().is_some() {
            return self.install_const_read(node);
        }

        // Calls and control flow
        if let Some(call_node) = node.as_call_node() {
            return self.install_call(&call_node);
        }
        if let Some(if_node) = node.as_if_node() {
            return self.install_if(&if_node);
        }
        if let Some(return_node) = node.as_return_node() {
            return self.install_return(&return_node);
        }

        // Literals
        if let Some(int_node) = node.as_integer_node() {
            return Some(self.install_integer(&int_node));
        }
        if let Some(string_node) = node.as_string_node() {
            return Some(self.install_string(&string_node));
        }
        if let Some(symbol_node) = node.as_symbol_node() {
            return Some(self.install_symbol(&symbol_node));
        }
        if node.as_true_node().is_some() {
            return Some(self.new_vertex("true", VertexKind::True));
        }
        if node.as_false_node().is_some() {
            return Some(self.new_vertex("false", VertexKind::False));
        }
        if node.as_nil_node().is_some() {
            return Some(self.nil_vertex());
        }
        if let Some(array_node) = node.as_array_node() {
            return self.install_array(&array_node);
        }
        if let Some(hash_node) = node.as_hash_node() {
            return self.install_hash(&hash_node);
        }
        if let Some(interp_node) = node.as_interpolated_string_node() {
            return self.install_interpolated_string(&interp_node);
        }

        // Structural wrappers
        if let Some(statements) = node.as_statements_node() {
            return self.install_statements(&statements);
        }
        if let Some(parens) = node.as_parentheses_node() {
            if let Some(body) = parens.body() {
                return self.install_node(&body);
            }
            return None;
        }

        debug!(
            offset = node.location().start_offset(),
            "skipping unhandled node kind"
        );
        None
    }

    /// Install a statement sequence; the result is the final statement's
    /// vertex (the "last evaluated expression")
    pub(super) fn install_statements(
        &mut self,
        statements: &ruby_prism::StatementsNode,
    ) -> Option<VertexId> {
        let mut last = None;
        for stmt in statements.body().iter() {
            last = self.install_node(&stmt);
        }
        last
    }

    /// A method/class body is either a statement list or (for endless
    /// methods) a bare expression
    pub(super) fn install_body(&mut self, body: &Node) -> Option<VertexId> {
        if let Some(statements) = body.as_statements_node() {
            self.install_statements(&statements)
        } else {
            self.install_node(body)
        }
    }

    /// if/elsif/else expression. The vertex is created before the
    /// condition and branches are walked; its dependencies are the two
    /// branch tail values (the condition participates in the graph on
    /// its own).
    fn install_if(&mut self, node: &ruby_prism::IfNode) -> Option<VertexId> {
        let if_vtx = self.new_vertex("Prism::IfNode", VertexKind::If);

        self.install_node(&node.predicate());

        let then_tail = match node.statements() {
            Some(statements) => self.install_statements(&statements),
            None => None,
        };
        let then_tail = then_tail.unwrap_or_else(|| self.nil_vertex());

        let else_tail = match node.subsequent() {
            Some(subsequent) => {
                if let Some(else_node) = subsequent.as_else_node() {
                    match else_node.statements() {
                        Some(statements) => self.install_statements(&statements),
                        None => None,
                    }
                } else {
                    // elsif chain: the nested If vertex is the tail
                    self.install_node(&subsequent)
                }
            }
            None => None,
        };
        let else_tail = else_tail.unwrap_or_else(|| self.nil_vertex());

        self.genv.type_vertex_registry.add_dependency(if_vtx, then_tail);
        self.genv.type_vertex_registry.add_dependency(if_vtx, else_tail);

        let mut tails = Vec::new();
        for tail in [then_tail, else_tail] {
            match self.if_tails.get(&tail) {
                Some(nested) => tails.extend(nested.iter().copied()),
                None => tails.push(tail),
            }
        }
        self.if_tails.insert(if_vtx, tails);

        Some(if_vtx)
    }

    /// Explicit return: the returned expression's vertex joins the
    /// current method's return_tvs
    fn install_return(&mut self, node: &ruby_prism::ReturnNode) -> Option<VertexId> {
        let expr_vtx = match node.arguments() {
            Some(args) => {
                let installed: Vec<VertexId> = args
                    .arguments()
                    .iter()
                    .filter_map(|arg| self.install_node(&arg))
                    .collect();
                match installed.len() {
                    0 => self.nil_vertex(),
                    1 => installed[0],
                    // `return a, b` returns an array
                    _ => {
                        let arr = self.new_vertex("Prism::ArrayNode", VertexKind::Array);
                        for vtx in installed {
                            self.genv.type_vertex_registry.add_dependency(arr, vtx);
                        }
                        arr
                    }
                }
            }
            None => self.nil_vertex(),
        };

        let ret_vtx = self.new_vertex("Prism::ReturnNode", VertexKind::Return);
        self.genv.type_vertex_registry.add_dependency(ret_vtx, expr_vtx);

        if let Some(method) = self.scopes.current_method() {
            self.genv
                .method_registry
                .get_mut(method)
                .return_tvs
                .push(expr_vtx);
        }

        Some(ret_vtx)
    }

    // Shared helpers

    pub(super) fn new_vertex(&mut self, name: impl Into<String>, kind: VertexKind) -> VertexId {
        let scope = self.scopes.self_type_name();
        self.genv.type_vertex_registry.add(name, kind, scope)
    }

    pub(super) fn nil_vertex(&mut self) -> VertexId {
        self.new_vertex("nil", VertexKind::Nil)
    }

    pub(super) fn lexeme(&self, location: &ruby_prism::Location<'_>) -> String {
        self.source[location.start_offset()..location.end_offset()].to_string()
    }

    /// Tail vertices a body-final expression contributes to return_tvs:
    /// a trailing If contributes its branch tails individually; a
    /// trailing explicit return was already recorded when it was walked.
    pub(super) fn expand_branch_tails(&self, tail: VertexId) -> Vec<VertexId> {
        let vertex = self.genv.type_vertex_registry.get(tail);
        match vertex.kind {
            VertexKind::Return => Vec::new(),
            VertexKind::If => match self.if_tails.get(&tail) {
                Some(tails) => tails
                    .iter()
                    .copied()
                    .filter(|&t| {
                        !matches!(self.genv.type_vertex_registry.get(t).kind, VertexKind::Return)
                    })
                    .collect(),
                None => vec![tail],
            },
            _ => vec![tail],
        }
    }
}
