//! Variable Handlers - local and instance variables
//!
//! This module is responsible for:
//! - Local variable read/write (x, x = value)
//! - Instance variable read/write (@name, @name = value)
//! - Multiple assignment (a, b = 1, 2)

use crate::graph::{VertexId, VertexKind};
use tracing::debug;

use super::install::AstInstaller;

impl AstInstaller<'_> {
    /// Local write: the Lvar vertex is created before the RHS is walked;
    /// the binding is updated only afterwards, so reads inside the RHS
    /// still see the previous write (`a = a + 2`).
    pub(super) fn install_local_write(
        &mut self,
        node: &ruby_prism::LocalVariableWriteNode,
    ) -> Option<VertexId> {
        let name = String::from_utf8_lossy(node.name().as_slice()).to_string();
        let lvar_vtx = self.new_vertex(name.clone(), VertexKind::Lvar(name.clone()));

        if let Some(value_vtx) = self.install_node(&node.value()) {
            self.genv
                .type_vertex_registry
                .add_dependency(lvar_vtx, value_vtx);
        }

        self.scopes.bind_local(&name, lvar_vtx);
        Some(lvar_vtx)
    }

    /// Local read: depends on the most recent write vertex for the name.
    /// An unbound name still yields a read vertex, with no dependencies.
    pub(super) fn install_local_read(
        &mut self,
        node: &ruby_prism::LocalVariableReadNode,
    ) -> Option<VertexId> {
        let name = String::from_utf8_lossy(node.name().as_slice()).to_string();
        let binding = self.scopes.lookup_local(&name);

        let read_vtx = self.new_vertex(name.clone(), VertexKind::LvarRead(name));
        if let Some(write_vtx) = binding {
            self.genv
                .type_vertex_registry
                .add_dependency(read_vtx, write_vtx);
        }
        Some(read_vtx)
    }

    /// Instance variable write: accumulated per (constant scope, name)
    pub(super) fn install_ivar_write(
        &mut self,
        node: &ruby_prism::InstanceVariableWriteNode,
    ) -> Option<VertexId> {
        let name = String::from_utf8_lossy(node.name().as_slice()).to_string();
        let scope_name = self.scopes.self_type_name();
        let ivar_vtx = self.new_vertex(name.clone(), VertexKind::Ivar(name.clone()));

        if let Some(value_vtx) = self.install_node(&node.value()) {
            self.genv
                .type_vertex_registry
                .add_dependency(ivar_vtx, value_vtx);
        }

        self.ivar_writes
            .entry((scope_name, name))
            .or_default()
            .push(ivar_vtx);
        Some(ivar_vtx)
    }

    /// Instance variable read: depends on every write to the same name
    /// seen so far in the enclosing constant
    pub(super) fn install_ivar_read(
        &mut self,
        node: &ruby_prism::InstanceVariableReadNode,
    ) -> Option<VertexId> {
        let name = String::from_utf8_lossy(node.name().as_slice()).to_string();
        let scope_name = self.scopes.self_type_name();

        let writes = self
            .ivar_writes
            .get(&(scope_name, name.clone()))
            .cloned()
            .unwrap_or_default();

        let read_vtx = self.new_vertex(name.clone(), VertexKind::IvarRead(name));
        for write_vtx in writes {
            self.genv
                .type_vertex_registry
                .add_dependency(read_vtx, write_vtx);
        }
        Some(read_vtx)
    }

    /// Multiple assignment: target Lvar vertices first, then the
    /// synthetic RHS Array vertex, then each RHS element. Each target
    /// depends on its positional element when the arities line up; a
    /// single-expression RHS leaves the targets unresolved.
    pub(super) fn install_multi_write(
        &mut self,
        node: &ruby_prism::MultiWriteNode,
    ) -> Option<VertexId> {
        let mut targets: Vec<Option<(String, VertexId)>> = Vec::new();
        for left in node.lefts().iter() {
            if let Some(target) = left.as_local_variable_target_node() {
                let name = String::from_utf8_lossy(target.name().as_slice()).to_string();
                let lvar_vtx = self.new_vertex(name.clone(), VertexKind::Lvar(name.clone()));
                targets.push(Some((name, lvar_vtx)));
            } else {
                debug!(
                    offset = left.location().start_offset(),
                    "unsupported multiple-assignment target"
                );
                targets.push(None);
            }
        }

        let value = node.value();
        if let Some(array_node) = value.as_array_node() {
            let array_vtx = self.new_vertex("Prism::ArrayNode", VertexKind::Array);

            let elements: Vec<VertexId> = array_node
                .elements()
                .iter()
                .filter_map(|element| self.install_node(&element))
                .collect();

            for &element in &elements {
                self.genv
                    .type_vertex_registry
                    .add_dependency(array_vtx, element);
            }
            for (i, target) in targets.iter().enumerate() {
                if let (Some((_, lvar_vtx)), Some(&element)) = (target, elements.get(i)) {
                    self.genv
                        .type_vertex_registry
                        .add_dependency(*lvar_vtx, element);
                }
            }
        } else {
            // destructuring a single RHS needs a sized-array type; left
            // unresolved at this layer
            self.install_node(&value);
        }

        for target in targets.into_iter().flatten() {
            let (name, lvar_vtx) = target;
            self.scopes.bind_local(&name, lvar_vtx);
        }
        None
    }
}
