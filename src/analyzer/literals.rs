//! Literal Handlers - Ruby literal values
//!
//! This module is responsible for:
//! - Integer, string, symbol literals (leaf vertices named by lexeme)
//! - Array and hash literals (element type inference)
//! - String interpolation

use crate::graph::{VertexId, VertexKind};
use crate::types::KeyKind;

use super::install::AstInstaller;

impl AstInstaller<'_> {
    pub(super) fn install_integer(&mut self, node: &ruby_prism::IntegerNode) -> VertexId {
        let lexeme = self.lexeme(&node.location());
        let value = parse_integer_lexeme(&lexeme);
        self.new_vertex(lexeme, VertexKind::IntegerLit(value))
    }

    pub(super) fn install_string(&mut self, node: &ruby_prism::StringNode) -> VertexId {
        let value = String::from_utf8_lossy(node.unescaped()).to_string();
        let lexeme = self.lexeme(&node.location());
        self.new_vertex(lexeme, VertexKind::StringLit(value))
    }

    pub(super) fn install_symbol(&mut self, node: &ruby_prism::SymbolNode) -> VertexId {
        let value = String::from_utf8_lossy(node.unescaped()).to_string();
        let name = format!(":{}", value);
        self.new_vertex(name, VertexKind::SymbolLit(value))
    }

    /// Array literal: elements first, then the Array vertex depending on
    /// them in order
    pub(super) fn install_array(&mut self, node: &ruby_prism::ArrayNode) -> Option<VertexId> {
        let elements: Vec<VertexId> = node
            .elements()
            .iter()
            .filter_map(|element| self.install_node(&element))
            .collect();

        let array_vtx = self.new_vertex("Prism::ArrayNode", VertexKind::Array);
        for element in elements {
            self.genv.type_vertex_registry.add_dependency(array_vtx, element);
        }
        Some(array_vtx)
    }

    /// Hash literal: per entry the key vertex then the value vertex, then
    /// the Hash vertex carrying the key-kind list and depending on the
    /// interleaved key/value vertices
    pub(super) fn install_hash(&mut self, node: &ruby_prism::HashNode) -> Option<VertexId> {
        let mut keys = Vec::new();
        let mut deps = Vec::new();

        for element in node.elements().iter() {
            let Some(assoc) = element.as_assoc_node() else {
                // splat entries contribute no shape
                continue;
            };

            let key_node = assoc.key();
            let entry = if let Some(symbol) = key_node.as_symbol_node() {
                let name = String::from_utf8_lossy(symbol.unescaped()).to_string();
                let key_vtx = self.install_symbol(&symbol);
                Some((KeyKind::Symbol(name), key_vtx))
            } else if let Some(string) = key_node.as_string_node() {
                let name = String::from_utf8_lossy(string.unescaped()).to_string();
                let key_vtx = self.install_string(&string);
                Some((KeyKind::Str(name), key_vtx))
            } else {
                // non-literal key: still part of the graph, not of the shape
                self.install_node(&key_node);
                None
            };

            let value_vtx = self.install_node(&assoc.value());

            if let (Some((key_kind, key_vtx)), Some(value_vtx)) = (entry, value_vtx) {
                keys.push(key_kind);
                deps.push(key_vtx);
                deps.push(value_vtx);
            }
        }

        let hash_vtx = self.new_vertex("Prism::HashNode", VertexKind::Hash { keys });
        for dep in deps {
            self.genv.type_vertex_registry.add_dependency(hash_vtx, dep);
        }
        Some(hash_vtx)
    }

    /// String interpolation: the outer vertex depends on the literal
    /// fragments and embedded expressions in source order
    pub(super) fn install_interpolated_string(
        &mut self,
        node: &ruby_prism::InterpolatedStringNode,
    ) -> Option<VertexId> {
        let interp_vtx = self.new_vertex("Prism::InterpolatedStringNode", VertexKind::StringInterp);

        let mut deps = Vec::new();
        for part in node.parts().iter() {
            if let Some(string_node) = part.as_string_node() {
                deps.push(self.install_string(&string_node));
            } else if let Some(embedded) = part.as_embedded_statements_node() {
                if let Some(statements) = embedded.statements() {
                    if let Some(vtx) = self.install_statements(&statements) {
                        deps.push(vtx);
                    }
                }
            }
        }

        for dep in deps {
            self.genv.type_vertex_registry.add_dependency(interp_vtx, dep);
        }
        Some(interp_vtx)
    }
}

/// Decode an integer lexeme, tolerating digit separators and the common
/// radix prefixes
fn parse_integer_lexeme(lexeme: &str) -> i64 {
    let cleaned: String = lexeme.chars().filter(|&c| c != '_').collect();
    let (radix, digits) = match cleaned.get(..2) {
        Some("0x") | Some("0X") => (16, &cleaned[2..]),
        Some("0b") | Some("0B") => (2, &cleaned[2..]),
        Some("0o") | Some("0O") => (8, &cleaned[2..]),
        _ => (10, cleaned.as_str()),
    };
    i64::from_str_radix(digits, radix).unwrap_or(0)
}
