//! Method Call Handlers - call lowering
//!
//! This module is responsible for:
//! - Bare visibility directives (private / public / protected)
//! - Handing macro-like calls to the hook dispatcher
//! - Default lowering: a Call vertex depending on receiver then arguments

use crate::env::method_registry::Visibility;
use crate::graph::{VertexId, VertexKind};

use super::install::AstInstaller;

impl AstInstaller<'_> {
    pub(super) fn install_call(&mut self, node: &ruby_prism::CallNode) -> Option<VertexId> {
        let method_name = String::from_utf8_lossy(node.name().as_slice()).to_string();
        let receiver = node.receiver();

        // Receiverless calls at constant top level may be directives or
        // macro-like forms rather than ordinary calls
        if receiver.is_none() && self.scopes.current_method().is_none() {
            if node.arguments().is_none() {
                if let Some(visibility) = visibility_directive(&method_name) {
                    self.scopes.set_visibility(visibility);
                    return None;
                }
            }

            let receiver_name = self.scopes.receiver_name();
            let const_name = (!receiver_name.is_empty()).then_some(receiver_name.as_str());
            if let Some(hook) = self.hooks.claim(const_name, &method_name) {
                hook.apply(self.genv, &self.scopes, &self.file, node);
                return None;
            }
        }

        let call_vtx = self.new_vertex(
            method_name.clone(),
            VertexKind::Call {
                method_name,
                has_receiver: receiver.is_some(),
            },
        );

        let mut deps = Vec::new();
        if let Some(receiver) = receiver {
            if let Some(recv_vtx) = self.install_node(&receiver) {
                deps.push(recv_vtx);
            }
        }
        if let Some(args) = node.arguments() {
            for arg in args.arguments().iter() {
                if let Some(arg_vtx) = self.install_node(&arg) {
                    deps.push(arg_vtx);
                }
            }
        }

        for dep in deps {
            self.genv.type_vertex_registry.add_dependency(call_vtx, dep);
        }
        Some(call_vtx)
    }
}

fn visibility_directive(name: &str) -> Option<Visibility> {
    match name {
        "public" => Some(Visibility::Public),
        "private" => Some(Visibility::Private),
        "protected" => Some(Visibility::Protected),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_directive() {
        assert_eq!(visibility_directive("private"), Some(Visibility::Private));
        assert_eq!(visibility_directive("public"), Some(Visibility::Public));
        assert_eq!(
            visibility_directive("protected"),
            Some(Visibility::Protected)
        );
        assert_eq!(visibility_directive("attr_reader"), None);
    }
}
