//! Definition Handlers - class/module/method definitions and constants
//!
//! This module is responsible for:
//! - Class and module scope management plus constant registration
//! - Singleton class bodies (class << self)
//! - Method definitions: registration, parameters, return vertices
//! - Constant reads with scope-relative resolution

use crate::env::const_registry::ConstantKind;
use crate::env::method_registry::MethodKind;
use crate::env::{MethodId, NodeKey};
use crate::graph::{ArgKind, VertexId, VertexKind};
use ruby_prism::Node;
use tracing::debug;

use super::install::AstInstaller;

impl AstInstaller<'_> {
    pub(super) fn install_class(&mut self, node: &ruby_prism::ClassNode) -> Option<VertexId> {
        self.install_constant_body(
            &node.constant_path(),
            ConstantKind::Class,
            node.body().as_ref(),
        )
    }

    pub(super) fn install_module(&mut self, node: &ruby_prism::ModuleNode) -> Option<VertexId> {
        self.install_constant_body(
            &node.constant_path(),
            ConstantKind::Module,
            node.body().as_ref(),
        )
    }

    fn install_constant_body(
        &mut self,
        constant_path: &Node,
        kind: ConstantKind,
        body: Option<&Node>,
    ) -> Option<VertexId> {
        let Some((path, _anchored)) = extract_constant_path(constant_path) else {
            debug!(
                offset = constant_path.location().start_offset(),
                "definition with unsupported constant path"
            );
            return None;
        };

        let qualified = self.scopes.qualify(&path);
        let parent = self.scopes.receiver_name();
        let parent = (!parent.is_empty()).then_some(parent);
        self.genv
            .const_registry
            .find_or_add(&qualified, kind, parent.as_deref())
            .add_path(&self.file);

        self.scopes.push_constant(&path);
        if let Some(body) = body {
            self.install_body(body);
        }
        self.scopes.pop_constant();
        None
    }

    /// `class << self`: walk the body with the singleton flag set
    pub(super) fn install_singleton_class(
        &mut self,
        node: &ruby_prism::SingletonClassNode,
    ) -> Option<VertexId> {
        if node.expression().as_self_node().is_none() {
            debug!(
                offset = node.location().start_offset(),
                "singleton class of a non-self expression is not modeled"
            );
            return None;
        }

        self.scopes.enter_singleton();
        if let Some(body) = node.body() {
            self.install_body(&body);
        }
        self.scopes.exit_singleton();
        None
    }

    /// Method definition: register the method, install parameters, walk
    /// the body in a fresh local environment, and record the trailing
    /// expression in return_tvs
    pub(super) fn install_def(&mut self, node: &ruby_prism::DefNode) -> Option<VertexId> {
        let method_name = String::from_utf8_lossy(node.name().as_slice()).to_string();
        let singleton = self.scopes.in_singleton() || node.receiver().is_some();
        let receiver_name = self.scopes.receiver_name();

        let method = self.genv.method_registry.add(
            &receiver_name,
            &method_name,
            Some(NodeKey::from_location(&node.location())),
            &self.file,
            singleton,
            self.scopes.visibility(),
            MethodKind::Def,
        );

        self.scopes.push_method(method);

        if let Some(params) = node.parameters() {
            self.install_parameters(method, &params);
        }

        let tail = match node.body() {
            Some(body) => self.install_body(&body),
            None => None,
        };

        if let Some(tail) = tail {
            let tails = self.expand_branch_tails(tail);
            let method_obj = self.genv.method_registry.get_mut(method);
            for vtx in tails {
                if !method_obj.return_tvs.contains(&vtx) {
                    method_obj.return_tvs.push(vtx);
                }
            }
        }

        self.scopes.pop_method();
        None
    }

    fn install_parameters(&mut self, method: MethodId, params: &ruby_prism::ParametersNode) {
        let mut index = 0;

        for node in params.requireds().iter() {
            if let Some(param) = node.as_required_parameter_node() {
                let name = String::from_utf8_lossy(param.name().as_slice()).to_string();
                self.add_arg(method, name, index, ArgKind::Required);
                index += 1;
            }
        }

        for node in params.optionals().iter() {
            if let Some(param) = node.as_optional_parameter_node() {
                let name = String::from_utf8_lossy(param.name().as_slice()).to_string();
                let arg_vtx = self.add_arg(method, name, index, ArgKind::Optional);
                index += 1;
                // The default expression is how the parameter gets a type
                if let Some(default_vtx) = self.install_node(&param.value()) {
                    self.genv
                        .type_vertex_registry
                        .add_dependency(arg_vtx, default_vtx);
                }
            }
        }

        if let Some(rest_node) = params.rest() {
            if let Some(param) = rest_node.as_rest_parameter_node() {
                if let Some(name_id) = param.name() {
                    let name = String::from_utf8_lossy(name_id.as_slice()).to_string();
                    self.add_arg(method, name, index, ArgKind::Rest);
                    index += 1;
                }
            }
        }

        for node in params.posts().iter() {
            if let Some(param) = node.as_required_parameter_node() {
                let name = String::from_utf8_lossy(param.name().as_slice()).to_string();
                self.add_arg(method, name, index, ArgKind::Required);
                index += 1;
            }
        }

        for node in params.keywords().iter() {
            if let Some(param) = node.as_required_keyword_parameter_node() {
                let name = String::from_utf8_lossy(param.name().as_slice()).to_string();
                self.add_arg(method, name, index, ArgKind::KeywordRequired);
                index += 1;
            } else if let Some(param) = node.as_optional_keyword_parameter_node() {
                let name = String::from_utf8_lossy(param.name().as_slice()).to_string();
                let arg_vtx = self.add_arg(method, name, index, ArgKind::KeywordOptional);
                index += 1;
                if let Some(default_vtx) = self.install_node(&param.value()) {
                    self.genv
                        .type_vertex_registry
                        .add_dependency(arg_vtx, default_vtx);
                }
            }
        }

        if let Some(kwrest_node) = params.keyword_rest() {
            if let Some(param) = kwrest_node.as_keyword_rest_parameter_node() {
                if let Some(name_id) = param.name() {
                    let name = String::from_utf8_lossy(name_id.as_slice()).to_string();
                    self.add_arg(method, name, index, ArgKind::Rest);
                    index += 1;
                }
            }
        }

        if let Some(block_param) = params.block() {
            if let Some(name_id) = block_param.name() {
                let name = String::from_utf8_lossy(name_id.as_slice()).to_string();
                self.add_arg(method, name, index, ArgKind::Block);
            }
        }
    }

    /// Create an argument vertex, attach it to its method, and bind the
    /// parameter name in the method's local environment
    fn add_arg(&mut self, method: MethodId, name: String, index: usize, kind: ArgKind) -> VertexId {
        let arg_vtx = self.new_vertex(
            name.clone(),
            VertexKind::Arg {
                name: name.clone(),
                index,
                kind,
            },
        );
        self.genv
            .type_vertex_registry
            .get_mut(arg_vtx)
            .method_objs
            .push(method);
        self.genv
            .method_registry
            .get_mut(method)
            .arg_tvs
            .push((name.clone(), arg_vtx));
        self.scopes.bind_local(&name, arg_vtx);
        arg_vtx
    }

    /// Constant read (`X`, `::X`, `X::Y`): resolve the path relative to
    /// the current scope path, or absolutely when anchored, and emit one
    /// ConstRead vertex named by the resolved qualified name
    pub(super) fn install_const_read(&mut self, node: &Node) -> Option<VertexId> {
        let (path, anchored) = extract_constant_path(node)?;

        let resolved_name = if anchored {
            path
        } else {
            self.resolve_constant(&path)
        };
        let resolved = self.genv.const_registry.contains(&resolved_name);

        let vtx = self.new_vertex(
            resolved_name.clone(),
            VertexKind::ConstRead {
                path: resolved_name.into(),
                resolved,
            },
        );
        Some(vtx)
    }

    /// Look the path up through the lexical nesting, innermost first,
    /// falling back to the syntactic path when nothing matches
    fn resolve_constant(&self, path: &str) -> String {
        for prefix in self.scopes.nesting() {
            let candidate = format!("{}::{}", prefix, path);
            if self.genv.const_registry.contains(&candidate) {
                return candidate;
            }
        }
        path.to_string()
    }
}

/// Extract a constant path from a ConstantReadNode or ConstantPathNode.
/// Returns the joined path text and whether it was anchored (`::X`).
///
/// Examples:
/// - `User` -> ("User", false)
/// - `Api::User` -> ("Api::User", false)
/// - `::Api::User` -> ("Api::User", true)
pub(super) fn extract_constant_path(node: &Node) -> Option<(String, bool)> {
    if let Some(constant_read) = node.as_constant_read_node() {
        let name = String::from_utf8_lossy(constant_read.name().as_slice()).to_string();
        return Some((name, false));
    }

    if let Some(constant_path) = node.as_constant_path_node() {
        let name = constant_path
            .name()
            .map(|id| String::from_utf8_lossy(id.as_slice()).to_string())?;

        return match constant_path.parent() {
            Some(parent_node) => {
                let (parent_path, anchored) = extract_constant_path(&parent_node)?;
                Some((format!("{}::{}", parent_path, name), anchored))
            }
            // no parent: an absolute reference like `::User`
            None => Some((name, true)),
        };
    }

    None
}
