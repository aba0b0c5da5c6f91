//! Per-kind inference over the type-vertex graph
//!
//! This module computes a `Type` for a vertex by looking only at the
//! vertex's kind and the inferred types of its immediate dependencies.
//! Unresolved cases infer `Any`; nothing here raises.

use crate::env::method_registry::{MethodId, MethodKind};
use crate::env::GlobalEnv;
use crate::graph::{ArgKind, VertexId, VertexKind};
use crate::types::Type;

impl GlobalEnv {
    /// Infer the type of a single vertex
    pub fn infer_vertex(&self, id: VertexId) -> Type {
        let mut visiting = Vec::new();
        self.infer_inner(id, &mut visiting)
    }

    fn infer_inner(&self, id: VertexId, visiting: &mut Vec<VertexId>) -> Type {
        // A vertex reachable from itself through dependencies cannot be
        // given a finite type here
        if visiting.contains(&id) {
            return Type::Any;
        }
        visiting.push(id);
        let ty = self.infer_kind(id, visiting);
        visiting.pop();
        ty
    }

    fn infer_kind(&self, id: VertexId, visiting: &mut Vec<VertexId>) -> Type {
        let vertex = self.type_vertex_registry.get(id);
        match &vertex.kind {
            VertexKind::IntegerLit(n) => Type::IntegerLiteral(*n),
            VertexKind::StringLit(s) => Type::StringLiteral(s.clone()),
            VertexKind::SymbolLit(s) => Type::SymbolLiteral(s.clone()),
            VertexKind::True => Type::Bool(true),
            VertexKind::False => Type::Bool(false),
            VertexKind::Nil => Type::Nil,

            VertexKind::Lvar(_) | VertexKind::Ivar(_) => {
                Type::widen_union(self.infer_deps(vertex.dependencies.iter(), visiting))
            }

            VertexKind::LvarRead(_) => match vertex.dependencies.first() {
                Some(&write) => self.infer_inner(write, visiting),
                None => Type::Any,
            },

            VertexKind::IvarRead(_) => {
                if vertex.dependencies.is_empty() {
                    Type::Any
                } else {
                    Type::widen_union(self.infer_deps(vertex.dependencies.iter(), visiting))
                }
            }

            VertexKind::Call {
                method_name,
                has_receiver,
            } => self.infer_call(vertex.dependencies.first(), method_name, *has_receiver, visiting),

            VertexKind::If => {
                Type::union_of(self.infer_deps(vertex.dependencies.iter(), visiting))
            }

            VertexKind::Array => {
                let elem = Type::widen_union(
                    self.infer_deps(vertex.dependencies.iter(), visiting)
                        .into_iter()
                        .map(|t| t.widen())
                        .collect(),
                );
                Type::ArrayOf(Box::new(elem))
            }

            VertexKind::Hash { keys } => {
                // Dependencies interleave key and value vertices; pair each
                // key with its value's widened infer
                let values: Vec<Type> = vertex
                    .dependencies
                    .iter()
                    .skip(1)
                    .step_by(2)
                    .map(|&dep| self.infer_inner(dep, visiting).widen())
                    .collect();
                let entries = keys.iter().cloned().zip(values).collect();
                Type::HashShape(entries)
            }

            VertexKind::ConstRead { path, resolved } => {
                if *resolved {
                    Type::Singleton(path.clone())
                } else {
                    Type::Instance(path.clone())
                }
            }

            VertexKind::StringInterp => Type::String,

            VertexKind::Return => match vertex.dependencies.first() {
                Some(&expr) => self.infer_inner(expr, visiting),
                None => Type::Nil,
            },

            VertexKind::Arg { kind, .. } => match kind {
                ArgKind::Optional | ArgKind::KeywordOptional => {
                    if vertex.dependencies.is_empty() {
                        Type::Any
                    } else {
                        Type::widen_union(self.infer_deps(vertex.dependencies.iter(), visiting))
                    }
                }
                _ => Type::Any,
            },
        }
    }

    fn infer_deps<'a>(
        &self,
        deps: impl Iterator<Item = &'a VertexId>,
        visiting: &mut Vec<VertexId>,
    ) -> Vec<Type> {
        deps.map(|&dep| self.infer_inner(dep, visiting)).collect()
    }

    /// A call infers a type only when the receiver resolves to a known
    /// constant whose method is registered; everything else (binary
    /// operators on arbitrary receivers, receiverless calls) is left to
    /// the solver and infers Any.
    fn infer_call(
        &self,
        receiver: Option<&VertexId>,
        method_name: &str,
        has_receiver: bool,
        visiting: &mut Vec<VertexId>,
    ) -> Type {
        if !has_receiver {
            return Type::Any;
        }
        let Some(&recv) = receiver else {
            return Type::Any;
        };

        let (receiver_name, singleton) = match self.infer_inner(recv, visiting) {
            Type::Singleton(name) => (name, true),
            Type::Instance(name) => (name, false),
            _ => return Type::Any,
        };

        match self
            .method_registry
            .resolve(receiver_name.as_str(), method_name, singleton)
        {
            Some((id, _)) => self.infer_return_inner(id, visiting),
            None => Type::Any,
        }
    }

    /// Inferred type of a method argument: the declared type if present,
    /// else the union of the argument vertex's dependency infers (how an
    /// optional parameter acquires its default's type), else Any.
    pub fn infer_arg_type(&self, method: MethodId, name: &str) -> Type {
        let method = self.method_registry.get(method);
        if let Some(declared) = method.arg_types.get(name) {
            return declared.clone();
        }
        let Some(arg_tv) = method.arg_tv(name) else {
            return Type::Any;
        };
        let deps = &self.type_vertex_registry.get(arg_tv).dependencies;
        if deps.is_empty() {
            return Type::Any;
        }
        let mut visiting = Vec::new();
        Type::widen_union(self.infer_deps(deps.iter(), &mut visiting))
    }

    /// Inferred return type of a method: the declared type if present;
    /// Nil for attr reader/writer methods in isolation (the solver links
    /// them to ivar writes later); else the widened union of the return
    /// vertices' infers; else Any.
    pub fn infer_return_type(&self, method: MethodId) -> Type {
        let mut visiting = Vec::new();
        self.infer_return_inner(method, &mut visiting)
    }

    fn infer_return_inner(&self, method: MethodId, visiting: &mut Vec<VertexId>) -> Type {
        let method = self.method_registry.get(method);
        if let Some(declared) = &method.return_type {
            return declared.clone();
        }
        match method.kind {
            MethodKind::AttrReader | MethodKind::AttrWriter => Type::Nil,
            MethodKind::Def => {
                if method.return_tvs.is_empty() {
                    Type::Any
                } else {
                    Type::widen_union(self.infer_deps(method.return_tvs.iter(), visiting))
                }
            }
        }
    }

    /// Render a method as one signature line, e.g.
    /// `def A.hello: () -> Integer` or `def User#greet: (String name) -> any`
    pub fn method_signature(&self, id: MethodId) -> String {
        let method = self.method_registry.get(id);

        let args: Vec<String> = method
            .arg_tvs
            .iter()
            .map(|(name, vtx)| {
                let ty = self.infer_arg_type(id, name).to_ts();
                match &self.type_vertex_registry.get(*vtx).kind {
                    VertexKind::Arg { kind, .. } => match kind {
                        ArgKind::Optional => format!("?{} {}", ty, name),
                        ArgKind::KeywordRequired => format!("{}: {}", name, ty),
                        ArgKind::KeywordOptional => format!("?{}: {}", name, ty),
                        ArgKind::Rest => format!("*{} {}", ty, name),
                        ArgKind::Block => format!("&{}", name),
                        ArgKind::Required => format!("{} {}", ty, name),
                    },
                    _ => format!("{} {}", ty, name),
                }
            })
            .collect();

        let separator = if method.singleton { "." } else { "#" };
        let owner = if method.receiver_name.is_empty() {
            String::new()
        } else {
            format!("{}{}", method.receiver_name, separator)
        };

        format!(
            "def {}{}: ({}) -> {}",
            owner,
            method.name,
            args.join(", "),
            self.infer_return_type(id).to_ts()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::method_registry::Visibility;
    use crate::types::KeyKind;
    use std::path::Path;

    fn scope() -> String {
        "Object".to_string()
    }

    #[test]
    fn test_literal_kinds_infer_themselves() {
        let mut genv = GlobalEnv::new();
        let one = genv
            .type_vertex_registry
            .add("1", VertexKind::IntegerLit(1), scope());
        let s = genv
            .type_vertex_registry
            .add("\"foo\"", VertexKind::StringLit("foo".to_string()), scope());
        let nil = genv.type_vertex_registry.add("nil", VertexKind::Nil, scope());

        assert_eq!(genv.infer_vertex(one), Type::IntegerLiteral(1));
        assert_eq!(genv.infer_vertex(s).to_ts(), "\"foo\"");
        assert_eq!(genv.infer_vertex(nil), Type::Nil);
    }

    #[test]
    fn test_lvar_widens_integer_literal() {
        let mut genv = GlobalEnv::new();
        let a = genv
            .type_vertex_registry
            .add("a", VertexKind::Lvar("a".to_string()), scope());
        let one = genv
            .type_vertex_registry
            .add("1", VertexKind::IntegerLit(1), scope());
        genv.type_vertex_registry.add_dependency(a, one);

        assert_eq!(genv.infer_vertex(a), Type::Integer);
    }

    #[test]
    fn test_lvar_keeps_sole_symbol_literal() {
        let mut genv = GlobalEnv::new();
        let a = genv
            .type_vertex_registry
            .add("a", VertexKind::Lvar("a".to_string()), scope());
        let sym = genv.type_vertex_registry.add(
            ":hoge",
            VertexKind::SymbolLit("hoge".to_string()),
            scope(),
        );
        genv.type_vertex_registry.add_dependency(a, sym);

        assert_eq!(genv.infer_vertex(a).to_ts(), ":hoge");
    }

    #[test]
    fn test_lvar_read_follows_write() {
        let mut genv = GlobalEnv::new();
        let a = genv
            .type_vertex_registry
            .add("a", VertexKind::Lvar("a".to_string()), scope());
        let one = genv
            .type_vertex_registry
            .add("1", VertexKind::IntegerLit(1), scope());
        genv.type_vertex_registry.add_dependency(a, one);
        let read = genv
            .type_vertex_registry
            .add("a", VertexKind::LvarRead("a".to_string()), scope());
        genv.type_vertex_registry.add_dependency(read, a);

        assert_eq!(genv.infer_vertex(read), Type::Integer);
    }

    #[test]
    fn test_unbound_lvar_read_is_any() {
        let mut genv = GlobalEnv::new();
        let read = genv
            .type_vertex_registry
            .add("a", VertexKind::LvarRead("a".to_string()), scope());
        assert_eq!(genv.infer_vertex(read), Type::Any);
    }

    #[test]
    fn test_if_unions_branches_without_widening() {
        let mut genv = GlobalEnv::new();
        let if_vtx = genv
            .type_vertex_registry
            .add("Prism::IfNode", VertexKind::If, scope());
        let one = genv
            .type_vertex_registry
            .add("1", VertexKind::IntegerLit(1), scope());
        let two = genv
            .type_vertex_registry
            .add("2", VertexKind::IntegerLit(2), scope());
        genv.type_vertex_registry.add_dependency(if_vtx, one);
        genv.type_vertex_registry.add_dependency(if_vtx, two);

        assert_eq!(genv.infer_vertex(if_vtx).to_ts(), "1 | 2");
    }

    #[test]
    fn test_array_of_integer_literals() {
        let mut genv = GlobalEnv::new();
        let one = genv
            .type_vertex_registry
            .add("1", VertexKind::IntegerLit(1), scope());
        let two = genv
            .type_vertex_registry
            .add("2", VertexKind::IntegerLit(2), scope());
        let arr = genv
            .type_vertex_registry
            .add("Prism::ArrayNode", VertexKind::Array, scope());
        genv.type_vertex_registry.add_dependency(arr, one);
        genv.type_vertex_registry.add_dependency(arr, two);

        assert_eq!(genv.infer_vertex(arr).to_ts(), "[Integer]");
    }

    #[test]
    fn test_hash_shape_pairs_keys_with_widened_values() {
        let mut genv = GlobalEnv::new();
        let key1 = genv.type_vertex_registry.add(
            ":foo",
            VertexKind::SymbolLit("foo".to_string()),
            scope(),
        );
        let val1 = genv
            .type_vertex_registry
            .add("1", VertexKind::IntegerLit(1), scope());
        let key2 = genv.type_vertex_registry.add(
            "\"bar\"",
            VertexKind::StringLit("bar".to_string()),
            scope(),
        );
        let val2 = genv
            .type_vertex_registry
            .add("2", VertexKind::IntegerLit(2), scope());
        let hash = genv.type_vertex_registry.add(
            "Prism::HashNode",
            VertexKind::Hash {
                keys: vec![
                    KeyKind::Symbol("foo".to_string()),
                    KeyKind::Str("bar".to_string()),
                ],
            },
            scope(),
        );
        for dep in [key1, val1, key2, val2] {
            genv.type_vertex_registry.add_dependency(hash, dep);
        }

        assert_eq!(
            genv.infer_vertex(hash).to_ts(),
            "{ foo: Integer, \"bar\" => Integer }"
        );
    }

    #[test]
    fn test_const_read_infers_singleton_when_resolved() {
        let mut genv = GlobalEnv::new();
        let resolved = genv.type_vertex_registry.add(
            "A",
            VertexKind::ConstRead {
                path: "A".into(),
                resolved: true,
            },
            scope(),
        );
        let unresolved = genv.type_vertex_registry.add(
            "Missing",
            VertexKind::ConstRead {
                path: "Missing".into(),
                resolved: false,
            },
            scope(),
        );

        assert_eq!(genv.infer_vertex(resolved).to_ts(), "singleton(A)");
        assert_eq!(genv.infer_vertex(unresolved).to_ts(), "Missing");
    }

    #[test]
    fn test_call_resolves_singleton_method_return() {
        let mut genv = GlobalEnv::new();

        let method = genv.method_registry.add(
            "A",
            "hello",
            None,
            Path::new("test.rb"),
            true,
            Visibility::Public,
            MethodKind::Def,
        );
        let one = genv
            .type_vertex_registry
            .add("1", VertexKind::IntegerLit(1), scope());
        genv.method_registry.get_mut(method).return_tvs.push(one);

        let const_read = genv.type_vertex_registry.add(
            "A",
            VertexKind::ConstRead {
                path: "A".into(),
                resolved: true,
            },
            scope(),
        );
        let call = genv.type_vertex_registry.add(
            "hello",
            VertexKind::Call {
                method_name: "hello".to_string(),
                has_receiver: true,
            },
            scope(),
        );
        genv.type_vertex_registry.add_dependency(call, const_read);

        assert_eq!(genv.infer_vertex(call), Type::Integer);
    }

    #[test]
    fn test_call_on_unknown_receiver_is_any() {
        let mut genv = GlobalEnv::new();
        let recv = genv
            .type_vertex_registry
            .add("a", VertexKind::LvarRead("a".to_string()), scope());
        let call = genv.type_vertex_registry.add(
            "+",
            VertexKind::Call {
                method_name: "+".to_string(),
                has_receiver: true,
            },
            scope(),
        );
        genv.type_vertex_registry.add_dependency(call, recv);

        assert_eq!(genv.infer_vertex(call), Type::Any);
    }

    #[test]
    fn test_infer_return_type_of_empty_method_is_any() {
        let mut genv = GlobalEnv::new();
        let method = genv.method_registry.add(
            "",
            "hello",
            None,
            Path::new("test.rb"),
            false,
            Visibility::Public,
            MethodKind::Def,
        );
        assert_eq!(genv.infer_return_type(method), Type::Any);
    }

    #[test]
    fn test_infer_return_type_prefers_declared() {
        let mut genv = GlobalEnv::new();
        let method = genv.method_registry.add(
            "",
            "hello",
            None,
            Path::new("test.rb"),
            false,
            Visibility::Public,
            MethodKind::Def,
        );
        genv.method_registry.get_mut(method).return_type = Some(Type::String);
        assert_eq!(genv.infer_return_type(method), Type::String);
    }

    #[test]
    fn test_infer_arg_type_from_optional_default() {
        let mut genv = GlobalEnv::new();
        let method = genv.method_registry.add(
            "",
            "greet",
            None,
            Path::new("test.rb"),
            false,
            Visibility::Public,
            MethodKind::Def,
        );
        let arg = genv.type_vertex_registry.add(
            "name",
            VertexKind::Arg {
                name: "name".to_string(),
                index: 0,
                kind: ArgKind::Optional,
            },
            scope(),
        );
        let default = genv.type_vertex_registry.add(
            "\"World\"",
            VertexKind::StringLit("World".to_string()),
            scope(),
        );
        genv.type_vertex_registry.add_dependency(arg, default);
        genv.method_registry
            .get_mut(method)
            .arg_tvs
            .push(("name".to_string(), arg));

        assert_eq!(genv.infer_arg_type(method, "name").to_ts(), "\"World\"");
        assert_eq!(genv.infer_arg_type(method, "missing"), Type::Any);
    }

    #[test]
    fn test_method_signature_rendering() {
        let mut genv = GlobalEnv::new();
        let method = genv.method_registry.add(
            "A",
            "hello",
            None,
            Path::new("test.rb"),
            true,
            Visibility::Public,
            MethodKind::Def,
        );
        let one = genv
            .type_vertex_registry
            .add("1", VertexKind::IntegerLit(1), scope());
        genv.method_registry.get_mut(method).return_tvs.push(one);

        assert_eq!(genv.method_signature(method), "def A.hello: () -> Integer");
    }
}
