use crate::env::method_registry::MethodId;
use crate::types::{KeyKind, QualifiedName};

/// Vertex ID (index into the type-vertex arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Kind of a method parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    Required,
    Optional,
    KeywordRequired,
    KeywordOptional,
    Rest,
    Block,
}

/// Closed enumeration of vertex kinds, each carrying its payload.
/// The per-kind inference rules live in the inference module.
#[derive(Clone, Debug, PartialEq)]
pub enum VertexKind {
    IntegerLit(i64),
    StringLit(String),
    SymbolLit(String),
    True,
    False,
    Nil,
    /// Local variable write
    Lvar(String),
    /// Local variable read
    LvarRead(String),
    /// Instance variable write
    Ivar(String),
    /// Instance variable read
    IvarRead(String),
    Call {
        method_name: String,
        has_receiver: bool,
    },
    If,
    Array,
    Hash {
        keys: Vec<KeyKind>,
    },
    ConstRead {
        path: QualifiedName,
        resolved: bool,
    },
    StringInterp,
    Return,
    Arg {
        name: String,
        index: usize,
        kind: ArgKind,
    },
}

/// One node of the dependency graph: an expression or a binding.
///
/// `dependencies` are the inputs whose types determine this vertex's
/// type; `dependents` are the reverse edges. The two are kept
/// symmetric by the registry.
#[derive(Clone, Debug)]
pub struct TypeVertex {
    pub id: VertexId,
    /// Human label: variable name, literal lexeme, method name, or an
    /// AST-kind tag for synthetic nodes (e.g. "Prism::ArrayNode")
    pub name: String,
    pub kind: VertexKind,
    /// Qualified name of the enclosing self-type, "Object" at top level.
    /// Fixed at creation.
    pub scope: String,
    pub dependencies: Vec<VertexId>,
    pub dependents: Vec<VertexId>,
    /// Methods for which this vertex is an argument vertex
    pub method_objs: Vec<MethodId>,
}

impl TypeVertex {
    pub fn new(id: VertexId, name: String, kind: VertexKind, scope: String) -> Self {
        Self {
            id,
            name,
            kind,
            scope,
            dependencies: Vec::new(),
            dependents: Vec::new(),
            method_objs: Vec::new(),
        }
    }
}
