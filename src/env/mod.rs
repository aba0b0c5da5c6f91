//! Environment management for the graph-building walk
//!
//! This module provides the registries populated by the visitor and the
//! scope stack that tracks traversal state.

pub mod const_registry;
pub mod global_env;
pub mod method_registry;
pub mod node_registry;
pub mod scope;

pub use const_registry::{ConstRegistry, Constant, ConstantKind};
pub use global_env::GlobalEnv;
pub use method_registry::{Method, MethodId, MethodKind, MethodRegistry, Visibility};
pub use node_registry::{NodeKey, NodeRegistry};
pub use scope::ScopeStack;
