pub mod registry;
pub mod vertex;

pub use registry::TypeVertexRegistry;
pub use vertex::{ArgKind, TypeVertex, VertexId, VertexKind};
