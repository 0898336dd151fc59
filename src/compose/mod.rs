//! IR generation - the composition engine
//!
//! This pass consumes a parsed syntax tree, expands user-defined component
//! and layout macros, and produces the flat, referenced IR contract consumed
//! by the layout engine.

pub mod engine;
pub mod error;
pub mod ids;
pub mod registry;

pub use engine::{compose, Composer, BUILTIN_COMPONENTS, CHILDREN_SLOT};
pub use error::{CompositionError, CompositionIssue, CompositionWarning};
pub use ids::IdGenerator;
pub use registry::{DefinitionKind, DefinitionRegistry};
