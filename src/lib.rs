//! Mockforge - the backend of a wireframe DSL compiler
//!
//! This library lowers a parsed wireframe description into a flat IR node
//! graph (composition pass) and computes an absolute box for every node
//! (layout pass). Parsing and rendering live in separate tools; this crate
//! begins at the syntax tree and ends at the position map.
//!
//! # Example
//!
//! ```rust
//! use mockforge::{compile, ScreenDecl, SourceNode, SourceProject};
//!
//! let project = SourceProject::new("demo").with_screen(ScreenDecl::new(
//!     "Home",
//!     SourceNode::layout("stack")
//!         .with_child(SourceNode::component("Heading").with_prop("text", "Dashboard")),
//! ));
//!
//! let compilation = compile(&project).unwrap();
//! assert_eq!(compilation.contract.ir_version, "1.0");
//! assert!(!compilation.positions.is_empty());
//! ```

pub mod ast;
pub mod compose;
pub mod ir;
pub mod layout;
pub mod palette;
pub mod style;

pub use ast::{Definition, ParamDecl, PropValue, ScreenDecl, SourceNode, SourceProject};
pub use compose::{compose, Composer, CompositionError, CompositionWarning};
pub use ir::{validate, ContainerKind, IrContract, Node, NodeRef, Project, Screen};
pub use layout::{calculate, PositionMap, Rect};
pub use palette::Palette;
pub use style::{Density, ResolvedStyle, SpacingToken};

use thiserror::Error;

/// Errors that can occur during the compile pipeline.
///
/// Layout contributes no variant: it never rejects a contract the
/// composition pass produced.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Error during IR generation
    #[error(transparent)]
    Composition(#[from] CompositionError),
}

/// Everything a front end needs after a successful compilation
#[derive(Debug)]
pub struct Compilation {
    /// The versioned IR contract, suitable for persisting or diffing
    pub contract: IrContract,
    /// Absolute box per node id, relative to each screen's origin
    pub positions: PositionMap,
    /// Non-fatal problems collected during composition
    pub warnings: Vec<CompositionWarning>,
}

/// Compile a source project: generate the IR contract, then lay it out.
///
/// Both passes run on fresh state, so the same project always compiles to
/// identical output. All fatal composition problems are reported together;
/// partial output is never returned.
pub fn compile(project: &SourceProject) -> Result<Compilation, CompileError> {
    let (contract, warnings) = compose::compose(project)?;
    let positions = layout::calculate(&contract);
    Ok(Compilation {
        contract,
        positions,
        warnings,
    })
}
