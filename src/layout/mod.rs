//! Layout engine
//!
//! The second compiler pass: consumes the IR contract and computes an
//! absolute pixel box for every node via container-specific algorithms and
//! per-component intrinsic sizing heuristics.

pub mod engine;
pub mod intrinsic;
pub mod types;

pub use engine::calculate;
pub use types::{PositionMap, Rect};
