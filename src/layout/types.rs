//! Core types for the layout engine

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An absolute box in pixels, relative to the containing screen's origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized rect at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::zero()
    }
}

/// The complete result of layout computation: node id -> absolute box,
/// one entry for every node in the IR node map.
pub type PositionMap = BTreeMap<String, Rect>;
