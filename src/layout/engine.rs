//! Layout computation engine
//!
//! Walks the IR node map from each screen root and computes an absolute
//! `{x, y, width, height}` box for every node. Widths flow top-down from the
//! viewport; heights are estimated top-down and then reconciled bottom-up
//! once children have settled, so stacks and cards auto-size to content.
//!
//! Layout never rejects a structurally valid contract: a dangling reference
//! is skipped rather than raised, since the composition pass validates every
//! reference before handing the contract over.

use std::collections::BTreeMap;

use log::debug;

use crate::ast::PropValue;
use crate::ir::{ContainerKind, ContainerNode, IrContract, Node, NodeRef, Screen};
use crate::style::{resolve_spacing, ResolvedStyle, SpacingToken};

use super::intrinsic::{component_height, component_width, explicit_px};
use super::types::{PositionMap, Rect};

/// Default fixed-panel width for split containers
const SPLIT_PANEL_WIDTH: f64 = 260.0;

/// Default grid column count
const GRID_COLUMNS: usize = 12;

/// Compute absolute boxes for every node in the contract.
///
/// Each screen is laid out independently from its root, positioned relative
/// to that screen's origin. The result has one entry per IR node.
pub fn calculate(contract: &IrContract) -> PositionMap {
    let project = &contract.project;
    let mut engine = Engine::new(&project.nodes, &project.style);
    for screen in &project.screens {
        engine.place_screen(screen);
    }
    engine.finish()
}

/// Horizontal distribution of children within a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowDistribution {
    /// Equal widths filling the row
    Stretch,
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
}

/// Cross-axis placement of shorter siblings within a taller row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrossAlign {
    Start,
    Center,
    End,
}

/// A grid child after packing, before positioning
struct GridCell<'r> {
    child: &'r NodeRef,
    row: usize,
    col: usize,
    span: usize,
    height: f64,
}

/// Per-run layout state: the immutable node map and style, plus the growing
/// position map. Construct fresh per calculation; never shared across runs.
struct Engine<'a> {
    nodes: &'a BTreeMap<String, Node>,
    style: &'a ResolvedStyle,
    positions: PositionMap,
}

impl<'a> Engine<'a> {
    fn new(nodes: &'a BTreeMap<String, Node>, style: &'a ResolvedStyle) -> Self {
        Self {
            nodes,
            style,
            positions: PositionMap::new(),
        }
    }

    fn finish(mut self) -> PositionMap {
        // One entry per IR node, even for nodes no screen reaches
        for id in self.nodes.keys() {
            self.positions.entry(id.clone()).or_insert_with(Rect::zero);
        }
        self.positions
    }

    fn place_screen(&mut self, screen: &Screen) {
        debug!(
            "layout screen {} at {}x{}",
            screen.id, screen.viewport.width, screen.viewport.min_height
        );
        let frame = Rect::new(0.0, 0.0, screen.viewport.width, screen.viewport.min_height);
        self.place_node(&screen.root, frame, None);
    }

    fn place_node(&mut self, node_ref: &NodeRef, frame: Rect, parent: Option<ContainerKind>) {
        let nodes = self.nodes;
        match nodes.get(&node_ref.target) {
            // Dangling reference: degrade to skip
            None => {}
            Some(Node::Component(_)) => {
                self.positions.insert(node_ref.target.clone(), frame);
            }
            Some(Node::Container(container)) => self.place_container(container, frame, parent),
        }
    }

    fn place_container(
        &mut self,
        container: &'a ContainerNode,
        frame: Rect,
        parent: Option<ContainerKind>,
    ) {
        let padding = self.padding(container, parent);
        let gap = self.gap(container);
        self.positions.insert(container.id.clone(), frame);

        let inner = Rect::new(
            frame.x + padding,
            frame.y + padding,
            (frame.width - 2.0 * padding).max(0.0),
            // Vertical stacks ignore this; their children determine height
            (frame.height - 2.0 * padding).max(0.0),
        );

        match container.kind {
            ContainerKind::Stack if is_horizontal(container) => {
                self.place_row(container, inner, gap)
            }
            ContainerKind::Stack | ContainerKind::Card => {
                self.place_column(container, frame, inner, gap, padding)
            }
            ContainerKind::Grid => self.place_grid(container, inner, gap),
            ContainerKind::Split => self.place_split(container, inner, gap),
            ContainerKind::Panel => self.place_panel(container, inner),
        }
    }

    /// Vertical accumulation shared by stacks and cards: place children
    /// top-down at estimated heights, reconcile against the heights they
    /// actually settled on, then auto-size the container to its content.
    fn place_column(
        &mut self,
        container: &'a ContainerNode,
        frame: Rect,
        inner: Rect,
        gap: f64,
        padding: f64,
    ) {
        let kind = container.kind;
        let mut y = inner.y;
        for child in &container.children {
            let estimate = self.measure(&child.target, inner.width, Some(kind));
            self.place_node(
                child,
                Rect::new(inner.x, y, inner.width, estimate),
                Some(kind),
            );
            y += estimate + gap;
        }

        self.reconcile_column(&container.children, inner.y, gap);

        let bottom = container
            .children
            .iter()
            .filter_map(|child| self.positions.get(&child.target))
            .map(Rect::bottom)
            .fold(inner.y, f64::max);
        if let Some(rect) = self.positions.get_mut(&container.id) {
            rect.height = bottom - frame.y + padding;
        }
    }

    /// Re-derive each child's `y` from the already-stored, possibly-revised
    /// heights. A child whose height changed after its own children were
    /// placed moves every later sibling; descendants shift with their parent.
    fn reconcile_column(&mut self, children: &[NodeRef], top: f64, gap: f64) {
        let mut y = top;
        for child in children {
            let Some(rect) = self.positions.get(&child.target).copied() else {
                continue;
            };
            let delta = y - rect.y;
            if delta.abs() > f64::EPSILON {
                self.shift_subtree(&child.target, 0.0, delta);
            }
            y += rect.height + gap;
        }
    }

    /// Shift a node and every descendant by the same offset
    fn shift_subtree(&mut self, id: &str, dx: f64, dy: f64) {
        if let Some(rect) = self.positions.get_mut(id) {
            rect.x += dx;
            rect.y += dy;
        }
        let nodes = self.nodes;
        let Some(node) = nodes.get(id) else { return };
        for child in node.children() {
            self.shift_subtree(&child.target, dx, dy);
        }
    }

    fn place_row(&mut self, container: &'a ContainerNode, inner: Rect, gap: f64) {
        let children = self.existing_children(container);
        if children.is_empty() {
            return;
        }

        let distribution = row_distribution(container);
        let widths = self.row_widths(&children, inner.width, gap, distribution);
        let heights: Vec<f64> = children
            .iter()
            .zip(&widths)
            .map(|(child, width)| self.measure(&child.target, *width, Some(container.kind)))
            .collect();
        let row_height = heights.iter().copied().fold(0.0, f64::max);

        let count = children.len() as f64;
        let content: f64 = widths.iter().sum();
        let (start, spacing) = match distribution {
            RowDistribution::Stretch | RowDistribution::Start => (inner.x, gap),
            RowDistribution::Center => (
                inner.x + (inner.width - content - gap * (count - 1.0)) / 2.0,
                gap,
            ),
            RowDistribution::End => {
                (inner.x + inner.width - content - gap * (count - 1.0), gap)
            }
            // A single child degrades to start
            RowDistribution::SpaceBetween if children.len() > 1 => {
                (inner.x, (inner.width - content) / (count - 1.0))
            }
            RowDistribution::SpaceBetween => (inner.x, gap),
            RowDistribution::SpaceAround => {
                let margin = ((inner.width - content) / (2.0 * count)).max(0.0);
                (inner.x + margin, margin * 2.0)
            }
        };

        let align = cross_align(container);
        let mut x = start;
        for ((child, width), height) in children.iter().zip(&widths).zip(&heights) {
            let offset = match align {
                CrossAlign::Start => 0.0,
                CrossAlign::Center => (row_height - height) / 2.0,
                CrossAlign::End => row_height - height,
            };
            self.place_node(
                child,
                Rect::new(x, inner.y + offset, *width, *height),
                Some(container.kind),
            );
            x += width + spacing;
        }
    }

    fn row_widths(
        &self,
        children: &[&NodeRef],
        available: f64,
        gap: f64,
        distribution: RowDistribution,
    ) -> Vec<f64> {
        let count = children.len() as f64;
        if distribution == RowDistribution::Stretch {
            let share = ((available - gap * (count - 1.0)) / count).max(0.0);
            return vec![share; children.len()];
        }
        children
            .iter()
            .map(|child| self.natural_width(&child.target, available, gap, count))
            .collect()
    }

    /// Natural width for natural-width row placement. Containers carry no
    /// intrinsic width: an explicit `width` parameter wins, otherwise they
    /// take an equal share of the row.
    fn natural_width(&self, id: &str, available: f64, gap: f64, count: f64) -> f64 {
        match self.nodes.get(id) {
            Some(Node::Component(c)) => explicit_px(&c.props, "width")
                .unwrap_or_else(|| component_width(&c.component, &c.props, self.style)),
            Some(Node::Container(c)) => explicit_px(&c.params, "width")
                .unwrap_or(((available - gap * (count - 1.0)) / count).max(0.0)),
            None => 0.0,
        }
    }

    fn place_grid(&mut self, container: &'a ContainerNode, inner: Rect, gap: f64) {
        let (cells, row_heights, col_width) = self.grid_pack(container, inner.width, gap);

        // Cumulative row offsets
        let mut offsets = Vec::with_capacity(row_heights.len());
        let mut y = inner.y;
        for height in &row_heights {
            offsets.push(y);
            y += height + gap;
        }

        for cell in cells {
            let x = inner.x + cell.col as f64 * (col_width + gap);
            let width = cell.span as f64 * col_width + (cell.span as f64 - 1.0) * gap;
            self.place_node(
                cell.child,
                Rect::new(x, offsets[cell.row], width, cell.height),
                Some(ContainerKind::Grid),
            );
        }
    }

    /// Pack grid children left-to-right, wrapping whenever the next cell's
    /// span would exceed the remaining columns, tracking each row's tallest
    /// cell.
    fn grid_pack(
        &self,
        container: &'a ContainerNode,
        inner_width: f64,
        gap: f64,
    ) -> (Vec<GridCell<'a>>, Vec<f64>, f64) {
        let columns = container
            .params
            .get("columns")
            .and_then(PropValue::as_num)
            .filter(|c| *c >= 1.0)
            .map(|c| c as usize)
            .unwrap_or(GRID_COLUMNS);
        let col_width = ((inner_width - gap * (columns as f64 - 1.0)) / columns as f64).max(0.0);

        let mut cells = Vec::with_capacity(container.children.len());
        let mut row_heights: Vec<f64> = vec![];
        let mut row = 0usize;
        let mut col = 0usize;
        for child in &container.children {
            if !self.nodes.contains_key(&child.target) {
                continue;
            }
            let span = self.cell_span(&child.target, columns);
            if col + span > columns {
                row += 1;
                col = 0;
            }
            let width = span as f64 * col_width + (span as f64 - 1.0) * gap;
            let height = self.measure(&child.target, width, Some(ContainerKind::Grid));
            if row_heights.len() <= row {
                row_heights.push(0.0);
            }
            row_heights[row] = row_heights[row].max(height);
            cells.push(GridCell {
                child,
                row,
                col,
                span,
                height,
            });
            col += span;
            if col >= columns {
                row += 1;
                col = 0;
            }
        }

        (cells, row_heights, col_width)
    }

    fn cell_span(&self, id: &str, columns: usize) -> usize {
        let span = match self.nodes.get(id) {
            Some(Node::Container(c)) => c.params.get("span").and_then(PropValue::as_num),
            Some(Node::Component(c)) => c.props.get("span").and_then(PropValue::as_num),
            None => None,
        };
        span.map(|s| s.max(1.0) as usize).unwrap_or(1).min(columns)
    }

    /// A fixed-width side panel plus flexible remaining panels. With exactly
    /// one child, it receives the full width.
    fn place_split(&mut self, container: &'a ContainerNode, inner: Rect, gap: f64) {
        let children = self.existing_children(container);
        match children.len() {
            0 => {}
            1 => self.place_node(children[0], inner, Some(ContainerKind::Split)),
            n => {
                let (panel_width, flex_width) = split_widths(container, inner.width, gap, n);
                let right =
                    container.params.get("side").and_then(PropValue::as_str) == Some("right");
                let (panel_x, mut x) = if right {
                    (inner.x + inner.width - panel_width, inner.x)
                } else {
                    (inner.x, inner.x + panel_width + gap)
                };

                self.place_node(
                    children[0],
                    Rect::new(panel_x, inner.y, panel_width, inner.height),
                    Some(ContainerKind::Split),
                );
                for child in &children[1..] {
                    self.place_node(
                        child,
                        Rect::new(x, inner.y, flex_width, inner.height),
                        Some(ContainerKind::Split),
                    );
                    x += flex_width + gap;
                }
            }
        }
    }

    /// Panels pass their padded rect straight through to their child
    fn place_panel(&mut self, container: &'a ContainerNode, inner: Rect) {
        for child in &container.children {
            self.place_node(child, inner, Some(ContainerKind::Panel));
        }
    }

    fn existing_children(&self, container: &'a ContainerNode) -> Vec<&'a NodeRef> {
        container
            .children
            .iter()
            .filter(|child| self.nodes.contains_key(&child.target))
            .collect()
    }

    // ------------------------------------------------------------------
    // Height measurement
    // ------------------------------------------------------------------

    /// Estimated height of a node at the given width, computed before the
    /// node is placed: explicit pixel height on a component, else the
    /// intrinsic heuristic; containers replay their own layout rules.
    fn measure(&self, id: &str, width: f64, parent: Option<ContainerKind>) -> f64 {
        match self.nodes.get(id) {
            None => 0.0,
            Some(Node::Component(c)) => explicit_px(&c.props, "height")
                .unwrap_or_else(|| component_height(&c.component, &c.props, width, self.style)),
            Some(Node::Container(c)) => self.measure_container(c, width, parent),
        }
    }

    fn measure_container(
        &self,
        container: &'a ContainerNode,
        width: f64,
        parent: Option<ContainerKind>,
    ) -> f64 {
        let padding = self.padding(container, parent);
        let gap = self.gap(container);
        let inner_width = (width - 2.0 * padding).max(0.0);
        let kind = container.kind;

        let content = match kind {
            ContainerKind::Stack if is_horizontal(container) => {
                let children = self.existing_children(container);
                let widths =
                    self.row_widths(&children, inner_width, gap, row_distribution(container));
                children
                    .iter()
                    .zip(&widths)
                    .map(|(child, w)| self.measure(&child.target, *w, Some(kind)))
                    .fold(0.0, f64::max)
            }
            ContainerKind::Stack | ContainerKind::Card => {
                let mut total = 0.0;
                let mut count = 0usize;
                for child in &container.children {
                    if !self.nodes.contains_key(&child.target) {
                        continue;
                    }
                    total += self.measure(&child.target, inner_width, Some(kind));
                    count += 1;
                }
                if count > 1 {
                    total += gap * (count as f64 - 1.0);
                }
                total
            }
            ContainerKind::Grid => {
                let (_, row_heights, _) = self.grid_pack(container, inner_width, gap);
                let rows = row_heights.len();
                let mut total: f64 = row_heights.iter().sum();
                if rows > 1 {
                    total += gap * (rows as f64 - 1.0);
                }
                total
            }
            ContainerKind::Split => {
                let children = self.existing_children(container);
                match children.len() {
                    0 => 0.0,
                    1 => self.measure(&children[0].target, inner_width, Some(kind)),
                    n => {
                        let (panel_width, flex_width) = split_widths(container, inner_width, gap, n);
                        children
                            .iter()
                            .enumerate()
                            .map(|(i, child)| {
                                let w = if i == 0 { panel_width } else { flex_width };
                                self.measure(&child.target, w, Some(kind))
                            })
                            .fold(0.0, f64::max)
                    }
                }
            }
            ContainerKind::Panel => container
                .children
                .first()
                .map(|child| self.measure(&child.target, inner_width, Some(kind)))
                .unwrap_or(0.0),
        };

        content + 2.0 * padding
    }

    // ------------------------------------------------------------------
    // Spacing resolution
    // ------------------------------------------------------------------

    /// Resolved padding for a container. Grid cells keep their declared
    /// parameters verbatim, so their padding lives in `params` rather than
    /// the style record; split panes with no declared padding fall back to
    /// the project spacing token.
    fn padding(&self, container: &ContainerNode, parent: Option<ContainerKind>) -> f64 {
        let density = self.style.density;
        if is_cell(container) {
            let token = container.params.get("padding").and_then(PropValue::as_str);
            return resolve_spacing(token, SpacingToken::None, density, true);
        }
        let declared = container.style.padding.as_str();
        if parent == Some(ContainerKind::Split) && declared == "none" {
            return resolve_spacing(None, self.style.spacing, density, true);
        }
        resolve_spacing(Some(declared), SpacingToken::None, density, true)
    }

    /// Resolved gap, falling back to the project spacing token
    fn gap(&self, container: &ContainerNode) -> f64 {
        let token = if is_cell(container) {
            container.params.get("gap").and_then(PropValue::as_str)
        } else {
            container.style.gap.as_deref()
        };
        resolve_spacing(token, self.style.spacing, self.style.density, true)
    }
}

fn is_horizontal(container: &ContainerNode) -> bool {
    container.params.get("direction").and_then(PropValue::as_str) == Some("horizontal")
}

fn is_cell(container: &ContainerNode) -> bool {
    container.meta.source.as_deref() == Some("cell")
}

fn row_distribution(container: &ContainerNode) -> RowDistribution {
    if let Some(justify) = container.params.get("justify").and_then(PropValue::as_str) {
        return match justify {
            "start" => RowDistribution::Start,
            "end" => RowDistribution::End,
            "center" => RowDistribution::Center,
            "spaceBetween" => RowDistribution::SpaceBetween,
            "spaceAround" => RowDistribution::SpaceAround,
            _ => RowDistribution::Stretch,
        };
    }
    match container.style.align.as_deref() {
        Some("left") => RowDistribution::Start,
        Some("center") => RowDistribution::Center,
        Some("right") => RowDistribution::End,
        _ => RowDistribution::Stretch,
    }
}

fn cross_align(container: &ContainerNode) -> CrossAlign {
    match container.params.get("alignItems").and_then(PropValue::as_str) {
        Some("center") => CrossAlign::Center,
        Some("end") => CrossAlign::End,
        _ => CrossAlign::Start,
    }
}

/// Fixed-panel and flexible-panel widths for a split with `n` children
fn split_widths(container: &ContainerNode, inner_width: f64, gap: f64, n: usize) -> (f64, f64) {
    let panel_width = explicit_px(&container.params, "width")
        .unwrap_or(SPLIT_PANEL_WIDTH)
        .min(inner_width);
    let flex_total = (inner_width - panel_width - gap).max(0.0);
    let flex_count = (n - 1) as f64;
    let flex_width = ((flex_total - gap * (flex_count - 1.0)) / flex_count).max(0.0);
    (panel_width, flex_width)
}
