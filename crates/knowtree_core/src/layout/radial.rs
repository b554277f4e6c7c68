//! Radial tree layout.
//!
//! # Responsibility
//! - Assign every node a 2-D point by recursive angular partition.
//! - Emit one edge per traversed parent -> child relation.
//!
//! # Invariants
//! - Root `i` of `k` owns `[2π·i/k, 2π·(i+1)/k)`.
//! - Children split their parent's window equally, in child order.
//! - No two placed nodes share a rounded grid cell within one session.
//! - Output depends only on tree shape, child order and config.

use crate::layout::grid::OccupancyGrid;
use crate::model::node::{Node, NodeId};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::TAU;

/// Cartesian point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Half-open angular range `[start, end)` in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularWindow {
    pub start: f64,
    pub end: f64,
}

impl AngularWindow {
    /// Full circle.
    pub const FULL: Self = Self {
        start: 0.0,
        end: TAU,
    };

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Slice `index` of `count` equal slices.
    ///
    /// The last slice ends exactly at `self.end`.
    pub fn slice(&self, index: usize, count: usize) -> Self {
        let step = self.width() / count as f64;
        let start = self.start + index as f64 * step;
        let end = if index + 1 == count {
            self.end
        } else {
            self.start + (index + 1) as f64 * step
        };
        Self { start, end }
    }
}

/// Parent -> child edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Tunable layout constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Radius added per depth level.
    pub radius_step: f64,
    /// Center of the diagram.
    pub origin: Point,
    /// Angle advanced per spiral probe, radians.
    pub spiral_angle_step: f64,
    /// Radius advanced per spiral probe.
    pub spiral_radius_step: f64,
    /// Spiral probes before falling back to a linear scan.
    pub max_spiral_steps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            radius_step: 120.0,
            origin: Point::default(),
            spiral_angle_step: 0.5,
            spiral_radius_step: 2.0,
            max_spiral_steps: 10_000,
        }
    }
}

/// Positioned node/edge graph handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub positions: BTreeMap<NodeId, Point>,
    /// Angular window each node was allocated.
    pub windows: BTreeMap<NodeId, AngularWindow>,
    pub edges: Vec<Edge>,
    /// Nodes moved off their computed cell by the spiral pass.
    pub displaced: usize,
}

impl Layout {
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.positions.get(&id).copied()
    }
}

/// Lays out `forest` in a fresh session.
pub fn layout_forest(forest: &[Node], config: &LayoutConfig) -> Layout {
    let mut session = LayoutSession::new(config.clone());
    session.place_forest(forest);
    session.finish()
}

/// One layout invocation: owns occupancy and accumulated output.
///
/// Several forests placed into the same session share occupancy, so they
/// never collide with each other. Separate sessions never interact.
pub struct LayoutSession {
    config: LayoutConfig,
    grid: OccupancyGrid,
    layout: Layout,
}

struct Pending<'a> {
    node: &'a Node,
    depth: usize,
    window: AngularWindow,
}

impl LayoutSession {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            grid: OccupancyGrid::new(),
            layout: Layout::default(),
        }
    }

    /// Places every root of `forest` and all descendants.
    ///
    /// Pre-order with an explicit stack; order matches the recursive
    /// formulation so collision outcomes are identical.
    pub fn place_forest(&mut self, forest: &[Node]) {
        let placed_before = self.layout.positions.len();
        let mut stack: Vec<Pending<'_>> = forest
            .iter()
            .enumerate()
            .rev()
            .map(|(index, node)| Pending {
                node,
                depth: 0,
                window: AngularWindow::FULL.slice(index, forest.len()),
            })
            .collect();

        while let Some(Pending {
            node,
            depth,
            window,
        }) = stack.pop()
        {
            self.place(node, depth, window);

            self.layout
                .edges
                .extend(node.children.iter().map(|child| Edge {
                    from: node.id,
                    to: child.id,
                }));
            let count = node.children.len();
            stack.extend(
                node.children
                    .iter()
                    .enumerate()
                    .rev()
                    .map(|(index, child)| Pending {
                        node: child,
                        depth: depth + 1,
                        window: window.slice(index, count),
                    }),
            );
        }

        debug!(
            "event=layout_forest module=layout status=ok roots={} placed={} displaced={}",
            forest.len(),
            self.layout.positions.len() - placed_before,
            self.layout.displaced
        );
    }

    /// Consumes the session and returns the accumulated layout.
    pub fn finish(self) -> Layout {
        self.layout
    }

    fn place(&mut self, node: &Node, depth: usize, window: AngularWindow) {
        let theta = window.midpoint();
        let radius = depth as f64 * self.config.radius_step;
        let wanted = Point {
            x: self.config.origin.x + radius * theta.cos(),
            y: self.config.origin.y + radius * theta.sin(),
        };
        let claim = self.grid.claim(wanted, &self.config);
        if claim.steps > 0 {
            self.layout.displaced += 1;
        }
        self.layout.positions.insert(node.id, claim.point);
        self.layout.windows.insert(node.id, window);
    }
}
