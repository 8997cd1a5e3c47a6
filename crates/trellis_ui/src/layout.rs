//! Layout pass.
//!
//! Resolves every node's expressions into pixel geometry, parents before
//! children and siblings in declaration order. A node's box is the outer
//! context of its children.
//!
//! References read whatever the target holds at the moment they are
//! evaluated: nodes already visited this pass give fresh values, nodes
//! further down the declaration order give last pass's values (zero on
//! the first pass).

use std::collections::HashMap;

use crate::expr::{Axis, Expr, GeometryLookup, Resolved};
use crate::widget::{NodeId, NodeTree};

/// A rectangle in target coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// X position (left edge).
    pub x: f32,
    /// Y position (top edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns true if the point is inside the rectangle or on any edge.
    #[must_use]
    pub fn contains_inclusive(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// The box a node is laid out inside.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutContext {
    /// Outer left edge.
    pub outer_x: f32,
    /// Outer top edge.
    pub outer_y: f32,
    /// Outer width.
    pub outer_width: f32,
    /// Outer height.
    pub outer_height: f32,
}

impl LayoutContext {
    /// Context for the roots of a `width` x `height` target.
    #[must_use]
    pub const fn target(width: f32, height: f32) -> Self {
        Self {
            outer_x: 0.0,
            outer_y: 0.0,
            outer_width: width,
            outer_height: height,
        }
    }

    const fn from_rect(rect: Rect) -> Self {
        Self {
            outer_x: rect.x,
            outer_y: rect.y,
            outer_width: rect.width,
            outer_height: rect.height,
        }
    }
}

/// First-match id index over a tree, valid for one pass.
///
/// Lookups read the target's geometry live, so the pass sees its own
/// progress.
struct PassLookup<'a> {
    tree: &'a NodeTree,
    index: &'a HashMap<String, NodeId>,
}

impl GeometryLookup for PassLookup<'_> {
    fn lookup(&self, id: &str) -> Option<Rect> {
        let handle = self.index.get(id)?;
        self.tree.get(*handle).map(|node| node.resolved())
    }
}

/// Lookup outside a pass, used when attributes are resolved at generation.
impl GeometryLookup for NodeTree {
    fn lookup(&self, id: &str) -> Option<Rect> {
        let handle = self.find(id)?;
        self.get(handle).map(|node| node.resolved())
    }
}

fn build_index(tree: &NodeTree) -> HashMap<String, NodeId> {
    let mut index = HashMap::with_capacity(tree.len());
    for handle in tree.iter_dfs() {
        if let Some(node) = tree.get(handle) {
            index.entry(node.id.clone()).or_insert(handle);
        }
    }
    index
}

/// Lays out every node of `tree` inside `ctx`.
pub fn layout(tree: &mut NodeTree, ctx: LayoutContext) {
    let index = build_index(tree);
    let roots = tree.roots().to_vec();
    for root in roots {
        layout_node(tree, &index, root, ctx);
    }
}

fn resolve_opt(
    expr: Option<&Expr>,
    outer: f32,
    axis: Axis,
    lookup: &PassLookup<'_>,
) -> Option<Resolved> {
    expr.map(|e| e.resolve(outer, axis, lookup))
}

/// Returns `getter` when it disagrees with what layout last assigned.
fn overridden(getter: Option<f32>, assigned: Option<f32>) -> Option<f32> {
    match (getter, assigned) {
        #[allow(clippy::float_cmp)]
        (Some(current), Some(last)) if current != last => Some(current),
        _ => None,
    }
}

fn layout_node(tree: &mut NodeTree, index: &HashMap<String, NodeId>, handle: NodeId, ctx: LayoutContext) {
    // Size.
    let (width_override, height_override, width, height) = {
        let Some(node) = tree.get(handle) else { return };
        let lookup = PassLookup { tree: &*tree, index };
        let source = node.widget().and_then(|w| w.geometry());

        let width_override = overridden(source.and_then(|g| g.width()), node.assigned.width);
        let height_override = overridden(source.and_then(|g| g.height()), node.assigned.height);

        let width = width_override.unwrap_or_else(|| {
            resolve_opt(node.exprs.width.as_ref(), ctx.outer_width, Axis::Horizontal, &lookup)
                .map_or(ctx.outer_width, |r| r.value)
        });
        let height = height_override.unwrap_or_else(|| {
            resolve_opt(node.exprs.height.as_ref(), ctx.outer_height, Axis::Vertical, &lookup)
                .map_or(ctx.outer_height, |r| r.value)
        });
        (width_override, height_override, width, height)
    };

    {
        let Some(node) = tree.get_mut(handle) else { return };
        let (width, height) = match node.widget.as_mut().and_then(|w| w.intrinsic()) {
            Some(intrinsic) => intrinsic.layout(width, height),
            None => (width, height),
        };

        if let Some(sink) = node.widget.as_mut().and_then(|w| w.geometry_mut()) {
            if width_override.is_none() {
                sink.assign_width(width);
            }
            if height_override.is_none() {
                sink.assign_height(height);
            }
        }
        if width_override.is_none() {
            node.assigned.width = Some(width);
        }
        if height_override.is_none() {
            node.assigned.height = Some(height);
        }
        node.resolved.width = width;
        node.resolved.height = height;
    }

    // Position.
    let (x, y) = {
        let Some(node) = tree.get(handle) else { return };
        let lookup = PassLookup { tree: &*tree, index };
        let own = node.resolved();
        let source = node.widget().and_then(|w| w.geometry());

        let x = match overridden(source.and_then(|g| g.x()), node.assigned.x) {
            Some(x) => Placement::Overridden(x),
            None => Placement::place(
                resolve_opt(node.exprs.x.as_ref(), ctx.outer_width, Axis::Horizontal, &lookup),
                resolve_opt(node.exprs.origin_x.as_ref(), own.width, Axis::Horizontal, &lookup),
                ctx.outer_x,
            ),
        };
        let y = match overridden(source.and_then(|g| g.y()), node.assigned.y) {
            Some(y) => Placement::Overridden(y),
            None => Placement::place(
                resolve_opt(node.exprs.y.as_ref(), ctx.outer_height, Axis::Vertical, &lookup),
                resolve_opt(node.exprs.origin_y.as_ref(), own.height, Axis::Vertical, &lookup),
                ctx.outer_y,
            ),
        };
        (x, y)
    };

    let own = {
        let Some(node) = tree.get_mut(handle) else { return };
        match x {
            Placement::Overridden(x) => node.resolved.x = x,
            Placement::Computed { position, origin } => {
                if let Some(sink) = node.widget.as_mut().and_then(|w| w.geometry_mut()) {
                    sink.assign_origin_x(origin);
                    sink.assign_x(position);
                }
                node.assigned.x = Some(position);
                node.resolved.x = position;
            }
        }
        match y {
            Placement::Overridden(y) => node.resolved.y = y,
            Placement::Computed { position, origin } => {
                if let Some(sink) = node.widget.as_mut().and_then(|w| w.geometry_mut()) {
                    sink.assign_origin_y(origin);
                    sink.assign_y(position);
                }
                node.assigned.y = Some(position);
                node.resolved.y = position;
            }
        }
        node.resolved()
    };

    let children = tree.children(handle).to_vec();
    for child in children {
        layout_node(tree, index, child, LayoutContext::from_rect(own));
    }
}

#[derive(Debug, Clone, Copy)]
enum Placement {
    Overridden(f32),
    Computed { position: f32, origin: f32 },
}

impl Placement {
    /// Relation results already carry their ancestors' offsets, so only
    /// absolute values get the outer position added. The origin offset is
    /// always added.
    fn place(value: Option<Resolved>, origin: Option<Resolved>, outer: f32) -> Self {
        let value = value.unwrap_or_default();
        let origin = origin.map_or(0.0, |o| o.value);
        let base = if value.relative { 0.0 } else { outer };
        Self::Computed {
            position: base + value.value + origin,
            origin,
        }
    }
}
