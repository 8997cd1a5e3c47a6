//! Node records stored in the tree arena.

use std::collections::HashMap;
use std::fmt;

use super::Widget;
use crate::event::{Event, EventKind};
use crate::expr::Expr;
use crate::layout::Rect;

/// Stable handle of a node inside a [`super::NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a handle from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Per-event callback attached to a node. Runs before the widget's receiver.
pub type Hook = Box<dyn FnMut(&mut Event)>;

/// Geometry expressions of a node. `None` means the attribute was left blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryExprs {
    /// X position.
    pub x: Option<Expr>,
    /// Y position.
    pub y: Option<Expr>,
    /// Width. Blank inherits the outer width.
    pub width: Option<Expr>,
    /// Height. Blank inherits the outer height.
    pub height: Option<Expr>,
    /// Horizontal origin offset, evaluated against the node's own width.
    pub origin_x: Option<Expr>,
    /// Vertical origin offset, evaluated against the node's own height.
    pub origin_y: Option<Expr>,
}

impl GeometryExprs {
    /// Returns a copy with every reference scoped under `prefix`.
    #[must_use]
    pub fn scoped(&self, prefix: &str, separator: &str) -> Self {
        let scope = |expr: &Option<Expr>| expr.as_ref().map(|e| e.scoped(prefix, separator));
        Self {
            x: scope(&self.x),
            y: scope(&self.y),
            width: scope(&self.width),
            height: scope(&self.height),
            origin_x: scope(&self.origin_x),
            origin_y: scope(&self.origin_y),
        }
    }
}

/// Values the layout pass last handed to the widget, per axis.
///
/// `None` until the first assignment, so a fresh widget is never mistaken
/// for an overridden one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Assigned {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// A single element of the scene.
pub struct Node {
    /// Declared id. Not required to be unique; lookups return the first match.
    pub id: String,
    /// Type tag used to pick a widget factory.
    pub kind: String,
    /// Geometry expressions.
    pub exprs: GeometryExprs,
    /// Focus order. Zero or less means the node cannot take focus.
    pub focus_index: i32,
    /// Hidden nodes and their subtrees are neither painted nor hit.
    pub hidden: bool,
    /// Disabled nodes always fail hit tests.
    pub disabled: bool,
    /// Template name, for template nodes.
    pub source: Option<String>,
    pub(crate) handle: NodeId,
    pub(crate) resolved: Rect,
    pub(crate) assigned: Assigned,
    pub(crate) widget: Option<Box<dyn Widget>>,
    pub(crate) hooks: HashMap<EventKind, Hook>,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    /// Creates a node with no expressions and no widget.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            exprs: GeometryExprs::default(),
            focus_index: 0,
            hidden: false,
            disabled: false,
            source: None,
            handle: NodeId::new(0),
            resolved: Rect::ZERO,
            assigned: Assigned::default(),
            widget: None,
            hooks: HashMap::new(),
            parent: None,
        }
    }

    /// Sets the geometry expressions.
    #[must_use]
    pub fn with_exprs(mut self, exprs: GeometryExprs) -> Self {
        self.exprs = exprs;
        self
    }

    /// Sets the focus index.
    #[must_use]
    pub fn with_focus_index(mut self, focus_index: i32) -> Self {
        self.focus_index = focus_index;
        self
    }

    /// Attaches a widget.
    #[must_use]
    pub fn with_widget(mut self, widget: Box<dyn Widget>) -> Self {
        self.widget = Some(widget);
        self
    }

    /// Handle of this node in its tree.
    #[must_use]
    pub const fn handle(&self) -> NodeId {
        self.handle
    }

    /// Parent handle, `None` for roots.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Geometry computed by the last layout pass, in target coordinates.
    #[must_use]
    pub const fn resolved(&self) -> Rect {
        self.resolved
    }

    /// True when no widget was created for this node's type tag.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.widget.is_none()
    }

    /// The attached widget.
    #[must_use]
    pub fn widget(&self) -> Option<&dyn Widget> {
        self.widget.as_deref()
    }

    /// The attached widget, mutably.
    #[must_use]
    pub fn widget_mut(&mut self) -> Option<&mut (dyn Widget + 'static)> {
        self.widget.as_deref_mut()
    }

    /// Downcasts the attached widget.
    #[must_use]
    pub fn widget_as<W: Widget + 'static>(&self) -> Option<&W> {
        self.widget.as_ref()?.as_any().downcast_ref()
    }

    /// Downcasts the attached widget mutably.
    #[must_use]
    pub fn widget_as_mut<W: Widget + 'static>(&mut self) -> Option<&mut W> {
        self.widget.as_mut()?.as_any_mut().downcast_mut()
    }

    /// Installs a hook for `kind`, replacing any previous one.
    pub fn set_hook(&mut self, kind: EventKind, hook: impl FnMut(&mut Event) + 'static) {
        self.hooks.insert(kind, Box::new(hook));
    }

    /// Removes the hook for `kind`.
    pub fn clear_hook(&mut self, kind: EventKind) {
        self.hooks.remove(&kind);
    }

    /// Hit test against the widget. Ignores ancestor visibility.
    #[must_use]
    pub fn hit(&self, x: f32, y: f32) -> bool {
        match &self.widget {
            Some(widget) => !self.hidden && !self.disabled && !widget.disabled() && widget.hit(x, y),
            None => false,
        }
    }

    /// Top-left corner used for pointer-relative coordinates and painting.
    ///
    /// Prefers the widget's own getters so externally moved widgets stay
    /// consistent with what they report.
    #[must_use]
    pub fn anchor(&self) -> (f32, f32) {
        let source = self.widget.as_ref().and_then(|w| w.geometry());
        let x = source.and_then(|g| g.x()).unwrap_or(self.resolved.x);
        let y = source.and_then(|g| g.y()).unwrap_or(self.resolved.y);
        (x, y)
    }

    /// Delivers `event` to this node: hook first, then the widget receiver.
    ///
    /// With `stop_on_cancel`, a hook that cancels the event keeps it from
    /// reaching the receiver.
    pub(crate) fn deliver(&mut self, event: &mut Event, stop_on_cancel: bool) {
        let (x, y) = self.anchor();
        event.retarget(self.handle, x, y);

        tracing::trace!(node = %self.id, kind = ?event.kind, "deliver");

        if let Some(hook) = self.hooks.get_mut(&event.kind) {
            hook(event);
            if stop_on_cancel && event.canceled() {
                return;
            }
        }

        let Some(receiver) = self.widget.as_mut().and_then(|w| w.receiver()) else {
            return;
        };
        match event.kind {
            EventKind::Move => receiver.on_move(event),
            EventKind::In => receiver.on_in(event),
            EventKind::Out => receiver.on_out(event),
            EventKind::Press => receiver.on_press(event),
            EventKind::Release => receiver.on_release(event),
            EventKind::Pressed => receiver.on_pressed(event),
            EventKind::GlobalMove => receiver.on_global_move(event),
            EventKind::GlobalRelease => receiver.on_global_release(event),
            EventKind::Focus => receiver.on_focus(event),
            EventKind::Unfocus => receiver.on_unfocus(event),
            EventKind::KeyPress => receiver.on_key_press(event),
            EventKind::KeyRelease => receiver.on_key_release(event),
            EventKind::KeyInput => receiver.on_key_input(event),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("handle", &self.handle)
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("resolved", &self.resolved)
            .field("focus_index", &self.focus_index)
            .field("hidden", &self.hidden)
            .field("inert", &self.is_inert())
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}
