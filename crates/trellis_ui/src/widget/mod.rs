//! Widget system: nodes, the node tree, and widget capabilities.
//!
//! Nodes carry the declarative side of an element (expressions, focus
//! order, hooks). Widgets are the behavioral side, created per type tag
//! from the global registry.

mod basic;
mod core;
mod node;
mod registry;
mod template;
mod tree;

pub use basic::Basic;
pub use self::core::{AttributeSink, EventReceiver, GeometrySink, GeometrySource, IntrinsicLayout, Widget};
pub use node::{GeometryExprs, Hook, Node, NodeId};
pub use registry::{create_widget, is_registered, register_widget, WidgetFactory, BASIC, TEMPLATE};
pub use template::Template;
pub use tree::NodeTree;
