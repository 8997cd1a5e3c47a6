//! Process-wide widget factory registry.
//!
//! Maps a node's type tag to a constructor. The built-in `basic` and
//! `template` tags are present from first use; hosts register their own
//! widget types at startup, before any source is materialized.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;

use super::{Basic, Template, Widget};

/// Constructor for a widget type.
pub type WidgetFactory = fn() -> Box<dyn Widget>;

/// Type tag of the built-in rectangle widget.
pub const BASIC: &str = "basic";
/// Type tag of the built-in template widget.
pub const TEMPLATE: &str = "template";

static REGISTRY: OnceLock<RwLock<HashMap<String, WidgetFactory>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, WidgetFactory>> {
    REGISTRY.get_or_init(|| {
        let mut factories: HashMap<String, WidgetFactory> = HashMap::new();
        factories.insert(BASIC.to_string(), || Box::new(Basic::default()));
        factories.insert(TEMPLATE.to_string(), || Box::new(Template::default()));
        RwLock::new(factories)
    })
}

/// Registers `factory` under `kind`, replacing any earlier registration.
pub fn register_widget(kind: impl Into<String>, factory: WidgetFactory) {
    let kind = kind.into();
    tracing::debug!(kind = %kind, "registered widget type");
    registry().write().insert(kind, factory);
}

/// Builds a fresh widget for `kind`, or `None` if the tag is unknown.
#[must_use]
pub fn create_widget(kind: &str) -> Option<Box<dyn Widget>> {
    let factory = registry().read().get(kind).copied()?;
    Some(factory())
}

/// Returns true if `kind` has a registered factory.
#[must_use]
pub fn is_registered(kind: &str) -> bool {
    registry().read().contains_key(kind)
}
