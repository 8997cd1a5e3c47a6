//! Core widget trait and capability contracts.
//!
//! A widget only has to paint itself and answer hit tests. Everything else
//! is an optional capability, queried through the `Option`-returning
//! accessors on [`Widget`]. Layout and dispatch ask "does this widget
//! implement X" and skip the step when the answer is `None`.

use std::any::Any;

use crate::event::Event;
use crate::layout::Rect;
use crate::render::DrawList;
use crate::style::{Color, HorizontalAlign, ImageStretch, TextWrap, VerticalAlign};

/// Base trait for all widgets.
pub trait Widget {
    /// Paints the widget with its top-left corner at `bounds.x, bounds.y`.
    fn paint(&self, bounds: Rect, out: &mut DrawList);

    /// Returns true if `(x, y)` falls on the widget.
    fn hit(&self, x: f32, y: f32) -> bool;

    /// Disabled widgets never pass hit tests.
    fn disabled(&self) -> bool {
        false
    }

    /// Geometry getters, used to detect external overrides.
    fn geometry(&self) -> Option<&dyn GeometrySource> {
        None
    }

    /// Geometry setters, fed by the layout pass.
    fn geometry_mut(&mut self) -> Option<&mut dyn GeometrySink> {
        None
    }

    /// Intrinsic sizing.
    fn intrinsic(&mut self) -> Option<&mut dyn IntrinsicLayout> {
        None
    }

    /// Per-event receivers.
    fn receiver(&mut self) -> Option<&mut dyn EventReceiver> {
        None
    }

    /// Declarative attribute setters.
    fn attributes(&mut self) -> Option<&mut dyn AttributeSink> {
        None
    }

    /// Template widgets splice a named node list in as their children.
    fn is_template(&self) -> bool {
        false
    }

    /// Called once after the owning node is materialized.
    fn generated(&mut self) {}

    /// Upcast for host-side downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for host-side downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Reports the widget's own idea of its geometry.
///
/// Each getter is optional. A value that differs from what the layout pass
/// last assigned marks that axis as externally overridden.
pub trait GeometrySource {
    /// Current X position.
    fn x(&self) -> Option<f32> {
        None
    }
    /// Current Y position.
    fn y(&self) -> Option<f32> {
        None
    }
    /// Current width.
    fn width(&self) -> Option<f32> {
        None
    }
    /// Current height.
    fn height(&self) -> Option<f32> {
        None
    }
}

/// Receives geometry computed by the layout pass.
pub trait GeometrySink {
    /// Assigns the X position.
    fn assign_x(&mut self, _x: f32) {}
    /// Assigns the Y position.
    fn assign_y(&mut self, _y: f32) {}
    /// Assigns the width.
    fn assign_width(&mut self, _width: f32) {}
    /// Assigns the height.
    fn assign_height(&mut self, _height: f32) {}
    /// Assigns the resolved horizontal origin offset.
    fn assign_origin_x(&mut self, _origin: f32) {}
    /// Assigns the resolved vertical origin offset.
    fn assign_origin_y(&mut self, _origin: f32) {}
}

/// Lets a widget adjust its size after expressions are resolved.
pub trait IntrinsicLayout {
    /// Returns the final `(width, height)` given the resolved one.
    fn layout(&mut self, width: f32, height: f32) -> (f32, f32);
}

/// Per-kind event receivers. Every method defaults to doing nothing.
#[allow(unused_variables)]
pub trait EventReceiver {
    /// Pointer moved over the widget.
    fn on_move(&mut self, event: &mut Event) {}
    /// Pointer entered the widget.
    fn on_in(&mut self, event: &mut Event) {}
    /// Pointer left the widget.
    fn on_out(&mut self, event: &mut Event) {}
    /// Pointer pressed on the widget.
    fn on_press(&mut self, event: &mut Event) {}
    /// Pointer released over the widget.
    fn on_release(&mut self, event: &mut Event) {}
    /// Pointer pressed and released on the widget.
    fn on_pressed(&mut self, event: &mut Event) {}
    /// Pointer moved anywhere while the widget holds a press.
    fn on_global_move(&mut self, event: &mut Event) {}
    /// Pointer released anywhere while the widget holds a press.
    fn on_global_release(&mut self, event: &mut Event) {}
    /// Widget gained focus.
    fn on_focus(&mut self, event: &mut Event) {}
    /// Widget lost focus.
    fn on_unfocus(&mut self, event: &mut Event) {}
    /// Key pressed while focused.
    fn on_key_press(&mut self, event: &mut Event) {}
    /// Key released while focused.
    fn on_key_release(&mut self, event: &mut Event) {}
    /// Character typed while focused.
    fn on_key_input(&mut self, event: &mut Event) {}
}

/// Receives declarative attributes when the node is materialized.
#[allow(unused_variables)]
pub trait AttributeSink {
    /// Text content.
    fn assign_text(&mut self, text: &str) {}
    /// Background color.
    fn assign_background(&mut self, color: Color) {}
    /// Foreground (text) color.
    fn assign_foreground(&mut self, color: Color) {}
    /// Border color.
    fn assign_border(&mut self, color: Color) {}
    /// Border width, already defaulted from the theme.
    fn assign_border_width(&mut self, width: f32) {}
    /// Vertical content alignment.
    fn assign_vertical_align(&mut self, align: VerticalAlign) {}
    /// Horizontal content alignment.
    fn assign_horizontal_align(&mut self, align: HorizontalAlign) {}
    /// Text wrapping.
    fn assign_text_wrap(&mut self, wrap: TextWrap) {}
    /// Font name. Only called when the source names one.
    fn assign_font(&mut self, font: &str) {}
    /// Resolved font size. Only called when the source sets one.
    fn assign_font_size(&mut self, size: f32) {}
    /// Image name.
    fn assign_image(&mut self, image: &str) {}
    /// Image scaling.
    fn assign_image_stretch(&mut self, stretch: ImageStretch) {}
    /// Disabled flag.
    fn assign_disabled(&mut self, disabled: bool) {}
    /// Obfuscation flag.
    fn assign_obfuscated(&mut self, obfuscated: bool) {}
}
