//! Built-in template widget.

use std::any::Any;

use super::{GeometrySink, GeometrySource, Widget};
use crate::layout::Rect;
use crate::render::DrawList;

/// Placeholder whose children come from a named template.
///
/// Tracks its geometry so spliced children can be laid out inside it, but
/// paints nothing and is never hit.
#[derive(Debug, Clone, Default)]
pub struct Template {
    /// Geometry last assigned by layout.
    pub bounds: Rect,
}

impl Widget for Template {
    fn paint(&self, _bounds: Rect, _out: &mut DrawList) {}

    fn hit(&self, _x: f32, _y: f32) -> bool {
        false
    }

    fn geometry(&self) -> Option<&dyn GeometrySource> {
        Some(self)
    }

    fn geometry_mut(&mut self) -> Option<&mut dyn GeometrySink> {
        Some(self)
    }

    fn is_template(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl GeometrySource for Template {
    fn x(&self) -> Option<f32> {
        Some(self.bounds.x)
    }

    fn y(&self) -> Option<f32> {
        Some(self.bounds.y)
    }

    fn width(&self) -> Option<f32> {
        Some(self.bounds.width)
    }

    fn height(&self) -> Option<f32> {
        Some(self.bounds.height)
    }
}

impl GeometrySink for Template {
    fn assign_x(&mut self, x: f32) {
        self.bounds.x = x;
    }

    fn assign_y(&mut self, y: f32) {
        self.bounds.y = y;
    }

    fn assign_width(&mut self, width: f32) {
        self.bounds.width = width;
    }

    fn assign_height(&mut self, height: f32) {
        self.bounds.height = height;
    }
}
