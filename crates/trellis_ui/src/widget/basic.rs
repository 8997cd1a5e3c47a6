//! Built-in rectangle widget.

use std::any::Any;

use super::{AttributeSink, GeometrySink, GeometrySource, Widget};
use crate::layout::Rect;
use crate::render::{DrawList, RenderCommand, TextStyle};
use crate::style::{Color, HorizontalAlign, ImageStretch, TextWrap, Theme, VerticalAlign};

/// A plain rectangle with optional image and text.
///
/// Fills its background, draws its image, strokes its border and hands
/// its text to the host with the alignment and wrapping it was given.
/// Hit testing includes the right and bottom edges.
#[derive(Debug, Clone)]
pub struct Basic {
    /// Geometry last assigned by layout.
    pub bounds: Rect,
    /// Text content.
    pub text: String,
    /// Fill color.
    pub background: Color,
    /// Text color.
    pub foreground: Color,
    /// Border color.
    pub border: Color,
    /// Border line width.
    pub border_width: f32,
    /// Text shaping.
    pub text_style: TextStyle,
    /// Image name, empty for none.
    pub image: String,
    /// Image scaling.
    pub image_stretch: ImageStretch,
    /// Disabled flag.
    pub disabled: bool,
    /// Replace text glyphs with `*` when painting.
    pub obfuscated: bool,
}

impl Default for Basic {
    fn default() -> Self {
        let theme = Theme::default();
        Self {
            bounds: Rect::ZERO,
            text: String::new(),
            background: theme.background,
            foreground: theme.foreground,
            border: theme.border,
            border_width: theme.border_width,
            text_style: TextStyle {
                font: String::new(),
                size: theme.font_size,
                horizontal: HorizontalAlign::default(),
                vertical: VerticalAlign::default(),
                wrap: TextWrap::default(),
            },
            image: String::new(),
            image_stretch: ImageStretch::default(),
            disabled: false,
            obfuscated: false,
        }
    }
}

impl Basic {
    /// Text as it should be shown.
    #[must_use]
    pub fn display_text(&self) -> String {
        if self.obfuscated {
            "*".repeat(self.text.chars().count())
        } else {
            self.text.clone()
        }
    }
}

impl Widget for Basic {
    fn paint(&self, bounds: Rect, out: &mut DrawList) {
        out.push(RenderCommand::Rect {
            bounds,
            color: self.background,
        });
        if !self.image.is_empty() {
            out.push(RenderCommand::Image {
                bounds,
                source: self.image.clone(),
                stretch: self.image_stretch,
            });
        }
        out.push(RenderCommand::RectOutline {
            bounds,
            color: self.border,
            width: self.border_width,
        });
        if !self.text.is_empty() {
            out.push(RenderCommand::Text {
                text: self.display_text(),
                bounds,
                color: self.foreground,
                style: self.text_style.clone(),
            });
        }
    }

    fn hit(&self, x: f32, y: f32) -> bool {
        self.bounds.contains_inclusive(x, y)
    }

    fn disabled(&self) -> bool {
        self.disabled
    }

    fn geometry(&self) -> Option<&dyn GeometrySource> {
        Some(self)
    }

    fn geometry_mut(&mut self) -> Option<&mut dyn GeometrySink> {
        Some(self)
    }

    fn attributes(&mut self) -> Option<&mut dyn AttributeSink> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl GeometrySource for Basic {
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

impl GeometrySink for Basic {
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

impl AttributeSink for Basic {
    fn assign_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn assign_background(&mut self, color: Color) {
        self.background = color;
    }

    fn assign_foreground(&mut self, color: Color) {
        self.foreground = color;
    }

    fn assign_border(&mut self, color: Color) {
        self.border = color;
    }

    fn assign_border_width(&mut self, width: f32) {
        self.border_width = width;
    }

    fn assign_vertical_align(&mut self, align: VerticalAlign) {
        self.text_style.vertical = align;
    }

    fn assign_horizontal_align(&mut self, align: HorizontalAlign) {
        self.text_style.horizontal = align;
    }

    fn assign_text_wrap(&mut self, wrap: TextWrap) {
        self.text_style.wrap = wrap;
    }

    fn assign_font(&mut self, font: &str) {
        self.text_style.font = font.to_string();
    }

    fn assign_font_size(&mut self, size: f32) {
        self.text_style.size = size;
    }

    fn assign_image(&mut self, image: &str) {
        self.image = image.to_string();
    }

    fn assign_image_stretch(&mut self, stretch: ImageStretch) {
        self.image_stretch = stretch;
    }

    fn assign_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    fn assign_obfuscated(&mut self, obfuscated: bool) {
        self.obfuscated = obfuscated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_includes_far_edges() {
        let mut widget = Basic::default();
        widget.bounds = Rect::new(10.0, 10.0, 20.0, 20.0);

        assert!(widget.hit(10.0, 10.0));
        assert!(widget.hit(30.0, 30.0));
        assert!(!widget.hit(30.5, 15.0));
        assert!(!widget.hit(9.9, 15.0));
    }

    #[test]
    fn test_paint_obfuscated_text() {
        let mut widget = Basic::default();
        widget.assign_text("secret");
        widget.assign_obfuscated(true);

        let mut out = DrawList::new(100.0, 100.0);
        widget.paint(Rect::new(0.0, 0.0, 50.0, 10.0), &mut out);

        let text = out.commands().iter().find_map(|c| match c {
            RenderCommand::Text { text, .. } => Some(text.clone()),
            _ => None,
        });
        assert_eq!(text.as_deref(), Some("******"));
    }

    #[test]
    fn test_paint_image_under_border() {
        let mut widget = Basic::default();
        widget.assign_image("logo.png");
        widget.assign_image_stretch(ImageStretch::Fill);
        widget.assign_border_width(3.0);

        let mut out = DrawList::new(100.0, 100.0);
        let bounds = Rect::new(5.0, 5.0, 40.0, 40.0);
        widget.paint(bounds, &mut out);

        assert!(matches!(
            out.commands(),
            [
                RenderCommand::Rect { .. },
                RenderCommand::Image { source, stretch: ImageStretch::Fill, .. },
                RenderCommand::RectOutline { width, .. },
            ] if source == "logo.png" && *width == 3.0
        ));
    }
}
