//! Draw command collection.
//!
//! The engine does not rasterize. A draw pass walks the visible nodes in
//! declaration order and lets each widget append commands to a
//! [`DrawList`]; the host turns those into pixels.

use crate::layout::Rect;
use crate::style::{Color, HorizontalAlign, ImageStretch, TextWrap, VerticalAlign};

/// How a text command should be shaped inside its bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font name, empty for the host's default face.
    pub font: String,
    /// Font size in pixels.
    pub size: f32,
    /// Horizontal alignment within the bounds.
    pub horizontal: HorizontalAlign,
    /// Vertical alignment within the bounds.
    pub vertical: VerticalAlign,
    /// Line breaking.
    pub wrap: TextWrap,
}

/// A render command.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Filled rectangle.
    Rect {
        /// Bounds.
        bounds: Rect,
        /// Fill color.
        color: Color,
    },
    /// Rectangle outline.
    RectOutline {
        /// Bounds.
        bounds: Rect,
        /// Stroke color.
        color: Color,
        /// Line width.
        width: f32,
    },
    /// Text laid out inside a box.
    Text {
        /// Text content.
        text: String,
        /// Box the text is aligned and wrapped in.
        bounds: Rect,
        /// Text color.
        color: Color,
        /// Font, size, alignment and wrapping.
        style: TextStyle,
    },
    /// Image loaded by the host from `source`.
    Image {
        /// Bounds.
        bounds: Rect,
        /// Image name or path, as written in the source.
        source: String,
        /// How the image is scaled into `bounds`.
        stretch: ImageStretch,
    },
}

/// Commands for one frame, targeting a surface of known size.
#[derive(Debug, Clone)]
pub struct DrawList {
    target: Rect,
    commands: Vec<RenderCommand>,
}

impl DrawList {
    /// Creates an empty list for a `width` x `height` target.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            target: Rect::new(0.0, 0.0, width, height),
            commands: Vec::with_capacity(256),
        }
    }

    /// Target bounds.
    #[must_use]
    pub const fn target(&self) -> Rect {
        self.target
    }

    /// Adds a render command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
