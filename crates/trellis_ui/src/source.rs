//! Declarative node sources.
//!
//! A source is an ordered list of [`NodeRecord`]s, either a JSON array or a
//! TOML document of `[[nodes]]` tables:
//!
//! ```toml
//! [[nodes]]
//! id = "panel"
//! type = "basic"
//! width = "50%"
//!
//! [[nodes.children]]
//! id = "title"
//! type = "basic"
//! x = "8"
//! text = "Inventory"
//! ```
//!
//! Records are compiled into [`Blueprint`]s before anything touches a
//! scene, so a bad expression anywhere rejects the whole source.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::UiResult;
use crate::expr::Expr;
use crate::style::{HorizontalAlign, ImageStretch, TextWrap, VerticalAlign};
use crate::widget::GeometryExprs;

/// One node as written in a source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeRecord {
    /// Node id, referenced by `at`/`after`/`of`.
    pub id: String,
    /// Widget type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// X position expression.
    pub x: String,
    /// Y position expression.
    pub y: String,
    /// Width expression.
    pub width: String,
    /// Height expression.
    pub height: String,
    /// Horizontal origin expression.
    pub origin_x: String,
    /// Vertical origin expression.
    pub origin_y: String,
    /// Focus order, zero for unfocusable.
    pub focus_index: i32,
    /// Hidden flag.
    pub hidden: bool,
    /// Disabled flag.
    pub disabled: bool,
    /// Obfuscation flag.
    pub obfuscated: bool,
    /// Text content.
    pub text: String,
    /// Background color.
    pub background_color: String,
    /// Foreground color.
    pub foreground_color: String,
    /// Border color.
    pub border_color: String,
    /// Border width in pixels. Blank or zero uses the theme's.
    pub border_width: String,
    /// Vertical content alignment.
    pub vertical_align: VerticalAlign,
    /// Horizontal content alignment.
    pub horizontal_align: HorizontalAlign,
    /// Text wrapping.
    pub text_wrap: TextWrap,
    /// Font name, resolved by the host.
    pub font: String,
    /// Font size expression. Percentages scale the theme font size.
    pub font_size: String,
    /// Image name, resolved by the host.
    pub image: String,
    /// Image scaling.
    pub image_stretch: ImageStretch,
    /// Template name, for template nodes.
    pub source: String,
    /// Nested nodes.
    pub children: Vec<NodeRecord>,
}

#[derive(Debug, Deserialize)]
struct TomlDocument {
    #[serde(default)]
    nodes: Vec<NodeRecord>,
}

/// Parses a JSON array of records.
///
/// # Errors
///
/// Returns [`crate::UiError::Json`] on malformed input.
pub fn parse_json(src: &str) -> UiResult<Vec<NodeRecord>> {
    Ok(serde_json::from_str(src)?)
}

/// Parses a TOML document of `[[nodes]]` tables.
///
/// # Errors
///
/// Returns [`crate::UiError::Toml`] on malformed input.
pub fn parse_toml(src: &str) -> UiResult<Vec<NodeRecord>> {
    let document: TomlDocument = toml::from_str(src)?;
    Ok(document.nodes)
}

/// Reads a source file, picking the format by extension (`.toml` or JSON).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_file(path: impl AsRef<Path>) -> UiResult<Vec<NodeRecord>> {
    let path = path.as_ref();
    let src = std::fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => parse_toml(&src),
        _ => parse_json(&src),
    }
}

/// A record with its expressions parsed, ready to become a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blueprint {
    /// Node id.
    pub id: String,
    /// Widget type tag.
    pub kind: String,
    /// Parsed geometry expressions.
    pub exprs: GeometryExprs,
    /// Focus order.
    pub focus_index: i32,
    /// Hidden flag.
    pub hidden: bool,
    /// Disabled flag.
    pub disabled: bool,
    /// Obfuscation flag.
    pub obfuscated: bool,
    /// Text content.
    pub text: String,
    /// Background color, unparsed.
    pub background_color: String,
    /// Foreground color, unparsed.
    pub foreground_color: String,
    /// Border color, unparsed.
    pub border_color: String,
    /// Border width, unparsed.
    pub border_width: String,
    /// Vertical content alignment.
    pub vertical_align: VerticalAlign,
    /// Horizontal content alignment.
    pub horizontal_align: HorizontalAlign,
    /// Text wrapping.
    pub text_wrap: TextWrap,
    /// Font name.
    pub font: String,
    /// Parsed font size expression.
    pub font_size: Option<Expr>,
    /// Image name.
    pub image: String,
    /// Image scaling.
    pub image_stretch: ImageStretch,
    /// Template name.
    pub source: Option<String>,
    /// Nested blueprints.
    pub children: Vec<Blueprint>,
}

impl NodeRecord {
    /// Creates a record with an id and type tag.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Parses every expression in this record and its children.
    ///
    /// # Errors
    ///
    /// Returns [`crate::UiError::Expression`] for the first malformed expression.
    pub fn compile(&self) -> UiResult<Blueprint> {
        let exprs = GeometryExprs {
            x: Expr::parse(&self.x)?,
            y: Expr::parse(&self.y)?,
            width: Expr::parse(&self.width)?,
            height: Expr::parse(&self.height)?,
            origin_x: Expr::parse(&self.origin_x)?,
            origin_y: Expr::parse(&self.origin_y)?,
        };
        let children = self.children.iter().map(Self::compile).collect::<UiResult<Vec<_>>>()?;

        Ok(Blueprint {
            id: self.id.clone(),
            kind: self.kind.clone(),
            exprs,
            focus_index: self.focus_index,
            hidden: self.hidden,
            disabled: self.disabled,
            obfuscated: self.obfuscated,
            text: self.text.clone(),
            background_color: self.background_color.clone(),
            foreground_color: self.foreground_color.clone(),
            border_color: self.border_color.clone(),
            border_width: self.border_width.clone(),
            vertical_align: self.vertical_align,
            horizontal_align: self.horizontal_align,
            text_wrap: self.text_wrap,
            font: self.font.clone(),
            font_size: Expr::parse(&self.font_size)?,
            image: self.image.clone(),
            image_stretch: self.image_stretch,
            source: Some(self.source.clone()).filter(|s| !s.is_empty()),
            children,
        })
    }
}

/// Compiles a whole source.
///
/// # Errors
///
/// Returns the first expression error found, in declaration order.
pub fn compile_all(records: &[NodeRecord]) -> UiResult<Vec<Blueprint>> {
    records.iter().map(NodeRecord::compile).collect()
}

impl Blueprint {
    /// Rewrites this blueprint for splicing under the node `prefix`.
    ///
    /// The id becomes `prefix{separator}id` and every reference, geometry
    /// and font size alike, becomes `prefix{separator}target`. Children are
    /// scoped under the rewritten id.
    #[must_use]
    pub fn scoped(mut self, prefix: &str, separator: &str) -> Self {
        let id = format!("{prefix}{separator}{}", self.id);
        self.exprs = self.exprs.scoped(prefix, separator);
        self.font_size = self.font_size.map(|size| size.scoped(prefix, separator));
        self.children = self
            .children
            .into_iter()
            .map(|child| child.scoped(&id, separator))
            .collect();
        self.id = id;
        self
    }
}
