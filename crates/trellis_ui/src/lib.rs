//! # Trellis UI
//!
//! Declarative retained-mode UI core: nodes described in JSON or TOML,
//! geometry written as small expressions, input synthesized from raw device
//! polls and routed to the node under the pointer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         UI PIPELINE                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Source → Blueprints → Node Tree → Layout → Draw List        │
//! │                           ↑                                  │
//! │  Device Poll → Input Synthesizer → Dispatcher                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Geometry expressions
//!
//! | Text            | Meaning                                   |
//! |-----------------|-------------------------------------------|
//! | `120`           | pixels, offset by the parent              |
//! | `50%`           | percent of the parent's extent            |
//! | `at menu`       | `menu`'s position on the same axis        |
//! | `after menu`    | `menu`'s far edge on the same axis        |
//! | `25% of menu`   | percent of `menu`'s extent                |
//!
//! Widths and heights left blank fill the parent.
//!
//! ## Quick start
//!
//! ```no_run
//! use trellis_ui::{EngineConfig, Scene};
//!
//! let mut scene = Scene::from_json(
//!     r#"[{ "id": "ok", "type": "basic", "x": "50%", "width": "80", "height": "24", "text": "OK" }]"#,
//!     EngineConfig::default(),
//! )?;
//! scene.update();
//! let frame = scene.draw(1280.0, 720.0);
//! # let _ = frame;
//! # Ok::<(), trellis_ui::UiError>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod expr;
pub mod input;
pub mod layout;
pub mod render;
pub mod scene;
pub mod source;
pub mod style;
pub mod template;
pub mod widget;

pub use config::EngineConfig;
pub use dispatch::{dispatch, InteractionState};
pub use error::{UiError, UiResult};
pub use event::{Event, EventDetail, EventKind, KeyInfo, PointerId, PointerInfo};
pub use expr::{Axis, Expr};
pub use input::{DevicePoller, DeviceState, InputSynthesizer, Key, MouseButton, ScriptedDevice, TouchPoint};
pub use layout::{layout, LayoutContext, Rect};
pub use render::{DrawList, RenderCommand, TextStyle};
pub use scene::Scene;
pub use source::{Blueprint, NodeRecord};
pub use style::{Color, HorizontalAlign, ImageStretch, TextWrap, Theme, VerticalAlign};
pub use template::{directory_loader, TemplateLoader};
pub use widget::{Node, NodeId, NodeTree, Widget};
