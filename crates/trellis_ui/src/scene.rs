//! Host-facing scene.
//!
//! A [`Scene`] owns the node tree, the interaction state and the input
//! synthesizer. The host calls [`Scene::update`] once per tick and
//! [`Scene::draw`] once per frame:
//!
//! ```text
//! update: poll → (generate) → (relayout) → synthesize → dispatch
//! draw:   (relayout on resize) → paint visible nodes in declaration order
//! ```

use std::time::Instant;

use crate::config::EngineConfig;
use crate::dispatch::{self, InteractionState};
use crate::error::{UiError, UiResult};
use crate::event::{Event, EventKind};
use crate::expr::Axis;
use crate::input::{DevicePoller, DeviceState, InputSynthesizer};
use crate::layout::{self, LayoutContext, Rect};
use crate::render::DrawList;
use crate::source::{self, Blueprint, NodeRecord};
use crate::style::{Color, Theme};
use crate::template::{TemplateLoader, Templates};
use crate::widget::{create_widget, Node, NodeId, NodeTree};

/// A tree of nodes plus everything needed to lay it out and drive it.
pub struct Scene {
    config: EngineConfig,
    theme: Theme,
    tree: NodeTree,
    state: InteractionState,
    synthesizer: InputSynthesizer,
    templates: Templates,
    device: Option<Box<dyn DevicePoller>>,
    pending: Vec<Blueprint>,
    target: Option<(f32, f32)>,
    dirty: bool,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            synthesizer: InputSynthesizer::new(&config),
            templates: Templates::new(config.template_separator.clone()),
            config,
            theme: Theme::default(),
            tree: NodeTree::new(),
            state: InteractionState::new(),
            device: None,
            pending: Vec::new(),
            target: None,
            dirty: true,
        }
    }

    /// Creates a scene from a JSON source. Nodes are built on [`Scene::generate`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON or any expression in it is malformed.
    pub fn from_json(src: &str, config: EngineConfig) -> UiResult<Self> {
        let mut scene = Self::new(config);
        scene.parse_json(src)?;
        Ok(scene)
    }

    /// Creates a scene from a TOML source. Nodes are built on [`Scene::generate`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML or any expression in it is malformed.
    pub fn from_toml(src: &str, config: EngineConfig) -> UiResult<Self> {
        let mut scene = Self::new(config);
        scene.parse_toml(src)?;
        Ok(scene)
    }

    /// Replaces the scene's contents with a JSON source.
    ///
    /// Nothing changes unless the whole source is valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON or any expression in it is malformed.
    pub fn parse_json(&mut self, src: &str) -> UiResult<()> {
        self.parse_records(&source::parse_json(src)?)
    }

    /// Replaces the scene's contents with a TOML source.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML or any expression in it is malformed.
    pub fn parse_toml(&mut self, src: &str) -> UiResult<()> {
        self.parse_records(&source::parse_toml(src)?)
    }

    /// Replaces the scene's contents with already-decoded records.
    ///
    /// # Errors
    ///
    /// Returns an error if any expression is malformed.
    pub fn parse_records(&mut self, records: &[NodeRecord]) -> UiResult<()> {
        let blueprints = source::compile_all(records)?;
        self.tree.clear();
        self.state.clear();
        self.pending = blueprints;
        self.dirty = true;
        Ok(())
    }

    /// Builds widgets for every parsed but not yet generated node.
    pub fn generate(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        tracing::debug!(roots = pending.len(), "generating nodes");

        let mut generator = Generator::new(&mut self.templates, &self.theme);
        for blueprint in pending {
            generator.insert_root(&mut self.tree, blueprint);
        }
        self.mark_dirty("generate");
    }

    /// Adds a node (and its children) under `parent`, or as a new root.
    ///
    /// # Errors
    ///
    /// Returns an error if an expression is malformed or `parent` is gone.
    pub fn add_node(&mut self, parent: Option<NodeId>, record: &NodeRecord) -> UiResult<NodeId> {
        let blueprint = record.compile()?;
        let mut generator = Generator::new(&mut self.templates, &self.theme);
        let handle = match parent {
            Some(parent) => generator
                .materialize(&mut self.tree, Some(parent), blueprint)
                .ok_or(UiError::NodeNotFound(parent))?,
            None => generator.insert_root(&mut self.tree, blueprint),
        };
        self.mark_dirty("add node");
        Ok(handle)
    }

    /// Removes a node and its subtree.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::NodeNotFound`] if `id` is not in the scene.
    pub fn remove_node(&mut self, id: NodeId) -> UiResult<Node> {
        if !self.tree.contains(id) {
            return Err(UiError::NodeNotFound(id));
        }
        let mut doomed = vec![id];
        let mut cursor = 0;
        while let Some(&handle) = doomed.get(cursor) {
            doomed.extend_from_slice(self.tree.children(handle));
            cursor += 1;
        }

        let node = self.tree.remove(id).ok_or(UiError::NodeNotFound(id))?;
        for handle in doomed {
            self.state.forget(handle);
        }
        self.mark_dirty("remove node");
        Ok(node)
    }

    /// First node with declared `id`, searching nested children too.
    #[must_use]
    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.find(id)
    }

    /// Gets a node by handle.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    /// Gets a node by handle, mutably.
    ///
    /// Geometry changes made through the widget are picked up as overrides
    /// on the next layout; expression changes need [`Scene::invalidate`].
    #[must_use]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.tree.get_mut(id)
    }

    /// The node tree.
    #[must_use]
    pub const fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Installs a hook on a node.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::NodeNotFound`] if `id` is not in the scene.
    pub fn set_hook(&mut self, id: NodeId, kind: EventKind, hook: impl FnMut(&mut Event) + 'static) -> UiResult<()> {
        let node = self.tree.get_mut(id).ok_or(UiError::NodeNotFound(id))?;
        node.set_hook(kind, hook);
        Ok(())
    }

    /// Installs the template loader.
    pub fn set_template_loader(&mut self, loader: impl FnMut(&str) -> UiResult<Vec<NodeRecord>> + 'static) {
        let loader: TemplateLoader = Box::new(loader);
        self.templates.set_loader(loader);
    }

    /// Installs the device poller used by [`Scene::update`].
    pub fn set_device(&mut self, device: impl DevicePoller + 'static) {
        self.device = Some(Box::new(device));
    }

    /// Sets the theme used for blank color attributes of nodes generated from now on.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Sets the render-target size without drawing.
    pub fn set_target_size(&mut self, width: f32, height: f32) {
        if self.target != Some((width, height)) {
            self.target = Some((width, height));
            self.mark_dirty("target resized");
        }
    }

    /// Forces a relayout on the next update or draw.
    pub fn invalidate(&mut self) {
        self.mark_dirty("invalidated");
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Lays the tree out inside a `width` x `height` target right now.
    pub fn layout(&mut self, width: f32, height: f32) {
        self.generate();
        layout::layout(&mut self.tree, LayoutContext::target(width, height));
        self.dirty = false;
    }

    /// Runs one tick against the installed device, if any.
    pub fn update(&mut self) {
        let state = match self.device.as_mut() {
            Some(device) => device.poll(),
            None => DeviceState::default(),
        };
        self.update_at(&state, Instant::now());
    }

    /// Runs one tick against an explicit device sample.
    ///
    /// Returns how many synthesized events were dispatched.
    pub fn update_at(&mut self, device: &DeviceState, now: Instant) -> usize {
        self.generate();
        if self.dirty {
            let (width, height) = self.target.or(device.window_size).unwrap_or((0.0, 0.0));
            self.layout(width, height);
        }

        let events = self.synthesizer.synthesize(device, self.target, now);
        let count = events.len();
        for event in events {
            dispatch::dispatch(&mut self.tree, &mut self.state, event);
        }
        count
    }

    /// Paints every visible node into a fresh draw list for a `width` x `height` target.
    pub fn draw(&mut self, width: f32, height: f32) -> DrawList {
        self.set_target_size(width, height);
        if self.dirty || !self.pending.is_empty() {
            self.layout(width, height);
        }

        let mut out = DrawList::new(width, height);
        for handle in self.tree.iter_dfs() {
            if !self.tree.is_visible(handle) {
                continue;
            }
            let Some(node) = self.tree.get(handle) else { continue };
            let Some(widget) = node.widget() else { continue };
            let (x, y) = node.anchor();
            let resolved = node.resolved();
            widget.paint(Rect::new(x, y, resolved.width, resolved.height), &mut out);
        }
        out
    }

    /// Returns true while anything is hovered, pressed or held.
    #[must_use]
    pub fn has_events(&self) -> bool {
        self.state.is_active() || self.synthesizer.is_active()
    }

    /// Drops hover, press, focus and held-input state without firing events.
    pub fn clear_events(&mut self) {
        self.state.clear();
        self.synthesizer.reset();
    }

    /// The focused node.
    #[must_use]
    pub const fn focused(&self) -> Option<NodeId> {
        self.state.focused()
    }

    /// Returns true if the pointer is over `id`.
    #[must_use]
    pub fn is_hovered(&self, id: NodeId) -> bool {
        self.state.is_hovered(id)
    }

    /// Returns true if `id` holds a press from any pointer.
    #[must_use]
    pub fn is_pressed(&self, id: NodeId) -> bool {
        self.state.is_pressed_by_any(id)
    }

    fn mark_dirty(&mut self, reason: &'static str) {
        if !self.dirty {
            tracing::debug!(reason, "relayout scheduled");
        }
        self.dirty = true;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Turns blueprints into nodes, creating widgets and splicing templates.
struct Generator<'a> {
    templates: &'a mut Templates,
    theme: &'a Theme,
    /// Templates currently being expanded, to cut include cycles.
    expanding: Vec<String>,
}

impl<'a> Generator<'a> {
    fn new(templates: &'a mut Templates, theme: &'a Theme) -> Self {
        Self {
            templates,
            theme,
            expanding: Vec::new(),
        }
    }

    fn insert_root(&mut self, tree: &mut NodeTree, blueprint: Blueprint) -> NodeId {
        let (node, rest) = self.build(tree, blueprint);
        let handle = tree.insert_root(node);
        self.populate(tree, handle, rest);
        handle
    }

    fn materialize(&mut self, tree: &mut NodeTree, parent: Option<NodeId>, blueprint: Blueprint) -> Option<NodeId> {
        let Some(parent) = parent else {
            return Some(self.insert_root(tree, blueprint));
        };
        let (node, rest) = self.build(tree, blueprint);
        let handle = tree.insert_child(parent, node)?;
        self.populate(tree, handle, rest);
        Some(handle)
    }

    /// Creates the node and its widget. Children are handed back for [`Generator::populate`].
    ///
    /// Font sizes are resolved here, once, against whatever geometry the
    /// tree holds at the time.
    fn build(&self, tree: &NodeTree, blueprint: Blueprint) -> (Node, Vec<Blueprint>) {
        let Blueprint {
            id,
            kind,
            exprs,
            focus_index,
            hidden,
            disabled,
            obfuscated,
            text,
            background_color,
            foreground_color,
            border_color,
            border_width,
            vertical_align,
            horizontal_align,
            text_wrap,
            font,
            font_size,
            image,
            image_stretch,
            source,
            children,
        } = blueprint;

        let mut widget = create_widget(&kind);
        match widget.as_deref_mut() {
            Some(widget) => {
                if let Some(sink) = widget.attributes() {
                    sink.assign_text(&text);
                    sink.assign_background(Color::parse_or(&background_color, self.theme.background));
                    sink.assign_foreground(Color::parse_or(&foreground_color, self.theme.foreground));
                    sink.assign_border(Color::parse_or(&border_color, self.theme.border));
                    sink.assign_border_width(self.theme.border_width_or_default(&border_width));
                    sink.assign_vertical_align(vertical_align);
                    sink.assign_horizontal_align(horizontal_align);
                    sink.assign_text_wrap(text_wrap);
                    if !font.is_empty() {
                        sink.assign_font(&font);
                    }
                    if let Some(size) = font_size {
                        sink.assign_font_size(size.resolve(self.theme.font_size, Axis::Vertical, tree).value);
                    }
                    sink.assign_image(&image);
                    sink.assign_image_stretch(image_stretch);
                    sink.assign_disabled(disabled);
                    sink.assign_obfuscated(obfuscated);
                }
            }
            None => tracing::warn!(kind = %kind, id = %id, "unknown widget type, node left inert"),
        }

        let mut node = Node::new(id, kind).with_exprs(exprs).with_focus_index(focus_index);
        node.hidden = hidden;
        node.disabled = disabled;
        node.source = source;
        node.widget = widget;
        (node, children)
    }

    /// Declared children first, then template children, then the `generated` notification.
    fn populate(&mut self, tree: &mut NodeTree, handle: NodeId, children: Vec<Blueprint>) {
        for child in children {
            self.materialize(tree, Some(handle), child);
        }

        let template = tree
            .get(handle)
            .filter(|node| node.widget().is_some_and(|widget| widget.is_template()))
            .map(|node| (node.id.clone(), node.source.clone()));
        if let Some((id, source)) = template {
            self.splice(tree, handle, &id, source.as_deref());
        }

        if let Some(widget) = tree.get_mut(handle).and_then(Node::widget_mut) {
            widget.generated();
        }
    }

    fn splice(&mut self, tree: &mut NodeTree, handle: NodeId, id: &str, source: Option<&str>) {
        let Some(name) = source else {
            tracing::warn!(id, "template node has no source");
            return;
        };
        if self.expanding.iter().any(|active| active == name) {
            tracing::warn!(id, template = name, "template includes itself, skipping");
            return;
        }

        match self.templates.load(name, id) {
            Ok(blueprints) => {
                self.expanding.push(name.to_string());
                for blueprint in blueprints {
                    self.materialize(tree, Some(handle), blueprint);
                }
                self.expanding.pop();
            }
            Err(err) => tracing::warn!(id, template = name, error = %err, "template not spliced"),
        }
    }
}
