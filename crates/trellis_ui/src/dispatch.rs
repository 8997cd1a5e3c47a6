//! Event dispatch and interaction state.
//!
//! Every synthesized event goes through two passes:
//!
//! 1. **Local**: nodes are walked deepest and latest first, hit-tested, and
//!    the pointer events that land drive hover, press and focus. A node
//!    that cancels the event stops this walk.
//! 2. **Global**: runs regardless of cancellation. Releases and moves reach
//!    every node holding a press for that pointer, a press that misses the
//!    focused node clears focus, and key events go to the focused node.

use std::collections::HashSet;

use crate::event::{Event, EventKind, PointerId};
use crate::widget::{NodeId, NodeTree};

/// Hover, press and focus state carried from tick to tick.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    hovered: HashSet<NodeId>,
    pressed: HashSet<(NodeId, PointerId)>,
    focused: Option<NodeId>,
}

impl InteractionState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the last move over `node` hit it.
    #[must_use]
    pub fn is_hovered(&self, node: NodeId) -> bool {
        self.hovered.contains(&node)
    }

    /// Returns true if `node` holds a press for `pointer`.
    #[must_use]
    pub fn is_pressed(&self, node: NodeId, pointer: PointerId) -> bool {
        self.pressed.contains(&(node, pointer))
    }

    /// Returns true if `node` holds a press for any pointer.
    #[must_use]
    pub fn is_pressed_by_any(&self, node: NodeId) -> bool {
        self.pressed.iter().any(|(n, _)| *n == node)
    }

    /// The focused node, if any.
    #[must_use]
    pub const fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Returns true if any node is hovered or pressed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.hovered.is_empty() || !self.pressed.is_empty()
    }

    /// Drops all state, including focus, without notifying anyone.
    pub fn clear(&mut self) {
        self.hovered.clear();
        self.pressed.clear();
        self.focused = None;
    }

    /// Drops every reference to `node`, for nodes leaving the tree.
    pub fn forget(&mut self, node: NodeId) {
        self.hovered.remove(&node);
        self.pressed.retain(|(n, _)| *n != node);
        if self.focused == Some(node) {
            self.focused = None;
        }
    }
}

/// Routes one event through both passes.
pub fn dispatch(tree: &mut NodeTree, state: &mut InteractionState, mut event: Event) {
    tracing::trace!(kind = ?event.kind, "dispatch");

    if let Some(info) = event.pointer_info().copied() {
        if matches!(event.kind, EventKind::Move | EventKind::Press | EventKind::Release) {
            local_pass(tree, state, &mut event, info.x, info.y, info.pointer);
        }
        global_pointer_pass(tree, state, &mut event, info.x, info.y, info.pointer);
    } else {
        global_key_pass(tree, state, &mut event);
    }
}

/// Hit test that also honors hidden ancestors.
fn hits(tree: &NodeTree, handle: NodeId, x: f32, y: f32) -> bool {
    tree.get(handle).is_some_and(|node| node.hit(x, y)) && tree.is_visible(handle)
}

fn deliver(tree: &mut NodeTree, handle: NodeId, event: &mut Event) {
    if let Some(node) = tree.get_mut(handle) {
        node.deliver(event, false);
    }
}

fn local_pass(tree: &mut NodeTree, state: &mut InteractionState, event: &mut Event, x: f32, y: f32, pointer: PointerId) {
    let order: Vec<NodeId> = tree.iter_reverse().collect();

    for handle in order {
        match tree.get(handle) {
            Some(node) if !node.is_inert() => {}
            _ => continue,
        }
        let hit = hits(tree, handle, x, y);

        match event.kind {
            EventKind::Move => {
                if hit {
                    deliver(tree, handle, event);
                    if state.hovered.insert(handle) {
                        let mut enter = event.derive(EventKind::In);
                        deliver(tree, handle, &mut enter);
                    }
                } else if state.hovered.remove(&handle) {
                    let mut leave = event.derive(EventKind::Out);
                    deliver(tree, handle, &mut leave);
                }
            }
            EventKind::Press if hit => {
                deliver(tree, handle, event);
                state.pressed.insert((handle, pointer));
                focus_on_press(tree, state, event, handle);
            }
            EventKind::Release if hit => {
                deliver(tree, handle, event);
                if state.pressed.remove(&(handle, pointer)) {
                    let mut click = event.derive(EventKind::Pressed);
                    deliver(tree, handle, &mut click);
                }
            }
            _ => {}
        }

        if event.canceled() {
            tracing::trace!(kind = ?event.kind, node = handle.raw(), "canceled");
            break;
        }
    }
}

fn focus_on_press(tree: &mut NodeTree, state: &mut InteractionState, press: &Event, handle: NodeId) {
    if let Some(previous) = state.focused.filter(|&f| f != handle) {
        let mut unfocus = Event::bare(EventKind::Unfocus, press.timestamp);
        deliver(tree, previous, &mut unfocus);
    }

    let focusable = tree.get(handle).is_some_and(|node| node.focus_index > 0);
    if focusable {
        if state.focused != Some(handle) {
            let mut focus = press.derive(EventKind::Focus);
            deliver(tree, handle, &mut focus);
            state.focused = Some(handle);
            tracing::debug!(node = handle.raw(), "focus");
        }
    } else if state.focused.take().is_some() {
        tracing::debug!(node = handle.raw(), "focus cleared by unfocusable press");
    }
}

fn global_pointer_pass(
    tree: &mut NodeTree,
    state: &mut InteractionState,
    event: &mut Event,
    x: f32,
    y: f32,
    pointer: PointerId,
) {
    match event.kind {
        EventKind::Release => {
            let holders: Vec<NodeId> = tree.iter_dfs().filter(|&h| state.is_pressed(h, pointer)).collect();
            for handle in holders {
                let mut release = event.derive(EventKind::GlobalRelease);
                deliver(tree, handle, &mut release);
            }
            state.pressed.retain(|(_, p)| *p != pointer);
        }
        EventKind::Move => {
            let holders: Vec<NodeId> = tree.iter_dfs().filter(|&h| state.is_pressed(h, pointer)).collect();
            for handle in holders {
                let mut drag = event.derive(EventKind::GlobalMove);
                deliver(tree, handle, &mut drag);
            }
        }
        EventKind::Press => {
            let Some(focused) = state.focused else { return };
            if hits(tree, focused, x, y) {
                return;
            }
            let mut unfocus = Event::bare(EventKind::Unfocus, event.timestamp);
            deliver(tree, focused, &mut unfocus);
            state.focused = None;
            tracing::debug!(node = focused.raw(), "focus cleared by outside press");
        }
        _ => {}
    }
}

fn global_key_pass(tree: &mut NodeTree, state: &InteractionState, event: &mut Event) {
    if !matches!(event.kind, EventKind::KeyPress | EventKind::KeyRelease | EventKind::KeyInput) {
        return;
    }
    let Some(focused) = state.focused else { return };
    if let Some(node) = tree.get_mut(focused) {
        node.deliver(event, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyInfo, PointerInfo};
    use crate::expr::Expr;
    use crate::input::{Key, MouseButton};
    use crate::layout::{layout, LayoutContext};
    use crate::widget::{Basic, GeometryExprs, Node};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Instant;

    type Log = Rc<RefCell<Vec<(String, EventKind)>>>;

    const KINDS: [EventKind; 13] = [
        EventKind::Move,
        EventKind::In,
        EventKind::Out,
        EventKind::Press,
        EventKind::Release,
        EventKind::Pressed,
        EventKind::GlobalMove,
        EventKind::GlobalRelease,
        EventKind::Focus,
        EventKind::Unfocus,
        EventKind::KeyPress,
        EventKind::KeyRelease,
        EventKind::KeyInput,
    ];

    const LEFT: PointerId = PointerId::Mouse(MouseButton::Left);

    fn boxed(id: &str, x: &str, y: &str, size: &str, focus_index: i32) -> Node {
        let e = |text: &str| Expr::parse(text).unwrap();
        Node::new(id, "basic")
            .with_exprs(GeometryExprs {
                x: e(x),
                y: e(y),
                width: e(size),
                height: e(size),
                ..Default::default()
            })
            .with_focus_index(focus_index)
            .with_widget(Box::new(Basic::default()))
    }

    fn watch(tree: &mut NodeTree, log: &Log) {
        let handles: Vec<_> = tree.iter_dfs().collect();
        for handle in handles {
            let node = tree.get_mut(handle).unwrap();
            for kind in KINDS {
                let log = Rc::clone(log);
                let id = node.id.clone();
                node.set_hook(kind, move |event| log.borrow_mut().push((id.clone(), event.kind)));
            }
        }
    }

    /// `outer` (0,0 100x100) holding `inner` (10,10 20x20), plus `side`
    /// (200,0 50x50) which takes focus.
    fn scene() -> (NodeTree, Log) {
        let mut tree = NodeTree::new();
        let outer = tree.insert_root(boxed("outer", "0", "0", "100", 0));
        tree.insert_child(outer, boxed("inner", "10", "10", "20", 2));
        tree.insert_root(boxed("side", "200", "0", "50", 1));
        layout(&mut tree, LayoutContext::target(400.0, 400.0));

        let log = Log::default();
        watch(&mut tree, &log);
        (tree, log)
    }

    fn pointer(kind: EventKind, x: f32, y: f32, pointer: PointerId) -> Event {
        Event::pointer(kind, Instant::now(), PointerInfo::at(x, y, pointer))
    }

    fn key(kind: EventKind) -> Event {
        Event::key(
            kind,
            Instant::now(),
            KeyInfo {
                key: Some(Key::Enter),
                rune: None,
                repeat: 0,
            },
        )
    }

    fn take(log: &Log) -> Vec<(String, EventKind)> {
        std::mem::take(&mut *log.borrow_mut())
    }

    fn count(entries: &[(String, EventKind)], id: &str, kind: EventKind) -> usize {
        entries.iter().filter(|(i, k)| i == id && *k == kind).count()
    }

    #[test]
    fn test_click_inside() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 220.0, 20.0, LEFT));
        dispatch(&mut tree, &mut state, pointer(EventKind::Release, 225.0, 25.0, LEFT));

        let entries = take(&log);
        assert_eq!(count(&entries, "side", EventKind::Pressed), 1);
        assert_eq!(count(&entries, "side", EventKind::GlobalRelease), 0);
        assert!(!state.is_active());
    }

    #[test]
    fn test_release_outside_is_global_only() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 220.0, 20.0, LEFT));
        dispatch(&mut tree, &mut state, pointer(EventKind::Move, 380.0, 380.0, LEFT));
        dispatch(&mut tree, &mut state, pointer(EventKind::Release, 380.0, 380.0, LEFT));

        let entries = take(&log);
        assert_eq!(count(&entries, "side", EventKind::GlobalMove), 1);
        assert_eq!(count(&entries, "side", EventKind::GlobalRelease), 1);
        assert_eq!(count(&entries, "side", EventKind::Pressed), 0);
        assert!(!state.is_active());
    }

    #[test]
    fn test_press_records_are_per_pointer() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();
        let side = tree.find("side").unwrap();

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 220.0, 20.0, PointerId::Touch(4)));
        assert!(state.is_pressed(side, PointerId::Touch(4)));

        dispatch(&mut tree, &mut state, pointer(EventKind::Move, 230.0, 20.0, PointerId::Ambient));
        dispatch(&mut tree, &mut state, pointer(EventKind::Release, 220.0, 20.0, LEFT));

        let entries = take(&log);
        assert_eq!(count(&entries, "side", EventKind::GlobalMove), 0);
        assert_eq!(count(&entries, "side", EventKind::Pressed), 0);
        assert!(state.is_pressed(side, PointerId::Touch(4)));
    }

    #[test]
    fn test_hover_is_edge_triggered() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();

        for _ in 0..3 {
            dispatch(&mut tree, &mut state, pointer(EventKind::Move, 220.0, 20.0, PointerId::Ambient));
        }
        let entries = take(&log);
        assert_eq!(count(&entries, "side", EventKind::In), 1);
        assert_eq!(count(&entries, "side", EventKind::Move), 3);
        assert_eq!(count(&entries, "side", EventKind::Out), 0);

        dispatch(&mut tree, &mut state, pointer(EventKind::Move, 380.0, 380.0, PointerId::Ambient));
        let entries = take(&log);
        assert_eq!(count(&entries, "side", EventKind::Out), 1);
        assert!(!state.is_active());
    }

    #[test]
    fn test_deepest_first_and_cancel() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 15.0, 15.0, LEFT));
        let entries = take(&log);
        let presses: Vec<_> = entries.iter().filter(|(_, k)| *k == EventKind::Press).map(|(i, _)| i.as_str()).collect();
        assert_eq!(presses, vec!["inner", "outer"]);

        let inner = tree.find("inner").unwrap();
        let hook_log = Rc::clone(&log);
        tree.get_mut(inner).unwrap().set_hook(EventKind::Press, move |event| {
            hook_log.borrow_mut().push(("inner".to_string(), event.kind));
            event.cancel();
        });
        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 15.0, 15.0, PointerId::Touch(9)));
        let entries = take(&log);
        assert_eq!(count(&entries, "inner", EventKind::Press), 1);
        assert_eq!(count(&entries, "outer", EventKind::Press), 0);
    }

    #[test]
    fn test_focus_exclusivity() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();
        let side = tree.find("side").unwrap();

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 220.0, 20.0, LEFT));
        dispatch(&mut tree, &mut state, pointer(EventKind::Release, 220.0, 20.0, LEFT));
        assert_eq!(state.focused(), Some(side));
        assert_eq!(count(&take(&log), "side", EventKind::Focus), 1);

        // `outer` has focus index 0.
        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 90.0, 90.0, LEFT));
        let entries = take(&log);
        assert_eq!(count(&entries, "side", EventKind::Unfocus), 1);
        assert_eq!(entries.iter().filter(|(_, k)| *k == EventKind::Focus).count(), 0);
        assert_eq!(state.focused(), None);
    }

    #[test]
    fn test_press_on_empty_space_unfocuses() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 220.0, 20.0, LEFT));
        take(&log);
        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 390.0, 390.0, PointerId::Touch(1)));

        let entries = take(&log);
        assert_eq!(count(&entries, "side", EventKind::Unfocus), 1);
        assert_eq!(state.focused(), None);
    }

    #[test]
    fn test_focus_moves_between_focusable_nodes() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();
        let inner = tree.find("inner").unwrap();

        // A consuming press keeps the unfocusable parent out of it.
        tree.get_mut(inner).unwrap().set_hook(EventKind::Press, Event::cancel);
        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 15.0, 15.0, LEFT));
        assert_eq!(state.focused(), Some(inner));
        take(&log);

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 220.0, 20.0, PointerId::Touch(2)));
        let entries = take(&log);
        assert_eq!(count(&entries, "inner", EventKind::Unfocus), 1);
        assert_eq!(count(&entries, "side", EventKind::Focus), 1);
        assert_eq!(state.focused(), tree.find("side"));
    }

    #[test]
    fn test_unfocusable_ancestor_clears_focus_after_child() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 15.0, 15.0, LEFT));

        let entries = take(&log);
        assert_eq!(count(&entries, "inner", EventKind::Focus), 1);
        assert_eq!(count(&entries, "inner", EventKind::Unfocus), 1);
        assert_eq!(state.focused(), None);
    }

    #[test]
    fn test_keys_go_to_focused_only() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();

        dispatch(&mut tree, &mut state, key(EventKind::KeyPress));
        assert!(take(&log).is_empty());

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 220.0, 20.0, LEFT));
        take(&log);
        dispatch(&mut tree, &mut state, key(EventKind::KeyPress));
        dispatch(&mut tree, &mut state, key(EventKind::KeyRelease));

        let entries = take(&log);
        assert_eq!(
            entries,
            vec![
                ("side".to_string(), EventKind::KeyPress),
                ("side".to_string(), EventKind::KeyRelease)
            ]
        );
    }

    #[test]
    fn test_disabled_and_hidden_fail_hit_test() {
        let (mut tree, log) = scene();
        let mut state = InteractionState::new();
        let side = tree.find("side").unwrap();
        let outer = tree.find("outer").unwrap();

        tree.get_mut(side).unwrap().widget_as_mut::<Basic>().unwrap().disabled = true;
        tree.get_mut(outer).unwrap().hidden = true;

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 220.0, 20.0, LEFT));
        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 15.0, 15.0, PointerId::Touch(3)));

        assert!(take(&log).is_empty());
        assert!(!state.is_active());
    }

    #[test]
    fn test_forget_drops_references() {
        let (mut tree, _log) = scene();
        let mut state = InteractionState::new();
        let side = tree.find("side").unwrap();

        dispatch(&mut tree, &mut state, pointer(EventKind::Press, 220.0, 20.0, LEFT));
        assert!(state.is_pressed_by_any(side));

        state.forget(side);
        assert!(!state.is_pressed_by_any(side));
        assert_eq!(state.focused(), None);
    }
}
