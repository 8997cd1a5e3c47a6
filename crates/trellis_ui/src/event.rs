//! Interaction events.
//!
//! Events are built fresh every tick by the input synthesizer (or derived
//! from another event by the dispatcher) and dropped once dispatch ends.

use std::time::{Duration, Instant};

use crate::input::{Key, MouseButton};
use crate::widget::NodeId;

/// Kind of an interaction event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer moved over a node.
    Move,
    /// Pointer entered a node.
    In,
    /// Pointer left a node.
    Out,
    /// Pointer pressed on a node.
    Press,
    /// Pointer released over a node.
    Release,
    /// Press and release on the same node (a click).
    Pressed,
    /// Pointer moved while a node holds its press, wherever the pointer is.
    GlobalMove,
    /// Pointer released while a node holds its press, wherever the pointer is.
    GlobalRelease,
    /// Node gained focus.
    Focus,
    /// Node lost focus.
    Unfocus,
    /// Key went down, or auto-repeated.
    KeyPress,
    /// Key went up.
    KeyRelease,
    /// Character input, independent of physical keys.
    KeyInput,
}

/// Identity of a pointer within the press/release diff.
///
/// Mouse buttons and touch contacts share one namespace so that press
/// tracking does not care where a pointer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    /// Cursor movement with no particular button. Used for hover.
    Ambient,
    /// A mouse button.
    Mouse(MouseButton),
    /// A touch contact.
    Touch(u64),
}

/// Pointer payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInfo {
    /// X in render-target coordinates.
    pub x: f32,
    /// Y in render-target coordinates.
    pub y: f32,
    /// X movement since the previous sample.
    pub dx: f32,
    /// Y movement since the previous sample.
    pub dy: f32,
    /// X relative to the receiving node's left edge. Set at delivery.
    pub relative_x: f32,
    /// Y relative to the receiving node's top edge. Set at delivery.
    pub relative_y: f32,
    /// Which pointer this is.
    pub pointer: PointerId,
}

impl PointerInfo {
    /// Creates a pointer payload with no movement.
    #[must_use]
    pub const fn at(x: f32, y: f32, pointer: PointerId) -> Self {
        Self {
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            relative_x: 0.0,
            relative_y: 0.0,
            pointer,
        }
    }

    /// Sets the movement delta.
    #[must_use]
    pub const fn with_delta(mut self, dx: f32, dy: f32) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }
}

/// Keyboard payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInfo {
    /// Physical key, absent for character input.
    pub key: Option<Key>,
    /// Input character, present only for [`EventKind::KeyInput`].
    pub rune: Option<char>,
    /// Auto-repeat count. Zero for the initial press.
    pub repeat: u32,
}

/// Kind-specific event data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventDetail {
    /// Pointer events, and focus gained through a press.
    Pointer(PointerInfo),
    /// Keyboard events.
    Key(KeyInfo),
    /// Focus changes with no pointer involved.
    None,
}

/// A single interaction event.
#[derive(Debug, Clone)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// When the sample producing it was taken.
    pub timestamp: Instant,
    /// Press-to-release or press-to-now time where meaningful, else zero.
    pub duration: Duration,
    /// Node currently receiving the event. Set at delivery.
    pub target: Option<NodeId>,
    /// Kind-specific payload.
    pub detail: EventDetail,
    canceled: bool,
}

impl Event {
    /// Creates a pointer event.
    #[must_use]
    pub const fn pointer(kind: EventKind, timestamp: Instant, info: PointerInfo) -> Self {
        Self {
            kind,
            timestamp,
            duration: Duration::ZERO,
            target: None,
            detail: EventDetail::Pointer(info),
            canceled: false,
        }
    }

    /// Creates a keyboard event.
    #[must_use]
    pub const fn key(kind: EventKind, timestamp: Instant, info: KeyInfo) -> Self {
        Self {
            kind,
            timestamp,
            duration: Duration::ZERO,
            target: None,
            detail: EventDetail::Key(info),
            canceled: false,
        }
    }

    /// Creates an event with no payload.
    #[must_use]
    pub const fn bare(kind: EventKind, timestamp: Instant) -> Self {
        Self {
            kind,
            timestamp,
            duration: Duration::ZERO,
            target: None,
            detail: EventDetail::None,
            canceled: false,
        }
    }

    /// Sets the duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Derives a fresh, uncanceled event of another kind sharing this
    /// event's timestamp, duration, target and payload.
    #[must_use]
    pub fn derive(&self, kind: EventKind) -> Self {
        Self {
            kind,
            timestamp: self.timestamp,
            duration: self.duration,
            target: self.target,
            detail: self.detail,
            canceled: false,
        }
    }

    /// Stops further pass-1 delivery of this event.
    pub fn cancel(&mut self) {
        self.canceled = true;
    }

    /// Returns true if a handler canceled the event.
    #[must_use]
    pub const fn canceled(&self) -> bool {
        self.canceled
    }

    /// Pointer payload, if any.
    #[must_use]
    pub fn pointer_info(&self) -> Option<&PointerInfo> {
        match &self.detail {
            EventDetail::Pointer(info) => Some(info),
            _ => None,
        }
    }

    /// Key payload, if any.
    #[must_use]
    pub fn key_info(&self) -> Option<&KeyInfo> {
        match &self.detail {
            EventDetail::Key(info) => Some(info),
            _ => None,
        }
    }

    /// Pointer identity, if this is a pointer event.
    #[must_use]
    pub fn pointer_id(&self) -> Option<PointerId> {
        self.pointer_info().map(|info| info.pointer)
    }

    pub(crate) fn retarget(&mut self, target: NodeId, origin_x: f32, origin_y: f32) {
        self.target = Some(target);
        if let EventDetail::Pointer(info) = &mut self.detail {
            info.relative_x = info.x - origin_x;
            info.relative_y = info.y - origin_y;
        }
    }
}
