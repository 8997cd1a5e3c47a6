//! Input synthesis.
//!
//! The host polls raw device state once per tick. [`InputSynthesizer`]
//! diffs each sample against the previous one and turns the difference into
//! discrete [`Event`]s: presses, releases, moves, key presses with
//! auto-repeat, key releases and character input.
//!
//! The synthesizer owns the previous-tick snapshot and nothing else. It has
//! no knowledge of nodes.
//!
//! Buttons, keys and touches are sets: a sample that lists one twice is
//! read as listing it once.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::event::{Event, EventKind, KeyInfo, PointerId, PointerInfo};

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape key.
    Escape,
    /// Enter/Return key.
    Enter,
    /// Tab key.
    Tab,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Space bar.
    Space,
    /// Shift (either side).
    Shift,
    /// Control (either side).
    Control,
    /// Alt (either side).
    Alt,
    /// Letter A.
    A,
    /// Letter B.
    B,
    /// Letter C.
    C,
    /// Letter D.
    D,
    /// Letter E.
    E,
    /// Letter F.
    F,
    /// Letter G.
    G,
    /// Letter H.
    H,
    /// Letter I.
    I,
    /// Letter J.
    J,
    /// Letter K.
    K,
    /// Letter L.
    L,
    /// Letter M.
    M,
    /// Letter N.
    N,
    /// Letter O.
    O,
    /// Letter P.
    P,
    /// Letter Q.
    Q,
    /// Letter R.
    R,
    /// Letter S.
    S,
    /// Letter T.
    T,
    /// Letter U.
    U,
    /// Letter V.
    V,
    /// Letter W.
    W,
    /// Letter X.
    X,
    /// Letter Y.
    Y,
    /// Letter Z.
    Z,
    /// Digit 0 on the main row.
    Num0,
    /// Digit 1 on the main row.
    Num1,
    /// Digit 2 on the main row.
    Num2,
    /// Digit 3 on the main row.
    Num3,
    /// Digit 4 on the main row.
    Num4,
    /// Digit 5 on the main row.
    Num5,
    /// Digit 6 on the main row.
    Num6,
    /// Digit 7 on the main row.
    Num7,
    /// Digit 8 on the main row.
    Num8,
    /// Digit 9 on the main row.
    Num9,
    /// Function key 1.
    F1,
    /// Function key 2.
    F2,
    /// Function key 3.
    F3,
    /// Function key 4.
    F4,
    /// Function key 5.
    F5,
    /// Function key 6.
    F6,
    /// Function key 7.
    F7,
    /// Function key 8.
    F8,
    /// Function key 9.
    F9,
    /// Function key 10.
    F10,
    /// Function key 11.
    F11,
    /// Function key 12.
    F12,
    /// Any other key, by host scan code.
    Other(u32),
}

/// An active touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Host-assigned contact id, stable while the contact is down.
    pub id: u64,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
}

/// Raw device state for one tick, as polled by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    /// Cursor position in window coordinates.
    pub cursor: (f32, f32),
    /// Physical window size. When it differs from the logical render
    /// target, cursor positions are rescaled into target coordinates.
    pub window_size: Option<(f32, f32)>,
    /// Mouse buttons currently held.
    pub buttons: Vec<MouseButton>,
    /// Touch contacts currently down.
    pub touches: Vec<TouchPoint>,
    /// Keys currently held.
    pub keys: Vec<Key>,
    /// Characters typed since the last poll.
    pub runes: Vec<char>,
}

impl DeviceState {
    /// Creates an idle sample with the cursor at `(x, y)`.
    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            cursor: (x, y),
            ..Self::default()
        }
    }

    /// Adds a held mouse button.
    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.buttons.push(button);
        self
    }

    /// Adds an active touch.
    #[must_use]
    pub fn with_touch(mut self, id: u64, x: f32, y: f32) -> Self {
        self.touches.push(TouchPoint { id, x, y });
        self
    }

    /// Adds a held key.
    #[must_use]
    pub fn with_key(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }

    /// Adds typed characters.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.runes.extend(text.chars());
        self
    }
}

/// Source of raw device samples, injected by the host.
pub trait DevicePoller {
    /// Samples the devices. Called exactly once per tick.
    fn poll(&mut self) -> DeviceState;
}

/// A poller that replays queued samples.
///
/// Once the queue is empty the last sample repeats, which reads as "nothing
/// changed" to the synthesizer.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDevice {
    queue: VecDeque<DeviceState>,
    last: DeviceState,
}

impl ScriptedDevice {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a sample.
    pub fn push(&mut self, state: DeviceState) -> &mut Self {
        self.queue.push_back(state);
        self
    }

    /// Number of samples not yet polled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl DevicePoller for ScriptedDevice {
    fn poll(&mut self) -> DeviceState {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last.clone()
    }
}

#[derive(Debug, Clone, Copy)]
struct HeldButton {
    button: MouseButton,
    since: Instant,
}

#[derive(Debug, Clone, Copy)]
struct HeldTouch {
    id: u64,
    since: Instant,
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy)]
struct HeldKey {
    key: Key,
    since: Instant,
    next_repeat: Instant,
    repeats: u32,
}

/// Diffs device samples into events.
#[derive(Debug, Clone)]
pub struct InputSynthesizer {
    repeat_delay: Duration,
    repeat_interval: Duration,
    clamp_pointers: bool,
    cursor: Option<(f32, f32)>,
    buttons: Vec<HeldButton>,
    touches: Vec<HeldTouch>,
    keys: Vec<HeldKey>,
}

impl InputSynthesizer {
    /// Creates a synthesizer with no previous sample.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            repeat_delay: config.repeat_delay(),
            repeat_interval: config.repeat_interval(),
            clamp_pointers: config.clamp_pointers,
            cursor: None,
            buttons: Vec::new(),
            touches: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// Diffs `state` against the previous sample.
    ///
    /// `target` is the logical render-target size, used for cursor rescaling
    /// and pointer clamping. Events come out in a fixed order: mouse
    /// presses, releases and moves, then touch presses, releases and moves,
    /// then key presses, releases, repeats and character input.
    pub fn synthesize(&mut self, state: &DeviceState, target: Option<(f32, f32)>, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();
        self.mouse_events(state, target, now, &mut events);
        self.touch_events(state, now, &mut events);
        self.key_events(state, now, &mut events);
        events
    }

    /// Returns true while any button, touch or key is held.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.buttons.is_empty() || !self.touches.is_empty() || !self.keys.is_empty()
    }

    /// Forgets everything held, without producing release events.
    pub fn reset(&mut self) {
        self.buttons.clear();
        self.touches.clear();
        self.keys.clear();
    }

    fn mouse_events(&mut self, state: &DeviceState, target: Option<(f32, f32)>, now: Instant, events: &mut Vec<Event>) {
        let (x, y) = rescale(state.cursor, state.window_size, target);

        if self.clamp_pointers {
            if let Some((width, height)) = target {
                if x < 0.0 || y < 0.0 || x >= width || y >= height {
                    return;
                }
            }
        }

        let buttons = distinct(&state.buttons, |&button| button);

        let (last_x, last_y) = self.cursor.unwrap_or((x, y));
        let (dx, dy) = (x - last_x, y - last_y);
        self.cursor = Some((x, y));

        let info = |pointer| PointerInfo::at(x, y, pointer).with_delta(dx, dy);

        for &button in &buttons {
            if !self.buttons.iter().any(|held| held.button == button) {
                events.push(Event::pointer(EventKind::Press, now, info(PointerId::Mouse(button))));
            }
        }

        for held in &self.buttons {
            if !buttons.contains(&held.button) {
                events.push(
                    Event::pointer(EventKind::Release, now, info(PointerId::Mouse(held.button)))
                        .with_duration(now.saturating_duration_since(held.since)),
                );
            }
        }

        if dx != 0.0 || dy != 0.0 {
            for held in self.buttons.iter().filter(|held| buttons.contains(&held.button)) {
                events.push(
                    Event::pointer(EventKind::Move, now, info(PointerId::Mouse(held.button)))
                        .with_duration(now.saturating_duration_since(held.since)),
                );
            }
            events.push(Event::pointer(EventKind::Move, now, info(PointerId::Ambient)));
        }

        let previous = std::mem::take(&mut self.buttons);
        self.buttons = buttons
            .into_iter()
            .map(|button| {
                previous
                    .iter()
                    .find(|held| held.button == button)
                    .copied()
                    .unwrap_or(HeldButton { button, since: now })
            })
            .collect();
    }

    fn touch_events(&mut self, state: &DeviceState, now: Instant, events: &mut Vec<Event>) {
        let touches = distinct(&state.touches, |touch| touch.id);

        for touch in &touches {
            if !self.touches.iter().any(|held| held.id == touch.id) {
                events.push(Event::pointer(
                    EventKind::Press,
                    now,
                    PointerInfo::at(touch.x, touch.y, PointerId::Touch(touch.id)),
                ));
            }
        }

        for held in &self.touches {
            if !touches.iter().any(|touch| touch.id == held.id) {
                events.push(
                    Event::pointer(
                        EventKind::Release,
                        now,
                        PointerInfo::at(held.x, held.y, PointerId::Touch(held.id)),
                    )
                    .with_duration(now.saturating_duration_since(held.since)),
                );
            }
        }

        let previous = std::mem::take(&mut self.touches);
        for touch in &touches {
            let held = match previous.iter().find(|held| held.id == touch.id) {
                Some(held) => {
                    let (dx, dy) = (touch.x - held.x, touch.y - held.y);
                    if dx != 0.0 || dy != 0.0 {
                        events.push(
                            Event::pointer(
                                EventKind::Move,
                                now,
                                PointerInfo::at(touch.x, touch.y, PointerId::Touch(touch.id)).with_delta(dx, dy),
                            )
                            .with_duration(now.saturating_duration_since(held.since)),
                        );
                    }
                    HeldTouch {
                        x: touch.x,
                        y: touch.y,
                        ..*held
                    }
                }
                None => HeldTouch {
                    id: touch.id,
                    since: now,
                    x: touch.x,
                    y: touch.y,
                },
            };
            self.touches.push(held);
        }
    }

    fn key_events(&mut self, state: &DeviceState, now: Instant, events: &mut Vec<Event>) {
        let key_event = |kind, key, repeat| {
            Event::key(
                kind,
                now,
                KeyInfo {
                    key: Some(key),
                    rune: None,
                    repeat,
                },
            )
        };

        let keys = distinct(&state.keys, |&key| key);

        for &key in &keys {
            if !self.keys.iter().any(|held| held.key == key) {
                events.push(key_event(EventKind::KeyPress, key, 0));
            }
        }

        for held in &self.keys {
            if !keys.contains(&held.key) {
                events.push(
                    key_event(EventKind::KeyRelease, held.key, held.repeats)
                        .with_duration(now.saturating_duration_since(held.since)),
                );
            }
        }

        let previous = std::mem::take(&mut self.keys);
        for key in keys {
            let held = match previous.iter().find(|held| held.key == key) {
                Some(&held) if held.next_repeat <= now => {
                    let repeats = held.repeats + 1;
                    events.push(
                        key_event(EventKind::KeyPress, key, repeats)
                            .with_duration(now.saturating_duration_since(held.since)),
                    );
                    HeldKey {
                        repeats,
                        next_repeat: now + self.repeat_interval,
                        ..held
                    }
                }
                Some(&held) => held,
                None => HeldKey {
                    key,
                    since: now,
                    next_repeat: now + self.repeat_delay,
                    repeats: 0,
                },
            };
            self.keys.push(held);
        }

        for &rune in &state.runes {
            events.push(Event::key(
                EventKind::KeyInput,
                now,
                KeyInfo {
                    key: None,
                    rune: Some(rune),
                    repeat: 0,
                },
            ));
        }
    }
}

/// First occurrence of each item by `identity`, in sample order.
fn distinct<T: Copy, I: Eq + Hash>(items: &[T], identity: impl Fn(&T) -> I) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().filter(|&item| seen.insert(identity(item))).copied().collect()
}

/// Maps a window-space cursor into render-target space.
fn rescale(cursor: (f32, f32), window: Option<(f32, f32)>, target: Option<(f32, f32)>) -> (f32, f32) {
    match (window, target) {
        (Some((ww, wh)), Some((tw, th))) if ww > 0.0 && wh > 0.0 && (ww, wh) != (tw, th) => {
            (cursor.0 * tw / ww, cursor.1 * th / wh)
        }
        _ => cursor,
    }
}
