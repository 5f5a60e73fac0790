#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! Every interaction the risk client reacts to (typing into a field, pressing
//! a navigation key, scrolling a slider with the wheel, a terminal resize) is
//! expressed with the types in this module. All events derive `Clone`,
//! `PartialEq` and `Eq` so tests can build and compare them directly.
//!
//! # Design Notes
//!
//! - Mouse coordinates are 0-indexed.
//! - `KeyEventKind` defaults to `Press` when the terminal cannot tell.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;
#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A mouse event (clicks and wheel scrolls).
    Mouse(MouseEvent),

    /// Terminal was resized. Also sent once at startup with the initial size.
    Resize {
        /// New terminal width in columns.
        width: u16,
        /// New terminal height in rows.
        height: u16,
    },
}

impl Event {
    /// Convert a Crossterm event into an [`Event`].
    ///
    /// Returns `None` for events the client has no use for (paste, focus,
    /// media keys).
    #[must_use]
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => map_key_event(key).map(Event::Key),
            cte::Event::Mouse(mouse) => Some(Event::Mouse(map_mouse_event(mouse))),
            cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
            cte::Event::FocusGained | cte::Event::FocusLost | cte::Event::Paste(_) => None,
        }
    }

    /// Shorthand for a key press without modifiers.
    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code))
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Press and auto-repeat both count as activations; releases do not.
    #[must_use]
    pub const fn is_activation(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),
    /// Enter/Return key. This is the form's confirmation key.
    Enter,
    /// Escape key.
    Escape,
    /// Backspace key.
    Backspace,
    /// Tab key.
    Tab,
    /// Shift+Tab (back-tab).
    BackTab,
    /// Delete key.
    Delete,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up key.
    PageUp,
    /// Page Down key.
    PageDown,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Function key (F1-F24).
    F(u8),
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,
    /// Key is being held (repeat event).
    Repeat,
    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// The type of mouse event.
    pub kind: MouseEventKind,
    /// X coordinate (0-indexed, leftmost column is 0).
    pub x: u16,
    /// Y coordinate (0-indexed, topmost row is 0).
    pub y: u16,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Create a new mouse event.
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a mouse event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Get the position as a tuple.
    #[must_use]
    pub const fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    /// Wheel direction as a signed step count, `None` for non-wheel events.
    #[must_use]
    pub const fn wheel_delta(&self) -> Option<i32> {
        match self.kind {
            MouseEventKind::ScrollUp => Some(1),
            MouseEventKind::ScrollDown => Some(-1),
            _ => None,
        }
    }
}

/// The type of mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// Mouse button pressed down.
    Down(MouseButton),
    /// Mouse button released.
    Up(MouseButton),
    /// Mouse dragged while button held.
    Drag(MouseButton),
    /// Mouse moved (no button pressed).
    Moved,
    /// Mouse wheel scrolled up.
    ScrollUp,
    /// Mouse wheel scrolled down.
    ScrollDown,
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_event(event: cte::KeyEvent) -> Option<KeyEvent> {
    let code = map_key_code(event.code)?;
    let kind = match event.kind {
        cte::KeyEventKind::Press => KeyEventKind::Press,
        cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
        cte::KeyEventKind::Release => KeyEventKind::Release,
    };
    Some(KeyEvent {
        code,
        modifiers: map_modifiers(event.modifiers),
        kind,
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    match code {
        cte::KeyCode::Backspace => Some(KeyCode::Backspace),
        cte::KeyCode::Enter => Some(KeyCode::Enter),
        cte::KeyCode::Left => Some(KeyCode::Left),
        cte::KeyCode::Right => Some(KeyCode::Right),
        cte::KeyCode::Up => Some(KeyCode::Up),
        cte::KeyCode::Down => Some(KeyCode::Down),
        cte::KeyCode::Home => Some(KeyCode::Home),
        cte::KeyCode::End => Some(KeyCode::End),
        cte::KeyCode::PageUp => Some(KeyCode::PageUp),
        cte::KeyCode::PageDown => Some(KeyCode::PageDown),
        cte::KeyCode::Tab => Some(KeyCode::Tab),
        cte::KeyCode::BackTab => Some(KeyCode::BackTab),
        cte::KeyCode::Delete => Some(KeyCode::Delete),
        cte::KeyCode::F(n) => Some(KeyCode::F(n)),
        cte::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        cte::KeyCode::Esc => Some(KeyCode::Escape),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    mapped
}

#[cfg(not(target_arch = "wasm32"))]
fn map_mouse_event(event: cte::MouseEvent) -> MouseEvent {
    let kind = match event.kind {
        cte::MouseEventKind::Down(button) => MouseEventKind::Down(map_mouse_button(button)),
        cte::MouseEventKind::Up(button) => MouseEventKind::Up(map_mouse_button(button)),
        cte::MouseEventKind::Drag(button) => MouseEventKind::Drag(map_mouse_button(button)),
        cte::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
        cte::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
        // Horizontal wheels are not bound to anything.
        cte::MouseEventKind::Moved
        | cte::MouseEventKind::ScrollLeft
        | cte::MouseEventKind::ScrollRight => MouseEventKind::Moved,
    };

    MouseEvent::new(kind, event.column, event.row).with_modifiers(map_modifiers(event.modifiers))
}

#[cfg(not(target_arch = "wasm32"))]
fn map_mouse_button(button: cte::MouseButton) -> MouseButton {
    match button {
        cte::MouseButton::Left => MouseButton::Left,
        cte::MouseButton::Right => MouseButton::Right,
        cte::MouseButton::Middle => MouseButton::Middle,
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crossterm::event as ct_event;

    #[test]
    fn release_is_not_an_activation() {
        let press = KeyEvent::new(KeyCode::Enter);
        assert!(press.is_activation());
        assert!(press.with_kind(KeyEventKind::Repeat).is_activation());
        assert!(!press.with_kind(KeyEventKind::Release).is_activation());
    }

    #[test]
    fn key_event_combined_modifiers() {
        let event =
            KeyEvent::new(KeyCode::Char('s')).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(event.ctrl());
        assert!(event.shift());
        assert!(!event.alt());
    }

    #[test]
    fn wheel_delta_only_for_scrolls() {
        assert_eq!(
            MouseEvent::new(MouseEventKind::ScrollUp, 0, 0).wheel_delta(),
            Some(1)
        );
        assert_eq!(
            MouseEvent::new(MouseEventKind::ScrollDown, 0, 0).wheel_delta(),
            Some(-1)
        );
        assert_eq!(
            MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 0, 0).wheel_delta(),
            None
        );
    }

    #[test]
    fn crossterm_enter_maps_to_enter() {
        let ct = ct_event::Event::Key(ct_event::KeyEvent::new(
            ct_event::KeyCode::Enter,
            ct_event::KeyModifiers::NONE,
        ));
        assert_eq!(Event::from_crossterm(ct), Some(Event::key(KeyCode::Enter)));
    }

    #[test]
    fn crossterm_control_maps_to_ctrl() {
        let ct = ct_event::Event::Key(ct_event::KeyEvent::new(
            ct_event::KeyCode::Char('c'),
            ct_event::KeyModifiers::CONTROL,
        ));
        let Some(Event::Key(key)) = Event::from_crossterm(ct) else {
            panic!("expected key event");
        };
        assert!(key.ctrl());
    }

    #[test]
    fn crossterm_paste_and_focus_are_dropped() {
        assert_eq!(
            Event::from_crossterm(ct_event::Event::Paste("x".into())),
            None
        );
        assert_eq!(Event::from_crossterm(ct_event::Event::FocusLost), None);
    }

    #[test]
    fn crossterm_resize_carries_size() {
        assert_eq!(
            Event::from_crossterm(ct_event::Event::Resize(80, 24)),
            Some(Event::Resize {
                width: 80,
                height: 24
            })
        );
    }

    #[test]
    fn crossterm_scroll_maps_to_wheel() {
        let ct = ct_event::Event::Mouse(ct_event::MouseEvent {
            kind: ct_event::MouseEventKind::ScrollDown,
            column: 4,
            row: 7,
            modifiers: ct_event::KeyModifiers::NONE,
        });
        let Some(Event::Mouse(mouse)) = Event::from_crossterm(ct) else {
            panic!("expected mouse event");
        };
        assert_eq!(mouse.kind, MouseEventKind::ScrollDown);
        assert_eq!(mouse.position(), (4, 7));
    }

    #[test]
    fn modifiers_default() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }
}
