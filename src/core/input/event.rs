//=========================================================================
// Host Event Types
//
// Defines the internal representation of events pushed by the host window
// system: focus changes, keyboard, pointer, wheel, touch, and resize.
//
// This module abstracts away platform-specific input (e.g. Winit) into
// a unified, scene-friendly format consumed by the Context and the input
// aggregators.
//
// Responsibilities:
// - Represent keys and buttons in a stable, portable way
// - Map physical keys onto the numeric key-code / key-name table used by
//   the keyboard aggregator
// - Provide equality and hashing semantics for per-frame coalescing
//
// Event Flow:
// ```text
// Host Window (Winit / fake host)
//         ↓
//    HostEvent (this module)
//         ↓
//    Context::dispatch()
//         ├─ Focus / Blur → focus() / blur()
//         └─ input → Keyboard, Pointer
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::hash::{Hash, Hasher};

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// The `Other` variant covers side buttons, macro buttons, and any
/// non-standard inputs. Touch contacts drive `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (typically left).
    Left,

    /// Secondary button (typically right).
    Right,

    /// Middle button (wheel click).
    Middle,

    /// Any other button.
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// Every key carries a numeric code and a normalized name (see
/// [`KeyCode::code`] and [`KeyCode::name`]); the keyboard aggregator
/// tracks both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    /// Directional navigation keys
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    //--- Modifier Keys ----------------------------------------------------

    Shift,
    Control,
    Alt,

    /// Left Command / Super / Windows key.
    MetaLeft,

    /// Right Command / Super / Windows key.
    MetaRight,

    /// Fallback for keys not explicitly mapped by the input layer.
    Unidentified,
}

impl KeyCode {
    /// Numeric key code (DOM `keyCode` table). `Unidentified` is `0`.
    pub fn code(self) -> u32 {
        use KeyCode::*;
        match self {
            Digit0 => 48, Digit1 => 49, Digit2 => 50, Digit3 => 51, Digit4 => 52,
            Digit5 => 53, Digit6 => 54, Digit7 => 55, Digit8 => 56, Digit9 => 57,

            KeyA => 65, KeyB => 66, KeyC => 67, KeyD => 68, KeyE => 69,
            KeyF => 70, KeyG => 71, KeyH => 72, KeyI => 73, KeyJ => 74,
            KeyK => 75, KeyL => 76, KeyM => 77, KeyN => 78, KeyO => 79,
            KeyP => 80, KeyQ => 81, KeyR => 82, KeyS => 83, KeyT => 84,
            KeyU => 85, KeyV => 86, KeyW => 87, KeyX => 88, KeyY => 89,
            KeyZ => 90,

            ArrowLeft => 37, ArrowUp => 38, ArrowRight => 39, ArrowDown => 40,

            Backspace => 8,
            Tab => 9,
            Enter => 13,
            Shift => 16,
            Control => 17,
            Alt => 18,
            Escape => 27,
            Space => 32,
            Delete => 46,
            MetaLeft => 91,
            MetaRight => 93,

            Unidentified => 0,
        }
    }

    /// Normalized key name used by alias mappings (e.g. `"w"`, `"up"`).
    pub fn name(self) -> &'static str {
        use KeyCode::*;
        match self {
            Digit0 => "0", Digit1 => "1", Digit2 => "2", Digit3 => "3", Digit4 => "4",
            Digit5 => "5", Digit6 => "6", Digit7 => "7", Digit8 => "8", Digit9 => "9",

            KeyA => "a", KeyB => "b", KeyC => "c", KeyD => "d", KeyE => "e",
            KeyF => "f", KeyG => "g", KeyH => "h", KeyI => "i", KeyJ => "j",
            KeyK => "k", KeyL => "l", KeyM => "m", KeyN => "n", KeyO => "o",
            KeyP => "p", KeyQ => "q", KeyR => "r", KeyS => "s", KeyT => "t",
            KeyU => "u", KeyV => "v", KeyW => "w", KeyX => "x", KeyY => "y",
            KeyZ => "z",

            ArrowLeft => "left", ArrowUp => "up", ArrowRight => "right", ArrowDown => "down",

            Backspace => "backspace",
            Tab => "tab",
            Enter => "enter",
            Shift => "shift",
            Control => "ctrl",
            Alt => "alt",
            Escape => "esc",
            Space => "space",
            Delete => "delete",
            MetaLeft => "left command",
            MetaRight => "right command",

            Unidentified => "unidentified",
        }
    }
}

//=== HostEvent ===========================================================

/// Event pushed by the host window system.
///
/// # Equality & Hashing Semantics
///
/// Discrete events compare by type + payload. Continuous events
/// (`PointerMoved`, `TouchMoved`, `Resized`) are equal regardless of their
/// coordinates, allowing per-frame coalescing (last value wins).
/// `Wheel` compares its deltas bitwise.
///
/// ```text
/// KeyDown(W)        == KeyDown(W)          ✓
/// KeyDown(W)        == KeyUp(W)            ✗
/// PointerMoved{..}  == PointerMoved{..}    ✓ (always equal)
/// ```
#[derive(Debug, Clone, Copy)]
pub enum HostEvent {
    /// Scene surface gained focus.
    Focus,

    /// Scene surface (or the whole window) lost focus.
    Blur,

    /// Key pressed.
    KeyDown(KeyCode),

    /// Key released.
    KeyUp(KeyCode),

    /// Pointer button pressed.
    PointerDown(MouseButton),

    /// Pointer button released.
    PointerUp(MouseButton),

    /// Pointer moved to a new position (pixels, top-left origin).
    PointerMoved { x: f32, y: f32 },

    /// Wheel scrolled, in lines.
    Wheel { dx: f32, dy: f32 },

    /// Touch contact started at a position.
    TouchStart { x: f32, y: f32 },

    /// Touch contact moved.
    TouchMoved { x: f32, y: f32 },

    /// Touch contact ended.
    TouchEnd,

    /// Surface resized (pixels).
    Resized { width: u32, height: u32 },
}

impl HostEvent {
    /// Returns `true` for events that only carry a latest value.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            Self::PointerMoved { .. } | Self::TouchMoved { .. } | Self::Resized { .. }
        )
    }

    /// Returns `true` for keyboard events.
    pub fn is_keyboard(&self) -> bool {
        matches!(self, Self::KeyDown(_) | Self::KeyUp(_))
    }
}

//--- Trait Implementations -----------------------------------------------

impl PartialEq for HostEvent {
    fn eq(&self, other: &Self) -> bool {
        use HostEvent::*;
        match (self, other) {
            (Focus, Focus) | (Blur, Blur) | (TouchEnd, TouchEnd) => true,
            (KeyDown(a), KeyDown(b)) | (KeyUp(a), KeyUp(b)) => a == b,
            (PointerDown(a), PointerDown(b)) | (PointerUp(a), PointerUp(b)) => a == b,
            (Wheel { dx: ax, dy: ay }, Wheel { dx: bx, dy: by }) => {
                ax.to_bits() == bx.to_bits() && ay.to_bits() == by.to_bits()
            }
            (TouchStart { x: ax, y: ay }, TouchStart { x: bx, y: by }) => {
                ax.to_bits() == bx.to_bits() && ay.to_bits() == by.to_bits()
            }
            // Continuous: coordinates ignored, always equal
            (PointerMoved { .. }, PointerMoved { .. }) => true,
            (TouchMoved { .. }, TouchMoved { .. }) => true,
            (Resized { .. }, Resized { .. }) => true,
            _ => false,
        }
    }
}

impl Eq for HostEvent {}

impl Hash for HostEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Self::KeyDown(key) | Self::KeyUp(key) => key.hash(state),
            Self::PointerDown(button) | Self::PointerUp(button) => button.hash(state),
            Self::Wheel { dx: a, dy: b } | Self::TouchStart { x: a, y: b } => {
                a.to_bits().hash(state);
                b.to_bits().hash(state);
            }
            // Continuous and payload-free: only discriminant matters
            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
