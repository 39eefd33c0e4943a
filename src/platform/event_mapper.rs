//=========================================================================
// Platform Event Mapper
//=========================================================================
//
// Converts Winit window events to `HostEvent`s.
//
// Mapping:
// ```text
//   KeyboardInput (non-repeat) ──> KeyDown / KeyUp
//   MouseInput                 ──> PointerDown / PointerUp
//   CursorMoved                ──> PointerMoved
//   MouseWheel                 ──> Wheel (lines)
//   Touch                      ──> TouchStart / TouchMoved / TouchEnd
//   Focused                    ──> Focus / Blur
//   Resized                    ──> Resized
//   anything else              ──> None
// ```
//
//=========================================================================

//=== External Crates =====================================================

use winit::event::{
    ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, Touch, TouchPhase,
    WindowEvent,
};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

//=== Internal Dependencies ===============================================

use crate::core::input::event::{HostEvent, KeyCode, MouseButton};

/// Pixel scroll distance treated as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

//=== Key Conversion ======================================================

impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Numeric keys -----------------------------------------------------
            Digit0 => KeyCode::Digit0, Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2, Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4, Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6, Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8, Digit9 => KeyCode::Digit9,

            //--- Alphabetic keys --------------------------------------------------
            KeyA => KeyCode::KeyA, KeyB => KeyCode::KeyB, KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD, KeyE => KeyCode::KeyE, KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG, KeyH => KeyCode::KeyH, KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ, KeyK => KeyCode::KeyK, KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM, KeyN => KeyCode::KeyN, KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP, KeyQ => KeyCode::KeyQ, KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS, KeyT => KeyCode::KeyT, KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV, KeyW => KeyCode::KeyW, KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY, KeyZ => KeyCode::KeyZ,

            //--- Arrow keys -------------------------------------------------------
            ArrowDown => KeyCode::ArrowDown, ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight, ArrowUp => KeyCode::ArrowUp,

            //--- Special keys -----------------------------------------------------
            Space => KeyCode::Space,
            Enter | NumpadEnter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,

            //--- Modifiers --------------------------------------------------------
            ShiftLeft | ShiftRight => KeyCode::Shift,
            ControlLeft | ControlRight => KeyCode::Control,
            AltLeft | AltRight => KeyCode::Alt,
            SuperLeft => KeyCode::MetaLeft,
            SuperRight => KeyCode::MetaRight,

            //--- Fallback ---------------------------------------------------------
            _ => KeyCode::Unidentified,
        }
    }
}

//=== Mouse Conversion ====================================================

impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

//=== Full Event Conversion ===============================================

/// Maps one window event, or `None` when the scene has no use for it.
pub(crate) fn map_window_event(event: &WindowEvent) -> Option<HostEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => map_key_event(event),

        WindowEvent::MouseInput { state, button, .. } => {
            let button = MouseButton::from(*button);
            Some(match state {
                ElementState::Pressed => HostEvent::PointerDown(button),
                ElementState::Released => HostEvent::PointerUp(button),
            })
        }

        WindowEvent::CursorMoved { position, .. } => Some(HostEvent::PointerMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),

        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => (
                    pos.x as f32 / PIXELS_PER_LINE,
                    pos.y as f32 / PIXELS_PER_LINE,
                ),
            };
            Some(HostEvent::Wheel { dx, dy })
        }

        WindowEvent::Touch(touch) => Some(map_touch(touch)),

        WindowEvent::Focused(true) => Some(HostEvent::Focus),
        WindowEvent::Focused(false) => Some(HostEvent::Blur),

        WindowEvent::Resized(size) => Some(HostEvent::Resized {
            width: size.width,
            height: size.height,
        }),

        _ => None,
    }
}

fn map_key_event(event: &KeyEvent) -> Option<HostEvent> {
    if event.repeat {
        return None;
    }

    let key = match event.physical_key {
        PhysicalKey::Code(code) => KeyCode::from(code),
        PhysicalKey::Unidentified(_) => KeyCode::Unidentified,
    };

    Some(match event.state {
        ElementState::Pressed => HostEvent::KeyDown(key),
        ElementState::Released => HostEvent::KeyUp(key),
    })
}

fn map_touch(touch: &Touch) -> HostEvent {
    let (x, y) = (touch.location.x as f32, touch.location.y as f32);
    match touch.phase {
        TouchPhase::Started => HostEvent::TouchStart { x, y },
        TouchPhase::Moved => HostEvent::TouchMoved { x, y },
        TouchPhase::Ended | TouchPhase::Cancelled => HostEvent::TouchEnd,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
