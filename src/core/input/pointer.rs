//=========================================================================
// Pointer
//=========================================================================
//
// Mouse and touch aggregation with per-tick deltas.
//
// Architecture:
// ```text
//   HostEvent ──on_input──> pending (motion, wheel, button transitions)
//                           held buttons, position
//   Context::reset() ──on_reset──> latch: pending → per-tick snapshot
//   Context::blur()  ──on_blur───> release held buttons, drop pending
// ```
//
// Every consumer within one tick reads the same latched values, no matter
// how many events arrive while the tick is running.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

//=== External Crates =====================================================

use glam::Vec2;
use log::warn;

//=== Internal Dependencies ===============================================

use super::event::{HostEvent, MouseButton};
use crate::core::context::{Context, SubscriptionId};

//=== PointerState ========================================================

/// Held buttons and position, plus the latched per-tick deltas.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    //--- Persistent State ------------------------------------------------
    position: Option<Vec2>,
    buttons_down: HashSet<MouseButton>,

    //--- Pending (accumulated until the next reset) ----------------------
    pending_delta: Vec2,
    pending_wheel: Vec2,
    pending_pressed: HashSet<MouseButton>,
    pending_released: HashSet<MouseButton>,

    //--- Latched for the current tick ------------------------------------
    delta: Vec2,
    wheel: Vec2,
    pressed: HashSet<MouseButton>,
    released: HashSet<MouseButton>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    //=====================================================================
    // Query API
    //=====================================================================

    /// Last known position in pixels (top-left origin).
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Motion accumulated during the previous tick.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Wheel lines accumulated during the previous tick.
    pub fn wheel(&self) -> Vec2 {
        self.wheel
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// `true` if `button` went down during the previous tick.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }

    /// `true` if `button` went up during the previous tick.
    pub fn is_button_released(&self, button: MouseButton) -> bool {
        self.released.contains(&button)
    }

    /// `true` while any button (or a touch contact) is held.
    pub fn is_dragging(&self) -> bool {
        !self.buttons_down.is_empty()
    }

    //=====================================================================
    // Event Processing
    //=====================================================================

    pub(crate) fn apply(&mut self, event: &HostEvent) {
        match *event {
            HostEvent::PointerDown(button) => self.press(button),
            HostEvent::PointerUp(button) => self.release(button),
            HostEvent::PointerMoved { x, y } | HostEvent::TouchMoved { x, y } => {
                self.move_to(Vec2::new(x, y));
            }
            HostEvent::TouchStart { x, y } => {
                // A new contact jumps; it must not register as motion.
                self.position = Some(Vec2::new(x, y));
                self.press(MouseButton::Left);
            }
            HostEvent::TouchEnd => self.release(MouseButton::Left),
            HostEvent::Wheel { dx, dy } => self.pending_wheel += Vec2::new(dx, dy),
            _ => {}
        }
    }

    fn press(&mut self, button: MouseButton) {
        if self.buttons_down.insert(button) {
            self.pending_pressed.insert(button);
        }
    }

    fn release(&mut self, button: MouseButton) {
        if self.buttons_down.remove(&button) {
            self.pending_released.insert(button);
        }
    }

    fn move_to(&mut self, position: Vec2) {
        if let Some(last) = self.position {
            self.pending_delta += position - last;
        }
        self.position = Some(position);
    }

    /// Moves pending values into the per-tick snapshot.
    pub fn latch(&mut self) {
        self.delta = std::mem::take(&mut self.pending_delta);
        self.wheel = std::mem::take(&mut self.pending_wheel);
        self.pressed = std::mem::take(&mut self.pending_pressed);
        self.released = std::mem::take(&mut self.pending_released);
    }

    /// Releases every button and drops pending motion.
    pub fn release_all(&mut self) {
        self.buttons_down.clear();
        self.pending_delta = Vec2::ZERO;
        self.pending_wheel = Vec2::ZERO;
        self.pending_pressed.clear();
        self.pending_released.clear();
    }
}

//=== Pointer =============================================================

struct PointerShared {
    state: Rc<RefCell<PointerState>>,
    context: Weak<Context>,
    subscriptions: [SubscriptionId; 3],
}

impl Drop for PointerShared {
    fn drop(&mut self) {
        if let Some(ctx) = self.context.upgrade() {
            for id in self.subscriptions {
                ctx.unsubscribe(id);
            }
        }
    }
}

/// Pointer aggregator bound to one context.
#[derive(Clone)]
pub struct Pointer {
    shared: Rc<PointerShared>,
}

impl Pointer {
    pub fn new(ctx: &Rc<Context>) -> Self {
        let state = Rc::new(RefCell::new(PointerState::new()));

        let on_input = {
            let state = Rc::clone(&state);
            ctx.on_input(move |event| match state.try_borrow_mut() {
                Ok(mut state) => state.apply(event),
                Err(_) => warn!("Pointer state busy, dropping {:?}", event),
            })
        };

        let on_reset = {
            let state = Rc::clone(&state);
            ctx.on_reset(move |_| {
                if let Ok(mut state) = state.try_borrow_mut() {
                    state.latch();
                }
            })
        };

        let on_blur = {
            let state = Rc::clone(&state);
            ctx.on_blur(move |_| {
                if let Ok(mut state) = state.try_borrow_mut() {
                    state.release_all();
                }
            })
        };

        Self {
            shared: Rc::new(PointerShared {
                state,
                context: Rc::downgrade(ctx),
                subscriptions: [on_input, on_reset, on_blur],
            }),
        }
    }

    pub fn state(&self) -> Ref<'_, PointerState> {
        self.shared.state.borrow()
    }

    pub fn position(&self) -> Option<Vec2> {
        self.state().position()
    }

    pub fn delta(&self) -> Vec2 {
        self.state().delta()
    }

    pub fn wheel(&self) -> Vec2 {
        self.state().wheel()
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.state().is_button_down(button)
    }

    pub fn is_dragging(&self) -> bool {
        self.state().is_dragging()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ContextConfig;
    use crate::core::host::{HeadlessBackend, HeadlessHost};

    fn setup() -> (Rc<Context>, Pointer) {
        let ctx = Context::new(
            Rc::new(HeadlessHost::default()),
            Rc::new(HeadlessBackend::new()),
            ContextConfig::default(),
        );
        let pointer = Pointer::new(&ctx);
        (ctx, pointer)
    }

    fn moved(x: f32, y: f32) -> HostEvent {
        HostEvent::PointerMoved { x, y }
    }

    //=====================================================================
    // Motion
    //=====================================================================

    #[test]
    fn first_position_produces_no_delta() {
        let (ctx, pointer) = setup();
        ctx.dispatch(&moved(10.0, 10.0));
        ctx.reset();

        assert_eq!(pointer.position(), Some(Vec2::new(10.0, 10.0)));
        assert_eq!(pointer.delta(), Vec2::ZERO);
    }

    #[test]
    fn motion_accumulates_until_reset() {
        let (ctx, pointer) = setup();
        ctx.dispatch(&moved(0.0, 0.0));
        ctx.dispatch(&moved(3.0, 1.0));
        ctx.dispatch(&moved(5.0, 4.0));

        assert_eq!(pointer.delta(), Vec2::ZERO, "not latched yet");
        ctx.reset();
        assert_eq!(pointer.delta(), Vec2::new(5.0, 4.0));

        ctx.reset();
        assert_eq!(pointer.delta(), Vec2::ZERO, "no motion during last tick");
    }

    #[test]
    fn wheel_sums_within_tick() {
        let (ctx, pointer) = setup();
        ctx.dispatch(&HostEvent::Wheel { dx: 0.0, dy: 1.0 });
        ctx.dispatch(&HostEvent::Wheel { dx: 0.5, dy: 2.0 });
        ctx.reset();

        assert_eq!(pointer.wheel(), Vec2::new(0.5, 3.0));
    }

    //=====================================================================
    // Buttons
    //=====================================================================

    #[test]
    fn button_transitions_latch_per_tick() {
        let (ctx, pointer) = setup();
        ctx.dispatch(&HostEvent::PointerDown(MouseButton::Right));
        ctx.reset();

        assert!(pointer.is_button_down(MouseButton::Right));
        assert!(pointer.state().is_button_pressed(MouseButton::Right));

        ctx.reset();
        assert!(!pointer.state().is_button_pressed(MouseButton::Right));
        assert!(pointer.is_dragging());

        ctx.dispatch(&HostEvent::PointerUp(MouseButton::Right));
        ctx.reset();
        assert!(pointer.state().is_button_released(MouseButton::Right));
        assert!(!pointer.is_dragging());
    }

    #[test]
    fn touch_drives_left_button() {
        let (ctx, pointer) = setup();
        ctx.dispatch(&HostEvent::TouchStart { x: 100.0, y: 50.0 });
        ctx.dispatch(&HostEvent::TouchMoved { x: 90.0, y: 60.0 });
        ctx.reset();

        assert!(pointer.is_button_down(MouseButton::Left));
        assert_eq!(pointer.delta(), Vec2::new(-10.0, 10.0));

        ctx.dispatch(&HostEvent::TouchEnd);
        assert!(!pointer.is_dragging());
    }

    #[test]
    fn blur_releases_buttons_and_drops_pending_motion() {
        let (ctx, pointer) = setup();
        ctx.dispatch(&moved(0.0, 0.0));
        ctx.dispatch(&HostEvent::PointerDown(MouseButton::Left));
        ctx.dispatch(&moved(20.0, 0.0));

        ctx.blur();
        ctx.reset();

        assert!(!pointer.is_dragging());
        assert_eq!(pointer.delta(), Vec2::ZERO);
    }

    #[test]
    fn pointer_events_pass_while_unfocused() {
        let (ctx, pointer) = setup();
        assert!(!ctx.has_focus());
        ctx.dispatch(&HostEvent::PointerDown(MouseButton::Middle));
        assert!(pointer.is_button_down(MouseButton::Middle));
    }
}
