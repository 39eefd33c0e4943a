//=========================================================================
// Keyboard
//=========================================================================
//
// Aggregates key press/release events into queryable logical state.
//
// Architecture:
// ```text
//   Context::dispatch(KeyDown/KeyUp) ──on_input──> KeyboardState
//                                                   ├─ keycodes: code → pressed
//                                                   └─ keys:     name → pressed
//   Context::blur() ──on_blur──> KeyboardState::reset()
//                       └─ state borrowed ─> pending reset, applied before
//                                            the next read or event
//
//   value("up") = OR over AliasMap["up"] of keys[name]
// ```
//
// Key events never reach the state while the context is unfocused; the
// context drops them before notifying input observers.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

//=== External Crates =====================================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::alias::AliasMap;
use super::event::{HostEvent, KeyCode};
use crate::core::command::{CommandHandle, CommandScope};
use crate::core::context::{Context, SubscriptionId};
use crate::core::error::Result;

//=== KeyboardState =======================================================

/// Pressed state by numeric code and by key name, plus the alias table.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    keycodes: HashMap<u32, bool>,
    keys: HashMap<String, bool>,
    aliases: AliasMap,
}

impl KeyboardState {
    pub fn new(aliases: AliasMap) -> Self {
        Self {
            keycodes: HashMap::new(),
            keys: HashMap::new(),
            aliases,
        }
    }

    //--- Alias operations ------------------------------------------------

    /// Marks every key under `alias` as pressed.
    ///
    /// Returns `false` (and changes nothing) for an unknown alias.
    pub fn on(&mut self, alias: &str) -> bool {
        self.set_alias(alias, true)
    }

    /// Marks every key under `alias` as released.
    pub fn off(&mut self, alias: &str) -> bool {
        self.set_alias(alias, false)
    }

    /// `true` if any key under `alias` is pressed. Unknown aliases are
    /// never pressed.
    pub fn value(&self, alias: &str) -> bool {
        self.aliases
            .keys(alias)
            .is_some_and(|keys| keys.iter().any(|key| self.key(key)))
    }

    fn set_alias(&mut self, alias: &str, pressed: bool) -> bool {
        let Some(keys) = self.aliases.keys(alias) else {
            warn!("Unknown key alias '{}'", alias);
            return false;
        };
        for key in keys {
            self.keys.insert(key.clone(), pressed);
        }
        true
    }

    //--- Queries ---------------------------------------------------------

    /// Pressed state of one physical key name.
    pub fn key(&self, name: &str) -> bool {
        self.keys.get(name).copied().unwrap_or(false)
    }

    /// Pressed state of one numeric key code.
    pub fn keycode(&self, code: u32) -> bool {
        self.keycodes.get(&code).copied().unwrap_or(false)
    }

    /// `true` if any key name is currently pressed.
    pub fn is_keydown(&self) -> bool {
        self.keys.values().any(|pressed| *pressed)
    }

    pub fn keys(&self) -> &HashMap<String, bool> {
        &self.keys
    }

    pub fn keycodes(&self) -> &HashMap<u32, bool> {
        &self.keycodes
    }

    pub fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    pub fn aliases_mut(&mut self) -> &mut AliasMap {
        &mut self.aliases
    }

    //--- Mutation --------------------------------------------------------

    /// Releases every tracked key code and key name.
    pub fn reset(&mut self) {
        self.keycodes.values_mut().for_each(|pressed| *pressed = false);
        self.keys.values_mut().for_each(|pressed| *pressed = false);
    }

    fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.keycodes.insert(key.code(), pressed);
        self.keys.insert(key.name().to_owned(), pressed);
    }

    pub(crate) fn apply(&mut self, event: &HostEvent) {
        match *event {
            HostEvent::KeyDown(key) => self.set_key(key, true),
            HostEvent::KeyUp(key) => self.set_key(key, false),
            _ => {}
        }
    }
}

//=== Keyboard ============================================================

struct KeyboardShared {
    scope: CommandScope,
    state: Rc<RefCell<KeyboardState>>,
    /// Set when a blur found the state borrowed.
    pending_reset: Rc<Cell<bool>>,
    context: Weak<Context>,
    subscriptions: [SubscriptionId; 2],
}

impl Drop for KeyboardShared {
    fn drop(&mut self) {
        if let Some(ctx) = self.context.upgrade() {
            for id in self.subscriptions {
                ctx.unsubscribe(id);
            }
        }
    }
}

/// Keyboard command bound to one context.
///
/// Cloning yields another handle to the same state.
///
/// # Example
/// ```
/// use std::rc::Rc;
/// use axial::core::{Context, ContextConfig, HeadlessBackend, HeadlessHost, HostEvent, KeyCode, Keyboard};
///
/// let ctx = Context::new(
///     Rc::new(HeadlessHost::default()),
///     Rc::new(HeadlessBackend::new()),
///     ContextConfig::default(),
/// );
/// let keyboard = Keyboard::new(&ctx);
///
/// ctx.focus();
/// ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyW));
/// assert!(keyboard.value("up"));
///
/// ctx.blur();
/// assert!(!keyboard.value("up"));
/// ```
#[derive(Clone)]
pub struct Keyboard {
    shared: Rc<KeyboardShared>,
}

impl Keyboard {
    /// Creates a keyboard with the default alias table.
    pub fn new(ctx: &Rc<Context>) -> Self {
        Self::with_aliases(ctx, AliasMap::default())
    }

    pub fn with_aliases(ctx: &Rc<Context>, aliases: AliasMap) -> Self {
        let state = Rc::new(RefCell::new(KeyboardState::new(aliases)));
        let pending_reset = Rc::new(Cell::new(false));

        let on_input = {
            let state = Rc::clone(&state);
            let pending_reset = Rc::clone(&pending_reset);
            ctx.on_input(move |event| {
                if !event.is_keyboard() {
                    return;
                }
                match state.try_borrow_mut() {
                    Ok(mut state) => {
                        if pending_reset.replace(false) {
                            state.reset();
                        }
                        state.apply(event);
                    }
                    Err(_) => warn!("Keyboard state busy, dropping {:?}", event),
                }
            })
        };

        let on_blur = {
            let state = Rc::clone(&state);
            let pending_reset = Rc::clone(&pending_reset);
            ctx.on_blur(move |_| match state.try_borrow_mut() {
                Ok(mut state) => {
                    state.reset();
                    pending_reset.set(false);
                    debug!("Keyboard state reset on blur");
                }
                Err(_) => {
                    pending_reset.set(true);
                    debug!("Keyboard state busy, reset on blur deferred");
                }
            })
        };

        Self {
            shared: Rc::new(KeyboardShared {
                scope: CommandScope::new("keyboard"),
                state,
                pending_reset,
                context: Rc::downgrade(ctx),
                subscriptions: [on_input, on_blur],
            }),
        }
    }

    /// Runs `block` with this keyboard scoped on `ctx`'s stack.
    pub fn invoke<R>(&self, ctx: &Context, block: impl FnOnce(&Keyboard) -> R) -> Result<R> {
        let _guard = self.shared.scope.enter(ctx)?;
        Ok(block(self))
    }

    pub fn handle(&self) -> &CommandHandle {
        self.shared.scope.handle()
    }

    /// Borrows the aggregated state.
    pub fn state(&self) -> Ref<'_, KeyboardState> {
        self.settle();
        self.shared.state.borrow()
    }

    /// Applies a blur reset that found the state borrowed.
    fn settle(&self) {
        if !self.shared.pending_reset.get() {
            return;
        }
        if let Ok(mut state) = self.shared.state.try_borrow_mut() {
            state.reset();
            self.shared.pending_reset.set(false);
            debug!("Deferred keyboard reset applied");
        }
    }

    pub fn value(&self, alias: &str) -> bool {
        self.state().value(alias)
    }

    pub fn on(&self, alias: &str) -> bool {
        self.settle();
        self.shared.state.borrow_mut().on(alias)
    }

    pub fn off(&self, alias: &str) -> bool {
        self.settle();
        self.shared.state.borrow_mut().off(alias)
    }

    pub fn reset(&self) {
        self.shared.state.borrow_mut().reset();
        self.shared.pending_reset.set(false);
    }

    pub fn is_keydown(&self) -> bool {
        self.state().is_keydown()
    }

    pub fn key(&self, name: &str) -> bool {
        self.state().key(name)
    }

    pub fn keycode(&self, code: u32) -> bool {
        self.state().keycode(code)
    }

    /// Binds `alias` to `keys` on this keyboard's alias table.
    pub fn bind<I, K>(&self, alias: &str, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.shared.state.borrow_mut().aliases_mut().bind(alias, keys);
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

    fn setup() -> (Rc<Context>, Keyboard) {
        let ctx = Context::new(
            Rc::new(HeadlessHost::default()),
            Rc::new(HeadlessBackend::new()),
            ContextConfig::default(),
        );
        let keyboard = Keyboard::new(&ctx);
        ctx.focus();
        (ctx, keyboard)
    }

    //=====================================================================
    // Alias semantics
    //=====================================================================

    #[test]
    fn alias_is_or_over_physical_keys() {
        let (ctx, keyboard) = setup();

        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyW));
        assert!(keyboard.value("up"));

        ctx.dispatch(&HostEvent::KeyUp(KeyCode::KeyW));
        assert!(!keyboard.value("up"));
    }

    #[test]
    fn alias_stays_pressed_while_any_key_held() {
        let (ctx, keyboard) = setup();

        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyW));
        ctx.dispatch(&HostEvent::KeyDown(KeyCode::ArrowUp));
        ctx.dispatch(&HostEvent::KeyUp(KeyCode::KeyW));

        assert!(keyboard.value("up"));
    }

    #[test]
    fn unknown_alias_is_false() {
        let (_ctx, keyboard) = setup();
        assert!(!keyboard.value("jump"));
        assert!(!keyboard.on("jump"));
    }

    #[test]
    fn on_and_off_drive_every_key_in_alias() {
        let (_ctx, keyboard) = setup();

        assert!(keyboard.on("left"));
        assert!(keyboard.key("left"));
        assert!(keyboard.key("a"));

        assert!(keyboard.off("left"));
        assert!(!keyboard.value("left"));
    }

    #[test]
    fn control_alias_includes_meta_keys() {
        let (ctx, keyboard) = setup();
        ctx.dispatch(&HostEvent::KeyDown(KeyCode::MetaLeft));
        assert!(keyboard.value("control"));
    }

    #[test]
    fn custom_binding() {
        let (ctx, keyboard) = setup();
        keyboard.bind("jump", ["space"]);

        ctx.dispatch(&HostEvent::KeyDown(KeyCode::Space));
        assert!(keyboard.value("jump"));
    }

    //=====================================================================
    // Raw state
    //=====================================================================

    #[test]
    fn codes_and_names_update_in_lockstep() {
        let (ctx, keyboard) = setup();

        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyA));
        assert!(keyboard.keycode(65));
        assert!(keyboard.key("a"));
        assert!(keyboard.is_keydown());

        ctx.dispatch(&HostEvent::KeyUp(KeyCode::KeyA));
        assert!(!keyboard.keycode(65));
        assert!(!keyboard.key("a"));
        assert!(!keyboard.is_keydown());
    }

    #[test]
    fn unfocused_events_leave_state_untouched() {
        let (ctx, keyboard) = setup();
        ctx.blur();

        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyD));

        let state = keyboard.state();
        assert!(state.keys().is_empty());
        assert!(state.keycodes().is_empty());
    }

    #[test]
    fn blur_releases_everything() {
        let (ctx, keyboard) = setup();
        for key in [KeyCode::KeyW, KeyCode::KeyA, KeyCode::ArrowDown, KeyCode::Control] {
            ctx.dispatch(&HostEvent::KeyDown(key));
        }

        ctx.dispatch(&HostEvent::Blur);

        for alias in ["up", "down", "left", "right", "control"] {
            assert!(!keyboard.value(alias), "alias '{}' still pressed", alias);
        }
        let state = keyboard.state();
        assert!(state.keycodes().values().all(|pressed| !pressed));
        assert!(!state.is_keydown());
    }

    #[test]
    fn blur_while_state_is_borrowed_still_releases() {
        let (ctx, keyboard) = setup();
        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyW));
        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyA));

        {
            let held = keyboard.state();
            ctx.blur();
            assert!(held.value("up"));
        }

        assert!(!keyboard.value("up"));
        assert!(!keyboard.value("left"));
        assert!(!keyboard.is_keydown());
    }

    #[test]
    fn deferred_blur_reset_precedes_next_event() {
        let (ctx, keyboard) = setup();
        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyW));

        {
            let _held = keyboard.state();
            ctx.blur();
        }
        ctx.focus();
        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyD));

        let state = keyboard.shared.state.borrow();
        assert!(!state.value("up"));
        assert!(state.value("right"));
        assert!(!keyboard.shared.pending_reset.get());
    }

    #[test]
    fn pointer_events_are_ignored() {
        let (ctx, keyboard) = setup();
        ctx.dispatch(&HostEvent::Wheel { dx: 0.0, dy: 1.0 });
        assert!(keyboard.state().keys().is_empty());
    }

    //=====================================================================
    // Command scope
    //=====================================================================

    #[test]
    fn invoke_scopes_keyboard_on_stack() {
        let (ctx, keyboard) = setup();
        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyS));

        let (depth, down) = keyboard
            .invoke(&ctx, |kb| (ctx.depth(), kb.value("down")))
            .expect("invoke");

        assert_eq!(depth, 1);
        assert!(down);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn dropping_keyboard_unsubscribes() {
        let (ctx, keyboard) = setup();
        let state = Rc::clone(&keyboard.shared.state);

        drop(keyboard);
        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyW));

        assert!(state.borrow().keys().is_empty());
    }
}
