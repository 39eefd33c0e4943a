//=========================================================================
// Context
//=========================================================================
//
// Per-scene owner of the active-command stack, focus state, shared state,
// and the typed notification channels other components subscribe to.
//
// Architecture:
// ```text
//   host thread(s) ──Sender<HostEvent>──┐
//                                       ▼
//   HostWindow ──dispatch(&HostEvent)──> Context ──on_input──> Keyboard / Pointer
//                                         │  ├─on_focus / on_blur
//                                         │  ├─on_reset (start of tick)
//                                         │  └─on_error (tick fault)
//                                         ▼
//   Command::invoke ──enter()──> stack [outer, ..., current]
//                   <──StackGuard::drop() pops on every exit path
//
//   FrameScheduler tick:
//     pump_events() → set_frame() → reset() → clear() → run_deferred()
// ```
//
// Malformed calls (pushing a detached handle, merging a non-map value)
// are ignored with a warning instead of failing the tick.
//
//=========================================================================

//=== Module Declarations =================================================

mod signal;
mod state;

//=== Public API ==========================================================

pub use signal::{Signal, SubscriptionId};
pub use state::{SharedState, StateValue};

//=== Standard Library Imports ============================================

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

//=== External Crates =====================================================

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::command::CommandHandle;
use crate::core::error::{Error, Result};
use crate::core::frame::FrameContext;
use crate::core::host::{ClearSpec, GraphicsBackend, HostWindow, Viewport};
use crate::core::input::event::HostEvent;

//=== ContextConfig =======================================================

/// Construction parameters for a [`Context`].
///
/// # Example
/// ```
/// use axial::core::ContextConfig;
///
/// let config = ContextConfig::default()
///     .with_clear_color([0.0, 0.0, 0.0, 1.0])
///     .with_channel_capacity(256);
/// assert_eq!(config.channel_capacity(), 256);
/// ```
#[derive(Debug, Clone)]
pub struct ContextConfig {
    clear: ClearSpec,
    initial_state: SharedState,
    channel_capacity: usize,
    max_events_per_pump: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            clear: ClearSpec::default(),
            initial_state: SharedState::new(),
            channel_capacity: 128,
            max_events_per_pump: 100,
        }
    }
}

impl ContextConfig {
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear.color = color;
        self
    }

    pub fn with_clear_depth(mut self, depth: f32) -> Self {
        self.clear.depth = depth;
        self
    }

    pub fn with_initial_state(mut self, state: SharedState) -> Self {
        self.initial_state = state;
        self
    }

    /// Sets the bound of the cross-thread host event channel.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Sets how many queued host events one `pump_events()` may drain.
    ///
    /// # Panics
    /// Panics if `max` is zero.
    pub fn with_max_events_per_pump(mut self, max: usize) -> Self {
        assert!(max > 0, "Events per pump must be positive");
        self.max_events_per_pump = max;
        self
    }

    pub fn clear(&self) -> &ClearSpec {
        &self.clear
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    pub fn max_events_per_pump(&self) -> usize {
        self.max_events_per_pump
    }
}

//=== Context =============================================================

type Continuation = Box<dyn FnOnce(&Context)>;

/// Per-scene command stack and lifecycle state.
///
/// Created once per rendering surface and shared (`Rc`) between the frame
/// scheduler, input aggregators, and controllers of that scene. All
/// mutation happens on the thread that owns the scene.
pub struct Context {
    host: Rc<dyn HostWindow>,
    backend: Rc<dyn GraphicsBackend>,
    clear_spec: ClearSpec,
    max_events_per_pump: usize,

    stack: RefCell<Vec<CommandHandle>>,
    current: RefCell<Option<CommandHandle>>,
    previous: RefCell<Option<CommandHandle>>,
    has_focus: Cell<bool>,
    state: RefCell<SharedState>,
    frame: Cell<FrameContext>,
    deferred: RefCell<Vec<Continuation>>,

    sender: Sender<HostEvent>,
    receiver: Receiver<HostEvent>,

    focus_signal: Signal<()>,
    blur_signal: Signal<()>,
    error_signal: Signal<Error>,
    reset_signal: Signal<FrameContext>,
    input_signal: Signal<HostEvent>,
}

impl Context {
    /// Creates a context bound to a host window and graphics backend.
    ///
    /// The context starts unfocused with an empty stack.
    pub fn new(
        host: Rc<dyn HostWindow>,
        backend: Rc<dyn GraphicsBackend>,
        config: ContextConfig,
    ) -> Rc<Self> {
        let (sender, receiver) = crossbeam_channel::bounded(config.channel_capacity);

        Rc::new(Self {
            host,
            backend,
            clear_spec: config.clear,
            max_events_per_pump: config.max_events_per_pump,
            stack: RefCell::new(Vec::new()),
            current: RefCell::new(None),
            previous: RefCell::new(None),
            has_focus: Cell::new(false),
            state: RefCell::new(config.initial_state),
            frame: Cell::new(FrameContext::default()),
            deferred: RefCell::new(Vec::new()),
            sender,
            receiver,
            focus_signal: Signal::new(),
            blur_signal: Signal::new(),
            error_signal: Signal::new(),
            reset_signal: Signal::new(),
            input_signal: Signal::new(),
        })
    }

    //=== Stack ===========================================================

    /// Pushes a command onto the stack.
    ///
    /// Ignored if the handle's command has been dropped.
    pub fn push(&self, command: &CommandHandle) {
        if !command.is_callable() {
            warn!("Ignoring push of detached command '{}'", command.name());
            return;
        }

        let mut stack = self.stack.borrow_mut();
        stack.push(command.clone());
        *self.current.borrow_mut() = Some(command.clone());
        *self.previous.borrow_mut() = stack.iter().rev().nth(1).cloned();
        trace!("push '{}' (depth {})", command.name(), stack.len());
    }

    /// Pops the top of the stack.
    ///
    /// Afterwards `current` is the new top and `previous` the removed entry.
    pub fn pop(&self) -> Option<CommandHandle> {
        let mut stack = self.stack.borrow_mut();
        let popped = stack.pop()?;
        *self.current.borrow_mut() = stack.last().cloned();
        *self.previous.borrow_mut() = Some(popped.clone());
        trace!("pop '{}' (depth {})", popped.name(), stack.len());
        Some(popped)
    }

    /// Pushes `command` and returns a guard that pops it when dropped.
    ///
    /// # Errors
    /// [`Error::Reentrant`] if `command` is already on the stack, and
    /// [`Error::Failed`] if its command has been dropped. Nothing is pushed
    /// in either case.
    pub fn enter(&self, command: &CommandHandle) -> Result<StackGuard<'_>> {
        if !command.is_callable() {
            return Err(Error::Failed(format!(
                "command '{}' is no longer callable",
                command.name()
            )));
        }
        if self.contains(command) {
            return Err(Error::Reentrant {
                command: command.name().to_owned(),
            });
        }

        self.push(command);
        Ok(StackGuard {
            context: self,
            command: command.clone(),
        })
    }

    /// Innermost active command.
    pub fn current(&self) -> Option<CommandHandle> {
        self.current.borrow().clone()
    }

    /// Enclosing command of `current`, or the most recently popped one.
    pub fn previous(&self) -> Option<CommandHandle> {
        self.previous.borrow().clone()
    }

    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    /// Active commands, outermost first.
    pub fn stack(&self) -> Vec<CommandHandle> {
        self.stack.borrow().clone()
    }

    pub fn contains(&self, command: &CommandHandle) -> bool {
        self.stack.borrow().iter().any(|entry| entry == command)
    }

    //=== Shared State ====================================================

    /// Shallow-merges a [`StateValue::Map`] into the shared state.
    ///
    /// Any other value is ignored.
    pub fn update(&self, partial: StateValue) {
        match partial {
            StateValue::Map(entries) => self.state.borrow_mut().extend(entries),
            other => warn!("Ignoring non-map state update: {:?}", other),
        }
    }

    pub fn get(&self, key: &str) -> Option<StateValue> {
        self.state.borrow().get(key).cloned()
    }

    pub fn state(&self) -> Ref<'_, SharedState> {
        self.state.borrow()
    }

    //=== Tick Boundaries =================================================

    /// Clears the backend buffers, then empties the stack and nulls
    /// `current`/`previous`.
    pub fn clear(&self) {
        self.backend.clear_buffers(&self.clear_spec);
        self.stack.borrow_mut().clear();
        *self.current.borrow_mut() = None;
        *self.previous.borrow_mut() = None;
    }

    /// Notifies reset observers that a new tick is starting.
    pub fn reset(&self) {
        let frame = self.frame.get();
        self.reset_signal.emit(&frame);
    }

    /// Per-tick snapshot captured by the frame scheduler.
    pub fn frame(&self) -> FrameContext {
        self.frame.get()
    }

    pub(crate) fn set_frame(&self, frame: FrameContext) {
        self.frame.set(frame);
    }

    /// Current drawable size reported by the host window.
    pub fn viewport(&self) -> Viewport {
        self.host.viewport()
    }

    pub fn backend(&self) -> &dyn GraphicsBackend {
        self.backend.as_ref()
    }

    /// Queues a continuation for the start of the next tick.
    pub fn defer<F>(&self, continuation: F)
    where
        F: FnOnce(&Context) + 'static,
    {
        self.deferred.borrow_mut().push(Box::new(continuation));
    }

    /// Runs continuations queued before this call.
    ///
    /// Continuations deferred while running wait for the next tick.
    pub(crate) fn run_deferred(&self) -> usize {
        let pending = std::mem::take(&mut *self.deferred.borrow_mut());
        let count = pending.len();
        for continuation in pending {
            continuation(self);
        }
        count
    }

    //=== Focus ===========================================================

    pub fn focus(&self) {
        self.has_focus.set(true);
        debug!("Context focused");
        self.focus_signal.emit(&());
    }

    pub fn blur(&self) {
        self.has_focus.set(false);
        debug!("Context blurred");
        self.blur_signal.emit(&());
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus.get()
    }

    //=== Host Events =====================================================

    /// Routes one host event.
    ///
    /// Focus changes go to [`focus`](Self::focus)/[`blur`](Self::blur).
    /// Keyboard events are dropped while the context is unfocused; every
    /// other event is forwarded to input observers.
    pub fn dispatch(&self, event: &HostEvent) {
        match event {
            HostEvent::Focus => self.focus(),
            HostEvent::Blur => self.blur(),
            e if e.is_keyboard() && !self.has_focus() => {
                trace!("Dropping {:?} while unfocused", e);
            }
            e => self.input_signal.emit(e),
        }
    }

    /// Sender for host events produced on other threads.
    pub fn event_sender(&self) -> Sender<HostEvent> {
        self.sender.clone()
    }

    /// Dispatches queued host events in arrival order.
    ///
    /// Bounded by the configured maximum so a flooded channel cannot
    /// starve the tick. Returns the number of events dispatched.
    pub fn pump_events(&self) -> usize {
        let mut drained = 0;

        while drained < self.max_events_per_pump {
            match self.receiver.try_recv() {
                Ok(event) => {
                    self.dispatch(&event);
                    drained += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if drained >= self.max_events_per_pump && !self.receiver.is_empty() {
            warn!(
                "Host event backlog: drained {} events, {} still queued",
                drained,
                self.receiver.len()
            );
        }

        drained
    }

    //=== Errors ==========================================================

    /// Notifies error observers.
    pub fn emit_error(&self, error: &Error) {
        self.error_signal.emit(error);
    }

    //=== Subscriptions ===================================================

    pub fn on_focus<F: FnMut(&()) + 'static>(&self, observer: F) -> SubscriptionId {
        self.focus_signal.subscribe(observer)
    }

    pub fn on_blur<F: FnMut(&()) + 'static>(&self, observer: F) -> SubscriptionId {
        self.blur_signal.subscribe(observer)
    }

    pub fn on_error<F: FnMut(&Error) + 'static>(&self, observer: F) -> SubscriptionId {
        self.error_signal.subscribe(observer)
    }

    /// Observes the start-of-tick reset boundary.
    pub fn on_reset<F: FnMut(&FrameContext) + 'static>(&self, observer: F) -> SubscriptionId {
        self.reset_signal.subscribe(observer)
    }

    /// Observes input events accepted by [`dispatch`](Self::dispatch).
    pub fn on_input<F: FnMut(&HostEvent) + 'static>(&self, observer: F) -> SubscriptionId {
        self.input_signal.subscribe(observer)
    }

    /// Removes a subscription made through any `on_*` method.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.focus_signal.unsubscribe(id)
            | self.blur_signal.unsubscribe(id)
            | self.error_signal.unsubscribe(id)
            | self.reset_signal.unsubscribe(id)
            | self.input_signal.unsubscribe(id)
    }
}

//=== StackGuard ==========================================================

/// Scoped stack entry returned by [`Context::enter`].
///
/// Pops its own entry when dropped, including during unwinding. Entries
/// pushed above it and never popped go with it; if the stack was cleared
/// in the meantime nothing is popped.
#[must_use = "the command is popped as soon as the guard is dropped"]
pub struct StackGuard<'a> {
    context: &'a Context,
    command: CommandHandle,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        if !self.context.contains(&self.command) {
            return;
        }
        while let Some(popped) = self.context.pop() {
            if popped == self.command {
                break;
            }
            warn!(
                "Popping unbalanced '{}' left above '{}'",
                popped.name(),
                self.command.name()
            );
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::CommandScope;
    use crate::core::host::{HeadlessBackend, HeadlessHost};
    use crate::core::input::event::KeyCode;

    fn context() -> (Rc<Context>, Rc<HeadlessBackend>) {
        let backend = Rc::new(HeadlessBackend::new());
        let ctx = Context::new(
            Rc::new(HeadlessHost::default()),
            backend.clone(),
            ContextConfig::default(),
        );
        (ctx, backend)
    }

    fn assert_stack_invariant(ctx: &Context) {
        let stack = ctx.stack();
        assert_eq!(ctx.depth(), stack.len());
        assert_eq!(ctx.current(), stack.last().cloned());
    }

    //=====================================================================
    // Stack
    //=====================================================================

    #[test]
    fn push_sets_current_and_previous() {
        let (ctx, _) = context();
        let a = CommandScope::new("a");
        let b = CommandScope::new("b");

        ctx.push(a.handle());
        assert_eq!(ctx.current().as_ref(), Some(a.handle()));
        assert_eq!(ctx.previous(), None);

        ctx.push(b.handle());
        assert_eq!(ctx.current().as_ref(), Some(b.handle()));
        assert_eq!(ctx.previous().as_ref(), Some(a.handle()));
        assert_stack_invariant(&ctx);
    }

    #[test]
    fn pop_moves_removed_entry_to_previous() {
        let (ctx, _) = context();
        let a = CommandScope::new("a");
        let b = CommandScope::new("b");
        ctx.push(a.handle());
        ctx.push(b.handle());

        let popped = ctx.pop();

        assert_eq!(popped.as_ref(), Some(b.handle()));
        assert_eq!(ctx.current().as_ref(), Some(a.handle()));
        assert_eq!(ctx.previous().as_ref(), Some(b.handle()));
        assert_stack_invariant(&ctx);
    }

    #[test]
    fn pop_on_empty_stack_returns_none() {
        let (ctx, _) = context();
        assert_eq!(ctx.pop(), None);
        assert_stack_invariant(&ctx);
    }

    #[test]
    fn stack_invariant_holds_over_mixed_sequence() {
        let (ctx, _) = context();
        let scopes: Vec<_> = (0..4).map(|i| CommandScope::new(format!("c{}", i))).collect();

        for (i, scope) in scopes.iter().enumerate() {
            ctx.push(scope.handle());
            assert_stack_invariant(&ctx);
            if i % 2 == 1 {
                ctx.pop();
                assert_stack_invariant(&ctx);
            }
        }
        while ctx.pop().is_some() {
            assert_stack_invariant(&ctx);
        }
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn push_of_detached_handle_is_ignored() {
        let (ctx, _) = context();
        let handle = CommandScope::new("gone").handle().clone();

        ctx.push(&handle);

        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.current(), None);
    }

    //=====================================================================
    // Scoped entry
    //=====================================================================

    #[test]
    fn guard_pops_on_drop() {
        let (ctx, _) = context();
        let scope = CommandScope::new("scoped");
        {
            let _guard = ctx.enter(scope.handle()).expect("enter");
            assert_eq!(ctx.depth(), 1);
        }
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.previous().as_ref(), Some(scope.handle()));
    }

    #[test]
    fn enter_rejects_reentry() {
        let (ctx, _) = context();
        let scope = CommandScope::new("loop");
        let _guard = ctx.enter(scope.handle()).expect("enter");

        let err = ctx.enter(scope.handle()).err();

        assert_eq!(
            err,
            Some(Error::Reentrant {
                command: "loop".into()
            })
        );
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn guard_pops_its_own_entry_past_unbalanced_push() {
        let (ctx, _) = context();
        let outer = CommandScope::new("outer");
        let stray = CommandScope::new("stray");

        {
            let _guard = ctx.enter(outer.handle()).expect("enter");
            ctx.push(stray.handle());
            assert_eq!(ctx.depth(), 2);
        }

        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.current(), None);
        assert_eq!(ctx.previous().as_ref(), Some(outer.handle()));
    }

    #[test]
    fn guard_leaves_cleared_stack_alone() {
        let (ctx, _) = context();
        let outer = CommandScope::new("outer");
        let other = CommandScope::new("other");

        {
            let _guard = ctx.enter(outer.handle()).expect("enter");
            ctx.clear();
            ctx.push(other.handle());
        }

        assert_eq!(ctx.stack(), vec![other.handle().clone()]);
        assert_stack_invariant(&ctx);
    }

    #[test]
    fn guard_pops_during_unwind() {
        let (ctx, _) = context();
        let scope = CommandScope::new("panics");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ctx.enter(scope.handle()).expect("enter");
            panic!("body failed");
        }));

        assert!(result.is_err());
        assert_eq!(ctx.depth(), 0);
    }

    //=====================================================================
    // State and boundaries
    //=====================================================================

    #[test]
    fn update_merges_maps_shallowly() {
        let (ctx, _) = context();
        ctx.update(StateValue::map([("a", 1.0_f64.into()), ("b", true.into())]));
        ctx.update(StateValue::map([("a", 2.0_f64.into())]));

        assert_eq!(ctx.get("a"), Some(StateValue::Number(2.0)));
        assert_eq!(ctx.get("b"), Some(StateValue::Bool(true)));
        assert_eq!(ctx.state().len(), 2);
    }

    #[test]
    fn update_ignores_non_map_values() {
        let (ctx, _) = context();
        ctx.update(StateValue::from("not a map"));
        assert!(ctx.state().is_empty());
    }

    #[test]
    fn initial_state_comes_from_config() {
        let mut initial = SharedState::new();
        initial.insert("fov".into(), StateValue::Number(60.0));
        let ctx = Context::new(
            Rc::new(HeadlessHost::default()),
            Rc::new(HeadlessBackend::new()),
            ContextConfig::default().with_initial_state(initial),
        );

        assert_eq!(ctx.get("fov"), Some(StateValue::Number(60.0)));
    }

    #[test]
    fn clear_empties_stack_and_calls_backend() {
        let (ctx, backend) = context();
        let scopes: Vec<_> = (0..3).map(|i| CommandScope::new(format!("c{}", i))).collect();
        for scope in &scopes {
            ctx.push(scope.handle());
        }

        ctx.clear();

        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.current(), None);
        assert_eq!(ctx.previous(), None);
        assert_eq!(backend.clear_count(), 1);
        assert_eq!(backend.last_clear(), Some(ClearSpec::default()));
    }

    #[test]
    fn clear_on_empty_context() {
        let (ctx, backend) = context();
        ctx.clear();
        assert_eq!(ctx.depth(), 0);
        assert_eq!(backend.clear_count(), 1);
    }

    #[test]
    fn deferred_continuations_run_once() {
        let (ctx, _) = context();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        ctx.defer(move |_| h.set(h.get() + 1));

        assert_eq!(ctx.run_deferred(), 1);
        assert_eq!(ctx.run_deferred(), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn continuation_deferred_while_running_waits() {
        let (ctx, _) = context();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        ctx.defer(move |ctx| {
            let h = Rc::clone(&h);
            ctx.defer(move |_| h.set(h.get() + 1));
        });

        ctx.run_deferred();
        assert_eq!(hits.get(), 0);
        ctx.run_deferred();
        assert_eq!(hits.get(), 1);
    }

    //=====================================================================
    // Focus and events
    //=====================================================================

    #[test]
    fn focus_and_blur_notify_observers() {
        let (ctx, _) = context();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        ctx.on_focus(move |_| l.borrow_mut().push("focus"));
        let l = Rc::clone(&log);
        ctx.on_blur(move |_| l.borrow_mut().push("blur"));

        assert!(!ctx.has_focus());
        ctx.dispatch(&HostEvent::Focus);
        assert!(ctx.has_focus());
        ctx.dispatch(&HostEvent::Blur);
        assert!(!ctx.has_focus());

        assert_eq!(*log.borrow(), vec!["focus", "blur"]);
    }

    #[test]
    fn keyboard_events_dropped_while_unfocused() {
        let (ctx, _) = context();
        let seen = Rc::new(Cell::new(0));

        let s = Rc::clone(&seen);
        ctx.on_input(move |_| s.set(s.get() + 1));

        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyW));
        ctx.dispatch(&HostEvent::Wheel { dx: 0.0, dy: 1.0 });
        assert_eq!(seen.get(), 1);

        ctx.focus();
        ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyW));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn pump_dispatches_queued_events_in_order() {
        let (ctx, _) = context();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        ctx.on_input(move |e| l.borrow_mut().push(*e));

        let sender = ctx.event_sender();
        sender.send(HostEvent::Focus).expect("send");
        sender.send(HostEvent::KeyDown(KeyCode::KeyA)).expect("send");
        sender.send(HostEvent::KeyUp(KeyCode::KeyA)).expect("send");

        assert_eq!(ctx.pump_events(), 3);
        assert!(ctx.has_focus());
        assert_eq!(
            *log.borrow(),
            vec![HostEvent::KeyDown(KeyCode::KeyA), HostEvent::KeyUp(KeyCode::KeyA)]
        );
    }

    #[test]
    fn pump_is_bounded() {
        let ctx = Context::new(
            Rc::new(HeadlessHost::default()),
            Rc::new(HeadlessBackend::new()),
            ContextConfig::default().with_max_events_per_pump(2),
        );
        let sender = ctx.event_sender();
        for _ in 0..5 {
            sender.send(HostEvent::TouchEnd).expect("send");
        }

        assert_eq!(ctx.pump_events(), 2);
        assert_eq!(ctx.pump_events(), 2);
        assert_eq!(ctx.pump_events(), 1);
        assert_eq!(ctx.pump_events(), 0);
    }

    #[test]
    fn sender_works_across_threads() {
        let (ctx, _) = context();
        let sender = ctx.event_sender();

        std::thread::spawn(move || {
            sender.send(HostEvent::Focus).expect("send");
        })
        .join()
        .expect("join");

        ctx.pump_events();
        assert!(ctx.has_focus());
    }

    #[test]
    fn error_observers_receive_payload() {
        let (ctx, _) = context();
        let seen = Rc::new(RefCell::new(None));

        let s = Rc::clone(&seen);
        ctx.on_error(move |e| *s.borrow_mut() = Some(e.clone()));
        ctx.emit_error(&Error::Failed("boom".into()));

        assert_eq!(*seen.borrow(), Some(Error::Failed("boom".into())));
    }

    #[test]
    fn unsubscribe_routes_to_owning_signal() {
        let (ctx, _) = context();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let id = ctx.on_reset(move |_| h.set(h.get() + 1));
        ctx.reset();
        assert!(ctx.unsubscribe(id));
        ctx.reset();

        assert_eq!(hits.get(), 1);
    }

    //=====================================================================
    // Config
    //=====================================================================

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn zero_channel_capacity_panics() {
        let _ = ContextConfig::default().with_channel_capacity(0);
    }

    #[test]
    fn config_defaults() {
        let config = ContextConfig::default();
        assert_eq!(config.channel_capacity(), 128);
        assert_eq!(config.max_events_per_pump(), 100);
        assert_eq!(*config.clear(), ClearSpec::default());
    }
}
