//=========================================================================
// Frame Scheduler
//=========================================================================
//
// Multiplexes independently registered refresh callbacks into one ordered
// pass per host tick, with a single fault boundary around the pass.
//
// Lifecycle:
// ```text
//   Idle ──register()──> Running ──cancel() / fault──> Cancelled
//     ▲                     │                              │
//     └──last removal───────┘        register() ───────────┘ (fresh subscription)
// ```
//
// One tick:
// ```text
//   TickSource ──TickInfo──> run_tick()
//     1. pump queued host events into the Context
//     2. capture FrameContext (time, dt, tick, viewport, resolution)
//     3. Context::reset(), Context::clear()
//     4. run deferred continuations
//     5. invoke queued callbacks in registration order
//        └─ Err or panic ─> Context::emit_error() ─> cancel() ─> stop
// ```
//
// A panic in steps 1-4 is a tick fault too: it is reported the same way
// and no callback runs for that tick.
//
// Callbacks registered during a tick run from the next tick on.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

//=== External Crates =====================================================

use glam::Vec2;
use log::{debug, error, info, trace};

//=== Internal Dependencies ===============================================

use crate::core::command::CancelHandle;
use crate::core::context::Context;
use crate::core::error::{Error, Result};
use crate::core::host::{TickInfo, TickSource, TickToken, Viewport};

//=== FrameContext ========================================================

/// Per-tick values injected into every refresh callback and command body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameContext {
    /// Seconds since the tick source started.
    pub time: f64,
    /// Seconds since the previous tick.
    pub dt: f64,
    /// Ticks run by the scheduler so far, this one included.
    pub tick: u64,
    pub viewport: Viewport,
    /// Viewport size as floats, for shader uniforms.
    pub resolution: Vec2,
}

impl FrameContext {
    fn capture(info: &TickInfo, tick: u64) -> Self {
        Self {
            time: info.time,
            dt: info.dt,
            tick,
            viewport: info.viewport,
            resolution: Vec2::new(info.viewport.width as f32, info.viewport.height as f32),
        }
    }
}

//=== SchedulerStatus =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerStatus {
    /// Not subscribed to the tick source.
    Idle,
    /// Subscribed; callbacks run every tick.
    Running,
    /// Stopped by `cancel()` or a tick fault.
    Cancelled,
}

//=== Internal State ======================================================

/// Callback invoked once per tick.
pub type RefreshCallback = Box<dyn FnMut(&Context, &FrameContext) -> Result<()>>;

struct Entry {
    id: u64,
    callback: Rc<RefCell<RefreshCallback>>,
}

struct SchedulerState {
    status: SchedulerStatus,
    queue: Vec<Entry>,
    token: Option<TickToken>,
    next_id: u64,
    ticks: u64,
}

struct SchedulerShared {
    state: RefCell<SchedulerState>,
    context: Rc<Context>,
    source: Rc<dyn TickSource>,
}

impl Drop for SchedulerShared {
    fn drop(&mut self) {
        if let Some(token) = self.state.get_mut().token.take() {
            self.source.unsubscribe(token);
        }
    }
}

//=== FrameScheduler ======================================================

/// Per-scene tick driver. Cloning yields another handle to the same
/// scheduler.
///
/// # Example
/// ```
/// use std::rc::Rc;
/// use axial::core::{Context, ContextConfig, FrameScheduler, HeadlessBackend, HeadlessHost};
///
/// let host = Rc::new(HeadlessHost::default());
/// let ctx = Context::new(host.clone(), Rc::new(HeadlessBackend::new()), ContextConfig::default());
/// let scheduler = FrameScheduler::new(ctx, host.clone());
///
/// scheduler.register(|_ctx, frame| {
///     assert!(frame.dt > 0.0);
///     Ok(())
/// });
///
/// host.advance(1.0 / 60.0);
/// assert!(scheduler.is_running());
/// ```
#[derive(Clone)]
pub struct FrameScheduler {
    shared: Rc<SchedulerShared>,
}

impl FrameScheduler {
    pub fn new(context: Rc<Context>, source: Rc<dyn TickSource>) -> Self {
        Self {
            shared: Rc::new(SchedulerShared {
                state: RefCell::new(SchedulerState {
                    status: SchedulerStatus::Idle,
                    queue: Vec::new(),
                    token: None,
                    next_id: 0,
                    ticks: 0,
                }),
                context,
                source,
            }),
        }
    }

    //--- Registration ----------------------------------------------------

    /// Appends a refresh callback to the queue.
    ///
    /// The first registration (or the first after a cancel) subscribes to
    /// the tick source.
    pub fn register<F>(&self, callback: F) -> Registration
    where
        F: FnMut(&Context, &FrameContext) -> Result<()> + 'static,
    {
        let (id, start) = {
            let mut state = self.shared.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.queue.push(Entry {
                id,
                callback: Rc::new(RefCell::new(Box::new(callback))),
            });
            (id, state.status != SchedulerStatus::Running)
        };
        debug!("Registered refresh callback #{}", id);

        if start {
            Self::start(&self.shared);
        }

        Registration {
            id,
            scheduler: Rc::downgrade(&self.shared),
        }
    }

    /// Registers a callback and returns a scheduler-wide cancel handle.
    pub fn frame<F>(&self, callback: F) -> CancelHandle
    where
        F: FnMut(&Context, &FrameContext) -> Result<()> + 'static,
    {
        self.register(callback);
        let scheduler = Rc::downgrade(&self.shared);
        CancelHandle::new(move || {
            if let Some(shared) = scheduler.upgrade() {
                Self::cancel_shared(&shared);
            }
        })
    }

    /// Removes one callback. Returns `false` if it was not queued.
    ///
    /// Removing the last callback detaches from the tick source.
    pub fn remove(&self, id: u64) -> bool {
        Self::remove_shared(&self.shared, id)
    }

    /// Detaches from the tick source and drops every queued callback.
    ///
    /// Calling it again, or on a scheduler that never started, does nothing.
    pub fn cancel(&self) {
        Self::cancel_shared(&self.shared);
    }

    //--- Queries ---------------------------------------------------------

    pub fn status(&self) -> SchedulerStatus {
        self.shared.state.borrow().status
    }

    pub fn is_running(&self) -> bool {
        self.status() == SchedulerStatus::Running
    }

    /// Number of queued callbacks.
    pub fn len(&self) -> usize {
        self.shared.state.borrow().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.shared.context
    }

    //=== Internals =======================================================

    fn start(shared: &Rc<SchedulerShared>) {
        let weak = Rc::downgrade(shared);
        let token = shared.source.subscribe(Box::new(move |info| {
            if let Some(shared) = weak.upgrade() {
                Self::run_tick(&shared, info);
            }
        }));

        let mut state = shared.state.borrow_mut();
        state.status = SchedulerStatus::Running;
        state.token = Some(token);
        info!("Frame scheduler running");
    }

    fn remove_shared(shared: &SchedulerShared, id: u64) -> bool {
        let (removed, token) = {
            let mut state = shared.state.borrow_mut();
            let before = state.queue.len();
            state.queue.retain(|entry| entry.id != id);
            let removed = state.queue.len() != before;

            let token = if removed
                && state.queue.is_empty()
                && state.status == SchedulerStatus::Running
            {
                state.status = SchedulerStatus::Idle;
                state.token.take()
            } else {
                None
            };
            (removed, token)
        };

        if removed {
            debug!("Removed refresh callback #{}", id);
        }
        if let Some(token) = token {
            shared.source.unsubscribe(token);
            debug!("Frame scheduler idle");
        }
        removed
    }

    fn cancel_shared(shared: &SchedulerShared) {
        let token = {
            let mut state = shared.state.borrow_mut();
            if state.status != SchedulerStatus::Running {
                return;
            }
            state.status = SchedulerStatus::Cancelled;
            state.queue.clear();
            state.token.take()
        };

        if let Some(token) = token {
            shared.source.unsubscribe(token);
        }
        info!("Frame scheduler cancelled");
    }

    fn run_tick(shared: &SchedulerShared, info: &TickInfo) {
        let tick = {
            let mut state = shared.state.borrow_mut();
            if state.status != SchedulerStatus::Running {
                return;
            }
            state.ticks += 1;
            state.ticks
        };

        let ctx = &shared.context;
        let prepared = panic::catch_unwind(AssertUnwindSafe(|| {
            let pumped = ctx.pump_events();
            let frame = FrameContext::capture(info, tick);
            ctx.set_frame(frame);
            ctx.reset();
            ctx.clear();
            ctx.run_deferred();
            (pumped, frame)
        }));
        let (pumped, frame) = match prepared {
            Ok(prepared) => prepared,
            Err(payload) => {
                let fault = Error::Panicked(panic_message(payload.as_ref()));
                Self::abort_tick(shared, tick, fault);
                return;
            }
        };

        let callbacks: Vec<_> = shared
            .state
            .borrow()
            .queue
            .iter()
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        trace!(
            "tick {}: {} callbacks, {} host events",
            tick,
            callbacks.len(),
            pumped
        );

        for callback in callbacks {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                match callback.try_borrow_mut() {
                    Ok(mut callback) => (&mut *callback)(ctx, &frame),
                    Err(_) => Ok(()),
                }
            }));

            let fault = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(payload) => Error::Panicked(panic_message(payload.as_ref())),
            };

            Self::abort_tick(shared, tick, fault);
            break;
        }
    }

    /// Reports a tick fault on the Context and stops the scheduler.
    fn abort_tick(shared: &SchedulerShared, tick: u64, fault: Error) {
        error!("Tick {} aborted: {}", tick, fault);
        shared.context.emit_error(&fault);
        Self::cancel_shared(shared);
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("FrameScheduler")
            .field("status", &state.status)
            .field("queued", &state.queue.len())
            .field("ticks", &state.ticks)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

//=== Registration ========================================================

/// One queued callback. Dropping it leaves the callback queued.
#[derive(Debug, Clone)]
pub struct Registration {
    id: u64,
    scheduler: Weak<SchedulerShared>,
}

impl Registration {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Removes this callback from its scheduler.
    pub fn remove(&self) -> bool {
        match self.scheduler.upgrade() {
            Some(shared) => FrameScheduler::remove_shared(&shared, self.id),
            None => false,
        }
    }

    /// Handle that removes only this callback.
    pub fn cancel_handle(&self) -> CancelHandle {
        let registration = self.clone();
        CancelHandle::new(move || {
            registration.remove();
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
