//=========================================================================
// Command
//=========================================================================
//
// Named, invokable unit that scopes itself onto a Context's stack for the
// duration of its body.
//
// Invocation protocol:
// ```text
//   invoke(ctx, args)
//     ├─ ctx.enter(handle)      push (rejects re-entry)
//     ├─ body(ctx, frame, args) may invoke nested commands
//     └─ guard dropped          pop, on success, error, or panic
// ```
//
// Specialized commands (keyboard, controllers) compose a `Command` or a
// bare `CommandScope` instead of extending one.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

//=== External Crates =====================================================

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::context::{Context, StackGuard};
use crate::core::error::{Error, Result};
use crate::core::frame::FrameContext;

//=== CommandHandle =======================================================

static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(0);

/// Stack entry identifying one command instance.
///
/// Handles compare by instance identity. A handle outlives its command but
/// stops being callable once the command is dropped.
#[derive(Clone)]
pub struct CommandHandle {
    id: u64,
    name: Rc<str>,
    alive: Weak<()>,
}

impl CommandHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` while the owning command is alive.
    pub fn is_callable(&self) -> bool {
        self.alive.strong_count() > 0
    }
}

impl PartialEq for CommandHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CommandHandle {}

impl fmt::Debug for CommandHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandHandle({}#{})", self.name, self.id)
    }
}

//=== CommandScope ========================================================

/// Identity and liveness of one command.
///
/// Owns the token that keeps its [`CommandHandle`] callable.
pub struct CommandScope {
    handle: CommandHandle,
    _alive: Rc<()>,
}

impl CommandScope {
    pub fn new(name: impl Into<String>) -> Self {
        let alive = Rc::new(());
        let name: String = name.into();
        Self {
            handle: CommandHandle {
                id: NEXT_COMMAND_ID.fetch_add(1, Ordering::Relaxed),
                name: Rc::from(name),
                alive: Rc::downgrade(&alive),
            },
            _alive: alive,
        }
    }

    pub fn handle(&self) -> &CommandHandle {
        &self.handle
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Pushes this command on `ctx` until the guard is dropped.
    pub fn enter<'a>(&self, ctx: &'a Context) -> Result<StackGuard<'a>> {
        ctx.enter(&self.handle)
    }
}

//=== CancelHandle ========================================================

/// Detaches whatever a command body acquired (timers, subscriptions).
#[derive(Clone)]
pub struct CancelHandle(Rc<dyn Fn()>);

impl CancelHandle {
    pub fn new<F: Fn() + 'static>(cancel: F) -> Self {
        Self(Rc::new(cancel))
    }

    pub fn cancel(&self) {
        (self.0)()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CancelHandle")
    }
}

//=== Command =============================================================

type Body<A> = Box<dyn FnMut(&Context, &FrameContext, A) -> Result<Option<CancelHandle>>>;

/// Command wrapping a user body.
///
/// `A` is the argument type forwarded from [`invoke`](Self::invoke) to the
/// body.
///
/// # Example
/// ```
/// use std::rc::Rc;
/// use axial::core::{Command, Context, ContextConfig, HeadlessBackend, HeadlessHost};
///
/// let ctx = Context::new(
///     Rc::new(HeadlessHost::default()),
///     Rc::new(HeadlessBackend::new()),
///     ContextConfig::default(),
/// );
/// let mesh = Command::new("mesh", |ctx: &Context, _frame, scale: f32| {
///     assert_eq!(ctx.current().map(|c| c.name().to_owned()), Some("mesh".into()));
///     assert!(scale > 0.0);
///     Ok(None)
/// });
///
/// mesh.invoke(&ctx, 2.0).unwrap();
/// assert_eq!(ctx.depth(), 0);
/// ```
pub struct Command<A = ()> {
    scope: CommandScope,
    body: RefCell<Body<A>>,
    cancel: RefCell<Option<CancelHandle>>,
}

impl<A> Command<A> {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: FnMut(&Context, &FrameContext, A) -> Result<Option<CancelHandle>> + 'static,
    {
        Self {
            scope: CommandScope::new(name),
            body: RefCell::new(Box::new(body)),
            cancel: RefCell::new(None),
        }
    }

    pub fn handle(&self) -> &CommandHandle {
        self.scope.handle()
    }

    pub fn name(&self) -> &str {
        self.scope.name()
    }

    /// Runs the body scoped on `ctx`'s stack.
    ///
    /// The body receives the context's current [`FrameContext`]. A cancel
    /// handle it returns is kept for [`cancel`](Self::cancel) and handed back
    /// to the caller.
    ///
    /// # Errors
    /// [`Error::Reentrant`] if this command is already running, on `ctx` or
    /// any other context; otherwise whatever the body returns.
    pub fn invoke(&self, ctx: &Context, args: A) -> Result<Option<CancelHandle>> {
        let _guard = self.scope.enter(ctx)?;
        let frame = ctx.frame();

        let cancel = {
            let mut body = self.body.try_borrow_mut().map_err(|_| Error::Reentrant {
                command: self.name().to_owned(),
            })?;
            (&mut *body)(ctx, &frame, args)?
        };

        if let Some(handle) = &cancel {
            *self.cancel.borrow_mut() = Some(handle.clone());
        }
        Ok(cancel)
    }

    /// Invokes the cancel handle returned by the most recent invocation.
    ///
    /// Returns `false` if there was none.
    pub fn cancel(&self) -> bool {
        let handle = self.cancel.borrow_mut().take();
        match handle {
            Some(handle) => {
                debug!("Cancelling command '{}'", self.name());
                handle.cancel();
                true
            }
            None => false,
        }
    }
}

impl<A> fmt::Debug for Command<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("handle", self.handle())
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
