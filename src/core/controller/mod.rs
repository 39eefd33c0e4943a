//=========================================================================
// Controllers
//=========================================================================
//
// Per-tick "state to target" pipes expressed as commands.
//
// Architecture:
// ```text
//   Controller<S> ── Command body ──> S::update(ctx, frame)
//                                        │ reads  Keyboard / Pointer / decoder state
//                                        └ writes target Transform / decoder matrix
// ```
//
// A controller composes its strategy; it does not specialize Command.
// `attach` queues the controller on a frame scheduler so it runs once per
// tick, ahead of any drawable registered after it.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod ambisonic;
pub mod orbit;

//=== Public API ==========================================================

pub use ambisonic::{
    rotation_matrix, Ambisonic, AmbisonicConfig, AmbisonicController, AmbisonicDecoder,
};
pub use orbit::{Orbit, OrbitConfig};

//=== Standard Library Imports ============================================

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

//=== External Crates =====================================================

use glam::{Quat, Vec3};

//=== Internal Dependencies ===============================================

use crate::core::command::{Command, CommandHandle};
use crate::core::context::Context;
use crate::core::error::Result;
use crate::core::frame::{FrameContext, FrameScheduler, Registration};

//=== Transform ===========================================================

/// Position and orientation written by controllers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Direction the transform faces (`-Z` rotated).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

//=== ControllerStrategy ==================================================

/// What a controller reads and what it mutates, once per tick.
pub trait ControllerStrategy {
    fn update(&mut self, ctx: &Context, frame: &FrameContext) -> Result<()>;
}

//=== Controller ==========================================================

/// Command running a [`ControllerStrategy`].
pub struct Controller<S> {
    strategy: Rc<RefCell<S>>,
    command: Command,
}

impl<S: ControllerStrategy + 'static> Controller<S> {
    pub fn new(name: impl Into<String>, strategy: S) -> Self {
        let strategy = Rc::new(RefCell::new(strategy));
        let inner = Rc::clone(&strategy);
        let command = Command::new(name, move |ctx: &Context, frame: &FrameContext, ()| {
            inner.borrow_mut().update(ctx, frame)?;
            Ok(None)
        });

        Self { strategy, command }
    }

    /// Runs one update scoped on `ctx`'s stack.
    pub fn invoke(&self, ctx: &Context) -> Result<()> {
        self.command.invoke(ctx, ()).map(|_| ())
    }

    /// Queues this controller on `scheduler`.
    ///
    /// The queued callback holds a weak reference; once the controller is
    /// dropped it does nothing.
    pub fn attach(self: &Rc<Self>, scheduler: &FrameScheduler) -> Registration {
        let controller = Rc::downgrade(self);
        scheduler.register(move |ctx, _| match controller.upgrade() {
            Some(controller) => controller.invoke(ctx),
            None => Ok(()),
        })
    }

    pub fn handle(&self) -> &CommandHandle {
        self.command.handle()
    }

    pub fn strategy(&self) -> Ref<'_, S> {
        self.strategy.borrow()
    }

    pub fn strategy_mut(&self) -> RefMut<'_, S> {
        self.strategy.borrow_mut()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
