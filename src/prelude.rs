//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use axial::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine
pub use crate::engine::{Engine, EngineBuilder, Scene};

// Commands and context
pub use crate::core::{CancelHandle, Command, CommandScope, Context, ContextConfig, StateValue};

// Frame loop
pub use crate::core::{FrameContext, FrameScheduler, Registration};

// Input
pub use crate::core::{HostEvent, KeyCode, Keyboard, MouseButton, Pointer};

// Media and controllers
pub use crate::core::{
    AmbisonicController, Controller, ControllerStrategy, MediaTarget, Orbit, OrbitConfig,
    Transform,
};

// Errors
pub use crate::core::{Error, Result};
