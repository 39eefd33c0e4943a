//=========================================================================
// Core Substrate
//=========================================================================
//
// Window-independent half of the crate: the command stack, the frame
// scheduler, input aggregation, media proxies, and controllers.
//
// Architecture:
// ```text
//   TickSource ──tick──> FrameScheduler ──per callback──> Command::invoke
//                            │                               │
//                            ├─ Context::pump_events()       ├─ Context stack (push/pop)
//                            ├─ Context::reset()/clear()     └─ Controller<S>::update
//                            └─ Context::run_deferred()
//
//   HostEvent ──Context::dispatch()──> Keyboard / Pointer
//   MediaTarget ──load/playing/pause──> AmbisonicController
// ```
//
// All of it is single-threaded (`Rc`/`RefCell`); only `HostEvent`s may
// cross threads, through the Context's bounded channel.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod command;
pub mod context;
pub mod controller;
pub mod error;
pub mod frame;
pub mod host;
pub mod input;
pub mod media;

//=== Public API ==========================================================

pub use command::{CancelHandle, Command, CommandHandle, CommandScope};
pub use context::{
    Context, ContextConfig, SharedState, Signal, StackGuard, StateValue, SubscriptionId,
};
pub use controller::{
    rotation_matrix, Ambisonic, AmbisonicConfig, AmbisonicController, AmbisonicDecoder,
    Controller, ControllerStrategy, Orbit, OrbitConfig, Transform,
};
pub use error::{Error, Result};
pub use frame::{FrameContext, FrameScheduler, RefreshCallback, Registration, SchedulerStatus};
pub use host::{
    ClearSpec, GraphicsBackend, HeadlessBackend, HeadlessHost, HostWindow, TextureHandle,
    TextureOptions, TickCallback, TickInfo, TickSource, TickToken, Viewport,
};
pub use input::{AliasMap, HostEvent, KeyCode, Keyboard, KeyboardState, MouseButton, Pointer, PointerState};
pub use media::MediaTarget;
