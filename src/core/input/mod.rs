//=========================================================================
// Input Aggregation
//=========================================================================
//
// Turns pushed host events into per-tick queryable state.
//
// Architecture:
// ```text
//   HostEvent ──Context::dispatch()──┬──> Keyboard (codes, names, aliases)
//                                    └──> Pointer  (position, buttons, deltas)
// ```
//
// Both aggregators subscribe to their context at construction and detach
// when their last handle is dropped.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod alias;
pub mod event;
pub mod keyboard;
pub mod pointer;

//=== Public API ==========================================================

pub use alias::AliasMap;
pub use event::{HostEvent, KeyCode, MouseButton};
pub use keyboard::{Keyboard, KeyboardState};
pub use pointer::{Pointer, PointerState};
