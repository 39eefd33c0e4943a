//=========================================================================
// Axial — Library Root
//=========================================================================
//
// A declarative command substrate for tick-driven 3D scenes.
//
// Responsibilities:
// - `core`: commands, the per-scene Context, the frame scheduler, input
//   aggregation, media targets, and controllers (no window required)
// - `platform`: Winit window host (internal)
// - `engine`: `Engine` / `EngineBuilder` facade tying the two together
//
// Typical usage:
// ```no_run
// use axial::EngineBuilder;
//
// fn main() -> axial::Result<()> {
//     EngineBuilder::new().build().run(|scene| {
//         scene.scheduler.register(|ctx, frame| {
//             log::trace!("tick {} at {}x{}", frame.tick, ctx.viewport().width, ctx.viewport().height);
//             Ok(())
//         });
//         Ok(())
//     })
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------

pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------

mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use crate::core::{Error, Result};
pub use engine::{Engine, EngineBuilder, Scene};
pub use platform::WindowHost;
