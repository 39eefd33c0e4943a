//=========================================================================
// Axial Engine
//=========================================================================
//
// Windowed entry point: wires a Scene onto a Winit-backed host and runs
// the event loop.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run(setup)──>  [Event Loop]
//         │                          │
//         ├─ with_title()            ├─ WindowHost (viewport + ticks)
//         ├─ with_size()             ├─ Scene { context, scheduler,
//         ├─ with_backend()          │          keyboard, pointer }
//         └─ with_context_config()   ├─ setup(&scene)
//                                    └─ Platform::run() blocks until close
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::rc::Rc;

//=== External Crates =====================================================

use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::context::{Context, ContextConfig};
use crate::core::error::Result;
use crate::core::frame::FrameScheduler;
use crate::core::host::{GraphicsBackend, HeadlessBackend, HostWindow, TickSource, Viewport};
use crate::core::input::{Keyboard, Pointer};
use crate::platform::{Platform, WindowHost, WindowOptions};

//=== Scene ===============================================================

/// Everything a scene graph needs: one context, its frame scheduler, and
/// the two input aggregators bound to it.
#[derive(Clone)]
pub struct Scene {
    pub context: Rc<Context>,
    pub scheduler: FrameScheduler,
    pub keyboard: Keyboard,
    pub pointer: Pointer,
}

impl Scene {
    /// Builds a scene on any host that is both window and tick source.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::rc::Rc;
    /// use axial::core::{ContextConfig, HeadlessBackend, HeadlessHost};
    /// use axial::Scene;
    ///
    /// let host = Rc::new(HeadlessHost::default());
    /// let scene = Scene::new(host.clone(), Rc::new(HeadlessBackend::new()), ContextConfig::default());
    ///
    /// scene.scheduler.register(|_, _| Ok(()));
    /// host.advance(1.0 / 60.0);
    /// assert_eq!(scene.context.frame().tick, 1);
    /// ```
    pub fn new<H>(host: Rc<H>, backend: Rc<dyn GraphicsBackend>, config: ContextConfig) -> Self
    where
        H: HostWindow + TickSource + 'static,
    {
        let context = Context::new(host.clone(), backend, config);
        let scheduler = FrameScheduler::new(Rc::clone(&context), host);
        let keyboard = Keyboard::new(&context);
        let pointer = Pointer::new(&context);

        Self {
            context,
            scheduler,
            keyboard,
            pointer,
        }
    }
}

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Title**: "Axial"
/// - **Size**: 800x600 (logical pixels)
/// - **Backend**: [`HeadlessBackend`]
/// - **Context**: [`ContextConfig::default`]
///
/// # Examples
///
/// ```no_run
/// use axial::EngineBuilder;
///
/// EngineBuilder::new()
///     .with_title("Orbit demo")
///     .with_size(1280, 720)
///     .build()
///     .run(|scene| {
///         scene.scheduler.register(|_, _| Ok(()));
///         Ok(())
///     })
///     .expect("engine failed");
/// ```
pub struct EngineBuilder {
    title: String,
    size: Viewport,
    backend: Option<Rc<dyn GraphicsBackend>>,
    context: ContextConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            title: "Axial".to_owned(),
            size: Viewport::new(800, 600),
            backend: None,
            context: ContextConfig::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial inner window size.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be non-zero, got {}x{}", width, height);
        self.size = Viewport::new(width, height);
        self
    }

    /// Graphics backend handed to the Context.
    pub fn with_backend(mut self, backend: Rc<dyn GraphicsBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_context_config(mut self, config: ContextConfig) -> Self {
        self.context = config;
        self
    }

    pub fn build(self) -> Engine {
        info!("Building engine ('{}', {}x{})", self.title, self.size.width, self.size.height);

        Engine {
            options: WindowOptions {
                title: self.title,
                size: self.size,
            },
            backend: self
                .backend
                .unwrap_or_else(|| Rc::new(HeadlessBackend::new())),
            context: self.context,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Windowed runtime for one scene.
pub struct Engine {
    options: WindowOptions,
    backend: Rc<dyn GraphicsBackend>,
    context: ContextConfig,
}

impl Engine {
    /// Builds the scene, runs `setup` on it, then blocks in the event loop
    /// until the window closes.
    ///
    /// # Errors
    ///
    /// Returns the error from `setup` (the loop is not started), or
    /// [`crate::core::Error::EventLoop`] if the platform fails.
    pub fn run<F>(self, setup: F) -> Result<()>
    where
        F: FnOnce(&Scene) -> Result<()>,
    {
        info!("Starting engine runtime");

        let host = Rc::new(WindowHost::new(self.options.size));
        let scene = Scene::new(Rc::clone(&host), self.backend, self.context);

        if let Err(e) = setup(&scene) {
            error!("Scene setup failed: {}", e);
            return Err(e);
        }

        let platform = Platform::new(self.options, scene.context.event_sender(), host);
        let result = platform.run();

        if let Err(e) = &result {
            error!("Platform error: {}", e);
        }

        scene.scheduler.cancel();
        info!("Engine shutdown complete");
        result
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::HeadlessHost;
    use crate::core::input::event::{HostEvent, KeyCode};
    use crate::core::Error;

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new();
        assert_eq!(builder.title, "Axial");
        assert_eq!(builder.size, Viewport::new(800, 600));
        assert!(builder.backend.is_none());
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let engine = EngineBuilder::new()
            .with_title("demo")
            .with_size(1280, 720)
            .with_context_config(ContextConfig::default().with_channel_capacity(16))
            .build();

        assert_eq!(engine.options.title, "demo");
        assert_eq!(engine.options.size, Viewport::new(1280, 720));
        assert_eq!(engine.context.channel_capacity(), 16);
    }

    #[test]
    #[should_panic(expected = "Window size must be non-zero")]
    fn builder_rejects_empty_window() {
        EngineBuilder::new().with_size(0, 600);
    }

    #[test]
    fn failing_setup_skips_event_loop() {
        let result = EngineBuilder::new()
            .build()
            .run(|_| Err(Error::Failed("missing asset".into())));

        assert_eq!(result, Err(Error::Failed("missing asset".into())));
    }

    //=====================================================================
    // Scene Tests
    //=====================================================================

    #[test]
    fn scene_wires_input_through_ticks() {
        let host = Rc::new(HeadlessHost::default());
        let scene = Scene::new(host.clone(), Rc::new(HeadlessBackend::new()), ContextConfig::default());
        scene.scheduler.register(|_, _| Ok(()));

        let sender = scene.context.event_sender();
        sender.send(HostEvent::Focus).expect("send");
        sender.send(HostEvent::KeyDown(KeyCode::KeyW)).expect("send");
        host.advance(0.016);

        assert!(scene.context.has_focus());
        assert!(scene.keyboard.value("up"));
    }
}
