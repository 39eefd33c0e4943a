//=========================================================================
// Platform Subsystem
//=========================================================================
//
// Bridges Winit (OS-level events) with the scene's Context and frame
// scheduler. Everything runs on the main thread.
//
// Architecture:
// ```text
//  Winit Event Loop
//   ↓
//  event_mapper ── WindowEvent → HostEvent
//   ↓
//  InputBuffer
//   ├─ discrete: Vec<>       (order kept, repeats dropped)
//   ├─ wheel: summed
//   └─ continuous: HashSet<> (latest wins)
//   ↓
//  RedrawRequested (frame boundary)
//   ├─ flush ──> Context::event_sender()   (bounded channel)
//   ├─ WindowHost::tick() ──> FrameScheduler
//   │                           └─ Context::pump_events() drains the batch
//   └─ request_redraw()
// ```
//
// A full channel drops the rest of the batch with a warning; the window
// keeps running so it can still be closed.
//
//=========================================================================

//=== Submodules ==========================================================

mod event_mapper;
mod host;
mod input_buffer;

//=== Public API ==========================================================

pub use host::WindowHost;

//=== Standard Library Imports ============================================

use std::rc::Rc;

//=== External Crates =====================================================

use crossbeam_channel::{Sender, TrySendError};
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Dependencies ===============================================

use crate::core::error::{Error, Result};
use crate::core::host::Viewport;
use crate::core::input::event::HostEvent;
use event_mapper::map_window_event;
use input_buffer::InputBuffer;

//=== WindowOptions =======================================================

/// Attributes of the window created on resume.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WindowOptions {
    pub title: String,
    pub size: Viewport,
}

//=== Platform ============================================================

/// Window manager and host event forwarder.
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(options, sender, host)`
/// 2. **Execution**: `platform.run()` blocks in the Winit event loop
/// 3. **Frames**: each `RedrawRequested` flushes input and fires one tick
/// 4. **Shutdown**: close request → loop exits → `run()` returns
pub(crate) struct Platform {
    /// OS window handle (None until `resumed()` called).
    window: Option<Window>,

    options: WindowOptions,

    /// Buffers host events until the next frame boundary.
    buffer: InputBuffer,

    /// Bounded channel into the scene's Context.
    event_sender: Sender<HostEvent>,

    host: Rc<WindowHost>,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    pub fn new(options: WindowOptions, event_sender: Sender<HostEvent>, host: Rc<WindowHost>) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            options,
            buffer: InputBuffer::new(),
            event_sender,
            host,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the Winit event loop until the window is closed.
    ///
    /// # Errors
    ///
    /// [`Error::EventLoop`] if the loop cannot be created or fails while
    /// running.
    pub fn run(mut self) -> Result<()> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(|e| Error::EventLoop(e.to_string()))?;
        event_loop
            .run_app(&mut self)
            .map_err(|e| Error::EventLoop(e.to_string()))
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends buffered events to the Context's channel.
    ///
    /// Returns the number of events delivered.
    fn flush_input_buffer(&mut self) -> usize {
        if self.buffer.is_empty() {
            return 0;
        }

        let events = self.buffer.drain();
        let total = events.len();
        trace!(target: "platform::input", "Flushing {} events", total);

        for (sent, event) in events.into_iter().enumerate() {
            match self.event_sender.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(
                        target: "platform::input",
                        "Host event channel full, dropping {} of {} events",
                        total - sent,
                        total
                    );
                    return sent;
                }
                Err(TrySendError::Disconnected(_)) => {
                    warn!(
                        target: "platform::input",
                        "Host event channel disconnected, dropping {} events",
                        total - sent
                    );
                    return sent;
                }
            }
        }
        total
    }

    fn on_frame(&mut self) {
        self.flush_input_buffer();
        self.host.tick();

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Creates the window on first resume.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.options.title.clone())
            .with_inner_size(LogicalSize::new(
                self.options.size.width,
                self.options.size.height,
            ));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                self.host.set_viewport(Viewport::new(size.width, size.height));
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                event_loop.exit();
                return;
            }

            WindowEvent::RedrawRequested => {
                self.on_frame();
                return;
            }

            WindowEvent::Resized(size) => {
                self.host.set_viewport(Viewport::new(size.width, size.height));
            }

            _ => {}
        }

        match map_window_event(&event) {
            Some(host_event) => self.buffer.push(host_event),
            None => trace!(target: "platform::input", "Ignored window event"),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
