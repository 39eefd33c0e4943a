//=========================================================================
// Host Interfaces
//=========================================================================
//
// Contracts with the collaborators the scene substrate does not own:
// the graphics backend, the host tick source, and the host window.
//
// Architecture:
// ```text
//   HostWindow ──viewport()──────────────> Context / FrameScheduler
//   TickSource ──subscribe(callback)─────> FrameScheduler (sole subscriber)
//   GraphicsBackend <──clear_buffers()──── Context::clear()
//                   <──create_texture()─── MediaTarget
// ```
//
// `headless` ships in-process implementations of all three so a scene can
// be driven without a window or GPU.
//
//=========================================================================

//=== Module Declarations =================================================

mod headless;

//=== Public API ==========================================================

pub use headless::{HeadlessBackend, HeadlessHost};

//=== Standard Library Imports ============================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

//=== Viewport ============================================================

/// Drawable surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, `1.0` for a degenerate surface.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

//=== HostWindow ==========================================================

/// Handle to the host window/event system, passed to the Context at
/// construction.
///
/// Events are pushed by the host (see [`crate::core::Context::dispatch`]
/// and [`crate::core::Context::event_sender`]); the core never polls.
pub trait HostWindow {
    /// Current drawable size.
    fn viewport(&self) -> Viewport;
}

//=== Graphics Backend ====================================================

/// Buffer clear parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearSpec {
    pub color: [f32; 4],
    pub depth: f32,
}

impl Default for ClearSpec {
    fn default() -> Self {
        Self {
            color: [17.0 / 255.0, 17.0 / 255.0, 17.0 / 255.0, 1.0],
            depth: 1.0,
        }
    }
}

/// Parameters for a backend texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureOptions {
    pub width: u32,
    pub height: u32,
}

/// Opaque identifier for a texture owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Rasterizing backend. The core only calls it at the Context's `clear()`
/// boundary and when media targets allocate their texture.
pub trait GraphicsBackend {
    fn clear_buffers(&self, spec: &ClearSpec);
    fn create_texture(&self, options: &TextureOptions) -> TextureHandle;
}

//=== Tick Source =========================================================

/// Timing and surface information delivered with every host tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickInfo {
    /// Seconds since the tick source started.
    pub time: f64,
    /// Seconds since the previous tick.
    pub dt: f64,
    /// Drawable size at the time of the tick.
    pub viewport: Viewport,
}

/// Identifies one subscription on a [`TickSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(pub u64);

/// Callback invoked once per display refresh.
pub type TickCallback = Box<dyn FnMut(&TickInfo)>;

/// Host display-refresh source. The frame scheduler is its sole subscriber.
pub trait TickSource {
    fn subscribe(&self, callback: TickCallback) -> TickToken;
    fn unsubscribe(&self, token: TickToken);
}

//=== TickSubscribers =====================================================

/// Subscriber list shared by tick source implementations.
///
/// `fire` iterates a snapshot and re-checks membership before each call,
/// so a subscriber that unsubscribes itself (or another) mid-tick is
/// honored without invalidating the iteration.
#[derive(Default)]
pub(crate) struct TickSubscribers {
    next_token: Cell<u64>,
    subscribers: RefCell<Vec<(TickToken, Rc<RefCell<TickCallback>>)>>,
}

impl TickSubscribers {
    pub(crate) fn subscribe(&self, callback: TickCallback) -> TickToken {
        let token = TickToken(self.next_token.get());
        self.next_token.set(token.0 + 1);
        self.subscribers
            .borrow_mut()
            .push((token, Rc::new(RefCell::new(callback))));
        token
    }

    pub(crate) fn unsubscribe(&self, token: TickToken) {
        self.subscribers.borrow_mut().retain(|(t, _)| *t != token);
    }

    pub(crate) fn fire(&self, info: &TickInfo) {
        let snapshot: Vec<_> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(t, cb)| (*t, Rc::clone(cb)))
            .collect();

        for (token, callback) in snapshot {
            if !self.is_subscribed(token) {
                continue;
            }
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (&mut *callback)(info);
            }
        }
    }

    pub(crate) fn is_subscribed(&self, token: TickToken) -> bool {
        self.subscribers.borrow().iter().any(|(t, _)| *t == token)
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
