//=========================================================================
// Headless Host
//=========================================================================
//
// In-process host window, tick source, and graphics backend.
//
// `HeadlessHost` advances time manually (`advance(dt)`) and reports a
// configurable viewport. `HeadlessBackend` records clears and hands out
// texture ids without touching a GPU.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::Cell;

//=== Internal Dependencies ===============================================

use super::{
    ClearSpec, GraphicsBackend, HostWindow, TextureHandle, TextureOptions, TickCallback,
    TickInfo, TickSource, TickSubscribers, TickToken, Viewport,
};

//=== HeadlessHost ========================================================

/// Host window and tick source driven by explicit calls.
pub struct HeadlessHost {
    viewport: Cell<Viewport>,
    time: Cell<f64>,
    subscribers: TickSubscribers,
}

impl HeadlessHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Cell::new(viewport),
            time: Cell::new(0.0),
            subscribers: TickSubscribers::default(),
        }
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }

    /// Advances the clock by `dt` seconds and fires one tick.
    pub fn advance(&self, dt: f64) {
        let time = self.time.get() + dt;
        self.time.set(time);
        self.fire(&TickInfo {
            time,
            dt,
            viewport: self.viewport.get(),
        });
    }

    /// Fires one tick with explicit timing information.
    pub fn fire(&self, info: &TickInfo) {
        self.subscribers.fire(info);
    }

    /// Number of live tick subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(Viewport::new(800, 600))
    }
}

impl HostWindow for HeadlessHost {
    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }
}

impl TickSource for HeadlessHost {
    fn subscribe(&self, callback: TickCallback) -> TickToken {
        self.subscribers.subscribe(callback)
    }

    fn unsubscribe(&self, token: TickToken) {
        self.subscribers.unsubscribe(token);
    }
}

//=== HeadlessBackend =====================================================

/// Graphics backend that only records what it was asked to do.
#[derive(Default)]
pub struct HeadlessBackend {
    clears: Cell<usize>,
    last_clear: Cell<Option<ClearSpec>>,
    textures: Cell<u64>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `clear_buffers` calls so far.
    pub fn clear_count(&self) -> usize {
        self.clears.get()
    }

    pub fn last_clear(&self) -> Option<ClearSpec> {
        self.last_clear.get()
    }

    /// Number of textures created so far.
    pub fn texture_count(&self) -> u64 {
        self.textures.get()
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn clear_buffers(&self, spec: &ClearSpec) {
        self.clears.set(self.clears.get() + 1);
        self.last_clear.set(Some(*spec));
    }

    fn create_texture(&self, _options: &TextureOptions) -> TextureHandle {
        let id = self.textures.get();
        self.textures.set(id + 1);
        TextureHandle(id)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
