//=========================================================================
// Media Target
//=========================================================================
//
// Typed proxy for an externally decoded media element (video, audio).
//
// The media backend reports lifecycle changes through the `emit_*` calls;
// controllers subscribe with the `on_*` calls. Only the enumerated
// properties below are exposed; the decoder itself stays opaque.
//
// Lifecycle:
// ```text
//   emit_load ──> ready
//   emit_playing ──> playing ⇄ paused <── emit_pause
//   emit_error ──> observers (state unchanged)
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::Cell;

//=== External Crates =====================================================

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::context::{Context, Signal, SubscriptionId};
use crate::core::controller::Transform;
use crate::core::error::Error;
use crate::core::host::{TextureHandle, TextureOptions};

//=== MediaTarget =========================================================

/// Media element a scene draws and controllers react to.
pub struct MediaTarget {
    name: String,
    texture: TextureHandle,

    ready: Cell<bool>,
    playing: Cell<bool>,
    paused: Cell<bool>,
    muted: Cell<bool>,
    volume: Cell<f32>,
    transform: Cell<Transform>,

    load_signal: Signal<()>,
    playing_signal: Signal<()>,
    pause_signal: Signal<()>,
    error_signal: Signal<Error>,
}

impl MediaTarget {
    /// Creates a target and allocates its texture on `ctx`'s backend.
    pub fn new(ctx: &Context, name: impl Into<String>, texture: TextureOptions) -> Self {
        let name = name.into();
        let texture = ctx.backend().create_texture(&texture);
        debug!("Media target '{}' bound to {:?}", name, texture);

        Self {
            name,
            texture,
            ready: Cell::new(false),
            playing: Cell::new(false),
            paused: Cell::new(true),
            muted: Cell::new(false),
            volume: Cell::new(1.0),
            transform: Cell::new(Transform::IDENTITY),
            load_signal: Signal::new(),
            playing_signal: Signal::new(),
            pause_signal: Signal::new(),
            error_signal: Signal::new(),
        }
    }

    //=== Accessors =======================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// `true` once the backend has reported `load`.
    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.get()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn is_muted(&self) -> bool {
        self.muted.get()
    }

    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    /// Clamped to `0.0..=1.0`.
    pub fn set_volume(&self, volume: f32) {
        self.volume.set(volume.clamp(0.0, 1.0));
    }

    /// Placement of the surface the media is drawn on.
    pub fn transform(&self) -> Transform {
        self.transform.get()
    }

    pub fn set_transform(&self, transform: Transform) {
        self.transform.set(transform);
    }

    //=== Backend notifications ===========================================

    pub fn emit_load(&self) {
        self.ready.set(true);
        debug!("Media '{}' loaded", self.name);
        self.load_signal.emit(&());
    }

    pub fn emit_playing(&self) {
        self.playing.set(true);
        self.paused.set(false);
        self.playing_signal.emit(&());
    }

    pub fn emit_pause(&self) {
        self.playing.set(false);
        self.paused.set(true);
        self.pause_signal.emit(&());
    }

    pub fn emit_mute(&self) {
        self.muted.set(true);
    }

    pub fn emit_unmute(&self) {
        self.muted.set(false);
    }

    pub fn emit_error(&self, error: &Error) {
        self.error_signal.emit(error);
    }

    //=== Subscriptions ===================================================

    pub fn on_load<F: FnMut(&()) + 'static>(&self, observer: F) -> SubscriptionId {
        self.load_signal.subscribe(observer)
    }

    pub fn on_playing<F: FnMut(&()) + 'static>(&self, observer: F) -> SubscriptionId {
        self.playing_signal.subscribe(observer)
    }

    pub fn on_pause<F: FnMut(&()) + 'static>(&self, observer: F) -> SubscriptionId {
        self.pause_signal.subscribe(observer)
    }

    pub fn on_error<F: FnMut(&Error) + 'static>(&self, observer: F) -> SubscriptionId {
        self.error_signal.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.load_signal.unsubscribe(id)
            | self.playing_signal.unsubscribe(id)
            | self.pause_signal.unsubscribe(id)
            | self.error_signal.unsubscribe(id)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
