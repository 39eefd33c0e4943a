//=========================================================================
// Window Host
//=========================================================================
//
// Host window handle and tick source backed by the Winit window.
//
// The platform reports the window size on creation and resize, and calls
// `tick()` once per `RedrawRequested`; timing comes from a monotonic clock
// started when the first tick fires.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::Cell;
use std::time::Instant;

//=== External Crates =====================================================

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::host::{
    HostWindow, TickCallback, TickInfo, TickSource, TickSubscribers, TickToken, Viewport,
};

//=== WindowHost ==========================================================

/// [`HostWindow`] and [`TickSource`] for a Winit window.
pub struct WindowHost {
    viewport: Cell<Viewport>,
    started: Cell<Option<Instant>>,
    last: Cell<f64>,
    subscribers: TickSubscribers,
}

impl WindowHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Cell::new(viewport),
            started: Cell::new(None),
            last: Cell::new(0.0),
            subscribers: TickSubscribers::default(),
        }
    }

    pub(crate) fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }

    /// Fires one tick timed against the monotonic clock.
    pub(crate) fn tick(&self) {
        let now = Instant::now();
        let started = match self.started.get() {
            Some(started) => started,
            None => {
                self.started.set(Some(now));
                now
            }
        };

        let time = now.duration_since(started).as_secs_f64();
        let info = TickInfo {
            time,
            dt: time - self.last.get(),
            viewport: self.viewport.get(),
        };
        self.last.set(time);

        trace!(target: "platform", "Tick at {:.3}s (dt {:.4}s)", info.time, info.dt);
        self.subscribers.fire(&info);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl HostWindow for WindowHost {
    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }
}

impl TickSource for WindowHost {
    fn subscribe(&self, callback: TickCallback) -> TickToken {
        self.subscribers.subscribe(callback)
    }

    fn unsubscribe(&self, token: TickToken) {
        self.subscribers.unsubscribe(token);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn ticks_report_monotonic_time_and_viewport() {
        let host = WindowHost::new(Viewport::new(320, 200));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        host.subscribe(Box::new(move |info| s.borrow_mut().push(*info)));

        host.tick();
        host.set_viewport(Viewport::new(640, 400));
        host.tick();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].time, 0.0);
        assert_eq!(seen[0].dt, 0.0);
        assert!(seen[1].time >= seen[0].time);
        assert!(seen[1].dt >= 0.0);
        assert_eq!(seen[1].viewport, Viewport::new(640, 400));
    }

    #[test]
    fn unsubscribed_callbacks_stop_firing() {
        let host = WindowHost::new(Viewport::default());
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let token = host.subscribe(Box::new(move |_| c.set(c.get() + 1)));

        host.tick();
        host.unsubscribe(token);
        host.tick();

        assert_eq!(count.get(), 1);
        assert_eq!(host.subscriber_count(), 0);
    }
}
