//=========================================================================
// Input Buffer
//=========================================================================
//
// Collects host events between two redraws and hands them over as one
// batch at the frame boundary.
//
// Normalization:
// - Discrete events (keys, buttons, focus, touch start/end) keep their
//   order; an event equal to its predecessor is dropped.
// - Continuous events (pointer/touch motion, resize) are coalesced; the
//   latest value of each kind wins.
// - Wheel deltas are summed into one event.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use crate::core::input::event::HostEvent;

//=== InputBuffer =========================================================

pub(crate) struct InputBuffer {
    discrete: Vec<HostEvent>,
    continuous: HashSet<HostEvent>,
    wheel: Option<(f32, f32)>,
}

impl InputBuffer {
    pub fn new() -> Self {
        const DISCRETE_BASE: usize = 128;
        const CONTINUOUS_BASE: usize = 4;

        Self {
            discrete: Vec::with_capacity(DISCRETE_BASE),
            continuous: HashSet::with_capacity(CONTINUOUS_BASE),
            wheel: None,
        }
    }

    /// Files `event` under its category.
    pub fn push(&mut self, event: HostEvent) {
        match event {
            HostEvent::Wheel { dx, dy } => {
                let (sx, sy) = self.wheel.unwrap_or((0.0, 0.0));
                self.wheel = Some((sx + dx, sy + dy));
            }
            event if event.is_continuous() => {
                self.continuous.replace(event);
            }
            event => {
                if self.discrete.last() != Some(&event) {
                    self.discrete.push(event);
                }
            }
        }
    }

    /// Empties the buffer: discrete events in arrival order, then the
    /// summed wheel, then the latest continuous values.
    pub fn drain(&mut self) -> Vec<HostEvent> {
        let mut events = std::mem::take(&mut self.discrete);
        if let Some((dx, dy)) = self.wheel.take() {
            events.push(HostEvent::Wheel { dx, dy });
        }
        events.extend(self.continuous.drain());
        events
    }

    pub fn len(&self) -> usize {
        self.discrete.len() + self.continuous.len() + usize::from(self.wheel.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
