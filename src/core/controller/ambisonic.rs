//=========================================================================
// Ambisonic Audio Controller
//=========================================================================
//
// Keeps a first-order ambisonic decoder's rotation in sync with a source
// transform (usually the camera) while its media target plays.
//
// Lifecycle:
// ```text
//   target load ──> factory creates decoder (once; repeats are ignored)
//               └─> Context::defer(initialize)  (next tick)
//                      └─ Err ─> error observers, logged
//   target playing ──> attach controller to the scheduler
//   target pause   ──> remove it
//   each tick      ──> decoder.set_rotation_matrix(
//                         Mat3::from_quat(source.rotation)
//                         * translate(-target.position.xy))
// ```
//
// Initialization faults stay out of the tick loop: they are reported on
// this controller's error observers, never through the scheduler.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

//=== External Crates =====================================================

use glam::{Mat3, Quat, Vec3};
use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use super::{Controller, ControllerStrategy, Transform};
use crate::core::context::{Context, Signal, SubscriptionId};
use crate::core::error::{Error, Result};
use crate::core::frame::{FrameContext, FrameScheduler, Registration};
use crate::core::media::MediaTarget;

//=== Decoder Interface ===================================================

/// Spatial-audio decoder owned by the audio backend.
pub trait AmbisonicDecoder {
    /// Prepares the decoder. Rotation updates are skipped until it succeeds.
    fn initialize(&mut self) -> Result<()>;

    fn set_rotation_matrix(&mut self, matrix: Mat3);
}

/// Decoder options handed to the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbisonicConfig {
    /// Input channel order (ACN by default).
    pub channel_map: [usize; 4],
}

impl Default for AmbisonicConfig {
    fn default() -> Self {
        Self {
            channel_map: [0, 1, 2, 3],
        }
    }
}

/// Decoder rotation for a source orientation and target placement.
pub fn rotation_matrix(rotation: Quat, position: Vec3) -> Mat3 {
    Mat3::from_quat(rotation) * Mat3::from_translation(-position.truncate())
}

//=== Ambisonic ===========================================================

struct DecoderSlot {
    decoder: Box<dyn AmbisonicDecoder>,
    initialized: bool,
}

type SharedSlot = Rc<RefCell<Option<DecoderSlot>>>;

/// Strategy writing the decoder rotation once per tick.
pub struct Ambisonic {
    slot: SharedSlot,
    source: Rc<RefCell<Transform>>,
    target: Rc<MediaTarget>,
}

impl ControllerStrategy for Ambisonic {
    fn update(&mut self, _ctx: &Context, _frame: &FrameContext) -> Result<()> {
        let mut slot = self.slot.borrow_mut();
        let Some(slot) = slot.as_mut().filter(|slot| slot.initialized) else {
            return Ok(());
        };

        let rotation = self.source.borrow().rotation;
        let position = self.target.transform().position;
        slot.decoder.set_rotation_matrix(rotation_matrix(rotation, position));
        Ok(())
    }
}

//=== AmbisonicController =================================================

/// Wires an [`Ambisonic`] controller to a media target's lifecycle.
pub struct AmbisonicController {
    controller: Rc<Controller<Ambisonic>>,
    target: Rc<MediaTarget>,
    slot: SharedSlot,
    registration: Rc<RefCell<Option<Registration>>>,
    errors: Rc<Signal<Error>>,
    subscriptions: [SubscriptionId; 3],
}

impl AmbisonicController {
    /// Subscribes to `target`; the decoder is created on its first `load`.
    pub fn new<F>(
        ctx: &Rc<Context>,
        scheduler: &FrameScheduler,
        target: Rc<MediaTarget>,
        source: Rc<RefCell<Transform>>,
        config: AmbisonicConfig,
        factory: F,
    ) -> Self
    where
        F: FnMut(&MediaTarget, &AmbisonicConfig) -> Result<Box<dyn AmbisonicDecoder>> + 'static,
    {
        let slot: SharedSlot = Rc::new(RefCell::new(None));
        let errors = Rc::new(Signal::new());
        let registration = Rc::new(RefCell::new(None));

        let controller = Rc::new(Controller::new(
            "ambisonic-audio",
            Ambisonic {
                slot: Rc::clone(&slot),
                source,
                target: Rc::clone(&target),
            },
        ));

        let on_load = target.on_load(Self::load_observer(
            Rc::downgrade(ctx),
            Rc::downgrade(&target),
            Rc::clone(&slot),
            Rc::clone(&errors),
            config,
            factory,
        ));

        let on_playing = {
            let controller = Rc::downgrade(&controller);
            let registration = Rc::clone(&registration);
            let scheduler = scheduler.clone();
            target.on_playing(move |_| {
                Self::stop(&registration);
                if let Some(controller) = controller.upgrade() {
                    *registration.borrow_mut() = Some(controller.attach(&scheduler));
                    debug!("Ambisonic controller started");
                }
            })
        };

        let on_pause = {
            let registration = Rc::clone(&registration);
            target.on_pause(move |_| {
                if Self::stop(&registration) {
                    debug!("Ambisonic controller stopped");
                }
            })
        };

        Self {
            controller,
            target,
            slot,
            registration,
            errors,
            subscriptions: [on_load, on_playing, on_pause],
        }
    }

    fn load_observer<F>(
        ctx: Weak<Context>,
        target: Weak<MediaTarget>,
        slot: SharedSlot,
        errors: Rc<Signal<Error>>,
        config: AmbisonicConfig,
        mut factory: F,
    ) -> impl FnMut(&()) + 'static
    where
        F: FnMut(&MediaTarget, &AmbisonicConfig) -> Result<Box<dyn AmbisonicDecoder>> + 'static,
    {
        move |_| {
            let Some(target) = target.upgrade() else {
                return;
            };
            if slot.borrow().is_some() {
                warn!("Decoder for '{}' already exists, ignoring load", target.name());
                return;
            }

            match factory(&target, &config) {
                Ok(decoder) => {
                    *slot.borrow_mut() = Some(DecoderSlot {
                        decoder,
                        initialized: false,
                    });
                    debug!("Created ambisonic decoder for '{}'", target.name());

                    if let Some(ctx) = ctx.upgrade() {
                        let slot = Rc::clone(&slot);
                        let errors = Rc::clone(&errors);
                        ctx.defer(move |_| Self::initialize(&slot, &errors));
                    }
                }
                Err(err) => {
                    error!("Decoder creation failed for '{}': {}", target.name(), err);
                    errors.emit(&err);
                }
            }
        }
    }

    fn initialize(slot: &SharedSlot, errors: &Signal<Error>) {
        let result = {
            let mut slot = slot.borrow_mut();
            let Some(slot) = slot.as_mut() else {
                return;
            };
            let result = slot.decoder.initialize();
            slot.initialized = result.is_ok();
            result
        };

        match result {
            Ok(()) => debug!("Ambisonic decoder initialized"),
            Err(err) => {
                error!("Ambisonic decoder initialization failed: {}", err);
                errors.emit(&err);
            }
        }
    }

    fn stop(registration: &RefCell<Option<Registration>>) -> bool {
        let previous = registration.borrow_mut().take();
        match previous {
            Some(previous) => {
                previous.remove();
                true
            }
            None => false,
        }
    }

    //=== Queries =========================================================

    pub fn controller(&self) -> &Rc<Controller<Ambisonic>> {
        &self.controller
    }

    pub fn target(&self) -> &Rc<MediaTarget> {
        &self.target
    }

    pub fn has_decoder(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub fn is_decoder_initialized(&self) -> bool {
        self.slot
            .borrow()
            .as_ref()
            .is_some_and(|slot| slot.initialized)
    }

    /// `true` while queued on the scheduler (between `playing` and `pause`).
    pub fn is_active(&self) -> bool {
        self.registration.borrow().is_some()
    }

    /// Observes decoder creation and initialization failures.
    pub fn on_error<F: FnMut(&Error) + 'static>(&self, observer: F) -> SubscriptionId {
        self.errors.subscribe(observer)
    }
}

impl Drop for AmbisonicController {
    fn drop(&mut self) {
        for id in self.subscriptions {
            self.target.unsubscribe(id);
        }
        Self::stop(&self.registration);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
