//=========================================================================
// Orbit Controller
//=========================================================================
//
// Orbits a target transform around a center point.
//
// Per tick:
// ```text
//   impulse  = drag delta × sensitivity          (while a button is held)
//            + alias keys × key_speed × dt       (up/down/left/right)
//   velocity += impulse (axes optionally inverted)
//   yaw, pitch += velocity; pitch clamped
//   velocity *= exp(-damping × dt)
//   distance -= wheel.y × zoom_speed; clamped
//   target = center + spherical(yaw, pitch, distance), facing center
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

//=== External Crates =====================================================

use glam::{Quat, Vec2, Vec3};

//=== Internal Dependencies ===============================================

use super::{ControllerStrategy, Transform};
use crate::core::context::Context;
use crate::core::error::Result;
use crate::core::frame::FrameContext;
use crate::core::input::{Keyboard, Pointer};

//=== OrbitConfig =========================================================

/// Tuning for [`Orbit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitConfig {
    pub center: Vec3,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Initial horizontal angle in radians.
    pub yaw: f32,
    /// Initial vertical angle in radians.
    pub pitch: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// Radians per pixel of drag.
    pub sensitivity: f32,
    /// Radians per second while an alias key is held.
    pub key_speed: f32,
    /// Distance per wheel line.
    pub zoom_speed: f32,
    /// Exponential velocity decay rate, per second.
    pub damping: f32,
    pub invert_x: bool,
    pub invert_y: bool,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            distance: 5.0,
            min_distance: 0.5,
            max_distance: 100.0,
            yaw: 0.0,
            pitch: 0.3,
            min_pitch: -FRAC_PI_2 + 0.01,
            max_pitch: FRAC_PI_2 - 0.01,
            sensitivity: 0.005,
            key_speed: 1.5,
            zoom_speed: 0.5,
            damping: 8.0,
            invert_x: false,
            invert_y: false,
        }
    }
}

impl OrbitConfig {
    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self
    }

    /// # Panics
    /// Panics unless `0 < min <= max`.
    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        assert!(min > 0.0 && min <= max, "Distance limits must satisfy 0 < min <= max");
        self.min_distance = min;
        self.max_distance = max;
        self.distance = self.distance.clamp(min, max);
        self
    }

    /// # Panics
    /// Panics if `min > max`.
    pub fn with_pitch_limits(mut self, min: f32, max: f32) -> Self {
        assert!(min <= max, "Pitch limits must satisfy min <= max");
        self.min_pitch = min;
        self.max_pitch = max;
        self.pitch = self.pitch.clamp(min, max);
        self
    }

    pub fn with_angles(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch.clamp(self.min_pitch, self.max_pitch);
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_key_speed(mut self, key_speed: f32) -> Self {
        self.key_speed = key_speed;
        self
    }

    pub fn with_zoom_speed(mut self, zoom_speed: f32) -> Self {
        self.zoom_speed = zoom_speed;
        self
    }

    /// # Panics
    /// Panics if `damping` is negative.
    pub fn with_damping(mut self, damping: f32) -> Self {
        assert!(damping >= 0.0, "Damping must be non-negative");
        self.damping = damping;
        self
    }

    pub fn with_inversion(mut self, invert_x: bool, invert_y: bool) -> Self {
        self.invert_x = invert_x;
        self.invert_y = invert_y;
        self
    }
}

//=== Orbit ===============================================================

/// Orbit strategy for [`Controller`](super::Controller).
pub struct Orbit {
    config: OrbitConfig,
    target: Rc<RefCell<Transform>>,
    keyboard: Option<Keyboard>,
    pointer: Option<Pointer>,
    yaw: f32,
    pitch: f32,
    distance: f32,
    velocity: Vec2,
}

impl Orbit {
    /// Places `target` at its initial orbit position.
    pub fn new(config: OrbitConfig, target: Rc<RefCell<Transform>>) -> Self {
        let orbit = Self {
            yaw: config.yaw,
            pitch: config.pitch.clamp(config.min_pitch, config.max_pitch),
            distance: config.distance.clamp(config.min_distance, config.max_distance),
            config,
            target,
            keyboard: None,
            pointer: None,
            velocity: Vec2::ZERO,
        };
        orbit.write_target();
        orbit
    }

    /// Reads the `up/down/left/right` aliases from `keyboard`.
    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Reads drag and wheel deltas from `pointer`.
    pub fn with_pointer(mut self, pointer: Pointer) -> Self {
        self.pointer = Some(pointer);
        self
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Angular velocity in radians per tick (x = yaw, y = pitch).
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    //--- Internal Helpers ------------------------------------------------

    fn impulse(&self, dt: f32) -> Vec2 {
        let mut impulse = Vec2::ZERO;

        if let Some(pointer) = &self.pointer {
            let state = pointer.state();
            if state.is_dragging() {
                let delta = state.delta();
                impulse += Vec2::new(-delta.x, delta.y) * self.config.sensitivity;
            }
        }

        if let Some(keyboard) = &self.keyboard {
            let state = keyboard.state();
            let mut direction = Vec2::ZERO;
            if state.value("left") {
                direction.x += 1.0;
            }
            if state.value("right") {
                direction.x -= 1.0;
            }
            if state.value("up") {
                direction.y += 1.0;
            }
            if state.value("down") {
                direction.y -= 1.0;
            }
            impulse += direction * self.config.key_speed * dt;
        }

        if self.config.invert_x {
            impulse.x = -impulse.x;
        }
        if self.config.invert_y {
            impulse.y = -impulse.y;
        }
        impulse
    }

    fn zoom(&mut self) {
        let Some(pointer) = &self.pointer else {
            return;
        };
        let scroll = pointer.wheel().y;
        if scroll != 0.0 {
            self.distance = (self.distance - scroll * self.config.zoom_speed)
                .clamp(self.config.min_distance, self.config.max_distance);
        }
    }

    fn write_target(&self) {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        ) * self.distance;

        let mut target = self.target.borrow_mut();
        target.position = self.config.center + offset;
        target.rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(-self.pitch);
    }
}

impl ControllerStrategy for Orbit {
    fn update(&mut self, _ctx: &Context, frame: &FrameContext) -> Result<()> {
        let dt = frame.dt.max(0.0) as f32;

        self.velocity += self.impulse(dt);
        self.yaw += self.velocity.x;
        self.pitch = (self.pitch + self.velocity.y).clamp(self.config.min_pitch, self.config.max_pitch);
        self.velocity *= (-self.config.damping * dt).exp();

        self.zoom();
        self.write_target();
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ContextConfig;
    use crate::core::controller::Controller;
    use crate::core::frame::FrameScheduler;
    use crate::core::host::{HeadlessBackend, HeadlessHost};
    use crate::core::input::{HostEvent, KeyCode, MouseButton};

    const EPS: f32 = 1e-5;

    struct Scene {
        host: Rc<HeadlessHost>,
        ctx: Rc<Context>,
        scheduler: FrameScheduler,
        keyboard: Keyboard,
        pointer: Pointer,
        camera: Rc<RefCell<Transform>>,
    }

    fn scene() -> Scene {
        let host = Rc::new(HeadlessHost::default());
        let ctx = Context::new(host.clone(), Rc::new(HeadlessBackend::new()), ContextConfig::default());
        let scheduler = FrameScheduler::new(Rc::clone(&ctx), host.clone());
        let keyboard = Keyboard::new(&ctx);
        let pointer = Pointer::new(&ctx);
        ctx.focus();
        Scene {
            host,
            ctx,
            scheduler,
            keyboard,
            pointer,
            camera: Rc::new(RefCell::new(Transform::IDENTITY)),
        }
    }

    fn orbit(scene: &Scene, config: OrbitConfig) -> Rc<Controller<Orbit>> {
        let strategy = Orbit::new(config, Rc::clone(&scene.camera))
            .with_keyboard(scene.keyboard.clone())
            .with_pointer(scene.pointer.clone());
        let controller = Rc::new(Controller::new("orbit", strategy));
        controller.attach(&scene.scheduler);
        controller
    }

    fn drag(ctx: &Context, dx: f32, dy: f32) {
        ctx.dispatch(&HostEvent::PointerMoved { x: 100.0, y: 100.0 });
        ctx.dispatch(&HostEvent::PointerDown(MouseButton::Left));
        ctx.dispatch(&HostEvent::PointerMoved {
            x: 100.0 + dx,
            y: 100.0 + dy,
        });
    }

    //=====================================================================
    // Placement
    //=====================================================================

    #[test]
    fn initial_placement_faces_center() {
        let s = scene();
        let config = OrbitConfig::default().with_center(Vec3::new(1.0, 0.0, 0.0));
        let _orbit = orbit(&s, config);

        let camera = *s.camera.borrow();
        let to_center = (config.center - camera.position).normalize();

        assert!(((camera.position - config.center).length() - config.distance).abs() < 1e-4);
        assert!(camera.forward().abs_diff_eq(to_center, 1e-4));
    }

    //=====================================================================
    // Input
    //=====================================================================

    #[test]
    fn drag_rotates_by_sensitivity() {
        let s = scene();
        let config = OrbitConfig::default().with_sensitivity(0.01).with_angles(0.0, 0.0);
        let controller = orbit(&s, config);

        drag(&s.ctx, 10.0, 5.0);
        s.host.advance(0.016);

        let strategy = controller.strategy();
        assert!((strategy.yaw() - -0.1).abs() < EPS);
        assert!((strategy.pitch() - 0.05).abs() < EPS);
    }

    #[test]
    fn inversion_flips_axes() {
        let s = scene();
        let config = OrbitConfig::default()
            .with_sensitivity(0.01)
            .with_angles(0.0, 0.0)
            .with_inversion(true, true);
        let controller = orbit(&s, config);

        drag(&s.ctx, 10.0, 5.0);
        s.host.advance(0.016);

        let strategy = controller.strategy();
        assert!((strategy.yaw() - 0.1).abs() < EPS);
        assert!((strategy.pitch() - -0.05).abs() < EPS);
    }

    #[test]
    fn motion_without_button_is_ignored() {
        let s = scene();
        let controller = orbit(&s, OrbitConfig::default().with_angles(0.0, 0.0));

        s.ctx.dispatch(&HostEvent::PointerMoved { x: 0.0, y: 0.0 });
        s.ctx.dispatch(&HostEvent::PointerMoved { x: 50.0, y: 50.0 });
        s.host.advance(0.016);

        assert_eq!(controller.strategy().yaw(), 0.0);
    }

    #[test]
    fn alias_keys_turn_at_key_speed() {
        let s = scene();
        let config = OrbitConfig::default()
            .with_key_speed(2.0)
            .with_damping(1000.0)
            .with_angles(0.0, 0.0);
        let controller = orbit(&s, config);

        s.ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyA));
        s.host.advance(0.5);

        assert!((controller.strategy().yaw() - 1.0).abs() < EPS);
    }

    #[test]
    fn velocity_decays_with_damping() {
        let s = scene();
        let config = OrbitConfig::default().with_sensitivity(0.01).with_damping(4.0);
        let controller = orbit(&s, config);

        drag(&s.ctx, 10.0, 0.0);
        s.host.advance(0.25);
        let first = controller.strategy().velocity().x.abs();

        s.ctx.dispatch(&HostEvent::PointerUp(MouseButton::Left));
        for _ in 0..10 {
            s.host.advance(0.25);
        }
        let later = controller.strategy().velocity().x.abs();

        assert!(first > 0.0);
        assert!(later < first * 0.01);
    }

    #[test]
    fn pitch_is_clamped() {
        let s = scene();
        let config = OrbitConfig::default()
            .with_sensitivity(1.0)
            .with_pitch_limits(-0.5, 0.5);
        let controller = orbit(&s, config);

        drag(&s.ctx, 0.0, 100.0);
        s.host.advance(0.016);

        assert!((controller.strategy().pitch() - 0.5).abs() < EPS);
    }

    #[test]
    fn wheel_zooms_within_limits() {
        let s = scene();
        let config = OrbitConfig::default()
            .with_distance_limits(1.0, 10.0)
            .with_distance(5.0)
            .with_zoom_speed(1.0);
        let controller = orbit(&s, config);

        s.ctx.dispatch(&HostEvent::Wheel { dx: 0.0, dy: 2.0 });
        s.host.advance(0.016);
        assert!((controller.strategy().distance() - 3.0).abs() < EPS);

        s.ctx.dispatch(&HostEvent::Wheel { dx: 0.0, dy: 50.0 });
        s.host.advance(0.016);
        assert!((controller.strategy().distance() - 1.0).abs() < EPS);
    }

    #[test]
    fn blur_stops_key_driven_rotation() {
        let s = scene();
        let config = OrbitConfig::default().with_damping(1000.0).with_angles(0.0, 0.0);
        let controller = orbit(&s, config);

        s.ctx.dispatch(&HostEvent::KeyDown(KeyCode::KeyD));
        s.host.advance(0.1);
        let turned = controller.strategy().yaw();

        s.ctx.dispatch(&HostEvent::Blur);
        s.host.advance(0.1);

        assert!(turned < 0.0);
        assert!((controller.strategy().yaw() - turned).abs() < EPS);
    }

    //=====================================================================
    // Config
    //=====================================================================

    #[test]
    #[should_panic(expected = "Distance limits must satisfy 0 < min <= max")]
    fn inverted_distance_limits_panic() {
        let _ = OrbitConfig::default().with_distance_limits(10.0, 1.0);
    }
}
