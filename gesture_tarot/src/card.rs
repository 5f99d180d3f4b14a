//! The card interaction controller.
//!
//! Owns the single card on the table and turns pointer signals into motion:
//!
//! | Gesture | Effect on the active card |
//! |---|---|
//! | `Pinch` | Eases toward the pointer at depth 4 and turns to face the camera |
//! | `Open`  | Bobs gently in place |
//! | `Fist`  | Latches, picks an orientation, bursts into ash, confirms after 1 s |
//! | `None` / `Point` | Nothing |
//!
//! Continuous gestures (pinch, open) are applied once per [`CardController::update`]
//! from the latest stored signal.  The fist acts the moment its signal
//! arrives, and only once per presented card.

use std::f32::consts::PI;
use std::time::Duration;

use glam::{Quat, Vec3};
use rand::Rng;
use tarot_deck::{Card, Orientation, CARD_ASPECT_RATIO};
use tracing::{debug, info};

use crate::clock::{Clock, OneShotTimer};
use crate::gesture::{Gesture, PointerSignal};
use crate::particles::ParticleSystem;

// ════════════════════════════════════════════════════════════════════════════
// Scene constants
// ════════════════════════════════════════════════════════════════════════════

pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 8.0);
/// Vertical field of view, degrees.
pub const CAMERA_FOV_DEG:  f32  = 75.0;

pub const CARD_WIDTH:  f32 = 2.0;
pub const CARD_HEIGHT: f32 = CARD_WIDTH * CARD_ASPECT_RATIO;

/// The pointer square `[0,1]²` maps onto `[-3,3]²` in world space.
pub const PULL_SPAN:  f32 = 6.0;
/// Depth the pinched card is pulled to.
pub const PULL_DEPTH: f32 = 4.0;
/// Fraction of the remaining distance covered per update.
pub const PULL_LERP:  f32 = 0.1;

/// Idle float: `y += sin(t_ms * FLOAT_RATE) * FLOAT_AMPLITUDE` per update.
pub const FLOAT_RATE:      f32 = 0.002;
pub const FLOAT_AMPLITUDE: f32 = 0.005;

/// Time between the fist and the confirmation event.
pub const CONFIRM_DELAY: Duration = Duration::from_millis(1000);

/// World-space point the card eases toward for a pointer at `(x, y)`.
pub fn pull_target(x: f32, y: f32) -> Vec3 {
    let half = PULL_SPAN / 2.0;
    Vec3::new(x * PULL_SPAN - half, -(y * PULL_SPAN - half), PULL_DEPTH)
}

// ════════════════════════════════════════════════════════════════════════════
// Transform
// ════════════════════════════════════════════════════════════════════════════

/// Position plus Euler rotation, applied X then Y then Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Transform {
    /// At the origin, turned away from the camera.
    pub fn face_down() -> Self {
        Transform {
            position: Vec3::ZERO,
            rotation: Vec3::new(0.0, PI, 0.0),
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_rotation_x(self.rotation.x)
            * Quat::from_rotation_y(self.rotation.y)
            * Quat::from_rotation_z(self.rotation.z)
    }

    /// Direction the card face points in.
    pub fn normal(&self) -> Vec3 {
        self.quat() * Vec3::Z
    }

    /// True when the face is visible from `eye`.
    pub fn faces(&self, eye: Vec3) -> bool {
        self.normal().dot(eye - self.position) > 0.0
    }

    /// Turn the face toward `target`, clearing any roll.
    pub fn face_toward(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.rotation = Vec3::new(
            (-dir.y).atan2(dir.z),
            dir.x.clamp(-1.0, 1.0).asin(),
            0.0,
        );
    }

    /// The four card corners in world space, clockwise from top-left as seen
    /// from the front.
    pub fn corners(&self) -> [Vec3; 4] {
        let (w, h) = (CARD_WIDTH / 2.0, CARD_HEIGHT / 2.0);
        let q = self.quat();
        [
            Vec3::new(-w,  h, 0.0),
            Vec3::new( w,  h, 0.0),
            Vec3::new( w, -h, 0.0),
            Vec3::new(-w, -h, 0.0),
        ]
        .map(|c| self.position + q * c)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Camera — perspective projection for the software renderer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub fov_deg:  f32,
    pub near:     f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera { position: CAMERA_POSITION, fov_deg: CAMERA_FOV_DEG, near: 0.1 }
    }
}

impl Camera {
    /// Project a world point to pixel coordinates in a `width × height`
    /// viewport.  The camera looks down -Z.  Returns `(px, py, depth)`, or
    /// `None` for points behind the near plane.
    pub fn project(&self, p: Vec3, width: f32, height: f32) -> Option<(f32, f32, f32)> {
        let rel = p - self.position;
        let depth = -rel.z;
        if depth < self.near {
            return None;
        }
        let f = 1.0 / (self.fov_deg.to_radians() / 2.0).tan();
        let aspect = width / height;
        let ndc_x = rel.x * f / (depth * aspect);
        let ndc_y = rel.y * f / depth;
        Some((
            (ndc_x + 1.0) * 0.5 * width,
            (1.0 - ndc_y) * 0.5 * height,
            depth,
        ))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ActiveCardHandle
// ════════════════════════════════════════════════════════════════════════════

/// The card currently on the table.
#[derive(Clone, Debug)]
pub struct ActiveCardHandle {
    pub card:      Card,
    pub transform: Transform,
    /// Set by the fist.  Once set, the card no longer moves.
    confirmed:     Option<Orientation>,
}

impl ActiveCardHandle {
    fn new(card: Card) -> Self {
        ActiveCardHandle { card, transform: Transform::face_down(), confirmed: None }
    }

    pub fn is_latched(&self) -> bool { self.confirmed.is_some() }

    pub fn orientation(&self) -> Option<Orientation> { self.confirmed }
}

/// Emitted once per presented card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub card:        Card,
    pub orientation: Orientation,
}

// ════════════════════════════════════════════════════════════════════════════
// CardController
// ════════════════════════════════════════════════════════════════════════════

pub struct CardController<C: Clock, R: Rng> {
    clock:     C,
    rng:       R,
    camera:    Camera,
    active:    Option<ActiveCardHandle>,
    signal:    Option<PointerSignal>,
    timer:     OneShotTimer<Confirmation>,
    particles: ParticleSystem,
}

impl<C: Clock, R: Rng> CardController<C, R> {
    pub fn new(clock: C, rng: R) -> Self {
        CardController {
            clock,
            rng,
            camera:    Camera::default(),
            active:    None,
            signal:    None,
            timer:     OneShotTimer::new(),
            particles: ParticleSystem::new(),
        }
    }

    /// Put `card` on the table face down, discarding the previous one and
    /// any confirmation it still had pending.
    pub fn present_card(&mut self, card: Card) {
        debug!(card = card.id, "presenting card");
        self.timer.cancel();
        self.active = Some(ActiveCardHandle::new(card));
    }

    /// Store the latest signal.  A fist confirms the active card right away
    /// unless it is already latched; other gestures take effect on the next
    /// [`update`](Self::update).
    pub fn apply_pointer_signal(&mut self, gesture: Gesture, x: f32, y: f32) {
        self.signal = Some(PointerSignal::new(gesture, x, y));
        if gesture == Gesture::Fist {
            self.confirm();
        }
    }

    /// The hand left the frame: keep the last position, stop acting.
    pub fn clear_gesture(&mut self) {
        if let Some(sig) = &mut self.signal {
            sig.gesture = Gesture::None;
        }
    }

    /// Remove the card and cancel anything pending.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.active = None;
        self.signal = None;
    }

    fn confirm(&mut self) {
        let Some(handle) = self.active.as_mut() else { return };
        if handle.is_latched() {
            return;
        }

        let orientation = if self.rng.gen_bool(0.5) {
            Orientation::Upright
        } else {
            Orientation::Reversed
        };
        if orientation.is_reversed() {
            handle.transform.rotation.z = PI;
        }
        handle.confirmed = Some(orientation);

        self.particles.spawn_ash(handle.transform.position, &mut self.rng);
        self.timer.schedule(
            self.clock.now(),
            CONFIRM_DELAY,
            Confirmation { card: handle.card, orientation },
        );
        info!(card = handle.card.id, %orientation, "card confirmed");
    }

    /// Advance one frame.  Returns the confirmation whose delay just elapsed.
    pub fn update(&mut self) -> Option<Confirmation> {
        let now = self.clock.now();

        if let (Some(handle), Some(sig)) = (self.active.as_mut(), self.signal) {
            if !handle.is_latched() {
                let t = &mut handle.transform;
                match sig.gesture {
                    Gesture::Pinch => {
                        t.position = t.position.lerp(pull_target(sig.x, sig.y), PULL_LERP);
                        t.face_toward(self.camera.position);
                    }
                    Gesture::Open => {
                        let t_ms = now.as_secs_f32() * 1000.0;
                        t.position.y += (t_ms * FLOAT_RATE).sin() * FLOAT_AMPLITUDE;
                    }
                    Gesture::Fist | Gesture::Point | Gesture::None => {}
                }
            }
        }

        self.particles.update(&mut self.rng);
        self.timer.fire_if_due(now)
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn active(&self)    -> Option<&ActiveCardHandle> { self.active.as_ref() }
    pub fn particles(&self) -> &ParticleSystem           { &self.particles }
    pub fn camera(&self)    -> &Camera                   { &self.camera }
    pub fn gesture(&self)   -> Gesture {
        self.signal.map(|s| s.gesture).unwrap_or_default()
    }
    pub fn is_latched(&self) -> bool {
        self.active.as_ref().is_some_and(ActiveCardHandle::is_latched)
    }
    pub fn confirmation_pending(&self) -> bool { self.timer.is_pending() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use rand::{rngs::StdRng, SeedableRng};
    use tarot_deck::TAROT_DECK;

    type Ctl = CardController<ManualClock, StdRng>;

    fn controller(seed: u64) -> (Ctl, ManualClock) {
        let clock = ManualClock::new();
        (CardController::new(clock.clone(), StdRng::seed_from_u64(seed)), clock)
    }

    fn approx(a: Vec3, b: Vec3) -> bool { (a - b).length() < 1e-4 }

    #[test]
    fn presented_card_is_face_down_at_origin() {
        let (mut c, _) = controller(1);
        c.present_card(TAROT_DECK[0]);
        let h = c.active().unwrap();
        assert_eq!(h.transform.position, Vec3::ZERO);
        assert!(!h.transform.faces(CAMERA_POSITION));
        assert!(!h.is_latched());
    }

    #[test]
    fn pinch_eases_toward_pointer_and_reveals_face() {
        let (mut c, _) = controller(1);
        c.present_card(TAROT_DECK[0]);
        c.apply_pointer_signal(Gesture::Pinch, 0.5, 0.5);

        c.update();
        assert!(approx(c.active().unwrap().transform.position, Vec3::new(0.0, 0.0, 0.4)));

        for _ in 0..200 { c.update(); }
        let t = c.active().unwrap().transform;
        assert!(approx(t.position, pull_target(0.5, 0.5)));
        assert!(t.faces(CAMERA_POSITION));
    }

    #[test]
    fn pull_target_maps_corners() {
        assert_eq!(pull_target(0.0, 0.0), Vec3::new(-3.0, 3.0, 4.0));
        assert_eq!(pull_target(1.0, 1.0), Vec3::new(3.0, -3.0, 4.0));
    }

    #[test]
    fn face_toward_points_normal_at_target() {
        let mut t = Transform { position: Vec3::new(2.0, -1.0, 3.0), rotation: Vec3::ZERO };
        t.face_toward(CAMERA_POSITION);
        let want = (CAMERA_POSITION - t.position).normalize();
        assert!(approx(t.normal(), want), "{:?} vs {want:?}", t.normal());
    }

    #[test]
    fn repeated_fist_confirms_once_after_delay() {
        let (mut c, clock) = controller(3);
        c.present_card(TAROT_DECK[2]);
        for _ in 0..5 {
            c.apply_pointer_signal(Gesture::Fist, 0.5, 0.5);
        }
        let orientation = c.active().unwrap().orientation().unwrap();

        clock.advance(CONFIRM_DELAY - Duration::from_millis(1));
        assert_eq!(c.update(), None);

        clock.advance(Duration::from_millis(1));
        assert_eq!(c.update(), Some(Confirmation { card: TAROT_DECK[2], orientation }));

        for _ in 0..10 {
            c.apply_pointer_signal(Gesture::Fist, 0.5, 0.5);
            clock.advance(CONFIRM_DELAY);
            assert_eq!(c.update(), None);
        }
    }

    #[test]
    fn held_fist_confirms_next_card_once() {
        let (mut c, clock) = controller(9);
        c.present_card(TAROT_DECK[0]);
        c.apply_pointer_signal(Gesture::Fist, 0.5, 0.5);
        clock.advance(CONFIRM_DELAY);
        assert!(c.update().is_some());

        c.present_card(TAROT_DECK[1]);
        for _ in 0..30 {
            c.apply_pointer_signal(Gesture::Fist, 0.5, 0.5);
        }
        assert!(c.is_latched());
        let orientation = c.active().unwrap().orientation().unwrap();

        clock.advance(CONFIRM_DELAY);
        assert_eq!(c.update(), Some(Confirmation { card: TAROT_DECK[1], orientation }));
        clock.advance(CONFIRM_DELAY);
        assert_eq!(c.update(), None);
    }

    #[test]
    fn confirmation_pending_until_timer_fires() {
        let (mut c, clock) = controller(5);
        c.present_card(TAROT_DECK[3]);
        assert!(!c.confirmation_pending());

        c.apply_pointer_signal(Gesture::Fist, 0.5, 0.5);
        assert!(c.confirmation_pending());
        clock.advance(CONFIRM_DELAY);
        assert!(c.update().is_some());
        assert!(!c.confirmation_pending());
    }

    #[test]
    fn reversed_card_is_rolled() {
        for seed in 0..20 {
            let (mut c, _) = controller(seed);
            c.present_card(TAROT_DECK[0]);
            c.apply_pointer_signal(Gesture::Fist, 0.5, 0.5);
            let h = c.active().unwrap();
            let rolled = h.transform.rotation.z == PI;
            assert_eq!(rolled, h.orientation() == Some(Orientation::Reversed));
        }
    }

    #[test]
    fn fist_spawns_ash_at_card() {
        let (mut c, _) = controller(4);
        c.present_card(TAROT_DECK[0]);
        c.apply_pointer_signal(Gesture::Fist, 0.1, 0.1);
        assert_eq!(c.particles().bursts().len(), 1);
        assert_eq!(c.particles().bursts()[0].origin, Vec3::ZERO);
    }

    #[test]
    fn latched_card_ignores_pinch() {
        let (mut c, _) = controller(5);
        c.present_card(TAROT_DECK[0]);
        c.apply_pointer_signal(Gesture::Fist, 0.5, 0.5);
        let before = c.active().unwrap().transform;
        c.apply_pointer_signal(Gesture::Pinch, 0.0, 0.0);
        c.update();
        assert_eq!(c.active().unwrap().transform, before);
    }

    #[test]
    fn open_hand_floats() {
        let (mut c, clock) = controller(6);
        c.present_card(TAROT_DECK[0]);
        clock.set(Duration::from_millis(500));
        c.apply_pointer_signal(Gesture::Open, 0.5, 0.5);
        c.update();
        let y = c.active().unwrap().transform.position.y;
        assert!((y - (1.0f32).sin() * FLOAT_AMPLITUDE).abs() < 1e-6);
    }

    #[test]
    fn point_and_none_do_not_move() {
        let (mut c, _) = controller(6);
        c.present_card(TAROT_DECK[0]);
        c.apply_pointer_signal(Gesture::Point, 0.0, 0.0);
        c.update();
        c.apply_pointer_signal(Gesture::Pinch, 0.0, 0.0);
        c.clear_gesture();
        c.update();
        assert_eq!(c.active().unwrap().transform, Transform::face_down());
    }

    #[test]
    fn reset_cancels_pending_confirmation() {
        let (mut c, clock) = controller(7);
        c.present_card(TAROT_DECK[0]);
        c.apply_pointer_signal(Gesture::Fist, 0.5, 0.5);
        c.reset();
        clock.advance(CONFIRM_DELAY * 2);
        assert_eq!(c.update(), None);
        assert!(c.active().is_none());
    }

    #[test]
    fn new_card_cancels_previous_confirmation() {
        let (mut c, clock) = controller(8);
        c.present_card(TAROT_DECK[0]);
        c.apply_pointer_signal(Gesture::Fist, 0.5, 0.5);
        c.present_card(TAROT_DECK[1]);
        clock.advance(CONFIRM_DELAY);
        assert_eq!(c.update(), None);
        assert!(!c.is_latched());
    }

    #[test]
    fn orientation_is_roughly_uniform() {
        let (mut c, _) = controller(99);
        let mut reversed = 0;
        for _ in 0..2000 {
            c.present_card(TAROT_DECK[0]);
            c.apply_pointer_signal(Gesture::Fist, 0.5, 0.5);
            if c.active().unwrap().orientation() == Some(Orientation::Reversed) {
                reversed += 1;
            }
        }
        assert!((850..=1150).contains(&reversed), "{reversed}");
    }

    #[test]
    fn projection_centers_the_origin() {
        let cam = Camera::default();
        let (x, y, depth) = cam.project(Vec3::ZERO, 800.0, 600.0).unwrap();
        assert!((x - 400.0).abs() < 1e-3 && (y - 300.0).abs() < 1e-3);
        assert_eq!(depth, 8.0);
        assert!(cam.project(Vec3::new(0.0, 0.0, 9.0), 800.0, 600.0).is_none());

        let (_, y_up, _) = cam.project(Vec3::new(0.0, 1.0, 0.0), 800.0, 600.0).unwrap();
        assert!(y_up < 300.0);
    }
}
