use crate::input::{InputEvent, Key, PointerButton};
use crate::observers::{Observers, SubscriptionId};
use glam::DVec3;
use std::cell::RefCell;

/// Translation applied by a single step operation.
pub const CAMERA_STEP: f64 = 0.01;

/// Number of positions on a clip-distance slider; position `range` maps to 1.0.
pub const CLIP_SLIDER_RANGE: i32 = 2000;

/// Maps a clip slider position to its unsigned distance magnitude.
#[inline]
pub fn clip_from_slider(value: i32, range: i32) -> f64 {
    value as f64 / range as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    /// Internal rotation units per degree (`RK`). Must be at least 1.
    pub precision: u32,
    pub step: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            precision: 1,
            step: CAMERA_STEP,
        }
    }
}

/// Immutable snapshot of the camera pose. Rotation is in degrees, each in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: DVec3,
    pub rotation: DVec3,
    pub front_clip_distance: f64,
    pub rear_clip_distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    /// Emitted before `Changed` when one axis angle actually changed.
    /// `units` is the normalized angle in `1/precision` degree steps.
    RotationChanged { axis: Axis, units: i64 },
    Changed(CameraState),
}

#[derive(Debug, Clone, Copy, Default)]
struct Pose {
    position: DVec3,
    rotation_units: [i64; 3],
    front_clip: f64,
    rear_clip: f64,
}

/// Owner of the current camera pose.
///
/// All mutators take `&self`: the pose lives behind a `RefCell` that is
/// released before observers run, so a callback sees the stored state and
/// may itself read or drive the camera.
#[derive(Debug)]
pub struct CameraModel {
    config: CameraConfig,
    pose: RefCell<Pose>,
    observers: Observers<CameraEvent>,
}

impl CameraModel {
    pub fn new(config: CameraConfig) -> Self {
        let precision = if config.precision == 0 {
            log::warn!("camera precision 0 is invalid, using 1");
            1
        } else {
            config.precision
        };

        Self {
            config: CameraConfig { precision, ..config },
            pose: RefCell::new(Pose::default()),
            observers: Observers::new(),
        }
    }

    #[inline]
    pub fn precision(&self) -> u32 {
        self.config.precision
    }

    /// One full turn in internal units.
    #[inline]
    pub fn full_turn_units(&self) -> i64 {
        360 * self.config.precision as i64
    }

    /// `round(degrees * RK)`, or `None` for a non-finite angle.
    fn to_units(&self, degrees: f64) -> Option<i64> {
        if !degrees.is_finite() {
            log::warn!("ignoring non-finite camera angle {}", degrees);
            return None;
        }
        Some((degrees * self.config.precision as f64).round() as i64)
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CameraEvent) + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn snapshot(&self) -> CameraState {
        let pose = self.pose.borrow();
        let rk = self.config.precision as f64;
        CameraState {
            position: pose.position,
            rotation: DVec3::new(
                pose.rotation_units[0] as f64 / rk,
                pose.rotation_units[1] as f64 / rk,
                pose.rotation_units[2] as f64 / rk,
            ),
            front_clip_distance: pose.front_clip,
            rear_clip_distance: pose.rear_clip,
        }
    }

    fn notify(&self) {
        let state = self.snapshot();
        log::trace!("camera changed: {:?}", state);
        self.observers.emit(&CameraEvent::Changed(state));
    }

    fn translate(&self, delta: DVec3) {
        self.pose.borrow_mut().position += delta;
        self.notify();
    }

    pub fn forward(&self) {
        self.translate(DVec3::new(0.0, 0.0, self.config.step));
    }

    pub fn backward(&self) {
        self.translate(DVec3::new(0.0, 0.0, -self.config.step));
    }

    pub fn left(&self) {
        self.translate(DVec3::new(self.config.step, 0.0, 0.0));
    }

    pub fn right(&self) {
        self.translate(DVec3::new(-self.config.step, 0.0, 0.0));
    }

    pub fn up(&self) {
        self.translate(DVec3::new(0.0, -self.config.step, 0.0));
    }

    pub fn down(&self) {
        self.translate(DVec3::new(0.0, self.config.step, 0.0));
    }

    /// Overwrites the position without notifying observers. Meant for setup.
    pub fn set_position(&self, position: DVec3) {
        self.pose.borrow_mut().position = position;
    }

    pub fn rotation_units(&self, axis: Axis) -> i64 {
        self.pose.borrow().rotation_units[axis.index()]
    }

    /// Sets one axis angle in internal units (the unit of a rotation slider).
    ///
    /// The value is reduced modulo one full turn. Returns `false`, with no
    /// notification, when the normalized value equals the stored one.
    pub fn set_rotation_units(&self, axis: Axis, units: i64) -> bool {
        let normalized = units.rem_euclid(self.full_turn_units());
        {
            let mut pose = self.pose.borrow_mut();
            let slot = &mut pose.rotation_units[axis.index()];
            if *slot == normalized {
                return false;
            }
            *slot = normalized;
        }

        self.observers.emit(&CameraEvent::RotationChanged {
            axis,
            units: normalized,
        });
        self.notify();
        true
    }

    /// Non-finite angles are ignored and return `false`.
    pub fn set_rotation(&self, axis: Axis, degrees: f64) -> bool {
        match self.to_units(degrees) {
            Some(units) => self.set_rotation_units(axis, units),
            None => false,
        }
    }

    /// Adds per-axis deltas in internal units, applied X, then Y, then Z.
    ///
    /// Exact: two calls with `d` land where one call with `2 * d` does.
    pub fn rotate_units(&self, dx: i64, dy: i64, dz: i64) {
        let turn = self.full_turn_units();
        for (axis, delta) in Axis::ALL.into_iter().zip([dx, dy, dz]) {
            // Both terms are below one turn, so the sum cannot overflow.
            let current = self.rotation_units(axis);
            self.set_rotation_units(axis, current + delta.rem_euclid(turn));
        }
    }

    /// Adds per-axis deltas in degrees.
    ///
    /// Each delta is rounded to whole units on its own, so fractions of
    /// `1 / precision` degree do not accumulate across calls; use
    /// [`rotate_units`](Self::rotate_units) for exact composition.
    /// Non-finite deltas leave their axis untouched.
    pub fn rotate(&self, dx: f64, dy: f64, dz: f64) {
        let [dx, dy, dz] = [dx, dy, dz].map(|d| self.to_units(d).unwrap_or(0));
        self.rotate_units(dx, dy, dz);
    }

    /// No ordering check: an inverted pair is allowed and clips everything.
    pub fn set_clip_distances(&self, front: f64, rear: f64) {
        {
            let mut pose = self.pose.borrow_mut();
            pose.front_clip = front;
            pose.rear_clip = rear;
        }
        self.notify();
    }

    pub fn set_front_clip(&self, front: f64) {
        self.pose.borrow_mut().front_clip = front;
        self.notify();
    }

    pub fn set_rear_clip(&self, rear: f64) {
        self.pose.borrow_mut().rear_clip = rear;
        self.notify();
    }
}

/// Turns discrete input events into camera operations.
#[derive(Debug, Default)]
pub struct CameraController {
    last_pointer: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the event was consumed.
    pub fn handle_event(&mut self, event: &InputEvent, camera: &CameraModel) -> bool {
        match *event {
            InputEvent::Key(key) => self.handle_key(key, camera),
            InputEvent::Wheel { delta_y } => {
                if delta_y > 0.0 {
                    camera.forward();
                } else {
                    camera.backward();
                }
                true
            }
            InputEvent::PointerPressed { x, y, button } => {
                self.last_pointer = Some((x, y));
                button == PointerButton::Left
            }
            InputEvent::PointerMoved {
                x,
                y,
                left_down,
                shift,
            } => {
                let last = self.last_pointer.replace((x, y));
                match last {
                    Some(last) if left_down => {
                        self.handle_drag(x - last.0, y - last.1, shift, camera);
                        true
                    }
                    _ => false,
                }
            }
            InputEvent::Resized { .. } => false,
        }
    }

    fn handle_key(&mut self, key: Key, camera: &CameraModel) -> bool {
        match key {
            Key::Left | Key::A => camera.left(),
            Key::Right | Key::D => camera.right(),
            Key::Up | Key::W => camera.forward(),
            Key::Down | Key::S => camera.backward(),
            Key::Space | Key::Q => camera.up(),
            Key::C | Key::Z => camera.down(),
            Key::Other => return false,
        }
        true
    }

    /// Pans one step per direction with shift held, otherwise rotates one
    /// internal unit per pixel (vertical motion turns about X).
    fn handle_drag(&mut self, dx: f64, dy: f64, panning: bool, camera: &CameraModel) {
        if panning {
            if dx > 0.0 {
                camera.right();
            }
            if dx < 0.0 {
                camera.left();
            }
            if dy > 0.0 {
                camera.down();
            }
            if dy < 0.0 {
                camera.up();
            }
        } else {
            camera.rotate_units(dy.round() as i64, dx.round() as i64, 0);
        }
    }
}
