//! Spherical orbit camera controller.
//!
//! Pointer, wheel, and key events accumulate rotate/zoom/pan impulses; one
//! [`OrbitController::update`] per frame applies them to the camera pose and
//! resets them. Impulses are per-frame: a frame that never reaches `update`
//! drops whatever zoom was pending, which downstream timing relies on.

use std::f64::consts::{PI, TAU};

use glam::{DMat4, DVec2, DVec3};

const EPS: f64 = 1e-6;

/// Pointer-drag distance for one full revolution around the center.
const PIXELS_PER_ROUND: f64 = 1800.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Abstract manipulation keys. Hosts map physical bindings themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKey {
    Rotate,
    Zoom,
    Pan,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { button: PointerButton, x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    Wheel { delta: f64 },
    KeyDown { key: ControlKey },
    KeyUp { key: ControlKey },
}

/// Live manipulation state of the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    None,
    Rotate,
    Zoom,
    Pan,
}

/// Limits, speeds, and enable flags, settable at construction or runtime.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrbitConfig {
    pub enabled: bool,
    pub user_rotate: bool,
    pub user_rotate_speed: f64,
    pub user_zoom: bool,
    pub user_zoom_speed: f64,
    pub user_pan: bool,
    pub user_pan_speed: f64,
    pub auto_rotate: bool,
    /// Revolutions per minute scale: speed 2 is one round every 30 seconds at
    /// 60 updates per second.
    pub auto_rotate_speed: f64,
    pub min_polar_angle: f64,
    pub max_polar_angle: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_rotate: true,
            user_rotate_speed: 1.0,
            user_zoom: true,
            user_zoom_speed: 1.0,
            user_pan: true,
            user_pan_speed: 2.0,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_distance: 0.0,
            max_distance: f64::INFINITY,
        }
    }
}

/// The externally observable output of the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: DVec3,
    pub center: DVec3,
}

impl CameraPose {
    /// Right-handed view matrix looking from `position` at `center`, +Y up.
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.position, self.center, DVec3::Y)
    }
}

/// Orbit camera rig: the camera position as spherical offsets from a look-at
/// center, driven by accumulated per-frame impulses.
pub struct OrbitController {
    pub config: OrbitConfig,
    pub center: DVec3,
    position: DVec3,
    state: DragState,
    pointer: DVec2,
    theta_delta: f64,
    phi_delta: f64,
    scale: f64,
    last_position: DVec3,
    observers: Vec<Box<dyn FnMut(&CameraPose)>>,
}

impl OrbitController {
    pub fn new(position: DVec3) -> Self {
        Self::with_config(position, OrbitConfig::default())
    }

    pub fn with_config(position: DVec3, config: OrbitConfig) -> Self {
        Self {
            config,
            center: DVec3::ZERO,
            position,
            state: DragState::None,
            pointer: DVec2::ZERO,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            last_position: DVec3::ZERO,
            observers: Vec::new(),
        }
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            center: self.center,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Register a callback invoked after any `update` that moved the camera.
    pub fn on_change(&mut self, observer: impl FnMut(&CameraPose) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn rotate_left(&mut self, angle: f64) {
        self.theta_delta -= angle;
    }

    pub fn rotate_right(&mut self, angle: f64) {
        self.theta_delta += angle;
    }

    pub fn rotate_up(&mut self, angle: f64) {
        self.phi_delta -= angle;
    }

    pub fn rotate_down(&mut self, angle: f64) {
        self.phi_delta += angle;
    }

    /// Per-notch zoom multiplier, `0.95 ^ user_zoom_speed`.
    pub fn zoom_step(&self) -> f64 {
        0.95f64.powf(self.config.user_zoom_speed)
    }

    /// Queue one zoom-in notch. Steps compose multiplicatively within a frame
    /// and are consumed (or dropped) by the next `update`.
    pub fn zoom_in(&mut self) {
        self.scale *= self.zoom_step();
    }

    pub fn zoom_out(&mut self) {
        self.scale /= self.zoom_step();
    }

    /// Displace position and center together along `direction` expressed in
    /// camera space, normalized and scaled by `user_pan_speed`.
    pub fn pan(&mut self, direction: DVec3) {
        let oriented = self.orient_direction(direction);
        if oriented == DVec3::ZERO {
            return;
        }
        let offset = oriented * self.config.user_pan_speed;
        self.position += offset;
        self.center += offset;
    }

    /// Feed one host input event through the state machine.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if !self.config.enabled {
            return;
        }
        match *event {
            InputEvent::PointerDown { button, x, y } => self.pointer_down(button, x, y),
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y),
            InputEvent::PointerUp => self.state = DragState::None,
            InputEvent::Wheel { delta } => {
                if self.config.user_zoom {
                    if delta > 0.0 {
                        self.zoom_out();
                    } else {
                        self.zoom_in();
                    }
                }
            }
            InputEvent::KeyDown { key } => self.key_down(key),
            InputEvent::KeyUp { .. } => self.state = DragState::None,
        }
    }

    /// Apply the accumulated impulses to the camera pose. Called once per
    /// frame whether or not any input arrived.
    pub fn update(&mut self) {
        let mut offset = self.position - self.center;

        // angle from the z-axis around the y-axis
        let mut theta = offset.x.atan2(offset.z);
        // angle from the y-axis
        let mut phi = (offset.x * offset.x + offset.z * offset.z)
            .sqrt()
            .atan2(offset.y);

        if self.config.auto_rotate {
            let angle = self.auto_rotation_angle();
            self.rotate_left(angle);
        }

        theta += self.theta_delta;
        phi += self.phi_delta;

        phi = phi
            .min(self.config.max_polar_angle)
            .max(self.config.min_polar_angle);
        // keep clear of the poles to avoid the gimbal singularity
        phi = phi.min(PI - EPS).max(EPS);

        let radius = (offset.length() * self.scale)
            .min(self.config.max_distance)
            .max(self.config.min_distance);

        offset.x = radius * phi.sin() * theta.sin();
        offset.y = radius * phi.cos();
        offset.z = radius * phi.sin() * theta.cos();

        self.position = self.center + offset;

        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;

        if self.last_position.distance(self.position) > 0.0 {
            self.notify_changed();
            self.last_position = self.position;
        }
    }

    fn pointer_down(&mut self, button: PointerButton, x: f64, y: f64) {
        if self.state == DragState::None {
            self.state = match button {
                PointerButton::Primary if self.config.user_rotate => DragState::Rotate,
                PointerButton::Middle if self.config.user_zoom => DragState::Zoom,
                PointerButton::Secondary if self.config.user_pan => DragState::Pan,
                _ => DragState::None,
            };
        }
        if self.state != DragState::None {
            self.pointer = DVec2::new(x, y);
        }
    }

    fn pointer_move(&mut self, x: f64, y: f64) {
        let end = DVec2::new(x, y);
        let delta = end - self.pointer;

        match self.state {
            DragState::Rotate => {
                let speed = self.config.user_rotate_speed;
                self.rotate_left(TAU * delta.x / PIXELS_PER_ROUND * speed);
                self.rotate_up(TAU * delta.y / PIXELS_PER_ROUND * speed);
            }
            DragState::Zoom => {
                if delta.y > 0.0 {
                    self.zoom_in();
                } else {
                    self.zoom_out();
                }
            }
            DragState::Pan => {
                self.pan(DVec3::new(-delta.x, delta.y, 0.0));
            }
            DragState::None => return,
        }

        self.pointer = end;
    }

    fn key_down(&mut self, key: ControlKey) {
        if self.state != DragState::None {
            return;
        }
        self.state = match key {
            ControlKey::Rotate if self.config.user_rotate => DragState::Rotate,
            ControlKey::Zoom if self.config.user_zoom => DragState::Zoom,
            ControlKey::Pan if self.config.user_pan => DragState::Pan,
            _ => DragState::None,
        };
    }

    fn auto_rotation_angle(&self) -> f64 {
        TAU / 60.0 / 60.0 * self.config.auto_rotate_speed
    }

    /// Rotate a camera-space direction into world space and normalize it,
    /// using the look-at basis of the current pose.
    fn orient_direction(&self, direction: DVec3) -> DVec3 {
        let back = (self.position - self.center).normalize_or_zero();
        if back == DVec3::ZERO {
            return DVec3::ZERO;
        }
        let right = DVec3::Y.cross(back).normalize_or_zero();
        if right == DVec3::ZERO {
            // looking straight along the pole
            return DVec3::ZERO;
        }
        let up = back.cross(right);

        (right * direction.x + up * direction.y + back * direction.z).normalize_or_zero()
    }

    fn notify_changed(&mut self) {
        let pose = CameraPose {
            position: self.position,
            center: self.center,
        };
        for observer in &mut self.observers {
            observer(&pose);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_controller() {
        let config = OrbitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.user_rotate_speed, 1.0);
        assert_eq!(config.user_zoom_speed, 1.0);
        assert_eq!(config.user_pan_speed, 2.0);
        assert_eq!(config.auto_rotate_speed, 2.0);
        assert_eq!(config.min_polar_angle, 0.0);
        assert_eq!(config.max_polar_angle, PI);
        assert_eq!(config.max_distance, f64::INFINITY);
    }

    #[test]
    fn config_json_roundtrip() {
        let config = OrbitConfig {
            max_distance: 500.0,
            ..OrbitConfig::default()
        };
        let s = serde_json::to_string(&config).unwrap();
        let de: OrbitConfig = serde_json::from_str(&s).unwrap();
        assert_eq!(de, config);
    }

    #[test]
    fn zoom_step_follows_speed() {
        let mut controller = OrbitController::new(DVec3::new(0.0, 0.0, 10.0));
        assert!((controller.zoom_step() - 0.95).abs() < 1e-12);
        controller.config.user_zoom_speed = 2.0;
        assert!((controller.zoom_step() - 0.95 * 0.95).abs() < 1e-12);
    }

    #[test]
    fn view_matrix_is_invertible() {
        let controller = OrbitController::new(DVec3::new(3.0, 4.0, 5.0));
        let view = controller.pose().view_matrix();
        assert!(view.determinant().abs() > 1e-9);
    }

    #[test]
    fn pan_moves_position_and_center_together() {
        let mut controller = OrbitController::new(DVec3::new(0.0, 0.0, 10.0));
        let before = controller.position() - controller.center;
        controller.pan(DVec3::new(1.0, 0.0, 0.0));
        let after = controller.position() - controller.center;
        assert!((before - after).length() < 1e-12);
        assert!(
            (controller.center.length() - controller.config.user_pan_speed).abs() < 1e-12
        );
    }

    #[test]
    fn degenerate_offset_pan_is_dropped() {
        let mut controller = OrbitController::new(DVec3::ZERO);
        controller.pan(DVec3::new(1.0, 1.0, 0.0));
        assert_eq!(controller.position(), DVec3::ZERO);
        assert_eq!(controller.center, DVec3::ZERO);
    }
}
