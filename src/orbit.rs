//! Damped orbit camera control with a locked polar angle.
//!
//! Input is accumulated as pending spherical deltas; each [`OrbitController::update`]
//! applies a `damping_factor` fraction of what is pending and keeps the rest for the
//! following frames, which gives the exponential ease-out of a turntable.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::camera::PerspectiveCamera;
use crate::math::Spherical;

pub const DEFAULT_DAMPING_FACTOR: f32 = 0.08;
/// Fixed tilt: slightly above the equator, looking down on the model
pub const DEFAULT_POLAR_ANGLE: f32 = PI / 2.4;
pub const DEFAULT_MIN_DISTANCE: f32 = 1.0;
pub const DEFAULT_MAX_DISTANCE: f32 = 10.0;

/// `-ln(0.95)`: one zoom step changes distance by 5%
const ZOOM_STEP: f32 = 0.051_293_3;
const POLAR_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub auto_rotate: bool,
    /// Full turns per minute while auto-rotating
    pub auto_rotate_speed: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
            min_polar_angle: DEFAULT_POLAR_ANGLE,
            max_polar_angle: DEFAULT_POLAR_ANGLE,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
        }
    }
}

/// Pointer input gathered between two ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    /// Drag distance in physical pixels
    pub rotate: Vec2,
    /// Zoom steps; positive moves closer
    pub zoom: f32,
}

impl OrbitInput {
    pub fn is_empty(&self) -> bool {
        self.rotate == Vec2::ZERO && self.zoom == 0.0
    }

    pub fn accumulate(&mut self, other: OrbitInput) {
        self.rotate += other.rotate;
        self.zoom += other.zoom;
    }

    /// Zoom steps equivalent to a pinch whose finger spread grew by `ratio`
    pub fn pinch_steps(ratio: f32) -> f32 {
        if ratio <= 0.0 || !ratio.is_finite() {
            return 0.0;
        }
        ratio.ln() / ZOOM_STEP
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub azimuth: f32,
    pub polar_angle: f32,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PendingDelta {
    azimuth: f32,
    polar: f32,
    log_distance: f32,
}

#[derive(Debug, Clone)]
pub struct OrbitController {
    settings: OrbitSettings,
    target: Vec3,
    state: OrbitState,
    pending: PendingDelta,
}

impl OrbitController {
    pub fn new(settings: OrbitSettings) -> Self {
        let mut controller = Self {
            settings,
            target: Vec3::ZERO,
            state: OrbitState {
                azimuth: 0.0,
                polar_angle: PI / 2.0,
                distance: 5.0,
            },
            pending: PendingDelta::default(),
        };
        controller.state.polar_angle = controller.clamp_polar(controller.state.polar_angle);
        controller.state.distance = controller.clamp_distance(controller.state.distance);
        controller
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    pub fn state(&self) -> OrbitState {
        self.state
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Azimuth the controller is easing towards
    pub fn target_azimuth(&self) -> f32 {
        self.state.azimuth + self.pending.azimuth
    }

    /// Adopt the camera's current placement and drop any pending motion
    pub fn sync_to_camera(&mut self, camera: &PerspectiveCamera) {
        self.target = camera.target;
        let spherical = Spherical::from_offset(camera.position - camera.target);
        self.state = OrbitState {
            azimuth: spherical.theta,
            polar_angle: self.clamp_polar(spherical.phi),
            distance: self.clamp_distance(spherical.radius),
        };
        self.pending = PendingDelta::default();
    }

    /// Queue a drag; a full viewport height of horizontal drag is one turn
    pub fn rotate(&mut self, drag: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let scale = TAU / viewport_height * self.settings.rotate_speed;
        self.pending.azimuth -= drag.x * scale;
        self.pending.polar -= drag.y * scale;
    }

    pub fn zoom(&mut self, steps: f32) {
        self.pending.log_distance -= steps * self.settings.zoom_speed * ZOOM_STEP;
    }

    pub fn apply_input(&mut self, input: &OrbitInput, viewport_height: f32) {
        if input.rotate != Vec2::ZERO {
            self.rotate(input.rotate, viewport_height);
        }
        if input.zoom != 0.0 {
            self.zoom(input.zoom);
        }
    }

    /// Advance one damping step and write the resulting placement to `camera`
    pub fn update(&mut self, delta_seconds: f32, camera: &mut PerspectiveCamera) {
        if self.settings.auto_rotate {
            self.pending.azimuth -= TAU / 60.0 * self.settings.auto_rotate_speed * delta_seconds;
        }

        let factor = if self.settings.enable_damping {
            self.settings.damping_factor
        } else {
            1.0
        };

        self.state.azimuth += self.pending.azimuth * factor;
        self.state.polar_angle = self.clamp_polar(self.state.polar_angle + self.pending.polar * factor);
        let log_distance = self.state.distance.ln() + self.pending.log_distance * factor;
        self.state.distance = self.clamp_distance(log_distance.exp());

        if self.settings.enable_damping {
            let keep = 1.0 - factor;
            self.pending.azimuth *= keep;
            self.pending.polar *= keep;
            self.pending.log_distance *= keep;
        } else {
            self.pending = PendingDelta::default();
        }

        let offset = Spherical::new(self.state.distance, self.state.polar_angle, self.state.azimuth)
            .to_offset();
        camera.target = self.target;
        camera.position = self.target + offset;
    }

    fn clamp_polar(&self, polar: f32) -> f32 {
        polar
            .clamp(self.settings.min_polar_angle, self.settings.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON)
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.settings.min_distance, self.settings.max_distance)
    }
}
