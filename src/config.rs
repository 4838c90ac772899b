//! Viewer configuration with JSON file support.
//!
//! Every section uses `#[serde(default)]`, so a partial file (for example one that
//! only sets `orbit.auto_rotate`) keeps the built-in values for everything else.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::camera::{PerspectiveCamera, DEFAULT_FAR, DEFAULT_FOV_DEGREES, DEFAULT_NEAR};
use crate::cli::Cli;
use crate::display::{OutputColorSpace, OutputSettings, ToneMapping};
use crate::error::ViewerError;
use crate::fit::{FitSettings, DEFAULT_MARGIN_FACTOR, DEFAULT_MIN_SAFE_DISTANCE};
use crate::lighting::LightingRig;
use crate::normalize::CANONICAL_SIZE;
use crate::orbit::{
    OrbitSettings, DEFAULT_DAMPING_FACTOR, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_DISTANCE,
    DEFAULT_POLAR_ANGLE,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub framing: FramingConfig,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub animation: AnimationConfig,
    pub render: RenderConfig,
    pub lighting: LightingRig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    pub canonical_size: f32,
    pub margin_factor: f32,
    pub min_safe_distance: f32,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            canonical_size: CANONICAL_SIZE,
            margin_factor: DEFAULT_MARGIN_FACTOR,
            min_safe_distance: DEFAULT_MIN_SAFE_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

impl CameraConfig {
    pub fn build(&self, aspect: f32) -> PerspectiveCamera {
        PerspectiveCamera::new(self.fov_degrees, aspect, self.near, self.far)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle from +Y the camera is locked to, in radians
    pub polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        let settings = OrbitSettings::default();
        Self {
            damping_factor: DEFAULT_DAMPING_FACTOR,
            enable_damping: settings.enable_damping,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
            polar_angle: DEFAULT_POLAR_ANGLE,
            rotate_speed: settings.rotate_speed,
            zoom_speed: settings.zoom_speed,
            auto_rotate: settings.auto_rotate,
            auto_rotate_speed: settings.auto_rotate_speed,
        }
    }
}

impl OrbitConfig {
    pub fn settings(&self) -> OrbitSettings {
        OrbitSettings {
            enable_damping: self.enable_damping,
            damping_factor: self.damping_factor,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            min_polar_angle: self.polar_angle,
            max_polar_angle: self.polar_angle,
            rotate_speed: self.rotate_speed,
            zoom_speed: self.zoom_speed,
            auto_rotate: self.auto_rotate,
            auto_rotate_speed: self.auto_rotate_speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Clip played when present; otherwise the first clip plays
    pub preferred_clip: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            preferred_clip: "1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Clear color as 0xRRGGBB
    pub background: u32,
    pub exposure: f32,
    pub tone_mapping: ToneMapping,
    pub msaa_samples: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let output = OutputSettings::default();
        Self {
            background: output.background,
            exposure: output.exposure,
            tone_mapping: output.tone_mapping,
            msaa_samples: output.msaa_samples,
        }
    }
}

impl RenderConfig {
    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            tone_mapping: self.tone_mapping,
            exposure: self.exposure,
            color_space: OutputColorSpace::Srgb,
            background: self.background,
            msaa_samples: self.msaa_samples,
        }
    }
}

impl ViewerConfig {
    /// Load a config from a JSON file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ViewerError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json(&content)
            .map_err(|e| ViewerError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_json(content: &str) -> Result<Self, ViewerError> {
        serde_json::from_str(content).map_err(|e| ViewerError::Config(format!("invalid config: {e}")))
    }

    /// Config file named on the command line (if any) with flag overrides applied
    pub fn from_cli(cli: &Cli) -> Result<Self, ViewerError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(clip) = &cli.clip {
            config.animation.preferred_clip = clip.clone();
        }
        if let Some(fov) = cli.fov {
            config.camera.fov_degrees = fov;
        }
        config.validate()?;
        Ok(config)
    }

    /// Fit settings bounded by the orbit distance range, so the fitted distance is
    /// the one the camera settles at
    pub fn fit_settings(&self) -> FitSettings {
        FitSettings {
            margin_factor: self.framing.margin_factor,
            min_safe_distance: self.framing.min_safe_distance,
            min_distance: self.orbit.min_distance,
            max_distance: self.orbit.max_distance,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ViewerError> {
        let fail = |msg: String| Err(ViewerError::Config(msg));

        let framing = &self.framing;
        if !(framing.canonical_size > 0.0) {
            return fail(format!("framing.canonical_size must be positive, got {}", framing.canonical_size));
        }
        if !(framing.margin_factor > 1.0) {
            return fail(format!("framing.margin_factor must be > 1, got {}", framing.margin_factor));
        }

        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return fail(format!("camera.fov_degrees must be in (0, 180), got {}", camera.fov_degrees));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return fail(format!("camera clip planes invalid: near {}, far {}", camera.near, camera.far));
        }

        let orbit = &self.orbit;
        if !(orbit.damping_factor > 0.0 && orbit.damping_factor <= 1.0) {
            return fail(format!("orbit.damping_factor must be in (0, 1], got {}", orbit.damping_factor));
        }
        if !(orbit.min_distance > 0.0) || orbit.min_distance > orbit.max_distance {
            return fail(format!(
                "orbit distance range invalid: min {}, max {}",
                orbit.min_distance, orbit.max_distance
            ));
        }
        if !(framing.min_safe_distance >= orbit.min_distance && framing.min_safe_distance <= orbit.max_distance) {
            return fail(format!(
                "framing.min_safe_distance {} must lie within the orbit distance range [{}, {}]",
                framing.min_safe_distance, orbit.min_distance, orbit.max_distance
            ));
        }
        if !(orbit.polar_angle > 0.0 && orbit.polar_angle < std::f32::consts::PI) {
            return fail(format!("orbit.polar_angle must be in (0, pi), got {}", orbit.polar_angle));
        }

        let render = &self.render;
        if !(render.exposure > 0.0) {
            return fail(format!("render.exposure must be positive, got {}", render.exposure));
        }
        if !matches!(render.msaa_samples, 1 | 4) {
            return fail(format!("render.msaa_samples must be 1 or 4, got {}", render.msaa_samples));
        }
        Ok(())
    }
}
