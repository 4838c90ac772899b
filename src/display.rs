use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;
use crate::lighting::LightingRig;
use crate::scene::SceneGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    None,
    AcesFilmic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputColorSpace {
    Srgb,
    Linear,
}

/// Presentation settings applied once when the surface is set up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSettings {
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    pub color_space: OutputColorSpace,
    /// Clear color as 0xRRGGBB
    pub background: u32,
    pub msaa_samples: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.0,
            color_space: OutputColorSpace::Srgb,
            background: 0x1a1a2e,
            msaa_samples: 4,
        }
    }
}

/// Draws the scene into the host viewport
pub trait RenderSurface {
    /// Resize the render target, in physical pixels
    fn set_size(&mut self, width: u32, height: u32);

    fn set_pixel_ratio(&mut self, ratio: f64);

    fn configure_output(&mut self, settings: &OutputSettings);

    fn set_lighting(&mut self, rig: &LightingRig);

    /// Status text drawn over the scene; `None` hides it
    fn set_overlay(&mut self, text: Option<String>);

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> anyhow::Result<()>;
}
