//! Fixed light rig: ambient fill, a shadow-casting key light, a back fill light
//! and a sky/ground hemisphere.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::hex_to_linear_rgb;
use crate::types::LightingUniform;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    /// 0xRRGGBB, sRGB
    pub color: u32,
    pub intensity: f32,
}

/// Light shining from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: u32,
    pub intensity: f32,
    pub position: [f32; 3],
    #[serde(default)]
    pub casts_shadow: bool,
}

impl DirectionalLight {
    /// Unit vector from the lit surface towards the light
    pub fn direction(&self) -> Vec3 {
        Vec3::from_array(self.position).normalize_or_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HemisphereLight {
    pub sky_color: u32,
    pub ground_color: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingRig {
    pub ambient: AmbientLight,
    pub key: DirectionalLight,
    pub fill: DirectionalLight,
    pub hemisphere: HemisphereLight,
}

impl Default for LightingRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: 0xffffff,
                intensity: 0.6,
            },
            key: DirectionalLight {
                color: 0xffffff,
                intensity: 0.8,
                position: [5.0, 10.0, 7.0],
                casts_shadow: true,
            },
            fill: DirectionalLight {
                color: 0xffffff,
                intensity: 0.3,
                position: [-5.0, 5.0, -5.0],
                casts_shadow: false,
            },
            hemisphere: HemisphereLight {
                sky_color: 0xffeeb1,
                ground_color: 0x080820,
                intensity: 0.4,
            },
        }
    }
}

fn radiance(color: u32, intensity: f32) -> [f32; 4] {
    let [r, g, b] = hex_to_linear_rgb(color);
    [r * intensity, g * intensity, b * intensity, 1.0]
}

impl LightingRig {
    pub fn to_uniform(&self) -> LightingUniform {
        LightingUniform {
            ambient: radiance(self.ambient.color, self.ambient.intensity),
            key_direction: self.key.direction().extend(0.0).to_array(),
            key_color: radiance(self.key.color, self.key.intensity),
            fill_direction: self.fill.direction().extend(0.0).to_array(),
            fill_color: radiance(self.fill.color, self.fill.intensity),
            hemisphere_sky: radiance(self.hemisphere.sky_color, self.hemisphere.intensity),
            hemisphere_ground: radiance(self.hemisphere.ground_color, self.hemisphere.intensity),
        }
    }
}
