//! Volumetric light compositing
//!
//! After a volumetric light finishes its lighting sub-pass, one
//! screen-aligned quad clipped to the light's scissor samples the
//! captured depth buffer and the light's attenuation textures to
//! approximate in-scattering. One extra draw per qualifying light, no
//! shadow dependency.

use ember_math::Vec3;

use crate::config::RenderConfig;
use crate::light::Light;
use crate::view::ScissorRect;

/// One compositing quad, handed to the backend as a descriptor
#[derive(Clone, Copy, Debug)]
pub struct LightVolume {
    /// Index into the frame's light array
    pub light: u32,
    /// Union of the light's interaction scissors
    pub scissor: ScissorRect,
    pub color: Vec3,
    /// World radius (omni) or falloff length (projective), scaling the
    /// in-scattering estimate
    pub radius: f32,
}

impl LightVolume {
    /// Pixel-space quad corners, counter-clockwise from bottom-left.
    /// The inclusive scissor becomes a half-open pixel rectangle.
    pub fn screen_quad(&self) -> [[f32; 2]; 4] {
        let x1 = self.scissor.x1 as f32;
        let y1 = self.scissor.y1 as f32;
        let x2 = (self.scissor.x2 + 1) as f32;
        let y2 = (self.scissor.y2 + 1) as f32;
        [[x1, y1], [x2, y1], [x2, y2], [x1, y2]]
    }
}

/// The compositing quad for a light, or `None` when the light isn't
/// volumetric, compositing is disabled, or the light covers no pixels.
pub fn build_volume(
    light_index: u32,
    light: &Light,
    scissor: ScissorRect,
    config: &RenderConfig,
) -> Option<LightVolume> {
    if !config.volumetric_enabled || !light.volumetric || scissor.is_empty() {
        return None;
    }
    Some(LightVolume {
        light: light_index,
        scissor,
        color: light.color,
        radius: light.radius,
    })
}
