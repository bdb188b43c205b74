//! GPU parameter blocks
//!
//! The handoff format between the pass loop and the shader backend.
//! Everything here is `#[repr(C)]` and `bytemuck`-castable so a backend
//! can memcpy blocks into uniform/storage buffers without a translation
//! layer. Sizes stay 16-byte multiples; the tests pin that down.

use bytemuck::{Pod, Zeroable};

use crate::attenuation::Attenuation;
use crate::config::{RenderConfig, MAX_SPLITS};
use crate::light::Light;
use crate::shadow::projection::LightShadowMaps;

/// Per-draw lighting parameters, rebuilt when light or entity changes
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuLightParams {
    /// Model space -> light texture space (column-major)
    pub attenuation: [[f32; 4]; 4],
    /// Light origin in the entity's model space
    pub local_origin: [f32; 3],
    /// World radius (omni) or falloff length (projective)
    pub radius: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

impl GpuLightParams {
    pub fn new(light: &Light, attenuation: &Attenuation) -> Self {
        Self {
            attenuation: attenuation.matrix.to_cols_array_2d(),
            local_origin: attenuation.local_origin.to_array(),
            radius: light.radius,
            color: light.color.to_array(),
            _pad: 0.0,
        }
    }
}

/// Per-light shadow sampling parameters, composed after the light's
/// shadow sub-passes complete
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuShadowParams {
    /// Biased world -> texture matrices, one per split (column-major)
    pub matrices: [[[f32; 4]; 4]; MAX_SPLITS],
    /// View-space far boundary per split, for cascade selection
    pub distances: [f32; MAX_SPLITS],
    /// Cube faces or cascades rendered
    pub count: u32,
    pub bias_scale: f32,
    pub bias_offset: f32,
    pub _pad: f32,
}

impl GpuShadowParams {
    pub fn new(maps: &LightShadowMaps, config: &RenderConfig) -> Self {
        let mut matrices = [[[0.0; 4]; 4]; MAX_SPLITS];
        for (dst, src) in matrices.iter_mut().zip(maps.biased.iter()) {
            *dst = src.to_cols_array_2d();
        }
        Self {
            matrices,
            distances: maps.distances,
            count: maps.count,
            bias_scale: config.depth_bias_scale,
            bias_offset: config.depth_bias_offset,
            _pad: 0.0,
        }
    }
}
