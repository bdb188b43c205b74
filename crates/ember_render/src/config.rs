//! Renderer Configuration
//!
//! Global lighting/shadow settings with serde support for hot-reload.

use serde::{Deserialize, Serialize};

/// Number of shadow quality LODs (0 = highest detail)
pub const MAX_SHADOW_LODS: usize = 5;

/// Maximum parallel splits for directional light shadows
pub const MAX_SPLITS: usize = 4;

/// Global renderer configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Enable shadow mapping globally
    pub shadows_enabled: bool,

    /// Shadow map resolution per quality LOD (powers of 2, LOD 0 first)
    pub lod_resolutions: [u32; MAX_SHADOW_LODS],

    /// Resolution of each directional cascade map (power of 2)
    pub cascade_resolution: u32,

    /// Number of parallel splits for directional shadows; each split gets
    /// its own depth sub-pass
    pub directional_splits: u32,

    /// Split scheme weight (0 = linear, 1 = logarithmic)
    pub split_lambda: f32,

    /// Base quality LOD applied to omni lights (added to the light's own LOD)
    pub omni_lod: u32,

    /// Base quality LOD applied to projective lights
    pub projective_lod: u32,

    /// Gate interaction traversal on occlusion-query sample counts
    pub occlusion_culling: bool,

    /// Enable the light-volume compositor for flagged lights
    pub volumetric_enabled: bool,

    /// Slope-scaled polygon offset applied by the backend during shadow passes
    pub depth_bias_scale: f32,

    /// Constant polygon offset applied by the backend during shadow passes
    pub depth_bias_offset: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shadows_enabled: true,
            lod_resolutions: [2048, 1024, 512, 256, 128],
            cascade_resolution: 1024,
            directional_splits: 3,
            split_lambda: 0.5,
            omni_lod: 0,
            projective_lod: 0,
            occlusion_culling: false,
            volumetric_enabled: true,
            depth_bias_scale: 2.0,
            depth_bias_offset: 4.0,
        }
    }
}

impl RenderConfig {
    /// High-quality configuration
    pub fn high_quality() -> Self {
        Self {
            lod_resolutions: [4096, 2048, 1024, 512, 256],
            cascade_resolution: 2048,
            directional_splits: 4,
            split_lambda: 0.75,
            ..Default::default()
        }
    }

    /// Low-quality configuration for performance
    pub fn low_quality() -> Self {
        Self {
            lod_resolutions: [1024, 512, 256, 128, 128],
            cascade_resolution: 512,
            directional_splits: 2,
            omni_lod: 1,
            projective_lod: 1,
            occlusion_culling: true,
            volumetric_enabled: false,
            ..Default::default()
        }
    }

    /// Configuration with shadow mapping disabled
    pub fn disabled() -> Self {
        Self {
            shadows_enabled: false,
            volumetric_enabled: false,
            ..Default::default()
        }
    }

    /// Validate configuration and clamp values to valid ranges
    pub fn validate(&mut self) {
        let before = self.clone();

        for res in &mut self.lod_resolutions {
            *res = (*res).clamp(128, 8192).next_power_of_two();
        }
        self.cascade_resolution = self.cascade_resolution.clamp(128, 8192).next_power_of_two();
        self.directional_splits = self.directional_splits.clamp(1, MAX_SPLITS as u32);
        self.split_lambda = self.split_lambda.clamp(0.0, 1.0);
        self.omni_lod = self.omni_lod.min(MAX_SHADOW_LODS as u32 - 1);
        self.projective_lod = self.projective_lod.min(MAX_SHADOW_LODS as u32 - 1);
        self.depth_bias_scale = self.depth_bias_scale.max(0.0);
        self.depth_bias_offset = self.depth_bias_offset.max(0.0);

        if *self != before {
            log::warn!("render config had out-of-range values, clamped");
        }
    }

    /// Shadow map resolution for a light-class base LOD plus a per-light LOD
    pub fn lod_resolution(&self, base_lod: u32, light_lod: i32) -> u32 {
        let lod = (base_lod as i32 + light_lod.max(0)) as usize;
        self.lod_resolutions[lod.min(MAX_SHADOW_LODS - 1)]
    }
}

/// Quality ladder mapping a single user-facing knob onto a full config
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderQuality {
    Off,
    Low,
    Medium,
    High,
}

impl RenderQuality {
    pub fn to_config(self) -> RenderConfig {
        match self {
            RenderQuality::Off => RenderConfig::disabled(),
            RenderQuality::Low => RenderConfig::low_quality(),
            RenderQuality::Medium => RenderConfig::default(),
            RenderQuality::High => RenderConfig::high_quality(),
        }
    }
}
