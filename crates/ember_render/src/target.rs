//! Render-target selection and camera restore
//!
//! Chooses the shadow attachment and resolution for each sub-pass and
//! owns the one transition that historically breeds bugs: re-entering
//! the lighting state. The restore runs unconditionally every time, so
//! no shadow sub-pass can leak viewport, scissor, depth-bias, or target
//! state into lighting.

use crate::backend::ForwardBackend;
use crate::config::RenderConfig;
use crate::light::{Light, LightKind};
use crate::view::{DepthRange, ScissorRect, ViewParams};

/// One shadow-map attachment to bind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowTarget {
    /// Square depth texture edge length in texels
    pub resolution: u32,
    pub layer: ShadowLayer,
}

/// Which layer of the light's shadow resource a sub-pass writes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowLayer {
    /// Face of the omni depth cube, face-index order +X..-Z
    CubeFace(u8),
    /// Cascade slot of the directional map array
    Cascade(u8),
    /// The single projective map
    Map,
}

/// Target state driver for the pass loop
#[derive(Debug, Default)]
pub struct TargetManager {
    /// Sub-passes skipped because the attachment was unavailable
    pub skipped_binds: u32,
    /// Transitions into the lighting state
    pub camera_restores: u32,
}

impl TargetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The attachment a light's sub-pass renders into. Omni and
    /// projective maps are sized by the LOD ladder (config base LOD plus
    /// the light's own bias); cascades use the fixed cascade resolution.
    pub fn shadow_target(&self, config: &RenderConfig, light: &Light, layer: ShadowLayer) -> ShadowTarget {
        let resolution = match light.kind {
            LightKind::Omni => config.lod_resolution(config.omni_lod, light.shadow_lod),
            LightKind::Projective => {
                config.lod_resolution(config.projective_lod, light.shadow_lod)
            }
            LightKind::Directional => config.cascade_resolution,
        };
        ShadowTarget { resolution, layer }
    }

    /// Bind a shadow target and raster state for a depth sub-pass.
    /// Returns `false` (with a skip statistic) when the attachment is
    /// unavailable; the caller drops the sub-pass and the light renders
    /// unshadowed there.
    pub fn begin_shadow_pass<B: ForwardBackend>(
        &mut self,
        backend: &mut B,
        config: &RenderConfig,
        target: &ShadowTarget,
    ) -> bool {
        if !backend.bind_shadow_target(target) {
            log::debug!(
                "shadow target unavailable ({}x{} {:?}), skipping sub-pass",
                target.resolution,
                target.resolution,
                target.layer
            );
            self.skipped_binds += 1;
            return false;
        }
        let edge = target.resolution as i32;
        backend.set_scissor(ScissorRect::new(0, 0, edge - 1, edge - 1));
        backend.set_depth_range(DepthRange::FULL);
        backend.set_depth_bias(config.depth_bias_scale, config.depth_bias_offset);
        true
    }

    /// Transition into the lighting state: rebind the view target and
    /// reload viewport, scissor, depth range, and bias unconditionally.
    /// The camera matrices themselves travel in every lighting batch, so
    /// nothing from the shadow sub-passes can survive into this state.
    pub fn begin_lighting_pass<B: ForwardBackend>(&mut self, backend: &mut B, view: &ViewParams) {
        backend.bind_view_target(view.viewport);
        backend.set_scissor(view.scissor);
        backend.set_depth_range(DepthRange::FULL);
        backend.set_depth_bias(0.0, 0.0);
        self.camera_restores += 1;
    }
}
