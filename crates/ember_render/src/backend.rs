//! Backend seam for the forward pass
//!
//! Everything the pass loop emits crosses this trait: target binds,
//! raster state, batch open/flush, volume draws, and error polling. The
//! embedding renderer implements it over its GPU API; tests implement it
//! with counters.

use core::fmt;

use ember_math::Mat4;

use crate::gpu::{GpuLightParams, GpuShadowParams};
use crate::surface::GeometryBatch;
use crate::target::ShadowTarget;
use crate::view::{DepthRange, ScissorRect, Viewport};
use crate::volume::LightVolume;

/// Which pass a batch belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    /// Depth-only geometry from the light's point of view
    ShadowDepth,
    /// Lit surface draw with the camera matrices
    Lighting,
}

/// State bound for the duration of one batch
#[derive(Clone, Copy, Debug)]
pub struct BatchState {
    pub pass: PassKind,
    /// View matrix of the current sub-pass (light view or camera view)
    pub view: Mat4,
    /// Projection of the current sub-pass (crop/cube face or camera)
    pub projection: Mat4,
    /// Model matrix of the batch's first entity
    pub model: Mat4,
    /// Lighting parameters; `None` during shadow depth
    pub lighting: Option<GpuLightParams>,
}

/// Error polled from the GPU after state-changing calls.
///
/// These indicate API misuse, not content problems; the pass loop
/// escalates them in debug builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendError {
    InvalidOperation,
    InvalidFramebuffer,
    OutOfMemory,
    Other(u32),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOperation => write!(f, "invalid operation"),
            Self::InvalidFramebuffer => write!(f, "invalid framebuffer"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::Other(code) => write!(f, "backend error {code:#x}"),
        }
    }
}

/// The GPU operations the forward pass is built from
pub trait ForwardBackend {
    /// Bind a shadow-map target and its full-surface viewport. Returns
    /// `false` when the attachment is unavailable; the caller skips the
    /// sub-pass.
    fn bind_shadow_target(&mut self, target: &ShadowTarget) -> bool;

    /// Bind the main color/depth target and the given viewport.
    fn bind_view_target(&mut self, viewport: Viewport);

    fn set_scissor(&mut self, scissor: ScissorRect);

    fn set_depth_range(&mut self, range: DepthRange);

    /// Polygon-offset factors applied while rasterizing shadow depth.
    fn set_depth_bias(&mut self, scale: f32, offset: f32);

    /// Upload a light's shadow sampling block, once per light before its
    /// lighting batches (`count == 0` means the light is unshadowed).
    fn bind_shadow_params(&mut self, params: &GpuShadowParams);

    /// Open a draw batch under `state`; geometry follows via `end_batch`.
    fn begin_batch(&mut self, state: &BatchState);

    /// Flush the accumulated geometry of the batch opened last.
    fn end_batch(&mut self, batch: &GeometryBatch);

    /// Composite one volumetric light quad.
    fn draw_volume(&mut self, volume: &LightVolume);

    /// Drain one pending GPU error, if any.
    fn poll_error(&mut self) -> Option<BackendError>;
}
