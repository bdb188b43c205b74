//! # ember_render - Interaction-Driven Forward Lighting
//!
//! Dynamic lighting and shadow-map rendering core with:
//! - Per-light interaction batching (merge/flush state machine)
//! - Omni cube-map, projective, and cascaded directional shadows
//! - Scene-dependent shadow crop (casters ∩ receivers ∩ sub-frustum)
//! - Attenuation matrix composition with per-pair caching
//! - Volumetric light compositing
//!
//! ## Architecture
//!
//! The renderer walks a per-frame interaction list the visibility system
//! built: one contiguous run of interactions per light. For each light it
//! renders the shadow sub-passes (up to 6 cube faces, one projective map,
//! or one cascade per configured split), restores the camera state, and
//! replays the run as batched lit draws. All GPU work crosses the
//! [`ForwardBackend`] trait; this crate computes matrices, batching
//! decisions, and parameter blocks.
//!
//! ## Example
//!
//! ```ignore
//! use ember_render::prelude::*;
//!
//! let mut renderer = ForwardRenderer::new(RenderQuality::High.to_config());
//!
//! // Per frame: the front end supplies the view and the flat arrays.
//! let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);
//!
//! let mut interactions = InteractionList::new();
//! for (light, surface) in visible_pairs {
//!     interactions.push(Interaction::new(light, surface.entity, surface.index, surface.material));
//! }
//!
//! let stats = renderer.render_view(&mut my_backend, &context, &interactions);
//! log::debug!("{} batches, {} merged draws", stats.batches, stats.draws_merged);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod attenuation;
pub mod backend;
pub mod config;
pub mod entity;
pub mod gpu;
pub mod interaction;
pub mod light;
pub mod material;
pub mod pass;
pub mod shadow;
pub mod surface;
pub mod target;
pub mod view;
pub mod volume;

// Configuration
pub use config::{RenderConfig, RenderQuality, MAX_SHADOW_LODS, MAX_SPLITS};

// Frame data
pub use entity::Entity;
pub use interaction::{CubeSideBits, Interaction, InteractionKind, InteractionList, LightRun};
pub use light::{Light, LightKind};
pub use material::Material;
pub use surface::{GeometryBatch, MeshVertex, Surface, SurfaceKind};
pub use view::{DepthRange, RenderContext, ScissorRect, ViewParams, Viewport};

// Shadow construction
pub use shadow::{
    clip_to_texture, crop_matrix, directional_matrices, light_basis, omni_face_matrices,
    projective_matrices, split_distances, split_frusta, sub_frustum, CropBounds, CropResolution,
    DirectionalSplit, LightShadowMaps, ShadowPassMatrices, SplitFrustum,
};

// Pass driver
pub use attenuation::{compose, Attenuation, AttenuationCache};
pub use pass::{ForwardRenderer, InteractionOutcome, PassStats, SavedState};
pub use target::{ShadowLayer, ShadowTarget, TargetManager};
pub use volume::{build_volume, LightVolume};

// Backend seam
pub use backend::{BackendError, BatchState, ForwardBackend, PassKind};
pub use gpu::{GpuLightParams, GpuShadowParams};

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::backend::{BatchState, ForwardBackend, PassKind};
    pub use crate::config::{RenderConfig, RenderQuality};
    pub use crate::entity::Entity;
    pub use crate::interaction::{Interaction, InteractionKind, InteractionList};
    pub use crate::light::{Light, LightKind};
    pub use crate::material::Material;
    pub use crate::pass::{ForwardRenderer, PassStats};
    pub use crate::surface::{GeometryBatch, Surface, SurfaceKind};
    pub use crate::view::{RenderContext, ScissorRect, ViewParams, Viewport};
}
