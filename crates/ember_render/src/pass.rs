//! The interaction pass driver
//!
//! One traversal of the frame's interaction list per light: first the
//! light's shadow sub-passes (up to six cube faces, one projective map,
//! or one cascade per configured split), then a replay of the same run
//! with the camera state restored, batching lit draws. Merging,
//! skipping, and flushing decisions all live here; the GPU work crosses
//! the [`ForwardBackend`] seam.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use ember_math::AABB;

use crate::attenuation::AttenuationCache;
use crate::backend::{BatchState, ForwardBackend, PassKind};
use crate::config::RenderConfig;
use crate::entity::Entity;
use crate::gpu::{GpuLightParams, GpuShadowParams};
use crate::interaction::{Interaction, InteractionKind, InteractionList, LightRun};
use crate::light::{Light, LightKind};
use crate::material::Material;
use crate::shadow::projection::{
    directional_matrices, omni_face_matrices, projective_matrices, LightShadowMaps,
    ShadowPassMatrices,
};
use crate::shadow::split::split_frusta;
use crate::surface::{GeometryBatch, Surface};
use crate::target::{ShadowLayer, TargetManager};
use crate::view::{DepthRange, RenderContext};
use crate::volume::build_volume;

/// What processing one interaction did to the open batch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Invisible to the current state; the open batch is untouched
    Skipped,
    /// Merged into the already-open batch
    Batched,
    /// Batch boundary: any open batch was flushed and a new one opened
    Flushed,
}

/// Per-frame counters, reset at every `render_view`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStats {
    pub lights: u32,
    /// Lights handed to the deferred inverse-shadow path instead
    pub lights_skipped_inverse: u32,
    /// Lights dropped by a zero light-volume occlusion query
    pub lights_occluded: u32,
    /// Lights whose scissor left no visible pixels
    pub lights_scissored: u32,
    /// Depth sub-passes issued (cube faces + cascades + maps)
    pub shadow_passes: u32,
    /// Sub-passes dropped: unavailable target or degenerate split
    pub shadow_passes_skipped: u32,
    /// Omni faces skipped by the interaction face mask
    pub cube_faces_culled: u32,
    /// Directional splits whose crop fell back to frustum bounds
    pub crop_fallbacks: u32,
    pub lighting_passes: u32,
    pub volumes_drawn: u32,
    /// Batches opened (begin/end pairs)
    pub batches: u32,
    /// Interactions merged into an open batch
    pub draws_merged: u32,
    pub triangles: u32,
    pub skipped_kind: u32,
    pub skipped_material: u32,
    pub skipped_no_shadow: u32,
    pub skipped_cube_face: u32,
    pub skipped_occluded: u32,
    /// Interactions naming out-of-range array indices
    pub skipped_invalid: u32,
    pub attenuation_recomputes: u32,
    pub attenuation_hits: u32,
    pub sort_violations: u32,
}

/// Renderer state surviving across frames: configuration and the last
/// frame's statistics. Serializable for hot reload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub config: RenderConfig,
    pub stats: PassStats,
}

/// Interaction-driven forward lighting renderer
pub struct ForwardRenderer {
    config: RenderConfig,
    stats: PassStats,
}

impl ForwardRenderer {
    pub fn new(mut config: RenderConfig) -> Self {
        config.validate();
        Self {
            config,
            stats: PassStats::default(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_config(&mut self, mut config: RenderConfig) {
        config.validate();
        self.config = config;
    }

    /// Statistics of the most recent `render_view`
    pub fn stats(&self) -> &PassStats {
        &self.stats
    }

    pub fn save_state(&self) -> SavedState {
        SavedState {
            config: self.config.clone(),
            stats: self.stats,
        }
    }

    pub fn restore_state(&mut self, state: SavedState) {
        self.set_config(state.config);
        self.stats = state.stats;
    }

    /// Render every light's shadow and lighting sub-passes for one view.
    pub fn render_view<B: ForwardBackend>(
        &mut self,
        backend: &mut B,
        context: &RenderContext<'_>,
        interactions: &InteractionList,
    ) -> PassStats {
        let mut stats = PassStats {
            sort_violations: interactions.sort_violations(),
            ..PassStats::default()
        };
        let mut targets = TargetManager::new();
        let mut cache = AttenuationCache::new();
        let mut batch = GeometryBatch::new();

        for run in interactions.runs() {
            let Some(light) = context.lights.get(run.light as usize) else {
                log::debug!("interaction run references missing light {}", run.light);
                stats.skipped_invalid += run.len;
                continue;
            };
            stats.lights += 1;

            if light.inverse_shadows {
                stats.lights_skipped_inverse += 1;
                continue;
            }
            if self.config.occlusion_culling && light.query_samples == 0 {
                stats.lights_occluded += 1;
                continue;
            }
            log::trace!(
                "light {} ({:?}): {} interactions",
                run.light,
                light.kind,
                run.len
            );

            let maps = self.shadow_phase(
                backend,
                context,
                interactions,
                run,
                light,
                &mut targets,
                &mut batch,
                &mut stats,
            );
            self.lighting_phase(
                backend,
                context,
                interactions,
                run,
                light,
                &maps,
                &mut targets,
                &mut cache,
                &mut batch,
                &mut stats,
            );
        }

        stats.attenuation_hits = cache.hits;
        stats.attenuation_recomputes = cache.recomputes;
        stats.shadow_passes_skipped += targets.skipped_binds;
        self.stats = stats;
        stats
    }

    /// All depth sub-passes for one light. Returns the composed sampling
    /// matrices (empty when shadows are off for this light).
    #[allow(clippy::too_many_arguments)]
    fn shadow_phase<B: ForwardBackend>(
        &self,
        backend: &mut B,
        context: &RenderContext<'_>,
        interactions: &InteractionList,
        run: &LightRun,
        light: &Light,
        targets: &mut TargetManager,
        batch: &mut GeometryBatch,
        stats: &mut PassStats,
    ) -> LightShadowMaps {
        let mut maps = LightShadowMaps::default();
        if !self.config.shadows_enabled || !light.has_shadow() {
            return maps;
        }

        match light.kind {
            LightKind::Omni => {
                let mask = interactions.face_mask(run);
                for face in 0..6 {
                    if !mask.contains(face) {
                        stats.cube_faces_culled += 1;
                        continue;
                    }
                    let matrices = omni_face_matrices(light, face);
                    let layer = ShadowLayer::CubeFace(face as u8);
                    if self.run_shadow_sub_pass(
                        backend,
                        context,
                        interactions,
                        run,
                        light,
                        &matrices,
                        layer,
                        Some(face),
                        targets,
                        batch,
                        stats,
                    ) {
                        maps.push(matrices.clip(), light.radius);
                    }
                }
            }
            LightKind::Projective => {
                let matrices = projective_matrices(light);
                if self.run_shadow_sub_pass(
                    backend,
                    context,
                    interactions,
                    run,
                    light,
                    &matrices,
                    ShadowLayer::Map,
                    None,
                    targets,
                    batch,
                    stats,
                ) {
                    maps.push(matrices.clip(), light.radius);
                }
            }
            LightKind::Directional => {
                let (casters, receivers) = collect_shadow_bounds(context, interactions, run);
                let splits = split_frusta(
                    context.view,
                    self.config.directional_splits,
                    self.config.split_lambda,
                );
                for split in &splits {
                    let Some(directional) = directional_matrices(
                        light,
                        context.view.forward,
                        &split.frustum,
                        &casters,
                        &receivers,
                    ) else {
                        log::debug!("degenerate sub-frustum for split {}, skipping", split.index);
                        stats.shadow_passes_skipped += 1;
                        continue;
                    };
                    if directional.crop_fell_back {
                        stats.crop_fallbacks += 1;
                    }
                    if self.run_shadow_sub_pass(
                        backend,
                        context,
                        interactions,
                        run,
                        light,
                        &directional.matrices,
                        ShadowLayer::Cascade(split.index as u8),
                        None,
                        targets,
                        batch,
                        stats,
                    ) {
                        maps.push(directional.matrices.clip(), split.far);
                    }
                }
            }
        }
        maps
    }

    /// One depth sub-pass over the light's run. Returns whether the
    /// sub-pass actually rendered.
    #[allow(clippy::too_many_arguments)]
    fn run_shadow_sub_pass<B: ForwardBackend>(
        &self,
        backend: &mut B,
        context: &RenderContext<'_>,
        interactions: &InteractionList,
        run: &LightRun,
        light: &Light,
        matrices: &ShadowPassMatrices,
        layer: ShadowLayer,
        cube_face: Option<usize>,
        targets: &mut TargetManager,
        batch: &mut GeometryBatch,
        stats: &mut PassStats,
    ) -> bool {
        let target = targets.shadow_target(&self.config, light, layer);
        if !targets.begin_shadow_pass(backend, &self.config, &target) {
            return false;
        }
        stats.shadow_passes += 1;

        let mut open: Option<(u32, u32)> = None;
        for interaction in interactions.for_light(run) {
            let outcome = self.process_shadow_interaction(
                backend,
                context,
                interaction,
                matrices,
                cube_face,
                &mut open,
                batch,
                stats,
            );
            record_outcome(outcome, stats);
        }
        if open.is_some() {
            flush_batch(backend, batch);
        }
        drain_backend_errors(backend, "shadow sub-pass");
        true
    }

    /// Shadow-state handling of one interaction.
    #[allow(clippy::too_many_arguments)]
    fn process_shadow_interaction<B: ForwardBackend>(
        &self,
        backend: &mut B,
        context: &RenderContext<'_>,
        interaction: &Interaction,
        matrices: &ShadowPassMatrices,
        cube_face: Option<usize>,
        open: &mut Option<(u32, u32)>,
        batch: &mut GeometryBatch,
        stats: &mut PassStats,
    ) -> InteractionOutcome {
        let Some((entity, surface, material)) = context_refs(context, interaction) else {
            stats.skipped_invalid += 1;
            return InteractionOutcome::Skipped;
        };

        if interaction.kind == InteractionKind::LightOnly {
            stats.skipped_kind += 1;
            return InteractionOutcome::Skipped;
        }
        if entity.no_shadow {
            stats.skipped_no_shadow += 1;
            return InteractionOutcome::Skipped;
        }
        if let Some(face) = cube_face {
            if !interaction.cube_side_bits.contains(face) {
                stats.skipped_cube_face += 1;
                return InteractionOutcome::Skipped;
            }
        }
        if self.occluded(interaction, entity) {
            stats.skipped_occluded += 1;
            return InteractionOutcome::Skipped;
        }

        stats.triangles += surface.triangle_count();
        let key = (interaction.entity, interaction.material);
        if let Some(open_key) = *open {
            if can_merge(open_key, key, material) {
                surface.submit(batch);
                return InteractionOutcome::Batched;
            }
            flush_batch(backend, batch);
        }

        backend.begin_batch(&BatchState {
            pass: PassKind::ShadowDepth,
            view: matrices.view,
            projection: matrices.projection,
            model: entity.model_matrix(),
            lighting: None,
        });
        stats.batches += 1;
        surface.submit(batch);
        *open = Some(key);
        InteractionOutcome::Flushed
    }

    /// The lit replay of one light's run, preceded by the unconditional
    /// camera restore and followed by the volumetric quad.
    #[allow(clippy::too_many_arguments)]
    fn lighting_phase<B: ForwardBackend>(
        &self,
        backend: &mut B,
        context: &RenderContext<'_>,
        interactions: &InteractionList,
        run: &LightRun,
        light: &Light,
        maps: &LightShadowMaps,
        targets: &mut TargetManager,
        cache: &mut AttenuationCache,
        batch: &mut GeometryBatch,
        stats: &mut PassStats,
    ) {
        targets.begin_lighting_pass(backend, context.view);
        backend.bind_shadow_params(&GpuShadowParams::new(maps, &self.config));
        stats.lighting_passes += 1;

        let light_rect = interactions
            .light_scissor(run)
            .intersection(&context.view.scissor);
        if light_rect.is_empty() {
            stats.lights_scissored += 1;
            drain_backend_errors(backend, "lighting pass");
            return;
        }
        backend.set_scissor(light_rect);

        let mut open: Option<(u32, u32)> = None;
        let mut hacked = false;
        for interaction in interactions.for_light(run) {
            let outcome = self.process_lighting_interaction(
                backend,
                context,
                interaction,
                run.light,
                light,
                cache,
                &mut open,
                &mut hacked,
                batch,
                stats,
            );
            record_outcome(outcome, stats);
        }
        if open.is_some() {
            flush_batch(backend, batch);
        }
        if hacked {
            backend.set_depth_range(DepthRange::FULL);
        }

        if let Some(volume) = build_volume(run.light, light, light_rect, &self.config) {
            backend.draw_volume(&volume);
            stats.volumes_drawn += 1;
        }
        drain_backend_errors(backend, "lighting pass");
    }

    /// Lighting-state handling of one interaction.
    #[allow(clippy::too_many_arguments)]
    fn process_lighting_interaction<B: ForwardBackend>(
        &self,
        backend: &mut B,
        context: &RenderContext<'_>,
        interaction: &Interaction,
        light_index: u32,
        light: &Light,
        cache: &mut AttenuationCache,
        open: &mut Option<(u32, u32)>,
        hacked: &mut bool,
        batch: &mut GeometryBatch,
        stats: &mut PassStats,
    ) -> InteractionOutcome {
        let Some((entity, surface, material)) = context_refs(context, interaction) else {
            stats.skipped_invalid += 1;
            return InteractionOutcome::Skipped;
        };

        if interaction.kind == InteractionKind::ShadowOnly {
            stats.skipped_kind += 1;
            return InteractionOutcome::Skipped;
        }
        if !material.receives_lighting {
            stats.skipped_material += 1;
            return InteractionOutcome::Skipped;
        }
        if self.occluded(interaction, entity) {
            stats.skipped_occluded += 1;
            return InteractionOutcome::Skipped;
        }

        stats.triangles += surface.triangle_count();
        let key = (interaction.entity, interaction.material);
        if let Some(open_key) = *open {
            if can_merge(open_key, key, material) {
                surface.submit(batch);
                return InteractionOutcome::Batched;
            }
            flush_batch(backend, batch);
        }

        // Depth-range hacking toggles on entity boundaries only.
        let entity_changed = open.map_or(true, |(prev, _)| prev != interaction.entity);
        if entity_changed && entity.depth_hack != *hacked {
            backend.set_depth_range(if entity.depth_hack {
                DepthRange::HACK
            } else {
                DepthRange::FULL
            });
            *hacked = entity.depth_hack;
        }

        let attenuation = cache.get(light_index, interaction.entity, light, entity);
        backend.begin_batch(&BatchState {
            pass: PassKind::Lighting,
            view: context.view.view,
            projection: context.view.projection,
            model: entity.model_matrix(),
            lighting: Some(GpuLightParams::new(light, &attenuation)),
        });
        stats.batches += 1;
        surface.submit(batch);
        *open = Some(key);
        InteractionOutcome::Flushed
    }

    fn occluded(&self, interaction: &Interaction, entity: &Entity) -> bool {
        self.config.occlusion_culling
            && (interaction.query_samples == 0 || entity.query_samples == 0)
    }
}

impl Default for ForwardRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

/// Batch compatibility: same material always merges within a light; an
/// entity change merges only for entity-mergeable materials.
fn can_merge(open: (u32, u32), next: (u32, u32), material: &Material) -> bool {
    if open.1 != next.1 {
        return false;
    }
    if open.0 != next.0 {
        return material.entity_mergeable;
    }
    true
}

fn record_outcome(outcome: InteractionOutcome, stats: &mut PassStats) {
    if outcome == InteractionOutcome::Batched {
        stats.draws_merged += 1;
    }
}

fn flush_batch<B: ForwardBackend>(backend: &mut B, batch: &mut GeometryBatch) {
    backend.end_batch(batch);
    batch.clear();
}

fn context_refs<'a>(
    context: &RenderContext<'a>,
    interaction: &Interaction,
) -> Option<(&'a Entity, &'a Surface, &'a Material)> {
    Some((
        context.entities.get(interaction.entity as usize)?,
        context.surfaces.get(interaction.surface as usize)?,
        context.materials.get(interaction.material as usize)?,
    ))
}

/// World-space caster and receiver bounds over one light's run, feeding
/// the directional crop.
fn collect_shadow_bounds(
    context: &RenderContext<'_>,
    interactions: &InteractionList,
    run: &LightRun,
) -> (Vec<AABB>, Vec<AABB>) {
    let mut casters = Vec::new();
    let mut receivers = Vec::new();
    for interaction in interactions.for_light(run) {
        let Some((entity, surface, material)) = context_refs(context, interaction) else {
            continue;
        };
        if interaction.kind != InteractionKind::LightOnly && !entity.no_shadow {
            casters.push(surface.bounds);
        }
        if interaction.kind != InteractionKind::ShadowOnly && material.receives_lighting {
            receivers.push(surface.bounds);
        }
    }
    (casters, receivers)
}

/// GPU errors indicate API misuse; surface them loudly in debug builds
/// and keep the frame alive in release.
fn drain_backend_errors<B: ForwardBackend>(backend: &mut B, stage: &str) {
    while let Some(error) = backend.poll_error() {
        log::error!("GPU error during {stage}: {error}");
        if cfg!(debug_assertions) {
            panic!("GPU error during {stage}: {error}");
        }
    }
}
