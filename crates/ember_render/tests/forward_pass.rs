//! Integration tests for ember_render
//!
//! Drives the full pass pipeline against a recording backend and checks
//! sub-pass ordering, batching, and the per-frame statistics.

use ember_math::{consts::HALF_PI, Mat4, Vec3, AABB};
use ember_render::*;

/// Backend fake that records every call the pass loop makes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    ShadowBind,
    ViewBind,
    BeginShadow,
    BeginLighting,
    EndBatch,
    Volume,
}

#[derive(Default)]
struct CountingBackend {
    bind_ok: bool,
    events: Vec<Event>,
    shadow_binds: Vec<ShadowTarget>,
    view_binds: u32,
    /// `count` field of every shadow-params block bound
    shadow_params: Vec<u32>,
    begins: Vec<PassKind>,
    /// Lighting begins that carried a parameter block
    lit_blocks: u32,
    ends: u32,
    volumes: Vec<LightVolume>,
    errors: Vec<BackendError>,
}

impl CountingBackend {
    fn new() -> Self {
        Self {
            bind_ok: true,
            ..Default::default()
        }
    }
}

impl ForwardBackend for CountingBackend {
    fn bind_shadow_target(&mut self, target: &ShadowTarget) -> bool {
        self.events.push(Event::ShadowBind);
        self.shadow_binds.push(*target);
        self.bind_ok
    }
    fn bind_view_target(&mut self, _viewport: Viewport) {
        self.events.push(Event::ViewBind);
        self.view_binds += 1;
    }
    fn set_scissor(&mut self, _scissor: ScissorRect) {}
    fn set_depth_range(&mut self, _range: DepthRange) {}
    fn set_depth_bias(&mut self, _scale: f32, _offset: f32) {}
    fn bind_shadow_params(&mut self, params: &GpuShadowParams) {
        self.shadow_params.push(params.count);
    }
    fn begin_batch(&mut self, state: &BatchState) {
        self.events.push(match state.pass {
            PassKind::ShadowDepth => Event::BeginShadow,
            PassKind::Lighting => Event::BeginLighting,
        });
        if state.lighting.is_some() {
            self.lit_blocks += 1;
        }
        self.begins.push(state.pass);
    }
    fn end_batch(&mut self, _batch: &GeometryBatch) {
        self.events.push(Event::EndBatch);
        self.ends += 1;
    }
    fn draw_volume(&mut self, volume: &LightVolume) {
        self.events.push(Event::Volume);
        self.volumes.push(*volume);
    }
    fn poll_error(&mut self) -> Option<BackendError> {
        self.errors.pop()
    }
}

fn test_view() -> ViewParams {
    ViewParams::new(
        Mat4::look_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y),
        Mat4::perspective(HALF_PI, 4.0 / 3.0, 1.0, 200.0),
        Vec3::ZERO,
        Vec3::NEG_Z,
        1.0,
        200.0,
        Viewport::new(0, 0, 640, 480),
    )
}

/// Unit quad in entity-local space, world bounds around `center`
fn quad_surface(center: Vec3) -> Surface {
    let points = vec![
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(-1.0, 1.0, 0.0),
    ];
    Surface::new(
        SurfaceKind::Face { points },
        AABB::new(center - Vec3::splat(1.0), center + Vec3::splat(1.0)),
    )
}

fn on_screen() -> ScissorRect {
    ScissorRect::new(0, 0, 639, 479)
}

#[test]
fn test_two_lights_three_entities_full_frame() {
    let view = test_view();
    let lights = vec![
        Light::directional(Vec3::new(-0.3, -1.0, -0.2)),
        Light::omni(Vec3::new(0.0, 0.0, -30.0), 500.0),
    ];
    let origins = [
        Vec3::new(0.0, 0.0, -20.0),
        Vec3::new(10.0, 0.0, -30.0),
        Vec3::new(-10.0, 0.0, -40.0),
    ];
    let entities: Vec<Entity> = origins
        .iter()
        .map(|o| Entity::new(*o, ember_math::Mat3::IDENTITY))
        .collect();
    let surfaces: Vec<Surface> = origins.iter().map(|o| quad_surface(*o)).collect();
    let materials = vec![Material::new(0)];
    let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);

    let mut interactions = InteractionList::new();
    for light in 0..2u32 {
        for entity in 0..3u32 {
            interactions.push(
                Interaction::new(light, entity, entity, 0).with_scissor(on_screen()),
            );
        }
    }

    let config = RenderConfig {
        directional_splits: 2,
        ..RenderConfig::default()
    };
    let mut backend = CountingBackend::new();
    let mut renderer = ForwardRenderer::new(config.clone());
    let stats = renderer.render_view(&mut backend, &context, &interactions);

    assert_eq!(stats.lights, 2);

    // One depth sub-pass per cascade, one per cube face.
    assert_eq!(stats.shadow_passes, 8);
    assert_eq!(backend.shadow_binds.len(), 8);
    assert_eq!(backend.shadow_binds[0].layer, ShadowLayer::Cascade(0));
    assert_eq!(backend.shadow_binds[0].resolution, config.cascade_resolution);
    assert_eq!(backend.shadow_binds[1].layer, ShadowLayer::Cascade(1));
    for (face, bind) in backend.shadow_binds[2..].iter().enumerate() {
        assert_eq!(bind.layer, ShadowLayer::CubeFace(face as u8));
        assert_eq!(bind.resolution, config.lod_resolutions[0]);
    }
    assert_eq!(stats.cube_faces_culled, 0);

    // One lit replay per light, each preceded by a camera restore.
    assert_eq!(stats.lighting_passes, 2);
    assert_eq!(backend.view_binds, 2);

    // The material is not entity-mergeable, so every sub-pass opens one
    // batch per interaction: (2 cascades + 6 faces + 2 lit replays) * 3.
    let sub_passes: u32 = 2 + 6 + 2;
    assert_eq!(stats.batches, sub_passes * 3);
    assert_eq!(backend.begins.len() as u32, sub_passes * 3);
    assert_eq!(backend.ends, sub_passes * 3);
    assert_eq!(stats.draws_merged, 0);
    // Each quad contributes two triangles to every pass that draws it.
    assert_eq!(stats.triangles, sub_passes * 3 * 2);

    // Two cascades bound for the sun, six faces reported for the omni.
    assert_eq!(backend.shadow_params, vec![2, 6]);
    // Only the lit batches carried parameter blocks.
    assert_eq!(backend.lit_blocks, 6);

    // Cascade binds precede the first restore, cube-face binds sit
    // between the restores, and no lighting batch precedes a restore.
    let restores: Vec<usize> = backend
        .events
        .iter()
        .enumerate()
        .filter(|(_, e)| **e == Event::ViewBind)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(restores.len(), 2);
    let before = backend.events[..restores[0]]
        .iter()
        .filter(|e| **e == Event::ShadowBind)
        .count();
    let between = backend.events[restores[0]..restores[1]]
        .iter()
        .filter(|e| **e == Event::ShadowBind)
        .count();
    assert_eq!(before, 2);
    assert_eq!(between, 6);
    let first_lit = backend
        .events
        .iter()
        .position(|e| *e == Event::BeginLighting)
        .unwrap();
    assert!(first_lit > restores[0]);

    // Neither light is volumetric.
    assert_eq!(stats.volumes_drawn, 0);
    assert!(backend.volumes.is_empty());
    assert_eq!(stats.sort_violations, 0);
}

#[test]
fn test_identical_runs_merge_into_one_batch() {
    for &count in &[1u32, 3, 10] {
        let view = test_view();
        let lights = vec![Light::omni(Vec3::ZERO, 50.0).with_no_shadows()];
        let entities = vec![Entity::at_origin()];
        let surfaces = vec![quad_surface(Vec3::ZERO)];
        let materials = vec![Material::new(0)];
        let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);

        let mut interactions = InteractionList::new();
        for _ in 0..count {
            interactions.push(Interaction::new(0, 0, 0, 0).with_scissor(on_screen()));
        }

        let mut backend = CountingBackend::new();
        let mut renderer = ForwardRenderer::new(RenderConfig::default());
        let stats = renderer.render_view(&mut backend, &context, &interactions);

        assert_eq!(stats.batches, 1, "a run of {count} shares one batch");
        assert_eq!(stats.draws_merged, count - 1);
        assert_eq!(backend.ends, 1);
    }
}

#[test]
fn test_entity_merge_requires_mergeable_material() {
    let view = test_view();
    let lights = vec![Light::omni(Vec3::ZERO, 50.0).with_no_shadows()];
    let entities = vec![
        Entity::at_origin(),
        Entity::new(Vec3::new(4.0, 0.0, 0.0), ember_math::Mat3::IDENTITY),
        Entity::new(Vec3::new(8.0, 0.0, 0.0), ember_math::Mat3::IDENTITY),
    ];
    let surfaces: Vec<Surface> = entities.iter().map(|e| quad_surface(e.origin)).collect();
    let materials = vec![Material::new(0).with_entity_mergeable(), Material::new(1)];
    let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);

    let mut renderer = ForwardRenderer::new(RenderConfig::default());

    // World-geometry material: three entities collapse into one draw.
    let mut merged = InteractionList::new();
    for entity in 0..3u32 {
        merged.push(Interaction::new(0, entity, entity, 0).with_scissor(on_screen()));
    }
    let mut backend = CountingBackend::new();
    let stats = renderer.render_view(&mut backend, &context, &merged);
    assert_eq!(stats.batches, 1);
    assert_eq!(stats.draws_merged, 2);

    // Per-entity material: every entity boundary flushes.
    let mut split = InteractionList::new();
    for entity in 0..3u32 {
        split.push(Interaction::new(0, entity, entity, 1).with_scissor(on_screen()));
    }
    let mut backend = CountingBackend::new();
    let stats = renderer.render_view(&mut backend, &context, &split);
    assert_eq!(stats.batches, 3);
    assert_eq!(stats.draws_merged, 0);
}

#[test]
fn test_omni_faces_follow_the_interaction_mask() {
    let view = test_view();
    let lights = vec![Light::omni(Vec3::ZERO, 100.0)];

    // Face count tracks the union of the run's masks: all six, the three
    // positive-axis faces, a single face.
    for &(mask, rendered) in &[
        (CubeSideBits::ALL, 6u32),
        (CubeSideBits(0b01_0101), 3),
        (CubeSideBits::single(5), 1),
    ] {
        let entities = vec![Entity::at_origin()];
        let surfaces = vec![quad_surface(Vec3::new(50.0, 0.0, 0.0))];
        let materials = vec![Material::new(0)];
        let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);

        let mut interactions = InteractionList::new();
        interactions.push(
            Interaction::new(0, 0, 0, 0)
                .with_cube_sides(mask)
                .with_scissor(on_screen()),
        );

        let mut backend = CountingBackend::new();
        let mut renderer = ForwardRenderer::new(RenderConfig::default());
        let stats = renderer.render_view(&mut backend, &context, &interactions);

        assert_eq!(stats.shadow_passes, rendered, "mask {:#08b}", mask.0);
        assert_eq!(stats.cube_faces_culled, 6 - rendered);
        assert_eq!(backend.shadow_binds.len() as u32, rendered);
    }

    let entities = vec![Entity::at_origin(), Entity::at_origin()];
    let surfaces = vec![
        quad_surface(Vec3::new(50.0, 0.0, 0.0)),
        quad_surface(Vec3::new(0.0, -50.0, 0.0)),
    ];
    let materials = vec![Material::new(0)];
    let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);

    // One surface on the +X side, one on the -Y side.
    let mut interactions = InteractionList::new();
    interactions.push(
        Interaction::new(0, 0, 0, 0)
            .with_cube_sides(CubeSideBits::single(0))
            .with_scissor(on_screen()),
    );
    interactions.push(
        Interaction::new(0, 1, 1, 0)
            .with_cube_sides(CubeSideBits::single(3))
            .with_scissor(on_screen()),
    );

    let mut backend = CountingBackend::new();
    let mut renderer = ForwardRenderer::new(RenderConfig::default());
    let stats = renderer.render_view(&mut backend, &context, &interactions);

    // Faces without any flagged surface never bind.
    assert_eq!(stats.shadow_passes, 2);
    assert_eq!(stats.cube_faces_culled, 4);
    assert_eq!(backend.shadow_binds[0].layer, ShadowLayer::CubeFace(0));
    assert_eq!(backend.shadow_binds[1].layer, ShadowLayer::CubeFace(3));

    // Within each rendered face, only its own surface draws.
    assert_eq!(stats.skipped_cube_face, 2);
    assert_eq!(stats.batches, 2 + 2);
}

#[test]
fn test_occlusion_queries_gate_lights_and_interactions() {
    let view = test_view();
    let lights = vec![
        Light::projective(Vec3::new(0.0, 10.0, -20.0), Vec3::new(0.0, 0.0, -20.0), Vec3::X, HALF_PI, 40.0)
            .with_query_samples(0),
        Light::projective(Vec3::new(0.0, 10.0, -30.0), Vec3::new(0.0, 0.0, -30.0), Vec3::X, HALF_PI, 40.0),
    ];
    let entities = vec![Entity::at_origin(), Entity::at_origin().with_query_samples(0)];
    let surfaces = vec![
        quad_surface(Vec3::new(0.0, 0.0, -20.0)),
        quad_surface(Vec3::new(0.0, 0.0, -30.0)),
    ];
    let materials = vec![Material::new(0)];
    let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);

    let mut interactions = InteractionList::new();
    interactions.push(Interaction::new(0, 0, 0, 0).with_scissor(on_screen()));
    interactions.push(Interaction::new(1, 0, 0, 0).with_scissor(on_screen()));
    interactions.push(
        Interaction::new(1, 0, 1, 0)
            .with_scissor(on_screen())
            .with_query_samples(0),
    );
    interactions.push(Interaction::new(1, 1, 1, 0).with_scissor(on_screen()));

    let config = RenderConfig {
        occlusion_culling: true,
        ..RenderConfig::default()
    };
    let mut backend = CountingBackend::new();
    let mut renderer = ForwardRenderer::new(config);
    let stats = renderer.render_view(&mut backend, &context, &interactions);

    // Light 0 reported zero samples: dropped before any sub-pass.
    assert_eq!(stats.lights, 2);
    assert_eq!(stats.lights_occluded, 1);
    assert_eq!(backend.shadow_binds.len(), 1);

    // The occluded interaction and the occluded entity are skipped in
    // both the shadow and the lighting walk of light 1's run.
    assert_eq!(stats.skipped_occluded, 4);
    assert_eq!(stats.batches, 2);
    assert_eq!(backend.shadow_params, vec![1]);
}

#[test]
fn test_off_screen_light_keeps_state_but_draws_nothing() {
    let view = test_view();
    let lights = vec![Light::omni(Vec3::ZERO, 50.0).with_no_shadows()];
    let entities = vec![Entity::at_origin()];
    let surfaces = vec![quad_surface(Vec3::ZERO)];
    let materials = vec![Material::new(0)];
    let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);

    // No interaction carries a scissor: the light covers no pixels.
    let mut interactions = InteractionList::new();
    interactions.push(Interaction::new(0, 0, 0, 0));

    let mut backend = CountingBackend::new();
    let mut renderer = ForwardRenderer::new(RenderConfig::default());
    let stats = renderer.render_view(&mut backend, &context, &interactions);

    assert_eq!(stats.lights_scissored, 1);
    assert_eq!(stats.lighting_passes, 1);
    assert_eq!(backend.view_binds, 1);
    assert!(backend.begins.is_empty());
    assert_eq!(backend.ends, 0);
    assert!(backend.volumes.is_empty());
}

#[test]
fn test_volumetric_light_composites_one_quad() {
    let view = test_view();
    let lights = vec![Light::omni(Vec3::ZERO, 50.0)
        .with_no_shadows()
        .with_volumetric()
        .with_color(Vec3::new(1.0, 0.6, 0.2))];
    let entities = vec![Entity::at_origin()];
    let surfaces = vec![quad_surface(Vec3::ZERO)];
    let materials = vec![Material::new(0)];
    let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);

    let mut interactions = InteractionList::new();
    interactions.push(Interaction::new(0, 0, 0, 0).with_scissor(ScissorRect::new(10, 20, 100, 200)));

    let mut backend = CountingBackend::new();
    let mut renderer = ForwardRenderer::new(RenderConfig::default());
    let stats = renderer.render_view(&mut backend, &context, &interactions);

    assert_eq!(stats.volumes_drawn, 1);
    let volume = &backend.volumes[0];
    assert_eq!(volume.scissor, ScissorRect::new(10, 20, 100, 200));
    assert_eq!(volume.radius, 50.0);
    assert_eq!(volume.color, Vec3::new(1.0, 0.6, 0.2));
    // The quad composites after the light's batches are flushed.
    assert_eq!(backend.events.last(), Some(&Event::Volume));

    // Compositing off: same scene, no quad.
    let disabled = RenderConfig {
        volumetric_enabled: false,
        ..RenderConfig::default()
    };
    let mut backend = CountingBackend::new();
    let mut renderer = ForwardRenderer::new(disabled);
    let stats = renderer.render_view(&mut backend, &context, &interactions);
    assert_eq!(stats.volumes_drawn, 0);
    assert!(backend.volumes.is_empty());
}

#[test]
fn test_inverse_shadow_lights_are_deferred() {
    let view = test_view();
    let lights = vec![Light::omni(Vec3::ZERO, 50.0).with_inverse_shadows()];
    let entities = vec![Entity::at_origin()];
    let surfaces = vec![quad_surface(Vec3::ZERO)];
    let materials = vec![Material::new(0)];
    let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);

    let mut interactions = InteractionList::new();
    interactions.push(Interaction::new(0, 0, 0, 0).with_scissor(on_screen()));

    let mut backend = CountingBackend::new();
    let mut renderer = ForwardRenderer::new(RenderConfig::default());
    let stats = renderer.render_view(&mut backend, &context, &interactions);

    assert_eq!(stats.lights_skipped_inverse, 1);
    assert!(backend.events.is_empty());
}

#[test]
fn test_shadows_disabled_still_lights() {
    let view = test_view();
    let lights = vec![Light::omni(Vec3::ZERO, 50.0)];
    let entities = vec![Entity::at_origin()];
    let surfaces = vec![quad_surface(Vec3::ZERO)];
    let materials = vec![Material::new(0)];
    let context = RenderContext::new(&view, &lights, &entities, &surfaces, &materials);

    let mut interactions = InteractionList::new();
    interactions.push(Interaction::new(0, 0, 0, 0).with_scissor(on_screen()));

    let mut backend = CountingBackend::new();
    let mut renderer = ForwardRenderer::new(RenderConfig::disabled());
    let stats = renderer.render_view(&mut backend, &context, &interactions);

    assert_eq!(stats.shadow_passes, 0);
    assert!(backend.shadow_binds.is_empty());
    // The light still draws, with an unshadowed parameter block.
    assert_eq!(stats.lighting_passes, 1);
    assert_eq!(backend.shadow_params, vec![0]);
    assert_eq!(stats.batches, 1);
}
