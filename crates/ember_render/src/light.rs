//! Light sources
//!
//! Lights are rebuilt once per frame from the front end's visible-light
//! list. The `view`/`projection` pair here is the *lighting* transform the
//! front end computed when the light was defined - the attenuation
//! composer consumes it directly. Shadow-pass matrices are separate,
//! per-sub-pass values produced by [`crate::shadow`]; nothing in this
//! struct is mutated while a frame renders.

use ember_math::{Mat4, Vec3};

/// Light classification, selecting the shadow technique
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Point light; cube-map shadows, 6 faces
    Omni,
    /// Spot-like light; a single perspective shadow map
    Projective,
    /// Sun-like light; cascaded/parallel-split shadow maps
    Directional,
}

/// A dynamic light for the current frame
#[derive(Clone, Debug)]
pub struct Light {
    pub kind: LightKind,
    /// World-space origin (derived anchor for directional lights)
    pub origin: Vec3,
    /// World radius for omni lights; falloff length for projective lights
    pub radius: f32,
    /// Normalized travel direction (directional lights only)
    pub direction: Vec3,
    /// Front-end lighting view matrix (world -> light)
    pub view: Mat4,
    /// Front-end lighting projection matrix (light -> clip)
    pub projection: Mat4,
    /// Shadow quality LOD; negative disables this light's shadows
    pub shadow_lod: i32,
    /// Never render shadow maps for this light
    pub no_shadows: bool,
    /// Shadows come from a separate deferred pass; skip the light here
    pub inverse_shadows: bool,
    /// Run the light-volume compositor after this light's lighting pass
    pub volumetric: bool,
    /// Linear RGB color, pre-scaled by intensity
    pub color: Vec3,
    /// Occlusion-query samples for the light volume (u32::MAX = not measured)
    pub query_samples: u32,
}

impl Light {
    /// Omni light with the front end's standard lighting matrices: a view
    /// centered on the light and an orthographic box spanning the radius on
    /// every axis, so clip space is the light's bounding cube.
    pub fn omni(origin: Vec3, radius: f32) -> Self {
        Self {
            kind: LightKind::Omni,
            origin,
            radius,
            direction: Vec3::ZERO,
            view: Mat4::from_translation(-origin),
            projection: Mat4::orthographic(-radius, radius, -radius, radius, -radius, radius),
            shadow_lod: 0,
            no_shadows: false,
            inverse_shadows: false,
            volumetric: false,
            color: Vec3::ONE,
            query_samples: u32::MAX,
        }
    }

    /// Projective light aimed from `origin` at `target`; `falloff` is the
    /// lit distance along the beam and bounds the shadow far plane.
    pub fn projective(origin: Vec3, target: Vec3, up: Vec3, fov_y: f32, falloff: f32) -> Self {
        Self {
            kind: LightKind::Projective,
            origin,
            radius: falloff,
            direction: (target - origin).normalize(),
            view: Mat4::look_at(origin, target, up),
            projection: Mat4::perspective(fov_y, 1.0, 1.0, falloff),
            shadow_lod: 0,
            no_shadows: false,
            inverse_shadows: false,
            volumetric: false,
            color: Vec3::ONE,
            query_samples: u32::MAX,
        }
    }

    /// Directional light traveling along `direction`. The front end
    /// supplies the lighting matrices for such lights; they default to
    /// identity here and are normally overridden via
    /// [`with_matrices`](Self::with_matrices).
    pub fn directional(direction: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            origin: Vec3::ZERO,
            radius: 0.0,
            direction: direction.normalize(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            shadow_lod: 0,
            no_shadows: false,
            inverse_shadows: false,
            volumetric: false,
            color: Vec3::ONE,
            query_samples: u32::MAX,
        }
    }

    pub fn with_matrices(mut self, view: Mat4, projection: Mat4) -> Self {
        self.view = view;
        self.projection = projection;
        self
    }

    pub fn with_shadow_lod(mut self, lod: i32) -> Self {
        self.shadow_lod = lod;
        self
    }

    pub fn with_no_shadows(mut self) -> Self {
        self.no_shadows = true;
        self
    }

    pub fn with_inverse_shadows(mut self) -> Self {
        self.inverse_shadows = true;
        self
    }

    pub fn with_volumetric(mut self) -> Self {
        self.volumetric = true;
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_query_samples(mut self, samples: u32) -> Self {
        self.query_samples = samples;
        self
    }

    /// True when this light is allowed to render shadow maps at all
    /// (configuration gates apply on top of this).
    #[inline]
    pub fn has_shadow(&self) -> bool {
        !self.no_shadows && self.shadow_lod >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omni_clip_cube_spans_radius() {
        let light = Light::omni(Vec3::new(10.0, -4.0, 2.0), 500.0);
        let clip = light.projection * light.view;

        let boundary = clip.transform_point(light.origin + Vec3::X * 500.0);
        assert!((boundary.x - 1.0).abs() < 1e-5);

        let center = clip.transform_point(light.origin);
        assert!(center.length() < 1e-5);
    }

    #[test]
    fn test_projective_far_plane_is_falloff() {
        let light = Light::projective(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            ember_math::consts::HALF_PI,
            30.0,
        );
        let clip = light.projection * light.view;
        let far = clip.transform_point(Vec3::new(0.0, 0.0, -30.0));
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_directional_normalizes() {
        let light = Light::directional(Vec3::new(0.0, 0.0, -9.0));
        assert!((light.direction - Vec3::NEG_Z).length() < 1e-6);
        assert_eq!(light.kind, LightKind::Directional);
    }

    #[test]
    fn test_shadow_gates() {
        assert!(Light::omni(Vec3::ZERO, 1.0).has_shadow());
        assert!(!Light::omni(Vec3::ZERO, 1.0).with_no_shadows().has_shadow());
        assert!(!Light::omni(Vec3::ZERO, 1.0).with_shadow_lod(-1).has_shadow());
    }
}
