//! Attenuation / shadow sampling matrix composer
//!
//! One matrix per (light, entity) pair takes model-space vertices
//! straight to the light's texture space: the shader reads attenuation
//! and projection textures through it and runs the shadow comparison in
//! the same coordinates. The x/y outputs are homogeneous (divide by w);
//! the z output is the falloff coordinate and is sampled directly.
//!
//! Interactions arrive sorted, so consecutive draws usually share the
//! pair; the composer caches the last result and only recomputes when
//! light or entity actually changed.

use ember_math::{Mat4, Vec3, Vec4};

use crate::entity::Entity;
use crate::light::{Light, LightKind};
use crate::shadow::projection::clip_to_texture;

/// Composed per-(light, entity) values handed to the lighting shader
#[derive(Clone, Copy, Debug)]
pub struct Attenuation {
    /// Model space -> light texture space
    pub matrix: Mat4,
    /// Light origin in the entity's model space, for per-fragment
    /// distance without a second transform
    pub local_origin: Vec3,
}

fn from_rows(r0: Vec4, r1: Vec4, r2: Vec4, r3: Vec4) -> Mat4 {
    Mat4::from_cols(r0, r1, r2, r3).transpose()
}

/// Build the attenuation values for one (light, entity) pair.
pub fn compose(light: &Light, entity: &Entity) -> Attenuation {
    let model = entity.model_matrix();
    let clip = light.projection * light.view * model;

    let matrix = match light.kind {
        // Center-scale the [-1, 1] clip cube into [0, 1] on all axes.
        LightKind::Omni | LightKind::Directional => clip_to_texture() * clip,
        // x/y as above, but z measures view-space distance along the
        // beam so one falloff length spans [0, 1] exactly.
        LightKind::Projective => {
            let view_model = light.view * model;
            let falloff = light.radius.max(1e-3);
            from_rows(
                (clip.row(0) + clip.row(3)) * 0.5,
                (clip.row(1) + clip.row(3)) * 0.5,
                -view_model.row(2) / falloff,
                clip.row(3),
            )
        }
    };

    Attenuation {
        matrix,
        local_origin: model.inverse().transform_point(light.origin),
    }
}

/// Last-pair cache with hit/recompute counters; fresh per frame.
#[derive(Debug, Default)]
pub struct AttenuationCache {
    key: Option<(u32, u32)>,
    value: Option<Attenuation>,
    pub hits: u32,
    pub recomputes: u32,
}

impl AttenuationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The attenuation for (light, entity), recomputed only when the
    /// pair differs from the previous call.
    pub fn get(
        &mut self,
        light_index: u32,
        entity_index: u32,
        light: &Light,
        entity: &Entity,
    ) -> Attenuation {
        if self.key == Some((light_index, entity_index)) {
            if let Some(value) = self.value {
                self.hits += 1;
                return value;
            }
        }
        self.recomputes += 1;
        let value = compose(light, entity);
        self.key = Some((light_index, entity_index));
        self.value = Some(value);
        value
    }
}
