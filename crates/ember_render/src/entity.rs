//! Render entities
//!
//! An entity is one placed model instance: a rigid transform plus the
//! per-instance flags the pass loop consults while batching. Surfaces
//! reference their entity by index into the frame's entity array.

use ember_math::{Mat3, Mat4, Vec3};

/// A model instance submitted for the current frame
#[derive(Clone, Debug)]
pub struct Entity {
    /// World-space placement origin
    pub origin: Vec3,
    /// World-space rotation (orthonormal basis, columns = local axes)
    pub axis: Mat3,
    /// Exclude every surface of this entity from shadow maps
    pub no_shadow: bool,
    /// Draw with the compressed depth range (first-person weapon)
    pub depth_hack: bool,
    /// Occlusion-query samples for the entity's bounds (u32::MAX = not measured)
    pub query_samples: u32,
}

impl Entity {
    pub fn new(origin: Vec3, axis: Mat3) -> Self {
        Self {
            origin,
            axis,
            no_shadow: false,
            depth_hack: false,
            query_samples: u32::MAX,
        }
    }

    /// Identity-placed entity at the world origin
    pub fn at_origin() -> Self {
        Self::new(Vec3::ZERO, Mat3::IDENTITY)
    }

    pub fn with_no_shadow(mut self) -> Self {
        self.no_shadow = true;
        self
    }

    pub fn with_depth_hack(mut self) -> Self {
        self.depth_hack = true;
        self
    }

    pub fn with_query_samples(mut self, samples: u32) -> Self {
        self.query_samples = samples;
        self
    }

    /// Local -> world model matrix composed from `axis` and `origin`
    #[inline]
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_origin(&self.axis, self.origin)
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::at_origin()
    }
}
