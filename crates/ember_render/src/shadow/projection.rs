//! Shadow pass matrices per light class
//!
//! The view/projection pair each depth sub-pass renders with, and the
//! composed sampling matrices the lighting shader receives afterwards.

use ember_math::{consts::HALF_PI, FrustumPlanes, Mat3, Mat4, Vec3, AABB};

use crate::config::MAX_SPLITS;
use crate::light::Light;
use crate::shadow::crop::{crop_matrix, CropBounds};

/// Matrices for one depth-only sub-pass
#[derive(Clone, Copy, Debug)]
pub struct ShadowPassMatrices {
    /// World -> light space
    pub view: Mat4,
    /// Light space -> clip
    pub projection: Mat4,
}

impl ShadowPassMatrices {
    /// Combined world -> light clip transform
    #[inline]
    pub fn clip(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Sampling matrices composed after a light's shadow sub-passes complete.
///
/// Directional lights fill one slot per split, projective lights one
/// slot total. Omni lights sample by cube direction and distance, so
/// `count` records the faces rendered but the matrix slots stay unused.
#[derive(Clone, Debug)]
pub struct LightShadowMaps {
    pub count: u32,
    /// World -> light clip, for the depth comparison
    pub matrix: [Mat4; MAX_SPLITS],
    /// Same, with the clip-to-texture transform prepended
    pub biased: [Mat4; MAX_SPLITS],
    /// View-space far boundary per split, for cascade selection
    pub distances: [f32; MAX_SPLITS],
}

impl Default for LightShadowMaps {
    fn default() -> Self {
        Self {
            count: 0,
            matrix: [Mat4::IDENTITY; MAX_SPLITS],
            biased: [Mat4::IDENTITY; MAX_SPLITS],
            distances: [0.0; MAX_SPLITS],
        }
    }
}

impl LightShadowMaps {
    /// Record a completed sub-pass's clip transform.
    pub fn push(&mut self, clip: Mat4, distance: f32) {
        let slot = self.count as usize;
        if slot < MAX_SPLITS {
            self.matrix[slot] = clip;
            self.biased[slot] = clip_to_texture() * clip;
            self.distances[slot] = distance;
        }
        self.count += 1;
    }
}

/// Maps the [-1, 1] clip cube into [0, 1] texture space on all axes.
pub fn clip_to_texture() -> Mat4 {
    Mat4::from_translation(Vec3::splat(0.5)) * Mat4::from_scale(Vec3::splat(0.5))
}

/// Cube-face orientations in face-index order +X, -X, +Y, -Y, +Z, -Z;
/// the up vectors follow cube-map texel addressing.
const CUBE_FACE_ORIENTATIONS: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

/// Matrices for one cube face of an omni light: 90-degree square
/// perspective from the light origin, far plane at the light radius.
pub fn omni_face_matrices(light: &Light, face: usize) -> ShadowPassMatrices {
    let (forward, up) = CUBE_FACE_ORIENTATIONS[face];
    ShadowPassMatrices {
        view: Mat4::look_at(light.origin, light.origin + forward, up),
        // A radius inside the near plane would invert the projection.
        projection: Mat4::perspective(HALF_PI, 1.0, 1.0, light.radius.max(2.0)),
    }
}

/// Projective lights render depth with their front-end frustum as-is.
pub fn projective_matrices(light: &Light) -> ShadowPassMatrices {
    ShadowPassMatrices {
        view: light.view,
        projection: light.projection,
    }
}

/// Orthonormal light-space basis (columns right, up, back) for a
/// directional light. Up is the camera view direction projected off the
/// light direction, so the shadow-map orientation tracks the camera
/// smoothly instead of flipping; alignment degeneracy falls back to
/// fixed world axes.
pub fn light_basis(light_dir: Vec3, view_forward: Vec3) -> Mat3 {
    let forward = light_dir.try_normalize().unwrap_or(Vec3::NEG_Z);
    let mut up = view_forward - forward * view_forward.dot(forward);
    if up.length_squared() < 1e-6 {
        up = Vec3::Z - forward * forward.z;
    }
    if up.length_squared() < 1e-6 {
        up = Vec3::X - forward * forward.x;
    }
    let up = up.normalize();
    let back = -forward;
    let right = up.cross(back);
    Mat3::from_cols(right, up, back)
}

/// One directional split's matrices plus how the crop resolved
#[derive(Clone, Copy, Debug)]
pub struct DirectionalSplit {
    pub matrices: ShadowPassMatrices,
    /// The scene-dependent crop fell back to the split frustum bounds
    pub crop_fell_back: bool,
}

/// Matrices for one directional split: light-space view from the stable
/// basis, orthographic projection cropped to the overlap of the split
/// frustum with this light's casters and receivers (world-space AABBs).
///
/// Returns `None` when the split frustum is degenerate (no corner
/// points); the caller skips the sub-pass.
pub fn directional_matrices(
    light: &Light,
    view_forward: Vec3,
    split: &FrustumPlanes,
    casters: &[AABB],
    receivers: &[AABB],
) -> Option<DirectionalSplit> {
    let corners = split.corners()?;
    let view = light_basis(light.direction, view_forward).transpose().to_mat4();

    let mut light_space = [Vec3::ZERO; 8];
    for (point, corner) in light_space.iter_mut().zip(corners.iter()) {
        *point = view.transform_point(*corner);
    }

    let mut crop = CropBounds::new(AABB::from_points(&light_space));
    for bounds in casters {
        crop.add_caster(&bounds.transform(&view));
    }
    for bounds in receivers {
        crop.add_receiver(&bounds.transform(&view));
    }

    let resolved = crop.resolve();
    Some(DirectionalSplit {
        matrices: ShadowPassMatrices {
            view,
            projection: crop_matrix(&resolved.bounds),
        },
        crop_fell_back: resolved.fell_back,
    })
}
