//! Scene-dependent shadow-map cropping
//!
//! A directional shadow map only needs to cover the region where three
//! volumes overlap in light space: the camera sub-frustum, the shadow
//! casters, and the lit receivers. Cropping the orthographic projection
//! to that overlap concentrates texel density where shadows are actually
//! visible.
//!
//! Light space here follows the view convention: the light looks along
//! -Z, so larger Z is toward the light. The near side extends past the
//! frustum to admit casters between the light and the visible slab; the
//! far side stops at the last surface a shadow could still land on, and
//! never reaches past the sub-frustum itself.

use ember_math::{Mat4, Vec3, AABB};

/// Accumulates light-space bounds for one shadow sub-pass
#[derive(Clone, Debug)]
pub struct CropBounds {
    frustum: AABB,
    casters: AABB,
    receivers: AABB,
}

impl CropBounds {
    /// `frustum` is the light-space AABB of the camera sub-frustum corners.
    pub fn new(frustum: AABB) -> Self {
        Self {
            frustum,
            casters: AABB::EMPTY,
            receivers: AABB::EMPTY,
        }
    }

    pub fn add_caster(&mut self, bounds: &AABB) {
        self.casters = self.casters.union(bounds);
    }

    pub fn add_receiver(&mut self, bounds: &AABB) {
        self.receivers = self.receivers.union(bounds);
    }

    pub fn has_casters(&self) -> bool {
        !self.casters.is_empty()
    }

    /// Resolve the final crop box.
    ///
    /// X/Y take the three-way intersection. Z keeps every caster between
    /// the light and the frustum (max of frustum/caster maxes) and stops
    /// at the nearest of the frustum's far side, the last caster, and the
    /// last receiver (max of mins). Zero casters, zero receivers, or an
    /// inverted intersection fall back to the frustum bounds so the split
    /// never goes black; `fell_back` reports that for the frame
    /// statistics.
    pub fn resolve(&self) -> CropResolution {
        if self.casters.is_empty() || self.receivers.is_empty() {
            return CropResolution {
                bounds: self.frustum,
                fell_back: true,
            };
        }

        let crop = AABB::new(
            Vec3::new(
                self.frustum.min.x.max(self.casters.min.x).max(self.receivers.min.x),
                self.frustum.min.y.max(self.casters.min.y).max(self.receivers.min.y),
                self.frustum.min.z.max(self.casters.min.z).max(self.receivers.min.z),
            ),
            Vec3::new(
                self.frustum.max.x.min(self.casters.max.x).min(self.receivers.max.x),
                self.frustum.max.y.min(self.casters.max.y).min(self.receivers.max.y),
                self.frustum.max.z.max(self.casters.max.z),
            ),
        );

        if !crop.is_valid() {
            log::debug!("shadow crop inverted, falling back to frustum bounds");
            return CropResolution {
                bounds: self.frustum,
                fell_back: true,
            };
        }
        CropResolution {
            bounds: crop,
            fell_back: false,
        }
    }
}

/// Outcome of [`CropBounds::resolve`]
#[derive(Clone, Copy, Debug)]
pub struct CropResolution {
    pub bounds: AABB,
    /// The scene-dependent crop was unusable and the frustum bounds won
    pub fell_back: bool,
}

/// Orthographic projection fitting a light-space crop box, mapping it to
/// the [-1, 1] clip cube with the near plane on the box's +Z face.
pub fn crop_matrix(bounds: &AABB) -> Mat4 {
    Mat4::orthographic(
        bounds.min.x,
        bounds.max.x,
        bounds.min.y,
        bounds.max.y,
        -bounds.max.z,
        -bounds.min.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frustum_box() -> AABB {
        AABB::new(Vec3::new(-10.0, -10.0, -50.0), Vec3::new(10.0, 10.0, -5.0))
    }

    #[test]
    fn test_crop_intersects_on_xy() {
        let mut crop = CropBounds::new(frustum_box());
        crop.add_caster(&AABB::new(Vec3::new(-4.0, -20.0, -30.0), Vec3::new(4.0, 20.0, -20.0)));
        crop.add_receiver(&AABB::new(Vec3::new(-20.0, -6.0, -40.0), Vec3::new(20.0, 6.0, -10.0)));

        let resolved = crop.resolve();
        assert!(!resolved.fell_back);
        assert_eq!(resolved.bounds.min.x, -4.0);
        assert_eq!(resolved.bounds.max.x, 4.0);
        assert_eq!(resolved.bounds.min.y, -6.0);
        assert_eq!(resolved.bounds.max.y, 6.0);
    }

    #[test]
    fn test_near_side_extends_toward_light() {
        // Caster floats between the light and the visible slab (z = -2,
        // in front of the frustum's max z of -5).
        let mut crop = CropBounds::new(frustum_box());
        crop.add_caster(&AABB::new(Vec3::new(-1.0, -1.0, -3.0), Vec3::new(1.0, 1.0, -2.0)));
        crop.add_receiver(&frustum_box());

        let resolved = crop.resolve();
        assert_eq!(resolved.bounds.max.z, -2.0);
    }

    #[test]
    fn test_far_side_stops_at_last_receiver() {
        let mut crop = CropBounds::new(frustum_box());
        // Casters extend far beyond the last receiver.
        crop.add_caster(&AABB::new(Vec3::new(-1.0, -1.0, -100.0), Vec3::new(1.0, 1.0, -10.0)));
        crop.add_receiver(&AABB::new(Vec3::new(-5.0, -5.0, -30.0), Vec3::new(5.0, 5.0, -10.0)));

        let resolved = crop.resolve();
        assert_eq!(resolved.bounds.min.z, -30.0);
    }

    #[test]
    fn test_far_side_never_exceeds_split_frustum() {
        // Ground-plane-like geometry runs far past the split's slab; the
        // crop still ends at the sub-frustum so each split keeps its own
        // texel density.
        let mut crop = CropBounds::new(frustum_box());
        let ground = AABB::new(Vec3::new(-200.0, -200.0, -500.0), Vec3::new(200.0, 200.0, -1.0));
        crop.add_caster(&ground);
        crop.add_receiver(&ground);

        let resolved = crop.resolve();
        assert!(!resolved.fell_back);
        assert_eq!(resolved.bounds.min.z, frustum_box().min.z);
        assert_eq!(resolved.bounds.min.x, frustum_box().min.x);
        assert_eq!(resolved.bounds.max.x, frustum_box().max.x);
    }

    #[test]
    fn test_no_casters_falls_back_to_frustum() {
        let mut crop = CropBounds::new(frustum_box());
        crop.add_receiver(&AABB::new(Vec3::new(-5.0, -5.0, -30.0), Vec3::new(5.0, 5.0, -10.0)));

        assert!(!crop.has_casters());
        let resolved = crop.resolve();
        assert!(resolved.fell_back);
        assert_eq!(resolved.bounds.min.x, frustum_box().min.x);
        assert_eq!(resolved.bounds.max.z, frustum_box().max.z);
    }

    #[test]
    fn test_disjoint_xy_falls_back_to_frustum() {
        let mut crop = CropBounds::new(frustum_box());
        crop.add_caster(&AABB::new(Vec3::new(-9.0, -9.0, -30.0), Vec3::new(-8.0, -8.0, -20.0)));
        crop.add_receiver(&AABB::new(Vec3::new(8.0, 8.0, -30.0), Vec3::new(9.0, 9.0, -20.0)));

        let resolved = crop.resolve();
        assert!(resolved.fell_back);
        assert_eq!(resolved.bounds.min.x, frustum_box().min.x);
        assert_eq!(resolved.bounds.max.x, frustum_box().max.x);
    }

    #[test]
    fn test_crop_matrix_maps_box_to_clip_cube() {
        let bounds = AABB::new(Vec3::new(-4.0, -6.0, -30.0), Vec3::new(4.0, 6.0, -2.0));
        let matrix = crop_matrix(&bounds);

        let near_corner = matrix.transform_point(Vec3::new(-4.0, -6.0, -2.0));
        assert!((near_corner - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-5);

        let far_corner = matrix.transform_point(Vec3::new(4.0, 6.0, -30.0));
        assert!((far_corner - Vec3::new(1.0, 1.0, 1.0)).length() < 1e-5);
    }
}
