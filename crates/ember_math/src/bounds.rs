//! Axis-aligned bounds
//!
//! The shadow crop algorithm lives on these: caster and receiver surfaces
//! accumulate into light-space AABBs and the final crop volume is a
//! per-axis intersection of those with the frustum bounds.

use crate::matrix::Mat4;
use crate::vector::Vec3;

/// Axis-Aligned Bounding Box
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// Empty (inverted) AABB; expanding it with the first point makes it valid
    pub const EMPTY: Self = Self {
        min: Vec3::new(f32::MAX, f32::MAX, f32::MAX),
        max: Vec3::new(f32::MIN, f32::MIN, f32::MIN),
    };

    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::EMPTY;
        for &point in points {
            aabb = aabb.expand_to_include(point);
        }
        aabb
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Valid means min <= max on every axis
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.is_valid()
    }

    pub fn expand_to_include(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Union of two AABBs
    #[inline]
    pub fn union(&self, other: &AABB) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Per-axis intersection: max of mins, min of maxes.
    ///
    /// The result may be inverted (empty) when the boxes are disjoint on
    /// some axis; callers that cannot tolerate that must check
    /// [`is_valid`](Self::is_valid) on the result.
    #[inline]
    pub fn intersection(&self, other: &AABB) -> Self {
        Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Check if a point is inside (boundary inclusive)
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Get the 8 corners of the AABB
    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Transform by a matrix; the result is the axis-aligned bounds of the
    /// transformed corners
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let mut result = Self::EMPTY;
        for corner in self.corners() {
            result = result.expand_to_include(matrix.transform_point(corner));
        }
        result
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_expands_to_point() {
        let aabb = AABB::EMPTY.expand_to_include(Vec3::new(1.0, 2.0, 3.0));
        assert!(aabb.is_valid());
        assert_eq!(aabb.min, aabb.max);
    }

    #[test]
    fn test_from_points() {
        let aabb = AABB::from_points(&[
            Vec3::new(-1.0, 5.0, 0.0),
            Vec3::new(2.0, -3.0, 1.0),
            Vec3::new(0.0, 0.0, -4.0),
        ]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -3.0, -4.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 5.0, 1.0));
    }

    #[test]
    fn test_intersection_overlapping() {
        let a = AABB::new(Vec3::new(-2.0, -2.0, -2.0), Vec3::new(2.0, 2.0, 2.0));
        let b = AABB::new(Vec3::new(0.0, -1.0, -5.0), Vec3::new(5.0, 1.0, 1.0));
        let i = a.intersection(&b);
        assert!(i.is_valid());
        assert_eq!(i.min, Vec3::new(0.0, -1.0, -2.0));
        assert_eq!(i.max, Vec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn test_intersection_disjoint_is_inverted() {
        let a = AABB::new(Vec3::ZERO, Vec3::ONE);
        let b = AABB::new(Vec3::splat(5.0), Vec3::splat(6.0));
        let i = a.intersection(&b);
        assert!(i.is_empty());
    }

    #[test]
    fn test_transform_rotation() {
        let aabb = AABB::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let m = crate::Mat3::from_axis_angle(Vec3::Z, crate::consts::HALF_PI).to_mat4();
        let t = aabb.transform(&m);
        // 90 degrees about Z swaps the x/y extents
        assert!((t.min - Vec3::new(-2.0, -1.0, -3.0)).length() < 1e-5);
        assert!((t.max - Vec3::new(2.0, 1.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_contains_point_boundary() {
        let aabb = AABB::new(Vec3::ZERO, Vec3::ONE);
        assert!(aabb.contains_point(Vec3::ZERO));
        assert!(aabb.contains_point(Vec3::ONE));
        assert!(!aabb.contains_point(Vec3::new(1.0001, 0.5, 0.5)));
    }
}
