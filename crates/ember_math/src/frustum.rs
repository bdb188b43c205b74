//! Planes and view-frustum queries
//!
//! A frustum is six inward-facing planes. Besides the usual containment
//! tests, this module recovers the frustum's 8 corner points by
//! intersecting adjacent plane triples - the shadow cascade fit needs
//! corners for sub-frusta that exist only as plane sets.

use crate::bounds::AABB;
use crate::matrix::Mat4;
use crate::vector::Vec3;

/// Plane in 3D space (ax + by + cz + d = 0)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Plane normal (unit vector)
    pub normal: Vec3,
    /// Distance from origin along normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    ///
    /// The normal will be normalized automatically.
    #[inline]
    pub fn new(normal: Vec3, distance: f32) -> Self {
        let len = normal.length();
        if len > 1e-10 {
            Self {
                normal: normal / len,
                distance: distance / len,
            }
        } else {
            Self {
                normal: Vec3::Y,
                distance: 0.0,
            }
        }
    }

    /// Create a plane from a point on the plane and its normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: -normal.dot(point),
        }
    }

    /// Signed distance from a point to the plane
    ///
    /// Positive = in front (same side as normal), negative = behind.
    #[inline]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Intersection point of three planes, `None` when any pair is
    /// (near-)parallel and the system has no single solution.
    pub fn intersect_three(p0: &Plane, p1: &Plane, p2: &Plane) -> Option<Vec3> {
        let n01 = p0.normal.cross(p1.normal);
        let det = n01.dot(p2.normal);
        if det.abs() < 1e-8 {
            return None;
        }

        let n12 = p1.normal.cross(p2.normal);
        let n20 = p2.normal.cross(p0.normal);
        let point =
            (n12 * -p0.distance + n20 * -p1.distance + n01 * -p2.distance) / det;
        Some(point)
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::Y,
            distance: 0.0,
        }
    }
}

/// Result of frustum containment test
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrustumTestResult {
    /// Object is completely inside the frustum
    Inside,
    /// Object is completely outside the frustum
    Outside,
    /// Object intersects the frustum boundary
    Intersecting,
}

impl FrustumTestResult {
    /// Check if the object is at least partially visible
    #[inline]
    pub fn is_visible(&self) -> bool {
        *self != FrustumTestResult::Outside
    }
}

/// View frustum as six inward-facing planes
///
/// Plane order is left, right, bottom, top, near, far.
#[derive(Clone, Debug)]
pub struct FrustumPlanes {
    pub planes: [Plane; 6],
}

impl FrustumPlanes {
    /// Plane indices
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const BOTTOM: usize = 2;
    pub const TOP: usize = 3;
    pub const NEAR: usize = 4;
    pub const FAR: usize = 5;

    /// Extract frustum planes from a view-projection matrix
    /// (Gribb/Hartmann method)
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let plane = |row: crate::Vec4| Plane::new(row.truncate(), row.w);

        Self {
            planes: [
                plane(r3 + r0), // left
                plane(r3 - r0), // right
                plane(r3 + r1), // bottom
                plane(r3 - r1), // top
                plane(r3 + r2), // near
                plane(r3 - r2), // far
            ],
        }
    }

    /// Copy with the near/far planes replaced - how a depth sub-range of a
    /// camera frustum is expressed for cascaded shadows
    pub fn with_near_far(&self, near: Plane, far: Plane) -> Self {
        let mut planes = self.planes;
        planes[Self::NEAR] = near;
        planes[Self::FAR] = far;
        Self { planes }
    }

    /// The 8 corner points, by adjacent plane-triple intersection.
    ///
    /// Corner index bits: 0 = left/right, 1 = bottom/top, 2 = near/far.
    /// Returns `None` for degenerate plane sets.
    pub fn corners(&self) -> Option<[Vec3; 8]> {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let lr = &self.planes[i & 1];
            let bt = &self.planes[Self::BOTTOM + ((i >> 1) & 1)];
            let nf = &self.planes[Self::NEAR + ((i >> 2) & 1)];
            *corner = Plane::intersect_three(lr, bt, nf)?;
        }
        Some(corners)
    }

    /// Test if an AABB is inside, outside, or intersecting the frustum
    /// (p-vertex/n-vertex test)
    pub fn contains_aabb(&self, aabb: &AABB) -> FrustumTestResult {
        let mut result = FrustumTestResult::Inside;

        for plane in &self.planes {
            // Corner most aligned with the plane normal
            let p = Vec3::new(
                if plane.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );

            if plane.distance_to_point(p) < 0.0 {
                return FrustumTestResult::Outside;
            }

            // Corner least aligned with the plane normal
            let n = Vec3::new(
                if plane.normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
                if plane.normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
                if plane.normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
            );

            if plane.distance_to_point(n) < 0.0 {
                result = FrustumTestResult::Intersecting;
            }
        }

        result
    }

    /// Test if a point is inside the frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }
}

impl Default for FrustumPlanes {
    fn default() -> Self {
        Self {
            planes: [Plane::default(); 6],
        }
    }
}
