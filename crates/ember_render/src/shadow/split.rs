//! Parallel-split partitioning for directional shadows
//!
//! Splits the camera's depth range into consecutive slabs and derives one
//! sub-frustum per slab. Split distances blend the logarithmic scheme
//! (even perspective error, but wasteful far planes) with the linear one
//! (even world-space size) under a `lambda` weight; 0 is fully linear,
//! 1 fully logarithmic.

use alloc::vec::Vec;

use ember_math::{FrustumPlanes, Plane};

use crate::view::ViewParams;

/// One slab of the partitioned camera frustum
#[derive(Clone, Debug)]
pub struct SplitFrustum {
    pub index: u32,
    /// View-space distance to the slab's near boundary
    pub near: f32,
    /// View-space distance to the slab's far boundary
    pub far: f32,
    pub frustum: FrustumPlanes,
}

/// Boundary distances for `count` splits: `count + 1` values from `near`
/// to `far`, monotonically increasing.
pub fn split_distances(near: f32, far: f32, count: u32, lambda: f32) -> Vec<f32> {
    let count = count.max(1);
    let mut distances = Vec::with_capacity(count as usize + 1);
    for i in 0..=count {
        let t = i as f32 / count as f32;
        let logarithmic = near * (far / near).powf(t);
        let linear = near + (far - near) * t;
        distances.push(lambda * logarithmic + (1.0 - lambda) * linear);
    }
    distances
}

/// Camera sub-frustum between two view-space distances: the camera's
/// side planes with near/far replaced by planes perpendicular to the view
/// direction at those distances.
pub fn sub_frustum(view: &ViewParams, near_dist: f32, far_dist: f32) -> FrustumPlanes {
    let near_plane = Plane::from_point_normal(view.origin + view.forward * near_dist, view.forward);
    let far_plane = Plane::from_point_normal(view.origin + view.forward * far_dist, -view.forward);
    view.frustum.with_near_far(near_plane, far_plane)
}

/// The full per-split partition for one view
pub fn split_frusta(view: &ViewParams, count: u32, lambda: f32) -> Vec<SplitFrustum> {
    let distances = split_distances(view.near, view.far, count, lambda);
    distances
        .windows(2)
        .enumerate()
        .map(|(index, pair)| SplitFrustum {
            index: index as u32,
            near: pair[0],
            far: pair[1],
            frustum: sub_frustum(view, pair[0], pair[1]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Viewport;
    use ember_math::{Mat4, Vec3};

    fn test_view() -> ViewParams {
        ViewParams::new(
            Mat4::look_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y),
            Mat4::perspective(ember_math::consts::HALF_PI, 1.0, 1.0, 100.0),
            Vec3::ZERO,
            Vec3::NEG_Z,
            1.0,
            100.0,
            Viewport::new(0, 0, 800, 600),
        )
    }

    #[test]
    fn test_distances_span_near_to_far() {
        let d = split_distances(1.0, 100.0, 4, 0.5);
        assert_eq!(d.len(), 5);
        assert!((d[0] - 1.0).abs() < 1e-5);
        assert!((d[4] - 100.0).abs() < 1e-3);
        for pair in d.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_lambda_zero_is_linear() {
        let d = split_distances(1.0, 101.0, 4, 0.0);
        assert!((d[1] - 26.0).abs() < 1e-4);
        assert!((d[2] - 51.0).abs() < 1e-4);
        assert!((d[3] - 76.0).abs() < 1e-4);
    }

    #[test]
    fn test_lambda_one_is_logarithmic() {
        let d = split_distances(1.0, 16.0, 4, 1.0);
        // 1 * 16^(i/4): 1, 2, 4, 8, 16
        assert!((d[1] - 2.0).abs() < 1e-4);
        assert!((d[2] - 4.0).abs() < 1e-4);
        assert!((d[3] - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_sub_frustum_bounds_depth_slab() {
        let view = test_view();
        let slab = sub_frustum(&view, 10.0, 20.0);

        assert!(slab.contains_point(Vec3::new(0.0, 0.0, -15.0)));
        assert!(!slab.contains_point(Vec3::new(0.0, 0.0, -5.0)));
        assert!(!slab.contains_point(Vec3::new(0.0, 0.0, -25.0)));
        // Side planes still apply inside the slab.
        assert!(!slab.contains_point(Vec3::new(50.0, 0.0, -15.0)));
    }

    #[test]
    fn test_split_frusta_cover_range_contiguously() {
        let view = test_view();
        let splits = split_frusta(&view, 3, 0.5);
        assert_eq!(splits.len(), 3);
        assert!((splits[0].near - view.near).abs() < 1e-5);
        assert!((splits[2].far - view.far).abs() < 1e-3);
        for pair in splits.windows(2) {
            assert!((pair[0].far - pair[1].near).abs() < 1e-4);
        }
    }
}
