//! Drawable surfaces and the CPU-side geometry batch
//!
//! A surface is one drawable chunk of a model: a geometry payload plus a
//! world-space bounding box. The payload is a tagged union; submitting a
//! surface dispatches on the tag and appends triangles to the open
//! [`GeometryBatch`]. Resident GPU meshes cannot be appended on the CPU, so
//! the batch carries their handles alongside the staged triangles and the
//! backend draws both with the same bound state.

use alloc::vec::Vec;

use ember_math::{Vec3, AABB};

/// One staged vertex; backends upload this layout as-is or repack it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::Z,
            uv: [0.0, 0.0],
        }
    }
}

/// Geometry payload variants
#[derive(Clone, Debug)]
pub enum SurfaceKind {
    /// Convex planar polygon (brush face); fan-triangulated on submit
    Face { points: Vec<Vec3> },
    /// Tessellated patch lattice, `width * height` vertices, row-major
    Grid {
        width: u32,
        height: u32,
        vertices: Vec<MeshVertex>,
    },
    /// Arbitrary indexed triangle soup
    Triangles {
        vertices: Vec<MeshVertex>,
        indices: Vec<u32>,
    },
    /// Mesh already resident on the GPU, referenced by handle
    VboMesh { handle: u32, index_count: u32 },
    /// CPU-skinned mesh; positions are already in model space this frame
    SkeletalMesh {
        vertices: Vec<MeshVertex>,
        indices: Vec<u32>,
    },
}

/// A drawable surface for the current frame
#[derive(Clone, Debug)]
pub struct Surface {
    pub kind: SurfaceKind,
    /// World-space bounds, used for shadow cropping and scissor estimation
    pub bounds: AABB,
}

impl Surface {
    pub fn new(kind: SurfaceKind, bounds: AABB) -> Self {
        Self { kind, bounds }
    }

    /// Append this surface's geometry to the open batch.
    pub fn submit(&self, batch: &mut GeometryBatch) {
        match &self.kind {
            SurfaceKind::Face { points } => batch.push_fan(points),
            SurfaceKind::Grid {
                width,
                height,
                vertices,
            } => batch.push_grid(*width, *height, vertices),
            SurfaceKind::Triangles { vertices, indices }
            | SurfaceKind::SkeletalMesh { vertices, indices } => {
                batch.push_triangles(vertices, indices)
            }
            SurfaceKind::VboMesh { handle, .. } => batch.push_resident(*handle),
        }
    }

    /// Triangles this surface contributes, for draw statistics.
    pub fn triangle_count(&self) -> u32 {
        match &self.kind {
            SurfaceKind::Face { points } => (points.len().max(2) as u32) - 2,
            SurfaceKind::Grid { width, height, .. } => {
                if *width < 2 || *height < 2 {
                    0
                } else {
                    (width - 1) * (height - 1) * 2
                }
            }
            SurfaceKind::Triangles { indices, .. }
            | SurfaceKind::SkeletalMesh { indices, .. } => indices.len() as u32 / 3,
            SurfaceKind::VboMesh { index_count, .. } => index_count / 3,
        }
    }
}

/// CPU staging for one draw: everything submitted since the last flush.
#[derive(Debug, Default)]
pub struct GeometryBatch {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// Resident-mesh handles drawn with the same bound state
    pub resident_meshes: Vec<u32>,
}

impl GeometryBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.resident_meshes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.resident_meshes.is_empty()
    }

    pub fn triangle_count(&self) -> u32 {
        self.indices.len() as u32 / 3
    }

    fn push_fan(&mut self, points: &[Vec3]) {
        if points.len() < 3 {
            return;
        }
        let base = self.vertices.len() as u32;
        let edge_a = points[1] - points[0];
        let edge_b = points[2] - points[0];
        let normal = edge_a.cross(edge_b).try_normalize().unwrap_or(Vec3::Z);
        for point in points {
            self.vertices.push(MeshVertex {
                position: *point,
                normal,
                uv: [0.0, 0.0],
            });
        }
        for i in 1..points.len() as u32 - 1 {
            self.indices.push(base);
            self.indices.push(base + i);
            self.indices.push(base + i + 1);
        }
    }

    fn push_grid(&mut self, width: u32, height: u32, vertices: &[MeshVertex]) {
        if width < 2 || height < 2 || vertices.len() != (width * height) as usize {
            return;
        }
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        for row in 0..height - 1 {
            for col in 0..width - 1 {
                let v0 = base + row * width + col;
                let v1 = v0 + 1;
                let v2 = v0 + width + 1;
                let v3 = v0 + width;
                self.indices.extend_from_slice(&[v0, v1, v2, v0, v2, v3]);
            }
        }
    }

    fn push_triangles(&mut self, vertices: &[MeshVertex], indices: &[u32]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend(indices.iter().map(|i| base + i));
    }

    fn push_resident(&mut self, handle: u32) {
        self.resident_meshes.push(handle);
    }
}
