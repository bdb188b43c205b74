//! Per-frame view state
//!
//! [`ViewParams`] snapshots the camera for one rendered view; the pass
//! pipeline reads it but never writes it. [`RenderContext`] bundles the
//! view with the frame's flat arrays (lights, entities, surfaces,
//! materials) so every stage takes one explicit borrow instead of
//! reaching into globals.

use ember_math::{FrustumPlanes, Mat4, Vec3};

use crate::entity::Entity;
use crate::light::Light;
use crate::material::Material;
use crate::surface::Surface;

/// Render-target pixel rectangle (origin bottom-left)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Scissor covering the whole viewport
    pub fn full_scissor(&self) -> ScissorRect {
        ScissorRect {
            x1: self.x,
            y1: self.y,
            x2: self.x + self.width as i32 - 1,
            y2: self.y + self.height as i32 - 1,
        }
    }
}

/// Inclusive pixel rectangle; `x1 > x2` (or `y1 > y2`) means empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScissorRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl ScissorRect {
    /// Inverted rectangle that unions as identity
    pub const EMPTY: Self = Self {
        x1: i32::MAX,
        y1: i32::MAX,
        x2: i32::MIN,
        y2: i32::MIN,
    };

    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_empty(&self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2
    }

    pub fn width(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.x2 - self.x1 + 1) as u32
        }
    }

    pub fn height(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.y2 - self.y1 + 1) as u32
        }
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }
}

/// Depth range written by the rasterizer, in window coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthRange {
    pub near: f32,
    pub far: f32,
}

impl DepthRange {
    pub const FULL: Self = Self {
        near: 0.0,
        far: 1.0,
    };

    /// Compressed range for depth-hacked entities, keeping first-person
    /// geometry from clipping into the world
    pub const HACK: Self = Self {
        near: 0.0,
        far: 0.5,
    };
}

/// Camera state for one rendered view, immutable during the frame
#[derive(Clone, Debug)]
pub struct ViewParams {
    /// World -> eye
    pub view: Mat4,
    /// Eye -> clip
    pub projection: Mat4,
    /// Camera origin in world space
    pub origin: Vec3,
    /// Normalized world-space view direction
    pub forward: Vec3,
    /// Distances to the near and far clip planes
    pub near: f32,
    pub far: f32,
    pub viewport: Viewport,
    /// View-wide scissor; per-light scissors are clipped against it
    pub scissor: ScissorRect,
    /// World-space planes of the full camera frustum
    pub frustum: FrustumPlanes,
}

impl ViewParams {
    pub fn new(
        view: Mat4,
        projection: Mat4,
        origin: Vec3,
        forward: Vec3,
        near: f32,
        far: f32,
        viewport: Viewport,
    ) -> Self {
        let frustum = FrustumPlanes::from_view_projection(&(projection * view));
        Self {
            view,
            projection,
            origin,
            forward,
            near,
            far,
            viewport,
            scissor: viewport.full_scissor(),
            frustum,
        }
    }
}

/// Everything one frame's pass pipeline reads, borrowed from the caller
pub struct RenderContext<'a> {
    pub view: &'a ViewParams,
    pub lights: &'a [Light],
    pub entities: &'a [Entity],
    pub surfaces: &'a [Surface],
    pub materials: &'a [Material],
}

impl<'a> RenderContext<'a> {
    pub fn new(
        view: &'a ViewParams,
        lights: &'a [Light],
        entities: &'a [Entity],
        surfaces: &'a [Surface],
        materials: &'a [Material],
    ) -> Self {
        Self {
            view,
            lights,
            entities,
            surfaces,
            materials,
        }
    }
}
