//! Light/surface interactions
//!
//! The visibility system emits one [`Interaction`] per (light, surface)
//! pair that survives culling, appended light by light into an
//! [`InteractionList`]. Interactions for one light form a contiguous run,
//! so shadow sub-passes and the lighting pass replay the same slice by
//! resetting an index instead of chasing links. Contiguity is an
//! efficiency invariant, not a correctness one: a violation costs extra
//! flushes, so the builder counts (and keeps) the stragglers.

use alloc::vec::Vec;
use core::ops::{BitOr, BitOrAssign, Range};

use ember_math::{Vec3, AABB};

use crate::view::ScissorRect;

/// Which passes an interaction participates in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionKind {
    /// Casts shadow and receives lighting
    Normal,
    /// Receives lighting only; skipped while drawing shadow depth
    LightOnly,
    /// Casts shadow only; skipped while drawing lighting
    ShadowOnly,
}

/// Bitmask over the six cube-map faces of an omni light.
///
/// Bit layout follows cube-map face order: +X, -X, +Y, -Y, +Z, -Z.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CubeSideBits(pub u8);

impl CubeSideBits {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0x3f);

    pub fn single(face: usize) -> Self {
        debug_assert!(face < 6);
        Self(1 << face)
    }

    /// Conservative mask of the faces a world-space box can project onto:
    /// one bit per axis half-space of the light origin the box reaches.
    pub fn from_bounds(light_origin: Vec3, bounds: &AABB) -> Self {
        let mut bits = 0u8;
        if bounds.max.x >= light_origin.x {
            bits |= 1 << 0;
        }
        if bounds.min.x <= light_origin.x {
            bits |= 1 << 1;
        }
        if bounds.max.y >= light_origin.y {
            bits |= 1 << 2;
        }
        if bounds.min.y <= light_origin.y {
            bits |= 1 << 3;
        }
        if bounds.max.z >= light_origin.z {
            bits |= 1 << 4;
        }
        if bounds.min.z <= light_origin.z {
            bits |= 1 << 5;
        }
        Self(bits)
    }

    #[inline]
    pub fn contains(&self, face: usize) -> bool {
        self.0 & (1 << face) != 0
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.0 != 0
    }
}

impl BitOr for CubeSideBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CubeSideBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// One visible (light, surface) pairing for the current frame
#[derive(Clone, Debug)]
pub struct Interaction {
    /// Index into the frame's light array
    pub light: u32,
    /// Index into the frame's entity array
    pub entity: u32,
    /// Index into the frame's surface array
    pub surface: u32,
    /// Index into the frame's material array
    pub material: u32,
    pub kind: InteractionKind,
    /// Screen-space bounds of the lit surface, pre-clipped to the view
    pub scissor: ScissorRect,
    /// Omni cube faces this surface is visible to
    pub cube_side_bits: CubeSideBits,
    /// Occlusion-query samples for the light's volume as seen from this
    /// surface's area (u32::MAX = not measured)
    pub query_samples: u32,
}

impl Interaction {
    pub fn new(light: u32, entity: u32, surface: u32, material: u32) -> Self {
        Self {
            light,
            entity,
            surface,
            material,
            kind: InteractionKind::Normal,
            scissor: ScissorRect::EMPTY,
            cube_side_bits: CubeSideBits::ALL,
            query_samples: u32::MAX,
        }
    }

    pub fn with_kind(mut self, kind: InteractionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_scissor(mut self, scissor: ScissorRect) -> Self {
        self.scissor = scissor;
        self
    }

    pub fn with_cube_sides(mut self, bits: CubeSideBits) -> Self {
        self.cube_side_bits = bits;
        self
    }

    pub fn with_query_samples(mut self, samples: u32) -> Self {
        self.query_samples = samples;
        self
    }
}

/// Contiguous slice of the interaction array belonging to one light
#[derive(Clone, Copy, Debug)]
pub struct LightRun {
    pub light: u32,
    pub start: u32,
    pub len: u32,
}

impl LightRun {
    pub fn range(&self) -> Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

/// The frame's interactions plus the per-light run table
#[derive(Debug, Default)]
pub struct InteractionList {
    interactions: Vec<Interaction>,
    runs: Vec<LightRun>,
    sort_violations: u32,
}

impl InteractionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            interactions: Vec::with_capacity(capacity),
            runs: Vec::new(),
            sort_violations: 0,
        }
    }

    /// Append an interaction, extending the current run or opening a new
    /// one. Revisiting an earlier light starts a fresh run and counts a
    /// sort violation.
    pub fn push(&mut self, interaction: Interaction) {
        let light = interaction.light;
        match self.runs.last_mut() {
            Some(run) if run.light == light => run.len += 1,
            _ => {
                if self.runs.iter().any(|run| run.light == light) {
                    self.sort_violations += 1;
                    if self.sort_violations == 1 {
                        log::warn!(
                            "interaction list not sorted by light (light {} revisited)",
                            light
                        );
                    }
                }
                self.runs.push(LightRun {
                    light,
                    start: self.interactions.len() as u32,
                    len: 1,
                });
            }
        }
        self.interactions.push(interaction);
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn runs(&self) -> &[LightRun] {
        &self.runs
    }

    pub fn sort_violations(&self) -> u32 {
        self.sort_violations
    }

    /// The interactions of one run, replayable any number of times
    pub fn for_light(&self, run: &LightRun) -> &[Interaction] {
        &self.interactions[run.range()]
    }

    /// OR of `cube_side_bits` over a run; faces outside the mask carry no
    /// visible surface and their shadow sub-pass is skipped outright.
    pub fn face_mask(&self, run: &LightRun) -> CubeSideBits {
        let mut mask = CubeSideBits::NONE;
        for interaction in self.for_light(run) {
            mask |= interaction.cube_side_bits;
        }
        mask
    }

    /// Union of a run's scissors: the screen area the light touches
    pub fn light_scissor(&self, run: &LightRun) -> ScissorRect {
        let mut scissor = ScissorRect::EMPTY;
        for interaction in self.for_light(run) {
            scissor = scissor.union(&interaction.scissor);
        }
        scissor
    }
}
