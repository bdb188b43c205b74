//! Materials, reduced to what the pass loop actually inspects
//!
//! Shader binding and texture stage setup live behind the backend; the
//! interaction renderer only needs the merge-relevant bits of a material.

/// Per-surface material description
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Material {
    /// Stable identity used for batch-compatibility checks
    pub id: u32,
    /// Surfaces with this material interact with lights at all
    pub receives_lighting: bool,
    /// Batches may span entities: the material samples no per-entity
    /// state, so geometry from different entities can share one draw
    pub entity_mergeable: bool,
}

impl Material {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            receives_lighting: true,
            entity_mergeable: false,
        }
    }

    pub fn with_entity_mergeable(mut self) -> Self {
        self.entity_mergeable = true;
        self
    }

    pub fn without_lighting(mut self) -> Self {
        self.receives_lighting = false;
        self
    }
}
