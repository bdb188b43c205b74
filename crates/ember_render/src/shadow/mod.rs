//! Shadow-map matrix construction
//!
//! Three light classes, three techniques: omni lights render up to six
//! cube faces, projective lights reuse their front-end frustum, and
//! directional lights render one cropped orthographic map per parallel
//! split. Everything here is pure matrix work - target binding and draw
//! submission stay in [`crate::pass`].

pub mod crop;
pub mod projection;
pub mod split;

pub use crop::{crop_matrix, CropBounds, CropResolution};
pub use projection::{
    clip_to_texture, directional_matrices, light_basis, omni_face_matrices, projective_matrices,
    DirectionalSplit, LightShadowMaps, ShadowPassMatrices,
};
pub use split::{split_distances, split_frusta, sub_frustum, SplitFrustum};
