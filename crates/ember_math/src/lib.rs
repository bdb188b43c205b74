//! # ember_math - Geometry Primitives
//!
//! Math foundation for the Ember forward renderer: vectors, column-major
//! matrices, axis-aligned bounds, planes, and frustum queries. The types
//! here are the currency of the lighting core — light-space transforms,
//! shadow crop bounds, and frustum/AABB containment all live on top of
//! this crate.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod vector;
pub mod matrix;
pub mod bounds;
pub mod frustum;

pub use vector::*;
pub use matrix::*;
pub use bounds::*;
pub use frustum::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const TAU: f32 = core::f32::consts::TAU;
    pub const HALF_PI: f32 = core::f32::consts::FRAC_PI_2;
    pub const EPSILON: f32 = 1e-6;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

/// Convert radians to degrees
#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * consts::RAD_TO_DEG
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp a value to a range
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}
