//! Core type definitions
//!
//! Scalars are generic over the real precision so the same kernel runs in
//! single or double precision. Complex values are `num_complex::Complex<T>`,
//! which is `#[repr(C)]` and therefore laid out as an interleaved
//! `(re, im)` pair, the same layout as the flat coefficient and result
//! buffers.

use num_complex::Complex;
use num_traits::{Float, FromPrimitive, NumAssign};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

// ============================================================================
// Scalars
// ============================================================================

/// Real scalar type used throughout one evaluation (`f32` or `f64`)
pub trait Real:
    Float + FromPrimitive + NumAssign + Default + Debug + Send + Sync + 'static
{
}

impl<T> Real for T where
    T: Float + FromPrimitive + NumAssign + Default + Debug + Send + Sync + 'static
{
}

/// Convert an `f64` constant into the working precision
#[inline]
pub fn cast<T: Real>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}

/// Complex zero in the working precision
#[inline]
pub fn czero<T: Real>() -> Complex<T> {
    Complex::new(T::zero(), T::zero())
}

/// Real precision selected for an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 32-bit floats
    Single,
    /// 64-bit floats
    #[default]
    Double,
}

// ============================================================================
// Geometry primitives
// ============================================================================

/// Point in physical space
pub type Point3<T> = [T; 3];

/// Direction or normal in physical space
pub type Vector3<T> = [T; 3];

/// Point `(ξ, η)` on the reference triangle (0,0), (1,0), (0,1)
pub type RefPoint<T> = [T; 2];

/// Component-wise difference `a - b`
#[inline]
pub fn sub<T: Real>(a: &[T; 3], b: &[T; 3]) -> Vector3<T> {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Dot product of two 3D vectors
#[inline]
pub fn dot<T: Real>(a: &[T; 3], b: &[T; 3]) -> T {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product of two 3D vectors
#[inline]
pub fn cross<T: Real>(a: &[T; 3], b: &[T; 3]) -> Vector3<T> {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean length of a 3D vector
#[inline]
pub fn norm<T: Real>(a: &[T; 3]) -> T {
    dot(a, a).sqrt()
}
