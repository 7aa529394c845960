//! Numerical constants

use std::f64::consts::PI;

/// 4π
pub const PI4: f64 = 4.0 * PI;

/// Number of spatial dimensions
pub const NDIM: usize = 3;

/// Source-target distance below which kernels return zero
pub const EPSY: f64 = 1.0e-14;

/// Default lane-group size along the element axis
pub const DEFAULT_GROUP_SIZE: usize = 16;

/// Default triangle quadrature order (7-point rule)
pub const DEFAULT_QUADRATURE_ORDER: usize = 3;
