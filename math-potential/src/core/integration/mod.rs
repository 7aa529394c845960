//! Numerical integration over triangular elements
//!
//! ## Module Organization
//!
//! - [`gauss`] - Tabulated triangle quadrature rules
//! - [`element`] - Quadrature accumulation of one (evaluation point, element) pair

pub mod element;
pub mod gauss;

pub use element::integrate_element;
pub use gauss::{QuadratureRule, num_quadrature_points, triangle_rule};
