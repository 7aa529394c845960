//! Quadrature accumulation for one (evaluation point, element) pair
//!
//! ```text
//! I = |J| Σ_q w_q (Σ_i c_i N_i(ξ_q, η_q)) K(x, y(ξ_q, η_q), 0, n)
//! ```

use num_complex::Complex;

use crate::core::integration::gauss::QuadratureRule;
use crate::core::kernel::KernelEvaluator;
use crate::core::mesh::ElementGeometry;
use crate::core::shape::ShapeEvaluator;
use crate::core::types::{Point3, Real, czero};

/// Integrate the interpolated density against the kernel over one element
///
/// # Arguments
/// * `eval_point` - Field point x
/// * `geometry` - Oriented element geometry
/// * `coefficients` - The element's coefficients, one per shape function
/// * `rule` - Reference-triangle quadrature rule
/// * `shape` - Shape-function evaluator
/// * `kernel` - Kernel evaluator
/// * `shape_values` - Scratch of length `coefficients.len()`
///
/// # Returns
/// The element's complex contribution, scaled by its integration element
pub fn integrate_element<T: Real>(
    eval_point: &Point3<T>,
    geometry: &ElementGeometry<T>,
    coefficients: &[Complex<T>],
    rule: &QuadratureRule<T>,
    shape: &dyn ShapeEvaluator<T>,
    kernel: &dyn KernelEvaluator<T>,
    shape_values: &mut [T],
) -> Complex<T> {
    let aux_direction = [T::zero(); 3];
    let mut sum = czero();

    for (ref_point, &weight) in rule.points().iter().zip(rule.weights()) {
        shape.evaluate(ref_point, shape_values);
        let source_point = geometry.global_point(ref_point);
        let kernel_value =
            kernel.evaluate(eval_point, &source_point, &aux_direction, &geometry.normal);

        let density = coefficients
            .iter()
            .zip(shape_values.iter())
            .fold(czero(), |acc: Complex<T>, (c, &n)| acc + c.scale(n));

        sum += density.scale(weight) * kernel_value;
    }

    sum.scale(geometry.integration_element)
}
