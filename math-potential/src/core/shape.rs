//! Shape functions on the reference triangle
//!
//! Reference triangle with vertices (0,0) -> local node 0, (1,0) -> node 1,
//! (0,1) -> node 2.

use serde::{Deserialize, Serialize};

use crate::core::types::{Real, RefPoint};

/// Local basis evaluated at reference-triangle points
pub trait ShapeEvaluator<T: Real>: Send + Sync {
    /// Number of basis functions per element
    fn num_shape_functions(&self) -> usize;

    /// Write the value of every basis function at `ref_point` into `values`
    ///
    /// `values.len()` equals [`num_shape_functions`](Self::num_shape_functions).
    fn evaluate(&self, ref_point: &RefPoint<T>, values: &mut [T]);
}

/// Piecewise constant basis (one function, value 1)
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantShape;

impl<T: Real> ShapeEvaluator<T> for ConstantShape {
    fn num_shape_functions(&self) -> usize {
        1
    }

    #[inline]
    fn evaluate(&self, _ref_point: &RefPoint<T>, values: &mut [T]) {
        values[0] = T::one();
    }
}

/// Piecewise linear basis (area coordinates)
///
/// N0 = 1 - ξ - η, N1 = ξ, N2 = η
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearShape;

impl<T: Real> ShapeEvaluator<T> for LinearShape {
    fn num_shape_functions(&self) -> usize {
        3
    }

    #[inline]
    fn evaluate(&self, ref_point: &RefPoint<T>, values: &mut [T]) {
        let [xi, eta] = *ref_point;
        values[0] = T::one() - xi - eta;
        values[1] = xi;
        values[2] = eta;
    }
}

/// Shape-function family selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeFamily {
    /// Piecewise constant
    #[default]
    P0,
    /// Piecewise linear
    P1,
}

impl ShapeFamily {
    /// Number of basis functions per element
    pub fn num_shape_functions(self) -> usize {
        match self {
            ShapeFamily::P0 => 1,
            ShapeFamily::P1 => 3,
        }
    }

    /// Evaluator for this family
    pub fn evaluator<T: Real>(self) -> Box<dyn ShapeEvaluator<T>> {
        match self {
            ShapeFamily::P0 => Box::new(ConstantShape),
            ShapeFamily::P1 => Box::new(LinearShape),
        }
    }
}
