//! Lane grid launch and two-level reduction
//!
//! The launch covers a 2D grid: axis 0 runs over evaluation points, axis 1
//! over element slots. Element slots are partitioned into groups of
//! `group_size` lanes. For every (point, group):
//!
//! 1. each lane integrates one (point, element) pair into its own scratch slot
//! 2. the lanes join
//! 3. a single reducer sums the scratch linearly and adds the total to
//!    `result[point * n_groups + group]`
//!
//! The result buffer holds one interleaved `(re, im)` accumulator per
//! (point, group), so no two groups ever write the same location. The launch
//! accumulates (`+=`); zeroing the buffer and summing across groups is left to
//! the caller (see [`PotentialOperator`](super::PotentialOperator)).

use num_complex::Complex;

use crate::core::coefficients::{CoefficientLoader, CoefficientMode};
use crate::core::error::{PotentialError, Result};
use crate::core::integration::{QuadratureRule, integrate_element};
use crate::core::kernel::KernelEvaluator;
use crate::core::mesh::{ElementGeometry, TriangleMesh};
use crate::core::parallel::{parallel_for_each_chunk_mut, parallel_map_indexed};
use crate::core::shape::ShapeEvaluator;
use crate::core::types::{Point3, Real, czero};

use crate::core::constants::{DEFAULT_GROUP_SIZE, NDIM};

/// Shape-function count whose lane scratch lives on the stack (P1 needs 3)
const MAX_INLINE_SHAPE_FUNCTIONS: usize = 3;

/// Flat slot of the (point, group) accumulator
///
/// Injective for `group < n_groups`: distinct pairs never share a slot.
#[inline]
pub fn slot_index(point: usize, group: usize, n_groups: usize) -> usize {
    point * n_groups + group
}

/// Read-only inputs of one launch
#[derive(Debug, Clone, Copy)]
pub struct LaunchInputs<'a, T> {
    /// Boundary mesh
    pub mesh: &'a TriangleMesh<T>,
    /// Global element id of each element slot
    pub element_indices: &'a [usize],
    /// Orientation sign (±1) of every mesh element, indexed by global id
    pub normal_signs: &'a [i32],
    /// Flat evaluation point coordinates `[x0, y0, z0, x1, ...]`
    pub eval_points: &'a [T],
    /// Flat coefficient array indexed by global element id
    pub coefficients: &'a [T],
}

impl<T> LaunchInputs<'_, T> {
    /// Number of evaluation points (grid axis 0)
    pub fn num_points(&self) -> usize {
        self.eval_points.len() / NDIM
    }

    /// Number of element slots (grid axis 1)
    pub fn num_slots(&self) -> usize {
        self.element_indices.len()
    }
}

/// Single-layer potential kernel with its injected collaborators
///
/// Shape functions, kernel function, quadrature rule and coefficient layout
/// are fixed at construction; a launch only supplies data.
pub struct PotentialKernel<T: Real> {
    shape: Box<dyn ShapeEvaluator<T>>,
    kernel: Box<dyn KernelEvaluator<T>>,
    rule: QuadratureRule<T>,
    loader: CoefficientLoader<T>,
    group_size: usize,
}

impl<T: Real> PotentialKernel<T> {
    /// Create a kernel with the default group size
    pub fn new(
        shape: Box<dyn ShapeEvaluator<T>>,
        kernel: Box<dyn KernelEvaluator<T>>,
        rule: QuadratureRule<T>,
        mode: CoefficientMode,
    ) -> Self {
        let loader = CoefficientLoader::new(mode, shape.num_shape_functions());
        Self {
            shape,
            kernel,
            rule,
            loader,
            group_size: DEFAULT_GROUP_SIZE,
        }
    }

    /// Set the number of lanes per group
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size;
        self
    }

    /// Lanes per group
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Quadrature rule
    pub fn rule(&self) -> &QuadratureRule<T> {
        &self.rule
    }

    /// Coefficient loader
    pub fn loader(&self) -> &CoefficientLoader<T> {
        &self.loader
    }

    /// Groups needed to cover `n_slots` element slots
    pub fn num_groups(&self, n_slots: usize) -> usize {
        if self.group_size == 0 {
            return 0;
        }
        n_slots.div_ceil(self.group_size)
    }

    /// Result buffer length (in reals) for a single launch
    pub fn result_len(&self, n_points: usize, n_slots: usize) -> usize {
        2 * n_points * self.num_groups(n_slots)
    }

    /// Check every precondition of a launch
    ///
    /// Returns the number of groups the result buffer holds per point. The
    /// buffer may hold more groups than the launch needs, so several launches
    /// can accumulate into one buffer.
    pub fn validate(&self, inputs: &LaunchInputs<'_, T>, result_len: usize) -> Result<usize> {
        if self.group_size == 0 {
            return Err(PotentialError::InvalidGroupSize(0));
        }

        let n_points = inputs.num_points();
        if inputs.eval_points.len() != NDIM * n_points {
            return Err(PotentialError::LengthMismatch {
                name: "evaluation points",
                expected: NDIM * n_points,
                got: inputs.eval_points.len(),
            });
        }

        let num_elements = inputs.mesh.num_elements();
        if inputs.normal_signs.len() != num_elements {
            return Err(PotentialError::LengthMismatch {
                name: "normal signs",
                expected: num_elements,
                got: inputs.normal_signs.len(),
            });
        }
        if let Some((element, &sign)) = inputs
            .normal_signs
            .iter()
            .enumerate()
            .find(|&(_, &s)| s != 1 && s != -1)
        {
            return Err(PotentialError::InvalidNormalSign { element, sign });
        }

        let expected = self.loader.expected_len(num_elements);
        if inputs.coefficients.len() != expected {
            return Err(PotentialError::LengthMismatch {
                name: "coefficients",
                expected,
                got: inputs.coefficients.len(),
            });
        }

        if let Some(&index) = inputs
            .element_indices
            .iter()
            .find(|&&e| e >= num_elements)
        {
            return Err(PotentialError::ElementOutOfRange {
                index,
                num_elements,
            });
        }

        if n_points == 0 {
            return Ok(0);
        }
        let needed = self.num_groups(inputs.num_slots());
        let n_groups = result_len / (2 * n_points);
        if !result_len.is_multiple_of(2 * n_points) || n_groups < needed {
            return Err(PotentialError::LengthMismatch {
                name: "result",
                expected: 2 * n_points * needed,
                got: result_len,
            });
        }

        Ok(n_groups)
    }

    /// Accumulate the partial sums of one launch into `result`
    ///
    /// `result` holds `2 * n_points * n_groups` reals with
    /// `n_groups >= self.num_groups(n_slots)`; groups this launch does not
    /// need are left untouched.
    pub fn launch(&self, inputs: &LaunchInputs<'_, T>, result: &mut [T]) -> Result<()> {
        let n_groups = self.validate(inputs, result.len())?;
        let n_points = inputs.num_points();
        let n_slots = inputs.num_slots();
        if n_points == 0 || n_slots == 0 {
            return Ok(());
        }

        let needed = self.num_groups(n_slots);
        log::debug!(
            "Launching potential kernel: {} points x {} slots, {} groups of {} lanes ({} quadrature points)",
            n_points,
            n_slots,
            needed,
            self.group_size,
            self.rule.num_points()
        );

        parallel_for_each_chunk_mut(result, 2, |slot, accumulator| {
            let point = slot / n_groups;
            let group = slot % n_groups;
            if group >= needed {
                return;
            }

            let base = NDIM * point;
            let eval_point = [
                inputs.eval_points[base],
                inputs.eval_points[base + 1],
                inputs.eval_points[base + 2],
            ];

            // Lanes past the last slot would only add zeros, so the ragged
            // final group runs fewer of them. The collect is the join.
            let first = group * self.group_size;
            let active = self.group_size.min(n_slots - first);
            let lanes = parallel_map_indexed(active, |lane| {
                self.lane_contribution(&eval_point, inputs.element_indices[first + lane], inputs)
            });

            let total = lanes.iter().fold(czero::<T>(), |acc, &c| acc + c);
            accumulator[0] += total.re;
            accumulator[1] += total.im;
        });

        Ok(())
    }

    fn lane_contribution(
        &self,
        eval_point: &Point3<T>,
        element_id: usize,
        inputs: &LaunchInputs<'_, T>,
    ) -> Complex<T> {
        let n = self.loader.num_shape_functions();
        if n <= MAX_INLINE_SHAPE_FUNCTIONS {
            let mut coefficients = [czero(); MAX_INLINE_SHAPE_FUNCTIONS];
            let mut shape_values = [T::zero(); MAX_INLINE_SHAPE_FUNCTIONS];
            self.integrate_with_scratch(
                eval_point,
                element_id,
                inputs,
                &mut coefficients[..n],
                &mut shape_values[..n],
            )
        } else {
            let mut coefficients = vec![czero(); n];
            let mut shape_values = vec![T::zero(); n];
            self.integrate_with_scratch(
                eval_point,
                element_id,
                inputs,
                &mut coefficients,
                &mut shape_values,
            )
        }
    }

    fn integrate_with_scratch(
        &self,
        eval_point: &Point3<T>,
        element_id: usize,
        inputs: &LaunchInputs<'_, T>,
        coefficients: &mut [Complex<T>],
        shape_values: &mut [T],
    ) -> Complex<T> {
        self.loader.load(inputs.coefficients, element_id, coefficients);
        let geometry = ElementGeometry::new(inputs.mesh, element_id, inputs.normal_signs);

        integrate_element(
            eval_point,
            &geometry,
            coefficients,
            &self.rule,
            self.shape.as_ref(),
            self.kernel.as_ref(),
            shape_values,
        )
    }
}

impl<T: Real> std::fmt::Debug for PotentialKernel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PotentialKernel")
            .field("num_quadrature_points", &self.rule.num_points())
            .field("loader", &self.loader)
            .field("group_size", &self.group_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::integration::triangle_rule;
    use crate::core::kernel::LaplaceSingleLayer;
    use crate::core::mesh::generate_plate_mesh;
    use crate::core::shape::{ConstantShape, LinearShape};
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn laplace_p0(group_size: usize) -> PotentialKernel<f64> {
        PotentialKernel::new(
            Box::new(ConstantShape),
            Box::new(LaplaceSingleLayer),
            triangle_rule(3).unwrap(),
            CoefficientMode::RealOnly,
        )
        .with_group_size(group_size)
    }

    fn point_totals(result: &[f64], n_points: usize) -> Vec<Complex<f64>> {
        let n_groups = result.len() / (2 * n_points);
        (0..n_points)
            .map(|p| {
                (0..n_groups).fold(Complex::new(0.0, 0.0), |acc, g| {
                    let s = slot_index(p, g, n_groups);
                    acc + Complex::new(result[2 * s], result[2 * s + 1])
                })
            })
            .collect()
    }

    #[test]
    fn test_slot_index_is_injective() {
        let (n_points, n_groups) = (7, 5);
        let mut seen = HashSet::new();
        for p in 0..n_points {
            for g in 0..n_groups {
                assert!(seen.insert(slot_index(p, g, n_groups)));
            }
        }
        assert_eq!(seen.len(), n_points * n_groups);
        assert!(seen.iter().all(|&s| s < n_points * n_groups));
    }

    #[test]
    fn test_num_groups_rounds_up() {
        let kernel = laplace_p0(4);
        assert_eq!(kernel.num_groups(0), 0);
        assert_eq!(kernel.num_groups(4), 1);
        assert_eq!(kernel.num_groups(5), 2);
        assert_eq!(kernel.result_len(3, 9), 2 * 3 * 3);
    }

    #[test]
    fn test_group_size_invariance() {
        let mesh = generate_plate_mesh(1.0, 1.0, 3, 3);
        let indices: Vec<usize> = (0..mesh.num_elements()).collect();
        let signs = vec![1; mesh.num_elements()];
        let points = [0.5, 0.5, 1.0, 0.1, 0.9, -0.5];
        let coeffs: Vec<f64> = (0..mesh.num_elements()).map(|e| 1.0 + e as f64).collect();
        let inputs = LaunchInputs {
            mesh: &mesh,
            element_indices: &indices,
            normal_signs: &signs,
            eval_points: &points,
            coefficients: &coeffs,
        };

        let reference = {
            let kernel = laplace_p0(1);
            let mut result = vec![0.0; kernel.result_len(2, indices.len())];
            kernel.launch(&inputs, &mut result).unwrap();
            point_totals(&result, 2)
        };

        for group_size in [2, 5, 7, 18, 64] {
            let kernel = laplace_p0(group_size);
            let mut result = vec![0.0; kernel.result_len(2, indices.len())];
            kernel.launch(&inputs, &mut result).unwrap();
            for (a, b) in point_totals(&result, 2).iter().zip(&reference) {
                assert_relative_eq!(a.re, b.re, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_launch_accumulates() {
        let mesh = generate_plate_mesh(1.0, 1.0, 2, 2);
        let indices: Vec<usize> = (0..mesh.num_elements()).collect();
        let signs = vec![1; mesh.num_elements()];
        let points = [0.3, 0.3, 0.7];
        let coeffs = vec![1.0; mesh.num_elements()];
        let inputs = LaunchInputs {
            mesh: &mesh,
            element_indices: &indices,
            normal_signs: &signs,
            eval_points: &points,
            coefficients: &coeffs,
        };

        let kernel = laplace_p0(4);
        let mut once = vec![0.0; kernel.result_len(1, indices.len())];
        kernel.launch(&inputs, &mut once).unwrap();

        let mut twice = once.clone();
        kernel.launch(&inputs, &mut twice).unwrap();
        for (a, b) in once.iter().zip(&twice) {
            assert_relative_eq!(2.0 * a, *b, max_relative = 1e-14);
        }
    }

    #[test]
    fn test_ragged_group_and_extra_groups_untouched() {
        let mesh = generate_plate_mesh(1.0, 1.0, 1, 1);
        let indices = [1usize, 0, 1];
        let signs = [1, 1];
        let points = [0.5, 0.5, 1.0];
        let coeffs = [1.0, 1.0];
        let inputs = LaunchInputs {
            mesh: &mesh,
            element_indices: &indices,
            normal_signs: &signs,
            eval_points: &points,
            coefficients: &coeffs,
        };

        // 3 slots in groups of 2 need 2 groups; give the buffer 4
        let kernel = laplace_p0(2);
        let mut result = vec![0.0; 2 * 4];
        kernel.launch(&inputs, &mut result).unwrap();

        assert!(result[0] > 0.0);
        assert!(result[2] > 0.0);
        assert_eq!(&result[4..], &[0.0; 4]);
    }

    #[test]
    fn test_oversized_group_matches_small_groups() {
        let mesh = generate_plate_mesh(1.0, 1.0, 2, 1);
        let indices: Vec<usize> = (0..mesh.num_elements()).collect();
        let signs = vec![1; mesh.num_elements()];
        let points = [0.5, 0.5, 1.0, -0.2, 0.3, 0.6];
        let coeffs: Vec<f64> = (0..mesh.num_elements()).map(|e| 0.5 + e as f64).collect();
        let inputs = LaunchInputs {
            mesh: &mesh,
            element_indices: &indices,
            normal_signs: &signs,
            eval_points: &points,
            coefficients: &coeffs,
        };

        let small = laplace_p0(2);
        let mut reference = vec![0.0; small.result_len(2, indices.len())];
        small.launch(&inputs, &mut reference).unwrap();

        // One group holds every slot; no lane is spawned past the last one
        for group_size in [1_000_000, 1usize << 60, usize::MAX] {
            let kernel = laplace_p0(group_size);
            assert_eq!(kernel.num_groups(indices.len()), 1);
            let mut result = vec![0.0; kernel.result_len(2, indices.len())];
            kernel.launch(&inputs, &mut result).unwrap();
            for (a, b) in point_totals(&result, 2).iter().zip(point_totals(&reference, 2)) {
                assert_relative_eq!(a.re, b.re, max_relative = 1e-14);
                assert_eq!(a.im, 0.0);
            }
        }
    }

    /// Four equal basis functions summing to one
    struct QuarterShape;

    impl ShapeEvaluator<f64> for QuarterShape {
        fn num_shape_functions(&self) -> usize {
            4
        }

        fn evaluate(&self, _: &crate::core::types::RefPoint<f64>, values: &mut [f64]) {
            values.fill(0.25);
        }
    }

    #[test]
    fn test_wide_basis_matches_constant_shape() {
        let mesh = generate_plate_mesh(1.0, 1.0, 2, 2);
        let n = mesh.num_elements();
        let indices: Vec<usize> = (0..n).collect();
        let signs = vec![1; n];
        let points = [0.5, 0.5, 0.7];
        let constant = vec![1.0; n];
        let nodal = vec![1.0; 4 * n];
        let inputs = LaunchInputs {
            mesh: &mesh,
            element_indices: &indices,
            normal_signs: &signs,
            eval_points: &points,
            coefficients: &constant,
        };

        let p0 = laplace_p0(4);
        let mut a = vec![0.0; p0.result_len(1, n)];
        p0.launch(&inputs, &mut a).unwrap();

        let wide = PotentialKernel::new(
            Box::new(QuarterShape),
            Box::new(LaplaceSingleLayer),
            triangle_rule(3).unwrap(),
            CoefficientMode::RealOnly,
        )
        .with_group_size(4);
        let mut b = vec![0.0; wide.result_len(1, n)];
        wide.launch(
            &LaunchInputs {
                coefficients: &nodal,
                ..inputs
            },
            &mut b,
        )
        .unwrap();

        for (x, y) in point_totals(&a, 1).iter().zip(point_totals(&b, 1)) {
            assert_relative_eq!(x.re, y.re, max_relative = 1e-14);
        }
    }

    #[test]
    fn test_complex_coefficients_linear_shapes() {
        let mesh = generate_plate_mesh(1.0, 1.0, 1, 1);
        let indices = [0usize, 1];
        let signs = [1, 1];
        let points = [0.5, 0.5, 2.0];
        let real: Vec<f64> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        // Same values, purely imaginary
        let imag: Vec<f64> = real.iter().flat_map(|&v| [0.0, v]).collect();

        let make = |mode| {
            PotentialKernel::new(
                Box::new(LinearShape),
                Box::new(LaplaceSingleLayer),
                triangle_rule(3).unwrap(),
                mode,
            )
        };

        let real_kernel = make(CoefficientMode::RealOnly);
        let mut a = vec![0.0; real_kernel.result_len(1, 2)];
        real_kernel
            .launch(
                &LaunchInputs {
                    mesh: &mesh,
                    element_indices: &indices,
                    normal_signs: &signs,
                    eval_points: &points,
                    coefficients: &real,
                },
                &mut a,
            )
            .unwrap();

        let complex_kernel = make(CoefficientMode::Complex);
        let mut b = vec![0.0; complex_kernel.result_len(1, 2)];
        complex_kernel
            .launch(
                &LaunchInputs {
                    mesh: &mesh,
                    element_indices: &indices,
                    normal_signs: &signs,
                    eval_points: &points,
                    coefficients: &imag,
                },
                &mut b,
            )
            .unwrap();

        assert_eq!(a[1], 0.0);
        assert_relative_eq!(b[1], a[0], max_relative = 1e-14);
        assert_eq!(b[0], 0.0);
    }

    #[test]
    fn test_validation_errors() {
        let mesh = generate_plate_mesh(1.0, 1.0, 1, 1);
        let indices = [0usize, 1];
        let signs = [1, 1];
        let points = [0.5, 0.5, 1.0];
        let coeffs = [1.0, 1.0];
        let base = LaunchInputs {
            mesh: &mesh,
            element_indices: &indices,
            normal_signs: &signs,
            eval_points: &points,
            coefficients: &coeffs,
        };
        let kernel = laplace_p0(2);
        let mut result = vec![0.0; 2];

        let bad_index = [0usize, 2];
        let err = kernel
            .launch(
                &LaunchInputs {
                    element_indices: &bad_index,
                    ..base
                },
                &mut result,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PotentialError::ElementOutOfRange {
                index: 2,
                num_elements: 2
            }
        ));

        let bad_signs = [1, 0];
        let err = kernel
            .launch(
                &LaunchInputs {
                    normal_signs: &bad_signs,
                    ..base
                },
                &mut result,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PotentialError::InvalidNormalSign {
                element: 1,
                sign: 0
            }
        ));

        let short = [1.0];
        let err = kernel
            .launch(
                &LaunchInputs {
                    coefficients: &short,
                    ..base
                },
                &mut result,
            )
            .unwrap_err();
        assert!(err.is_length_error());

        let ragged_points = [0.5, 0.5];
        assert!(
            kernel
                .launch(
                    &LaunchInputs {
                        eval_points: &ragged_points,
                        ..base
                    },
                    &mut result,
                )
                .is_err()
        );

        let mut too_small = vec![0.0; 1];
        assert!(kernel.launch(&base, &mut too_small).is_err());

        let zero_groups = laplace_p0(0);
        assert!(matches!(
            zero_groups.launch(&base, &mut result),
            Err(PotentialError::InvalidGroupSize(0))
        ));

        // Nothing was written by the rejected launches
        assert_eq!(result, vec![0.0; 2]);
    }
}
