//! Host-side potential operator
//!
//! Owns the mesh, the evaluation points and a [`PotentialKernel`], and drives
//! it the way a caller of the raw launch would: zero a (point, group) buffer,
//! launch over element batches accumulating into that buffer, then sum across
//! groups.

use ndarray::{Array1, Array2};
use num_complex::{Complex, Complex64};

use super::launch::{LaunchInputs, PotentialKernel, slot_index};
use crate::core::coefficients::CoefficientMode;
use crate::core::config::PotentialConfig;
use crate::core::constants::NDIM;
use crate::core::error::{PotentialError, Result};
use crate::core::integration::{QuadratureRule, triangle_rule};
use crate::core::kernel::KernelVariant;
use crate::core::mesh::TriangleMesh;
use crate::core::shape::ShapeFamily;
use crate::core::types::{Precision, Real, czero};

/// Single-layer potential evaluated at a fixed set of points
#[derive(Debug)]
pub struct PotentialOperator<T: Real> {
    mesh: TriangleMesh<T>,
    eval_points: Vec<T>,
    n_points: usize,
    kernel: PotentialKernel<T>,
    element_indices: Vec<usize>,
    normal_signs: Vec<i32>,
    batch_size: Option<usize>,
}

impl<T: Real> PotentialOperator<T> {
    /// Create an operator over every element of `mesh`, all normals as stored
    ///
    /// # Arguments
    /// * `mesh` - Boundary mesh
    /// * `points` - Evaluation points (n_points × 3)
    /// * `shape` - Shape-function family
    /// * `kernel` - Green's kernel
    /// * `rule` - Triangle quadrature rule
    /// * `mode` - Coefficient storage layout
    pub fn new(
        mesh: TriangleMesh<T>,
        points: &Array2<T>,
        shape: ShapeFamily,
        kernel: KernelVariant,
        rule: QuadratureRule<T>,
        mode: CoefficientMode,
    ) -> Result<Self> {
        if points.ncols() != NDIM {
            return Err(PotentialError::LengthMismatch {
                name: "evaluation point row",
                expected: NDIM,
                got: points.ncols(),
            });
        }

        let n_points = points.nrows();
        let eval_points = points.iter().copied().collect();
        let num_elements = mesh.num_elements();

        Ok(Self {
            mesh,
            eval_points,
            n_points,
            kernel: PotentialKernel::new(shape.evaluator(), kernel.evaluator(), rule, mode),
            element_indices: (0..num_elements).collect(),
            normal_signs: vec![1; num_elements],
            batch_size: None,
        })
    }

    /// Create an operator from a validated configuration
    ///
    /// The precision field is ignored here; `T` fixes it.
    pub fn from_config(
        config: &PotentialConfig,
        mesh: TriangleMesh<T>,
        points: &Array2<T>,
    ) -> Result<Self> {
        config.validate()?;
        let rule = triangle_rule(config.quadrature_order)?;
        let operator = Self::new(
            mesh,
            points,
            config.shape_family,
            config.kernel,
            rule,
            config.coefficient_mode,
        )?
        .with_group_size(config.group_size);

        Ok(match config.batch_size {
            Some(batch_size) => operator.with_batch_size(batch_size),
            None => operator,
        })
    }

    /// Set the number of lanes per reduction group
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.kernel = self.kernel.with_group_size(group_size);
        self
    }

    /// Launch at most `batch_size` element slots at a time
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Restrict or reorder the elements that contribute
    pub fn with_element_indices(mut self, element_indices: Vec<usize>) -> Self {
        self.element_indices = element_indices;
        self
    }

    /// Set the orientation sign (±1) of every mesh element
    pub fn with_normal_signs(mut self, normal_signs: Vec<i32>) -> Self {
        self.normal_signs = normal_signs;
        self
    }

    /// Number of evaluation points
    pub fn num_points(&self) -> usize {
        self.n_points
    }

    /// Number of groups in the partial-sum buffer
    pub fn num_groups(&self) -> usize {
        self.kernel.num_groups(self.element_indices.len())
    }

    /// Mesh the operator integrates over
    pub fn mesh(&self) -> &TriangleMesh<T> {
        &self.mesh
    }

    /// Underlying launch kernel
    pub fn kernel(&self) -> &PotentialKernel<T> {
        &self.kernel
    }

    /// Per-(point, group) partial sums (n_points × n_groups)
    pub fn evaluate_partial_sums(&self, coefficients: &[T]) -> Result<Array2<Complex<T>>> {
        let buffer = self.accumulate(coefficients)?;
        let n_groups = self.num_groups();
        let values: Vec<Complex<T>> = buffer
            .chunks_exact(2)
            .map(|pair| Complex::new(pair[0], pair[1]))
            .collect();

        Array2::from_shape_vec((self.n_points, n_groups), values).map_err(|_| {
            PotentialError::LengthMismatch {
                name: "partial sums",
                expected: 2 * self.n_points * n_groups,
                got: buffer.len(),
            }
        })
    }

    /// Potential at every evaluation point
    pub fn evaluate(&self, coefficients: &[T]) -> Result<Array1<Complex<T>>> {
        let buffer = self.accumulate(coefficients)?;
        let potential = sum_groups(&buffer, self.n_points, self.num_groups())?;
        log::info!(
            "Evaluated potential at {} points from {} element slots",
            self.n_points,
            self.element_indices.len()
        );
        Ok(potential)
    }

    fn accumulate(&self, coefficients: &[T]) -> Result<Vec<T>> {
        let n_slots = self.element_indices.len();
        let batch_size = match self.batch_size {
            Some(0) => return Err(PotentialError::InvalidBatchSize(0)),
            Some(batch_size) => batch_size,
            None => n_slots.max(1),
        };

        let mut buffer = vec![T::zero(); self.kernel.result_len(self.n_points, n_slots)];

        let inputs = LaunchInputs {
            mesh: &self.mesh,
            element_indices: &self.element_indices,
            normal_signs: &self.normal_signs,
            eval_points: &self.eval_points,
            coefficients,
        };
        // Check everything once, even when there is nothing to launch
        self.kernel.validate(&inputs, buffer.len())?;

        let n_batches = n_slots.div_ceil(batch_size);
        for (batch, slots) in self.element_indices.chunks(batch_size).enumerate() {
            log::debug!(
                "Potential batch {}/{}: {} element slots",
                batch + 1,
                n_batches,
                slots.len()
            );
            self.kernel.launch(
                &LaunchInputs {
                    element_indices: slots,
                    ..inputs
                },
                &mut buffer,
            )?;
        }

        Ok(buffer)
    }
}

/// Sum an interleaved (point, group) buffer across groups
///
/// `buffer` holds `2 * n_points * n_groups` reals laid out by [`slot_index`].
pub fn sum_groups<T: Real>(
    buffer: &[T],
    n_points: usize,
    n_groups: usize,
) -> Result<Array1<Complex<T>>> {
    let expected = 2 * n_points * n_groups;
    if buffer.len() != expected {
        return Err(PotentialError::LengthMismatch {
            name: "partial sums",
            expected,
            got: buffer.len(),
        });
    }

    Ok(Array1::from_shape_fn(n_points, |point| {
        (0..n_groups).fold(czero(), |acc, group| {
            let slot = slot_index(point, group, n_groups);
            acc + Complex::new(buffer[2 * slot], buffer[2 * slot + 1])
        })
    }))
}

/// Evaluate the potential with the precision chosen by `config`
///
/// Inputs are given in double precision; in single-precision mode they are
/// rounded to `f32` before the launch and the result is widened back.
pub fn evaluate_with_config(
    config: &PotentialConfig,
    mesh: &TriangleMesh<f64>,
    points: &Array2<f64>,
    coefficients: &[f64],
) -> Result<Array1<Complex64>> {
    log::debug!(
        "Evaluating potential in {:?} precision at {} points",
        config.precision,
        points.nrows()
    );

    match config.precision {
        Precision::Double => {
            PotentialOperator::from_config(config, mesh.clone(), points)?.evaluate(coefficients)
        }
        Precision::Single => {
            let points = points.mapv(|v| v as f32);
            let coefficients: Vec<f32> = coefficients.iter().map(|&v| v as f32).collect();
            let potential = PotentialOperator::from_config(config, mesh.to_precision(), &points)?
                .evaluate(&coefficients)?;
            Ok(potential.mapv(|c| Complex64::new(f64::from(c.re), f64::from(c.im))))
        }
    }
}
