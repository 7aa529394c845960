//! Per-element coefficient loading
//!
//! Coefficients are stored per (element, shape function) in one flat real
//! array indexed by the *global* element id:
//!
//! - [`CoefficientMode::RealOnly`]: `data[e * N + i]`, imaginary part is zero
//! - [`CoefficientMode::Complex`]: `data[2 * (e * N + i)]` real and
//!   `data[2 * (e * N + i) + 1]` imaginary (interleaved, stride `2N`)
//!
//! The mode is resolved once into a [`CoefficientLoader`], so the lanes never
//! branch on it.

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::core::types::Real;

/// Storage layout of the coefficient array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoefficientMode {
    /// One real value per shape function
    #[default]
    RealOnly,
    /// Interleaved `(re, im)` pair per shape function
    Complex,
}

impl CoefficientMode {
    /// Reals stored per element for `num_shape_functions` shape functions
    pub fn stride(self, num_shape_functions: usize) -> usize {
        match self {
            CoefficientMode::RealOnly => num_shape_functions,
            CoefficientMode::Complex => 2 * num_shape_functions,
        }
    }

    /// Length of a coefficient array covering `num_elements` elements
    pub fn expected_len(self, num_elements: usize, num_shape_functions: usize) -> usize {
        num_elements * self.stride(num_shape_functions)
    }
}

type LoadFn<T> = fn(&[T], usize, &mut [Complex<T>]);

/// Coefficient reader with the storage mode fixed at construction
#[derive(Clone, Copy)]
pub struct CoefficientLoader<T> {
    mode: CoefficientMode,
    num_shape_functions: usize,
    load: LoadFn<T>,
}

impl<T: Real> CoefficientLoader<T> {
    /// Create a loader for `num_shape_functions` coefficients per element
    pub fn new(mode: CoefficientMode, num_shape_functions: usize) -> Self {
        let load: LoadFn<T> = match mode {
            CoefficientMode::RealOnly => load_real,
            CoefficientMode::Complex => load_complex,
        };
        Self {
            mode,
            num_shape_functions,
            load,
        }
    }

    /// Storage mode
    pub fn mode(&self) -> CoefficientMode {
        self.mode
    }

    /// Coefficients per element
    pub fn num_shape_functions(&self) -> usize {
        self.num_shape_functions
    }

    /// Length of a coefficient array covering `num_elements` elements
    pub fn expected_len(&self, num_elements: usize) -> usize {
        self.mode.expected_len(num_elements, self.num_shape_functions)
    }

    /// Read the coefficients of `element_id` into `out`
    ///
    /// `out.len()` must equal the number of shape functions.
    #[inline]
    pub fn load(&self, data: &[T], element_id: usize, out: &mut [Complex<T>]) {
        (self.load)(data, element_id, out)
    }
}

impl<T> std::fmt::Debug for CoefficientLoader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoefficientLoader")
            .field("mode", &self.mode)
            .field("num_shape_functions", &self.num_shape_functions)
            .finish()
    }
}

fn load_real<T: Real>(data: &[T], element_id: usize, out: &mut [Complex<T>]) {
    let n = out.len();
    let row = &data[element_id * n..(element_id + 1) * n];
    for (c, &re) in out.iter_mut().zip(row) {
        *c = Complex::new(re, T::zero());
    }
}

fn load_complex<T: Real>(data: &[T], element_id: usize, out: &mut [Complex<T>]) {
    let n = out.len();
    let row = &data[2 * element_id * n..2 * (element_id + 1) * n];
    for (c, pair) in out.iter_mut().zip(row.chunks_exact(2)) {
        *c = Complex::new(pair[0], pair[1]);
    }
}

/// Flatten complex values into the interleaved `(re, im)` layout
pub fn interleave<T: Real>(values: &[Complex<T>]) -> Vec<T> {
    values.iter().flat_map(|c| [c.re, c.im]).collect()
}
