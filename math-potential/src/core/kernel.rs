//! Green's kernel evaluators
//!
//! A kernel maps an (evaluation point, source point) pair, together with the
//! oriented source normal, to a complex weight. The shared signature also
//! carries an auxiliary direction slot used by other members of the kernel
//! family; the single-layer potential passes the zero vector.
//!
//! 3D Green's functions:
//! ```text
//! Laplace:    G(x, y) = 1 / (4π|x-y|)
//! Helmholtz:  G(x, y) = exp(ik|x-y|) / (4π|x-y|)
//! ```

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::core::constants::{EPSY, PI4};
use crate::core::types::{Point3, Real, Vector3, cast, czero, dot, norm, sub};

/// Kernel function between an evaluation point and a surface point
///
/// Implementations must be pure: the same arguments always give the same value.
pub trait KernelEvaluator<T: Real>: Send + Sync {
    /// Evaluate the kernel
    ///
    /// # Arguments
    /// * `eval_point` - Field point x
    /// * `source_point` - Surface point y
    /// * `aux_direction` - Family-wide auxiliary direction slot
    /// * `normal` - Oriented unit normal at y
    fn evaluate(
        &self,
        eval_point: &Point3<T>,
        source_point: &Point3<T>,
        aux_direction: &Vector3<T>,
        normal: &Vector3<T>,
    ) -> Complex<T>;
}

/// Laplace single-layer kernel 1/(4πr)
#[derive(Debug, Clone, Copy, Default)]
pub struct LaplaceSingleLayer;

impl<T: Real> KernelEvaluator<T> for LaplaceSingleLayer {
    #[inline]
    fn evaluate(
        &self,
        eval_point: &Point3<T>,
        source_point: &Point3<T>,
        _aux_direction: &Vector3<T>,
        _normal: &Vector3<T>,
    ) -> Complex<T> {
        let r = norm(&sub(eval_point, source_point));
        if r < cast(EPSY) {
            return czero();
        }
        Complex::new(T::one() / (cast::<T>(PI4) * r), T::zero())
    }
}

/// Helmholtz single-layer kernel exp(ikr)/(4πr)
///
/// A complex wavenumber `k = k_re + i k_im` gives a damped wave
/// `exp(-k_im r) exp(i k_re r) / (4πr)`.
#[derive(Debug, Clone, Copy)]
pub struct HelmholtzSingleLayer<T> {
    /// Wave number k
    pub wavenumber: Complex<T>,
}

impl<T: Real> HelmholtzSingleLayer<T> {
    /// Kernel with a real wavenumber
    pub fn new(wavenumber: T) -> Self {
        Self {
            wavenumber: Complex::new(wavenumber, T::zero()),
        }
    }

    /// Kernel with a complex wavenumber
    pub fn with_complex_wavenumber(wavenumber: Complex<T>) -> Self {
        Self { wavenumber }
    }
}

impl<T: Real> KernelEvaluator<T> for HelmholtzSingleLayer<T> {
    #[inline]
    fn evaluate(
        &self,
        eval_point: &Point3<T>,
        source_point: &Point3<T>,
        _aux_direction: &Vector3<T>,
        _normal: &Vector3<T>,
    ) -> Complex<T> {
        let r = norm(&sub(eval_point, source_point));
        if r < cast(EPSY) {
            return czero();
        }
        let amplitude = (-self.wavenumber.im * r).exp() / (cast::<T>(PI4) * r);
        Complex::from_polar(amplitude, self.wavenumber.re * r)
    }
}

/// Laplace double-layer kernel ∂G/∂n_y = (x-y)·n_y / (4π r³)
///
/// Odd in the normal: flipping the orientation flips the sign.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaplaceDoubleLayer;

impl<T: Real> KernelEvaluator<T> for LaplaceDoubleLayer {
    #[inline]
    fn evaluate(
        &self,
        eval_point: &Point3<T>,
        source_point: &Point3<T>,
        _aux_direction: &Vector3<T>,
        normal: &Vector3<T>,
    ) -> Complex<T> {
        let diff = sub(eval_point, source_point);
        let r = norm(&diff);
        if r < cast(EPSY) {
            return czero();
        }
        Complex::new(dot(&diff, normal) / (cast::<T>(PI4) * r * r * r), T::zero())
    }
}

/// Kernel variant selector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KernelVariant {
    /// Laplace single layer
    #[default]
    LaplaceSingleLayer,
    /// Helmholtz single layer with wavenumber `wavenumber_re + i wavenumber_im`
    HelmholtzSingleLayer {
        /// Real part of k
        wavenumber_re: f64,
        /// Imaginary part of k (damping)
        #[serde(default)]
        wavenumber_im: f64,
    },
    /// Laplace double layer
    LaplaceDoubleLayer,
}

impl KernelVariant {
    /// Whether the kernel produces non-zero imaginary parts
    pub fn is_complex(&self) -> bool {
        matches!(self, KernelVariant::HelmholtzSingleLayer { .. })
    }

    /// Evaluator for this variant
    pub fn evaluator<T: Real>(&self) -> Box<dyn KernelEvaluator<T>> {
        match *self {
            KernelVariant::LaplaceSingleLayer => Box::new(LaplaceSingleLayer),
            KernelVariant::HelmholtzSingleLayer {
                wavenumber_re,
                wavenumber_im,
            } => Box::new(HelmholtzSingleLayer::with_complex_wavenumber(Complex::new(
                cast(wavenumber_re),
                cast(wavenumber_im),
            ))),
            KernelVariant::LaplaceDoubleLayer => Box::new(LaplaceDoubleLayer),
        }
    }
}
