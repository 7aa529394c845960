//! Single-layer potential evaluation
//!
//! ## Architecture
//!
//! - `types`: Precision-generic scalar trait and small 3D vector helpers
//! - `constants`: Numerical constants
//! - `error`: Host-side precondition errors
//! - `mesh`: Triangle mesh storage, per-element geometry, test mesh generators
//! - `coefficients`: Real/complex coefficient loading
//! - `shape`: Shape-function evaluators (P0, P1)
//! - `kernel`: Green's kernel evaluators (Laplace, Helmholtz)
//! - `integration`: Triangle quadrature rules and the per-element accumulation loop
//! - `potential`: Lane grid launch, group reduction, and the batched host operator
//! - `config`: JSON launch configuration
//! - `parallel`: Portable parallel iteration (rayon or sequential)

pub mod coefficients;
pub mod config;
pub mod constants;
pub mod error;
pub mod integration;
pub mod kernel;
pub mod mesh;
pub mod parallel;
pub mod potential;
pub mod shape;
pub mod types;

// Re-exports for convenience
pub use coefficients::{CoefficientLoader, CoefficientMode, interleave};
pub use config::PotentialConfig;
pub use error::{PotentialError, Result};
pub use integration::{QuadratureRule, integrate_element, triangle_rule};
pub use kernel::{
    HelmholtzSingleLayer, KernelEvaluator, KernelVariant, LaplaceDoubleLayer, LaplaceSingleLayer,
};
pub use mesh::{ElementGeometry, TriangleMesh};
pub use potential::{
    LaunchInputs, PotentialKernel, PotentialOperator, evaluate_with_config, slot_index,
    sum_groups,
};
pub use shape::{ConstantShape, LinearShape, ShapeEvaluator, ShapeFamily};
pub use types::*;
