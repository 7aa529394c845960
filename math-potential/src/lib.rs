//! # Potential: BEM single-layer potential evaluation
//!
//! Evaluates, at a set of exterior points, the potential induced by a surface
//! density discretized on a triangulated boundary mesh.
//!
//! ## Features
//!
//! - Precision-generic kernel (`f32` or `f64`) over `num_complex::Complex`
//! - Injected shape-function and Green's kernel evaluators
//! - Two-level parallel reduction with Rayon (sequential fallback without `native`)
//! - JSON launch configuration
//!

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)] // Scientific code often has many parameters

pub mod core;

// Re-exports
pub use crate::core::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (set during build)
pub const GIT_HASH: &str = env!("GIT_HASH");
