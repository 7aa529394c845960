//! Potential evaluation
//!
//! - [`launch`] - Lane grid over (evaluation point, element slot) with the
//!   two-level group reduction
//! - [`operator`] - Host driver: buffer zeroing, batched launches, cross-group sum

pub mod launch;
pub mod operator;

pub use launch::{LaunchInputs, PotentialKernel, slot_index};
pub use operator::{PotentialOperator, evaluate_with_config, sum_groups};
