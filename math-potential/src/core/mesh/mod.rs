//! Mesh storage, element geometry, and test mesh generators

pub mod element;
pub mod generators;

pub use element::*;
pub use generators::*;
