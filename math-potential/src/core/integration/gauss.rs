//! Triangle quadrature rules
//!
//! Symmetric Gauss rules on the reference triangle (0,0), (1,0), (0,1).
//! The raw tables use the unit-simplex convention (weights sum to 1); rules
//! handed out here are scaled so the weights sum to 0.5, the reference area.

// Allow excessive precision for tabulated constants
#![allow(clippy::excessive_precision)]

use crate::core::error::{PotentialError, Result};
use crate::core::types::{Real, RefPoint, cast};

/// Fixed quadrature rule on the reference triangle
///
/// Shared read-only by every lane of a launch.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule<T> {
    points: Vec<RefPoint<T>>,
    weights: Vec<T>,
}

impl<T: Real> QuadratureRule<T> {
    /// Build a rule from caller-supplied points and weights
    ///
    /// Fails if the rule is empty or the two arrays differ in length.
    pub fn new(points: Vec<RefPoint<T>>, weights: Vec<T>) -> Result<Self> {
        if points.is_empty() {
            return Err(PotentialError::InvalidQuadrature(
                "rule has no points".to_string(),
            ));
        }
        if points.len() != weights.len() {
            return Err(PotentialError::InvalidQuadrature(format!(
                "{} points but {} weights",
                points.len(),
                weights.len()
            )));
        }
        Ok(Self { points, weights })
    }

    /// Number of quadrature points
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Reference-triangle points `(ξ, η)`
    pub fn points(&self) -> &[RefPoint<T>] {
        &self.points
    }

    /// Weights, one per point
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// Sum of the weights (0.5 for the tabulated rules)
    pub fn weight_sum(&self) -> T {
        self.weights.iter().fold(T::zero(), |acc, &w| acc + w)
    }
}

/// Tabulated triangle rule
///
/// | order | points | exact for degree |
/// |-------|--------|------------------|
/// | 1     | 1      | 1                |
/// | 2     | 4      | 3                |
/// | 3     | 7      | 5                |
/// | 4     | 13     | 7                |
pub fn triangle_rule<T: Real>(order: usize) -> Result<QuadratureRule<T>> {
    const AREA_SCALE: f64 = 0.5;
    let table = raw_table(order).ok_or_else(|| {
        PotentialError::InvalidQuadrature(format!(
            "no tabulated triangle rule of order {order} (supported: 1..=4)"
        ))
    })?;

    let points = table.iter().map(|&[x, y, _]| [cast(x), cast(y)]).collect();
    let weights = table.iter().map(|&[_, _, w]| cast(w * AREA_SCALE)).collect();
    QuadratureRule::new(points, weights)
}

/// Number of points of the tabulated rule of `order`, if one exists
pub fn num_quadrature_points(order: usize) -> Option<usize> {
    raw_table(order).map(<[[f64; 3]]>::len)
}

fn raw_table(order: usize) -> Option<&'static [[f64; 3]]> {
    match order {
        1 => Some(&GAUCORWEI_TR1),
        2 => Some(&GAUCORWEI_TR4),
        3 => Some(&GAUCORWEI_TR7),
        4 => Some(&GAUCORWEI_TR13),
        _ => None,
    }
}

static GAUCORWEI_TR1: [[f64; 3]; 1] = [[0.333333333333333, 0.333333333333333, 1.0]];

static GAUCORWEI_TR4: [[f64; 3]; 4] = [
    [0.333333333333333, 0.333333333333333, -0.5625],
    [0.6, 0.2, 0.520833333333333],
    [0.2, 0.6, 0.520833333333333],
    [0.2, 0.2, 0.520833333333333],
];

static GAUCORWEI_TR7: [[f64; 3]; 7] = [
    [0.333333333333333, 0.333333333333333, 0.225],
    [0.797426985353087, 0.101286507323456, 0.125939180544827],
    [0.101286507323456, 0.797426985353087, 0.125939180544827],
    [0.101286507323456, 0.101286507323456, 0.125939180544827],
    [0.470142064105115, 0.059715871789770, 0.132394152788506],
    [0.059715871789770, 0.470142064105115, 0.132394152788506],
    [0.470142064105115, 0.470142064105115, 0.132394152788506],
];

static GAUCORWEI_TR13: [[f64; 3]; 13] = [
    [0.333333333333333, 0.333333333333333, -0.149570044467682],
    [0.260345966079040, 0.260345966079040, 0.175615257433208],
    [0.260345966079040, 0.479308067841920, 0.175615257433208],
    [0.479308067841920, 0.260345966079040, 0.175615257433208],
    [0.065130102902216, 0.065130102902216, 0.053347235608838],
    [0.065130102902216, 0.869739794195568, 0.053347235608838],
    [0.869739794195568, 0.065130102902216, 0.053347235608838],
    [0.638444188569810, 0.048690315425316, 0.077113760890257],
    [0.048690315425316, 0.638444188569810, 0.077113760890257],
    [0.638444188569810, 0.312865496004874, 0.077113760890257],
    [0.312865496004874, 0.638444188569810, 0.077113760890257],
    [0.048690315425316, 0.312865496004874, 0.077113760890257],
    [0.312865496004874, 0.048690315425316, 0.077113760890257],
];
