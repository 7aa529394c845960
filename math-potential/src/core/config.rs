//! JSON configuration for potential evaluation

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::coefficients::CoefficientMode;
use crate::core::constants::{DEFAULT_GROUP_SIZE, DEFAULT_QUADRATURE_ORDER};
use crate::core::error::{PotentialError, Result};
use crate::core::integration::num_quadrature_points;
use crate::core::kernel::KernelVariant;
use crate::core::shape::ShapeFamily;
use crate::core::types::Precision;

/// Evaluation settings
///
/// Every field has a default, so `{}` is a valid configuration (double
/// precision, real P0 coefficients, Laplace kernel, 7-point rule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialConfig {
    /// Real precision of the evaluation
    #[serde(default)]
    pub precision: Precision,
    /// Coefficient storage layout
    #[serde(default)]
    pub coefficient_mode: CoefficientMode,
    /// Shape-function family
    #[serde(default)]
    pub shape_family: ShapeFamily,
    /// Green's kernel
    #[serde(default)]
    pub kernel: KernelVariant,
    /// Triangle rule order (1 to 4)
    #[serde(default = "default_quadrature_order")]
    pub quadrature_order: usize,
    /// Lanes per reduction group
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    /// Element slots per launch; `None` launches all elements at once
    #[serde(default)]
    pub batch_size: Option<usize>,
}

fn default_quadrature_order() -> usize {
    DEFAULT_QUADRATURE_ORDER
}

fn default_group_size() -> usize {
    DEFAULT_GROUP_SIZE
}

impl Default for PotentialConfig {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            coefficient_mode: CoefficientMode::default(),
            shape_family: ShapeFamily::default(),
            kernel: KernelVariant::default(),
            quadrature_order: DEFAULT_QUADRATURE_ORDER,
            group_size: DEFAULT_GROUP_SIZE,
            batch_size: None,
        }
    }
}

impl PotentialConfig {
    /// Shape functions per element
    pub fn num_shape_functions(&self) -> usize {
        self.shape_family.num_shape_functions()
    }

    /// Points of the configured quadrature rule, if the order is tabulated
    pub fn num_quadrature_points(&self) -> Option<usize> {
        num_quadrature_points(self.quadrature_order)
    }

    /// Coefficient array length for a mesh with `num_elements` elements
    pub fn coefficient_len(&self, num_elements: usize) -> usize {
        self.coefficient_mode
            .expected_len(num_elements, self.num_shape_functions())
    }

    /// Check the configuration for values no launch can use
    pub fn validate(&self) -> Result<()> {
        if self.num_quadrature_points().is_none() {
            return Err(PotentialError::InvalidConfig(format!(
                "quadrature_order must be between 1 and 4, got {}",
                self.quadrature_order
            )));
        }
        if self.group_size == 0 {
            return Err(PotentialError::InvalidGroupSize(0));
        }
        if self.batch_size == Some(0) {
            return Err(PotentialError::InvalidBatchSize(0));
        }
        if let KernelVariant::HelmholtzSingleLayer {
            wavenumber_re,
            wavenumber_im,
        } = self.kernel
            && !(wavenumber_re.is_finite() && wavenumber_im.is_finite())
        {
            return Err(PotentialError::InvalidConfig(
                "wavenumber must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PotentialConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
