//! # Materials
//!
//! The material model the solver needs (shear modulus, tensile strength,
//! density) plus built-in spring wire presets.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::materials::MaterialModel;
//!
//! let steel = MaterialModel::from_preset("SAE 9254").unwrap();
//! assert!(steel.shear_modulus_mpa > 79_000.0);
//!
//! // Custom material straight from a mill certificate
//! let custom = MaterialModel::new("Batch 24-117", 79_000.0, 2050.0, 7850.0);
//! assert_eq!(custom.ultimate_shear_strength_mpa(), 0.6 * 2050.0);
//! ```

pub mod spring_steel;

pub use spring_steel::SpringSteelGrade;

use serde::{Deserialize, Serialize};

use crate::errors::SpringResult;
use crate::units::KilogramsPerCubicMeter;

/// Ultimate torsional strength as a fraction of tensile strength.
pub const SHEAR_TO_TENSILE_RATIO: f64 = 0.6;

/// Material properties used by the stiffness and fatigue calculations.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "SAE9254",
///   "shear_modulus_mpa": 79300.0,
///   "tensile_strength_mpa": 1960.0,
///   "density_kg_m3": 7850.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialModel {
    pub name: String,
    /// Shear modulus G (MPa)
    pub shear_modulus_mpa: f64,
    /// Young's modulus E (MPa); only forwarded to the structural solver
    #[serde(default = "default_elastic_modulus")]
    pub elastic_modulus_mpa: f64,
    /// Tensile strength Rm (MPa)
    pub tensile_strength_mpa: f64,
    /// Density (kg/m³)
    pub density_kg_m3: f64,
    #[serde(default = "default_poisson_ratio")]
    pub poisson_ratio: f64,
}

fn default_elastic_modulus() -> f64 {
    206_000.0
}

fn default_poisson_ratio() -> f64 {
    0.3
}

impl MaterialModel {
    pub fn new(
        name: impl Into<String>,
        shear_modulus_mpa: f64,
        tensile_strength_mpa: f64,
        density_kg_m3: f64,
    ) -> Self {
        MaterialModel {
            name: name.into(),
            shear_modulus_mpa,
            elastic_modulus_mpa: default_elastic_modulus(),
            tensile_strength_mpa,
            density_kg_m3,
            poisson_ratio: default_poisson_ratio(),
        }
    }

    /// Look up a built-in wire grade by name or alias.
    pub fn from_preset(name: &str) -> SpringResult<Self> {
        SpringSteelGrade::from_str_flexible(name).map(|grade| grade.material())
    }

    pub fn density(&self) -> KilogramsPerCubicMeter {
        KilogramsPerCubicMeter(self.density_kg_m3)
    }

    /// Torsional ultimate strength τu (MPa)
    pub fn ultimate_shear_strength_mpa(&self) -> f64 {
        SHEAR_TO_TENSILE_RATIO * self.tensile_strength_mpa
    }
}

impl Default for MaterialModel {
    fn default() -> Self {
        SpringSteelGrade::Sae9254.material()
    }
}
