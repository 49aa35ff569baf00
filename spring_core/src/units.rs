//! # Unit Types
//!
//! Type-safe wrappers at the two places a unit factor is applied. Internally the
//! core works in a consistent SI-millimetre system:
//!
//! - Length: millimetres (mm)
//! - Force: newtons (N)
//! - Stress and moduli: megapascals (MPa = N/mm²)
//! - Density: kilograms per cubic metre (kg/m³), mass in kilograms
//!
//! Wire data sheets quote moduli in GPa, and wire volume comes out in mm³ while
//! density is in kg/m³; the conversions below are the only place those factors live.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::units::{CubicMillimeters, Gigapascals, KilogramsPerCubicMeter, Megapascals};
//!
//! let g: Megapascals = Gigapascals(79.3).into();
//! assert!((g.0 - 79_300.0).abs() < 1e-9);
//!
//! let mass = CubicMillimeters(1.0e6) * KilogramsPerCubicMeter(7850.0);
//! assert!((mass.0 - 7.85).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Mul;

// ============================================================================
// Moduli
// ============================================================================

/// Stress or modulus in megapascals (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Megapascals(pub f64);

/// Modulus in gigapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gigapascals(pub f64);

impl From<Gigapascals> for Megapascals {
    fn from(gpa: Gigapascals) -> Self {
        Megapascals(gpa.0 * 1000.0)
    }
}

// ============================================================================
// Volume, Density and Mass
// ============================================================================

/// Density in kilograms per cubic metre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KilogramsPerCubicMeter(pub f64);

/// Volume in cubic millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMillimeters(pub f64);

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// 1 mm³ = 1e-9 m³
const MM3_PER_M3: f64 = 1.0e9;

impl Mul<KilogramsPerCubicMeter> for CubicMillimeters {
    type Output = Kilograms;
    fn mul(self, rhs: KilogramsPerCubicMeter) -> Kilograms {
        Kilograms(self.0 / MM3_PER_M3 * rhs.0)
    }
}
