//! # Operating Points and Fatigue
//!
//! Ride and bump positions read off the stiffness curve, and a Goodman check of
//! the stress cycle between them.
//!
//! ## Assumptions
//!
//! - The spring oscillates about the ride position with an amplitude reaching bump
//! - Torsional fatigue limit is a fixed fraction of the ultimate shear strength
//!   (shot-peened wire)
//! - No temperature, corrosion or relaxation effects
//!
//! ## Example
//!
//! ```rust
//! use spring_core::calculations::fatigue::{evaluate_fatigue, FatigueLife, OperatingPoint};
//! use spring_core::materials::MaterialModel;
//!
//! let ride = OperatingPoint { shear_stress: 300.0, ..OperatingPoint::at_rest("ride", 300.0) };
//! let bump = OperatingPoint { shear_stress: 400.0, ..OperatingPoint::at_rest("bump", 300.0) };
//!
//! let fatigue = evaluate_fatigue(&ride, &bump, &MaterialModel::default());
//! assert_eq!(fatigue.mean_stress, 300.0);
//! assert_eq!(fatigue.alternating_stress, 100.0);
//! assert_eq!(fatigue.life, FatigueLife::Infinite);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::stiffness::StiffnessCurve;
use crate::materials::MaterialModel;

/// Fully reversed torsional fatigue limit as a fraction of τu.
pub const FATIGUE_LIMIT_RATIO: f64 = 0.35;

/// Utilization up to which life is classed as infinite.
pub const INFINITE_LIFE_UTILIZATION: f64 = 0.8;

/// Utilization up to which life is classed as high-cycle.
pub const HIGH_CYCLE_UTILIZATION: f64 = 1.0;

/// Utilization up to which life is classed as low-cycle.
pub const LOW_CYCLE_UTILIZATION: f64 = 1.2;

/// Reported safety factor ceiling for an unloaded cycle.
pub const MAX_SAFETY_FACTOR: f64 = 100.0;

/// The spring's state at one installed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub label: String,
    /// Deflection from free length (mm)
    pub deflection: f64,
    /// Installed height (mm)
    pub height: f64,
    /// Force (N)
    pub force: f64,
    /// Tangent stiffness (N/mm)
    pub stiffness: f64,
    pub active_coils: f64,
    /// Peak Wahl-corrected shear stress (MPa)
    pub shear_stress: f64,
}

impl OperatingPoint {
    /// The unloaded spring at free length.
    pub fn at_rest(label: impl Into<String>, free_length: f64) -> Self {
        OperatingPoint {
            label: label.into(),
            deflection: 0.0,
            height: free_length,
            force: 0.0,
            stiffness: 0.0,
            active_coils: 0.0,
            shear_stress: 0.0,
        }
    }

    /// Read the curve at `deflection`. Deflections past solid are clamped to
    /// the last curve point.
    pub fn from_curve(
        label: impl Into<String>,
        curve: &StiffnessCurve,
        deflection: f64,
        free_length: f64,
    ) -> Self {
        let label = label.into();
        match curve.interpolate(deflection) {
            Some(point) => OperatingPoint {
                label,
                deflection: point.deflection,
                height: free_length - point.deflection,
                force: point.force,
                stiffness: point.stiffness,
                active_coils: point.active_coils,
                shear_stress: point.peak_shear_stress,
            },
            None => OperatingPoint::at_rest(label, free_length),
        }
    }
}

/// Life class from the Goodman utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueLife {
    Infinite,
    HighCycle,
    LowCycle,
    Fail,
}

impl FatigueLife {
    pub fn from_utilization(utilization: f64) -> Self {
        if utilization <= INFINITE_LIFE_UTILIZATION {
            FatigueLife::Infinite
        } else if utilization <= HIGH_CYCLE_UTILIZATION {
            FatigueLife::HighCycle
        } else if utilization <= LOW_CYCLE_UTILIZATION {
            FatigueLife::LowCycle
        } else {
            FatigueLife::Fail
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FatigueLife::Infinite => "infinite life",
            FatigueLife::HighCycle => "high-cycle",
            FatigueLife::LowCycle => "low-cycle",
            FatigueLife::Fail => "fail",
        }
    }
}

/// Result of the ride↔bump fatigue check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueEvaluation {
    /// Mean shear stress τm (MPa)
    pub mean_stress: f64,
    /// Alternating shear stress τa (MPa)
    pub alternating_stress: f64,
    /// Peak shear stress at bump (MPa)
    pub max_stress: f64,
    /// Torsional fatigue limit τe (MPa)
    pub fatigue_limit: f64,
    /// Ultimate shear strength τu (MPa)
    pub ultimate_shear_strength: f64,
    /// Goodman utilization τa/τe + τm/τu
    pub utilization: f64,
    pub safety_factor: f64,
    pub life: FatigueLife,
    /// Simplifications behind the numbers, for display alongside them
    pub assumptions: Vec<String>,
}

/// Goodman check of the cycle between `ride` and `bump`.
pub fn evaluate_fatigue(
    ride: &OperatingPoint,
    bump: &OperatingPoint,
    material: &MaterialModel,
) -> FatigueEvaluation {
    let tau_u = material.ultimate_shear_strength_mpa().max(0.0);
    let tau_e = FATIGUE_LIMIT_RATIO * tau_u;

    let mean_stress = ride.shear_stress;
    let alternating_stress = (bump.shear_stress - ride.shear_stress).abs();
    let max_stress = ride.shear_stress.max(bump.shear_stress);

    let utilization = if tau_u > 0.0 {
        alternating_stress / tau_e + mean_stress / tau_u
    } else {
        f64::INFINITY
    };
    let safety_factor = if utilization > 0.0 {
        (1.0 / utilization).min(MAX_SAFETY_FACTOR)
    } else {
        MAX_SAFETY_FACTOR
    };

    let mut life = FatigueLife::from_utilization(utilization);
    if max_stress >= tau_u {
        life = FatigueLife::Fail;
    }

    FatigueEvaluation {
        mean_stress,
        alternating_stress,
        max_stress,
        fatigue_limit: tau_e,
        ultimate_shear_strength: tau_u,
        utilization: if utilization.is_finite() { utilization } else { f64::MAX },
        safety_factor,
        life,
        assumptions: assumptions(),
    }
}

fn assumptions() -> Vec<String> {
    vec![
        "Load cycles about the ride position with amplitude up to bump".to_string(),
        format!(
            "Torsional fatigue limit taken as {FATIGUE_LIMIT_RATIO} x ultimate shear strength \
             (shot-peened wire)"
        ),
        "Ultimate shear strength taken as 0.6 x tensile strength".to_string(),
        "Goodman mean-stress correction in shear".to_string(),
        "Stresses are Wahl-corrected at the most stressed active segment".to_string(),
        "No temperature, corrosion, relaxation or surface-defect effects".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::stiffness::StiffnessCurvePoint;

    fn point(label: &str, tau: f64) -> OperatingPoint {
        OperatingPoint {
            shear_stress: tau,
            ..OperatingPoint::at_rest(label, 300.0)
        }
    }

    #[test]
    fn test_goodman_utilization() {
        let material = MaterialModel::new("test", 79_300.0, 2000.0, 7850.0);
        // τu = 1200, τe = 420
        let fatigue = evaluate_fatigue(&point("ride", 480.0), &point("bump", 690.0), &material);
        assert!((fatigue.ultimate_shear_strength - 1200.0).abs() < 1e-9);
        assert!((fatigue.fatigue_limit - 420.0).abs() < 1e-9);
        let expected = 210.0 / 420.0 + 480.0 / 1200.0;
        assert!((fatigue.utilization - expected).abs() < 1e-12);
        assert!((fatigue.safety_factor - 1.0 / expected).abs() < 1e-12);
        assert_eq!(fatigue.life, FatigueLife::HighCycle);
        assert!(!fatigue.assumptions.is_empty());
    }

    #[test]
    fn test_life_classes() {
        assert_eq!(FatigueLife::from_utilization(0.5), FatigueLife::Infinite);
        assert_eq!(FatigueLife::from_utilization(0.95), FatigueLife::HighCycle);
        assert_eq!(FatigueLife::from_utilization(1.1), FatigueLife::LowCycle);
        assert_eq!(FatigueLife::from_utilization(1.5), FatigueLife::Fail);
    }

    #[test]
    fn test_overstress_fails_regardless_of_amplitude() {
        let material = MaterialModel::new("test", 79_300.0, 1000.0, 7850.0);
        let fatigue = evaluate_fatigue(&point("ride", 100.0), &point("bump", 650.0), &material);
        assert_eq!(fatigue.life, FatigueLife::Fail);
    }

    #[test]
    fn test_unloaded_cycle_caps_safety_factor() {
        let material = MaterialModel::default();
        let fatigue = evaluate_fatigue(&point("ride", 0.0), &point("bump", 0.0), &material);
        assert_eq!(fatigue.safety_factor, MAX_SAFETY_FACTOR);
        assert_eq!(fatigue.life, FatigueLife::Infinite);
    }

    #[test]
    fn test_zero_strength_material_is_guarded() {
        let material = MaterialModel::new("void", 79_300.0, 0.0, 7850.0);
        let fatigue = evaluate_fatigue(&point("ride", 10.0), &point("bump", 20.0), &material);
        assert!(fatigue.utilization.is_finite());
        assert_eq!(fatigue.life, FatigueLife::Fail);
    }

    #[test]
    fn test_operating_point_from_curve() {
        let curve = StiffnessCurve {
            points: vec![
                StiffnessCurvePoint {
                    deflection: 0.0,
                    stiffness: 20.0,
                    force: 0.0,
                    active_coils: 6.0,
                    peak_shear_stress: 0.0,
                },
                StiffnessCurvePoint {
                    deflection: 10.0,
                    stiffness: 20.0,
                    force: 200.0,
                    active_coils: 6.0,
                    peak_shear_stress: 100.0,
                },
            ],
            travel_to_solid: 10.0,
        };
        let ride = OperatingPoint::from_curve("ride", &curve, 5.0, 120.0);
        assert_eq!(ride.height, 115.0);
        assert!((ride.force - 100.0).abs() < 1e-12);
        assert!((ride.shear_stress - 50.0).abs() < 1e-12);

        // Past solid: clamped
        let bump = OperatingPoint::from_curve("bump", &curve, 50.0, 120.0);
        assert_eq!(bump.deflection, 10.0);
        assert_eq!(bump.force, 200.0);
    }
}
