//! # Analysis Pipeline
//!
//! Runs one design through every stage:
//!
//! ```text
//! validate ─► clamp sampling ─► centerline + frames ─► derived geometry
//!          ─► stiffness curve ─► operating points + fatigue ─► design rules
//! ```
//!
//! The pipeline is a pure function of the design; independent designs can be
//! analysed in parallel.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::analysis::analyze;
//! use spring_core::design::SpringDesign;
//! use spring_core::loads::{LoadCase, LoadTarget};
//!
//! let mut design = SpringDesign::new("Designer", "RS-001");
//! design.load_case = LoadCase::new("front")
//!     .with_ride(LoadTarget::Deflection { mm: 40.0 })
//!     .with_bump(LoadTarget::Deflection { mm: 90.0 });
//!
//! let analysis = analyze(&design).unwrap();
//! assert_eq!(analysis.findings.len(), 6);
//! assert!(analysis.fatigue.is_some());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculations::calibration::{
    self, CalibrationInput, CalibrationResult, ExperimentalData, TheoreticalParameters,
};
use crate::calculations::fatigue::{evaluate_fatigue, FatigueEvaluation, OperatingPoint};
use crate::calculations::rules::{check_design_rules, DesignRuleFinding, RuleInput, Severity};
use crate::calculations::stiffness::{StiffnessCurve, StiffnessSolver};
use crate::design::SpringDesign;
use crate::errors::SpringResult;
use crate::geometry::centerline::{build_centerline, clamp_samples_per_turn, Centerline};
use crate::geometry::metrics::{derive_geometry, DerivedGeometry};
use crate::validation::{validate, ValidationIssue};

/// Everything computed for one design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringAnalysis {
    /// Advisory validation issues
    pub warnings: Vec<ValidationIssue>,
    /// Density actually used after clamping (samples per turn)
    pub samples_per_turn: f64,
    pub centerline: Centerline,
    pub geometry: DerivedGeometry,
    pub curve: StiffnessCurve,
    /// Initial spring rate (N/mm)
    pub initial_rate: f64,
    /// Force at the reference deflection (N)
    pub reference_force: f64,
    pub reference_deflection: f64,
    pub ride: Option<OperatingPoint>,
    pub bump: Option<OperatingPoint>,
    pub fatigue: Option<FatigueEvaluation>,
    pub findings: Vec<DesignRuleFinding>,
}

impl SpringAnalysis {
    /// True when no rule reported an error.
    pub fn passes(&self) -> bool {
        self.findings.iter().all(|f| f.severity != Severity::Error)
    }

    /// Theoretical parameters for calibrating this analysis against test data.
    pub fn theoretical_parameters(&self, design: &SpringDesign) -> TheoreticalParameters {
        let working = self
            .geometry
            .segments
            .iter()
            .filter(|seg| seg.gap > 0.0)
            .fold((0.0, 0.0, 0.0), |(turns, d, dm), seg| {
                (
                    turns + seg.turns,
                    d + seg.wire_diameter * seg.turns,
                    dm + seg.mean_diameter * seg.turns,
                )
            });
        let (wire_diameter, mean_diameter) = if working.0 > 0.0 {
            (working.1 / working.0, working.2 / working.0)
        } else {
            (design.laws.wire_diameter(0.5), self.geometry.average_mean_diameter)
        };

        TheoreticalParameters {
            wire_diameter,
            mean_diameter,
            active_coils: self.geometry.active_turns,
            spring_rate: self.initial_rate,
            shear_modulus: design.material.shear_modulus_mpa,
            free_length: Some(self.geometry.free_length),
            solid_height: Some(self.geometry.solid_height),
        }
    }
}

/// Analyse a design end to end.
///
/// Fails only when validation reports a blocking error.
pub fn analyze(design: &SpringDesign) -> SpringResult<SpringAnalysis> {
    let report = validate(design);
    for issue in &report.warnings {
        warn!(field = %issue.field, "{}", issue.message);
    }
    let warnings = report.into_result()?;

    let laws = &design.laws;
    let options = &design.options;

    let samples_per_turn =
        clamp_samples_per_turn(laws.total_turns, options.samples_per_turn, options.max_samples);
    if samples_per_turn < options.samples_per_turn {
        info!(
            requested = options.samples_per_turn,
            clamped = samples_per_turn,
            max_samples = options.max_samples,
            "Sample density clamped"
        );
    }

    let centerline = build_centerline(laws, samples_per_turn);
    debug!(samples = centerline.len(), "Centerline built");

    let geometry = derive_geometry(laws, &centerline, design.material.density());
    debug!(
        free_length = geometry.free_length,
        solid_height = geometry.solid_height,
        mass_kg = geometry.mass_kg,
        "Geometry derived"
    );

    let solver = StiffnessSolver::new(&geometry, design.material.shear_modulus_mpa);
    let curve = solver.curve(solver.travel_to_solid(), options.curve_points);
    let reference_deflection =
        options.reference_deflection_fraction.clamp(0.0, 1.0) * solver.travel_to_solid();
    let reference_force = curve.force_at(reference_deflection);
    debug!(
        initial_rate = curve.initial_stiffness(),
        travel = solver.travel_to_solid(),
        reference_force,
        "Stiffness curve solved"
    );

    let free_length = geometry.free_length;
    let load_case = &design.load_case;
    let ride = load_case
        .ride_deflection(free_length)
        .map(|x| OperatingPoint::from_curve("ride", &curve, x, free_length));
    let bump = load_case
        .bump_deflection(free_length)
        .map(|x| OperatingPoint::from_curve("bump", &curve, x, free_length));

    let fatigue = bump.as_ref().map(|bump| {
        let ride = ride
            .clone()
            .unwrap_or_else(|| OperatingPoint::at_rest("free", free_length));
        evaluate_fatigue(&ride, bump, &design.material)
    });

    let findings = check_design_rules(&RuleInput {
        laws,
        centerline: &centerline,
        geometry: &geometry,
        installation: &design.installation,
        load_case,
    });
    for finding in findings.iter().filter(|f| !f.is_ok()) {
        warn!(
            rule = %finding.id,
            severity = ?finding.severity,
            value = finding.value,
            limit = finding.limit,
            "{}",
            finding.message
        );
    }

    info!(
        design = %design.meta.design_code,
        samples = centerline.len(),
        free_length,
        initial_rate = curve.initial_stiffness(),
        "Analysis complete"
    );

    Ok(SpringAnalysis {
        warnings,
        samples_per_turn,
        initial_rate: curve.initial_stiffness(),
        reference_force,
        reference_deflection,
        centerline,
        geometry,
        curve,
        ride,
        bump,
        fatigue,
        findings,
    })
}

/// Calibrate an analysed design against measured data.
pub fn calibrate_design(
    design: &SpringDesign,
    analysis: &SpringAnalysis,
    label: impl Into<String>,
    experimental: ExperimentalData,
) -> SpringResult<CalibrationResult> {
    let input = CalibrationInput {
        label: label.into(),
        experimental,
        theoretical: analysis.theoretical_parameters(design),
    };
    let result = calibration::calculate(&input)?;
    info!(
        label = %input.label,
        quality = ?result.quality,
        stiffness_ratio = result.effective.stiffness_ratio,
        "Calibration complete"
    );
    Ok(result)
}
