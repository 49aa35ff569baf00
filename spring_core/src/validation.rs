//! # Design Validation
//!
//! Checks a [`SpringDesign`] before analysis. Problems are split into blocking
//! errors and advisory warnings so a caller can show everything at once;
//! nothing here fails. [`ValidationReport::into_result`] converts to a
//! [`SpringResult`] for `?` propagation.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::design::SpringDesign;
//! use spring_core::validation::validate;
//!
//! let mut design = SpringDesign::new("Designer", "RS-001");
//! design.laws.wire_diameter.mid = 120.0;
//!
//! let report = validate(&design);
//! assert!(!report.is_valid());
//! assert!(report.errors.iter().any(|e| e.field == "laws.wire_diameter"));
//! ```

use serde::{Deserialize, Serialize};

use crate::design::SpringDesign;
use crate::errors::{SpringError, SpringResult};
use crate::geometry::laws::PITCH_REPORT_SAMPLES;
use crate::loads::GuideType;

/// Fewest total turns a helical spring can have.
pub const MIN_TOTAL_TURNS: f64 = 2.0;

/// Spring index below which a warning is raised at validation time.
pub const MIN_RECOMMENDED_INDEX: f64 = 4.0;

/// One problem, addressed by a dotted field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Blocking: analysis would be meaningless
    pub errors: Vec<ValidationIssue>,
    /// Advisory: analysis runs but the design is questionable
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(field, message));
    }

    fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(field, message));
    }

    /// The first blocking error as `SpringError::InvalidInput`, or the
    /// warnings on success.
    pub fn into_result(self) -> SpringResult<Vec<ValidationIssue>> {
        match self.errors.into_iter().next() {
            Some(issue) => Err(SpringError::invalid_input(issue.field, "", issue.message)),
            None => Ok(self.warnings),
        }
    }
}

/// Validate a design.
pub fn validate(design: &SpringDesign) -> ValidationReport {
    let mut report = ValidationReport::default();
    let laws = &design.laws;

    if !(laws.total_turns >= MIN_TOTAL_TURNS && laws.total_turns.is_finite()) {
        report.error(
            "laws.total_turns",
            format!("Total turns must be at least {MIN_TOTAL_TURNS} (got {})", laws.total_turns),
        );
    }

    let mean = laws.mean_diameter;
    let wire = laws.wire_diameter;
    for (name, value) in [("start", mean.start), ("mid", mean.mid), ("end", mean.end)] {
        if !(value > 0.0) {
            report.error(
                format!("laws.mean_diameter.{name}"),
                format!("Mean diameter must be positive (got {value})"),
            );
        }
    }
    for (name, value) in [("start", wire.start), ("mid", wire.mid), ("end", wire.end)] {
        if !(value > 0.0) {
            report.error(
                format!("laws.wire_diameter.{name}"),
                format!("Wire diameter must be positive (got {value})"),
            );
        }
    }
    if !mean.mid_matches_shape() {
        report.warning(
            "laws.mean_diameter.mid",
            format!(
                "Mid diameter {} is on the far side of the chord for a {:?} shape",
                mean.mid, mean.shape
            ),
        );
    }

    // Wire against coil diameter along the whole spring
    let (min_index, wire_too_thick) = (0..=PITCH_REPORT_SAMPLES)
        .map(|i| {
            let s = i as f64 / PITCH_REPORT_SAMPLES as f64;
            (laws.mean_diameter(s), laws.wire_diameter(s))
        })
        .fold((f64::INFINITY, false), |(index, thick), (d_mean, d_wire)| {
            let c = if d_wire > 0.0 { d_mean / d_wire } else { f64::INFINITY };
            (index.min(c), thick || d_wire >= d_mean)
        });
    if wire_too_thick {
        report.error(
            "laws.wire_diameter",
            "Wire diameter must be less than the mean coil diameter everywhere",
        );
    } else if min_index < MIN_RECOMMENDED_INDEX {
        report.warning(
            "laws.wire_diameter",
            format!("Minimum spring index {min_index:.2} is below {MIN_RECOMMENDED_INDEX}"),
        );
    }

    let pitch = &laws.pitch;
    if !(pitch.working_min > 0.0) {
        report.error("laws.pitch.working_min", "Working pitch bounds must be positive");
    }
    if !(pitch.working_max > 0.0) {
        report.error("laws.pitch.working_max", "Working pitch bounds must be positive");
    }
    if pitch.working_min > pitch.working_max {
        report.warning(
            "laws.pitch.working_min",
            "working_min exceeds working_max; the envelope is inverted",
        );
    }
    if pitch.working_min > 0.0 && pitch.working_min <= wire.max_control() {
        report.warning(
            "laws.pitch.working_min",
            format!(
                "Working pitch {} leaves no gap for {} mm wire",
                pitch.working_min,
                wire.max_control()
            ),
        );
    }
    if pitch.closed_turns_start < 0.0 {
        report.error("laws.pitch.closed_turns_start", "Closed turns cannot be negative");
    }
    if pitch.closed_turns_end < 0.0 {
        report.error("laws.pitch.closed_turns_end", "Closed turns cannot be negative");
    }
    if pitch.closed_turns_start.max(0.0) + pitch.closed_turns_end.max(0.0) >= laws.total_turns {
        report.error("laws.pitch", "Closed turns leave no working turns");
    }
    if pitch.transition_sharpness < 1.0 {
        report.warning(
            "laws.pitch.transition_sharpness",
            "Sharpness below 1 gives a cusp-like pitch profile",
        );
    }
    if pitch.closed_pitch_factor < 1.0 {
        report.warning(
            "laws.pitch.closed_pitch_factor",
            "Closed pitch below one wire diameter overlaps adjacent coils",
        );
    }

    let material = &design.material;
    for (field, value) in [
        ("material.shear_modulus_mpa", material.shear_modulus_mpa),
        ("material.tensile_strength_mpa", material.tensile_strength_mpa),
        ("material.density_kg_m3", material.density_kg_m3),
    ] {
        if !(value > 0.0) {
            report.error(field, format!("Must be positive (got {value})"));
        }
    }

    let installation = &design.installation;
    if installation.guide != GuideType::None {
        match installation.guide_diameter_mm {
            None => report.warning(
                "installation.guide_diameter_mm",
                "Guide type set without a guide diameter",
            ),
            Some(d) if !(d > 0.0) => {
                report.error("installation.guide_diameter_mm", "Guide diameter must be positive")
            }
            Some(_) => {}
        }
    }

    if design.load_case.min_solid_margin_mm < 0.0 {
        report.error("load_case.min_solid_margin_mm", "Solid-height margin cannot be negative");
    }
    if design.load_case.bump.is_none() {
        report.warning(
            "load_case.bump",
            "No bump target; fatigue and solid margin are not evaluated",
        );
    }

    let options = &design.options;
    if !(options.samples_per_turn > 0.0 && options.samples_per_turn.is_finite()) {
        report.error("options.samples_per_turn", "Sample density must be positive and finite");
    }
    if options.curve_points < 2 {
        report.error("options.curve_points", "At least two curve points are needed");
    }
    if !(0.0..=1.0).contains(&options.reference_deflection_fraction) {
        report.warning(
            "options.reference_deflection_fraction",
            "Reference fraction is clamped to [0, 1]",
        );
    }

    report
}
