//! # Design Rules
//!
//! Deterministic manufacturability and safety checks. [`check_design_rules`] is
//! total: every rule yields exactly one finding, in a fixed order, whatever the
//! geometry looks like.
//!
//! | id | checks |
//! |----|--------|
//! | `spring_index` | local D/d everywhere |
//! | `buckling` | free length / mean diameter, unguided only |
//! | `guide_clearance` | rod inside the coil ID, or bore outside the OD |
//! | `solid_height_margin` | clearance to solid at bump |
//! | `grind_plane_start` | start cut plane inside the coil body |
//! | `grind_plane_end` | end cut plane inside the coil body |

use serde::{Deserialize, Serialize};

use crate::geometry::centerline::Centerline;
use crate::geometry::laws::GeometryLaws;
use crate::geometry::metrics::{DerivedGeometry, MIN_WIRE_DIAMETER};
use crate::loads::{GuideType, InstallationConstraints, LoadCase};

/// Spring index below which coiling is impractical.
pub const SPRING_INDEX_ERROR: f64 = 3.0;

/// Spring index below which coiling is difficult and stress concentration high.
pub const SPRING_INDEX_WARNING: f64 = 4.0;

/// Free length / mean diameter above which an unguided spring may buckle.
pub const BUCKLING_SLENDERNESS_LIMIT: f64 = 4.0;

/// Law resolution for diameter extrema when no segments are available.
const LAW_SCAN_SAMPLES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

/// One rule outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRuleFinding {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    /// Measured value
    pub value: f64,
    /// Threshold it was compared against
    pub limit: f64,
}

impl DesignRuleFinding {
    fn new(
        id: &str,
        severity: Severity,
        message: impl Into<String>,
        value: f64,
        limit: f64,
    ) -> Self {
        DesignRuleFinding {
            id: id.to_string(),
            severity,
            message: message.into(),
            value,
            limit,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.severity == Severity::Ok
    }
}

/// Everything the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub laws: &'a GeometryLaws,
    pub centerline: &'a Centerline,
    pub geometry: &'a DerivedGeometry,
    pub installation: &'a InstallationConstraints,
    pub load_case: &'a LoadCase,
}

/// Run every rule, in table order.
pub fn check_design_rules(input: &RuleInput<'_>) -> Vec<DesignRuleFinding> {
    vec![
        check_spring_index(input),
        check_buckling(input),
        check_guide_clearance(input),
        check_solid_height_margin(input),
        check_grind_plane(input, GrindEnd::Start),
        check_grind_plane(input, GrindEnd::End),
    ]
}

/// Worst severity in a finding list.
pub fn worst_severity(findings: &[DesignRuleFinding]) -> Severity {
    findings.iter().map(|f| f.severity).max().unwrap_or(Severity::Ok)
}

/// (min D/d, min D − d, max D + d) over the segments, or over the laws when
/// the centerline is degenerate.
fn diameter_extrema(input: &RuleInput<'_>) -> (f64, f64, f64) {
    let pairs: Vec<(f64, f64)> = if input.geometry.segments.is_empty() {
        (0..=LAW_SCAN_SAMPLES)
            .map(|i| {
                let s = i as f64 / LAW_SCAN_SAMPLES as f64;
                (input.laws.mean_diameter(s), input.laws.wire_diameter(s))
            })
            .collect()
    } else {
        input
            .geometry
            .segments
            .iter()
            .map(|seg| (seg.mean_diameter, seg.wire_diameter))
            .collect()
    };

    pairs.iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(index, inner, outer), &(mean, wire)| {
            let c = if wire > MIN_WIRE_DIAMETER { mean / wire } else { 0.0 };
            (index.min(c), inner.min(mean - wire), outer.max(mean + wire))
        },
    )
}

fn check_spring_index(input: &RuleInput<'_>) -> DesignRuleFinding {
    let (index, _, _) = diameter_extrema(input);
    let index = if index.is_finite() { index } else { 0.0 };
    let (severity, message) = if index < SPRING_INDEX_ERROR {
        (
            Severity::Error,
            format!(
                "Minimum spring index {index:.2} is below {SPRING_INDEX_ERROR}; \
                 the wire cannot be coiled"
            ),
        )
    } else if index < SPRING_INDEX_WARNING {
        (
            Severity::Warning,
            format!("Minimum spring index {index:.2} is tight; expect high curvature stress"),
        )
    } else {
        (Severity::Ok, format!("Minimum spring index {index:.2}"))
    };
    DesignRuleFinding::new("spring_index", severity, message, index, SPRING_INDEX_WARNING)
}

fn check_buckling(input: &RuleInput<'_>) -> DesignRuleFinding {
    let mean = input.geometry.average_mean_diameter;
    let slenderness = if mean > 0.0 {
        input.geometry.free_length / mean
    } else {
        0.0
    };

    let (severity, message) = if input.installation.is_guided() {
        (
            Severity::Ok,
            format!("Guided installation; slenderness {slenderness:.2} is laterally supported"),
        )
    } else if slenderness > BUCKLING_SLENDERNESS_LIMIT {
        (
            Severity::Error,
            format!(
                "Unguided slenderness {slenderness:.2} exceeds {BUCKLING_SLENDERNESS_LIMIT}; \
                 spring may buckle"
            ),
        )
    } else {
        (
            Severity::Ok,
            format!("Slenderness {slenderness:.2} is stable without guidance"),
        )
    };
    DesignRuleFinding::new(
        "buckling",
        severity,
        message,
        slenderness,
        BUCKLING_SLENDERNESS_LIMIT,
    )
}

fn check_guide_clearance(input: &RuleInput<'_>) -> DesignRuleFinding {
    const ID: &str = "guide_clearance";
    let (_, inner, outer) = diameter_extrema(input);
    let guide = input.installation.guide;
    let free_standing =
        || DesignRuleFinding::new(ID, Severity::Ok, "Free-standing; no guide to clear", 0.0, 0.0);

    let Some(diameter) = input.installation.guide_diameter_mm else {
        return match guide {
            GuideType::None => free_standing(),
            _ => DesignRuleFinding::new(
                ID,
                Severity::Warning,
                "Guide type set but no guide diameter given",
                0.0,
                0.0,
            ),
        };
    };

    match guide {
        GuideType::None => free_standing(),
        GuideType::Rod => {
            let clearance = inner - diameter;
            let (severity, message) = if clearance > 0.0 {
                (
                    Severity::Ok,
                    format!("Rod clears the minimum inner diameter by {clearance:.2} mm"),
                )
            } else {
                (
                    Severity::Error,
                    format!(
                        "Rod {diameter:.2} mm does not fit the minimum inner diameter \
                         {inner:.2} mm"
                    ),
                )
            };
            DesignRuleFinding::new(ID, severity, message, diameter, inner)
        }
        GuideType::Bore => {
            let clearance = diameter - outer;
            let (severity, message) = if clearance > 0.0 {
                (
                    Severity::Ok,
                    format!("Bore clears the maximum outer diameter by {clearance:.2} mm"),
                )
            } else {
                (
                    Severity::Error,
                    format!(
                        "Bore {diameter:.2} mm is tighter than the maximum outer diameter \
                         {outer:.2} mm"
                    ),
                )
            };
            DesignRuleFinding::new(ID, severity, message, diameter, outer)
        }
    }
}

fn check_solid_height_margin(input: &RuleInput<'_>) -> DesignRuleFinding {
    const ID: &str = "solid_height_margin";
    let geometry = input.geometry;
    let required = input.load_case.min_solid_margin_mm;

    let Some(bump) = input.load_case.bump_deflection(geometry.free_length) else {
        let margin = geometry.free_length - geometry.solid_height;
        return DesignRuleFinding::new(
            ID,
            Severity::Warning,
            format!("No bump target; total travel to solid is {margin:.2} mm"),
            margin,
            required,
        );
    };

    let clearance = geometry.free_length - bump - geometry.solid_height;
    if clearance >= required {
        DesignRuleFinding::new(
            ID,
            Severity::Ok,
            format!("{clearance:.2} mm above solid at bump"),
            clearance,
            required,
        )
    } else {
        DesignRuleFinding::new(
            ID,
            Severity::Error,
            format!("Only {clearance:.2} mm above solid at bump; {required:.2} mm required"),
            clearance,
            required,
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum GrindEnd {
    Start,
    End,
}

fn check_grind_plane(input: &RuleInput<'_>, end: GrindEnd) -> DesignRuleFinding {
    let grinding = &input.laws.end_grinding;
    let (id, ground, offset, label) = match end {
        GrindEnd::Start => (
            "grind_plane_start",
            grinding.ground_start,
            grinding.offset_turns_start,
            "Start",
        ),
        GrindEnd::End => (
            "grind_plane_end",
            grinding.ground_end,
            grinding.offset_turns_end,
            "End",
        ),
    };

    if !ground {
        return DesignRuleFinding::new(id, Severity::Ok, format!("{label} not ground"), 0.0, 0.0);
    }

    let turns = input.laws.total_turns;
    if input.centerline.is_degenerate() || !(turns > 0.0) || !offset.is_finite() {
        return DesignRuleFinding::new(
            id,
            Severity::Warning,
            format!("{label} grind plane miss: no centerline to place it on"),
            0.0,
            0.0,
        );
    }

    let s = match end {
        GrindEnd::Start => offset / turns,
        GrindEnd::End => 1.0 - offset / turns,
    };
    let z = input.centerline.z_at(s);
    let (z_min, z_max) = input.centerline.axial_range();
    let bound = match end {
        GrindEnd::Start => z_min,
        GrindEnd::End => z_max,
    };

    if z >= z_min && z <= z_max {
        DesignRuleFinding::new(
            id,
            Severity::Ok,
            format!("{label} grind plane at z = {z:.2} mm"),
            z,
            bound,
        )
    } else {
        DesignRuleFinding::new(
            id,
            Severity::Warning,
            format!(
                "{label} grind plane at z = {z:.2} mm misses the coil body \
                 [{z_min:.2}, {z_max:.2}]"
            ),
            z,
            bound,
        )
    }
}
