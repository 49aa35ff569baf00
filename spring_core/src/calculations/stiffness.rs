//! # Stiffness Solver
//!
//! Nonlinear force-deflection behaviour of a variable-pitch spring with
//! progressive coil bind.
//!
//! ## Model
//!
//! Every centerline segment is a short coil spring in series with the rest:
//!
//! ```text
//! cᵢ = 8·Dᵢ³·Δnᵢ / (G·dᵢ⁴)          compliance (mm/N)
//! Fᵢ* = gapᵢ·Δnᵢ / cᵢ                force at which segment i closes
//! ```
//!
//! Under a common force F every active segment deflects `F·cᵢ`. Segments bind in
//! order of `Fᵢ*`; once bound they contribute their full travel `gapᵢ·Δnᵢ` and
//! drop out of the compliance sum, so the remaining coils stiffen. Stiffness can
//! therefore only rise with deflection. Segments with no gap at rest (closed end
//! turns) are dead from the start.
//!
//! Force is the trapezoidal integral of stiffness over deflection, and the shear
//! stress at each point is the Wahl-corrected maximum over all live segments.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::calculations::stiffness::StiffnessSolver;
//! use spring_core::geometry::{build_centerline, derive_geometry, GeometryLaws};
//! use spring_core::materials::MaterialModel;
//!
//! let laws = GeometryLaws::default();
//! let material = MaterialModel::default();
//! let centerline = build_centerline(&laws, 60.0);
//! let geometry = derive_geometry(&laws, &centerline, material.density());
//!
//! let solver = StiffnessSolver::new(&geometry, material.shear_modulus_mpa);
//! let curve = solver.curve(solver.travel_to_solid(), 101);
//! assert!(curve.is_monotonic());
//! assert!(curve.is_self_consistent(1e-9));
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::geometry::metrics::{CoilSegment, DerivedGeometry, MIN_WIRE_DIAMETER};

/// Default number of points on a stiffness curve.
pub const DEFAULT_CURVE_POINTS: usize = 101;

/// Wahl curvature correction `Kw = (4C − 1)/(4C − 4) + 0.615/C`.
///
/// Returns 1.0 for `C ≤ 1` where the formula is singular.
pub fn wahl_factor(spring_index: f64) -> f64 {
    if !(spring_index > 1.0) || !spring_index.is_finite() {
        return 1.0;
    }
    let c = spring_index;
    (4.0 * c - 1.0) / (4.0 * c - 4.0) + 0.615 / c
}

/// Wahl-corrected torsional shear stress `τ = Kw·8·F·D/(π·d³)` in MPa.
pub fn shear_stress(force: f64, mean_diameter: f64, wire_diameter: f64) -> f64 {
    if wire_diameter <= MIN_WIRE_DIAMETER {
        return 0.0;
    }
    let kw = wahl_factor(mean_diameter / wire_diameter);
    kw * 8.0 * force * mean_diameter / (PI * wire_diameter.powi(3))
}

/// One point on the deflection→stiffness→force curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StiffnessCurvePoint {
    /// Deflection from free length (mm)
    pub deflection: f64,
    /// Tangent stiffness (N/mm)
    pub stiffness: f64,
    /// Force (N)
    pub force: f64,
    /// Turns still free to deflect
    pub active_coils: f64,
    /// Peak Wahl-corrected shear stress (MPa)
    pub peak_shear_stress: f64,
}

/// A sampled stiffness curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StiffnessCurve {
    pub points: Vec<StiffnessCurvePoint>,
    /// Travel from free length to solid (mm)
    pub travel_to_solid: f64,
}

impl StiffnessCurve {
    /// Stiffness at zero deflection (N/mm)
    pub fn initial_stiffness(&self) -> f64 {
        self.points.first().map_or(0.0, |p| p.stiffness)
    }

    /// Largest deflection covered by the curve
    pub fn max_deflection(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.deflection)
    }

    /// Linear interpolation at `deflection`, clamped to the sampled range.
    pub fn interpolate(&self, deflection: f64) -> Option<StiffnessCurvePoint> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if deflection <= first.deflection {
            return Some(*first);
        }
        if deflection >= last.deflection {
            return Some(*last);
        }
        let i = self.points.partition_point(|p| p.deflection <= deflection);
        let (a, b) = (&self.points[i - 1], &self.points[i]);
        let t = (deflection - a.deflection) / (b.deflection - a.deflection);
        let mix = |lo: f64, hi: f64| lo + (hi - lo) * t;
        Some(StiffnessCurvePoint {
            deflection,
            stiffness: a.stiffness,
            force: mix(a.force, b.force),
            active_coils: a.active_coils,
            peak_shear_stress: mix(a.peak_shear_stress, b.peak_shear_stress),
        })
    }

    /// Force at `deflection` (N), 0 for an empty curve.
    pub fn force_at(&self, deflection: f64) -> f64 {
        self.interpolate(deflection).map_or(0.0, |p| p.force)
    }

    /// Stiffness never decreases with deflection.
    pub fn is_monotonic(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[1].stiffness >= w[0].stiffness * (1.0 - 1e-12))
    }

    /// ΔF between neighbours equals mean stiffness × Δx within `relative_tolerance`.
    pub fn is_self_consistent(&self, relative_tolerance: f64) -> bool {
        self.points.windows(2).all(|w| {
            let dx = w[1].deflection - w[0].deflection;
            let expected = 0.5 * (w[0].stiffness + w[1].stiffness) * dx;
            let actual = w[1].force - w[0].force;
            (actual - expected).abs() <= relative_tolerance * expected.abs().max(1e-9)
        })
    }
}

/// Series-spring data for one live segment.
#[derive(Debug, Clone, Copy)]
struct LiveSegment {
    compliance: f64,
    bind_force: f64,
    travel: f64,
    turns: f64,
    mean_diameter: f64,
    wire_diameter: f64,
}

/// Contact state at a given deflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactState {
    pub stiffness: f64,
    pub force: f64,
    pub active_coils: f64,
    /// Every live segment has closed
    pub solid: bool,
}

/// Coil-bind solver over the segments of one derived geometry.
#[derive(Debug, Clone)]
pub struct StiffnessSolver {
    /// Live segments sorted by bind force
    segments: Vec<LiveSegment>,
    /// `remaining_compliance[i]` sums the compliance of segments `i..`
    remaining_compliance: Vec<f64>,
    /// `remaining_turns[i]` sums the turns of segments `i..`
    remaining_turns: Vec<f64>,
    total_travel: f64,
}

impl StiffnessSolver {
    pub fn new(geometry: &DerivedGeometry, shear_modulus_mpa: f64) -> Self {
        let mut segments: Vec<LiveSegment> = geometry
            .segments
            .iter()
            .filter_map(|seg| live_segment(seg, shear_modulus_mpa))
            .collect();
        segments.sort_by(|a, b| a.bind_force.total_cmp(&b.bind_force));

        let mut remaining_compliance = vec![0.0; segments.len() + 1];
        let mut remaining_turns = vec![0.0; segments.len() + 1];
        for (i, seg) in segments.iter().enumerate().rev() {
            remaining_compliance[i] = remaining_compliance[i + 1] + seg.compliance;
            remaining_turns[i] = remaining_turns[i + 1] + seg.turns;
        }

        StiffnessSolver {
            total_travel: segments.iter().map(|s| s.travel).sum(),
            segments,
            remaining_compliance,
            remaining_turns,
        }
    }

    /// Axial travel from free length to solid (mm).
    pub fn travel_to_solid(&self) -> f64 {
        self.total_travel
    }

    /// Stiffness at free length (N/mm).
    pub fn initial_stiffness(&self) -> f64 {
        let compliance = self.remaining_compliance[0];
        if compliance > 0.0 {
            1.0 / compliance
        } else {
            0.0
        }
    }

    /// Exact piecewise-linear contact state at `deflection`.
    pub fn state_at(&self, deflection: f64) -> ContactState {
        let x = deflection.max(0.0);
        let mut bound_travel = 0.0;
        let mut last_stiffness = self.initial_stiffness();
        let mut last_bind_force = 0.0;

        for (i, seg) in self.segments.iter().enumerate() {
            let compliance = self.remaining_compliance[i];
            if x < bound_travel + seg.bind_force * compliance {
                return ContactState {
                    stiffness: 1.0 / compliance,
                    force: (x - bound_travel) / compliance,
                    active_coils: self.remaining_turns[i],
                    solid: false,
                };
            }
            last_stiffness = 1.0 / compliance;
            last_bind_force = seg.bind_force;
            bound_travel += seg.travel;
        }

        ContactState {
            stiffness: last_stiffness,
            force: last_bind_force,
            active_coils: 0.0,
            solid: true,
        }
    }

    /// Peak Wahl-corrected shear stress under `force`. Bound segments carry no
    /// torsion beyond what they held when they closed.
    pub fn peak_shear_stress(&self, force: f64) -> f64 {
        self.segments
            .iter()
            .map(|seg| {
                shear_stress(force.min(seg.bind_force), seg.mean_diameter, seg.wire_diameter)
            })
            .fold(0.0, f64::max)
    }

    /// Sample the curve on `points` evenly spaced deflections up to
    /// `max_deflection` (capped at the travel to solid).
    pub fn curve(&self, max_deflection: f64, points: usize) -> StiffnessCurve {
        let travel = self.total_travel;
        let x_max = max_deflection.clamp(0.0, travel);
        let points = points.max(2);

        if self.segments.is_empty() || x_max <= 0.0 {
            let stiffness = self.initial_stiffness();
            return StiffnessCurve {
                points: vec![StiffnessCurvePoint {
                    deflection: 0.0,
                    stiffness,
                    force: 0.0,
                    active_coils: self.remaining_turns[0],
                    peak_shear_stress: 0.0,
                }],
                travel_to_solid: travel,
            };
        }

        let step = x_max / (points - 1) as f64;
        let mut curve: Vec<StiffnessCurvePoint> = Vec::with_capacity(points);
        for j in 0..points {
            let deflection = if j + 1 == points { x_max } else { j as f64 * step };
            let state = self.state_at(deflection);
            let force = match curve.last() {
                Some(prev) => {
                    prev.force
                        + 0.5 * (prev.stiffness + state.stiffness) * (deflection - prev.deflection)
                }
                None => 0.0,
            };
            curve.push(StiffnessCurvePoint {
                deflection,
                stiffness: state.stiffness,
                force,
                active_coils: state.active_coils,
                peak_shear_stress: self.peak_shear_stress(force),
            });
        }

        StiffnessCurve {
            points: curve,
            travel_to_solid: travel,
        }
    }
}

fn live_segment(seg: &CoilSegment, shear_modulus_mpa: f64) -> Option<LiveSegment> {
    let usable = seg.gap > 0.0
        && seg.turns > 0.0
        && seg.wire_diameter > MIN_WIRE_DIAMETER
        && seg.mean_diameter > 0.0
        && shear_modulus_mpa > 0.0;
    if !usable {
        return None;
    }
    let compliance = 8.0 * seg.mean_diameter.powi(3) * seg.turns
        / (shear_modulus_mpa * seg.wire_diameter.powi(4));
    let travel = seg.travel_to_bind();
    Some(LiveSegment {
        compliance,
        bind_force: travel / compliance,
        travel,
        turns: seg.turns,
        mean_diameter: seg.mean_diameter,
        wire_diameter: seg.wire_diameter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::centerline::build_centerline;
    use crate::geometry::laws::{GeometryLaws, MeanDiameterLaw, PitchStyle, WireDiameterLaw};
    use crate::geometry::metrics::derive_geometry;
    use crate::units::KilogramsPerCubicMeter;

    const G: f64 = 79_300.0;

    fn solver_for(laws: &GeometryLaws, samples_per_turn: f64) -> StiffnessSolver {
        let centerline = build_centerline(laws, samples_per_turn);
        let geometry = derive_geometry(laws, &centerline, KilogramsPerCubicMeter(7850.0));
        StiffnessSolver::new(&geometry, G)
    }

    fn progressive_laws() -> GeometryLaws {
        let mut laws = GeometryLaws::default();
        laws.total_turns = 9.0;
        laws.mean_diameter = MeanDiameterLaw::uniform(100.0);
        laws.wire_diameter = WireDiameterLaw::new(11.0, 12.5, 11.0);
        laws.pitch.style = PitchStyle::Progressive;
        laws.pitch.working_min = 18.0;
        laws.pitch.working_max = 42.0;
        laws
    }

    #[test]
    fn test_wahl_reference_values() {
        assert!((wahl_factor(5.0) - 1.3105).abs() < 1e-4);
        assert!((wahl_factor(10.0) - 1.1448).abs() < 1e-4);
        assert_eq!(wahl_factor(1.0), 1.0);
        assert_eq!(wahl_factor(0.5), 1.0);
        assert_eq!(wahl_factor(f64::NAN), 1.0);
    }

    #[test]
    fn test_shear_stress_guards_thin_wire() {
        assert_eq!(shear_stress(1000.0, 50.0, 0.0), 0.0);
        let tau = shear_stress(1000.0, 50.0, 5.0);
        let nominal = 8.0 * 1000.0 * 50.0 / (PI * 125.0);
        assert!((tau / nominal - wahl_factor(10.0)).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_spring_matches_classic_rate() {
        let mut laws = GeometryLaws::default();
        laws.total_turns = 8.0;
        laws.pitch.closed_turns_start = 0.0;
        laws.pitch.closed_turns_end = 0.0;
        laws.pitch.working_min = 30.0;
        laws.pitch.working_max = 30.0;
        let solver = solver_for(&laws, 60.0);

        // k = G d⁴ / (8 D³ Na)
        let expected = G * 12.0_f64.powi(4) / (8.0 * 100.0_f64.powi(3) * 8.0);
        assert!((solver.initial_stiffness() - expected).abs() / expected < 1e-9);
        assert!((solver.travel_to_solid() - 8.0 * 18.0).abs() < 1e-6);

        let curve = solver.curve(100.0, 51);
        assert!((curve.force_at(50.0) - expected * 50.0).abs() / (expected * 50.0) < 1e-9);
    }

    #[test]
    fn test_progressive_stiffness_is_non_decreasing() {
        let solver = solver_for(&progressive_laws(), 60.0);
        let curve = solver.curve(solver.travel_to_solid(), 201);
        assert!(curve.is_monotonic());
        for w in curve.points.windows(2) {
            assert!(w[1].deflection > w[0].deflection);
            assert!(w[1].stiffness >= w[0].stiffness);
            assert!(w[1].active_coils <= w[0].active_coils + 1e-12);
        }
        let last = curve.points.last().unwrap();
        assert!(last.stiffness > 1.5 * curve.initial_stiffness());
    }

    #[test]
    fn test_force_is_trapezoidal_integral() {
        let solver = solver_for(&progressive_laws(), 60.0);
        let curve = solver.curve(0.9 * solver.travel_to_solid(), 101);
        assert!(curve.is_self_consistent(1e-9));
        assert_eq!(curve.points[0].force, 0.0);
    }

    #[test]
    fn test_mesh_convergence() {
        for laws in [GeometryLaws::default(), progressive_laws()] {
            let coarse = solver_for(&laws, 60.0);
            let fine = solver_for(&laws, 120.0);
            let reference = 0.6 * coarse.travel_to_solid().min(fine.travel_to_solid());
            let f_coarse = coarse.curve(reference, 101).force_at(reference);
            let f_fine = fine.curve(reference, 101).force_at(reference);
            assert!(f_coarse > 0.0);
            assert!((f_coarse - f_fine).abs() / f_fine < 0.02);
        }
    }

    #[test]
    fn test_state_beyond_solid() {
        let solver = solver_for(&progressive_laws(), 30.0);
        let state = solver.state_at(solver.travel_to_solid() + 10.0);
        assert!(state.solid);
        assert_eq!(state.active_coils, 0.0);
        assert!(state.stiffness.is_finite());
    }

    #[test]
    fn test_curve_without_live_segments() {
        let mut laws = GeometryLaws::default();
        laws.pitch.working_min = 11.0;
        laws.pitch.working_max = 11.0;
        let solver = solver_for(&laws, 30.0);
        assert_eq!(solver.travel_to_solid(), 0.0);
        let curve = solver.curve(50.0, 101);
        assert_eq!(curve.points.len(), 1);
        assert_eq!(curve.force_at(10.0), 0.0);
    }

    #[test]
    fn test_peak_stress_tracks_force() {
        let solver = solver_for(&progressive_laws(), 60.0);
        let curve = solver.curve(0.5 * solver.travel_to_solid(), 21);
        for w in curve.points.windows(2) {
            assert!(w[1].peak_shear_stress >= w[0].peak_shear_stress);
        }
        assert!(curve.points.last().unwrap().peak_shear_stress > 0.0);
    }
}
