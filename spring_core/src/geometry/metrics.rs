//! # Derived Geometry
//!
//! Scalar metrics and the per-segment breakdown derived from a centerline.
//! Segments are the intervals between consecutive centerline samples; the
//! stiffness solver treats each one as a short coil spring in series.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::geometry::centerline::Centerline;
use crate::geometry::laws::GeometryLaws;
use crate::units::{CubicMillimeters, KilogramsPerCubicMeter};

/// Relative wire-diameter spread below which the wire counts as uniform.
pub const UNIFORM_WIRE_TOLERANCE: f64 = 0.01;

/// Wire diameters below this are treated as missing when forming ratios.
pub const MIN_WIRE_DIAMETER: f64 = 1e-9;

/// One centerline interval, evaluated at its midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoilSegment {
    pub s_start: f64,
    pub s_end: f64,
    /// Turn span of the segment
    pub turns: f64,
    /// Local pitch (mm/turn)
    pub pitch: f64,
    pub wire_diameter: f64,
    pub mean_diameter: f64,
    /// Axial clearance per turn, `pitch − wire_diameter`
    pub gap: f64,
    /// Centerline length of the segment (mm)
    pub wire_length: f64,
}

impl CoilSegment {
    /// Spring index D/d, or `None` for a vanishing wire.
    pub fn spring_index(&self) -> Option<f64> {
        (self.wire_diameter > MIN_WIRE_DIAMETER).then(|| self.mean_diameter / self.wire_diameter)
    }

    /// Axial travel available before this segment binds (mm).
    pub fn travel_to_bind(&self) -> f64 {
        (self.gap * self.turns).max(0.0)
    }
}

/// Scalar metrics and segment list for one spring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedGeometry {
    /// Centerline length (mm)
    pub wire_length: f64,
    /// Uncompressed axial length of the centerline (mm)
    pub free_length: f64,
    /// Fully compressed height (mm)
    pub solid_height: f64,
    pub wire_volume_mm3: f64,
    pub mass_kg: f64,
    pub min_pitch: f64,
    pub max_pitch: f64,
    pub min_wire_radius: f64,
    pub max_wire_radius: f64,
    pub min_spring_index: f64,
    pub max_spring_index: f64,
    /// Turn-weighted average mean coil diameter (mm)
    pub average_mean_diameter: f64,
    /// Working (active) turns between the closed zones
    pub active_turns: f64,
    pub segments: Vec<CoilSegment>,
}

/// Derive metrics from the laws and their sampled centerline.
///
/// A degenerate centerline yields zeroed metrics and no segments; pitch
/// extrema are still reported since they come straight from the laws.
pub fn derive_geometry(
    laws: &GeometryLaws,
    centerline: &Centerline,
    density: KilogramsPerCubicMeter,
) -> DerivedGeometry {
    let (min_pitch, max_pitch) = laws.pitch_extrema();
    if centerline.is_degenerate() {
        let radius = centerline.samples.first().map_or(0.0, |s| s.wire_radius);
        return DerivedGeometry {
            wire_length: 0.0,
            free_length: 0.0,
            solid_height: 0.0,
            wire_volume_mm3: 0.0,
            mass_kg: 0.0,
            min_pitch,
            max_pitch,
            min_wire_radius: radius,
            max_wire_radius: radius,
            min_spring_index: 0.0,
            max_spring_index: 0.0,
            average_mean_diameter: laws.mean_diameter(0.5),
            active_turns: laws.working_turns(),
            segments: Vec::new(),
        };
    }

    let segments = build_segments(laws, centerline);

    let (min_wire_radius, max_wire_radius) = centerline
        .samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.wire_radius), hi.max(s.wire_radius))
        });

    let (min_spring_index, max_spring_index) = segments
        .iter()
        .filter_map(CoilSegment::spring_index)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| (lo.min(c), hi.max(c)));
    let (min_spring_index, max_spring_index) = if min_spring_index.is_finite() {
        (min_spring_index, max_spring_index)
    } else {
        (0.0, 0.0)
    };

    let total_turns: f64 = segments.iter().map(|seg| seg.turns).sum();
    let average_mean_diameter = if total_turns > 0.0 {
        segments.iter().map(|seg| seg.mean_diameter * seg.turns).sum::<f64>() / total_turns
    } else {
        laws.mean_diameter(0.5)
    };

    let wire_length = centerline.wire_length();
    let wire_volume_mm3 = wire_volume(centerline, &segments, min_wire_radius, max_wire_radius);
    let mass_kg = (CubicMillimeters(wire_volume_mm3) * density).0;

    let (z_min, z_max) = centerline.axial_range();

    DerivedGeometry {
        wire_length,
        free_length: z_max - z_min,
        solid_height: solid_height(laws, &segments),
        wire_volume_mm3,
        mass_kg,
        min_pitch,
        max_pitch,
        min_wire_radius,
        max_wire_radius,
        min_spring_index,
        max_spring_index,
        average_mean_diameter,
        active_turns: laws.working_turns(),
        segments,
    }
}

fn build_segments(laws: &GeometryLaws, centerline: &Centerline) -> Vec<CoilSegment> {
    centerline
        .samples
        .windows(2)
        .map(|pair| {
            let (a, b) = (&pair[0], &pair[1]);
            let mid = 0.5 * (a.s + b.s);
            let pitch = laws.pitch(mid);
            let wire_diameter = laws.wire_diameter(mid);
            CoilSegment {
                s_start: a.s,
                s_end: b.s,
                turns: laws.total_turns * (b.s - a.s),
                pitch,
                wire_diameter,
                mean_diameter: laws.mean_diameter(mid),
                gap: pitch - wire_diameter,
                wire_length: b.arc_length - a.arc_length,
            }
        })
        .collect()
}

/// `π·r̄²·L` for near-uniform wire, otherwise a per-segment accumulation.
fn wire_volume(
    centerline: &Centerline,
    segments: &[CoilSegment],
    min_radius: f64,
    max_radius: f64,
) -> f64 {
    let n = centerline.samples.len() as f64;
    let mean_radius = centerline.samples.iter().map(|s| s.wire_radius).sum::<f64>() / n;
    let spread = if mean_radius > 0.0 {
        (max_radius - min_radius) / mean_radius
    } else {
        0.0
    };

    if spread < UNIFORM_WIRE_TOLERANCE {
        PI * mean_radius * mean_radius * centerline.wire_length()
    } else {
        segments
            .iter()
            .map(|seg| {
                let r = 0.5 * seg.wire_diameter;
                PI * r * r * seg.wire_length
            })
            .sum()
    }
}

/// Stacked wire diameters, less half a wire at each ground end.
fn solid_height(laws: &GeometryLaws, segments: &[CoilSegment]) -> f64 {
    let stacked: f64 = segments.iter().map(|seg| seg.wire_diameter * seg.turns).sum();
    let grinding = &laws.end_grinding;
    let mut height = stacked;
    if grinding.ground_start {
        height -= 0.5 * laws.wire_diameter(0.0);
    }
    if grinding.ground_end {
        height -= 0.5 * laws.wire_diameter(1.0);
    }
    height.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::centerline::build_centerline;
    use crate::geometry::laws::{MeanDiameterLaw, PitchStyle, WireDiameterLaw};

    const STEEL: KilogramsPerCubicMeter = KilogramsPerCubicMeter(7850.0);

    fn reference_laws() -> GeometryLaws {
        let mut laws = GeometryLaws::default();
        laws.total_turns = 10.0;
        laws.mean_diameter = MeanDiameterLaw::uniform(40.0);
        laws.wire_diameter = WireDiameterLaw::uniform(4.0);
        laws.pitch.style = PitchStyle::Symmetric;
        laws.pitch.closed_turns_start = 1.5;
        laws.pitch.closed_turns_end = 1.5;
        laws.pitch.working_min = 10.0;
        laws.pitch.working_max = 10.0;
        laws
    }

    #[test]
    fn test_free_length_matches_hand_computation() {
        let laws = reference_laws();
        let centerline = build_centerline(&laws, 60.0);
        let geometry = derive_geometry(&laws, &centerline, STEEL);

        let closed = 2.0 * 1.5 * laws.pitch.closed_pitch_factor * 4.0;
        let working = (10.0 - 3.0) * 10.0;
        assert!((geometry.free_length - (closed + working)).abs() < 0.01);
    }

    #[test]
    fn test_solid_height_with_ground_ends() {
        let mut laws = reference_laws();
        let centerline = build_centerline(&laws, 60.0);
        let ground = derive_geometry(&laws, &centerline, STEEL);
        assert!((ground.solid_height - 36.0).abs() < 1e-6);

        laws.end_grinding.ground_start = false;
        laws.end_grinding.ground_end = false;
        let unground = derive_geometry(&laws, &centerline, STEEL);
        assert!((unground.solid_height - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_wire_mass() {
        let laws = reference_laws();
        let centerline = build_centerline(&laws, 60.0);
        let geometry = derive_geometry(&laws, &centerline, STEEL);
        let volume = PI * 4.0 * geometry.wire_length;
        assert!((geometry.wire_volume_mm3 - volume).abs() / volume < 1e-9);
        assert!((geometry.mass_kg - volume * 7850.0 * 1e-9).abs() < 1e-9);
    }

    #[test]
    fn test_tapered_wire_uses_segment_volume() {
        let mut laws = reference_laws();
        laws.wire_diameter = WireDiameterLaw::new(3.0, 5.0, 3.0);
        let centerline = build_centerline(&laws, 60.0);
        let geometry = derive_geometry(&laws, &centerline, STEEL);
        assert!((geometry.min_wire_radius - 1.5).abs() < 1e-9);
        assert!((geometry.max_wire_radius - 2.5).abs() < 1e-3);
        let naive = PI * 1.5 * 1.5 * geometry.wire_length;
        assert!(geometry.wire_volume_mm3 > naive);
    }

    #[test]
    fn test_segments_cover_all_turns() {
        let laws = reference_laws();
        let centerline = build_centerline(&laws, 30.0);
        let geometry = derive_geometry(&laws, &centerline, STEEL);
        assert_eq!(geometry.segments.len(), centerline.len() - 1);
        let turns: f64 = geometry.segments.iter().map(|s| s.turns).sum();
        assert!((turns - 10.0).abs() < 1e-9);
        assert!((geometry.min_spring_index - 10.0).abs() < 1e-9);
        assert!((geometry.average_mean_diameter - 40.0).abs() < 1e-9);
        assert!((geometry.active_turns - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_centerline_defaults() {
        let mut laws = reference_laws();
        laws.total_turns = -1.0;
        let centerline = build_centerline(&laws, 60.0);
        let geometry = derive_geometry(&laws, &centerline, STEEL);
        assert_eq!(geometry.wire_length, 0.0);
        assert_eq!(geometry.mass_kg, 0.0);
        assert!(geometry.segments.is_empty());
    }
}
