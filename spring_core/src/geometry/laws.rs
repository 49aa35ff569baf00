//! # Geometry Laws
//!
//! Continuous laws for mean radius, wire diameter and pitch as functions of the
//! normalized turn parameter `s ∈ [0, 1]` (`s = 0` at the first end face, `s = 1`
//! at the last). Every law is C¹: blends use `sin(π·s)` envelopes or Hermite
//! smoothsteps, never hard switches.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::geometry::laws::{DiameterShape, GeometryLaws, MeanDiameterLaw};
//!
//! let mut laws = GeometryLaws::default();
//! laws.mean_diameter = MeanDiameterLaw::new(90.0, 110.0, 90.0, DiameterShape::Bulge);
//!
//! assert!((laws.mean_radius(0.5) - 55.0).abs() < 1e-9);
//! assert!((laws.mean_radius(0.0) - 45.0).abs() < 1e-9);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::math::{lerp, smoothstep};

/// Half-width (in `s`) of the smoothing window around the midpoint of a linear law.
pub const MID_BLEND_HALF_WIDTH: f64 = 0.05;

/// Narrowest closed/working transition, in turns.
pub const MIN_TRANSITION_TURNS: f64 = 0.05;

/// Resolution used when reporting pitch extrema, independent of centerline sampling.
pub const PITCH_REPORT_SAMPLES: usize = 256;

/// Profile of the mean coil diameter between the start, mid and end values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiameterShape {
    /// Piecewise linear start→mid→end, smoothed around the midpoint
    #[default]
    Linear,
    /// Barrel: the middle swells outward from the start/end chord
    Bulge,
    /// Waisted: the middle pinches inward from the start/end chord
    Hourglass,
}

/// Mean coil diameter law (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanDiameterLaw {
    pub start: f64,
    pub mid: f64,
    pub end: f64,
    #[serde(default)]
    pub shape: DiameterShape,
}

impl MeanDiameterLaw {
    pub fn new(start: f64, mid: f64, end: f64, shape: DiameterShape) -> Self {
        MeanDiameterLaw {
            start,
            mid,
            end,
            shape,
        }
    }

    /// Constant diameter.
    pub fn uniform(diameter: f64) -> Self {
        Self::new(diameter, diameter, diameter, DiameterShape::Linear)
    }

    /// Mean coil diameter at `s`.
    pub fn diameter_at(&self, s: f64) -> f64 {
        let s = s.clamp(0.0, 1.0);
        match self.shape {
            DiameterShape::Linear => smoothed_piecewise_linear(self.start, self.mid, self.end, s),
            // Signed offset: the curve always passes through `mid`, whichever side of
            // the chord it sits on.
            DiameterShape::Bulge | DiameterShape::Hourglass => {
                let offset = self.mid - chord_mid(self.start, self.end);
                envelope_blend(self.start, self.end, offset, s)
            }
        }
    }

    /// True when `mid` lies on the side of the start/end chord the shape implies.
    /// Advisory only; the law interpolates `mid` either way.
    pub fn mid_matches_shape(&self) -> bool {
        let offset = self.mid - chord_mid(self.start, self.end);
        match self.shape {
            DiameterShape::Linear => true,
            DiameterShape::Bulge => offset >= 0.0,
            DiameterShape::Hourglass => offset <= 0.0,
        }
    }
}

/// Wire diameter law (mm). Always an `sin(π·s)` envelope blend, which gives a
/// symmetric "olive" taper when the ends differ from the middle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireDiameterLaw {
    pub start: f64,
    pub mid: f64,
    pub end: f64,
}

impl WireDiameterLaw {
    pub fn new(start: f64, mid: f64, end: f64) -> Self {
        WireDiameterLaw { start, mid, end }
    }

    pub fn uniform(diameter: f64) -> Self {
        Self::new(diameter, diameter, diameter)
    }

    pub fn diameter_at(&self, s: f64) -> f64 {
        let s = s.clamp(0.0, 1.0);
        let offset = self.mid - chord_mid(self.start, self.end);
        envelope_blend(self.start, self.end, offset, s)
    }

    /// Largest of the three control values.
    pub fn max_control(&self) -> f64 {
        self.start.max(self.mid).max(self.end)
    }
}

/// How the working-zone pitch varies between the closed ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchStyle {
    /// workingMin near both closed zones, workingMax in the middle
    #[default]
    Symmetric,
    /// workingMin at the start ramping to workingMax at the end
    Progressive,
    /// workingMax at the start ramping to workingMin at the end
    Regressive,
}

/// Pitch law (mm per turn).
///
/// `closed_pitch_factor` and `transition_sharpness` are empirically tuned shop
/// coefficients; they are exposed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchLaw {
    #[serde(default)]
    pub style: PitchStyle,
    /// Closed (dead) turns at the start end
    pub closed_turns_start: f64,
    /// Closed (dead) turns at the end
    pub closed_turns_end: f64,
    /// Working pitch near the closed zones (symmetric) or at the low end of the ramp
    pub working_min: f64,
    /// Working pitch at the centre (symmetric) or at the high end of the ramp
    pub working_max: f64,
    /// Width of each closed→working transition, in turns
    #[serde(default = "default_transition_turns")]
    pub transition_turns: f64,
    /// Exponent on the `sin(π·u)` working envelope
    #[serde(default = "default_transition_sharpness")]
    pub transition_sharpness: f64,
    /// Closed pitch as a multiple of the local wire diameter
    #[serde(default = "default_closed_pitch_factor")]
    pub closed_pitch_factor: f64,
}

fn default_transition_turns() -> f64 {
    0.5
}

fn default_transition_sharpness() -> f64 {
    2.0
}

fn default_closed_pitch_factor() -> f64 {
    1.0
}

/// Ground end faces and where their cut planes sit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndGrinding {
    pub ground_start: bool,
    pub ground_end: bool,
    /// Cut plane offset from the start face, in turns
    #[serde(default = "default_grind_offset")]
    pub offset_turns_start: f64,
    /// Cut plane offset from the end face, in turns
    #[serde(default = "default_grind_offset")]
    pub offset_turns_end: f64,
}

fn default_grind_offset() -> f64 {
    0.25
}

impl Default for EndGrinding {
    fn default() -> Self {
        EndGrinding {
            ground_start: true,
            ground_end: true,
            offset_turns_start: default_grind_offset(),
            offset_turns_end: default_grind_offset(),
        }
    }
}

/// The complete set of laws for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryLaws {
    /// Total turn count N, closed turns included
    pub total_turns: f64,
    pub mean_diameter: MeanDiameterLaw,
    pub wire_diameter: WireDiameterLaw,
    pub pitch: PitchLaw,
    #[serde(default)]
    pub end_grinding: EndGrinding,
}

impl Default for GeometryLaws {
    /// A plain cylindrical suspension spring with one closed turn per end.
    fn default() -> Self {
        GeometryLaws {
            total_turns: 8.0,
            mean_diameter: MeanDiameterLaw::uniform(100.0),
            wire_diameter: WireDiameterLaw::uniform(12.0),
            pitch: PitchLaw {
                style: PitchStyle::Symmetric,
                closed_turns_start: 1.0,
                closed_turns_end: 1.0,
                working_min: 30.0,
                working_max: 36.0,
                transition_turns: default_transition_turns(),
                transition_sharpness: default_transition_sharpness(),
                closed_pitch_factor: default_closed_pitch_factor(),
            },
            end_grinding: EndGrinding::default(),
        }
    }
}

impl GeometryLaws {
    /// Mean coil radius R(s) in mm.
    pub fn mean_radius(&self, s: f64) -> f64 {
        0.5 * self.mean_diameter.diameter_at(s)
    }

    /// Mean coil diameter D(s) in mm.
    pub fn mean_diameter(&self, s: f64) -> f64 {
        self.mean_diameter.diameter_at(s)
    }

    /// Wire diameter d(s) in mm.
    pub fn wire_diameter(&self, s: f64) -> f64 {
        self.wire_diameter.diameter_at(s)
    }

    /// Turns between the two closed zones.
    pub fn working_turns(&self) -> f64 {
        (self.total_turns - self.closed_turns_start() - self.closed_turns_end()).max(0.0)
    }

    fn closed_turns_start(&self) -> f64 {
        self.pitch.closed_turns_start.max(0.0)
    }

    fn closed_turns_end(&self) -> f64 {
        self.pitch.closed_turns_end.max(0.0)
    }

    /// Half-width of each closed/working transition, in turns. Bounded so the
    /// transition never runs past the end face or into the opposite transition.
    fn transition_half_width(&self, closed_turns: f64) -> f64 {
        let requested = 0.5 * self.pitch.transition_turns.max(MIN_TRANSITION_TURNS);
        requested
            .min(closed_turns)
            .min(0.5 * self.working_turns())
    }

    /// Weight of the closed pitch at `s`: 1 deep inside a closed zone, 0 in the
    /// working zone. The transition is centred on the closed-zone boundary so the
    /// weight integrates to exactly the configured closed turn count.
    pub fn closed_weight(&self, s: f64) -> f64 {
        let n = s.clamp(0.0, 1.0) * self.total_turns;
        let start = end_zone_weight(
            n,
            self.closed_turns_start(),
            self.transition_half_width(self.closed_turns_start()),
        );
        let end = end_zone_weight(
            self.total_turns - n,
            self.closed_turns_end(),
            self.transition_half_width(self.closed_turns_end()),
        );
        (start + end).min(1.0)
    }

    /// Position inside the working zone, 0 at its start boundary and 1 at its end.
    fn working_coordinate(&self, s: f64) -> f64 {
        let working = self.working_turns();
        if working <= 0.0 {
            return 0.5;
        }
        let n = s.clamp(0.0, 1.0) * self.total_turns;
        ((n - self.closed_turns_start()) / working).clamp(0.0, 1.0)
    }

    /// Working-zone pitch at `s`, ignoring the closed zones.
    pub fn working_pitch(&self, s: f64) -> f64 {
        let p = &self.pitch;
        let u = self.working_coordinate(s);
        match p.style {
            PitchStyle::Symmetric => {
                let sharpness = if p.transition_sharpness > 0.0 {
                    p.transition_sharpness
                } else {
                    1.0
                };
                let envelope = (PI * u).sin().max(0.0).powf(sharpness);
                lerp(p.working_min, p.working_max, envelope)
            }
            PitchStyle::Progressive => lerp(p.working_min, p.working_max, u),
            PitchStyle::Regressive => lerp(p.working_max, p.working_min, u),
        }
    }

    /// Closed pitch at `s`: the factor times the local wire diameter.
    pub fn closed_pitch(&self, s: f64) -> f64 {
        self.pitch.closed_pitch_factor * self.wire_diameter(s)
    }

    /// Pitch p(s) in mm per turn.
    pub fn pitch(&self, s: f64) -> f64 {
        let w = self.closed_weight(s);
        lerp(self.working_pitch(s), self.closed_pitch(s), w)
    }

    /// Pitch minimum and maximum at the fixed reporting resolution.
    pub fn pitch_extrema(&self) -> (f64, f64) {
        (0..=PITCH_REPORT_SAMPLES)
            .map(|i| self.pitch(i as f64 / PITCH_REPORT_SAMPLES as f64))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            })
    }
}

fn chord_mid(start: f64, end: f64) -> f64 {
    0.5 * (start + end)
}

/// Linear start↔end interpolation plus `offset · sin(π·s)`. Passes through
/// `start` at 0, `end` at 1 and `chord_mid + offset` at 0.5.
fn envelope_blend(start: f64, end: f64, offset: f64, s: f64) -> f64 {
    lerp(start, end, s) + offset * (PI * s).sin()
}

/// start→mid on [0, 0.5], mid→end on [0.5, 1], with the two lines cross-faded by
/// a smoothstep inside `MID_BLEND_HALF_WIDTH` of the midpoint.
fn smoothed_piecewise_linear(start: f64, mid: f64, end: f64, s: f64) -> f64 {
    let first = lerp(start, mid, s / 0.5);
    let second = lerp(mid, end, (s - 0.5) / 0.5);
    let h = smoothstep((s - (0.5 - MID_BLEND_HALF_WIDTH)) / (2.0 * MID_BLEND_HALF_WIDTH));
    lerp(first, second, h)
}

/// Closed-zone weight measured from one end face. Zero closed turns disables the zone.
fn end_zone_weight(turns_from_face: f64, closed_turns: f64, half_width: f64) -> f64 {
    if closed_turns <= 0.0 {
        return 0.0;
    }
    if half_width <= 0.0 {
        return if turns_from_face <= closed_turns { 1.0 } else { 0.0 };
    }
    let t = (turns_from_face - (closed_turns - half_width)) / (2.0 * half_width);
    1.0 - smoothstep(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_slope<F: Fn(f64) -> f64>(f: F) -> f64 {
        let steps = 4000;
        let h = 1.0 / steps as f64;
        (1..=steps)
            .map(|i| {
                let s = i as f64 * h;
                ((f(s) - f(s - h)) / h).abs()
            })
            .fold(0.0, f64::max)
    }

    fn max_jump<F: Fn(f64) -> f64>(f: F) -> f64 {
        let steps = 4000;
        let h = 1.0 / steps as f64;
        (1..=steps)
            .map(|i| {
                let s = i as f64 * h;
                (f(s) - f(s - h)).abs()
            })
            .fold(0.0, f64::max)
    }

    fn suspension_laws() -> GeometryLaws {
        GeometryLaws {
            total_turns: 10.0,
            mean_diameter: MeanDiameterLaw::new(90.0, 120.0, 100.0, DiameterShape::Linear),
            wire_diameter: WireDiameterLaw::new(10.0, 13.0, 11.0),
            pitch: PitchLaw {
                style: PitchStyle::Symmetric,
                closed_turns_start: 1.5,
                closed_turns_end: 1.0,
                working_min: 25.0,
                working_max: 40.0,
                transition_turns: 0.6,
                transition_sharpness: 2.0,
                closed_pitch_factor: 1.05,
            },
            end_grinding: EndGrinding::default(),
        }
    }

    #[test]
    fn test_linear_law_passes_through_controls() {
        let law = MeanDiameterLaw::new(90.0, 120.0, 100.0, DiameterShape::Linear);
        assert!((law.diameter_at(0.0) - 90.0).abs() < 1e-12);
        assert!((law.diameter_at(0.5) - 120.0).abs() < 1e-12);
        assert!((law.diameter_at(1.0) - 100.0).abs() < 1e-12);
        // Outside the blend window the law is exactly linear
        assert!((law.diameter_at(0.25) - 105.0).abs() < 1e-12);
    }

    #[test]
    fn test_bulge_and_hourglass_pass_through_controls() {
        let bulge = MeanDiameterLaw::new(80.0, 110.0, 90.0, DiameterShape::Bulge);
        assert!((bulge.diameter_at(0.0) - 80.0).abs() < 1e-9);
        assert!((bulge.diameter_at(0.5) - 110.0).abs() < 1e-9);
        assert!((bulge.diameter_at(1.0) - 90.0).abs() < 1e-9);

        let hourglass = MeanDiameterLaw::new(110.0, 80.0, 100.0, DiameterShape::Hourglass);
        assert!((hourglass.diameter_at(0.5) - 80.0).abs() < 1e-9);
        assert!(hourglass.mid_matches_shape());
        let inverted = MeanDiameterLaw::new(110.0, 120.0, 100.0, DiameterShape::Hourglass);
        assert!(!inverted.mid_matches_shape());
    }

    #[test]
    fn test_mid_on_opposite_side_is_still_interpolated() {
        let bulge = MeanDiameterLaw::new(100.0, 90.0, 100.0, DiameterShape::Bulge);
        assert!(!bulge.mid_matches_shape());
        assert!((bulge.diameter_at(0.5) - 90.0).abs() < 1e-9);
        assert!((bulge.diameter_at(0.0) - 100.0).abs() < 1e-9);
        assert!((bulge.diameter_at(1.0) - 100.0).abs() < 1e-9);

        let hourglass = MeanDiameterLaw::new(100.0, 110.0, 100.0, DiameterShape::Hourglass);
        assert!(!hourglass.mid_matches_shape());
        assert!((hourglass.diameter_at(0.5) - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_wire_olive_taper() {
        let wire = WireDiameterLaw::new(10.0, 14.0, 10.0);
        assert!((wire.diameter_at(0.5) - 14.0).abs() < 1e-12);
        assert!((wire.diameter_at(0.25) - wire.diameter_at(0.75)).abs() < 1e-12);
        assert!(wire.diameter_at(0.25) > 10.0 && wire.diameter_at(0.25) < 14.0);
    }

    #[test]
    fn test_laws_are_continuous() {
        let laws = suspension_laws();
        // A jump would show up as a finite-difference slope ~ 1/h = 4000 times the step.
        assert!(max_slope(|s| laws.mean_diameter(s)) < 200.0);
        assert!(max_slope(|s| laws.wire_diameter(s)) < 50.0);
        assert!(max_slope(|s| laws.pitch(s)) < 2000.0);
        assert!(max_jump(|s| laws.pitch(s)) < 0.5);

        for style in [PitchStyle::Progressive, PitchStyle::Regressive] {
            let mut l = laws;
            l.pitch.style = style;
            assert!(max_jump(|s| l.pitch(s)) < 0.5, "{style:?} pitch jumps");
        }
    }

    #[test]
    fn test_closed_zone_uses_closed_pitch() {
        let laws = suspension_laws();
        // Deep inside the first closed turn
        let s = 0.5 / laws.total_turns;
        assert!((laws.closed_weight(s) - 1.0).abs() < 1e-12);
        assert!((laws.pitch(s) - 1.05 * laws.wire_diameter(s)).abs() < 1e-9);
        // Middle of the working zone
        assert_eq!(laws.closed_weight(0.5), 0.0);
    }

    #[test]
    fn test_zero_closed_turns_disables_zone() {
        let mut laws = suspension_laws();
        laws.pitch.closed_turns_start = 0.0;
        assert_eq!(laws.closed_weight(0.0), 0.0);
        assert!(laws.closed_weight(1.0) > 0.99);
    }

    #[test]
    fn test_progressive_working_pitch_is_monotonic() {
        let mut laws = suspension_laws();
        laws.pitch.style = PitchStyle::Progressive;
        let mut prev = laws.working_pitch(0.0);
        for i in 1..=200 {
            let p = laws.working_pitch(i as f64 / 200.0);
            assert!(p >= prev - 1e-12);
            prev = p;
        }
        assert!((laws.working_pitch(1.0) - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_pitch_extrema() {
        let laws = GeometryLaws::default();
        let (lo, hi) = laws.pitch_extrema();
        assert!((lo - 12.0).abs() < 1e-9);
        assert!((hi - 36.0).abs() < 0.01);
    }
}
