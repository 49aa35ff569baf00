//! # Centerline Builder
//!
//! Integrates the geometry laws into a sampled 3-D wire centerline:
//!
//! ```text
//! θᵢ = 2π·N·sᵢ
//! xᵢ = R(sᵢ)·cos θᵢ,  yᵢ = R(sᵢ)·sin θᵢ
//! zᵢ = zᵢ₋₁ + N·½·(p(sᵢ₋₁) + p(sᵢ))·(sᵢ − sᵢ₋₁)      (trapezoidal)
//! ```
//!
//! Each sample also carries the local wire radius, its cumulative arc length
//! and a parallel-transported frame. Samples are produced once per analysis run
//! and never mutated.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::geometry::frame::{transport_frames, Frame};
use crate::geometry::laws::GeometryLaws;
use crate::math::Vec3;

/// One sample of the wire centerline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterlineSample {
    pub position: Vec3,
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
    /// Local wire radius (mm)
    pub wire_radius: f64,
    /// Normalized turn parameter
    pub s: f64,
    /// Cumulative arc length from the first sample (mm)
    pub arc_length: f64,
}

impl CenterlineSample {
    pub fn frame(&self) -> Frame {
        Frame {
            tangent: self.tangent,
            normal: self.normal,
            binormal: self.binormal,
        }
    }
}

/// The sampled centerline of one spring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centerline {
    pub total_turns: f64,
    pub samples: Vec<CenterlineSample>,
}

/// Number of samples for a turn count and density: `max(2, ⌊N·density⌋ + 1)`.
pub fn sample_count(total_turns: f64, samples_per_turn: f64) -> usize {
    let product = (total_turns * samples_per_turn).floor();
    if product.is_finite() && product > 0.0 {
        // Saturate before the cast; `as usize` alone would hit usize::MAX and overflow on +1
        (product.min((usize::MAX - 1) as f64) as usize)
            .saturating_add(1)
            .max(2)
    } else {
        2
    }
}

/// Reduce the density so the sample count stays within `max_samples`.
///
/// Compared in f64 so huge or infinite densities are clamped too.
pub fn clamp_samples_per_turn(total_turns: f64, samples_per_turn: f64, max_samples: usize) -> f64 {
    let max_samples = max_samples.max(2);
    if !(total_turns > 0.0 && total_turns.is_finite()) {
        return samples_per_turn;
    }
    let requested = (total_turns * samples_per_turn).floor() + 1.0;
    if requested > max_samples as f64 {
        (max_samples - 1) as f64 / total_turns
    } else {
        samples_per_turn
    }
}

/// Sample the laws into a centerline.
///
/// A non-positive or non-finite turn count or density yields a single
/// degenerate sample with the default orientation.
pub fn build_centerline(laws: &GeometryLaws, samples_per_turn: f64) -> Centerline {
    let turns = laws.total_turns;
    let usable = turns.is_finite()
        && turns > 0.0
        && samples_per_turn.is_finite()
        && samples_per_turn > 0.0;
    if !usable {
        return Centerline::degenerate(laws);
    }

    let count = sample_count(turns, samples_per_turn);
    let mut positions = Vec::with_capacity(count);
    let mut params = Vec::with_capacity(count);

    let mut z = 0.0;
    let mut prev: Option<(f64, f64)> = None;
    for i in 0..count {
        let s = i as f64 / (count - 1) as f64;
        let pitch = laws.pitch(s);
        if let Some((prev_s, prev_pitch)) = prev {
            z += turns * 0.5 * (prev_pitch + pitch) * (s - prev_s);
        }
        prev = Some((s, pitch));

        let theta = 2.0 * PI * turns * s;
        let radius = laws.mean_radius(s);
        positions.push(Vec3::new(radius * theta.cos(), radius * theta.sin(), z));
        params.push(s);
    }

    let frames = transport_frames(&positions);
    let mut arc_length = 0.0;
    let samples = positions
        .iter()
        .zip(&frames)
        .zip(&params)
        .enumerate()
        .map(|(i, ((&position, frame), &s))| {
            if i > 0 {
                arc_length += position.distance(positions[i - 1]);
            }
            CenterlineSample {
                position,
                tangent: frame.tangent,
                normal: frame.normal,
                binormal: frame.binormal,
                wire_radius: 0.5 * laws.wire_diameter(s),
                s,
                arc_length,
            }
        })
        .collect();

    Centerline {
        total_turns: turns,
        samples,
    }
}

impl Centerline {
    fn degenerate(laws: &GeometryLaws) -> Centerline {
        let frame = Frame::DEFAULT;
        Centerline {
            total_turns: laws.total_turns,
            samples: vec![CenterlineSample {
                position: Vec3::ZERO,
                tangent: frame.tangent,
                normal: frame.normal,
                binormal: frame.binormal,
                wire_radius: 0.5 * laws.wire_diameter(0.0).max(0.0),
                s: 0.0,
                arc_length: 0.0,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True for the single-sample fallback.
    pub fn is_degenerate(&self) -> bool {
        self.samples.len() < 2
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.samples.iter().map(|sample| sample.position)
    }

    /// Total arc length of the centerline (mm).
    pub fn wire_length(&self) -> f64 {
        self.samples.last().map_or(0.0, |sample| sample.arc_length)
    }

    /// Axial extent `(min z, max z)` of the centerline.
    pub fn axial_range(&self) -> (f64, f64) {
        if self.samples.is_empty() {
            return (0.0, 0.0);
        }
        self.positions()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.z), hi.max(p.z))
            })
    }

    /// Axial position at parameter `s`, linearly interpolated between samples.
    /// Parameters outside [0, 1] extrapolate from the end intervals.
    pub fn z_at(&self, s: f64) -> f64 {
        match self.samples.len() {
            0 => 0.0,
            1 => self.samples[0].position.z,
            n => {
                let scaled = s * (n - 1) as f64;
                let i = (scaled.floor().max(0.0) as usize).min(n - 2);
                let a = &self.samples[i];
                let b = &self.samples[i + 1];
                let t = (s - a.s) / (b.s - a.s);
                a.position.z + (b.position.z - a.position.z) * t
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::laws::{MeanDiameterLaw, PitchStyle, WireDiameterLaw};

    fn cylinder(turns: f64, pitch: f64) -> GeometryLaws {
        let mut laws = GeometryLaws::default();
        laws.total_turns = turns;
        laws.mean_diameter = MeanDiameterLaw::uniform(40.0);
        laws.wire_diameter = WireDiameterLaw::uniform(4.0);
        laws.pitch.style = PitchStyle::Symmetric;
        laws.pitch.closed_turns_start = 0.0;
        laws.pitch.closed_turns_end = 0.0;
        laws.pitch.working_min = pitch;
        laws.pitch.working_max = pitch;
        laws
    }

    #[test]
    fn test_sample_count() {
        assert_eq!(sample_count(10.0, 60.0), 601);
        assert_eq!(sample_count(0.01, 1.0), 2);
        assert_eq!(sample_count(f64::NAN, 10.0), 2);
    }

    #[test]
    fn test_clamp_samples_per_turn() {
        let density = clamp_samples_per_turn(10.0, 100.0, 400);
        assert!(sample_count(10.0, density) <= 400);
        assert_eq!(clamp_samples_per_turn(10.0, 20.0, 400), 20.0);
    }

    #[test]
    fn test_huge_density_is_clamped_without_overflow() {
        assert_eq!(sample_count(10.0, 1e20), usize::MAX);
        assert_eq!(sample_count(10.0, f64::INFINITY), 2);

        for density in [1e20, f64::INFINITY] {
            let clamped = clamp_samples_per_turn(10.0, density, 2400);
            assert!(clamped.is_finite());
            assert!(sample_count(10.0, clamped) <= 2400);
        }
    }

    #[test]
    fn test_uniform_helix_geometry() {
        let laws = cylinder(5.0, 10.0);
        let centerline = build_centerline(&laws, 72.0);
        assert_eq!(centerline.len(), 361);

        let first = centerline.samples[0];
        assert!((first.position.x - 20.0).abs() < 1e-12);
        assert!((first.wire_radius - 2.0).abs() < 1e-12);

        let (z_min, z_max) = centerline.axial_range();
        assert!(z_min.abs() < 1e-12);
        assert!((z_max - 50.0).abs() < 1e-9);

        // Helix length: N·sqrt((πD)² + p²)
        let expected = 5.0 * ((PI * 40.0).powi(2) + 100.0).sqrt();
        assert!((centerline.wire_length() - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn test_frames_are_orthonormal() {
        let centerline = build_centerline(&GeometryLaws::default(), 48.0);
        for sample in &centerline.samples {
            assert!(sample.frame().is_orthonormal(1e-6));
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        let mut laws = cylinder(5.0, 10.0);
        laws.total_turns = 0.0;
        let centerline = build_centerline(&laws, 60.0);
        assert!(centerline.is_degenerate());
        assert_eq!(centerline.samples[0].frame(), Frame::DEFAULT);
        assert_eq!(centerline.wire_length(), 0.0);

        let centerline = build_centerline(&cylinder(5.0, 10.0), 0.0);
        assert_eq!(centerline.len(), 1);
    }

    #[test]
    fn test_z_at_interpolates() {
        let centerline = build_centerline(&cylinder(4.0, 10.0), 50.0);
        assert!((centerline.z_at(0.5) - 20.0).abs() < 1e-9);
        assert!((centerline.z_at(0.123) - 4.92).abs() < 1e-9);
    }
}
