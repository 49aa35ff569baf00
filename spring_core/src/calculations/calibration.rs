//! # Digital-Twin Calibration
//!
//! Compares measured force-deflection data against the theoretical spring and
//! reverse-solves the effective parameters that would explain the difference.
//!
//! ## Method
//!
//! 1. Least-squares line through the samples (slope, intercept, R²)
//! 2. Deviations against theory: spring rate, free length, per-sample force,
//!    nonlinearity, and hysteresis (≥ 10 points only)
//! 3. Stiffness ratio `kRatio = k_measured / k_theory` mapped onto the rate
//!    formula `k = G·d⁴ / (8·D³·Na)`:
//!
//! ```text
//! d_eff  = d · kRatio^(1/4)
//! D_eff  = D · kRatio^(−1/3)
//! Na_eff = Na / kRatio
//! ```
//!
//! 4. Quality class from joint R² and rate-deviation thresholds
//!
//! Each effective parameter explains the whole deviation on its own; they are
//! alternatives, not a combined correction.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::calculations::calibration::{
//!     calculate, CalibrationInput, CalibrationQuality, ExperimentalData, TheoreticalParameters,
//! };
//!
//! let input = CalibrationInput {
//!     label: "Lot 7".to_string(),
//!     experimental: ExperimentalData::from_pairs(&[(0.0, 0.0), (10.0, 250.0), (20.0, 500.0)]),
//!     theoretical: TheoreticalParameters {
//!         wire_diameter: 12.0,
//!         mean_diameter: 100.0,
//!         active_coils: 6.0,
//!         spring_rate: 25.0,
//!         shear_modulus: 79_300.0,
//!         free_length: None,
//!         solid_height: None,
//!     },
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert!((result.effective.stiffness_ratio - 1.0).abs() < 1e-9);
//! assert_eq!(result.quality, CalibrationQuality::Excellent);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{SpringError, SpringResult};

/// Minimum sample count for the loading/unloading hysteresis estimate.
pub const HYSTERESIS_MIN_POINTS: usize = 10;

/// Loading and unloading points match when their deflections differ by less
/// than this fraction of the deflection range.
pub const HYSTERESIS_MATCH_FRACTION: f64 = 0.02;

/// Residual-stress compensation per percent of stiffness loss.
pub const RESIDUAL_STRESS_COEFFICIENT: f64 = 0.5;

/// Sample count at which confidence stops growing with more data.
const FULL_CONFIDENCE_POINTS: f64 = 20.0;

const EPS: f64 = 1e-12;

/// One measured point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalSample {
    /// Deflection (mm)
    pub deflection: f64,
    /// Force (N)
    pub force: f64,
}

/// Measured data from a test rig.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalData {
    /// Samples in acquisition order (loading then unloading, if both were run)
    pub samples: Vec<ExperimentalSample>,
    /// Independently measured spring rate (N/mm)
    #[serde(default)]
    pub measured_spring_rate: Option<f64>,
    /// Measured free length (mm)
    #[serde(default)]
    pub measured_free_length: Option<f64>,
    /// Measured solid height (mm)
    #[serde(default)]
    pub measured_solid_height: Option<f64>,
    /// Load cycles the part saw before measurement
    #[serde(default)]
    pub cycle_count: Option<u64>,
}

impl ExperimentalData {
    /// Data from `(deflection, force)` pairs only.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        ExperimentalData {
            samples: pairs
                .iter()
                .map(|&(deflection, force)| ExperimentalSample { deflection, force })
                .collect(),
            ..Default::default()
        }
    }

    /// Samples with finite values only.
    fn clean_samples(&self) -> Vec<ExperimentalSample> {
        self.samples
            .iter()
            .copied()
            .filter(|s| s.deflection.is_finite() && s.force.is_finite())
            .collect()
    }
}

/// The theoretical spring being calibrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoreticalParameters {
    /// Wire diameter d (mm)
    pub wire_diameter: f64,
    /// Mean coil diameter D (mm)
    pub mean_diameter: f64,
    /// Active coils Na
    pub active_coils: f64,
    /// Theoretical spring rate (N/mm)
    pub spring_rate: f64,
    /// Shear modulus G (MPa)
    pub shear_modulus: f64,
    #[serde(default)]
    pub free_length: Option<f64>,
    #[serde(default)]
    pub solid_height: Option<f64>,
}

/// Input for one calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationInput {
    pub label: String,
    pub experimental: ExperimentalData,
    pub theoretical: TheoreticalParameters,
}

impl CalibrationInput {
    /// Validate the theoretical side; experimental data is never rejected.
    pub fn validate(&self) -> SpringResult<()> {
        let t = &self.theoretical;
        for (field, value) in [
            ("theoretical.wire_diameter", t.wire_diameter),
            ("theoretical.mean_diameter", t.mean_diameter),
            ("theoretical.active_coils", t.active_coils),
            ("theoretical.spring_rate", t.spring_rate),
            ("theoretical.shear_modulus", t.shear_modulus),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(SpringError::invalid_input(
                    field,
                    value.to_string(),
                    "Must be a positive number",
                ));
            }
        }
        Ok(())
    }
}

/// Least-squares line `F = slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, deflection: f64) -> f64 {
        self.slope * deflection + self.intercept
    }
}

/// Fit a line through the samples. Fewer than two points give a zeroed fit.
pub fn fit_line(samples: &[ExperimentalSample]) -> LinearFit {
    if samples.len() < 2 {
        return LinearFit::default();
    }
    let n = samples.len() as f64;
    let mean_x = samples.iter().map(|s| s.deflection).sum::<f64>() / n;
    let mean_y = samples.iter().map(|s| s.force).sum::<f64>() / n;
    let sxx: f64 = samples.iter().map(|s| (s.deflection - mean_x).powi(2)).sum();
    let sxy: f64 = samples
        .iter()
        .map(|s| (s.deflection - mean_x) * (s.force - mean_y))
        .sum();

    if sxx <= EPS {
        return LinearFit {
            slope: 0.0,
            intercept: mean_y,
            r_squared: 0.0,
        };
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let ss_tot: f64 = samples.iter().map(|s| (s.force - mean_y).powi(2)).sum();
    let ss_res: f64 = samples
        .iter()
        .map(|s| (s.force - (slope * s.deflection + intercept)).powi(2))
        .sum();
    let scale = ss_tot.max(mean_y * mean_y).max(1.0);
    let r_squared = if ss_tot <= EPS * scale {
        if ss_res <= EPS * scale { 1.0 } else { 0.0 }
    } else {
        (1.0 - ss_res / ss_tot).max(0.0)
    };

    LinearFit {
        slope,
        intercept,
        r_squared,
    }
}

/// Measured vs theoretical behaviour.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviationAnalysis {
    /// (measured − theoretical) / theoretical spring rate (%)
    pub spring_rate_deviation_pct: f64,
    /// Measured − theoretical free length (mm)
    pub free_length_deviation_mm: Option<f64>,
    /// Measured − theoretical solid height (mm)
    pub solid_height_deviation_mm: Option<f64>,
    /// Worst per-sample force deviation from the theoretical line (%)
    pub max_force_deviation_pct: f64,
    /// Mean per-sample force deviation from the theoretical line (%)
    pub avg_force_deviation_pct: f64,
    /// Worst distance from the fitted line, as a fraction of the peak measured force
    pub nonlinearity_index: f64,
    /// Mean loading/unloading force gap at matched deflections (N)
    pub hysteresis_n: Option<f64>,
}

/// Reverse-solved parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveParameters {
    /// k_measured / k_theory
    pub stiffness_ratio: f64,
    /// Wire diameter that alone explains the measured rate (mm)
    pub wire_diameter: f64,
    /// Mean diameter that alone explains the measured rate (mm)
    pub mean_diameter: f64,
    /// Active coils that alone explain the measured rate
    pub active_coils: f64,
    /// Shear modulus that alone explains the measured rate (MPa)
    pub shear_modulus: f64,
    /// Pitch error per active coil implied by the free-length deviation (mm)
    pub pitch_variation_mm: f64,
    /// Coil diameter scatter implied by the free-length deviation (mm)
    pub coil_diameter_tolerance_mm: f64,
    /// Suggested extra preset/scragging to offset relaxation (%)
    pub residual_stress_compensation_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationQuality {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl CalibrationQuality {
    /// Joint R² and |rate deviation| thresholds.
    pub fn classify(r_squared: f64, rate_deviation_pct: f64) -> Self {
        let dev = rate_deviation_pct.abs();
        if r_squared >= 0.995 && dev <= 3.0 {
            CalibrationQuality::Excellent
        } else if r_squared >= 0.98 && dev <= 7.0 {
            CalibrationQuality::Good
        } else if r_squared >= 0.95 && dev <= 15.0 {
            CalibrationQuality::Acceptable
        } else {
            CalibrationQuality::Poor
        }
    }
}

/// Calibrated curve sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedPoint {
    pub deflection: f64,
    pub measured_force: f64,
    pub theoretical_force: f64,
    pub calibrated_force: f64,
}

/// Calibration output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub fit: LinearFit,
    /// Spring rate used for the comparison (N/mm)
    pub measured_spring_rate: f64,
    pub deviation: DeviationAnalysis,
    pub effective: EffectiveParameters,
    pub calibrated_curve: Vec<CalibratedPoint>,
    /// 0..1, from sample count and fit quality
    pub confidence: f64,
    pub quality: CalibrationQuality,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Calibrate the theoretical spring against the experimental data.
pub fn calculate(input: &CalibrationInput) -> SpringResult<CalibrationResult> {
    input.validate()?;

    let theory = &input.theoretical;
    let experimental = &input.experimental;
    let samples = experimental.clean_samples();

    let fit = fit_line(&samples);
    let measured_spring_rate = experimental
        .measured_spring_rate
        .filter(|k| *k > 0.0 && k.is_finite())
        .unwrap_or(fit.slope);

    let deviation = analyze_deviation(&samples, &fit, measured_spring_rate, input);
    let effective = reverse_solve(measured_spring_rate, &deviation, theory);
    let quality = CalibrationQuality::classify(fit.r_squared, deviation.spring_rate_deviation_pct);

    let sample_weight = (samples.len() as f64 / FULL_CONFIDENCE_POINTS).min(1.0);
    let confidence = (fit.r_squared * sample_weight).clamp(0.0, 1.0);

    let calibrated_curve = samples
        .iter()
        .map(|s| CalibratedPoint {
            deflection: s.deflection,
            measured_force: s.force,
            theoretical_force: theory.spring_rate * s.deflection,
            calibrated_force: fit.predict(s.deflection),
        })
        .collect();

    let (issues, recommendations) =
        findings(samples.len(), &fit, &deviation, &effective, experimental, &samples);

    debug!(
        label = %input.label,
        points = samples.len(),
        r_squared = fit.r_squared,
        stiffness_ratio = effective.stiffness_ratio,
        ?quality,
        "calibration complete"
    );

    Ok(CalibrationResult {
        fit,
        measured_spring_rate,
        deviation,
        effective,
        calibrated_curve,
        confidence,
        quality,
        issues,
        recommendations,
    })
}

fn analyze_deviation(
    samples: &[ExperimentalSample],
    fit: &LinearFit,
    measured_spring_rate: f64,
    input: &CalibrationInput,
) -> DeviationAnalysis {
    let theory = &input.theoretical;
    let experimental = &input.experimental;

    let spring_rate_deviation_pct =
        (measured_spring_rate - theory.spring_rate) / theory.spring_rate * 100.0;

    let free_length_deviation_mm = experimental
        .measured_free_length
        .zip(theory.free_length)
        .map(|(measured, theoretical)| measured - theoretical);
    let solid_height_deviation_mm = experimental
        .measured_solid_height
        .zip(theory.solid_height)
        .map(|(measured, theoretical)| measured - theoretical);

    let force_deviations: Vec<f64> = samples
        .iter()
        .filter_map(|s| {
            let predicted = theory.spring_rate * s.deflection;
            (predicted.abs() > EPS).then(|| ((s.force - predicted) / predicted).abs() * 100.0)
        })
        .collect();
    let max_force_deviation_pct = force_deviations.iter().copied().fold(0.0, f64::max);
    let avg_force_deviation_pct = if force_deviations.is_empty() {
        0.0
    } else {
        force_deviations.iter().sum::<f64>() / force_deviations.len() as f64
    };

    let peak_force = samples.iter().map(|s| s.force.abs()).fold(0.0, f64::max);
    let nonlinearity_index = if samples.len() >= 2 && peak_force > EPS {
        samples
            .iter()
            .map(|s| (s.force - fit.predict(s.deflection)).abs() / peak_force)
            .fold(0.0, f64::max)
    } else {
        0.0
    };

    DeviationAnalysis {
        spring_rate_deviation_pct,
        free_length_deviation_mm,
        solid_height_deviation_mm,
        max_force_deviation_pct,
        avg_force_deviation_pct,
        nonlinearity_index,
        hysteresis_n: hysteresis(samples),
    }
}

/// Mean force gap between the first half (loading) and second half
/// (unloading) of the sequence at matching deflections.
fn hysteresis(samples: &[ExperimentalSample]) -> Option<f64> {
    if samples.len() < HYSTERESIS_MIN_POINTS {
        return None;
    }
    let (min_x, max_x) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.deflection), hi.max(s.deflection))
        });
    let tolerance = HYSTERESIS_MATCH_FRACTION * (max_x - min_x);
    let (loading, unloading) = samples.split_at(samples.len() / 2);

    let gaps: Vec<f64> = loading
        .iter()
        .filter_map(|load| {
            let nearest = unloading.iter().min_by(|a, b| {
                (a.deflection - load.deflection)
                    .abs()
                    .total_cmp(&(b.deflection - load.deflection).abs())
            })?;
            ((nearest.deflection - load.deflection).abs() <= tolerance)
                .then(|| (load.force - nearest.force).abs())
        })
        .collect();

    if gaps.is_empty() {
        None
    } else {
        Some(gaps.iter().sum::<f64>() / gaps.len() as f64)
    }
}

fn reverse_solve(
    measured_spring_rate: f64,
    deviation: &DeviationAnalysis,
    theory: &TheoreticalParameters,
) -> EffectiveParameters {
    let stiffness_ratio = measured_spring_rate / theory.spring_rate;
    // A non-positive ratio has no physical inverse; keep the nominal values.
    let ratio = if stiffness_ratio > EPS { stiffness_ratio } else { 1.0 };

    let free_length_dev = deviation.free_length_deviation_mm.unwrap_or(0.0);
    let pitch_variation_mm = free_length_dev / theory.active_coils;
    let coil_diameter_tolerance_mm = match theory.free_length {
        Some(l0) if l0 > 0.0 => theory.mean_diameter * free_length_dev.abs() / l0,
        _ => 0.0,
    };
    let stiffness_loss_pct = (-deviation.spring_rate_deviation_pct).max(0.0);

    EffectiveParameters {
        stiffness_ratio,
        wire_diameter: theory.wire_diameter * ratio.powf(0.25),
        mean_diameter: theory.mean_diameter * ratio.powf(-1.0 / 3.0),
        active_coils: theory.active_coils / ratio,
        shear_modulus: theory.shear_modulus * ratio,
        pitch_variation_mm,
        coil_diameter_tolerance_mm,
        residual_stress_compensation_pct: RESIDUAL_STRESS_COEFFICIENT * stiffness_loss_pct,
    }
}

fn findings(
    point_count: usize,
    fit: &LinearFit,
    deviation: &DeviationAnalysis,
    effective: &EffectiveParameters,
    experimental: &ExperimentalData,
    samples: &[ExperimentalSample],
) -> (Vec<String>, Vec<String>) {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if point_count < 2 {
        issues.push(format!("Only {point_count} usable data point(s); no fit possible"));
        recommendations.push("Record at least 10 points across the working travel".to_string());
        return (issues, recommendations);
    }
    if point_count < HYSTERESIS_MIN_POINTS {
        issues.push(format!("{point_count} data points; hysteresis not evaluated"));
        recommendations.push("Record at least 10 points, loading and unloading".to_string());
    }

    let rate_dev = deviation.spring_rate_deviation_pct;
    if rate_dev.abs() > 3.0 {
        let direction = if rate_dev > 0.0 { "stiffer" } else { "softer" };
        issues.push(format!("Measured spring is {:.1}% {direction} than theory", rate_dev.abs()));
        recommendations.push(format!(
            "Update the model: effective active coils {:.2}, or effective wire diameter {:.3} mm",
            effective.active_coils, effective.wire_diameter
        ));
    }
    if rate_dev < 0.0 && experimental.cycle_count.is_some_and(|n| n > 0) {
        issues.push("Stiffness loss after cycling suggests relaxation".to_string());
        recommendations.push(format!(
            "Add about {:.1}% residual-stress compensation (preset or shot peening)",
            effective.residual_stress_compensation_pct
        ));
    }
    if fit.r_squared < 0.98 || deviation.nonlinearity_index > 0.05 {
        issues.push(format!(
            "Response is not linear (R² {:.4}, nonlinearity {:.1}%)",
            fit.r_squared,
            deviation.nonlinearity_index * 100.0
        ));
        recommendations
            .push("Check end seating and coil contact over the measured travel".to_string());
    }
    if let Some(gap) = deviation.hysteresis_n {
        let peak = samples.iter().map(|s| s.force.abs()).fold(0.0, f64::max);
        if peak > 0.0 && gap / peak > 0.02 {
            issues.push(format!("Hysteresis of {gap:.1} N between loading and unloading"));
            recommendations.push("Check guide friction and coil-to-coil rubbing".to_string());
        }
    }
    if let Some(dl) = deviation.free_length_deviation_mm {
        if dl.abs() > 1.0 {
            issues.push(format!("Free length off by {dl:+.2} mm"));
            recommendations.push(format!(
                "Correct coiling pitch by {:+.3} mm per active coil",
                -effective.pitch_variation_mm
            ));
        }
    }
    if let Some(dh) = deviation.solid_height_deviation_mm {
        if dh.abs() > 1.0 {
            issues.push(format!("Solid height off by {dh:+.2} mm"));
            recommendations.push("Verify wire diameter and end grinding depth".to_string());
        }
    }

    if issues.is_empty() {
        recommendations.push("Model matches measurement; no action needed".to_string());
    }
    (issues, recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theory() -> TheoreticalParameters {
        TheoreticalParameters {
            wire_diameter: 12.0,
            mean_diameter: 100.0,
            active_coils: 6.0,
            spring_rate: 25.0,
            shear_modulus: 79_300.0,
            free_length: Some(220.0),
            solid_height: Some(84.0),
        }
    }

    fn input(pairs: &[(f64, f64)]) -> CalibrationInput {
        CalibrationInput {
            label: "test".to_string(),
            experimental: ExperimentalData::from_pairs(pairs),
            theoretical: theory(),
        }
    }

    fn linear(rate: f64, points: usize) -> Vec<(f64, f64)> {
        (0..points)
            .map(|i| {
                let x = i as f64 * 5.0;
                (x, rate * x)
            })
            .collect()
    }

    #[test]
    fn test_round_trip_is_excellent() {
        let result = calculate(&input(&linear(25.0, 20))).unwrap();
        assert!((result.fit.slope - 25.0).abs() < 1e-9);
        assert!((result.fit.r_squared - 1.0).abs() < 1e-12);
        assert!((result.effective.stiffness_ratio - 1.0).abs() < 1e-9);
        assert!((result.effective.wire_diameter / 12.0 - 1.0).abs() < 1e-9);
        assert!((result.effective.mean_diameter / 100.0 - 1.0).abs() < 1e-9);
        assert!((result.effective.active_coils / 6.0 - 1.0).abs() < 1e-9);
        assert_eq!(result.quality, CalibrationQuality::Excellent);
        assert!(result.issues.is_empty());
        assert!((result.confidence - 1.0).abs() < 1e-9);
        assert_eq!(result.calibrated_curve.len(), 20);
    }

    #[test]
    fn test_stiffer_spring_reverse_solves() {
        // 16% stiffer
        let result = calculate(&input(&linear(29.0, 12))).unwrap();
        let ratio = 29.0 / 25.0;
        assert!((result.effective.stiffness_ratio - ratio).abs() < 1e-9);
        assert!((result.effective.wire_diameter - 12.0 * ratio.powf(0.25)).abs() < 1e-9);
        assert!((result.effective.active_coils - 6.0 / ratio).abs() < 1e-9);
        assert_eq!(result.quality, CalibrationQuality::Poor);
        assert!(!result.issues.is_empty());
    }

    #[test]
    fn test_quality_thresholds() {
        assert_eq!(CalibrationQuality::classify(0.999, 2.0), CalibrationQuality::Excellent);
        assert_eq!(CalibrationQuality::classify(0.99, 2.0), CalibrationQuality::Good);
        assert_eq!(CalibrationQuality::classify(0.999, -6.0), CalibrationQuality::Good);
        assert_eq!(CalibrationQuality::classify(0.96, 10.0), CalibrationQuality::Acceptable);
        assert_eq!(CalibrationQuality::classify(0.90, 1.0), CalibrationQuality::Poor);
    }

    #[test]
    fn test_short_input_gives_zeroed_fit() {
        let fit = fit_line(&[ExperimentalSample { deflection: 5.0, force: 100.0 }]);
        assert_eq!(fit, LinearFit::default());

        let result = calculate(&input(&[(5.0, 100.0)])).unwrap();
        assert_eq!(result.fit.slope, 0.0);
        assert_eq!(result.deviation.hysteresis_n, None);
        assert_eq!(result.quality, CalibrationQuality::Poor);
        assert!(result.effective.wire_diameter.is_finite());
    }

    #[test]
    fn test_non_finite_samples_are_dropped() {
        let mut pairs = linear(25.0, 10);
        pairs.push((f64::NAN, 10.0));
        let result = calculate(&input(&pairs)).unwrap();
        assert_eq!(result.calibrated_curve.len(), 10);
        assert!((result.fit.slope - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_given_rate_overrides_fit() {
        let mut calibration = input(&linear(25.0, 10));
        calibration.experimental.measured_spring_rate = Some(24.0);
        let result = calculate(&calibration).unwrap();
        assert_eq!(result.measured_spring_rate, 24.0);
        assert!((result.deviation.spring_rate_deviation_pct + 4.0).abs() < 1e-9);
        assert!((result.effective.residual_stress_compensation_pct - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_hysteresis_needs_ten_points() {
        let mut pairs: Vec<(f64, f64)> = (0..6).map(|i| (i as f64 * 10.0, i as f64 * 260.0)).collect();
        pairs.extend((0..6).rev().map(|i| (i as f64 * 10.0, i as f64 * 240.0)));
        let result = calculate(&input(&pairs)).unwrap();
        let gap = result.deviation.hysteresis_n.unwrap();
        // Matched pairs differ by 20·i N for i = 0..5
        assert!((gap - 50.0).abs() < 1e-9);

        let short = calculate(&input(&pairs[..8])).unwrap();
        assert_eq!(short.deviation.hysteresis_n, None);
    }

    #[test]
    fn test_free_length_feeds_pitch_variation() {
        let mut calibration = input(&linear(25.0, 10));
        calibration.experimental.measured_free_length = Some(223.0);
        let result = calculate(&calibration).unwrap();
        assert_eq!(result.deviation.free_length_deviation_mm, Some(3.0));
        assert!((result.effective.pitch_variation_mm - 0.5).abs() < 1e-12);
        assert!((result.effective.coil_diameter_tolerance_mm - 100.0 * 3.0 / 220.0).abs() < 1e-12);
        assert!(result.issues.iter().any(|i| i.contains("Free length")));
    }

    #[test]
    fn test_invalid_theory_is_rejected() {
        let mut calibration = input(&linear(25.0, 10));
        calibration.theoretical.spring_rate = 0.0;
        let err = calculate(&calibration).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
