//! # Structural Solver Interchange
//!
//! Job descriptions for the remote finite-element worker and the summary it
//! sends back. Only the JSON shapes live here; transport is the caller's
//! business.
//!
//! ## JSON Example (request)
//!
//! ```json
//! {
//!   "design_code": "RS-001",
//!   "geometry": {
//!     "section_type": "CIRC",
//!     "wire_diameter": 12.0,
//!     "mean_diameter": 100.0,
//!     "active_coils": 6.0,
//!     "total_coils": 8.0,
//!     "free_length": 222.0,
//!     "end_type": "closed_ground",
//!     "dm_start": 100.0,
//!     "dm_mid": 100.0,
//!     "dm_end": 100.0
//!   },
//!   "material": { "E": 206000.0, "nu": 0.3, "G": 79300.0, "name": "SAE9254" },
//!   "loadcases": [{ "name": "RIDE", "target_height": 182.0 }],
//!   "mesh_level": "medium"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::analysis::SpringAnalysis;
use crate::design::SpringDesign;
use crate::errors::{SpringError, SpringResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshLevel {
    Coarse,
    #[default]
    Medium,
    Fine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndType {
    Open,
    Closed,
    ClosedGround,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaGeometry {
    /// "CIRC" for round wire
    pub section_type: String,
    pub wire_diameter: f64,
    pub mean_diameter: f64,
    pub active_coils: f64,
    pub total_coils: f64,
    pub free_length: f64,
    pub end_type: EndType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_mid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_end: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaMaterial {
    #[serde(rename = "E")]
    pub elastic_modulus: f64,
    #[serde(rename = "nu")]
    pub poisson_ratio: f64,
    #[serde(rename = "G")]
    pub shear_modulus: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaLoadCase {
    pub name: String,
    /// Compressed height (mm)
    pub target_height: f64,
}

/// Job request in the worker's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaJobRequest {
    pub design_code: String,
    pub geometry: FeaGeometry,
    pub material: FeaMaterial,
    pub loadcases: Vec<FeaLoadCase>,
    #[serde(default)]
    pub mesh_level: MeshLevel,
}

impl FeaJobRequest {
    /// Build a request from an analysed design. Needs at least one of ride
    /// or bump so there is something to load.
    pub fn from_analysis(
        design: &SpringDesign,
        analysis: &SpringAnalysis,
        mesh_level: MeshLevel,
    ) -> SpringResult<Self> {
        let loadcases: Vec<FeaLoadCase> = [("RIDE", &analysis.ride), ("BUMP", &analysis.bump)]
            .into_iter()
            .filter_map(|(name, point)| {
                point.as_ref().map(|p| FeaLoadCase {
                    name: name.to_string(),
                    target_height: p.height,
                })
            })
            .collect();
        if loadcases.is_empty() {
            return Err(SpringError::missing_field("load_case.ride"));
        }

        let laws = &design.laws;
        let grinding = &laws.end_grinding;
        let end_type = if grinding.ground_start && grinding.ground_end {
            EndType::ClosedGround
        } else if laws.pitch.closed_turns_start > 0.0 || laws.pitch.closed_turns_end > 0.0 {
            EndType::Closed
        } else {
            EndType::Open
        };
        let theory = analysis.theoretical_parameters(design);
        let mean = laws.mean_diameter;

        Ok(FeaJobRequest {
            design_code: design.meta.design_code.clone(),
            geometry: FeaGeometry {
                section_type: "CIRC".to_string(),
                wire_diameter: theory.wire_diameter,
                mean_diameter: analysis.geometry.average_mean_diameter,
                active_coils: analysis.geometry.active_turns,
                total_coils: laws.total_turns,
                free_length: analysis.geometry.free_length,
                end_type,
                dm_start: Some(mean.start),
                dm_mid: Some(mean.mid),
                dm_end: Some(mean.end),
            },
            material: FeaMaterial {
                elastic_modulus: design.material.elastic_modulus_mpa,
                poisson_ratio: design.material.poisson_ratio,
                shear_modulus: design.material.shear_modulus_mpa,
                name: design.material.name.clone(),
            },
            loadcases,
            mesh_level,
        })
    }
}

/// Peak values returned by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaSummary {
    /// Peak von Mises stress (MPa)
    pub max_sigma: f64,
    /// Peak displacement magnitude (mm)
    pub max_displacement: f64,
    #[serde(default)]
    pub safety_factor: Option<f64>,
}

impl FeaSummary {
    /// FE peak stress over the analytical peak shear stress. `None` when the
    /// analytical value is zero.
    pub fn stress_ratio(&self, analytical_peak_shear: f64) -> Option<f64> {
        (analytical_peak_shear > 0.0).then(|| self.max_sigma / analytical_peak_shear)
    }
}

/// Worker envelope around a finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaJobResponse {
    pub job_id: String,
    /// "success", "failed" or "error"
    pub status: String,
    pub elapsed_ms: u64,
    #[serde(default)]
    pub results: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl FeaJobResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Surface a failed job as `SpringError::CalculationFailed`.
    pub fn into_results(self) -> SpringResult<serde_json::Value> {
        if !self.is_success() {
            let reason = self
                .error_message
                .unwrap_or_else(|| format!("job {} {}", self.job_id, self.status));
            return Err(SpringError::calculation_failed("fea", reason));
        }
        self.results
            .ok_or_else(|| SpringError::calculation_failed("fea", "worker returned no results"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::loads::{LoadCase, LoadTarget};

    fn analysed() -> (SpringDesign, SpringAnalysis) {
        let mut design = SpringDesign::new("Designer", "RS-001");
        design.load_case = LoadCase::new("front")
            .with_ride(LoadTarget::Deflection { mm: 40.0 })
            .with_bump(LoadTarget::Deflection { mm: 90.0 });
        let analysis = analyze(&design).unwrap();
        (design, analysis)
    }

    #[test]
    fn test_request_matches_worker_schema() {
        let (design, analysis) = analysed();
        let request = FeaJobRequest::from_analysis(&design, &analysis, MeshLevel::Fine).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["design_code"], "RS-001");
        assert_eq!(json["geometry"]["section_type"], "CIRC");
        assert_eq!(json["geometry"]["end_type"], "closed_ground");
        assert!((json["material"]["G"].as_f64().unwrap() - 79_300.0).abs() < 1e-6);
        assert_eq!(json["mesh_level"], "fine");
        assert_eq!(json["loadcases"][0]["name"], "RIDE");
        assert_eq!(json["loadcases"].as_array().unwrap().len(), 2);

        let ride_height = json["loadcases"][0]["target_height"].as_f64().unwrap();
        assert!((ride_height - (analysis.geometry.free_length - 40.0)).abs() < 1e-9);
    }

    #[test]
    fn test_request_needs_a_load_case() {
        let (design, mut analysis) = analysed();
        analysis.ride = None;
        analysis.bump = None;
        let err = FeaJobRequest::from_analysis(&design, &analysis, MeshLevel::Medium).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_summary_from_worker_json() {
        let json = r#"{ "nodes": [], "maxSigma": 812.5, "maxDisplacement": 91.2, "safetyFactor": null }"#;
        let summary: FeaSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.max_sigma, 812.5);
        assert_eq!(summary.safety_factor, None);
        assert_eq!(summary.stress_ratio(650.0), Some(812.5 / 650.0));
        assert_eq!(summary.stress_ratio(0.0), None);
    }

    #[test]
    fn test_failed_job_response() {
        let json = r#"{ "job_id": "a1", "status": "failed", "elapsed_ms": 1200, "error_message": "did not converge" }"#;
        let response: FeaJobResponse = serde_json::from_str(json).unwrap();
        let err = response.into_results().unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
    }
}
