//! # Spring Design Document
//!
//! `SpringDesign` is the root container for one spring: its geometry laws,
//! material, installation, load case, analysis options and any test-rig
//! records collected against it. Designs serialize to `.spd` files as
//! human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! SpringDesign
//! ├── meta: DesignMetadata (version, designer, design code, timestamps)
//! ├── id: Uuid
//! ├── laws: GeometryLaws
//! ├── material: MaterialModel
//! ├── installation: InstallationConstraints
//! ├── load_case: LoadCase
//! ├── options: AnalysisOptions
//! └── test_records: HashMap<Uuid, TestRecord>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use spring_core::design::SpringDesign;
//!
//! let design = SpringDesign::new("Jane Designer", "FS-2025-014");
//! let json = serde_json::to_string_pretty(&design).unwrap();
//! let back: SpringDesign = serde_json::from_str(&json).unwrap();
//! assert_eq!(back.meta.design_code, "FS-2025-014");
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::calibration::ExperimentalData;
use crate::geometry::GeometryLaws;
use crate::loads::{InstallationConstraints, LoadCase};
use crate::materials::MaterialModel;

/// Current schema version for .spd files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root design container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpringDesign {
    pub meta: DesignMetadata,

    /// Stable identity across renames and copies
    pub id: Uuid,

    pub laws: GeometryLaws,

    #[serde(default)]
    pub material: MaterialModel,

    #[serde(default)]
    pub installation: InstallationConstraints,

    #[serde(default)]
    pub load_case: LoadCase,

    #[serde(default)]
    pub options: AnalysisOptions,

    /// Measured force-deflection runs, keyed by UUID
    #[serde(default)]
    pub test_records: HashMap<Uuid, TestRecord>,
}

impl SpringDesign {
    /// Create a design with the default laws and material.
    ///
    /// # Example
    ///
    /// ```rust
    /// use spring_core::design::SpringDesign;
    ///
    /// let design = SpringDesign::new("John Doe", "RS-001");
    /// assert_eq!(design.meta.designer, "John Doe");
    /// assert!(design.test_records.is_empty());
    /// ```
    pub fn new(designer: impl Into<String>, design_code: impl Into<String>) -> Self {
        let now = Utc::now();
        SpringDesign {
            meta: DesignMetadata {
                version: SCHEMA_VERSION.to_string(),
                designer: designer.into(),
                design_code: design_code.into(),
                created: now,
                modified: now,
            },
            id: Uuid::new_v4(),
            laws: GeometryLaws::default(),
            material: MaterialModel::default(),
            installation: InstallationConstraints::default(),
            load_case: LoadCase::default(),
            options: AnalysisOptions::default(),
            test_records: HashMap::new(),
        }
    }

    /// Attach a test-rig record. Returns the UUID assigned to it.
    pub fn add_test_record(&mut self, record: TestRecord) -> Uuid {
        let id = Uuid::new_v4();
        self.test_records.insert(id, record);
        self.touch();
        id
    }

    pub fn remove_test_record(&mut self, id: &Uuid) -> Option<TestRecord> {
        let record = self.test_records.remove(id);
        if record.is_some() {
            self.touch();
        }
        record
    }

    pub fn get_test_record(&self, id: &Uuid) -> Option<&TestRecord> {
        self.test_records.get(id)
    }

    /// Most recently recorded test run.
    pub fn latest_test_record(&self) -> Option<&TestRecord> {
        self.test_records.values().max_by_key(|r| r.recorded)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for SpringDesign {
    fn default() -> Self {
        SpringDesign::new("", "")
    }
}

/// Design metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub designer: String,

    /// Part or drawing number; forwarded to the structural solver
    pub design_code: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Sampling and resolution knobs for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Centerline density (samples per turn)
    #[serde(default = "default_samples_per_turn")]
    pub samples_per_turn: f64,

    /// Ceiling on total centerline samples; density is reduced to fit
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Points on the stiffness curve
    #[serde(default = "default_curve_points")]
    pub curve_points: usize,

    /// Fraction of the travel to solid at which the reference force is reported
    #[serde(default = "default_reference_deflection_fraction")]
    pub reference_deflection_fraction: f64,
}

fn default_samples_per_turn() -> f64 {
    48.0
}

fn default_max_samples() -> usize {
    2400
}

fn default_curve_points() -> usize {
    crate::calculations::stiffness::DEFAULT_CURVE_POINTS
}

fn default_reference_deflection_fraction() -> f64 {
    0.5
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            samples_per_turn: default_samples_per_turn(),
            max_samples: default_max_samples(),
            curve_points: default_curve_points(),
            reference_deflection_fraction: default_reference_deflection_fraction(),
        }
    }
}

/// One force-deflection run on a physical part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub label: String,
    pub recorded: DateTime<Utc>,
    pub data: ExperimentalData,
}

impl TestRecord {
    pub fn new(label: impl Into<String>, data: ExperimentalData) -> Self {
        TestRecord {
            label: label.into(),
            recorded: Utc::now(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_creation() {
        let design = SpringDesign::new("John Doe", "RS-001");
        assert_eq!(design.meta.designer, "John Doe");
        assert_eq!(design.meta.design_code, "RS-001");
        assert_eq!(design.meta.version, SCHEMA_VERSION);
        assert_eq!(design.options, AnalysisOptions::default());
    }

    #[test]
    fn test_design_serialization() {
        let design = SpringDesign::new("Jane Designer", "FS-042");
        let json = serde_json::to_string_pretty(&design).unwrap();

        assert!(json.contains("Jane Designer"));
        assert!(json.contains("closed_pitch_factor"));

        let roundtrip: SpringDesign = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.id, design.id);
        assert_eq!(roundtrip.laws, design.laws);
    }

    #[test]
    fn test_minimal_json_fills_defaults() {
        let json = r#"{
            "meta": {
                "version": "0.1.0",
                "designer": "x",
                "design_code": "y",
                "created": "2025-01-01T00:00:00Z",
                "modified": "2025-01-01T00:00:00Z"
            },
            "id": "6f1c2d7e-4a5b-4c3d-9e8f-0a1b2c3d4e5f",
            "laws": {
                "total_turns": 7.5,
                "mean_diameter": { "start": 90.0, "mid": 110.0, "end": 90.0, "shape": "bulge" },
                "wire_diameter": { "start": 11.0, "mid": 11.0, "end": 11.0 },
                "pitch": {
                    "closed_turns_start": 1.0,
                    "closed_turns_end": 1.0,
                    "working_min": 28.0,
                    "working_max": 34.0
                }
            }
        }"#;
        let design: SpringDesign = serde_json::from_str(json).unwrap();
        assert_eq!(design.laws.total_turns, 7.5);
        assert_eq!(design.laws.pitch.transition_sharpness, 2.0);
        assert!(design.laws.end_grinding.ground_start);
        assert_eq!(design.material.name, "SAE9254");
        assert_eq!(design.options.max_samples, 2400);
        assert!(design.test_records.is_empty());
    }

    #[test]
    fn test_add_remove_test_record() {
        let mut design = SpringDesign::new("Designer", "RS-001");
        let data = ExperimentalData::from_pairs(&[(0.0, 0.0), (10.0, 250.0)]);

        let id = design.add_test_record(TestRecord::new("Lot 1", data));
        assert_eq!(design.test_records.len(), 1);
        assert_eq!(design.get_test_record(&id).unwrap().label, "Lot 1");
        assert_eq!(design.latest_test_record().unwrap().label, "Lot 1");

        assert!(design.remove_test_record(&id).is_some());
        assert!(design.remove_test_record(&id).is_none());
        assert!(design.latest_test_record().is_none());
    }
}
