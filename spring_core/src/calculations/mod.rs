//! # Spring Calculations
//!
//! Everything downstream of the derived geometry. Each module follows the
//! same shape: JSON-serializable inputs and results around a pure function.
//!
//! ## Available Calculations
//!
//! - [`stiffness`] - progressive coil-bind stiffness curve and Wahl stress
//! - [`fatigue`] - ride/bump operating points and Goodman fatigue check
//! - [`rules`] - manufacturability and safety design rules
//! - [`calibration`] - digital-twin calibration against test-rig data

pub mod calibration;
pub mod fatigue;
pub mod rules;
pub mod stiffness;

pub use calibration::{CalibrationInput, CalibrationQuality, CalibrationResult, ExperimentalData};
pub use fatigue::{FatigueEvaluation, FatigueLife, OperatingPoint};
pub use rules::{check_design_rules, DesignRuleFinding, RuleInput, Severity};
pub use stiffness::{wahl_factor, StiffnessCurve, StiffnessCurvePoint, StiffnessSolver};
