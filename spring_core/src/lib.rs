//! # spring_core - Variable-Geometry Helical Spring Engine
//!
//! `spring_core` is the computational heart of Coilform. It designs and checks
//! helical springs whose coil diameter, wire diameter and pitch all vary along
//! the length, with closed end coils and ground end faces. All inputs and
//! outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: every stage is a pure function of its inputs
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **Graceful**: numeric kernels clamp and fall back instead of failing
//!
//! ## Quick Start
//!
//! ```rust
//! use spring_core::analysis::analyze;
//! use spring_core::design::SpringDesign;
//!
//! let design = SpringDesign::new("Jane Designer", "RS-001");
//! let analysis = analyze(&design).unwrap();
//!
//! println!("free length {:.1} mm", analysis.geometry.free_length);
//! println!("rate {:.1} N/mm", analysis.initial_rate);
//! ```
//!
//! ## Modules
//!
//! - [`design`] - design container, metadata and analysis options
//! - [`geometry`] - laws, centerline, frames and derived geometry
//! - [`calculations`] - stiffness, fatigue, design rules, calibration
//! - [`analysis`] - the end-to-end pipeline
//! - [`validation`] - blocking errors and advisory warnings
//! - [`materials`] - material model and spring wire presets
//! - [`loads`] - load cases and installation constraints
//! - [`fea`] - structural solver job and result schema
//! - [`units`] - type-safe unit wrappers
//! - [`errors`] - structured error types
//! - [`file_io`] - design files with atomic saves and locking

pub mod analysis;
pub mod calculations;
pub mod design;
pub mod errors;
pub mod fea;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod geometry;
pub mod loads;
pub mod materials;
pub mod math;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use analysis::{analyze, SpringAnalysis};
pub use design::{AnalysisOptions, DesignMetadata, SpringDesign};
pub use errors::{SpringError, SpringResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_design, save_design, DesignLock};
pub use validation::{validate, ValidationReport};
