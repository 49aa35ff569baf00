//! # Spring Geometry
//!
//! The deterministic geometry core. Data flows strictly downstream:
//!
//! ```text
//! GeometryLaws ──► build_centerline ──► transport_frames (inside the builder)
//!                          │
//!                          └──────────► derive_geometry ──► StiffnessSolver
//! ```
//!
//! - [`laws`] - radius, wire diameter and pitch as functions of `s ∈ [0, 1]`
//! - [`centerline`] - sampled 3-D curve, wire radius and arc length
//! - [`frame`] - non-flipping orientation frames along the curve
//! - [`metrics`] - wire length, free length, solid height, mass, segments

pub mod centerline;
pub mod frame;
pub mod laws;
pub mod metrics;

pub use centerline::{build_centerline, Centerline, CenterlineSample};
pub use frame::{transport_frames, Frame};
pub use laws::{
    DiameterShape, EndGrinding, GeometryLaws, MeanDiameterLaw, PitchLaw, PitchStyle,
    WireDiameterLaw,
};
pub use metrics::{derive_geometry, CoilSegment, DerivedGeometry};
