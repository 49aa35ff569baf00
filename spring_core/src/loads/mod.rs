//! # Load Cases and Installation
//!
//! How the spring is mounted and how far it is driven in service. Operating
//! points can be given either as deflections from free length or as installed
//! heights; both resolve to a deflection once the free length is known.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::loads::{LoadCase, LoadTarget};
//!
//! let load_case = LoadCase::new("Front axle")
//!     .with_ride(LoadTarget::Height { mm: 240.0 })
//!     .with_bump(LoadTarget::Deflection { mm: 95.0 });
//!
//! assert_eq!(load_case.ride_deflection(300.0), Some(60.0));
//! assert_eq!(load_case.bump_deflection(300.0), Some(95.0));
//! ```

pub mod installation;

pub use installation::{GuideType, InstallationConstraints};

use serde::{Deserialize, Serialize};

/// A single operating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadTarget {
    /// Axial deflection from free length (mm)
    Deflection { mm: f64 },
    /// Installed (compressed) height (mm)
    Height { mm: f64 },
}

impl LoadTarget {
    /// Deflection from free length, never negative.
    pub fn deflection(&self, free_length: f64) -> f64 {
        match *self {
            LoadTarget::Deflection { mm } => mm.max(0.0),
            LoadTarget::Height { mm } => (free_length - mm).max(0.0),
        }
    }
}

/// Ride/bump operating points and the solid-height margin requirement.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Rear axle",
///   "ride": { "kind": "height", "mm": 250.0 },
///   "bump": { "kind": "deflection", "mm": 110.0 },
///   "min_solid_margin_mm": 5.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    pub label: String,
    /// Static (design) ride position
    #[serde(default)]
    pub ride: Option<LoadTarget>,
    /// Compression limit (bump stop)
    #[serde(default)]
    pub bump: Option<LoadTarget>,
    /// Required clearance above solid height at bump (mm)
    #[serde(default = "default_min_solid_margin")]
    pub min_solid_margin_mm: f64,
}

fn default_min_solid_margin() -> f64 {
    3.0
}

impl LoadCase {
    pub fn new(label: impl Into<String>) -> Self {
        LoadCase {
            label: label.into(),
            ride: None,
            bump: None,
            min_solid_margin_mm: default_min_solid_margin(),
        }
    }

    pub fn with_ride(mut self, target: LoadTarget) -> Self {
        self.ride = Some(target);
        self
    }

    pub fn with_bump(mut self, target: LoadTarget) -> Self {
        self.bump = Some(target);
        self
    }

    pub fn with_min_solid_margin(mut self, margin_mm: f64) -> Self {
        self.min_solid_margin_mm = margin_mm;
        self
    }

    pub fn ride_deflection(&self, free_length: f64) -> Option<f64> {
        self.ride.map(|t| t.deflection(free_length))
    }

    pub fn bump_deflection(&self, free_length: f64) -> Option<f64> {
        self.bump.map(|t| t.deflection(free_length))
    }
}

impl Default for LoadCase {
    fn default() -> Self {
        LoadCase::new("Default")
    }
}
