//! Installation constraints: how the spring is guided laterally.

use serde::{Deserialize, Serialize};

/// Lateral guidance of the spring body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideType {
    /// Guided on an inner rod (e.g. around a damper body)
    Rod,
    /// Guided inside a bore or tube
    Bore,
    /// Free-standing
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InstallationConstraints {
    #[serde(default)]
    pub guide: GuideType,
    /// Rod outer diameter or bore inner diameter (mm)
    #[serde(default)]
    pub guide_diameter_mm: Option<f64>,
}

impl InstallationConstraints {
    pub fn unguided() -> Self {
        InstallationConstraints::default()
    }

    pub fn rod(diameter_mm: f64) -> Self {
        InstallationConstraints {
            guide: GuideType::Rod,
            guide_diameter_mm: Some(diameter_mm),
        }
    }

    pub fn bore(diameter_mm: f64) -> Self {
        InstallationConstraints {
            guide: GuideType::Bore,
            guide_diameter_mm: Some(diameter_mm),
        }
    }

    pub fn is_guided(&self) -> bool {
        self.guide != GuideType::None
    }
}
