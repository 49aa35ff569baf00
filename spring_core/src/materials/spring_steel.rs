//! Spring Wire Grades
//!
//! Typical property sets for common helical spring wires. Tensile strength is
//! strongly diameter-dependent for drawn wire; the values here are mid-range
//! figures for suspension-size wire and should be overridden from mill certs.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{SpringError, SpringResult};
use crate::materials::MaterialModel;
use crate::units::{Gigapascals, Megapascals};

/// Spring wire grades with built-in property sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpringSteelGrade {
    /// SAE 9254 silicon-chromium, oil tempered (suspension springs)
    #[serde(rename = "SAE9254")]
    Sae9254,
    /// 51CrV4 / SAE 6150 chromium-vanadium
    #[serde(rename = "51CrV4")]
    CrV51,
    /// EN 10270-1 DH patented cold-drawn music wire
    #[serde(rename = "MusicWire")]
    MusicWire,
    /// AISI 302 / EN 1.4310 stainless spring wire
    #[serde(rename = "AISI302")]
    Stainless302,
}

impl SpringSteelGrade {
    /// All grades, in presentation order
    pub const ALL: [SpringSteelGrade; 4] = [
        SpringSteelGrade::Sae9254,
        SpringSteelGrade::CrV51,
        SpringSteelGrade::MusicWire,
        SpringSteelGrade::Stainless302,
    ];

    /// Lookup code (also the serialized name)
    pub fn code(&self) -> &'static str {
        match self {
            SpringSteelGrade::Sae9254 => "SAE9254",
            SpringSteelGrade::CrV51 => "51CrV4",
            SpringSteelGrade::MusicWire => "MusicWire",
            SpringSteelGrade::Stainless302 => "AISI302",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SpringSteelGrade::Sae9254 => "SAE 9254 (SiCr, oil tempered)",
            SpringSteelGrade::CrV51 => "51CrV4 (CrV)",
            SpringSteelGrade::MusicWire => "EN 10270-1 DH music wire",
            SpringSteelGrade::Stainless302 => "AISI 302 stainless",
        }
    }

    /// Property set for this grade.
    pub fn material(&self) -> MaterialModel {
        // (G GPa, E GPa, Rm MPa, density kg/m³)
        let (g, e, rm, rho) = match self {
            SpringSteelGrade::Sae9254 => (79.3, 206.0, 1960.0, 7850.0),
            SpringSteelGrade::CrV51 => (78.5, 206.0, 1800.0, 7850.0),
            SpringSteelGrade::MusicWire => (81.5, 206.0, 2000.0, 7850.0),
            SpringSteelGrade::Stainless302 => (69.0, 193.0, 1650.0, 7900.0),
        };
        MaterialModel {
            name: self.code().to_string(),
            shear_modulus_mpa: Megapascals::from(Gigapascals(g)).0,
            elastic_modulus_mpa: Megapascals::from(Gigapascals(e)).0,
            tensile_strength_mpa: rm,
            density_kg_m3: rho,
            poisson_ratio: 0.3,
        }
    }

    /// Parse from common spellings ("SAE 9254", "54SiCr6", "51crv4", ...)
    pub fn from_str_flexible(s: &str) -> SpringResult<Self> {
        let key = normalize_key(s);
        GRADE_INDEX
            .get(key.as_str())
            .copied()
            .ok_or_else(|| SpringError::material_not_found(s))
    }
}

fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Normalized name/alias → grade.
static GRADE_INDEX: Lazy<HashMap<&'static str, SpringSteelGrade>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (alias, grade) in [
        ("SAE9254", SpringSteelGrade::Sae9254),
        ("9254", SpringSteelGrade::Sae9254),
        ("54SICR6", SpringSteelGrade::Sae9254),
        ("51CRV4", SpringSteelGrade::CrV51),
        ("SAE6150", SpringSteelGrade::CrV51),
        ("MUSICWIRE", SpringSteelGrade::MusicWire),
        ("EN102701", SpringSteelGrade::MusicWire),
        ("ASTMA228", SpringSteelGrade::MusicWire),
        ("AISI302", SpringSteelGrade::Stainless302),
        ("302", SpringSteelGrade::Stainless302),
        ("14310", SpringSteelGrade::Stainless302),
    ] {
        index.insert(alias, grade);
    }
    index
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flexible_lookup() {
        assert_eq!(SpringSteelGrade::from_str_flexible("SAE 9254").unwrap(), SpringSteelGrade::Sae9254);
        assert_eq!(SpringSteelGrade::from_str_flexible("54SiCr6").unwrap(), SpringSteelGrade::Sae9254);
        assert_eq!(SpringSteelGrade::from_str_flexible("51crv4").unwrap(), SpringSteelGrade::CrV51);
        assert_eq!(SpringSteelGrade::from_str_flexible("1.4310").unwrap(), SpringSteelGrade::Stainless302);
        let err = SpringSteelGrade::from_str_flexible("balsa").unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_NOT_FOUND");
    }

    #[test]
    fn test_every_grade_resolves_by_code() {
        for grade in SpringSteelGrade::ALL {
            assert_eq!(SpringSteelGrade::from_str_flexible(grade.code()).unwrap(), grade);
        }
    }

    #[test]
    fn test_sae9254_properties() {
        let m = SpringSteelGrade::Sae9254.material();
        assert!((m.shear_modulus_mpa - 79_300.0).abs() < 1e-9);
        assert!((m.elastic_modulus_mpa - 206_000.0).abs() < 1e-9);
        assert_eq!(m.name, "SAE9254");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SpringSteelGrade::CrV51).unwrap();
        assert_eq!(json, "\"51CrV4\"");
    }
}
