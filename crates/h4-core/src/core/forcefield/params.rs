use crate::core::models::element::Element;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Base hydrogen-bond strengths (kcal/mol) by donor and acceptor element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HBondStrengths {
    pub oh_o: f64,
    pub oh_n: f64,
    pub nh_o: f64,
    pub nh_n: f64,
}

impl HBondStrengths {
    /// Strength for a donor/acceptor element pair, or `None` unless both are N or O.
    #[inline]
    pub fn for_pair(&self, donor: Element, acceptor: Element) -> Option<f64> {
        match (donor, acceptor) {
            (Element::OXYGEN, Element::OXYGEN) => Some(self.oh_o),
            (Element::OXYGEN, Element::NITROGEN) => Some(self.oh_n),
            (Element::NITROGEN, Element::OXYGEN) => Some(self.nh_o),
            (Element::NITROGEN, Element::NITROGEN) => Some(self.nh_n),
            _ => None,
        }
    }
}

/// Scaling factors applied in specific chemical environments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentMultipliers {
    /// Water donating to an oxygen acceptor.
    pub water_oxygen: f64,
    /// Protonated (four-coordinate) nitrogen donor.
    pub ammonium: f64,
    /// Carboxylate oxygen acceptor.
    pub carboxylate: f64,
}

/// Shape of the H-H repulsion sigmoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HhRepulsionShape {
    pub k: f64,
    pub exponent: f64,
    pub r0: f64,
}

/// Flat, serialized form of [`CorrectionParameters`], one key per published coefficient.
///
/// This is the layout of parameter files and of the records exchanged with foreign callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterRecord {
    pub para_oh_o: f64,
    pub para_oh_n: f64,
    pub para_nh_o: f64,
    pub para_nh_n: f64,
    pub multiplier_wh_o: f64,
    pub multiplier_nh4: f64,
    pub multiplier_coo: f64,
    pub hh_rep_k: f64,
    pub hh_rep_e: f64,
    pub hh_rep_r0: f64,
}

impl ParameterRecord {
    /// Field names in their canonical order, matching [`ParameterRecord::values`].
    pub const FIELD_NAMES: [&'static str; 10] = [
        "para_oh_o",
        "para_oh_n",
        "para_nh_o",
        "para_nh_n",
        "multiplier_wh_o",
        "multiplier_nh4",
        "multiplier_coo",
        "hh_rep_k",
        "hh_rep_e",
        "hh_rep_r0",
    ];

    pub fn values(&self) -> [f64; 10] {
        [
            self.para_oh_o,
            self.para_oh_n,
            self.para_nh_o,
            self.para_nh_n,
            self.multiplier_wh_o,
            self.multiplier_nh4,
            self.multiplier_coo,
            self.hh_rep_k,
            self.hh_rep_e,
            self.hh_rep_r0,
        ]
    }

    pub fn from_values(values: [f64; 10]) -> Self {
        let [
            para_oh_o,
            para_oh_n,
            para_nh_o,
            para_nh_n,
            multiplier_wh_o,
            multiplier_nh4,
            multiplier_coo,
            hh_rep_k,
            hh_rep_e,
            hh_rep_r0,
        ] = values;
        Self {
            para_oh_o,
            para_oh_n,
            para_nh_o,
            para_nh_n,
            multiplier_wh_o,
            multiplier_nh4,
            multiplier_coo,
            hh_rep_k,
            hh_rep_e,
            hh_rep_r0,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Parameter '{name}' must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("H-H repulsion reference distance must be positive, got {0}")]
    NonPositiveReferenceDistance(f64),
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// The ten empirical coefficients of the correction, validated and immutable.
///
/// Every field is mandatory; there is no default parameter set other than the named presets
/// in [`super::presets`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterRecord", into = "ParameterRecord")]
pub struct CorrectionParameters {
    hbond: HBondStrengths,
    multipliers: EnvironmentMultipliers,
    hh_repulsion: HhRepulsionShape,
}

impl CorrectionParameters {
    /// Creates a validated parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] if any value is not finite or the repulsion reference
    /// distance is not positive.
    pub fn new(
        hbond: HBondStrengths,
        multipliers: EnvironmentMultipliers,
        hh_repulsion: HhRepulsionShape,
    ) -> Result<Self, ParameterError> {
        Self::from_record(ParameterRecord {
            para_oh_o: hbond.oh_o,
            para_oh_n: hbond.oh_n,
            para_nh_o: hbond.nh_o,
            para_nh_n: hbond.nh_n,
            multiplier_wh_o: multipliers.water_oxygen,
            multiplier_nh4: multipliers.ammonium,
            multiplier_coo: multipliers.carboxylate,
            hh_rep_k: hh_repulsion.k,
            hh_rep_e: hh_repulsion.exponent,
            hh_rep_r0: hh_repulsion.r0,
        })
    }

    pub fn from_record(record: ParameterRecord) -> Result<Self, ParameterError> {
        for (name, value) in ParameterRecord::FIELD_NAMES.into_iter().zip(record.values()) {
            if !value.is_finite() {
                return Err(ParameterError::NonFinite { name, value });
            }
        }
        if record.hh_rep_r0 <= 0.0 {
            return Err(ParameterError::NonPositiveReferenceDistance(
                record.hh_rep_r0,
            ));
        }

        Ok(Self {
            hbond: HBondStrengths {
                oh_o: record.para_oh_o,
                oh_n: record.para_oh_n,
                nh_o: record.para_nh_o,
                nh_n: record.para_nh_n,
            },
            multipliers: EnvironmentMultipliers {
                water_oxygen: record.multiplier_wh_o,
                ammonium: record.multiplier_nh4,
                carboxylate: record.multiplier_coo,
            },
            hh_repulsion: HhRepulsionShape {
                k: record.hh_rep_k,
                exponent: record.hh_rep_e,
                r0: record.hh_rep_r0,
            },
        })
    }

    pub fn to_record(&self) -> ParameterRecord {
        ParameterRecord {
            para_oh_o: self.hbond.oh_o,
            para_oh_n: self.hbond.oh_n,
            para_nh_o: self.hbond.nh_o,
            para_nh_n: self.hbond.nh_n,
            multiplier_wh_o: self.multipliers.water_oxygen,
            multiplier_nh4: self.multipliers.ammonium,
            multiplier_coo: self.multipliers.carboxylate,
            hh_rep_k: self.hh_repulsion.k,
            hh_rep_e: self.hh_repulsion.exponent,
            hh_rep_r0: self.hh_repulsion.r0,
        }
    }

    #[inline]
    pub fn hbond(&self) -> &HBondStrengths {
        &self.hbond
    }

    #[inline]
    pub fn multipliers(&self) -> &EnvironmentMultipliers {
        &self.multipliers
    }

    #[inline]
    pub fn hh_repulsion(&self) -> &HhRepulsionShape {
        &self.hh_repulsion
    }

    /// Loads a parameter set from a TOML file with one key per coefficient.
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(&self.to_record())
    }
}

impl TryFrom<ParameterRecord> for CorrectionParameters {
    type Error = ParameterError;

    fn try_from(record: ParameterRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

impl From<CorrectionParameters> for ParameterRecord {
    fn from(params: CorrectionParameters) -> Self {
        params.to_record()
    }
}
