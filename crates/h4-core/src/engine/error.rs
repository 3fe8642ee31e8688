use thiserror::Error;

use super::config::ConfigError;
use crate::core::forcefield::params::ParameterError;
use crate::core::models::configuration::ConfigurationError;

/// Geometric degeneracies that make the correction undefined.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Atoms {first} and {second} coincide (separation {distance:.3e} Å)")]
    CoincidentAtoms {
        first: usize,
        second: usize,
        distance: f64,
    },

    #[error("The {term} term overflowed to a non-finite energy or gradient")]
    NonFiniteResult { term: &'static str },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CorrectionError {
    #[error("Invalid atomic configuration: {source}")]
    Configuration {
        #[from]
        source: ConfigurationError,
    },

    #[error("Invalid correction parameters: {source}")]
    Parameters {
        #[from]
        source: ParameterError,
    },

    #[error("Invalid evaluation options: {source}")]
    Options {
        #[from]
        source: ConfigError,
    },

    #[error("Correction is undefined for this geometry: {source}")]
    Domain {
        #[from]
        source: DomainError,
    },
}

impl CorrectionError {
    pub fn is_domain(&self) -> bool {
        matches!(self, CorrectionError::Domain { .. })
    }

    /// True for every error caused by malformed caller input rather than geometry.
    pub fn is_configuration(&self) -> bool {
        !self.is_domain()
    }
}
