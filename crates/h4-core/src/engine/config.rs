use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_HH_SWITCH_ON: f64 = 5.0;
pub const DEFAULT_HH_CUTOFF: f64 = 6.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Option '{name}' must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("H-H switching range must satisfy 0 < on < off, got on = {on}, off = {off}")]
    InvalidSwitchRange { on: f64, off: f64 },
    #[error("Unknown neighbor search '{0}' (expected 'cell-list' or 'all-pairs')")]
    UnknownNeighborSearch(String),
}

/// How candidate interaction partners are enumerated.
///
/// Both strategies apply the same exact distance tests and visit candidates in the same
/// order, so they produce identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NeighborSearch {
    #[default]
    CellList,
    AllPairs,
}

impl fmt::Display for NeighborSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborSearch::CellList => write!(f, "cell-list"),
            NeighborSearch::AllPairs => write!(f, "all-pairs"),
        }
    }
}

impl FromStr for NeighborSearch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cell-list" | "cell_list" | "cells" => Ok(NeighborSearch::CellList),
            "all-pairs" | "all_pairs" | "brute-force" => Ok(NeighborSearch::AllPairs),
            _ => Err(ConfigError::UnknownNeighborSearch(s.to_string())),
        }
    }
}

/// Numerical options that are independent of the published parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationOptions {
    pub neighbor_search: NeighborSearch,
    /// Distance (Å) at which the H-H repulsion starts to be switched off.
    pub hh_switch_on: f64,
    /// Distance (Å) at and beyond which the H-H repulsion is exactly zero.
    pub hh_cutoff: f64,
    /// Evaluate the two terms concurrently when the `parallel` feature is enabled.
    pub concurrent_terms: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            neighbor_search: NeighborSearch::default(),
            hh_switch_on: DEFAULT_HH_SWITCH_ON,
            hh_cutoff: DEFAULT_HH_CUTOFF,
            concurrent_terms: true,
        }
    }
}

impl EvaluationOptions {
    pub fn builder() -> EvaluationOptionsBuilder {
        EvaluationOptionsBuilder::new()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("hh_switch_on", self.hh_switch_on),
            ("hh_cutoff", self.hh_cutoff),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        if !(self.hh_switch_on > 0.0 && self.hh_switch_on < self.hh_cutoff) {
            return Err(ConfigError::InvalidSwitchRange {
                on: self.hh_switch_on,
                off: self.hh_cutoff,
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct EvaluationOptionsBuilder {
    neighbor_search: Option<NeighborSearch>,
    hh_switch_on: Option<f64>,
    hh_cutoff: Option<f64>,
    concurrent_terms: Option<bool>,
}

impl EvaluationOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn neighbor_search(mut self, search: NeighborSearch) -> Self {
        self.neighbor_search = Some(search);
        self
    }
    pub fn hh_switch_on(mut self, distance: f64) -> Self {
        self.hh_switch_on = Some(distance);
        self
    }
    pub fn hh_cutoff(mut self, distance: f64) -> Self {
        self.hh_cutoff = Some(distance);
        self
    }
    pub fn concurrent_terms(mut self, enabled: bool) -> Self {
        self.concurrent_terms = Some(enabled);
        self
    }

    pub fn build(self) -> Result<EvaluationOptions, ConfigError> {
        let defaults = EvaluationOptions::default();
        let options = EvaluationOptions {
            neighbor_search: self.neighbor_search.unwrap_or(defaults.neighbor_search),
            hh_switch_on: self.hh_switch_on.unwrap_or(defaults.hh_switch_on),
            hh_cutoff: self.hh_cutoff.unwrap_or(defaults.hh_cutoff),
            concurrent_terms: self.concurrent_terms.unwrap_or(defaults.concurrent_terms),
        };
        options.validate()?;
        Ok(options)
    }
}
