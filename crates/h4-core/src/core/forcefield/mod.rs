//! # Correction Model Module
//!
//! The functional form and parameters of the H4 hydrogen-bond correction and the H-H
//! repulsion term.
//!
//! ## Key Components
//!
//! - [`potentials`] - Radial, angular and valence switching polynomials with derivatives
//! - [`params`] - The ten-field parameter record and its TOML loader
//! - [`presets`] - Published parameter sets embedded in the library
//! - [`term`] - Per-term energy bookkeeping
//!
//! ## Usage
//!
//! ```
//! use h4corr::core::forcefield::presets::Method;
//!
//! let params = Method::Pm6D3H4.parameters();
//! assert_eq!(params.hbond().oh_o, 2.32);
//! ```

pub mod params;
pub(crate) mod potentials;
pub mod presets;
pub mod term;
