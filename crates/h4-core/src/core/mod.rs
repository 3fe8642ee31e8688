//! # Core Module
//!
//! Stateless building blocks of the correction engine.
//!
//! ## Overview
//!
//! - **Atomic Representation** ([`models`]) - Elements, atoms, validated configurations and
//!   gradient fields
//! - **Correction Model** ([`forcefield`]) - Switching polynomials, typed parameters and the
//!   embedded PM6-D3H4 preset
//! - **File I/O** ([`io`]) - XYZ geometries and reference output files used for validation
//! - **Utilities** ([`utils`]) - Geometry helpers and an open-boundary cell list
//!
//! Nothing in this module holds global mutable state; the only shared data is the lazily
//! parsed parameter preset, which is immutable.

pub mod forcefield;
pub mod io;
pub mod models;
pub mod utils;
