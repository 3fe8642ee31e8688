//! # Engine Module
//!
//! The evaluators behind the public API.
//!
//! ## Overview
//!
//! Each correction term is a pure task over an [`AtomicConfiguration`], the
//! [`CorrectionParameters`] and the [`EvaluationOptions`](config::EvaluationOptions).
//! The tasks share a continuous-valence table and a candidate search that is either a cell
//! list or a plain all-pairs scan; both enumerate the same interactions.
//!
//! - **Configuration** ([`config`]) - Evaluation options and their builder
//! - **Error Handling** ([`error`]) - Domain errors and the umbrella [`CorrectionError`]
//!
//! [`AtomicConfiguration`]: crate::core::models::configuration::AtomicConfiguration
//! [`CorrectionParameters`]: crate::core::forcefield::params::CorrectionParameters
//! [`CorrectionError`]: error::CorrectionError

pub mod config;
pub mod error;
pub(crate) mod search;
pub(crate) mod tasks;
pub(crate) mod valence;
