//! # Core Models Module
//!
//! Data structures describing the input and output of an evaluation.
//!
//! ## Key Components
//!
//! - [`element`] - Chemical elements as a compact value type with static lookup tables
//! - [`atom`] - A single atom and its hydrogen-bond role
//! - [`configuration`] - An ordered, validated set of atoms
//! - [`gradient`] - Per-atom gradients and correction results
//!
//! ## Usage
//!
//! ```
//! use h4corr::core::models::configuration::AtomicConfiguration;
//!
//! let water = AtomicConfiguration::from_parts(
//!     &[[0.0, 0.0, 0.0], [0.9572, 0.0, 0.0], [-0.24, 0.9266, 0.0]],
//!     &[8, 1, 1],
//! )?;
//! assert_eq!(water.len(), 3);
//! # Ok::<(), h4corr::core::models::configuration::ConfigurationError>(())
//! ```

pub mod atom;
pub mod configuration;
pub mod element;
pub mod gradient;
