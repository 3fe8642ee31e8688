//! # H4 Correction Library
//!
//! Empirical hydrogen-bond (H4) and hydrogen-hydrogen repulsion corrections for
//! semiempirical quantum-chemistry methods such as PM6, with analytic Cartesian gradients.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`AtomicConfiguration`,
//!   `GradientField`), the switching polynomials and typed parameters of the correction,
//!   and I/O for XYZ geometries and reference output files.
//!
//! - **[`engine`]: The Logic Core.** Pure evaluators for each term, a continuous-valence
//!   table shared between them and the candidate search (cell list or all pairs). Work is
//!   split per hydrogen and reduced in a fixed order, so results do not depend on the
//!   number of threads.
//!
//! - **[`workflows`]: The Public API.** The `Corrector` handle that validates host data and
//!   dispatches to the evaluators.
//!
//! Energies are in kcal/mol, distances in Angstroms and gradients in kcal/mol/Å.

pub mod core;
pub mod engine;
pub mod workflows;

#[cfg(test)]
mod testing;
