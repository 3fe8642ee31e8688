//! # Workflows Module
//!
//! High-level entry points of the library.
//!
//! ## Overview
//!
//! A [`Corrector`](correction::Corrector) is a caller-owned handle that pairs a parameter
//! set with evaluation options. It validates raw host arrays, dispatches to the H4 and H-H
//! repulsion evaluators and returns energies with analytic gradients. There is no global
//! library state: independent handles can be used concurrently.

pub mod correction;
