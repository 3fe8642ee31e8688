use crate::core::forcefield::params::CorrectionParameters;
use crate::core::forcefield::presets::Method;
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::models::gradient::{CorrectionBreakdown, CorrectionResult};
use crate::engine::config::EvaluationOptions;
use crate::engine::error::CorrectionError;
use crate::engine::tasks::{combined, h4, hh_repulsion};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, instrument};

/// Selects which correction an evaluation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Term {
    /// The hydrogen-bond correction alone.
    H4,
    /// The hydrogen-hydrogen repulsion alone.
    HhRepulsion,
    /// The sum of both terms.
    #[default]
    Total,
}

impl Term {
    pub const ALL: [Term; 3] = [Term::H4, Term::HhRepulsion, Term::Total];

    pub fn name(self) -> &'static str {
        match self {
            Term::H4 => "h4",
            Term::HhRepulsion => "hh-rep",
            Term::Total => "total",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown correction term '{0}' (expected one of: h4, hh-rep, total)")]
pub struct UnknownTermError(pub String);

impl FromStr for Term {
    type Err = UnknownTermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h4" => Ok(Term::H4),
            "hh-rep" | "hh_rep" | "hh" => Ok(Term::HhRepulsion),
            "total" => Ok(Term::Total),
            _ => Err(UnknownTermError(s.to_string())),
        }
    }
}

/// A caller-owned correction engine: one parameter set and one set of evaluation options.
///
/// Handles are immutable and cheap to clone; independent handles may be used from
/// different threads at the same time.
///
/// ```
/// use h4corr::workflows::correction::{Corrector, Term};
///
/// let corrector = Corrector::default();
/// let result = corrector.evaluate(
///     Term::Total,
///     &[[0.0, 0.0, 0.0], [0.9572, 0.0, 0.0], [2.91, 0.0, 0.0]],
///     &[8, 1, 8],
/// )?;
/// assert!(result.energy < 0.0);
/// # Ok::<(), h4corr::engine::error::CorrectionError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Corrector {
    params: CorrectionParameters,
    options: EvaluationOptions,
}

impl Default for Corrector {
    fn default() -> Self {
        Self::for_method(Method::default())
    }
}

impl Corrector {
    /// Creates a handle with default evaluation options.
    pub fn new(params: CorrectionParameters) -> Self {
        Self {
            params,
            options: EvaluationOptions::default(),
        }
    }

    /// Creates a handle with explicit evaluation options.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectionError::Options`] if the options are inconsistent.
    pub fn with_options(
        params: CorrectionParameters,
        options: EvaluationOptions,
    ) -> Result<Self, CorrectionError> {
        options.validate()?;
        Ok(Self { params, options })
    }

    /// Creates a handle for a published parameter set.
    pub fn for_method(method: Method) -> Self {
        Self::new(*method.parameters())
    }

    pub fn parameters(&self) -> &CorrectionParameters {
        &self.params
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Computes the H4 hydrogen-bond correction and its gradient.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectionError::Domain`] if two atoms coincide within an interaction or
    /// the result is not finite.
    pub fn h4_correction(
        &self,
        config: &AtomicConfiguration,
    ) -> Result<CorrectionResult, CorrectionError> {
        Ok(h4::run(config, &self.params, &self.options)?)
    }

    /// Computes the H-H repulsion and its gradient.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectionError::Domain`] if two hydrogens coincide or the result is not
    /// finite.
    pub fn hh_repulsion(
        &self,
        config: &AtomicConfiguration,
    ) -> Result<CorrectionResult, CorrectionError> {
        Ok(hh_repulsion::run(config, &self.params, &self.options)?)
    }

    /// Computes both terms separately.
    pub fn breakdown(
        &self,
        config: &AtomicConfiguration,
    ) -> Result<CorrectionBreakdown, CorrectionError> {
        Ok(combined::run(config, &self.params, &self.options)?)
    }

    /// Computes the sum of both terms.
    pub fn total(&self, config: &AtomicConfiguration) -> Result<CorrectionResult, CorrectionError> {
        Ok(self.breakdown(config)?.into_total())
    }

    pub fn compute(
        &self,
        term: Term,
        config: &AtomicConfiguration,
    ) -> Result<CorrectionResult, CorrectionError> {
        match term {
            Term::H4 => self.h4_correction(config),
            Term::HhRepulsion => self.hh_repulsion(config),
            Term::Total => self.total(config),
        }
    }

    /// Validates raw host arrays and evaluates one term.
    ///
    /// # Arguments
    ///
    /// * `term` - The correction to evaluate.
    /// * `positions` - Cartesian coordinates in Angstroms, one row per atom.
    /// * `atomic_numbers` - Atomic numbers, index-aligned with `positions`.
    ///
    /// # Return
    ///
    /// The energy in kcal/mol and a gradient with one row per input atom.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectionError::Configuration`] for malformed input and
    /// [`CorrectionError::Domain`] for coincident atoms.
    #[instrument(skip_all, name = "correction_workflow", fields(term = %term, atoms = positions.len()))]
    pub fn evaluate(
        &self,
        term: Term,
        positions: &[[f64; 3]],
        atomic_numbers: &[i64],
    ) -> Result<CorrectionResult, CorrectionError> {
        let config = AtomicConfiguration::from_parts(positions, atomic_numbers)?;
        let result = self.compute(term, &config)?;
        info!(energy = result.energy, "Correction evaluated");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::configuration::ConfigurationError;
    use crate::core::models::gradient::GradientField;
    use crate::core::utils::geometry::rotation_from_axis_angle;
    use crate::engine::config::{ConfigError, NeighborSearch};
    use crate::testing;
    use nalgebra::Vector3;

    const ENERGY_TOLERANCE: f64 = 1e-10;
    const GRADIENT_TOLERANCE: f64 = 1e-9;

    fn assert_results_close(a: &CorrectionResult, b: &CorrectionResult, label: &str) {
        assert!(
            (a.energy - b.energy).abs() < ENERGY_TOLERANCE,
            "{label}: energy {} vs {}",
            a.energy,
            b.energy
        );
        testing::assert_gradient_close(&a.gradient, &b.gradient, GRADIENT_TOLERANCE, label);
    }

    #[test]
    fn term_names_round_trip() {
        for term in Term::ALL {
            assert_eq!(term.to_string().parse::<Term>().unwrap(), term);
        }
        assert_eq!("HH-REP".parse::<Term>().unwrap(), Term::HhRepulsion);
        assert!("dispersion".parse::<Term>().is_err());
    }

    #[test]
    fn evaluate_dispatches_to_each_term() {
        let corrector = Corrector::default();
        let config = testing::water_dimer();
        let positions: Vec<[f64; 3]> = config.positions().iter().map(|p| p.coords.into()).collect();
        let numbers = [8, 1, 1, 8, 1, 1];

        let h4 = corrector.evaluate(Term::H4, &positions, &numbers).unwrap();
        let hh = corrector
            .evaluate(Term::HhRepulsion, &positions, &numbers)
            .unwrap();
        let total = corrector.evaluate(Term::Total, &positions, &numbers).unwrap();

        assert!((h4.energy - testing::WATER_DIMER_E_H4).abs() < ENERGY_TOLERANCE);
        assert!((hh.energy - testing::WATER_DIMER_E_HH).abs() < ENERGY_TOLERANCE);
        assert_eq!(total, h4 + hh);
    }

    #[test]
    fn empty_input_gives_zero_for_every_term() {
        let corrector = Corrector::default();
        for term in Term::ALL {
            let result = corrector.evaluate(term, &[], &[]).unwrap();
            assert_eq!(result.energy, 0.0);
            assert!(result.gradient.is_empty());
        }
    }

    #[test]
    fn malformed_input_is_a_configuration_error() {
        let corrector = Corrector::default();
        let mismatch = corrector
            .evaluate(Term::Total, &[[0.0, 0.0, 0.0]], &[1, 1])
            .unwrap_err();
        assert_eq!(
            mismatch,
            CorrectionError::from(ConfigurationError::LengthMismatch {
                positions: 1,
                elements: 2
            })
        );
        let unknown = corrector
            .evaluate(Term::H4, &[[0.0, 0.0, 0.0]], &[0])
            .unwrap_err();
        assert!(unknown.is_configuration());
        let infinite = corrector
            .evaluate(Term::H4, &[[f64::INFINITY, 0.0, 0.0]], &[1])
            .unwrap_err();
        assert!(infinite.is_configuration());
    }

    #[test]
    fn coincident_atoms_are_a_domain_error() {
        let corrector = Corrector::default();
        let err = corrector
            .evaluate(
                Term::Total,
                &[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [2.9, 0.0, 0.0]],
                &[8, 1, 8],
            )
            .unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn invalid_options_are_rejected() {
        let options = EvaluationOptions {
            hh_switch_on: 7.0,
            ..EvaluationOptions::default()
        };
        let err = Corrector::with_options(*Method::Pm6D3H4.parameters(), options).unwrap_err();
        assert!(matches!(
            err,
            CorrectionError::Options {
                source: ConfigError::InvalidSwitchRange { .. }
            }
        ));
    }

    #[test]
    fn energy_and_gradient_are_translation_invariant() {
        let corrector = Corrector::default();
        let shift = Vector3::new(13.7, -42.1, 5.3);
        for (name, config) in testing::hydrogen_bonded_systems() {
            let moved = config.map_positions(|p| p + shift).unwrap();
            for term in Term::ALL {
                let a = corrector.compute(term, &config).unwrap();
                let b = corrector.compute(term, &moved).unwrap();
                assert_results_close(&a, &b, &format!("{name} {term}"));
            }
        }
    }

    #[test]
    fn energy_is_rotation_invariant_and_gradient_rotates() {
        let corrector = Corrector::default();
        let rotation = rotation_from_axis_angle(&Vector3::new(1.0, -2.0, 0.5), 73.0);
        for (name, config) in testing::hydrogen_bonded_systems() {
            let rotated = config.map_positions(|p| rotation * p).unwrap();
            for term in Term::ALL {
                let a = corrector.compute(term, &config).unwrap();
                let b = corrector.compute(term, &rotated).unwrap();
                let expected = CorrectionResult::new(
                    a.energy,
                    GradientField::from_vectors(a.gradient.iter().map(|g| rotation * g).collect()),
                );
                assert_results_close(&expected, &b, &format!("{name} {term}"));
            }
        }
    }

    #[test]
    fn reordering_atoms_permutes_the_gradient() {
        let corrector = Corrector::default();
        for (name, config) in testing::hydrogen_bonded_systems() {
            let reversed_atoms: Vec<_> = config.atoms().iter().rev().cloned().collect();
            let reversed = AtomicConfiguration::new(reversed_atoms).unwrap();
            let n = config.len();
            for term in Term::ALL {
                let a = corrector.compute(term, &config).unwrap();
                let b = corrector.compute(term, &reversed).unwrap();
                let expected = CorrectionResult::new(
                    a.energy,
                    GradientField::from_vectors((0..n).map(|i| a.gradient[n - 1 - i]).collect()),
                );
                assert_results_close(&expected, &b, &format!("{name} {term}"));
            }
        }
    }

    #[test]
    fn neighbor_search_strategy_does_not_change_results() {
        let cells = Corrector::default();
        let all_pairs = Corrector::with_options(
            *Method::Pm6D3H4.parameters(),
            EvaluationOptions::builder()
                .neighbor_search(NeighborSearch::AllPairs)
                .build()
                .unwrap(),
        )
        .unwrap();
        for (_, config) in testing::hydrogen_bonded_systems() {
            assert_eq!(
                cells.breakdown(&config).unwrap(),
                all_pairs.breakdown(&config).unwrap()
            );
        }
    }

    #[test]
    fn distant_copies_add_up() {
        let corrector = Corrector::default();
        let single = testing::water_dimer();
        let far = single
            .map_positions(|p| p + Vector3::new(25.0, 0.0, 0.0))
            .unwrap();
        let mut atoms = single.atoms().to_vec();
        atoms.extend_from_slice(far.atoms());
        let pair = AtomicConfiguration::new(atoms).unwrap();

        let one = corrector.total(&single).unwrap();
        let two = corrector.total(&pair).unwrap();
        assert!((two.energy - 2.0 * one.energy).abs() < ENERGY_TOLERANCE);
        for i in 0..single.len() {
            assert!((two.gradient[i] - one.gradient[i]).amax() < GRADIENT_TOLERANCE);
            assert!((two.gradient[i + single.len()] - one.gradient[i]).amax() < GRADIENT_TOLERANCE);
        }
    }
}
