use super::{Contribution, assemble, checked_finite, separation};
use crate::core::forcefield::params::CorrectionParameters;
use crate::core::forcefield::potentials::{self, HB_R_0, HB_R_CUTOFF};
use crate::core::models::atom::HBondRole;
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::models::element::Element;
use crate::core::models::gradient::CorrectionResult;
use crate::core::utils::geometry::{AngleCosine, Separation};
use crate::engine::config::EvaluationOptions;
use crate::engine::error::DomainError;
use crate::engine::search::CandidateSearch;
use crate::engine::valence::{Bond, ValenceTable};
use itertools::Itertools;
use nalgebra::Point3;
use std::f64::consts::{FRAC_PI_2, PI};
use tracing::{debug, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Below this sin²θ the angular derivative takes its collinear limit of zero.
const COLLINEAR_SIN2: f64 = 1e-14;

#[instrument(skip_all, name = "h4_task")]
pub fn run(
    config: &AtomicConfiguration,
    params: &CorrectionParameters,
    options: &EvaluationOptions,
) -> Result<CorrectionResult, DomainError> {
    let hydrogens = config.indices_with_role(HBondRole::Hydrogen);
    let polar = config.indices_with_role(HBondRole::PolarHeavy);
    if hydrogens.is_empty() || polar.len() < 2 {
        debug!(
            hydrogens = hydrogens.len(),
            polar = polar.len(),
            "No donor-hydrogen-acceptor candidates"
        );
        return Ok(CorrectionResult::zero(config.len()));
    }

    let positions = config.positions();
    let valence = ValenceTable::build(config, &positions, options.neighbor_search)?;
    let search = CandidateSearch::new(options.neighbor_search, &positions, &polar, HB_R_CUTOFF);
    let scan = TripleScan {
        config,
        positions: &positions,
        params,
        valence: &valence,
    };

    #[cfg(feature = "parallel")]
    let iterator = hydrogens.par_iter();

    #[cfg(not(feature = "parallel"))]
    let iterator = hydrogens.iter();

    let contributions = iterator
        .map(|&h| scan.around_hydrogen(h, &search.candidates(&positions[h])))
        .collect::<Result<Vec<_>, _>>()?;

    let result = assemble(config.len(), contributions);
    debug!(
        hydrogens = hydrogens.len(),
        polar = polar.len(),
        energy = result.energy,
        "H4 correction evaluated"
    );
    checked_finite(result, "H4")
}

/// Derivative of an environment factor with respect to one atom's valence.
#[derive(Debug, Clone, Copy)]
struct ValenceSlope {
    atom: usize,
    slope: f64,
    hydrogens_only: bool,
}

#[derive(Debug, Clone)]
struct EnvironmentFactor {
    value: f64,
    slopes: Vec<ValenceSlope>,
}

impl EnvironmentFactor {
    fn neutral() -> Self {
        Self {
            value: 1.0,
            slopes: Vec::new(),
        }
    }

    fn push_gradient(&self, scale: f64, valence: &ValenceTable, out: &mut Contribution) {
        for s in &self.slopes {
            if s.slope == 0.0 {
                continue;
            }
            let include = |bond: &Bond| !s.hydrogens_only || bond.element.is_hydrogen();
            valence.push_gradient(s.atom, scale * s.slope, include, out);
        }
    }
}

struct TripleScan<'a> {
    config: &'a AtomicConfiguration,
    positions: &'a [Point3<f64>],
    params: &'a CorrectionParameters,
    valence: &'a ValenceTable,
}

impl TripleScan<'_> {
    /// All donor-hydrogen-acceptor triples sharing hydrogen `h`.
    fn around_hydrogen(&self, h: usize, candidates: &[usize]) -> Result<Contribution, DomainError> {
        let mut out = Contribution::default();

        let mut near = Vec::with_capacity(candidates.len());
        for &p in candidates {
            let sep = separation(self.positions, h, p)?;
            if sep.distance < HB_R_CUTOFF {
                near.push((p, sep));
            }
        }

        for (&(j, to_j), &(i, to_i)) in near.iter().tuple_combinations() {
            self.triple(h, (i, to_i), (j, to_j), &mut out)?;
        }
        Ok(out)
    }

    /// Contribution of hydrogen `h` between polar atoms `i > j`.
    fn triple(
        &self,
        h: usize,
        (i, to_i): (usize, Separation),
        (j, to_j): (usize, Separation),
        out: &mut Contribution,
    ) -> Result<(), DomainError> {
        let heavy = separation(self.positions, j, i)?;
        if !(HB_R_0 < heavy.distance && heavy.distance < HB_R_CUTOFF) {
            return Ok(());
        }

        let (donor, acceptor, to_donor, to_acceptor) = if to_i.distance < to_j.distance {
            (i, j, to_i, to_j)
        } else {
            (j, i, to_j, to_i)
        };

        let angle = AngleCosine::at_vertex(&to_donor, &to_acceptor);
        let phi = PI - angle.cosine.acos();
        if phi >= FRAC_PI_2 {
            return Ok(());
        }

        let Some(strength) = self
            .params
            .hbond()
            .for_pair(self.config.element(donor), self.config.element(acceptor))
        else {
            return Ok(());
        };

        let (radial, d_radial) = potentials::radial(heavy.distance);
        let (angular, d_angular_dphi) = potentials::angular(phi);
        let sin2 = 1.0 - angle.cosine * angle.cosine;
        let d_angular = if sin2 > COLLINEAR_SIN2 {
            d_angular_dphi / sin2.sqrt()
        } else {
            0.0
        };
        let (switch, d_switch_dh, d_switch_ah) =
            potentials::bond_switch(to_donor.distance, to_acceptor.distance);

        let water = self.water_factor(donor, acceptor);
        let ammonium = self.ammonium_factor(donor);
        let carboxylate = self.carboxylate_factor(acceptor);
        let environment = water.value * ammonium.value * carboxylate.value;

        let energy = strength * radial * angular * switch * environment;
        out.energy += energy;
        trace!(donor, hydrogen = h, acceptor, energy, "H4 triple");

        let geometric = strength * environment;
        out.add_pair(
            j,
            i,
            geometric * d_radial * angular * switch,
            &heavy.unit(),
        );

        let g = geometric * radial * d_angular * switch;
        out.add(donor, angle.d_first * g);
        out.add(acceptor, angle.d_second * g);
        out.add(h, angle.d_vertex * g);

        let base = geometric * radial * angular;
        out.add_pair(h, donor, base * d_switch_dh, &to_donor.unit());
        out.add_pair(h, acceptor, base * d_switch_ah, &to_acceptor.unit());

        let scale = strength * radial * angular * switch;
        water.push_gradient(
            scale * ammonium.value * carboxylate.value,
            self.valence,
            out,
        );
        ammonium.push_gradient(scale * water.value * carboxylate.value, self.valence, out);
        carboxylate.push_gradient(scale * water.value * ammonium.value, self.valence, out);
        Ok(())
    }

    /// Reduced strength for water donating to an oxygen acceptor.
    fn water_factor(&self, donor: usize, acceptor: usize) -> EnvironmentFactor {
        if self.config.element(donor) != Element::OXYGEN
            || self.config.element(acceptor) != Element::OXYGEN
        {
            return EnvironmentFactor::neutral();
        }
        let hydrogens = self
            .valence
            .valence_where(donor, |bond| bond.element.is_hydrogen());
        let (weight, d_weight) = potentials::water_weight(hydrogens);
        let m = self.params.multipliers().water_oxygen - 1.0;
        EnvironmentFactor {
            value: 1.0 + m * weight,
            slopes: vec![ValenceSlope {
                atom: donor,
                slope: m * d_weight,
                hydrogens_only: true,
            }],
        }
    }

    /// Enhanced strength for a four-coordinate nitrogen donor.
    fn ammonium_factor(&self, donor: usize) -> EnvironmentFactor {
        if self.config.element(donor) != Element::NITROGEN {
            return EnvironmentFactor::neutral();
        }
        let (weight, d_weight) = potentials::ammonium_weight(self.valence.valence(donor));
        let m = self.params.multipliers().ammonium - 1.0;
        EnvironmentFactor {
            value: 1.0 + m * weight,
            slopes: vec![ValenceSlope {
                atom: donor,
                slope: m * d_weight,
                hydrogens_only: false,
            }],
        }
    }

    /// Enhanced strength for a carboxylate oxygen acceptor (O-C-O with one bond per oxygen).
    fn carboxylate_factor(&self, acceptor: usize) -> EnvironmentFactor {
        if self.config.element(acceptor) != Element::OXYGEN {
            return EnvironmentFactor::neutral();
        }
        let Some(carbon) = self
            .valence
            .strongest_bond(acceptor, |bond| bond.element == Element::CARBON)
            .map(|bond| bond.neighbor)
        else {
            return EnvironmentFactor::neutral();
        };
        let Some(partner) = self
            .valence
            .strongest_bond(carbon, |bond| {
                bond.element == Element::OXYGEN && bond.neighbor != acceptor
            })
            .map(|bond| bond.neighbor)
        else {
            return EnvironmentFactor::neutral();
        };

        let (f_a, d_a) = potentials::triangle(self.valence.valence(acceptor) - 1.0);
        let (f_c, d_c) = potentials::triangle(self.valence.valence(carbon) - 3.0);
        let (f_o, d_o) = potentials::triangle(self.valence.valence(partner) - 1.0);
        let m = self.params.multipliers().carboxylate - 1.0;
        EnvironmentFactor {
            value: 1.0 + m * f_a * f_c * f_o,
            slopes: vec![
                ValenceSlope {
                    atom: acceptor,
                    slope: m * d_a * f_c * f_o,
                    hydrogens_only: false,
                },
                ValenceSlope {
                    atom: carbon,
                    slope: m * f_a * d_c * f_o,
                    hydrogens_only: false,
                },
                ValenceSlope {
                    atom: partner,
                    slope: m * f_a * f_c * d_o,
                    hydrogens_only: false,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::presets::Method;
    use crate::engine::config::NeighborSearch;
    use crate::testing::{self, assert_gradient_close, finite_difference_gradient};
    use nalgebra::Vector3;

    const TOLERANCE: f64 = 1e-9;

    fn evaluate(config: &AtomicConfiguration) -> CorrectionResult {
        run(
            config,
            Method::Pm6D3H4.parameters(),
            &EvaluationOptions::default(),
        )
        .unwrap()
    }

    fn energy_of(config: &AtomicConfiguration) -> f64 {
        evaluate(config).energy
    }

    #[test]
    fn empty_configuration_gives_zero() {
        let result = evaluate(&AtomicConfiguration::empty());
        assert_eq!(result.energy, 0.0);
        assert!(result.gradient.is_empty());
    }

    #[test]
    fn configuration_without_polar_pairs_gives_zero() {
        let config = AtomicConfiguration::from_parts(
            &[[0.0, 0.0, 0.0], [1.09, 0.0, 0.0], [3.0, 0.0, 0.0]],
            &[6, 1, 8],
        )
        .unwrap();
        let result = evaluate(&config);
        assert_eq!(result.energy, 0.0);
        assert_eq!(result.gradient.len(), 3);
        assert!(result.gradient.iter().all(|g| *g == Vector3::zeros()));
    }

    #[test]
    fn linear_water_dimer_matches_reference() {
        let result = evaluate(&testing::water_dimer());
        assert!((result.energy - testing::WATER_DIMER_E_H4).abs() < TOLERANCE);
        let expected = testing::water_dimer_h4_gradient();
        assert!(result.gradient.max_abs_difference(&expected).unwrap() < TOLERANCE);
    }

    #[test]
    fn linear_water_dimer_energy_is_product_of_strength_water_factor_and_radial() {
        let result = evaluate(&testing::water_dimer());
        let (radial, _) = potentials::radial(2.91);
        assert!((result.energy - 2.32 * 0.42 * radial).abs() < TOLERANCE);
    }

    fn ideal_ammonium_donor() -> AtomicConfiguration {
        let s = 8.0_f64.sqrt() / 3.0;
        let (sin, cos) = (2.0 * PI / 3.0).sin_cos();
        AtomicConfiguration::from_parts(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [-1.0 / 3.0, s, 0.0],
                [-1.0 / 3.0, s * cos, s * sin],
                [-1.0 / 3.0, s * cos, -s * sin],
                [2.9, 0.0, 0.0],
            ],
            &[7, 1, 1, 1, 1, 8],
        )
        .unwrap()
    }

    // Formate O-C-O opened to 135° so the oxygens share no valence.
    fn ideal_formate_acceptor() -> AtomicConfiguration {
        let (o_sin, o_cos) = (PI / 4.0).sin_cos();
        let (h_sin, h_cos) = (-67.5_f64.to_radians()).sin_cos();
        AtomicConfiguration::from_parts(
            &[
                [-3.4, 0.0, 0.0],
                [-2.4, 0.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.3, 0.0, 0.0],
                [1.3 + 1.3 * o_cos, 1.3 * o_sin, 0.0],
                [1.3 + 1.09 * h_cos, 1.09 * h_sin, 0.0],
            ],
            &[7, 1, 8, 6, 8, 1],
        )
        .unwrap()
    }

    // Water donor whose third hydrogen sits halfway through its valence switch (V_H = 2.5).
    fn overcoordinated_water_donor() -> AtomicConfiguration {
        let tilt = Vector3::new(-0.24, -0.5, 0.8).normalize() * 1.43;
        AtomicConfiguration::from_parts(
            &[
                [0.0, 0.0, 0.0],
                [0.96, 0.0, 0.0],
                [-0.24, 0.93, 0.0],
                [tilt.x, tilt.y, tilt.z],
                [2.9, 0.0, 0.0],
            ],
            &[8, 1, 1, 1, 8],
        )
        .unwrap()
    }

    #[test]
    fn ideal_ammonium_donor_scales_by_full_ammonium_multiplier() {
        let config = ideal_ammonium_donor();
        let positions = config.positions();
        let valence = ValenceTable::build(&config, &positions, NeighborSearch::AllPairs).unwrap();
        assert!((valence.valence(0) - 4.0).abs() < TOLERANCE);

        let params = Method::Pm6D3H4.parameters();
        let (radial, _) = potentials::radial(2.9);
        let expected = params.hbond().nh_o * params.multipliers().ammonium * radial;
        assert!((energy_of(&config) - expected).abs() < TOLERANCE);
    }

    #[test]
    fn ideal_formate_acceptor_scales_by_full_carboxylate_multiplier() {
        let config = ideal_formate_acceptor();
        let positions = config.positions();
        let valence = ValenceTable::build(&config, &positions, NeighborSearch::AllPairs).unwrap();
        for (atom, expected) in [(0, 1.0), (2, 1.0), (3, 3.0), (4, 1.0)] {
            assert!((valence.valence(atom) - expected).abs() < TOLERANCE, "atom {atom}");
        }

        let params = Method::Pm6D3H4.parameters();
        let (radial, _) = potentials::radial(3.4);
        let strength = params.hbond().nh_o * radial;
        let q_acceptor = energy_of(&config) / strength;
        assert!((q_acceptor - params.multipliers().carboxylate).abs() < TOLERANCE);

        let all_pairs = EvaluationOptions::builder()
            .neighbor_search(NeighborSearch::AllPairs)
            .build()
            .unwrap();
        assert_eq!(run(&config, params, &all_pairs).unwrap(), evaluate(&config));
    }

    #[test]
    fn water_factor_fades_above_two_hydrogens() {
        let config = overcoordinated_water_donor();
        let positions = config.positions();
        let valence = ValenceTable::build(&config, &positions, NeighborSearch::AllPairs).unwrap();
        let hydrogens = valence.valence_where(0, |bond| bond.element.is_hydrogen());
        assert!((hydrogens - 2.5).abs() < 1e-12);

        let params = Method::Pm6D3H4.parameters();
        let (weight, _) = potentials::water_weight(hydrogens);
        let water = 1.0 + (params.multipliers().water_oxygen - 1.0) * weight;
        assert!((water - 0.71).abs() < 1e-12);
        let (radial, _) = potentials::radial(2.9);
        let expected = params.hbond().oh_o * water * radial;
        assert!((energy_of(&config) - expected).abs() < TOLERANCE);

        let analytic = evaluate(&config).gradient;
        let numeric = finite_difference_gradient(&config, energy_of);
        assert_gradient_close(&analytic, &numeric, 1e-5, "water with V_H = 2.5");
    }

    #[test]
    fn bent_water_dimer_matches_reference() {
        let energy = energy_of(&testing::bent_water_dimer());
        assert!((energy - testing::BENT_WATER_DIMER_E_H4).abs() < TOLERANCE);
    }

    #[test]
    fn ammonium_formate_matches_reference() {
        let energy = energy_of(&testing::ammonium_formate());
        assert!((energy - testing::AMMONIUM_FORMATE_E_H4).abs() < TOLERANCE);
    }

    #[test]
    fn mixed_nitrogen_oxygen_matches_reference() {
        let energy = energy_of(&testing::mixed_nitrogen_oxygen());
        assert!((energy - testing::MIXED_E_H4).abs() < TOLERANCE);
    }

    #[test]
    fn analytic_gradient_matches_finite_differences() {
        for (name, base) in testing::hydrogen_bonded_systems() {
            for (seed, config) in testing::perturbed(&base, 4, 0.05).into_iter().enumerate() {
                let analytic = evaluate(&config).gradient;
                let numeric = finite_difference_gradient(&config, energy_of);
                assert_gradient_close(&analytic, &numeric, 1e-5, &format!("{name} #{seed}"));
            }
        }
    }

    #[test]
    fn cell_list_and_all_pairs_agree_exactly() {
        let all_pairs = EvaluationOptions::builder()
            .neighbor_search(NeighborSearch::AllPairs)
            .build()
            .unwrap();
        let params = Method::Pm6D3H4.parameters();
        for (_, config) in testing::hydrogen_bonded_systems() {
            let cells = run(&config, params, &EvaluationOptions::default()).unwrap();
            let brute = run(&config, params, &all_pairs).unwrap();
            assert_eq!(cells, brute);
        }
    }

    #[test]
    fn contribution_vanishes_at_donor_acceptor_cutoff() {
        let near = testing::linear_water_dimer_at(HB_R_CUTOFF - 1e-6);
        let at = testing::linear_water_dimer_at(HB_R_CUTOFF);
        let beyond = testing::linear_water_dimer_at(HB_R_CUTOFF + 0.5);
        assert!(energy_of(&near).abs() < 1e-10);
        assert_eq!(energy_of(&at), 0.0);
        assert_eq!(energy_of(&beyond), 0.0);
        let gradient = evaluate(&near).gradient;
        assert!(gradient.iter().all(|g| g.amax() < 1e-9));
    }

    #[test]
    fn contribution_vanishes_as_angle_approaches_right_angle() {
        let mut previous = f64::NEG_INFINITY;
        for degrees in [0.0_f64, 30.0, 60.0, 75.0, 85.0, 89.0, 89.9] {
            let energy = energy_of(&testing::hydroxyl_bridge(degrees.to_radians()));
            assert!(energy <= 0.0);
            assert!(energy >= previous - 1e-12);
            previous = energy;
        }
        assert!(previous.abs() < 1e-9);
        let energy = energy_of(&testing::hydroxyl_bridge(100.0_f64.to_radians()));
        assert_eq!(energy, 0.0);
    }

    #[test]
    fn coincident_hydrogen_and_acceptor_is_a_domain_error() {
        let config = AtomicConfiguration::from_parts(
            &[[0.0, 0.0, 0.0], [2.9, 0.0, 0.0], [2.9, 0.0, 0.0]],
            &[8, 8, 1],
        )
        .unwrap();
        let result = run(
            &config,
            Method::Pm6D3H4.parameters(),
            &EvaluationOptions::default(),
        );
        assert!(matches!(result, Err(DomainError::CoincidentAtoms { .. })));
    }

    #[test]
    fn widely_separated_polar_atoms_evaluate_without_panicking() {
        let mut positions = testing::water_dimer().positions();
        positions.push(Point3::new(1e21, 0.0, 0.0));
        positions.push(Point3::new(-1e8, 1e8, 1e8));
        let rows: Vec<[f64; 3]> = positions.iter().map(|p| [p.x, p.y, p.z]).collect();
        let config =
            AtomicConfiguration::from_parts(&rows, &[8, 1, 1, 8, 1, 1, 8, 7]).unwrap();

        let cells = evaluate(&config);
        assert!((cells.energy - testing::WATER_DIMER_E_H4).abs() < TOLERANCE);
        let all_pairs = EvaluationOptions::builder()
            .neighbor_search(NeighborSearch::AllPairs)
            .build()
            .unwrap();
        let brute = run(&config, Method::Pm6D3H4.parameters(), &all_pairs).unwrap();
        assert_eq!(cells, brute);
    }

    #[test]
    fn overflowing_energy_is_a_domain_error() {
        let mut record = Method::Pm6D3H4.parameters().to_record();
        record.para_oh_o = 1e308;
        record.multiplier_wh_o = 1e308;
        let params = CorrectionParameters::from_record(record).unwrap();
        let result = run(&testing::water_dimer(), &params, &EvaluationOptions::default());
        assert_eq!(result, Err(DomainError::NonFiniteResult { term: "H4" }));
    }
}
