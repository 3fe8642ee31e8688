use super::{Contribution, assemble, checked_finite, separation};
use crate::core::forcefield::params::CorrectionParameters;
use crate::core::forcefield::potentials;
use crate::core::models::atom::HBondRole;
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::models::gradient::CorrectionResult;
use crate::engine::config::EvaluationOptions;
use crate::engine::error::DomainError;
use crate::engine::search::CandidateSearch;
use tracing::{debug, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[instrument(skip_all, name = "hh_repulsion_task")]
pub fn run(
    config: &AtomicConfiguration,
    params: &CorrectionParameters,
    options: &EvaluationOptions,
) -> Result<CorrectionResult, DomainError> {
    let hydrogens = config.indices_with_role(HBondRole::Hydrogen);
    if hydrogens.len() < 2 {
        return Ok(CorrectionResult::zero(config.len()));
    }

    let positions = config.positions();
    let search = CandidateSearch::new(
        options.neighbor_search,
        &positions,
        &hydrogens,
        options.hh_cutoff,
    );
    let shape = params.hh_repulsion();

    let pairs_of = |i: usize| -> Result<Contribution, DomainError> {
        let mut out = Contribution::default();
        for j in search.candidates(&positions[i]) {
            if j >= i {
                break;
            }
            let sep = separation(&positions, j, i)?;
            if sep.distance >= options.hh_cutoff {
                continue;
            }
            let (energy, d_energy) =
                potentials::hh_repulsion(sep.distance, shape.k, shape.exponent, shape.r0);
            let (switch, d_switch) =
                potentials::cutoff_switch(sep.distance, options.hh_switch_on, options.hh_cutoff);
            out.energy += energy * switch;
            out.add_pair(j, i, d_energy * switch + energy * d_switch, &sep.unit());
            trace!(first = j, second = i, energy = energy * switch, "H-H pair");
        }
        Ok(out)
    };

    #[cfg(feature = "parallel")]
    let iterator = hydrogens.par_iter();

    #[cfg(not(feature = "parallel"))]
    let iterator = hydrogens.iter();

    let contributions = iterator
        .map(|&i| pairs_of(i))
        .collect::<Result<Vec<_>, _>>()?;

    let result = assemble(config.len(), contributions);
    debug!(
        hydrogens = hydrogens.len(),
        energy = result.energy,
        "H-H repulsion evaluated"
    );
    checked_finite(result, "H-H repulsion")
}
