use super::{h4, hh_repulsion};
use crate::core::forcefield::params::CorrectionParameters;
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::models::gradient::{CorrectionBreakdown, CorrectionResult};
use crate::engine::config::EvaluationOptions;
use crate::engine::error::DomainError;
use tracing::{debug, instrument};

type TermResult = Result<CorrectionResult, DomainError>;

/// Evaluates both terms on the same input. When both fail, the H4 error is returned.
#[instrument(skip_all, name = "combined_correction_task")]
pub fn run(
    config: &AtomicConfiguration,
    params: &CorrectionParameters,
    options: &EvaluationOptions,
) -> Result<CorrectionBreakdown, DomainError> {
    let (h4, hh_repulsion) = evaluate_terms(config, params, options);
    let breakdown = CorrectionBreakdown {
        h4: h4?,
        hh_repulsion: hh_repulsion?,
    };
    debug!(
        h4 = breakdown.h4.energy,
        hh_repulsion = breakdown.hh_repulsion.energy,
        "Combined correction evaluated"
    );
    Ok(breakdown)
}

#[cfg(feature = "parallel")]
fn evaluate_terms(
    config: &AtomicConfiguration,
    params: &CorrectionParameters,
    options: &EvaluationOptions,
) -> (TermResult, TermResult) {
    if options.concurrent_terms {
        rayon::join(
            || h4::run(config, params, options),
            || hh_repulsion::run(config, params, options),
        )
    } else {
        (
            h4::run(config, params, options),
            hh_repulsion::run(config, params, options),
        )
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_terms(
    config: &AtomicConfiguration,
    params: &CorrectionParameters,
    options: &EvaluationOptions,
) -> (TermResult, TermResult) {
    (
        h4::run(config, params, options),
        hh_repulsion::run(config, params, options),
    )
}
