//! Evaluation tasks for the correction terms.
//!
//! Each task is a pure function of the configuration, the parameters and the evaluation
//! options. Work is split per hydrogen; every unit returns a sparse [`Contribution`] and the
//! contributions are folded in hydrogen order, so results do not depend on thread count.

pub mod combined;
pub mod h4;
pub mod hh_repulsion;

use super::error::DomainError;
use crate::core::models::gradient::CorrectionResult;
use crate::core::utils::geometry::Separation;
use nalgebra::{Point3, Vector3};

/// Energy and sparse gradient entries produced by one unit of work.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Contribution {
    pub energy: f64,
    entries: Vec<(usize, Vector3<f64>)>,
}

impl Contribution {
    #[inline]
    pub fn add(&mut self, atom: usize, gradient: Vector3<f64>) {
        self.entries.push((atom, gradient));
    }

    /// Gradient of a scalar depending on the distance from `from` to `to`.
    #[inline]
    pub fn add_pair(&mut self, from: usize, to: usize, derivative: f64, unit: &Vector3<f64>) {
        let g = unit * derivative;
        self.entries.push((to, g));
        self.entries.push((from, -g));
    }
}

pub(crate) fn assemble<I>(len: usize, contributions: I) -> CorrectionResult
where
    I: IntoIterator<Item = Contribution>,
{
    let mut result = CorrectionResult::zero(len);
    for contribution in contributions {
        result.energy += contribution.energy;
        for (atom, g) in contribution.entries {
            result.gradient.accumulate(atom, g);
        }
    }
    result
}

/// Passes `result` through unless its energy or gradient is NaN or infinite.
pub(crate) fn checked_finite(
    result: CorrectionResult,
    term: &'static str,
) -> Result<CorrectionResult, DomainError> {
    if result.is_finite() {
        Ok(result)
    } else {
        Err(DomainError::NonFiniteResult { term })
    }
}

/// Separation from `from` to `to`, or a domain error if the atoms coincide.
#[inline]
pub(crate) fn separation(
    positions: &[Point3<f64>],
    from: usize,
    to: usize,
) -> Result<Separation, DomainError> {
    Separation::between(&positions[from], &positions[to]).ok_or_else(|| {
        DomainError::CoincidentAtoms {
            first: from.min(to),
            second: from.max(to),
            distance: (positions[to] - positions[from]).norm(),
        }
    })
}
