use super::config::NeighborSearch;
use crate::core::utils::neighbors::CellList;
use nalgebra::Point3;
use tracing::debug;

/// Candidate partners among a fixed set of member atoms.
///
/// Both strategies return members in ascending index order; callers apply the exact
/// distance test, which makes the two strategies interchangeable. A cell list that cannot
/// cover the members degrades to the full member scan.
pub(crate) enum CandidateSearch<'a> {
    Cells(CellList),
    All(&'a [usize]),
}

impl<'a> CandidateSearch<'a> {
    pub fn new(
        strategy: NeighborSearch,
        positions: &[Point3<f64>],
        members: &'a [usize],
        cutoff: f64,
    ) -> Self {
        match strategy {
            NeighborSearch::CellList => match CellList::build(positions, members, cutoff) {
                Some(cells) => Self::Cells(cells),
                None => {
                    debug!("Members span no finite grid, scanning all of them");
                    Self::All(members)
                }
            },
            NeighborSearch::AllPairs => Self::All(members),
        }
    }

    pub fn candidates(&self, point: &Point3<f64>) -> Vec<usize> {
        match self {
            Self::Cells(cells) => cells.candidates(point),
            Self::All(members) => members.to_vec(),
        }
    }
}
