use super::config::NeighborSearch;
use super::error::DomainError;
use super::search::CandidateSearch;
use super::tasks::{Contribution, separation};
use crate::core::forcefield::potentials::{VALENCE_CUTOFF_SCALE, continuous_valence};
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::models::element::Element;
use nalgebra::{Point3, Vector3};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A partial covalent bond counted by the continuous valence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bond {
    pub neighbor: usize,
    pub element: Element,
    /// Bond count in `[0, 1]`.
    pub count: f64,
    /// d(count)/d(distance).
    pub derivative: f64,
    /// Unit vector from the owning atom towards `neighbor`.
    pub unit: Vector3<f64>,
}

/// Continuous-valence bonds of every atom in a configuration.
#[derive(Debug, Clone)]
pub(crate) struct ValenceTable {
    bonds: Vec<Vec<Bond>>,
}

impl ValenceTable {
    pub fn build(
        config: &AtomicConfiguration,
        positions: &[Point3<f64>],
        strategy: NeighborSearch,
    ) -> Result<Self, DomainError> {
        let members: Vec<usize> = (0..config.len()).collect();
        let max_radius = config
            .atoms()
            .iter()
            .map(|atom| atom.element.covalent_radius())
            .fold(0.0, f64::max);
        let reach = VALENCE_CUTOFF_SCALE * 2.0 * max_radius;
        let search = CandidateSearch::new(strategy, positions, &members, reach);

        let bonds_of = |i: usize| -> Result<Vec<Bond>, DomainError> {
            let radius = config.element(i).covalent_radius();
            let mut bonds = Vec::new();
            for j in search.candidates(&positions[i]) {
                if j == i {
                    continue;
                }
                let sep = separation(positions, i, j)?;
                let element = config.element(j);
                let (count, derivative) =
                    continuous_valence(sep.distance, radius + element.covalent_radius());
                if count > 0.0 {
                    bonds.push(Bond {
                        neighbor: j,
                        element,
                        count,
                        derivative,
                        unit: sep.unit(),
                    });
                }
            }
            Ok(bonds)
        };

        #[cfg(feature = "parallel")]
        let bonds = members
            .par_iter()
            .map(|&i| bonds_of(i))
            .collect::<Result<Vec<_>, _>>()?;

        #[cfg(not(feature = "parallel"))]
        let bonds = members
            .iter()
            .map(|&i| bonds_of(i))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            atoms = bonds.len(),
            bonds = bonds.iter().map(Vec::len).sum::<usize>() / 2,
            "Continuous valence table built"
        );
        Ok(Self { bonds })
    }

    #[inline]
    pub fn bonds(&self, atom: usize) -> &[Bond] {
        &self.bonds[atom]
    }

    pub fn valence(&self, atom: usize) -> f64 {
        self.valence_where(atom, |_| true)
    }

    pub fn valence_where<F>(&self, atom: usize, include: F) -> f64
    where
        F: Fn(&Bond) -> bool,
    {
        self.bonds[atom]
            .iter()
            .filter(|bond| include(bond))
            .map(|bond| bond.count)
            .sum()
    }

    /// The bond with the largest count among those accepted by `include`, preferring the
    /// higher neighbor index on ties.
    pub fn strongest_bond<F>(&self, atom: usize, include: F) -> Option<&Bond>
    where
        F: Fn(&Bond) -> bool,
    {
        self.bonds[atom]
            .iter()
            .filter(|bond| include(bond))
            .max_by(|a, b| {
                a.count
                    .total_cmp(&b.count)
                    .then_with(|| a.neighbor.cmp(&b.neighbor))
            })
    }

    /// Adds `scale` times the gradient of the (filtered) valence of `atom`.
    pub fn push_gradient<F>(&self, atom: usize, scale: f64, include: F, out: &mut Contribution)
    where
        F: Fn(&Bond) -> bool,
    {
        for bond in self.bonds[atom].iter().filter(|bond| include(bond)) {
            if bond.derivative != 0.0 {
                out.add_pair(atom, bond.neighbor, scale * bond.derivative, &bond.unit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn table(config: &AtomicConfiguration, strategy: NeighborSearch) -> ValenceTable {
        ValenceTable::build(config, &config.positions(), strategy).unwrap()
    }

    #[test]
    fn water_oxygen_has_two_hydrogen_bonds() {
        let config = testing::water_dimer();
        let valence = table(&config, NeighborSearch::CellList);
        assert_eq!(valence.valence(0), 2.0);
        assert_eq!(valence.valence_where(0, |b| b.element.is_hydrogen()), 2.0);
        assert_eq!(valence.valence(1), 1.0);
        assert!(valence.bonds(0).iter().all(|b| b.neighbor != 3));
    }

    #[test]
    fn stretched_bond_gives_fractional_valence() {
        let config = testing::bent_water_dimer();
        let valence = table(&config, NeighborSearch::AllPairs);
        let v = valence.valence_where(0, |b| b.element.is_hydrogen());
        assert!((v - 1.866).abs() < 1e-3, "hydrogen valence was {v}");
    }

    #[test]
    fn strongest_bond_finds_carboxylate_carbon() {
        let config = testing::ammonium_formate();
        let valence = table(&config, NeighborSearch::CellList);
        let carbon = valence
            .strongest_bond(5, |b| b.element == Element::CARBON)
            .unwrap();
        assert_eq!(carbon.neighbor, 6);
        assert!(
            valence
                .strongest_bond(5, |b| b.element == Element::NITROGEN)
                .is_none()
        );
    }

    #[test]
    fn strategies_agree() {
        let config = testing::mixed_nitrogen_oxygen();
        let cells = table(&config, NeighborSearch::CellList);
        let all = table(&config, NeighborSearch::AllPairs);
        for atom in 0..config.len() {
            assert_eq!(cells.bonds(atom), all.bonds(atom));
        }
    }

    #[test]
    fn coincident_atoms_are_a_domain_error() {
        let config =
            AtomicConfiguration::from_parts(&[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]], &[6, 8]).unwrap();
        let result = ValenceTable::build(&config, &config.positions(), NeighborSearch::CellList);
        assert!(matches!(
            result,
            Err(DomainError::CoincidentAtoms {
                first: 0,
                second: 1,
                ..
            })
        ));
    }
}
