use super::atom::{Atom, HBondRole};
use super::element::Element;
use nalgebra::Point3;
use thiserror::Error;

/// Errors raised while assembling an [`AtomicConfiguration`] from caller data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Atom count mismatch: {positions} positions but {elements} element identifiers")]
    LengthMismatch { positions: usize, elements: usize },
    #[error("Negative atom count: {0}")]
    NegativeAtomCount(i64),
    #[error("Atom {index} has unsupported atomic number {number}")]
    UnknownElement { index: usize, number: i64 },
    #[error("Atom {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("Gradient buffer holds {actual} entries but the configuration has {expected} atoms")]
    GradientLength { expected: usize, actual: usize },
}

/// An ordered, validated set of atoms.
///
/// This is the read-only input of every evaluator. Construction guarantees that each atom
/// has a supported element and finite coordinates, so the evaluators only have to deal with
/// geometric degeneracies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomicConfiguration {
    atoms: Vec<Atom>,
}

impl AtomicConfiguration {
    /// Creates a configuration from atom records.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NonFiniteCoordinate`] if any coordinate is NaN or infinite.
    pub fn new(atoms: Vec<Atom>) -> Result<Self, ConfigurationError> {
        if let Some(index) = atoms
            .iter()
            .position(|atom| !atom.position.coords.iter().all(|c| c.is_finite()))
        {
            return Err(ConfigurationError::NonFiniteCoordinate { index });
        }
        Ok(Self { atoms })
    }

    /// The configuration with no atoms.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a configuration from parallel position and atomic-number arrays.
    ///
    /// This is the shape in which host environments hand data over: one `[x, y, z]` row per
    /// atom and a separate integer array of proton numbers.
    ///
    /// # Arguments
    ///
    /// * `positions` - Cartesian coordinates in Angstroms, one row per atom.
    /// * `atomic_numbers` - Atomic numbers, index-aligned with `positions`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the arrays differ in length, an atomic number is
    /// unsupported, or a coordinate is not finite.
    pub fn from_parts(
        positions: &[[f64; 3]],
        atomic_numbers: &[i64],
    ) -> Result<Self, ConfigurationError> {
        if positions.len() != atomic_numbers.len() {
            return Err(ConfigurationError::LengthMismatch {
                positions: positions.len(),
                elements: atomic_numbers.len(),
            });
        }

        let atoms = positions
            .iter()
            .zip(atomic_numbers)
            .enumerate()
            .map(|(index, (position, &number))| {
                let element = Element::from_atomic_number(number)
                    .ok_or(ConfigurationError::UnknownElement { index, number })?;
                Ok(Atom::new(element, Point3::from(*position)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(atoms)
    }

    /// Converts a signed atom count coming from a foreign caller.
    pub fn checked_atom_count(count: i64) -> Result<usize, ConfigurationError> {
        usize::try_from(count).map_err(|_| ConfigurationError::NegativeAtomCount(count))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    #[inline]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[inline]
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Position of the atom at `index`. Panics if the index is out of bounds.
    #[inline]
    pub fn position(&self, index: usize) -> &Point3<f64> {
        &self.atoms[index].position
    }

    /// Element of the atom at `index`. Panics if the index is out of bounds.
    #[inline]
    pub fn element(&self, index: usize) -> Element {
        self.atoms[index].element
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.atoms.iter().map(|atom| atom.position).collect()
    }

    /// Indices (ascending) of all atoms with the given hydrogen-bond role.
    pub fn indices_with_role(&self, role: HBondRole) -> Vec<usize> {
        self.atoms
            .iter()
            .enumerate()
            .filter(|(_, atom)| atom.role() == role)
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns a copy with every position passed through `transform`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NonFiniteCoordinate`] if the transform produces a
    /// non-finite coordinate.
    pub fn map_positions<F>(&self, transform: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&Point3<f64>) -> Point3<f64>,
    {
        Self::new(
            self.atoms
                .iter()
                .map(|atom| Atom::new(atom.element, transform(&atom.position)))
                .collect(),
        )
    }
}

impl TryFrom<Vec<Atom>> for AtomicConfiguration {
    type Error = ConfigurationError;

    fn try_from(atoms: Vec<Atom>) -> Result<Self, Self::Error> {
        Self::new(atoms)
    }
}
