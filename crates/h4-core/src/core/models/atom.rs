use super::element::Element;
use nalgebra::Point3;
use std::str::FromStr;

/// The part an atom can play in a hydrogen-bond triple.
///
/// The role is a pure function of the element: hydrogens bridge, nitrogen and oxygen act
/// as donors or acceptors, every other element only contributes to bond counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum HBondRole {
    /// A hydrogen that may bridge a donor and an acceptor.
    Hydrogen,
    /// A nitrogen or oxygen atom that may donate or accept.
    PolarHeavy,
    /// Any other element.
    #[default]
    Spectator,
}

impl From<Element> for HBondRole {
    fn from(element: Element) -> Self {
        if element.is_hydrogen() {
            HBondRole::Hydrogen
        } else if element.is_polar_heavy() {
            HBondRole::PolarHeavy
        } else {
            HBondRole::Spectator
        }
    }
}

impl FromStr for HBondRole {
    type Err = ();

    /// Parses a role name, case-insensitively (`"hydrogen"`, `"polar-heavy"`, `"spectator"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hydrogen" | "h" => Ok(HBondRole::Hydrogen),
            "polar-heavy" | "polar_heavy" | "polar" => Ok(HBondRole::PolarHeavy),
            "spectator" | "other" => Ok(HBondRole::Spectator),
            _ => Err(()),
        }
    }
}

/// A single atom record: element identity and Cartesian position in Angstroms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atom {
    /// The chemical element of the atom.
    pub element: Element,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom`.
    ///
    /// # Arguments
    ///
    /// * `element` - The chemical element.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(element: Element, position: Point3<f64>) -> Self {
        Self { element, position }
    }

    #[inline]
    pub fn role(&self) -> HBondRole {
        HBondRole::from(self.element)
    }
}
