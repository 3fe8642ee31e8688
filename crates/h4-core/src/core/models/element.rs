use phf::phf_map;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest atomic number covered by the static element tables.
pub const MAX_ATOMIC_NUMBER: u8 = 86;

const SYMBOLS: [&str; MAX_ATOMIC_NUMBER as usize] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn",
];

// Single-bond covalent radii in Angstroms, indexed by atomic number - 1.
const COVALENT_RADII: [f64; MAX_ATOMIC_NUMBER as usize] = [
    0.37, 0.32, 1.34, 0.90, 0.82, 0.77, 0.75, 0.73, 0.71, 0.69, // H - Ne
    1.54, 1.30, 1.18, 1.11, 1.06, 1.02, 0.99, 0.97, // Na - Ar
    1.96, 1.74, 1.44, 1.36, 1.25, 1.27, 1.39, 1.25, 1.26, 1.21, 1.38, 1.31, // K - Zn
    1.26, 1.22, 1.19, 1.16, 1.14, 1.10, // Ga - Kr
    2.11, 1.92, 1.62, 1.48, 1.37, 1.45, 1.56, 1.26, 1.35, 1.31, 1.53, 1.48, // Rb - Cd
    1.44, 1.41, 1.38, 1.35, 1.33, 1.30, // In - Xe
    2.25, 1.98, 1.69, 1.65, 1.65, 1.64, 1.63, 1.62, 1.85, 1.61, 1.59, 1.59, 1.58, 1.57, 1.56,
    1.74, 1.56, // Cs - Lu
    1.44, 1.34, 1.30, 1.28, 1.26, 1.27, 1.30, 1.34, 1.49, // Hf - Hg
    1.48, 1.47, 1.46, 1.46, 1.45, 1.45, // Tl - Rn
];

static SYMBOL_LOOKUP: phf::Map<&'static str, u8> = phf_map! {
    "H" => 1, "He" => 2, "Li" => 3, "Be" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8,
    "F" => 9, "Ne" => 10, "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P" => 15,
    "S" => 16, "Cl" => 17, "Ar" => 18, "K" => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22,
    "V" => 23, "Cr" => 24, "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28, "Cu" => 29,
    "Zn" => 30, "Ga" => 31, "Ge" => 32, "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36,
    "Rb" => 37, "Sr" => 38, "Y" => 39, "Zr" => 40, "Nb" => 41, "Mo" => 42, "Tc" => 43,
    "Ru" => 44, "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48, "In" => 49, "Sn" => 50,
    "Sb" => 51, "Te" => 52, "I" => 53, "Xe" => 54, "Cs" => 55, "Ba" => 56, "La" => 57,
    "Ce" => 58, "Pr" => 59, "Nd" => 60, "Pm" => 61, "Sm" => 62, "Eu" => 63, "Gd" => 64,
    "Tb" => 65, "Dy" => 66, "Ho" => 67, "Er" => 68, "Tm" => 69, "Yb" => 70, "Lu" => 71,
    "Hf" => 72, "Ta" => 73, "W" => 74, "Re" => 75, "Os" => 76, "Ir" => 77, "Pt" => 78,
    "Au" => 79, "Hg" => 80, "Tl" => 81, "Pb" => 82, "Bi" => 83, "Po" => 84, "At" => 85,
    "Rn" => 86,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElementParseError {
    #[error("Unknown element symbol '{0}'")]
    UnknownSymbol(String),
    #[error("Atomic number {0} is outside the supported range 1-{MAX_ATOMIC_NUMBER}")]
    UnsupportedAtomicNumber(i64),
}

/// A chemical element identified by its atomic number.
///
/// The correction model only distinguishes a handful of elements (H, C, N, O), but every
/// element participates in continuous-valence bond counting, so the full table up to radon
/// is kept. The value is a single byte and is `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

impl Element {
    pub const HYDROGEN: Element = Element(1);
    pub const CARBON: Element = Element(6);
    pub const NITROGEN: Element = Element(7);
    pub const OXYGEN: Element = Element(8);

    /// Creates an element from an atomic number.
    ///
    /// # Arguments
    ///
    /// * `number` - The atomic number, as supplied by the caller's integer arrays.
    ///
    /// # Return
    ///
    /// Returns `Some(Element)` for atomic numbers in `1..=86`, otherwise `None`.
    pub fn from_atomic_number(number: i64) -> Option<Self> {
        if (1..=MAX_ATOMIC_NUMBER as i64).contains(&number) {
            Some(Element(number as u8))
        } else {
            None
        }
    }

    /// Looks up an element by symbol, ignoring case (`"cl"`, `"CL"` and `"Cl"` are equal).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let trimmed = symbol.trim();
        let mut chars = trimmed.chars();
        let first = chars.next()?;
        let canonical: String = first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect();
        SYMBOL_LOOKUP.get(canonical.as_str()).map(|&z| Element(z))
    }

    #[inline]
    pub fn atomic_number(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn symbol(self) -> &'static str {
        SYMBOLS[self.index()]
    }

    /// Single-bond covalent radius in Angstroms.
    #[inline]
    pub fn covalent_radius(self) -> f64 {
        COVALENT_RADII[self.index()]
    }

    #[inline]
    pub fn is_hydrogen(self) -> bool {
        self == Self::HYDROGEN
    }

    /// Nitrogen and oxygen, the only heavy atoms that act as donors or acceptors.
    #[inline]
    pub fn is_polar_heavy(self) -> bool {
        self == Self::NITROGEN || self == Self::OXYGEN
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ElementParseError;

    /// Parses either an element symbol or a plain atomic number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<i64>() {
            return Element::from_atomic_number(number)
                .ok_or(ElementParseError::UnsupportedAtomicNumber(number));
        }
        Element::from_symbol(trimmed)
            .ok_or_else(|| ElementParseError::UnknownSymbol(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_atomic_number_accepts_supported_range() {
        assert_eq!(Element::from_atomic_number(1), Some(Element::HYDROGEN));
        assert_eq!(Element::from_atomic_number(8), Some(Element::OXYGEN));
        assert!(Element::from_atomic_number(86).is_some());
    }

    #[test]
    fn from_atomic_number_rejects_out_of_range_values() {
        assert_eq!(Element::from_atomic_number(0), None);
        assert_eq!(Element::from_atomic_number(-1), None);
        assert_eq!(Element::from_atomic_number(87), None);
    }

    #[test]
    fn symbol_table_and_lookup_map_agree_for_every_element() {
        for z in 1..=MAX_ATOMIC_NUMBER as i64 {
            let element = Element::from_atomic_number(z).unwrap();
            assert_eq!(Element::from_symbol(element.symbol()), Some(element));
        }
        assert_eq!(SYMBOL_LOOKUP.len(), MAX_ATOMIC_NUMBER as usize);
    }

    #[test]
    fn from_symbol_is_case_insensitive() {
        assert_eq!(Element::from_symbol("o"), Some(Element::OXYGEN));
        assert_eq!(Element::from_symbol("CL").map(Element::atomic_number), Some(17));
        assert_eq!(Element::from_symbol(" hE ").map(Element::atomic_number), Some(2));
    }

    #[test]
    fn from_symbol_rejects_unknown_or_empty_input() {
        assert_eq!(Element::from_symbol("Xx"), None);
        assert_eq!(Element::from_symbol(""), None);
    }

    #[test]
    fn from_str_accepts_symbols_and_numbers() {
        assert_eq!("N".parse::<Element>(), Ok(Element::NITROGEN));
        assert_eq!("6".parse::<Element>(), Ok(Element::CARBON));
        assert_eq!(
            "0".parse::<Element>(),
            Err(ElementParseError::UnsupportedAtomicNumber(0))
        );
        assert_eq!(
            "Qq".parse::<Element>(),
            Err(ElementParseError::UnknownSymbol("Qq".to_string()))
        );
    }

    #[test]
    fn covalent_radii_match_bonding_conventions() {
        assert_eq!(Element::HYDROGEN.covalent_radius(), 0.37);
        assert_eq!(Element::CARBON.covalent_radius(), 0.77);
        assert_eq!(Element::NITROGEN.covalent_radius(), 0.75);
        assert_eq!(Element::OXYGEN.covalent_radius(), 0.73);
        assert!(COVALENT_RADII.iter().all(|&r| r > 0.0));
    }

    #[test]
    fn role_predicates_classify_elements() {
        assert!(Element::HYDROGEN.is_hydrogen());
        assert!(!Element::HYDROGEN.is_polar_heavy());
        assert!(Element::NITROGEN.is_polar_heavy());
        assert!(Element::OXYGEN.is_polar_heavy());
        assert!(!Element::CARBON.is_polar_heavy());
    }

    #[test]
    fn display_prints_symbol() {
        assert_eq!(Element::OXYGEN.to_string(), "O");
    }
}
