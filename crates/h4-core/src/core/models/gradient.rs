use crate::core::forcefield::term::CorrectionTerm;
use crate::core::models::configuration::ConfigurationError;
use nalgebra::Vector3;
use std::ops::{Add, AddAssign, Index};

/// Per-atom energy gradient (the negative of the force), index-aligned with the
/// configuration it was computed for. Units: kcal/(mol·Å).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GradientField {
    vectors: Vec<Vector3<f64>>,
}

impl GradientField {
    /// A field of `len` zero vectors.
    pub fn zeros(len: usize) -> Self {
        Self {
            vectors: vec![Vector3::zeros(); len],
        }
    }

    pub fn from_vectors(vectors: Vec<Vector3<f64>>) -> Self {
        Self { vectors }
    }

    pub fn from_rows(rows: &[[f64; 3]]) -> Self {
        Self {
            vectors: rows.iter().map(|row| Vector3::from(*row)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vector3<f64>] {
        &self.vectors
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.vectors.iter()
    }

    /// Adds `contribution` to the gradient of atom `index`.
    #[inline]
    pub fn accumulate(&mut self, index: usize, contribution: Vector3<f64>) {
        self.vectors[index] += contribution;
    }

    /// Adds the gradient of a scalar that depends on the distance between `from` and `to`.
    ///
    /// `derivative` is d(scalar)/dr and `unit` the unit vector pointing from `from` to `to`;
    /// the two atoms receive equal and opposite contributions.
    #[inline]
    pub fn accumulate_pair(
        &mut self,
        from: usize,
        to: usize,
        derivative: f64,
        unit: &Vector3<f64>,
    ) {
        let contribution = unit * derivative;
        self.vectors[to] += contribution;
        self.vectors[from] -= contribution;
    }

    /// Largest absolute component-wise difference, or `None` if the lengths differ.
    /// NaN in either field yields NaN.
    pub fn max_abs_difference(&self, other: &GradientField) -> Option<f64> {
        if self.len() != other.len() {
            return None;
        }
        Some(
            self.vectors
                .iter()
                .zip(&other.vectors)
                .map(|(a, b)| (a - b).iter().fold(0.0, |m, d| nan_max(m, d.abs())))
                .fold(0.0, nan_max),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.vectors.iter().all(|v| v.iter().all(|c| c.is_finite()))
    }

    pub fn to_rows(&self) -> Vec<[f64; 3]> {
        self.vectors.iter().map(|v| [v.x, v.y, v.z]).collect()
    }

    /// Overwrites a caller-owned row buffer with this field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::GradientLength`] if `out` does not hold exactly one row
    /// per atom; `out` is left untouched in that case.
    pub fn write_rows(&self, out: &mut [[f64; 3]]) -> Result<(), ConfigurationError> {
        if out.len() != self.len() {
            return Err(ConfigurationError::GradientLength {
                expected: self.len(),
                actual: out.len(),
            });
        }
        for (row, v) in out.iter_mut().zip(&self.vectors) {
            *row = [v.x, v.y, v.z];
        }
        Ok(())
    }

    pub fn into_vectors(self) -> Vec<Vector3<f64>> {
        self.vectors
    }
}

impl Index<usize> for GradientField {
    type Output = Vector3<f64>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.vectors[index]
    }
}

impl AddAssign<&GradientField> for GradientField {
    fn add_assign(&mut self, rhs: &GradientField) {
        assert_eq!(
            self.len(),
            rhs.len(),
            "gradient fields of different configurations cannot be summed"
        );
        for (lhs, rhs) in self.vectors.iter_mut().zip(&rhs.vectors) {
            *lhs += rhs;
        }
    }
}

impl Add for GradientField {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += &rhs;
        self
    }
}

/// `f64::max` that lets NaN through instead of discarding it.
#[inline]
pub(crate) fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) }
}

/// Energy correction (kcal/mol) together with its gradient.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrectionResult {
    pub energy: f64,
    pub gradient: GradientField,
}

impl CorrectionResult {
    pub fn new(energy: f64, gradient: GradientField) -> Self {
        Self { energy, gradient }
    }

    /// Zero energy and a zero gradient for `len` atoms.
    pub fn zero(len: usize) -> Self {
        Self::new(0.0, GradientField::zeros(len))
    }

    /// True when the energy and every gradient component are finite.
    pub fn is_finite(&self) -> bool {
        self.energy.is_finite() && self.gradient.is_finite()
    }
}

impl Add for CorrectionResult {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            energy: self.energy + rhs.energy,
            gradient: self.gradient + rhs.gradient,
        }
    }
}

/// Both correction terms evaluated on the same configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrectionBreakdown {
    pub h4: CorrectionResult,
    pub hh_repulsion: CorrectionResult,
}

impl CorrectionBreakdown {
    pub fn energies(&self) -> CorrectionTerm {
        CorrectionTerm::new(self.h4.energy, self.hh_repulsion.energy)
    }

    /// Elementwise sum of the two terms, always in the order H4 + H-H.
    pub fn total(&self) -> CorrectionResult {
        self.h4.clone() + self.hh_repulsion.clone()
    }

    pub fn into_total(self) -> CorrectionResult {
        self.h4 + self.hh_repulsion
    }
}
