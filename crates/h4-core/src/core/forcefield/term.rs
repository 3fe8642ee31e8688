use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Energy contribution of each correction term, in kcal/mol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CorrectionTerm {
    pub h4: f64,
    pub hh_repulsion: f64,
}

impl CorrectionTerm {
    pub fn new(h4: f64, hh_repulsion: f64) -> Self {
        Self { h4, hh_repulsion }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.h4 + self.hh_repulsion
    }
}

impl Add for CorrectionTerm {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            h4: self.h4 + rhs.h4,
            hh_repulsion: self.hh_repulsion + rhs.hh_repulsion,
        }
    }
}

impl AddAssign for CorrectionTerm {
    fn add_assign(&mut self, rhs: Self) {
        self.h4 += rhs.h4;
        self.hh_repulsion += rhs.hh_repulsion;
    }
}

impl Sum for CorrectionTerm {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
