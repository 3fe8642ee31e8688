//! Reference output files holding both correction terms of one geometry.
//!
//! The layout is line oriented:
//!
//! ```text
//! E_H4 = <energy> kcal/mol
//! E_HH = <energy> kcal/mol
//!
//! Gradient (kcal/mol/A)
//! H4 correction
//! <gx> <gy> <gz>          (one row per atom)
//!
//! HH repulsion
//! <gx> <gy> <gz>          (one row per atom)
//! ```
//!
//! The energy is the third whitespace-separated token of the first two lines.

use crate::core::models::gradient::{
    CorrectionBreakdown, CorrectionResult, GradientField, nan_max,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

const H4_LABEL: &str = "E_H4";
const HH_LABEL: &str = "E_HH";
const GRADIENT_HEADER: &str = "Gradient (kcal/mol/A)";
const H4_SECTION: &str = "H4 correction";
const HH_SECTION: &str = "HH repulsion";

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ReferenceParseErrorKind,
    },
    #[error("Missing section '{0}'")]
    MissingSection(&'static str),
    #[error("Gradient sections differ in length: {h4} H4 rows, {hh_repulsion} HH rows")]
    SectionLength { h4: usize, hh_repulsion: usize },
    #[error("Atom count mismatch: reference has {expected} atoms, result has {actual}")]
    AtomCountMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceParseErrorKind {
    #[error("Expected an energy line starting with '{0}'")]
    MissingEnergy(&'static str),
    #[error("Invalid energy value '{0}'")]
    InvalidEnergy(String),
    #[error("Gradient row must hold three numbers (got '{0}')")]
    InvalidGradientRow(String),
}

/// Reader and writer for reference output files.
pub struct ReferenceFile;

impl ReferenceFile {
    /// Reads both correction terms from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns a [`ReferenceError`] if a line is malformed, a section is missing or the two
    /// gradient sections differ in length.
    pub fn read_from(reader: &mut impl BufRead) -> Result<CorrectionBreakdown, ReferenceError> {
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;

        let h4_energy = parse_energy(&lines, 0, H4_LABEL)?;
        let hh_energy = parse_energy(&lines, 1, HH_LABEL)?;

        let h4_start = find_section(&lines, 2, H4_SECTION)?;
        let (h4_rows, h4_end) = parse_rows(&lines, h4_start + 1)?;
        let hh_start = find_section(&lines, h4_end, HH_SECTION)?;
        let (hh_rows, _) = parse_rows(&lines, hh_start + 1)?;

        if h4_rows.len() != hh_rows.len() {
            return Err(ReferenceError::SectionLength {
                h4: h4_rows.len(),
                hh_repulsion: hh_rows.len(),
            });
        }

        Ok(CorrectionBreakdown {
            h4: CorrectionResult::new(h4_energy, GradientField::from_rows(&h4_rows)),
            hh_repulsion: CorrectionResult::new(hh_energy, GradientField::from_rows(&hh_rows)),
        })
    }

    pub fn write_to(
        breakdown: &CorrectionBreakdown,
        writer: &mut impl Write,
    ) -> Result<(), ReferenceError> {
        writeln!(writer, "{H4_LABEL} = {:.12} kcal/mol", breakdown.h4.energy)?;
        writeln!(writer, "{HH_LABEL} = {:.12} kcal/mol", breakdown.hh_repulsion.energy)?;
        writeln!(writer)?;
        writeln!(writer, "{GRADIENT_HEADER}")?;
        writeln!(writer, "{H4_SECTION}")?;
        write_rows(&breakdown.h4.gradient, writer)?;
        writeln!(writer)?;
        writeln!(writer, "{HH_SECTION}")?;
        write_rows(&breakdown.hh_repulsion.gradient, writer)?;
        Ok(())
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<CorrectionBreakdown, ReferenceError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    pub fn write_to_path<P: AsRef<Path>>(
        breakdown: &CorrectionBreakdown,
        path: P,
    ) -> Result<(), ReferenceError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(breakdown, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn parse_energy(lines: &[String], index: usize, label: &'static str) -> Result<f64, ReferenceError> {
    let parse_error = |kind| ReferenceError::Parse {
        line: index + 1,
        kind,
    };
    let line = lines
        .get(index)
        .filter(|line| line.trim_start().starts_with(label))
        .ok_or_else(|| parse_error(ReferenceParseErrorKind::MissingEnergy(label)))?;
    let token = line.split_whitespace().nth(2).unwrap_or("");
    token
        .parse()
        .map_err(|_| parse_error(ReferenceParseErrorKind::InvalidEnergy(token.to_string())))
}

fn find_section(
    lines: &[String],
    from: usize,
    title: &'static str,
) -> Result<usize, ReferenceError> {
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| line.trim() == title)
        .map(|(index, _)| index)
        .ok_or(ReferenceError::MissingSection(title))
}

/// Gradient rows starting at `start`, up to the first blank line or section title.
/// Returns the rows and the index just past them.
fn parse_rows(lines: &[String], start: usize) -> Result<(Vec<[f64; 3]>, usize), ReferenceError> {
    let mut rows = Vec::new();
    let mut index = start;
    while let Some(line) = lines.get(index) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed == HH_SECTION {
            break;
        }
        let values: Vec<f64> = trimmed
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| invalid_row(index, trimmed))?;
        let row: [f64; 3] = values
            .try_into()
            .map_err(|_| invalid_row(index, trimmed))?;
        rows.push(row);
        index += 1;
    }
    Ok((rows, index))
}

fn invalid_row(index: usize, line: &str) -> ReferenceError {
    ReferenceError::Parse {
        line: index + 1,
        kind: ReferenceParseErrorKind::InvalidGradientRow(line.to_string()),
    }
}

fn write_rows(gradient: &GradientField, writer: &mut impl Write) -> io::Result<()> {
    for g in gradient.iter() {
        writeln!(writer, "{:>20.12}{:>20.12}{:>20.12}", g.x, g.y, g.z)?;
    }
    Ok(())
}

/// Largest absolute deviations between a computed breakdown and a reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviation {
    pub h4_energy: f64,
    pub hh_energy: f64,
    pub h4_gradient: f64,
    pub hh_gradient: f64,
}

impl Deviation {
    /// # Errors
    ///
    /// Returns [`ReferenceError::AtomCountMismatch`] if the gradients differ in length.
    pub fn between(
        expected: &CorrectionBreakdown,
        actual: &CorrectionBreakdown,
    ) -> Result<Self, ReferenceError> {
        let gradient = |e: &GradientField, a: &GradientField| {
            e.max_abs_difference(a)
                .ok_or(ReferenceError::AtomCountMismatch {
                    expected: e.len(),
                    actual: a.len(),
                })
        };
        Ok(Self {
            h4_energy: (expected.h4.energy - actual.h4.energy).abs(),
            hh_energy: (expected.hh_repulsion.energy - actual.hh_repulsion.energy).abs(),
            h4_gradient: gradient(&expected.h4.gradient, &actual.h4.gradient)?,
            hh_gradient: gradient(&expected.hh_repulsion.gradient, &actual.hh_repulsion.gradient)?,
        })
    }

    /// Largest of the four deviations; NaN if any of them is NaN.
    pub fn max(&self) -> f64 {
        [self.hh_energy, self.h4_gradient, self.hh_gradient]
            .into_iter()
            .fold(self.h4_energy, nan_max)
    }

    pub fn within(&self, tolerance: f64) -> bool {
        self.max() <= tolerance
    }
}
