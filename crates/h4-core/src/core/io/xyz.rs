use crate::core::io::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::configuration::{AtomicConfiguration, ConfigurationError};
use crate::core::models::element::Element;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XyzMetadata {
    /// The free-form second line of the file.
    pub comment: String,
}

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Header declares {declared} atoms but {found} atom records were found")]
    AtomCount { declared: usize, found: usize },
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum XyzParseErrorKind {
    #[error("Missing atom count header")]
    MissingAtomCount,
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Atom record is missing the {0} field")]
    MissingField(&'static str),
    #[error("Invalid float for {field} (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Unknown element '{0}'")]
    UnknownElement(String),
}

/// Plain XYZ geometry files: atom count, comment, then `symbol x y z` per atom.
///
/// Element symbols are case-insensitive and atomic numbers are accepted in their place.
/// Columns after `z` are ignored.
pub struct XyzFile;

impl XyzFile {
    fn parse_atom(line: &str, line_num: usize) -> Result<Atom, XyzError> {
        let parse_error = |kind| XyzError::Parse {
            line: line_num,
            kind,
        };
        let mut fields = line.split_whitespace();

        let label = fields
            .next()
            .ok_or_else(|| parse_error(XyzParseErrorKind::MissingField("element")))?;
        let element = match label.parse::<i64>() {
            Ok(number) => Element::from_atomic_number(number),
            Err(_) => Element::from_symbol(label),
        }
        .ok_or_else(|| parse_error(XyzParseErrorKind::UnknownElement(label.to_string())))?;

        let mut coordinate = |field: &'static str| -> Result<f64, XyzError> {
            let value = fields
                .next()
                .ok_or_else(|| parse_error(XyzParseErrorKind::MissingField(field)))?;
            value.parse().map_err(|_| {
                parse_error(XyzParseErrorKind::InvalidFloat {
                    field,
                    value: value.to_string(),
                })
            })
        };
        let x = coordinate("x")?;
        let y = coordinate("y")?;
        let z = coordinate("z")?;

        Ok(Atom::new(element, Point3::new(x, y, z)))
    }
}

impl StructureFile for XyzFile {
    type Metadata = XyzMetadata;
    type Error = XyzError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(AtomicConfiguration, Self::Metadata), Self::Error> {
        let mut lines = reader.lines();

        let header = lines.next().transpose()?.ok_or(XyzError::Parse {
            line: 1,
            kind: XyzParseErrorKind::MissingAtomCount,
        })?;
        let header = header.trim();
        let declared: usize = header.parse().map_err(|_| XyzError::Parse {
            line: 1,
            kind: XyzParseErrorKind::InvalidAtomCount(header.to_string()),
        })?;

        let comment = lines.next().transpose()?.unwrap_or_default();
        let metadata = XyzMetadata {
            comment: comment.trim_end().to_string(),
        };

        let mut atoms = Vec::with_capacity(declared);
        let mut extra = 0;
        for (offset, line_res) in lines.enumerate() {
            let line = line_res?;
            if line.trim().is_empty() {
                continue;
            }
            if atoms.len() == declared {
                extra += 1;
                continue;
            }
            atoms.push(Self::parse_atom(&line, offset + 3)?);
        }

        if atoms.len() != declared || extra > 0 {
            return Err(XyzError::AtomCount {
                declared,
                found: atoms.len() + extra,
            });
        }

        Ok((AtomicConfiguration::new(atoms)?, metadata))
    }

    fn write_to(
        config: &AtomicConfiguration,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", config.len())?;
        writeln!(writer, "{}", metadata.comment.lines().next().unwrap_or(""))?;
        for atom in config.atoms() {
            writeln!(
                writer,
                "{:<2} {:>16.10} {:>16.10} {:>16.10}",
                atom.element.symbol(),
                atom.position.x,
                atom.position.y,
                atom.position.z
            )?;
        }
        Ok(())
    }
}
