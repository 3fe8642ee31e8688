//! Provides input/output for the file formats used to validate the corrections.
//!
//! Geometries are exchanged as XYZ files through the [`traits::StructureFile`] interface.
//! Reference results use a small line-oriented text layout holding both correction terms
//! and their gradients; see [`reference`].

pub mod reference;
pub mod traits;
pub mod xyz;
