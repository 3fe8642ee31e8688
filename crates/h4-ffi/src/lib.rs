//! # C ABI for the H4 corrections
//!
//! Stateless entry points mirroring the classic `libh4` interface: an array of
//! [`Atom`] records goes in, the energy comes back through an out-parameter and the
//! caller-sized [`Coord`] array receives the gradient. Every call returns an [`H4Status`].
//! See `include/h4.h` for the C declarations.
//!
//! Parameters are passed by value on each call; nothing is cached between calls.

use h4corr::core::forcefield::params::{CorrectionParameters, ParameterRecord};
use h4corr::core::models::configuration::AtomicConfiguration;
use h4corr::engine::error::CorrectionError;
use h4corr::core::models::gradient::CorrectionResult;
use h4corr::workflows::correction::{Corrector, Term};
use std::ffi::{c_char, c_int, c_long};
use std::panic::{self, UnwindSafe};
use std::slice;

/// Cartesian coordinates (Å) and atomic number of one atom.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Atom {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub e: c_long,
}

/// One gradient row (kcal/mol/Å).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// The ten correction parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct H4Parameters {
    pub para_oh_o: f64,
    pub para_oh_n: f64,
    pub para_nh_o: f64,
    pub para_nh_n: f64,
    pub multiplier_wh_o: f64,
    pub multiplier_nh4: f64,
    pub multiplier_coo: f64,
    pub hh_rep_k: f64,
    pub hh_rep_e: f64,
    pub hh_rep_r0: f64,
}

impl From<H4Parameters> for ParameterRecord {
    fn from(p: H4Parameters) -> Self {
        ParameterRecord {
            para_oh_o: p.para_oh_o,
            para_oh_n: p.para_oh_n,
            para_nh_o: p.para_nh_o,
            para_nh_n: p.para_nh_n,
            multiplier_wh_o: p.multiplier_wh_o,
            multiplier_nh4: p.multiplier_nh4,
            multiplier_coo: p.multiplier_coo,
            hh_rep_k: p.hh_rep_k,
            hh_rep_e: p.hh_rep_e,
            hh_rep_r0: p.hh_rep_r0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum H4Status {
    Ok = 0,
    ConfigurationError = 1,
    DomainError = 2,
    NullPointer = 3,
    InternalError = 4,
}

impl From<&CorrectionError> for H4Status {
    fn from(err: &CorrectionError) -> Self {
        if err.is_domain() {
            H4Status::DomainError
        } else {
            H4Status::ConfigurationError
        }
    }
}

/// Static description of a status code. Unknown codes get a generic message.
#[unsafe(no_mangle)]
pub extern "C" fn h4_status_message(code: c_int) -> *const c_char {
    let message = match code {
        0 => c"success",
        1 => c"invalid configuration or parameters",
        2 => c"correction undefined for this geometry (coincident atoms or overflow)",
        3 => c"null pointer argument",
        4 => c"internal error: the evaluation panicked",
        _ => c"unknown status code",
    };
    message.as_ptr()
}

/// H4 hydrogen-bond correction.
///
/// # Safety
///
/// `energy_out` must be valid for writing one `double`. For `natoms > 0`, `atoms` must point
/// to `natoms` readable records and `gradient` to `natoms` writable rows; the two arrays
/// must not overlap.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn energy_corr_h4(
    natoms: c_long,
    atoms: *const Atom,
    gradient: *mut Coord,
    parameters: H4Parameters,
    energy_out: *mut f64,
) -> H4Status {
    unsafe { evaluate(Term::H4, natoms, atoms, gradient, parameters, energy_out) }
}

/// H-H repulsion correction.
///
/// # Safety
///
/// Same contract as [`energy_corr_h4`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn energy_corr_hh_rep(
    natoms: c_long,
    atoms: *const Atom,
    gradient: *mut Coord,
    parameters: H4Parameters,
    energy_out: *mut f64,
) -> H4Status {
    unsafe {
        evaluate(
            Term::HhRepulsion,
            natoms,
            atoms,
            gradient,
            parameters,
            energy_out,
        )
    }
}

unsafe fn evaluate(
    term: Term,
    natoms: c_long,
    atoms: *const Atom,
    gradient: *mut Coord,
    parameters: H4Parameters,
    energy_out: *mut f64,
) -> H4Status {
    if energy_out.is_null() {
        return H4Status::NullPointer;
    }
    let count = match AtomicConfiguration::checked_atom_count(i64::from(natoms)) {
        Ok(count) => count,
        Err(_) => return H4Status::ConfigurationError,
    };
    if count == 0 {
        unsafe { energy_out.write(0.0) };
        return H4Status::Ok;
    }
    if atoms.is_null() || gradient.is_null() {
        return H4Status::NullPointer;
    }

    let params = match CorrectionParameters::from_record(parameters.into()) {
        Ok(params) => params,
        Err(_) => return H4Status::ConfigurationError,
    };

    let atoms = unsafe { slice::from_raw_parts(atoms, count) };
    let positions: Vec<[f64; 3]> = atoms.iter().map(|a| [a.x, a.y, a.z]).collect();
    let numbers: Vec<i64> = atoms.iter().map(|a| i64::from(a.e)).collect();

    let result = match guarded(|| Corrector::new(params).evaluate(term, &positions, &numbers)) {
        Ok(result) => result,
        Err(status) => return status,
    };

    // `Coord` is three packed doubles, the same layout as `[f64; 3]`.
    let rows = unsafe { slice::from_raw_parts_mut(gradient.cast::<[f64; 3]>(), count) };
    if result.gradient.write_rows(rows).is_err() {
        return H4Status::ConfigurationError;
    }
    unsafe { energy_out.write(result.energy) };
    H4Status::Ok
}

// Unwinding across `extern "C"` aborts the host, so panics stop here.
fn guarded<F>(evaluation: F) -> Result<CorrectionResult, H4Status>
where
    F: FnOnce() -> Result<CorrectionResult, CorrectionError> + UnwindSafe,
{
    match panic::catch_unwind(evaluation) {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(err)) => Err(H4Status::from(&err)),
        Err(_) => Err(H4Status::InternalError),
    }
}
