use h4corr::core::forcefield::params::{CorrectionParameters, ParameterRecord};
use h4corr::core::forcefield::presets::Method;
use h4corr::core::models::configuration::AtomicConfiguration;
use h4corr::engine::error::CorrectionError;
use h4corr::workflows::correction::{Corrector, Term};
use pyo3::create_exception;
use pyo3::exceptions::{PyArithmeticError, PyKeyError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

create_exception!(pyh4, ConfigurationError, PyValueError);
create_exception!(pyh4, DomainError, PyArithmeticError);

type Evaluation = (f64, Vec<[f64; 3]>);

fn to_py_err(err: CorrectionError) -> PyErr {
    if err.is_domain() {
        DomainError::new_err(err.to_string())
    } else {
        ConfigurationError::new_err(err.to_string())
    }
}

fn parameters_from_dict(parameters: &Bound<'_, PyDict>) -> PyResult<CorrectionParameters> {
    let mut values = [0.0; 10];
    for (value, name) in values.iter_mut().zip(ParameterRecord::FIELD_NAMES) {
        let item = parameters
            .get_item(name)?
            .ok_or_else(|| PyKeyError::new_err(name))?;
        *value = item.extract()?;
    }
    CorrectionParameters::from_record(ParameterRecord::from_values(values))
        .map_err(|e| to_py_err(e.into()))
}

fn run(
    py: Python<'_>,
    term: Term,
    natoms: i64,
    positions: Vec<[f64; 3]>,
    numbers: Vec<i64>,
    parameters: &Bound<'_, PyDict>,
) -> PyResult<Evaluation> {
    let count = AtomicConfiguration::checked_atom_count(natoms).map_err(|e| to_py_err(e.into()))?;
    if count != positions.len() {
        return Err(ConfigurationError::new_err(format!(
            "natoms is {count} but {} positions were given",
            positions.len()
        )));
    }
    let corrector = Corrector::new(parameters_from_dict(parameters)?);
    let result = py
        .allow_threads(|| corrector.evaluate(term, &positions, &numbers))
        .map_err(to_py_err)?;
    Ok((result.energy, result.gradient.to_rows()))
}

/// Entry points matching the classic ctypes wrapper around `libh4`.
#[pyclass(name = "H4Library")]
#[derive(Default)]
pub struct PyH4Library;

#[pymethods]
impl PyH4Library {
    #[new]
    fn new() -> Self {
        Self
    }

    /// Returns `(energy, gradient)` of the H4 hydrogen-bond correction.
    #[pyo3(name = "H4Correction")]
    fn h4_correction(
        &self,
        py: Python<'_>,
        natoms: i64,
        positions: Vec<[f64; 3]>,
        numbers: Vec<i64>,
        parameters: &Bound<'_, PyDict>,
    ) -> PyResult<Evaluation> {
        run(py, Term::H4, natoms, positions, numbers, parameters)
    }

    /// Returns `(energy, gradient)` of the H-H repulsion.
    #[pyo3(name = "HHRepulsion")]
    fn hh_repulsion(
        &self,
        py: Python<'_>,
        natoms: i64,
        positions: Vec<[f64; 3]>,
        numbers: Vec<i64>,
        parameters: &Bound<'_, PyDict>,
    ) -> PyResult<Evaluation> {
        run(py, Term::HhRepulsion, natoms, positions, numbers, parameters)
    }

    /// Returns `(energy, gradient)` of both terms summed.
    #[pyo3(name = "H4Calculation")]
    fn h4_calculation(
        &self,
        py: Python<'_>,
        natoms: i64,
        positions: Vec<[f64; 3]>,
        numbers: Vec<i64>,
        parameters: &Bound<'_, PyDict>,
    ) -> PyResult<Evaluation> {
        run(py, Term::Total, natoms, positions, numbers, parameters)
    }

    fn __repr__(&self) -> String {
        format!("<H4Library h4corr {}>", env!("CARGO_PKG_VERSION"))
    }
}

/// The published PM6-D3H4 parameters as a dict suitable for the `parameters` argument.
#[pyfunction]
fn pm6_d3h4_parameters(py: Python<'_>) -> PyResult<Bound<'_, PyDict>> {
    let dict = PyDict::new(py);
    let record = Method::Pm6D3H4.parameters().to_record();
    for (name, value) in ParameterRecord::FIELD_NAMES.iter().zip(record.values()) {
        dict.set_item(*name, value)?;
    }
    Ok(dict)
}

#[pymodule]
fn pyh4(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyH4Library>()?;
    m.add_function(wrap_pyfunction!(pm6_d3h4_parameters, m)?)?;
    m.add("ConfigurationError", m.py().get_type::<ConfigurationError>())?;
    m.add("DomainError", m.py().get_type::<DomainError>())?;
    Ok(())
}
