pub mod check;
pub mod evaluate;
pub mod params;

use crate::cli::ParameterSource;
use crate::error::{CliError, Result};
use h4corr::core::forcefield::params::CorrectionParameters;
use h4corr::core::forcefield::presets::Method;
use h4corr::core::io::traits::StructureFile;
use h4corr::core::io::xyz::XyzFile;
use h4corr::core::models::configuration::AtomicConfiguration;
use h4corr::engine::config::{EvaluationOptions, NeighborSearch};
use h4corr::workflows::correction::Corrector;
use std::path::Path;
use tracing::info;

fn load_parameters(source: &ParameterSource) -> Result<CorrectionParameters> {
    match (&source.params, source.method) {
        (Some(path), _) => {
            info!("Loading correction parameters from {:?}", path);
            CorrectionParameters::load(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })
        }
        (None, method) => {
            let method = method.unwrap_or_default();
            info!("Using built-in parameter set '{}'", method);
            Ok(*method.parameters())
        }
    }
}

fn build_corrector(source: &ParameterSource, all_pairs: bool) -> Result<Corrector> {
    let params = load_parameters(source)?;
    let search = if all_pairs {
        NeighborSearch::AllPairs
    } else {
        NeighborSearch::CellList
    };
    let options = EvaluationOptions::builder()
        .neighbor_search(search)
        .build()
        .map_err(|e| CliError::Argument(e.to_string()))?;
    Ok(Corrector::with_options(params, options)?)
}

fn read_structure(path: &Path) -> Result<AtomicConfiguration> {
    info!("Loading input geometry from {:?}", path);
    let (config, _) = XyzFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!("Read {} atoms", config.len());
    Ok(config)
}
