use super::{build_corrector, read_structure};
use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use h4corr::core::io::reference::{Deviation, ReferenceFile};
use tracing::{info, warn};

pub fn run(args: CheckArgs) -> Result<Deviation> {
    if !(args.tolerance.is_finite() && args.tolerance >= 0.0) {
        return Err(CliError::Argument(format!(
            "tolerance must be a non-negative number (got {})",
            args.tolerance
        )));
    }

    let corrector = build_corrector(&args.source, args.all_pairs)?;
    let config = read_structure(&args.input)?;

    info!("Loading reference output from {:?}", &args.reference);
    let reference =
        ReferenceFile::read_from_path(&args.reference).map_err(|e| CliError::FileParsing {
            path: args.reference.clone(),
            source: e.into(),
        })?;

    let computed = corrector.breakdown(&config)?;
    let deviation = Deviation::between(&reference, &computed).map_err(|e| {
        CliError::Argument(format!(
            "reference '{}' does not describe this geometry: {e}",
            args.reference.display()
        ))
    })?;

    println!("Max |dE_H4|    = {:.3e}", deviation.h4_energy);
    println!("Max |dE_HH|    = {:.3e}", deviation.hh_energy);
    println!("Max |dG_H4|    = {:.3e}", deviation.h4_gradient);
    println!("Max |dG_HH|    = {:.3e}", deviation.hh_gradient);

    if deviation.within(args.tolerance) {
        println!("Reference reproduced within {:.1e}.", args.tolerance);
        Ok(deviation)
    } else {
        warn!(
            deviation = deviation.max(),
            tolerance = args.tolerance,
            "Reference not reproduced"
        );
        Err(CliError::CheckFailed {
            deviation: deviation.max(),
            tolerance: args.tolerance,
        })
    }
}
