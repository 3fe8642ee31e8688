use super::{build_corrector, read_structure};
use crate::cli::EvaluateArgs;
use crate::error::{CliError, Result};
use h4corr::core::io::reference::ReferenceFile;
use h4corr::core::models::configuration::AtomicConfiguration;
use h4corr::core::models::gradient::{CorrectionBreakdown, CorrectionResult, GradientField};
use h4corr::workflows::correction::Term;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
struct GradientRow<'a> {
    atom: usize,
    element: &'a str,
    dx: f64,
    dy: f64,
    dz: f64,
}

pub fn run(args: EvaluateArgs, show_gradient: bool) -> Result<CorrectionResult> {
    let corrector = build_corrector(&args.source, args.all_pairs)?;
    let config = read_structure(&args.input)?;

    info!("Evaluating corrections ({})", args.term);
    // A single term is evaluated alone unless the reference output needs both.
    let (selected, breakdown) = if args.term == Term::Total || args.output.is_some() {
        let breakdown = corrector.breakdown(&config)?;
        (select(&breakdown, args.term), Some(breakdown))
    } else {
        (corrector.compute(args.term, &config)?, None)
    };

    match &breakdown {
        Some(breakdown) => {
            println!("E_H4    = {:>18.10} kcal/mol", breakdown.h4.energy);
            println!("E_HH    = {:>18.10} kcal/mol", breakdown.hh_repulsion.energy);
            println!("E_total = {:>18.10} kcal/mol", breakdown.energies().total());
        }
        None => println!("{:<7} = {:>18.10} kcal/mol", label(args.term), selected.energy),
    }

    if show_gradient {
        println!();
        println!("Gradient of '{}' (kcal/mol/A)", args.term);
        for (i, g) in selected.gradient.iter().enumerate() {
            println!(
                "{:>6} {:<2} {:>16.10} {:>16.10} {:>16.10}",
                i + 1,
                config.element(i).symbol(),
                g.x,
                g.y,
                g.z
            );
        }
    }

    if let (Some(path), Some(breakdown)) = (&args.output, &breakdown) {
        info!("Writing reference output to {:?}", path);
        ReferenceFile::write_to_path(breakdown, path).map_err(|e| CliError::FileWriting {
            path: path.clone(),
            source: e.into(),
        })?;
        println!("Reference output written to: {}", path.display());
    }

    if let Some(path) = &args.gradient_csv {
        info!("Writing gradient table to {:?}", path);
        write_gradient_csv(path, &config, &selected.gradient)?;
        println!("Gradient table written to: {}", path.display());
    }

    Ok(selected)
}

fn select(breakdown: &CorrectionBreakdown, term: Term) -> CorrectionResult {
    match term {
        Term::H4 => breakdown.h4.clone(),
        Term::HhRepulsion => breakdown.hh_repulsion.clone(),
        Term::Total => breakdown.total(),
    }
}

fn label(term: Term) -> &'static str {
    match term {
        Term::H4 => "E_H4",
        Term::HhRepulsion => "E_HH",
        Term::Total => "E_total",
    }
}

fn write_gradient_csv(
    path: &Path,
    config: &AtomicConfiguration,
    gradient: &GradientField,
) -> Result<()> {
    let to_error = |e: csv::Error| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut writer = csv::Writer::from_path(path).map_err(to_error)?;
    for (atom, g) in gradient.iter().enumerate() {
        writer
            .serialize(GradientRow {
                atom: atom + 1,
                element: config.element(atom).symbol(),
                dx: g.x,
                dy: g.y,
                dz: g.z,
            })
            .map_err(to_error)?;
    }
    writer.flush()?;
    Ok(())
}
