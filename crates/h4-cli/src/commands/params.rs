use crate::cli::ParamsArgs;
use crate::error::{CliError, Result};
use std::fs;
use tracing::info;

pub fn run(args: ParamsArgs) -> Result<()> {
    let text = render(&args)?;
    match &args.output {
        Some(path) => {
            info!("Writing '{}' parameters to {:?}", args.method, path);
            fs::write(path, text)?;
            println!("Parameters written to: {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn render(args: &ParamsArgs) -> Result<String> {
    let body = args
        .method
        .parameters()
        .to_toml_string()
        .map_err(|e| CliError::Other(e.into()))?;
    Ok(format!("# Correction parameters: {}\n{body}", args.method))
}
