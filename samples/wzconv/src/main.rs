mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, CliError};
use wzmodel::MeshSelection;

fn run(args: &Cli) -> Result<(), CliError> {
    let format = args.output_format()?;
    let mut model = wzmodel::load(&args.input)?;
    tracing::info!(
        input = %args.input.display(),
        meshes = model.mesh_count(),
        "loaded"
    );

    let selection = MeshSelection::from(args.mesh);
    if let Some(s) = args.scale {
        model.scale(selection, s.x, s.y, s.z)?;
    }
    if let Some(axis) = args.mirror {
        model.mirror(selection, axis)?;
    }
    if args.reverse_winding {
        model.reverse_winding(selection)?;
    }

    wzmodel::save(&args.output, format, &model)?;
    tracing::info!(output = %args.output.display(), %format, "saved");
    Ok(())
}

pub fn main() -> ExitCode {
    let args = Cli::parse();
    cli::initialize_tracing(&args.log_filter, args.log_format);
    tracing::debug!("{args:?}");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
