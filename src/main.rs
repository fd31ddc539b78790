mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::{error, info};

use guacamol_eval::eval::{self, GuacaMolProcess};
use guacamol_eval::{logging, project};

fn main() -> ExitCode {
    let cli = cli::parse();
    let root = project::current_root_dir();

    if let Err(e) = logging::init(&cli.log_config(&root)) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    let code = match run(&cli, &root) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    };
    logging::shutdown();
    code
}

fn run(cli: &cli::Cli, root: &Path) -> Result<PathBuf> {
    let config = cli.eval_config(root);
    info!(
        "Evaluating {} against {} ({} molecules, {})",
        config.generated.display(),
        config.reference.display(),
        config.num_molecules,
        if config.valid_only { "valid only" } else { "all molecules" }
    );

    let benchmark = GuacaMolProcess::new(&cli.python);
    eval::run(&config, &benchmark)
        .with_context(|| format!("evaluating {}", config.generated.display()))
}
