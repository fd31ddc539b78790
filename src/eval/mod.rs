//! Evaluation driver: validate inputs, load molecules, run the benchmark.
//!
//! ```text
//!   EvalConfig ──validate──▶ output path
//!        │
//!        ▼
//!   MoleculeSource (generated, reference)
//!        │
//!        ▼
//!   DistributionLearningBenchmark::assess ──▶ JSON report
//! ```

pub mod benchmark;
pub mod error;
pub mod report;

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::data::{MoleculeGenerator, MoleculeRole, MoleculeSource};

pub use benchmark::{BenchmarkRequest, DistributionLearningBenchmark, GuacaMolProcess};
pub use error::{BenchmarkError, EvalError};
pub use report::ReportSummary;

/// Report file name used when no output path is given.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "GuacaMolEval.json";
pub const DEFAULT_NUM_MOLECULES: usize = 10_000;
/// Fewest molecules the benchmark statistics are defined for.
pub const MIN_SAMPLES: usize = 3;
pub const DEFAULT_BENCHMARK_VERSION: &str = "v1";
/// Reference training set, relative to the project root.
pub const DEFAULT_REFERENCE_PATH: &str = "data/guacamol/guacamol_v1_train.csv";

// ---------------------------------------------------------------------------
// EvalConfig
// ---------------------------------------------------------------------------

/// Settings of one evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    /// Generated molecules.
    pub generated: PathBuf,
    /// Reference (training) molecules.
    pub reference: PathBuf,
    /// Generated molecules handed to the benchmark.
    pub num_molecules: usize,
    /// Reference molecules handed to the benchmark; `None` takes all of them.
    pub num_reference: Option<usize>,
    /// Report path; `None` puts [`DEFAULT_OUTPUT_FILE_NAME`] next to `generated`.
    pub output: Option<PathBuf>,
    /// Only evaluate molecules flagged valid.
    pub valid_only: bool,
    pub benchmark_version: String,
}

impl EvalConfig {
    pub fn new(generated: impl Into<PathBuf>, reference: impl Into<PathBuf>) -> Self {
        EvalConfig {
            generated: generated.into(),
            reference: reference.into(),
            num_molecules: DEFAULT_NUM_MOLECULES,
            num_reference: None,
            output: None,
            valid_only: true,
            benchmark_version: DEFAULT_BENCHMARK_VERSION.to_string(),
        }
    }

    /// Where the report will be written.
    pub fn output_path(&self) -> PathBuf {
        let path = match &self.output {
            Some(output) => output.clone(),
            None => self
                .generated
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(DEFAULT_OUTPUT_FILE_NAME),
        };
        std::path::absolute(&path).unwrap_or(path)
    }

    /// Check every input before any molecule is read.
    ///
    /// Creates the report's parent directory and returns the report path.
    pub fn validate(&self) -> Result<PathBuf, EvalError> {
        if !self.generated.is_file() {
            return Err(EvalError::MissingFile {
                role: MoleculeRole::Generated.label(),
                path: self.generated.clone(),
            });
        }

        check_minimum("generated molecules", self.num_molecules)?;
        if let Some(n) = self.num_reference {
            check_minimum("reference molecules", n)?;
            check_coverage(n, self.num_molecules)?;
        }

        if !self.reference.is_file() {
            return Err(EvalError::MissingFile {
                role: MoleculeRole::Reference.label(),
                path: self.reference.clone(),
            });
        }

        let output = self.output_path();
        if let Some(dir) = output.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|source| EvalError::OutputDir {
                    dir: dir.to_path_buf(),
                    source,
                })?;
                info!("Created output directory {}", dir.display());
            }
        }
        Ok(output)
    }
}

fn check_minimum(what: &'static str, requested: usize) -> Result<(), EvalError> {
    if requested < MIN_SAMPLES {
        return Err(EvalError::BelowMinimum {
            what,
            requested,
            minimum: MIN_SAMPLES,
        });
    }
    Ok(())
}

fn check_coverage(reference: usize, samples: usize) -> Result<(), EvalError> {
    if reference < samples {
        return Err(EvalError::ReferenceTooSmall { reference, samples });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Evaluate the generated molecules of `config` with `benchmark`.
///
/// Returns the path of the written report.
pub fn run(
    config: &EvalConfig,
    benchmark: &dyn DistributionLearningBenchmark,
) -> Result<PathBuf, EvalError> {
    let output = config.validate()?;

    let generated = MoleculeSource::open(&config.generated, config.valid_only)?;
    let reference = MoleculeSource::open_as(&config.reference, MoleculeRole::Reference, false)?;

    let num_reference = config.num_reference.unwrap_or(reference.len());
    check_minimum("reference molecules", num_reference)?;
    check_coverage(num_reference, config.num_molecules)?;

    let request = BenchmarkRequest {
        reference: reference.draw(num_reference)?,
        reference_path: reference.path().to_path_buf(),
        number_samples: config.num_molecules,
        output: output.clone(),
        version: config.benchmark_version.clone(),
    };
    benchmark.assess(&generated, &request)?;

    match ReportSummary::read(&output) {
        Ok(summary) => {
            for line in summary.lines() {
                info!("{line}");
            }
        }
        Err(e) => warn!("Could not summarise report: {e:#}"),
    }
    info!("Wrote report to {}", output.display());

    Ok(output)
}
