use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};

use super::error::BenchmarkError;
use crate::data::MoleculeGenerator;

// ---------------------------------------------------------------------------
// Collaborator interface
// ---------------------------------------------------------------------------

/// Everything a benchmark needs besides the generator itself.
#[derive(Debug, Clone)]
pub struct BenchmarkRequest {
    /// Reference (training) molecules, already truncated to the requested count.
    pub reference: Vec<String>,
    /// File the reference molecules were read from.
    pub reference_path: PathBuf,
    /// Number of generated molecules to pull from the generator.
    pub number_samples: usize,
    /// Where the JSON report goes.
    pub output: PathBuf,
    /// Benchmark suite version, e.g. `v1`.
    pub version: String,
}

/// A distribution-learning benchmark: compares a generated sample against
/// reference molecules and writes a JSON report to `request.output`.
pub trait DistributionLearningBenchmark {
    fn assess(
        &self,
        generator: &dyn MoleculeGenerator,
        request: &BenchmarkRequest,
    ) -> Result<(), BenchmarkError>;
}

// ---------------------------------------------------------------------------
// GuacaMol through a Python interpreter
// ---------------------------------------------------------------------------

/// Python entry point. Arguments: generated file, reference file, output
/// file, number of samples, suite version.
const GUACAMOL_SHIM: &str = r#"
import sys

from guacamol.assess_distribution_learning import _assess_distribution_learning
from guacamol.distribution_matching_generator import DistributionMatchingGenerator

generated, reference, output, number_samples, version = sys.argv[1:6]

with open(generated) as fh:
    molecules = [line.strip() for line in fh if line.strip()]


class StagedGenerator(DistributionMatchingGenerator):
    def generate(self, number_samples):
        if number_samples > len(molecules):
            raise ValueError(
                f"requested {number_samples} molecules but only {len(molecules)} were staged"
            )
        return molecules[:number_samples]


_assess_distribution_learning(
    model=StagedGenerator(),
    chembl_training_file=reference,
    json_output_file=output,
    benchmark_version=version,
    number_samples=int(number_samples),
)
"#;

/// Lines of interpreter stderr kept in error messages.
const STDERR_TAIL: usize = 20;

/// Runs the GuacaMol distribution-learning suite in a Python interpreter.
///
/// The generator is drawn from once; the sample and the reference molecules
/// are staged as one-SMILES-per-line files in a temporary directory that is
/// removed when the run ends.
#[derive(Debug, Clone)]
pub struct GuacaMolProcess {
    python: OsString,
}

impl GuacaMolProcess {
    pub fn new(python: impl Into<OsString>) -> Self {
        GuacaMolProcess {
            python: python.into(),
        }
    }
}

impl Default for GuacaMolProcess {
    fn default() -> Self {
        GuacaMolProcess::new("python3")
    }
}

impl DistributionLearningBenchmark for GuacaMolProcess {
    fn assess(
        &self,
        generator: &dyn MoleculeGenerator,
        request: &BenchmarkRequest,
    ) -> Result<(), BenchmarkError> {
        let sample = generator.draw(request.number_samples)?;

        let staging = tempfile::Builder::new()
            .prefix("guacamol-eval-")
            .tempdir()
            .map_err(|source| BenchmarkError::Stage {
                dir: std::env::temp_dir(),
                source,
            })?;
        let generated_file = staging.path().join("generated.smiles");
        let reference_file = staging.path().join("reference.smiles");
        write_smiles(&generated_file, &sample)?;
        write_smiles(&reference_file, &request.reference)?;
        debug!(
            "Staged {} generated and {} reference molecules in {}",
            sample.len(),
            request.reference.len(),
            staging.path().display()
        );

        info!(
            "Running GuacaMol {} distribution-learning benchmark ({} samples, {} reference molecules from {})",
            request.version,
            sample.len(),
            request.reference.len(),
            request.reference_path.display()
        );

        let output = Command::new(&self.python)
            .arg("-c")
            .arg(GUACAMOL_SHIM)
            .arg(&generated_file)
            .arg(&reference_file)
            .arg(&request.output)
            .arg(request.number_samples.to_string())
            .arg(&request.version)
            .output()
            .map_err(|source| BenchmarkError::Launch {
                program: self.python.to_string_lossy().into_owned(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("guacamol: {line}");
        }
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(BenchmarkError::Failed {
                status: output.status.to_string(),
                stderr: tail(&stderr, STDERR_TAIL),
            });
        }
        for line in stderr.lines() {
            debug!("guacamol: {line}");
        }

        if !request.output.is_file() {
            warn!("GuacaMol exited cleanly but left no report behind");
            return Err(BenchmarkError::NoReport {
                path: request.output.clone(),
            });
        }
        Ok(())
    }
}

fn write_smiles(path: &Path, molecules: &[String]) -> Result<(), BenchmarkError> {
    let stage_err = |source| BenchmarkError::Stage {
        dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(stage_err)?);
    for mol in molecules {
        writeln!(writer, "{mol}").map_err(stage_err)?;
    }
    writer.flush().map_err(stage_err)
}

/// Last `n` lines of `text`.
fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MoleculeRole, MoleculeSource};

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc", 2), "b\nc");
        assert_eq!(tail("a", 5), "a");
        assert_eq!(tail("", 3), "");
    }

    #[test]
    fn staged_file_has_one_molecule_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.smiles");
        write_smiles(&path, &["CCO".to_string(), "CCN".to_string()]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "CCO\nCCN\n");
    }

    #[test]
    fn missing_interpreter_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = MoleculeSource::from_molecules(
            vec!["CCO".into(), "CCN".into(), "CCC".into()],
            MoleculeRole::Generated,
            false,
        );
        let request = BenchmarkRequest {
            reference: vec!["CCO".into(), "CCN".into(), "CCC".into()],
            reference_path: dir.path().join("ref.csv"),
            number_samples: 3,
            output: dir.path().join("out.json"),
            version: "v1".into(),
        };
        let bench = GuacaMolProcess::new("definitely-not-a-python-interpreter");
        let err = bench.assess(&source, &request).unwrap_err();
        assert!(matches!(err, BenchmarkError::Launch { .. }), "{err:?}");
    }

    #[test]
    fn short_generator_fails_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        let source =
            MoleculeSource::from_molecules(vec!["CCO".into()], MoleculeRole::Generated, true);
        let request = BenchmarkRequest {
            reference: vec![],
            reference_path: dir.path().join("ref.csv"),
            number_samples: 3,
            output: dir.path().join("out.json"),
            version: "v1".into(),
        };
        let err = GuacaMolProcess::default()
            .assess(&source, &request)
            .unwrap_err();
        assert!(matches!(err, BenchmarkError::Draw(_)));
    }
}
