use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::data::SourceError;

/// Failures of the benchmark collaborator.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("could not draw molecules for the benchmark")]
    Draw(#[from] SourceError),

    #[error("could not stage benchmark input in {}", .dir.display())]
    Stage {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not launch '{program}'")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("benchmark exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("benchmark finished without writing {}", .path.display())]
    NoReport { path: PathBuf },
}

/// Errors that end an evaluation run.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A required input file does not exist.
    #[error("{role} molecules file not found: {}", .path.display())]
    MissingFile { role: &'static str, path: PathBuf },

    #[error("could not create output directory {}", .dir.display())]
    OutputDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Statistical metrics are undefined below the minimum sample count.
    #[error("number of {what} must be at least {minimum}, got {requested}")]
    BelowMinimum {
        what: &'static str,
        requested: usize,
        minimum: usize,
    },

    /// The benchmark samples as many reference molecules as generated ones.
    #[error("{reference} reference molecules cannot cover {samples} generated samples")]
    ReferenceTooSmall { reference: usize, samples: usize },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("distribution-learning benchmark failed")]
    Benchmark(#[from] BenchmarkError),
}
