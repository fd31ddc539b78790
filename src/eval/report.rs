use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Report summary
// ---------------------------------------------------------------------------

/// The parts of a distribution-learning report worth echoing to the log.
/// Unknown fields are ignored; the file itself is left untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSummary {
    #[serde(default)]
    pub benchmark_suite_version: Option<String>,
    #[serde(default)]
    pub results: Vec<BenchmarkScore>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BenchmarkScore {
    pub benchmark_name: String,
    pub score: f64,
    #[serde(default)]
    pub execution_time: Option<f64>,
}

impl ReportSummary {
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading report {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing report {}", path.display()))
    }

    /// One `name: score` line per benchmark.
    pub fn lines(&self) -> Vec<String> {
        self.results
            .iter()
            .map(|r| match r.execution_time {
                Some(t) => format!("{}: {:.4} ({t:.1}s)", r.benchmark_name, r.score),
                None => format!("{}: {:.4}", r.benchmark_name, r.score),
            })
            .collect()
    }
}
