//! Evaluate generated molecules with a distribution-learning benchmark.
//!
//! [`data`] turns a delimited file of SMILES strings into a
//! [`MoleculeSource`](data::MoleculeSource); [`eval`] validates a run and
//! hands the source to a [`DistributionLearningBenchmark`](eval::DistributionLearningBenchmark).

pub mod data;
pub mod eval;
pub mod logging;
pub mod project;
