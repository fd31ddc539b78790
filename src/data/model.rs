use std::fmt;
use std::path::{Path, PathBuf};

use log::info;

use super::error::SourceError;
use super::loader::{self, Schema};

// ---------------------------------------------------------------------------
// MoleculeGenerator – the capability handed to a benchmark
// ---------------------------------------------------------------------------

/// Pull-based supplier of molecule strings.
pub trait MoleculeGenerator {
    /// The first `n` molecules, or [`SourceError::Bounds`] if fewer exist.
    fn draw(&self, n: usize) -> Result<Vec<String>, SourceError>;
}

// ---------------------------------------------------------------------------
// MoleculeRole
// ---------------------------------------------------------------------------

/// What a set of molecules stands for in an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleculeRole {
    /// Output of the model under evaluation.
    Generated,
    /// Training molecules the generated ones are compared against.
    Reference,
}

impl MoleculeRole {
    pub fn label(self) -> &'static str {
        match self {
            MoleculeRole::Generated => "generated",
            MoleculeRole::Reference => "reference",
        }
    }
}

impl fmt::Display for MoleculeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// MoleculeSource
// ---------------------------------------------------------------------------

/// Molecules loaded once from a delimited file, in file row order.
#[derive(Debug, Clone)]
pub struct MoleculeSource {
    path: PathBuf,
    role: MoleculeRole,
    valid_only: bool,
    schema: Schema,
    molecules: Vec<String>,
}

impl MoleculeSource {
    /// Load the generated molecules of `path`.
    pub fn open(path: impl AsRef<Path>, valid_only: bool) -> Result<Self, SourceError> {
        Self::open_as(path, MoleculeRole::Generated, valid_only)
    }

    /// Load `path` for the given role.
    ///
    /// Fails with [`SourceError::Empty`] when the matched layout has no
    /// molecule at all; a file whose molecules are all flagged invalid loads
    /// fine and fails later on [`draw`](MoleculeGenerator::draw).
    pub fn open_as(
        path: impl AsRef<Path>,
        role: MoleculeRole,
        valid_only: bool,
    ) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let table = loader::read_table(&path)?;
        let resolved = loader::resolve(&path, &table, valid_only)?;
        if resolved.present == 0 {
            return Err(SourceError::Empty { path });
        }

        info!(
            "Loaded {} {} molecules from {} ({} layout{})",
            resolved.molecules.len(),
            if valid_only { "valid" } else { role.label() },
            path.display(),
            resolved.schema,
            if valid_only {
                format!(", {} rows before validity filter", resolved.present)
            } else {
                String::new()
            }
        );

        Ok(MoleculeSource {
            path,
            role,
            valid_only,
            schema: resolved.schema,
            molecules: resolved.molecules,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn role(&self) -> MoleculeRole {
        self.role
    }

    pub fn valid_only(&self) -> bool {
        self.valid_only
    }

    /// Layout the file was read with.
    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn molecules(&self) -> &[String] {
        &self.molecules
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    /// Adjective used when too few molecules are available.
    fn adjective(&self) -> &'static str {
        if self.valid_only {
            "valid"
        } else {
            self.role.label()
        }
    }
}

impl MoleculeGenerator for MoleculeSource {
    fn draw(&self, n: usize) -> Result<Vec<String>, SourceError> {
        if n > self.molecules.len() {
            return Err(SourceError::Bounds {
                requested: n,
                available: self.molecules.len(),
                adjective: self.adjective(),
            });
        }
        Ok(self.molecules[..n].to_vec())
    }
}

#[cfg(test)]
impl MoleculeSource {
    pub(crate) fn from_molecules(
        molecules: Vec<String>,
        role: MoleculeRole,
        valid_only: bool,
    ) -> Self {
        MoleculeSource {
            path: PathBuf::from("<memory>"),
            role,
            valid_only,
            schema: Schema::Headerless,
            molecules,
        }
    }
}
