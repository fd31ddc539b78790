use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::loader::Schema;

/// Why a single column layout could not be applied to a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    #[error("no '{0}' column in the header")]
    MissingColumn(&'static str),

    #[error("line {line}: '{value}' is not a validity flag")]
    InvalidFlag { line: usize, value: String },

    #[error("file contains no molecules")]
    NoMolecules,
}

/// One failed layout in the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaAttempt {
    pub schema: Schema,
    pub failure: SchemaMismatch,
}

impl fmt::Display for SchemaAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.schema, self.failure)
    }
}

fn render_attempts(attempts: &[SchemaAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// `10000` → `10,000`.
pub fn group_thousands(n: &usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Errors raised while building or drawing from a [`MoleculeSource`](super::MoleculeSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// Validity filtering was requested but the file carries no usable `valid` column.
    #[error(
        "the 'valid_only' option is not supported for {} ({schema} layout), check file format",
        .path.display()
    )]
    Configuration {
        path: PathBuf,
        schema: Schema,
        #[source]
        cause: SchemaMismatch,
    },

    /// Every column layout failed; attempts are listed in the order they were tried.
    #[error("no column layout matched {}: {}", .path.display(), render_attempts(.attempts))]
    SchemaExhausted {
        path: PathBuf,
        attempts: Vec<SchemaAttempt>,
    },

    #[error(
        "The number of molecules to be evaluated ({}) is greater than \
         the number of {adjective} molecules ({})",
        group_thousands(.requested),
        group_thousands(.available)
    )]
    Bounds {
        requested: usize,
        available: usize,
        adjective: &'static str,
    },

    /// A layout matched but its molecule column holds no values.
    #[error("{} contains no molecules", .path.display())]
    Empty { path: PathBuf },

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl SourceError {
    /// The innermost layout failure, when the fallback chain was exhausted.
    pub fn last_attempt(&self) -> Option<&SchemaAttempt> {
        match self {
            SourceError::SchemaExhausted { attempts, .. } => attempts.last(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(group_thousands(&0), "0");
        assert_eq!(group_thousands(&999), "999");
        assert_eq!(group_thousands(&1000), "1,000");
        assert_eq!(group_thousands(&10000), "10,000");
        assert_eq!(group_thousands(&1234567), "1,234,567");
    }

    #[test]
    fn exhausted_lists_every_attempt() {
        let err = SourceError::SchemaExhausted {
            path: PathBuf::from("mols.csv"),
            attempts: vec![
                SchemaAttempt {
                    schema: Schema::SmilesValid,
                    failure: SchemaMismatch::MissingColumn("smiles"),
                },
                SchemaAttempt {
                    schema: Schema::Headerless,
                    failure: SchemaMismatch::NoMolecules,
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("{smiles, valid}: no 'smiles' column"), "{msg}");
        assert!(msg.ends_with("headerless: file contains no molecules"), "{msg}");
        assert_eq!(
            err.last_attempt().map(|a| &a.failure),
            Some(&SchemaMismatch::NoMolecules)
        );
    }
}
