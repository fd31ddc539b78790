use std::fmt;
use std::path::Path;

use csv::StringRecord;
use log::debug;

use super::error::{SchemaAttempt, SchemaMismatch, SourceError};
use super::filter::{parse_flag, present, present_values};

// ---------------------------------------------------------------------------
// Column layouts
// ---------------------------------------------------------------------------

/// A column layout a molecule table may follow.
///
/// Upstream generators disagree on conventions, so a file is matched against
/// each layout of [`Schema::CHAIN`] in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    /// Header with `smiles` and `valid` columns.
    SmilesValid,
    /// Header with a `smiles` column and no usable validity column.
    Smiles,
    /// No recognised header: the first column holds the molecules.
    Headerless,
}

impl Schema {
    /// Order in which layouts are tried.
    pub const CHAIN: [Schema; 3] = [Schema::SmilesValid, Schema::Smiles, Schema::Headerless];

    /// Whether the layout carries validity information.
    pub fn has_validity(self) -> bool {
        matches!(self, Schema::SmilesValid)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::SmilesValid => write!(f, "{{smiles, valid}}"),
            Schema::Smiles => write!(f, "{{smiles}}"),
            Schema::Headerless => write!(f, "headerless"),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw table
// ---------------------------------------------------------------------------

/// Every record of a delimited file, header row included.
///
/// The first record is only a header for the named layouts; the headerless
/// layout reads it as data.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    records: Vec<StringRecord>,
}

impl RawTable {
    pub fn from_records(records: Vec<StringRecord>) -> Self {
        RawTable { records }
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.records
            .first()?
            .iter()
            .position(|h| h.trim() == name)
    }

    /// Data rows with their 1-based line number in the file.
    fn body(&self) -> impl Iterator<Item = (usize, &StringRecord)> {
        self.records.iter().enumerate().skip(1).map(|(i, r)| (i + 1, r))
    }
}

/// Field delimiter, dispatched by extension.
///
/// * `.tsv`, `.smi` – tab
/// * anything else  – comma
fn delimiter_for(path: &Path) -> u8 {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "tsv" | "smi" => b'\t',
        _ => b',',
    }
}

/// Read a delimited file without interpreting its header.
pub fn read_table(path: &Path) -> Result<RawTable, SourceError> {
    let read_err = |source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter_for(path))
        .from_path(path)
        .map_err(read_err)?;

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;

    debug!("Read {} records from {}", records.len(), path.display());
    Ok(RawTable::from_records(records))
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Outcome of applying one layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub schema: Schema,
    /// Molecules in row order, validity-filtered when requested.
    pub molecules: Vec<String>,
    /// Non-missing molecule cells before any validity filtering.
    pub present: usize,
}

impl Schema {
    /// Apply this layout to `table`.
    ///
    /// `valid_only` filters rows only for [`Schema::SmilesValid`]; the other
    /// layouts ignore it and leave the decision to [`resolve`].
    pub fn resolve(self, table: &RawTable, valid_only: bool) -> Result<Resolved, SchemaMismatch> {
        match self {
            Schema::SmilesValid => {
                let smiles = table
                    .column("smiles")
                    .ok_or(SchemaMismatch::MissingColumn("smiles"))?;
                let valid = table
                    .column("valid")
                    .ok_or(SchemaMismatch::MissingColumn("valid"))?;

                let mut molecules = Vec::new();
                let mut present_count = 0;
                for (line, record) in table.body() {
                    let Some(mol) = present(record.get(smiles).unwrap_or("")) else {
                        continue;
                    };
                    present_count += 1;

                    if valid_only {
                        let cell = record.get(valid).unwrap_or("");
                        let keep = parse_flag(cell).ok_or_else(|| SchemaMismatch::InvalidFlag {
                            line,
                            value: cell.to_string(),
                        })?;
                        if !keep {
                            continue;
                        }
                    }
                    molecules.push(mol.to_string());
                }

                Ok(Resolved {
                    schema: self,
                    molecules,
                    present: present_count,
                })
            }

            Schema::Smiles => {
                let smiles = table
                    .column("smiles")
                    .ok_or(SchemaMismatch::MissingColumn("smiles"))?;
                let molecules =
                    present_values(table.body().map(|(_, r)| r.get(smiles).unwrap_or("")));

                Ok(Resolved {
                    schema: self,
                    present: molecules.len(),
                    molecules,
                })
            }

            Schema::Headerless => {
                let molecules =
                    present_values(table.records.iter().map(|r| r.get(0).unwrap_or("")));
                if molecules.is_empty() {
                    return Err(SchemaMismatch::NoMolecules);
                }

                Ok(Resolved {
                    schema: self,
                    present: molecules.len(),
                    molecules,
                })
            }
        }
    }
}

/// Walk [`Schema::CHAIN`] until a layout applies.
///
/// * A layout without validity information fails the whole load when
///   `valid_only` is set, chaining the `{smiles, valid}` failure as cause.
/// * When every layout fails, all attempts are reported in order.
pub fn resolve(path: &Path, table: &RawTable, valid_only: bool) -> Result<Resolved, SourceError> {
    let mut attempts: Vec<SchemaAttempt> = Vec::new();

    for schema in Schema::CHAIN {
        match schema.resolve(table, valid_only) {
            Ok(resolved) => {
                if valid_only && !schema.has_validity() {
                    let cause = attempts
                        .first()
                        .map(|a| a.failure.clone())
                        .unwrap_or(SchemaMismatch::MissingColumn("valid"));
                    return Err(SourceError::Configuration {
                        path: path.to_path_buf(),
                        schema,
                        cause,
                    });
                }
                if !attempts.is_empty() {
                    debug!(
                        "{} matched the {schema} layout after {} failed attempt(s)",
                        path.display(),
                        attempts.len()
                    );
                }
                return Ok(resolved);
            }
            Err(failure) => attempts.push(SchemaAttempt { schema, failure }),
        }
    }

    Err(SourceError::SchemaExhausted {
        path: path.to_path_buf(),
        attempts,
    })
}
