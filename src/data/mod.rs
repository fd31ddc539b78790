/// Data layer: molecule tables, column detection and truncation.
///
/// Architecture:
/// ```text
///  generated.csv / reference.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  try {smiles, valid} → {smiles} → headerless
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop missing cells, apply validity flags
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ MoleculeSource │  Vec<String>, draw(n) → first n
///   └────────────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;

pub use error::{SchemaAttempt, SchemaMismatch, SourceError};
pub use loader::Schema;
pub use model::{MoleculeGenerator, MoleculeRole, MoleculeSource};
