// ---------------------------------------------------------------------------
// Cell predicates shared by every column layout
// ---------------------------------------------------------------------------

/// Tokens treated as a missing value, on top of empty cells.
/// Mirrors the NA vocabulary of the dataframe tools that write these files.
const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw cell counts as missing.
pub fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || MISSING_TOKENS.contains(&cell)
}

/// Trimmed cell content, or `None` for a missing value.
pub fn present(cell: &str) -> Option<&str> {
    if is_missing(cell) {
        None
    } else {
        Some(cell.trim())
    }
}

/// Parse a validity flag.
///
/// A missing flag is `Some(false)`; anything that is not a recognisable
/// boolean yields `None`.
pub fn parse_flag(cell: &str) -> Option<bool> {
    let Some(cell) = present(cell) else {
        return Some(false);
    };
    match cell {
        "true" | "True" | "TRUE" | "1" | "1.0" => Some(true),
        "false" | "False" | "FALSE" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

/// Keep the present cells of a column, in row order.
pub fn present_values<'a, I>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    cells
        .into_iter()
        .filter_map(present)
        .map(str::to_string)
        .collect()
}
