//! Cell-reference resolution.
//!
//! Before a formula body is parsed, every cell reference in it is replaced by
//! the referenced cell's numeric rendering. This is a purely textual pass over
//! the body, and every failure mode degrades to `0`: a reference to a missing
//! column, an out-of-range row, an empty cell, or non-numeric text never
//! blocks evaluation. Resolution always reads the raw source grid, so a
//! formula can never observe another formula's computed value.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::models::Grid;

/// One uppercase column letter immediately followed by a 1-based row number.
static CELL_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z])(\d+)").unwrap());

/// Replaces every cell reference in `body` with its resolved numeric text.
///
/// The substitution is textual, not grammatical: matches inside quoted
/// strings or longer identifiers are replaced too. The pass knows nothing
/// about the expression grammar.
pub fn resolve_references(body: &str, grid: &Grid) -> String {
    CELL_REF
        .replace_all(body, |caps: &Captures| {
            resolve_one(&caps[1], &caps[2], grid)
        })
        .into_owned()
}

fn resolve_one(column: &str, digits: &str, grid: &Grid) -> String {
    let fallback = || "0".to_string();

    let Some(col) = grid.column_index(column) else {
        return fallback();
    };
    let Some(row) = digits.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
        return fallback();
    };
    if row >= grid.row_count() {
        return fallback();
    }

    let raw = grid.get(row, col).trim();
    if raw.is_empty() {
        return fallback();
    }

    match raw.parse::<f64>() {
        // f64's Display drops the fractional part of integer-valued numbers,
        // so "6.0" in a cell substitutes as "6".
        Ok(number) => number.to_string(),
        Err(_) => fallback(),
    }
}
