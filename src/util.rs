// Utility helpers for cell coercion and display formatting.
//
// This module centralizes the "dirty" spreadsheet handling so the loader
// can assume typed values and the renderers can assume integers.
use crate::types::Cell;
use num_format::{Locale, ToFormattedString};

/// Clean a text cell: trim it and treat blanks and the literal `nan` as missing.
pub fn clean_text(cell: &Cell) -> Option<String> {
    let s = match cell {
        Cell::Empty => return None,
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(v) => v.to_string(),
        Cell::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
    };
    if s.is_empty() || s == "nan" {
        return None;
    }
    Some(s)
}

/// Coerce a cell to a finite number.
///
/// Returns `None` when the cell holds something that is not a number, so the
/// caller can count coercions; missing cells are `Some(0.0)`.
pub fn parse_numeric(cell: &Cell) -> Option<f64> {
    let v = match cell {
        Cell::Empty => return Some(0.0),
        Cell::Number(v) => *v,
        Cell::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Cell::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(0.0);
            }
            s.parse::<f64>().ok()?
        }
    };
    // NaN and infinities never reach the table.
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

/// Truncate toward zero for display.
pub fn truncate(v: f64) -> i64 {
    v.trunc() as i64
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Quantities keep their fraction in the table; whole values print without one.
pub fn format_qty(v: f64) -> String {
    if v.fract() == 0.0 {
        format_int(truncate(v))
    } else {
        format!("{:.2}", v)
    }
}
