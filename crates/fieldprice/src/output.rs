//! Output formatting helpers for the `fieldprice` CLI.

use std::io::{self, Write};

use fieldprice_core::field::CustomField;
use serde::Serialize;

/// JSON view of a custom field in dependency listings.
#[derive(Serialize)]
pub struct FieldView {
    pub id: u64,
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl FieldView {
    pub fn from_field(field: &CustomField) -> Self {
        Self {
            id: field.id,
            name: field.display_name(),
            kind: field.kind.as_str().to_string(),
            formula: field.formula().map(str::to_string),
        }
    }

    /// Row cells for [`output_table`]: id, name, kind, formula.
    pub fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.kind.clone(),
            self.formula.clone().unwrap_or_else(|| "-".to_string()),
        ]
    }
}

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print rows as an aligned table with a header and separator line.
///
/// Prints nothing when `rows` is empty.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    for line in std::iter::once(&header).chain(std::iter::once(&separator)).chain(rows) {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        let _ = writeln!(handle, "{}", cells.join("  ").trim_end());
    }
}

/// Formats a price without trailing zeros: `12`, `12.5`, `-0.25`.
pub fn format_amount(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldprice_core::enums::FieldKind;
    use fieldprice_core::field::FieldBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn amounts_drop_trailing_zeros() {
        assert_eq!(format_amount(12.0), "12");
        assert_eq!(format_amount(12.5), "12.5");
        assert_eq!(format_amount(-0.25), "-0.25");
        assert_eq!(format_amount(0.0), "0");
    }

    #[test]
    fn field_view_row() {
        let field = FieldBuilder::new(3, FieldKind::Number).formula("value * 2").build();
        let view = FieldView::from_field(&field);
        assert_eq!(view.row(), vec!["3", "field 3", "number", "value * 2"]);
    }
}
