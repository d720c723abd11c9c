//! Terminal layout helpers

use std::io::{self, Write};

/// Width of one column when entries are laid out side by side
pub const COLUMN_WIDTH: usize = 32;

/// Lay entries out `columns` per row, each left-aligned in a fixed-width cell
pub fn format_columns(entries: &[String], columns: usize) -> Vec<String> {
    entries
        .chunks(columns.max(1))
        .map(|row| {
            row.iter()
                .map(|entry| format!("{:<width$}", entry, width = COLUMN_WIDTH))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

pub fn write_columns(out: &mut dyn Write, entries: &[String], columns: usize) -> io::Result<()> {
    for line in format_columns(entries, columns) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
