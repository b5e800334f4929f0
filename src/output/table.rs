//! Table formatting for option listings

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};

/// Format rows under the given headers
///
/// Rows shorter than the header are padded with empty cells.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.load_preset(presets::ASCII_HORIZONTAL_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let header: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
        .collect();
    table.set_header(header);

    for row in rows {
        let cells: Vec<Cell> = (0..headers.len())
            .map(|i| Cell::new(row.get(i).map(String::as_str).unwrap_or("")))
            .collect();
        table.add_row(cells);
    }

    table.to_string()
}
