//! Result set rendering
//!
//! Turns rows of either backend into a plain-text table the model can read.
//! Cells are decoded without knowing the column types up front: each row
//! value is tried against a short list of Rust types until one fits.

use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table as TextTable;
use sqlx::mysql::MySqlRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column as _, Row, TypeInfo as _, ValueRef as _};

/// Longest cell text shown before truncation
pub const MAX_CELL_CHARS: usize = 100;

/// Text returned for an empty result set
pub const NO_ROWS: &str = "No rows returned.";

/// Render headers and stringified rows as a markdown-style table
pub fn render_table(headers: Vec<String>, rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return NO_ROWS.to_string();
    }

    let mut table = TextTable::new();
    table.load_preset(ASCII_MARKDOWN);
    table.set_header(headers);
    for row in rows {
        table.add_row(row.into_iter().map(|cell| truncate(&cell)));
    }
    table.to_string()
}

/// Shorten a cell to [`MAX_CELL_CHARS`] characters
pub fn truncate(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_CHARS {
        cell.to_string()
    } else {
        let head: String = cell.chars().take(MAX_CELL_CHARS).collect();
        format!("{}...", head)
    }
}

fn headers_of<R: Row>(row: &R) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

/// Render SQLite rows
pub fn render_sqlite_rows(rows: &[SqliteRow]) -> String {
    let headers = rows.first().map(headers_of).unwrap_or_default();
    let cells = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| sqlite_cell(row, i)).collect())
        .collect();
    render_table(headers, cells)
}

/// Render MySQL rows
pub fn render_mysql_rows(rows: &[MySqlRow]) -> String {
    let headers = rows.first().map(headers_of).unwrap_or_default();
    let cells = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| mysql_cell(row, i)).collect())
        .collect();
    render_table(headers, cells)
}

fn sqlite_cell(row: &SqliteRow, idx: usize) -> String {
    match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => return "NULL".to_string(),
        Ok(_) => {}
        Err(e) => return format!("<{}>", e),
    }

    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return v;
    }
    if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
        return format!("<{} bytes>", v.len());
    }
    format!("<{}>", row.column(idx).type_info().name())
}

fn mysql_cell(row: &MySqlRow, idx: usize) -> String {
    match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => return "NULL".to_string(),
        Ok(_) => {}
        Err(e) => return format!("<{}>", e),
    }

    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.try_get::<u64, _>(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return v;
    }
    if let Ok(v) = row.try_get::<chrono::NaiveDateTime, _>(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.try_get::<chrono::NaiveDate, _>(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.try_get::<chrono::NaiveTime, _>(idx) {
        return v.to_string();
    }
    // DECIMAL and friends travel as text on the wire.
    if let Ok(v) = row.try_get_unchecked::<String, _>(idx) {
        return v;
    }
    format!("<{}>", row.column(idx).type_info().name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(150);
        let cut = truncate(&long);
        assert_eq!(cut.len(), MAX_CELL_CHARS + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(render_table(vec!["a".to_string()], vec![]), NO_ROWS);
    }

    #[test]
    fn test_render_table_contains_headers_and_cells() {
        let text = render_table(
            vec!["Name".to_string(), "Total".to_string()],
            vec![vec!["AC/DC".to_string(), "2".to_string()]],
        );
        assert!(text.contains("Name"));
        assert!(text.contains("AC/DC"));
        assert!(text.contains('|'));
    }

    #[tokio::test]
    async fn test_render_sqlite_values() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let rows = sqlx::query("SELECT 1 AS n, 2.5 AS x, 'hi' AS s, NULL AS nothing, X'0102' AS b")
            .fetch_all(&pool)
            .await
            .unwrap();
        let text = render_sqlite_rows(&rows);

        for expected in ["n", "x", "s", "nothing", "b", "1", "2.5", "hi", "NULL", "<2 bytes>"] {
            assert!(text.contains(expected), "missing {expected} in\n{text}");
        }
    }
}
