// file: src/extract/table_text.rs
// description: deterministic text rendering of tabular data with full row dumps
// reference: internal text layout consumed by the splitter separator list

use crate::models::Table;
use std::fmt::Write;

/// Render a table into the canonical text layout: header block, numerical
/// summary, categorical summary, then every raw row. Section markers
/// (`=== ... ===`) and the `Row n:` lines are load-bearing for downstream
/// splitting and retrieval; answers must be traceable to literal row data,
/// so no row is ever summarized away.
pub fn render_table(table: &Table, title: &str) -> String {
    if table.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "=== {title} ===");
    let _ = writeln!(out, "Total Rows: {}", table.row_count());
    let _ = writeln!(out, "Total Columns: {}", table.column_count());
    out.push('\n');
    let _ = writeln!(out, "COLUMN HEADERS: {}", table.columns.join(" | "));
    out.push('\n');

    let numeric = table.numeric_columns();
    if !numeric.is_empty() {
        out.push_str("=== NUMERICAL SUMMARY ===\n");
        for &idx in &numeric {
            let values = table.numeric_values(idx);
            let total: f64 = values.iter().sum();
            let count = values.len();
            let mean = if count > 0 { total / count as f64 } else { 0.0 };
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let _ = writeln!(
                out,
                "{}: TOTAL={:.2}, AVERAGE={:.2}, COUNT={}, MIN={:.2}, MAX={:.2}",
                table.columns[idx], total, mean, count, min, max
            );
        }
        out.push('\n');
    }

    let text_cols = table.text_columns();
    if !text_cols.is_empty() {
        out.push_str("=== CATEGORICAL SUMMARY ===\n");
        for &idx in &text_cols {
            let counts = table.value_counts(idx);
            let _ = writeln!(out, "{}: {} unique values", table.columns[idx], counts.len());
            let mut ranked = counts;
            // stable sort keeps first-encounter order among equal counts
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            for (value, count) in ranked.into_iter().take(10) {
                let _ = writeln!(out, "  {value}: {count} occurrences");
            }
        }
        out.push('\n');
    }

    out.push_str("=== ALL DATA ROWS ===");
    for (i, row) in table.rows.iter().enumerate() {
        let cells: Vec<String> = table
            .columns
            .iter()
            .zip(row.iter())
            .map(|(col, val)| format!("{col}:{val}"))
            .collect();
        let _ = write!(out, "\nRow {}: {}", i + 1, cells.join(" | "));
    }

    out
}

/// TOTAL/AVERAGE/COUNT lines per numeric column. `None` when no numeric
/// column exists.
pub fn render_financial_summary(table: &Table) -> Option<String> {
    let numeric = table.numeric_columns();
    if numeric.is_empty() {
        return None;
    }

    let mut lines = vec!["=== FINANCIAL SUMMARY ===".to_string()];
    for idx in numeric {
        let values = table.numeric_values(idx);
        let total: f64 = values.iter().sum();
        let count = values.len();
        let avg = if count > 0 { total / count as f64 } else { 0.0 };
        let col = &table.columns[idx];
        lines.push(format!("{col} TOTAL: {total:.2}"));
        lines.push(format!("{col} AVERAGE: {avg:.2}"));
        lines.push(format!("{col} COUNT: {count}"));
    }

    Some(lines.join("\n"))
}
