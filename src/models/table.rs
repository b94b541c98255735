// file: src/models/table.rs
// description: transient in-memory table model with column type detection
// reference: internal data structures

/// In-memory spreadsheet-like structure. Rows hold string cells parallel to
/// `columns`; missing cells are padded with empty strings at construction.
/// Never persisted, only exists while rendering extraction output.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// A column is numeric when it has at least one non-empty cell and every
    /// non-empty cell parses as a number (currency symbols and thousands
    /// separators stripped first, matching how financial exports are typed).
    pub fn is_numeric_column(&self, index: usize) -> bool {
        let mut seen_value = false;
        for row in &self.rows {
            let cell = row[index].trim();
            if cell.is_empty() {
                continue;
            }
            if parse_numeric(cell).is_none() {
                return false;
            }
            seen_value = true;
        }
        seen_value
    }

    /// Indices of numeric columns in declared column order.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&i| self.is_numeric_column(i))
            .collect()
    }

    /// Indices of non-numeric (categorical/text) columns in declared order.
    pub fn text_columns(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&i| !self.is_numeric_column(i))
            .collect()
    }

    /// Parsed numeric values of a column, skipping empty cells.
    pub fn numeric_values(&self, index: usize) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| parse_numeric(row[index].trim()))
            .collect()
    }

    /// Distinct values of a column in first-encountered order with counts.
    pub fn value_counts(&self, index: usize) -> Vec<(String, usize)> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

        for row in &self.rows {
            let value = row[index].clone();
            if !counts.contains_key(&value) {
                order.push(value.clone());
            }
            *counts.entry(value).or_insert(0) += 1;
        }

        order
            .into_iter()
            .map(|v| {
                let c = counts[&v];
                (v, c)
            })
            .collect()
    }

    pub fn distinct_count(&self, index: usize) -> usize {
        self.value_counts(index).len()
    }

    /// Sub-table keeping only the rows whose cell in `index` equals `value`.
    pub fn filter_rows(&self, index: usize, value: &str) -> Table {
        let rows = self
            .rows
            .iter()
            .filter(|row| row[index] == value)
            .cloned()
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Sub-table for a contiguous row range (0-based, end exclusive).
    pub fn slice_rows(&self, start: usize, end: usize) -> Table {
        let end = end.min(self.rows.len());
        Table {
            columns: self.columns.clone(),
            rows: self.rows[start..end].to_vec(),
        }
    }
}

/// Parse a cell as a number, tolerating `$`, `%` and thousands separators.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .trim()
        .trim_start_matches('$')
        .trim_end_matches('%')
        .replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
