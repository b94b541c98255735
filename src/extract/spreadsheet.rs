// file: src/extract/spreadsheet.rs
// description: CSV and Excel extraction into annotated documents
// reference: https://docs.rs/csv, https://docs.rs/calamine

use crate::config::ExtractionConfig;
use crate::error::{PipelineError, Result};
use crate::extract::table_text::{render_financial_summary, render_table};
use crate::models::{DocType, Document, DocumentMetadata, Table};
use calamine::{Data, Reader, open_workbook_auto};
use std::io::Write;
use tracing::{debug, info, warn};

pub struct SpreadsheetExtractor<'a> {
    config: &'a ExtractionConfig,
}

impl<'a> SpreadsheetExtractor<'a> {
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract a CSV file: one complete-dataset document, group documents for
    /// larger files, and a financial summary when numeric columns exist.
    /// Malformed rows are skipped, never fatal.
    pub fn extract_csv(&self, bytes: &[u8], filename: &str) -> Result<Vec<Document>> {
        let table = parse_csv(bytes, filename)?;
        info!(
            "CSV extraction: {} rows, {} columns",
            table.row_count(),
            table.column_count()
        );

        let mut docs = Vec::new();

        let mut meta = DocumentMetadata::new(filename, DocType::CsvComplete);
        meta.rows = Some(table.row_count());
        meta.columns = Some(table.column_count());
        docs.push(Document::new(
            render_table(&table, "Complete CSV Dataset"),
            meta,
        ));

        if table.row_count() > self.config.csv_group_threshold {
            docs.extend(self.group_documents(&table, filename));
        }

        if let Some(summary) = render_financial_summary(&table) {
            let mut meta = DocumentMetadata::new(filename, DocType::FinancialSummary);
            meta.rows = Some(table.row_count());
            docs.push(Document::new(summary, meta));
        }

        Ok(docs)
    }

    /// Group-by documents over the first text column whose distinct-value
    /// count is below the configured cap. Only that one column is used;
    /// singleton groups are skipped.
    fn group_documents(&self, table: &Table, filename: &str) -> Vec<Document> {
        let Some(col_idx) = table
            .text_columns()
            .into_iter()
            .find(|&i| table.distinct_count(i) < self.config.group_max_distinct)
        else {
            return Vec::new();
        };

        let column = table.columns[col_idx].clone();
        let mut docs = Vec::new();

        for (value, count) in table.value_counts(col_idx) {
            if count < 2 {
                continue;
            }
            let group = table.filter_rows(col_idx, &value);
            let title = format!("Category Group - {column}: {value}");
            let mut meta = DocumentMetadata::new(filename, DocType::CsvGroup);
            meta.group_column = Some(column.clone());
            meta.group_value = Some(value);
            meta.rows = Some(group.row_count());
            docs.push(Document::new(render_table(&group, &title), meta));
        }

        debug!(
            "CSV grouping on column '{}' produced {} documents",
            column,
            docs.len()
        );
        docs
    }

    /// Extract every sheet of an Excel workbook: one complete-sheet document
    /// per sheet, plus sequential row-range documents for large sheets.
    /// Workbook parsing requires on-disk staging; the temp file is removed on
    /// every exit path.
    pub fn extract_excel(&self, bytes: &[u8], filename: &str) -> Result<Vec<Document>> {
        let suffix = if filename.to_lowercase().ends_with(".xls") {
            ".xls"
        } else {
            ".xlsx"
        };
        let mut staged = tempfile::Builder::new()
            .prefix("finrag-sheet-")
            .suffix(suffix)
            .tempfile()
            .map_err(|e| stage_error(filename, &e))?;
        staged
            .write_all(bytes)
            .map_err(|e| stage_error(filename, &e))?;
        staged.flush().map_err(|e| stage_error(filename, &e))?;

        let mut workbook = open_workbook_auto(staged.path()).map_err(|e| {
            PipelineError::Extraction {
                source_file: filename.to_string(),
                message: format!("Failed to open workbook: {e}"),
            }
        })?;

        let mut docs = Vec::new();
        let sheet_names = workbook.sheet_names().to_vec();

        for sheet_name in sheet_names {
            let range =
                workbook
                    .worksheet_range(&sheet_name)
                    .map_err(|e| PipelineError::Extraction {
                        source_file: filename.to_string(),
                        message: format!("Failed to read sheet {sheet_name}: {e}"),
                    })?;

            let table = range_to_table(&range);
            info!(
                "Excel sheet '{}': {} rows, {} columns",
                sheet_name,
                table.row_count(),
                table.column_count()
            );

            docs.extend(self.sheet_documents(&table, &sheet_name, filename));
        }

        if docs.is_empty() {
            warn!("Workbook {} has no sheets", filename);
        }

        Ok(docs)
    }

    /// Documents for one worksheet: the complete-sheet rendering, then
    /// row-range chunks for large sheets. Unlike the CSV path, sheets get no
    /// financial-summary or group documents.
    fn sheet_documents(&self, table: &Table, sheet: &str, filename: &str) -> Vec<Document> {
        let mut docs = Vec::new();

        let mut meta = DocumentMetadata::new(filename, DocType::ExcelSheetComplete);
        meta.sheet = Some(sheet.to_string());
        meta.rows = Some(table.row_count());
        meta.columns = Some(table.column_count());
        docs.push(Document::new(
            render_table(table, &format!("Excel Sheet: {sheet}")),
            meta,
        ));

        if table.row_count() > self.config.excel_chunk_rows {
            docs.extend(self.sheet_chunk_documents(table, sheet, filename));
        }

        docs
    }

    /// Sequential fixed-size row-range documents for a large sheet, with
    /// 1-based inclusive chunk_start/chunk_end metadata.
    fn sheet_chunk_documents(&self, table: &Table, sheet: &str, filename: &str) -> Vec<Document> {
        let step = self.config.excel_chunk_rows;
        let mut docs = Vec::new();
        let mut start = 0;

        while start < table.row_count() {
            let end = (start + step).min(table.row_count());
            let slice = table.slice_rows(start, end);
            let title = format!("Sheet {sheet} - Rows {} to {}", start + 1, end);
            let mut meta = DocumentMetadata::new(filename, DocType::ExcelChunk);
            meta.sheet = Some(sheet.to_string());
            meta.chunk_start = Some(start + 1);
            meta.chunk_end = Some(end);
            meta.rows = Some(slice.row_count());
            docs.push(Document::new(render_table(&slice, &title), meta));
            start = end;
        }

        docs
    }
}

fn stage_error(filename: &str, e: &std::io::Error) -> PipelineError {
    PipelineError::Extraction {
        source_file: filename.to_string(),
        message: format!("Failed to stage workbook: {e}"),
    }
}

/// Parse CSV bytes into a Table, skipping rows the reader rejects.
fn parse_csv(bytes: &[u8], filename: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::Extraction {
            source_file: filename.to_string(),
            message: format!("Failed to read CSV headers: {e}"),
        })?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
                row.truncate(headers.len());
                rows.push(row);
            }
            Err(e) => {
                warn!("Skipping malformed CSV row: {e}");
            }
        }
    }

    Ok(Table::new(headers, rows))
}

/// First row of the range is the header row, everything below is data.
/// Missing cells become empty strings.
fn range_to_table(range: &calamine::Range<Data>) -> Table {
    let mut rows_iter = range.rows();

    let columns: Vec<String> = rows_iter
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();

    let rows: Vec<Vec<String>> = rows_iter
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Table::new(columns, rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{f:.0}")
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{dt}"),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{e:?}"),
    }
}
