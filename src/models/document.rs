// file: src/models/document.rs
// description: extracted document model with typed source metadata
// reference: internal data structures

use serde::{Deserialize, Serialize};

/// Kind of extracted document, recorded in chunk metadata for retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    CsvComplete,
    ExcelSheetComplete,
    ExcelChunk,
    CsvGroup,
    FinancialSummary,
    Table,
    Text,
    Error,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::CsvComplete => "csv_complete",
            DocType::ExcelSheetComplete => "excel_sheet_complete",
            DocType::ExcelChunk => "excel_chunk",
            DocType::CsvGroup => "csv_group",
            DocType::FinancialSummary => "financial_summary",
            DocType::Table => "table",
            DocType::Text => "text",
            DocType::Error => "error",
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to every extracted document. Optional fields are only
/// populated by the extractor variant that knows them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Originating filename, always set regardless of processing stage.
    pub source: String,
    pub doc_type: DocType,
    pub sheet: Option<String>,
    pub page: Option<u32>,
    /// Extraction method for PDF pages: layout, generic, ocr, table_extraction.
    pub method: Option<String>,
    pub rows: Option<usize>,
    pub columns: Option<usize>,
    /// 1-based inclusive row range for excel_chunk documents.
    pub chunk_start: Option<usize>,
    pub chunk_end: Option<usize>,
    pub group_column: Option<String>,
    pub group_value: Option<String>,
    pub table_id: Option<usize>,
    pub char_count: Option<usize>,
    pub error: Option<String>,
}

impl DocumentMetadata {
    pub fn new(source: impl Into<String>, doc_type: DocType) -> Self {
        Self {
            source: source.into(),
            doc_type,
            sheet: None,
            page: None,
            method: None,
            rows: None,
            columns: None,
            chunk_start: None,
            chunk_end: None,
            group_column: None,
            group_value: None,
            table_id: None,
            char_count: None,
            error: None,
        }
    }
}

/// One unit of extracted content. Immutable once produced by an extractor;
/// consumed by the splitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Error placeholder document, the degraded output of a failed extraction.
    pub fn error(source: &str, message: &str) -> Self {
        let mut metadata = DocumentMetadata::new(source, DocType::Error);
        metadata.error = Some(message.to_string());
        Self {
            content: format!("Error extracting data: {message}"),
            metadata,
        }
    }

    pub fn is_error(&self) -> bool {
        self.metadata.error.is_some()
    }
}
