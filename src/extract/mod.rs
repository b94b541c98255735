// file: src/extract/mod.rs
// description: extractor dispatch with degraded-vs-fatal outcome reporting
// reference: internal module structure

pub mod pdf;
pub mod spreadsheet;
pub mod table_text;
pub mod text;

pub use pdf::PdfExtractor;
pub use spreadsheet::SpreadsheetExtractor;
pub use table_text::{render_financial_summary, render_table};

use crate::config::ExtractionConfig;
use crate::models::Document;
use tracing::{error, warn};

/// How an extraction run ended. Degraded runs still carry inspectable
/// documents; callers decide what to do without parsing error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStatus {
    Complete,
    NoContent,
    Failed,
}

#[derive(Debug)]
pub struct ExtractOutcome {
    pub documents: Vec<Document>,
    pub status: ExtractStatus,
}

impl ExtractOutcome {
    pub fn is_degraded(&self) -> bool {
        self.status != ExtractStatus::Complete
    }
}

/// Extract documents from raw file bytes, dispatching on the lowercase file
/// extension. Failures never propagate: a fatal extractor error degrades to
/// a single error document so partial results remain visible.
pub fn extract_documents(
    bytes: &[u8],
    filename: &str,
    config: &ExtractionConfig,
) -> ExtractOutcome {
    let extension = filename
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let result = match extension.as_str() {
        "csv" => SpreadsheetExtractor::new(config).extract_csv(bytes, filename),
        "xlsx" | "xls" => SpreadsheetExtractor::new(config).extract_excel(bytes, filename),
        "pdf" => PdfExtractor::new(config).extract(bytes, filename),
        _ => Ok(text::extract_text(bytes, filename)),
    };

    match result {
        Ok(docs) if docs.iter().all(|d| d.content.trim().is_empty()) => {
            warn!("Extraction of {filename} yielded no usable text");
            let placeholder = if extension == "pdf" {
                pdf::no_content_document(filename)
            } else {
                Document::error(filename, "no usable text extracted")
            };
            ExtractOutcome {
                documents: vec![placeholder],
                status: ExtractStatus::NoContent,
            }
        }
        Ok(docs) => ExtractOutcome {
            documents: docs,
            status: ExtractStatus::Complete,
        },
        Err(e) => {
            error!("Extraction of {filename} failed: {e}");
            ExtractOutcome {
                documents: vec![Document::error(filename, &e.to_string())],
                status: ExtractStatus::Failed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::DocType;

    fn config() -> ExtractionConfig {
        Config::default_config().extraction
    }

    #[test]
    fn test_dispatch_by_extension() {
        let outcome = extract_documents(b"A,B\n1,2\n", "data.CSV", &config());
        assert_eq!(outcome.status, ExtractStatus::Complete);
        assert_eq!(outcome.documents[0].metadata.doc_type, DocType::CsvComplete);

        let outcome = extract_documents(b"free text", "readme", &config());
        assert_eq!(outcome.documents[0].metadata.doc_type, DocType::Text);
    }

    #[test]
    fn test_failed_extraction_degrades_to_error_document() {
        let outcome = extract_documents(b"garbage", "book.xlsx", &config());
        assert_eq!(outcome.status, ExtractStatus::Failed);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.documents.len(), 1);
        assert!(outcome.documents[0].is_error());
        assert_eq!(outcome.documents[0].metadata.source, "book.xlsx");
    }

    #[test]
    fn test_empty_content_reported_as_no_content() {
        let outcome = extract_documents(b"   ", "blank.txt", &config());
        assert_eq!(outcome.status, ExtractStatus::NoContent);
        assert!(outcome.is_degraded());
    }
}
