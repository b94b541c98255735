// file: src/extract/pdf.rs
// description: PDF extraction with layered text strategies, table detection, and OCR
// reference: https://docs.rs/lopdf, https://docs.rs/pdf-extract

use crate::config::ExtractionConfig;
use crate::error::{PipelineError, Result};
use crate::models::{DocType, Document, DocumentMetadata};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

pub struct PdfExtractor<'a> {
    config: &'a ExtractionConfig,
}

impl<'a> PdfExtractor<'a> {
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract text documents from a PDF. Text strategies run in declared
    /// priority order and short-circuit on the first that yields any
    /// non-empty page; table extraction always runs afterwards and its
    /// output may overlap the text documents (tolerated, no dedup).
    pub fn extract(&self, bytes: &[u8], filename: &str) -> Result<Vec<Document>> {
        let mut strategies: Vec<Box<dyn Fn() -> Result<Vec<Document>> + '_>> = vec![
            Box::new(|| Ok(text_layout(bytes, filename))),
            Box::new(|| Ok(text_generic(bytes, filename))),
        ];
        if self.config.enable_ocr {
            strategies.push(Box::new(|| self.text_ocr(bytes, filename)));
        }

        let mut docs = run_strategy_ladder(&strategies)?;

        let tables = extract_tables(bytes, filename);
        info!(
            "PDF extraction completed: {} documents ({} text pages, {} tables)",
            docs.len() + tables.len(),
            docs.len(),
            tables.len()
        );
        docs.extend(tables);

        Ok(docs)
    }

    /// OCR fallback: render pages to images with pdftoppm, then run
    /// tesseract over each. Both run inside a scoped temp dir that is
    /// removed on every exit path.
    fn text_ocr(&self, bytes: &[u8], filename: &str) -> Result<Vec<Document>> {
        let staging = tempfile::Builder::new()
            .prefix("finrag-ocr-")
            .tempdir()
            .map_err(PipelineError::Io)?;

        let pdf_path = staging.path().join("input.pdf");
        let mut file = std::fs::File::create(&pdf_path)?;
        file.write_all(bytes)?;
        file.flush()?;
        drop(file);

        let prefix = staging.path().join("page");
        let rendered = Command::new("pdftoppm")
            .arg("-r")
            .arg(self.config.ocr_dpi.to_string())
            .arg("-png")
            .arg(&pdf_path)
            .arg(&prefix)
            .output();

        match rendered {
            Ok(out) if out.status.success() => {}
            Ok(out) => {
                warn!(
                    "pdftoppm failed: {}",
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                return Ok(Vec::new());
            }
            Err(e) => {
                warn!("pdftoppm unavailable: {e}");
                return Ok(Vec::new());
            }
        }

        let mut images: Vec<std::path::PathBuf> = std::fs::read_dir(staging.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|e| e == "png"))
            .collect();
        images.sort();

        let mut docs = Vec::new();
        for image in images {
            let page = page_number_from_image(&image).unwrap_or(0);
            let ocr = Command::new("tesseract")
                .arg(&image)
                .arg("stdout")
                .output();

            let text = match ocr {
                Ok(out) if out.status.success() => {
                    String::from_utf8_lossy(&out.stdout).into_owned()
                }
                Ok(out) => {
                    warn!(
                        "tesseract failed on page {page}: {}",
                        String::from_utf8_lossy(&out.stderr).trim()
                    );
                    continue;
                }
                Err(e) => {
                    warn!("tesseract unavailable: {e}");
                    break;
                }
            };

            if !text.trim().is_empty() {
                docs.push(page_document(filename, page, "ocr", text));
            }
        }

        info!("OCR extracted {} pages", docs.len());
        Ok(docs)
    }
}

/// Layout-aware per-page extraction via lopdf.
fn text_layout(bytes: &[u8], filename: &str) -> Vec<Document> {
    let doc = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("layout extraction failed: {e}");
            return Vec::new();
        }
    };

    let mut docs = Vec::new();
    for (page, _) in doc.get_pages() {
        match doc.extract_text(&[page]) {
            Ok(text) if !text.trim().is_empty() => {
                docs.push(page_document(filename, page, "layout", text));
            }
            Ok(_) => {}
            Err(e) => debug!("layout extraction failed on page {page}: {e}"),
        }
    }

    info!("layout extraction yielded {} pages", docs.len());
    docs
}

/// Whole-document extraction via pdf-extract, split on form-feed page breaks
/// (a single page-1 document when none are present).
fn text_generic(bytes: &[u8], filename: &str) -> Vec<Document> {
    let text = match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("generic extraction failed: {e}");
            return Vec::new();
        }
    };

    let docs: Vec<Document> = text
        .split('\u{c}')
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(i, page)| page_document(filename, i as u32 + 1, "generic", page.to_string()))
        .collect();

    info!("generic extraction yielded {} pages", docs.len());
    docs
}

fn page_document(filename: &str, page: u32, method: &str, text: String) -> Document {
    let mut meta = DocumentMetadata::new(filename, DocType::Text);
    meta.page = Some(page);
    meta.method = Some(method.to_string());
    meta.char_count = Some(text.chars().count());
    Document::new(text, meta)
}

/// Heuristic table detection: per page, runs of two or more consecutive
/// lines that each split into two or more cells become a table document
/// with a header-qualified row layout.
fn extract_tables(bytes: &[u8], filename: &str) -> Vec<Document> {
    let doc = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("table extraction failed: {e}");
            return Vec::new();
        }
    };

    let mut docs = Vec::new();
    for (page, _) in doc.get_pages() {
        let Ok(text) = doc.extract_text(&[page]) else {
            continue;
        };

        for (t_idx, table) in detect_tables(&text).into_iter().enumerate() {
            let rendered = render_detected_table(&table);
            if rendered.is_empty() {
                continue;
            }
            let content = format!("TABLE {} (Page {page}):\n{rendered}", t_idx + 1);
            let mut meta = DocumentMetadata::new(filename, DocType::Table);
            meta.page = Some(page);
            meta.table_id = Some(t_idx + 1);
            meta.rows = Some(table.len());
            meta.method = Some("table_extraction".to_string());
            docs.push(Document::new(content, meta));
        }
    }

    info!("Extracted {} tables", docs.len());
    docs
}

/// Split page text into cell grids. A tabular line has at least two cells
/// when split on `|`, tabs, or runs of two or more spaces.
pub(crate) fn detect_tables(text: &str) -> Vec<Vec<Vec<String>>> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        let cells = split_columns(line);
        if cells.len() >= 2 {
            current.push(cells);
        } else {
            if current.len() >= 2 {
                tables.push(std::mem::take(&mut current));
            }
            current.clear();
        }
    }
    if current.len() >= 2 {
        tables.push(current);
    }

    tables
}

fn split_columns(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.contains('|') {
        return trimmed
            .split('|')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }

    if trimmed.contains('\t') {
        return trimmed
            .split('\t')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }

    // split on runs of 2+ spaces
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut spaces = 0usize;
    for ch in trimmed.chars() {
        if ch == ' ' {
            spaces += 1;
            continue;
        }
        if spaces >= 2 && !cell.is_empty() {
            cells.push(cell.clone());
            cell.clear();
        } else if spaces == 1 {
            cell.push(' ');
        }
        spaces = 0;
        cell.push(ch);
    }
    if !cell.is_empty() {
        cells.push(cell);
    }
    cells
}

/// Header row is the first non-empty row; data rows are qualified
/// `ColumnName: value | ...`, falling back to ColN past the header width.
pub(crate) fn render_detected_table(rows: &[Vec<String>]) -> String {
    let mut lines = Vec::new();
    let mut headers: Option<&Vec<String>> = None;

    for row in rows {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        match headers {
            None => {
                headers = Some(row);
                lines.push(format!("HEADERS: {}", row.join(" | ")));
            }
            Some(hdrs) => {
                let qualified: Vec<String> = row
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| match hdrs.get(i) {
                        Some(name) => format!("{name}: {cell}"),
                        None => format!("Col{}: {cell}", i + 1),
                    })
                    .collect();
                lines.push(qualified.join(" | "));
            }
        }
    }

    lines.join("\n")
}

/// Run text strategies in declared order, returning the output of the first
/// that yields any document. Later strategies are never invoked once one
/// succeeds, so the OCR entry only runs when everything before it came back
/// empty.
fn run_strategy_ladder(
    strategies: &[Box<dyn Fn() -> Result<Vec<Document>> + '_>],
) -> Result<Vec<Document>> {
    for strategy in strategies {
        let docs = strategy()?;
        if !docs.is_empty() {
            return Ok(docs);
        }
    }
    Ok(Vec::new())
}

fn page_number_from_image(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('-').next()?.parse().ok()
}

/// Placeholder for a PDF with no extractable text at all.
pub fn no_content_document(filename: &str) -> Document {
    let mut meta = DocumentMetadata::new(filename, DocType::Text);
    meta.error = Some("no_content".to_string());
    Document::new("No text extracted from PDF", meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_columns_variants() {
        assert_eq!(split_columns("a | b | c"), vec!["a", "b", "c"]);
        assert_eq!(split_columns("a\tb"), vec!["a", "b"]);
        assert_eq!(split_columns("Item   Price   Qty"), vec!["Item", "Price", "Qty"]);
        assert_eq!(split_columns("single sentence here"), vec!["single sentence here"]);
        assert!(split_columns("   ").is_empty());
    }

    #[test]
    fn test_single_spaces_stay_in_cell() {
        assert_eq!(
            split_columns("Net Revenue   1,200.00"),
            vec!["Net Revenue", "1,200.00"]
        );
    }

    #[test]
    fn test_detect_tables_requires_two_lines() {
        let text = "Item  Price\nWidget  10\nGadget  20\n\nprose line\nanother prose line\n";
        let tables = detect_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 3);

        let lonely = "Item  Price\nplain prose\n";
        assert!(detect_tables(lonely).is_empty());
    }

    #[test]
    fn test_render_detected_table_header_qualified() {
        let rows = vec![
            vec!["Item".to_string(), "Price".to_string()],
            vec!["Widget".to_string(), "10".to_string()],
            vec!["Gadget".to_string(), "20".to_string(), "extra".to_string()],
        ];
        let rendered = render_detected_table(&rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "HEADERS: Item | Price");
        assert_eq!(lines[1], "Item: Widget | Price: 10");
        assert_eq!(lines[2], "Item: Gadget | Price: 20 | Col3: extra");
    }

    #[test]
    fn test_page_number_from_image() {
        assert_eq!(
            page_number_from_image(Path::new("/tmp/x/page-2.png")),
            Some(2)
        );
        assert_eq!(
            page_number_from_image(Path::new("/tmp/x/page-12.png")),
            Some(12)
        );
        assert_eq!(page_number_from_image(Path::new("/tmp/x/nodigits.png")), None);
    }

    #[test]
    fn test_no_content_placeholder() {
        let doc = no_content_document("empty.pdf");
        assert_eq!(doc.content, "No text extracted from PDF");
        assert_eq!(doc.metadata.error.as_deref(), Some("no_content"));
    }

    #[test]
    fn test_invalid_bytes_yield_no_text_docs() {
        // both strategies tolerate garbage input without erroring
        assert!(text_layout(b"not a pdf", "x.pdf").is_empty());
        assert!(extract_tables(b"not a pdf", "x.pdf").is_empty());
    }

    #[test]
    fn test_ladder_short_circuits_on_first_non_empty() {
        use std::cell::Cell;

        let calls = [Cell::new(0usize), Cell::new(0usize), Cell::new(0usize)];
        let strategies: Vec<Box<dyn Fn() -> Result<Vec<Document>> + '_>> = vec![
            Box::new(|| {
                calls[0].set(calls[0].get() + 1);
                Ok(vec![page_document("a.pdf", 1, "layout", "page one".into())])
            }),
            Box::new(|| {
                calls[1].set(calls[1].get() + 1);
                Ok(vec![page_document("a.pdf", 1, "generic", "unused".into())])
            }),
            Box::new(|| {
                calls[2].set(calls[2].get() + 1);
                Ok(vec![page_document("a.pdf", 1, "ocr", "unused".into())])
            }),
        ];

        let docs = run_strategy_ladder(&strategies).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata.method.as_deref(), Some("layout"));
        assert_eq!([calls[0].get(), calls[1].get(), calls[2].get()], [1, 0, 0]);
    }

    #[test]
    fn test_ladder_reaches_ocr_only_when_earlier_empty() {
        use std::cell::Cell;

        let ocr_calls = Cell::new(0usize);
        let strategies: Vec<Box<dyn Fn() -> Result<Vec<Document>> + '_>> = vec![
            Box::new(|| Ok(Vec::new())),
            Box::new(|| Ok(Vec::new())),
            Box::new(|| {
                ocr_calls.set(ocr_calls.get() + 1);
                Ok(vec![page_document("scan.pdf", 2, "ocr", "scanned text".into())])
            }),
        ];

        let docs = run_strategy_ladder(&strategies).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata.page, Some(2));
        assert_eq!(docs[0].metadata.method.as_deref(), Some("ocr"));
        assert_eq!(ocr_calls.get(), 1);
    }

    #[test]
    fn test_ladder_all_empty_yields_nothing() {
        let strategies: Vec<Box<dyn Fn() -> Result<Vec<Document>> + '_>> =
            vec![Box::new(|| Ok(Vec::new())), Box::new(|| Ok(Vec::new()))];
        assert!(run_strategy_ladder(&strategies).unwrap().is_empty());
    }
}
