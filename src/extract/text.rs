// file: src/extract/text.rs
// description: plain text extraction with lossy decoding
// reference: internal extractor structure

use crate::models::{DocType, Document, DocumentMetadata};

/// Wrap raw bytes into a single text document. Undecodable bytes are
/// replaced rather than failing the upload.
pub fn extract_text(bytes: &[u8], filename: &str) -> Vec<Document> {
    let content = String::from_utf8_lossy(bytes).into_owned();
    let mut meta = DocumentMetadata::new(filename, DocType::Text);
    meta.char_count = Some(content.chars().count());
    vec![Document::new(content, meta)]
}
