// file: src/utils/validation.rs
// description: input validation helpers for ingestable files
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use std::fs;
use std::path::Path;

/// Extensions the extractors know how to handle natively. Anything else
/// falls through to plain-text extraction, which is worth a warning but
/// not a refusal.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["csv", "xlsx", "xls", "pdf"];

pub struct Validator;

impl Validator {
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let canonical = fs::canonicalize(path).map_err(|e| {
            PipelineError::Validation(format!(
                "Cannot canonicalize path {}: {}",
                path.display(),
                e
            ))
        })?;

        if !canonical.is_file() {
            return Err(PipelineError::Validation(format!(
                "Path is not a file: {}",
                canonical.display()
            )));
        }

        Ok(())
    }

    pub fn has_supported_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
    }

    pub fn validate_question(question: &str) -> Result<()> {
        if question.trim().is_empty() {
            return Err(PipelineError::Validation(
                "Question cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            text.to_string()
        } else {
            let head: String = text.chars().take(max_length).collect();
            format!("{head}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_file_path() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("report.csv");
        fs::write(&file_path, "a,b\n1,2\n").unwrap();

        assert!(Validator::validate_file_path(&file_path).is_ok());
        assert!(Validator::validate_file_path(Path::new("/nonexistent")).is_err());
        assert!(Validator::validate_file_path(temp.path()).is_err());
    }

    #[test]
    fn test_supported_extensions() {
        assert!(Validator::has_supported_extension(Path::new("a.csv")));
        assert!(Validator::has_supported_extension(Path::new("A.XLSX")));
        assert!(Validator::has_supported_extension(Path::new("report.pdf")));
        assert!(!Validator::has_supported_extension(Path::new("notes.txt")));
        assert!(!Validator::has_supported_extension(Path::new("Makefile")));
    }

    #[test]
    fn test_validate_question() {
        assert!(Validator::validate_question("What is the total?").is_ok());
        assert!(Validator::validate_question("   ").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://example.com").is_ok());
        assert!(Validator::validate_url("http://localhost:11434").is_ok());
        assert!(Validator::validate_url("localhost:11434").is_err());
    }

    #[test]
    fn test_truncate_text_is_char_safe() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(Validator::truncate_text("Résumé data", 6), "Résumé...");
    }
}
