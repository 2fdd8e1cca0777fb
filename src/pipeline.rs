//! The load → render → extract → write chain.

use std::path::Path;

use crate::error::CatalogError;
use crate::extractor::{CatalogExtractor, Extraction};
use crate::{loader, markup, serializer};

/// Render and extract markdown already in memory.
pub fn convert_str(markdown: &str) -> Extraction {
    let document = markup::render(markdown);
    CatalogExtractor::new().extract(&document)
}

/// Load and extract `input` without writing anything.
pub fn extract_file(input: &Path, output: &Path) -> Result<Extraction, CatalogError> {
    let markdown = loader::load_document(input)?;
    let document = markup::render(&markdown);
    Ok(CatalogExtractor::new().extract_with_paths(
        &document,
        &input.display().to_string(),
        &output.display().to_string(),
    ))
}

/// Run the whole pipeline. Nothing is written when loading fails.
pub fn convert_file(input: &Path, output: &Path) -> Result<Extraction, CatalogError> {
    let extraction = extract_file(input, output)?;
    serializer::write_catalog(output, &extraction.catalog)?;
    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_convert_str() {
        let md = "### Animals\n\n| API | Description |\n|---|---|\n| Cats | cat facts |\n";
        let extraction = convert_str(md);
        assert_eq!(extraction.catalog.record_count(), 1);
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("README.md");
        let output = dir.path().join("public_apis.json");

        let err = convert_file(&input, &output).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_convert_file_labels_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("README.md");
        let output = dir.path().join("public_apis.json");
        fs::write(&input, "### Empty\n").unwrap();

        let extraction = convert_file(&input, &output).unwrap();
        assert_eq!(extraction.report.input_file, input.display().to_string());
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "{\n    \"apis\": {\n        \"Empty\": []\n    }\n}"
        );
    }
}
