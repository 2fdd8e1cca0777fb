//! Block sequence to catalog extraction
//!
//! Walks the rendered blocks once, in order. Third-level headings set the
//! active category and tables under it are projected into records. Shapes the
//! walker does not recognize are skipped and counted, never reported as
//! errors.

use super::catalog::{Catalog, Record};
use super::report::{ExtractionReport, ExtractionStatistics};
use crate::markup::{Block, Document, Row, Table};
use pulldown_cmark::HeadingLevel;
use std::time::Instant;

/// Heading level that introduces a category.
pub const CATEGORY_LEVEL: HeadingLevel = HeadingLevel::H3;
/// Column holding the API name and link.
pub const API_COLUMN: &str = "api";
/// Column holding the description.
pub const DESCRIPTION_COLUMN: &str = "description";

/// Result of extraction
#[derive(Debug)]
pub struct Extraction {
    pub catalog: Catalog,
    pub report: ExtractionReport,
}

/// Walk state threaded through the block loop.
#[derive(Default)]
struct Accumulator {
    catalog: Catalog,
    current: Option<usize>,
    stats: ExtractionStatistics,
}

#[derive(Debug, Default)]
pub struct CatalogExtractor;

impl CatalogExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the catalog from rendered markup
    pub fn extract(&self, document: &Document) -> Extraction {
        self.extract_with_paths(document, "", "")
    }

    /// Extract and label the report with the input and output paths
    pub fn extract_with_paths(&self, document: &Document, input: &str, output: &str) -> Extraction {
        let start_time = Instant::now();

        let acc = document
            .blocks()
            .iter()
            .fold(Accumulator::default(), |acc, block| self.visit(acc, block));

        let mut report = ExtractionReport::new(input, output);
        report.statistics = acc.stats;
        report.duration_ms = start_time.elapsed().as_millis() as u64;

        log::info!(
            "extracted {} records in {} categories",
            report.statistics.records,
            acc.catalog.len()
        );

        Extraction {
            catalog: acc.catalog,
            report,
        }
    }

    fn visit(&self, mut acc: Accumulator, block: &Block) -> Accumulator {
        match block {
            Block::Heading { level, text } if *level == CATEGORY_LEVEL => {
                let name = text.trim();
                let (index, reset) = acc.catalog.open_category(name);
                acc.stats.categories += 1;
                if reset {
                    acc.stats.categories_reset += 1;
                    log::debug!("category '{}' repeated, earlier records discarded", name);
                }
                // an empty heading still creates its key but accepts no tables
                acc.current = if name.is_empty() { None } else { Some(index) };
            }
            Block::Table(table) => {
                acc.stats.tables_seen += 1;
                match acc.current {
                    Some(index) => self.visit_table(&mut acc, index, table),
                    None => {
                        acc.stats.tables_without_category += 1;
                        log::debug!("table outside any category ignored");
                    }
                }
            }
            _ => {}
        }
        acc
    }

    fn visit_table(&self, acc: &mut Accumulator, index: usize, table: &Table) {
        let Some(header_row) = table.header() else {
            acc.stats.tables_without_header_row += 1;
            log::debug!("table without rows ignored");
            return;
        };

        let headers = column_headers(header_row);
        if !is_record_table(&headers) {
            acc.stats.tables_unrecognized += 1;
            log::debug!("table with columns {:?} ignored", headers);
            return;
        }

        for row in table.body() {
            acc.stats.rows_seen += 1;
            match build_record(&headers, row) {
                Some(record) => {
                    acc.catalog.push_record(index, record);
                    acc.stats.records += 1;
                }
                None => {
                    acc.stats.rows_skipped += 1;
                    log::debug!("row with {} cell(s) skipped", row.cells.len());
                }
            }
        }
    }
}

/// Lowercased, trimmed header texts in column order.
pub fn column_headers(row: &Row) -> Vec<String> {
    row.cells
        .iter()
        .map(|cell| cell.text().trim().to_lowercase())
        .collect()
}

/// Whether the headers mark a table of API records.
pub fn is_record_table(headers: &[String]) -> bool {
    headers.iter().any(|h| h == API_COLUMN) && headers.iter().any(|h| h == DESCRIPTION_COLUMN)
}

/// Project one body row onto the headers. Rows with fewer than two cells
/// yield nothing; a header without a matching cell just skips that field.
pub fn build_record(headers: &[String], row: &Row) -> Option<Record> {
    if row.cells.len() < 2 {
        return None;
    }

    let mut record = Record::default();
    for (header, cell) in headers.iter().zip(row.cells.iter()) {
        let text = cell.text().trim().to_string();
        match header.as_str() {
            API_COLUMN => record.set_api(text, cell.link().unwrap_or_default().to_string()),
            DESCRIPTION_COLUMN => record.set_description(text),
            other => record.set_field(other, text),
        }
    }
    Some(record)
}

/// Extract only the catalog
pub fn extract_catalog(document: &Document) -> Catalog {
    CatalogExtractor::new().extract(document).catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Cell;

    fn heading(level: HeadingLevel, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    fn row(cells: &[&str]) -> Row {
        Row::new(cells.iter().map(|t| Cell::new(t, None)).collect())
    }

    fn table(rows: Vec<Row>) -> Block {
        Block::Table(Table::new(rows))
    }

    fn api_table() -> Block {
        table(vec![
            row(&["API", "Description"]),
            Row::new(vec![
                Cell::new(" Foo ", Some("http://x.test")),
                Cell::new(" does foo ", None),
            ]),
        ])
    }

    fn extract(blocks: Vec<Block>) -> Extraction {
        CatalogExtractor::new().extract(&Document::from_blocks(blocks))
    }

    #[test]
    fn test_basic_record() {
        let result = extract(vec![heading(HeadingLevel::H3, " Category One "), api_table()]);
        assert_eq!(
            result.catalog.get("Category One"),
            Some(&[Record::new("Foo", "http://x.test", "does foo")][..])
        );
        assert_eq!(result.report.statistics.records, 1);
    }

    #[test]
    fn test_table_before_category_ignored() {
        let result = extract(vec![api_table(), heading(HeadingLevel::H3, "Later")]);
        assert_eq!(result.catalog.get("Later"), Some(&[][..]));
        assert_eq!(result.catalog.record_count(), 0);
        assert_eq!(result.report.statistics.tables_without_category, 1);
    }

    #[test]
    fn test_other_heading_levels_do_not_open_categories() {
        let result = extract(vec![
            heading(HeadingLevel::H2, "Section"),
            api_table(),
            heading(HeadingLevel::H4, "Sub"),
        ]);
        assert!(result.catalog.is_empty());
    }

    #[test]
    fn test_lower_level_heading_keeps_current_category() {
        let result = extract(vec![
            heading(HeadingLevel::H3, "Animals"),
            heading(HeadingLevel::H4, "Cats"),
            api_table(),
        ]);
        assert_eq!(result.catalog.get("Animals").map(<[Record]>::len), Some(1));
    }

    #[test]
    fn test_unrecognized_table_skipped() {
        let result = extract(vec![
            heading(HeadingLevel::H3, "Misc"),
            table(vec![row(&["Name", "Notes"]), row(&["a", "b"])]),
        ]);
        assert_eq!(result.catalog.get("Misc"), Some(&[][..]));
        assert_eq!(result.report.statistics.tables_unrecognized, 1);
    }

    #[test]
    fn test_table_without_rows_skipped() {
        let result = extract(vec![heading(HeadingLevel::H3, "Misc"), table(vec![])]);
        assert_eq!(result.report.statistics.tables_without_header_row, 1);
    }

    #[test]
    fn test_header_matching_is_case_insensitive_and_trimmed() {
        let headers = column_headers(&row(&["  ApI ", "DESCRIPTION"]));
        assert_eq!(headers, ["api", "description"]);
        assert!(is_record_table(&headers));
        assert!(!is_record_table(&["api".to_string(), "descriptions".to_string()]));
    }

    #[test]
    fn test_short_rows_skipped() {
        let result = extract(vec![
            heading(HeadingLevel::H3, "Animals"),
            table(vec![
                row(&["API", "Description"]),
                row(&["lonely"]),
                row(&[]),
                row(&["Cats", "cat facts"]),
            ]),
        ]);
        let records = result.catalog.get("Animals").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), Some("Cats"));
        assert_eq!(records[0].link(), Some(""));
        assert_eq!(result.report.statistics.rows_skipped, 2);
    }

    #[test]
    fn test_extra_columns_pass_through() {
        let result = extract(vec![
            heading(HeadingLevel::H3, "Animals"),
            table(vec![
                row(&["API", "Description", "Auth", "HTTPS", "CORS"]),
                row(&["Cats", "cat facts", "apiKey", "Yes", "No"]),
            ]),
        ]);
        let record = &result.catalog.get("Animals").unwrap()[0];
        let fields: Vec<_> = record.fields().collect();
        assert_eq!(
            fields,
            [
                ("name", "Cats"),
                ("link", ""),
                ("description", "cat facts"),
                ("auth", "apiKey"),
                ("https", "Yes"),
                ("cors", "No"),
            ]
        );
    }

    #[test]
    fn test_missing_cells_skip_only_their_field() {
        let result = extract(vec![
            heading(HeadingLevel::H3, "Animals"),
            table(vec![
                row(&["Description", "Auth", "API"]),
                row(&["cat facts", "No"]),
            ]),
        ]);
        let record = &result.catalog.get("Animals").unwrap()[0];
        assert_eq!(record.name(), None);
        assert_eq!(record.link(), None);
        assert_eq!(record.description(), Some("cat facts"));
        assert_eq!(record.get("auth"), Some("No"));
    }

    #[test]
    fn test_repeated_category_discards_earlier_records() {
        let result = extract(vec![
            heading(HeadingLevel::H3, "Animals"),
            api_table(),
            heading(HeadingLevel::H3, "Books"),
            heading(HeadingLevel::H3, "Animals"),
        ]);
        assert_eq!(
            result.catalog.category_names().collect::<Vec<_>>(),
            ["Animals", "Books"]
        );
        assert_eq!(result.catalog.get("Animals"), Some(&[][..]));
        assert_eq!(result.report.statistics.categories_reset, 1);
    }

    #[test]
    fn test_empty_heading_creates_key_but_ignores_tables() {
        let result = extract(vec![
            heading(HeadingLevel::H3, "Animals"),
            heading(HeadingLevel::H3, "   "),
            api_table(),
        ]);
        assert_eq!(
            result.catalog.category_names().collect::<Vec<_>>(),
            ["Animals", ""]
        );
        assert_eq!(result.catalog.record_count(), 0);
        assert_eq!(result.report.statistics.tables_without_category, 1);
    }

    #[test]
    fn test_extract_catalog_shortcut() {
        let doc = Document::from_blocks(vec![heading(HeadingLevel::H3, "A"), api_table()]);
        assert_eq!(extract_catalog(&doc).record_count(), 1);
    }
}
