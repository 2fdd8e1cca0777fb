//! Extraction report types

use serde::{Deserialize, Serialize};

/// Counters for what the extractor kept and what it skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStatistics {
    /// Category headings encountered (including repeats)
    pub categories: usize,
    /// Repeated headings that discarded earlier records
    pub categories_reset: usize,
    /// Tables encountered
    pub tables_seen: usize,
    /// Tables ignored because no category was active
    pub tables_without_category: usize,
    /// Tables ignored because they had no rows at all
    pub tables_without_header_row: usize,
    /// Tables ignored because the header lacked "api" or "description"
    pub tables_unrecognized: usize,
    /// Body rows of qualifying tables
    pub rows_seen: usize,
    /// Body rows dropped for having fewer than two cells
    pub rows_skipped: usize,
    /// Records appended to the catalog
    pub records: usize,
}

impl ExtractionStatistics {
    pub fn tables_skipped(&self) -> usize {
        self.tables_without_category + self.tables_without_header_row + self.tables_unrecognized
    }
}

/// Complete extraction report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Input file path
    pub input_file: String,
    /// Output file path
    pub output_file: String,
    /// Timestamp of extraction
    pub timestamp: String,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Extraction statistics
    pub statistics: ExtractionStatistics,
}

impl ExtractionReport {
    /// Create a new empty report
    pub fn new(input: &str, output: &str) -> Self {
        Self {
            input_file: input.to_string(),
            output_file: output.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            duration_ms: 0,
            statistics: ExtractionStatistics::default(),
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert to human-readable text format
    pub fn to_text(&self) -> String {
        let stats = &self.statistics;
        let mut output = String::new();

        output.push_str("API Catalog Extraction Report\n");
        output.push_str("=============================\n");
        output.push_str(&format!("Input:  {}\n", self.input_file));
        output.push_str(&format!("Output: {}\n", self.output_file));
        output.push_str(&format!("Date:   {}\n", self.timestamp));
        output.push_str(&format!("Time:   {}ms\n\n", self.duration_ms));

        output.push_str("Statistics\n");
        output.push_str("----------\n");
        output.push_str(&format!("Categories:      {}\n", stats.categories));
        output.push_str(&format!("Tables:          {}\n", stats.tables_seen));
        output.push_str(&format!("Rows:            {}\n", stats.rows_seen));
        output.push_str(&format!("Records:         {}\n\n", stats.records));

        if stats.tables_skipped() > 0 || stats.rows_skipped > 0 || stats.categories_reset > 0 {
            output.push_str("Skipped\n");
            output.push_str("-------\n");
            if stats.tables_without_category > 0 {
                output.push_str(&format!(
                    "Tables before any category: {}\n",
                    stats.tables_without_category
                ));
            }
            if stats.tables_without_header_row > 0 {
                output.push_str(&format!(
                    "Tables without rows:        {}\n",
                    stats.tables_without_header_row
                ));
            }
            if stats.tables_unrecognized > 0 {
                output.push_str(&format!(
                    "Tables without api/description columns: {}\n",
                    stats.tables_unrecognized
                ));
            }
            if stats.rows_skipped > 0 {
                output.push_str(&format!(
                    "Rows with fewer than 2 cells: {}\n",
                    stats.rows_skipped
                ));
            }
            if stats.categories_reset > 0 {
                output.push_str(&format!(
                    "Repeated categories reset:  {}\n",
                    stats.categories_reset
                ));
            }
            output.push('\n');
        }

        output
    }
}
