//! Catalog extraction module
//!
//! Turns a rendered markup [`Document`](crate::markup::Document) into a
//! [`Catalog`]: third-level headings name categories, and tables whose header
//! row has both an "api" and a "description" column contribute one record per
//! body row.

mod catalog;
mod report;
mod walker;

pub use catalog::{Catalog, Category, Record, APIS_KEY};
pub use report::{ExtractionReport, ExtractionStatistics};
pub use walker::{
    build_record, column_headers, extract_catalog, is_record_table, CatalogExtractor, Extraction,
    API_COLUMN, CATEGORY_LEVEL, DESCRIPTION_COLUMN,
};
