pub mod config;
pub mod error;
pub mod extractor;
pub mod loader;
pub mod markup;
pub mod pipeline;
pub mod serializer;

pub use error::CatalogError;
pub use extractor::{Catalog, Extraction, Record};
pub use pipeline::{convert_file, convert_str, extract_file};
