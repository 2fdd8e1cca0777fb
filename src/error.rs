//! Error types for the load and write stages.
//!
//! Only I/O is fatal. Rendering and table-shape mismatches are tolerated by
//! the extractor and never surface here.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Error: The file {} was not found.", .path.display())]
    NotFound { path: PathBuf },
    #[error("Error reading file {}: {source}", .path.display())]
    Read {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
    #[error("Error writing JSON file {}: {source}", .path.display())]
    Write {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}
