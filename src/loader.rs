use std::fs;
use std::io;
use std::path::Path;

use crate::error::CatalogError;

/// Read the whole document at `path` as UTF-8 text.
pub fn load_document(path: &Path) -> Result<String, CatalogError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => CatalogError::NotFound {
            path: path.to_path_buf(),
        },
        _ => CatalogError::Read {
            source,
            path: path.to_path_buf(),
        },
    })?;

    let text = String::from_utf8(bytes).map_err(|e| CatalogError::Read {
        source: io::Error::new(io::ErrorKind::InvalidData, e),
        path: path.to_path_buf(),
    })?;

    log::debug!("loaded {} bytes from {}", text.len(), path.display());
    Ok(text)
}
