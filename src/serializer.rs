//! JSON output for the catalog.
//!
//! The byte format is fixed: four-space indentation, `": "` between keys and
//! values, no trailing newline, and every character outside printable ASCII
//! (DEL and everything above it) written as a `\uXXXX` escape (UTF-16 code units, lowercase hex). Consumers of the
//! existing `public_apis.json` files read exactly this shape.

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::CatalogError;
use crate::extractor::Catalog;

const INDENT: &[u8] = b"    ";

/// Pretty formatter that escapes DEL and everything outside ASCII.
pub struct AsciiPrettyFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl Default for AsciiPrettyFormatter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> AsciiPrettyFormatter<'a> {
    pub fn new() -> Self {
        Self::with_indent(INDENT)
    }

    pub fn with_indent(indent: &'a [u8]) -> Self {
        Self {
            inner: PrettyFormatter::with_indent(indent),
        }
    }
}

impl Formatter for AsciiPrettyFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\u{7f}' {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize any value in the catalog byte format.
pub fn to_writer<W, T>(writer: W, value: &T) -> serde_json::Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let mut ser = Serializer::with_formatter(writer, AsciiPrettyFormatter::new());
    value.serialize(&mut ser)
}

pub fn to_json_string(catalog: &Catalog) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    to_writer(&mut buf, catalog)?;
    // the formatter only ever emits ASCII
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the catalog to `path`, replacing any existing file. A failure part
/// way through can leave a truncated file behind.
pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<(), CatalogError> {
    let to_write_error = |source: io::Error| CatalogError::Write {
        source,
        path: path.to_path_buf(),
    };

    let file = File::create(path).map_err(to_write_error)?;
    let mut writer = BufWriter::new(file);
    to_writer(&mut writer, catalog).map_err(|e| to_write_error(io::Error::from(e)))?;
    writer.flush().map_err(to_write_error)?;

    log::info!("wrote {} categories to {}", catalog.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Record;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        let (index, _) = catalog.open_category("Animals");
        catalog.push_record(index, Record::new("Cats", "https://cats.test", "Cat facts"));
        catalog.open_category("Empty");
        catalog
    }

    #[test]
    fn test_indent_and_layout() {
        let json = to_json_string(&sample_catalog()).unwrap();
        let expected = r#"{
    "apis": {
        "Animals": [
            {
                "name": "Cats",
                "link": "https://cats.test",
                "description": "Cat facts"
            }
        ],
        "Empty": []
    }
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let mut buf = Vec::new();
        to_writer(&mut buf, "café 🐱 \"q\"\n").unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            r#""caf\u00e9 \ud83d\udc31 \"q\"\n""#
        );
    }

    #[test]
    fn test_delete_character_is_escaped() {
        let mut buf = Vec::new();
        to_writer(&mut buf, "a\u{7f}b~").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), r#""a\u007fb~""#);
    }

    #[test]
    fn test_write_catalog_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public_apis.json");
        let catalog = sample_catalog();

        write_catalog(&path, &catalog).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Catalog = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, catalog);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.json");

        let err = write_catalog(&path, &sample_catalog()).unwrap_err();
        assert!(matches!(err, CatalogError::Write { .. }));
    }
}
