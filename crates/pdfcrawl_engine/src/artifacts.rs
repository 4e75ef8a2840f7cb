//! Readers and writers for the files a crawl run leaves behind.
//!
//! Layouts are fixed by the ingestion tooling that consumes them:
//! single-column CSV link tables, a 4-space indented download report, and a
//! compact metadata array using `", "` / `": "` separators with non-ASCII
//! characters escaped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pdfcrawl_core::{DownloadRecord, IngestionMetadata};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use thiserror::Error;

use crate::persist::{write_atomic, PersistError};

pub const PDF_LINK_COLUMN: &str = "pdf_link";
pub const TRAVERSED_LINK_COLUMN: &str = "traversed_link";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("column {column:?} missing from {path:?}")]
    MissingColumn { column: String, path: PathBuf },
}

/// Write a one-column CSV table with `column` as its header.
pub fn write_link_table<'a, I>(path: &Path, column: &str, links: I) -> Result<PathBuf, ArtifactError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([column])?;
    for link in links {
        writer.write_record([link])?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(write_atomic(path, &bytes)?)
}

/// Read back the named column of a link table, skipping empty cells.
pub fn read_link_table(path: &Path, column: &str) -> Result<Vec<String>, ArtifactError> {
    let mut reader = csv::Reader::from_path(path)?;
    let index = reader
        .headers()?
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| ArtifactError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut links = Vec::new();
    for row in reader.records() {
        let row = row?;
        if let Some(cell) = row.get(index).map(str::trim).filter(|c| !c.is_empty()) {
            links.push(cell.to_string());
        }
    }
    Ok(links)
}

pub fn write_download_records(
    path: &Path,
    records: &[DownloadRecord],
) -> Result<PathBuf, ArtifactError> {
    let bytes = to_json_with(records, PrettyFormatter::with_indent(b"    "))?;
    Ok(write_atomic(path, &bytes)?)
}

pub fn read_download_records(path: &Path) -> Result<Vec<DownloadRecord>, ArtifactError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn write_ingestion_metadata(
    path: &Path,
    metadata: &[IngestionMetadata],
) -> Result<PathBuf, ArtifactError> {
    let bytes = to_json_with(metadata, SpacedAsciiFormatter)?;
    Ok(write_atomic(path, &bytes)?)
}

fn to_json_with<T, F>(value: &T, formatter: F) -> Result<Vec<u8>, serde_json::Error>
where
    T: Serialize + ?Sized,
    F: Formatter,
{
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Single-line JSON with a space after every `,` and `:`, and `\uXXXX`
/// escapes for anything outside ASCII.
struct SpacedAsciiFormatter;

impl Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..idx])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}
