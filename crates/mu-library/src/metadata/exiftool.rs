use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::process::run_tool;
use super::raw::{RawMetadataRecord, RawValue, optional, text};
use crate::error::ExtractError;
use crate::traits::MetadataExtractor;

/// Etiquetas que se piden a exiftool.
const TAGS: &[&str] = &[
    "-Album",
    "-Artist",
    "-Duration",
    "-Product",
    "-Title",
    "-TrackNumber",
    "-Track",
    "-Year",
];

/// Extractor basado en `exiftool -json`.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
}

impl ExifTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ExifTool {
            program: program.into(),
        }
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        ExifTool::new("exiftool")
    }
}

#[async_trait]
impl MetadataExtractor for ExifTool {
    async fn extract(&self, path: &Path) -> Result<RawMetadataRecord, ExtractError> {
        let args = ["-json"]
            .iter()
            .chain(TAGS)
            .map(|s| OsStr::new(*s))
            .chain(std::iter::once(path.as_os_str()));

        let out = run_tool(&self.program, args).await?;
        parse(&out)
    }
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(rename = "SourceFile", default)]
    source_file: Option<RawValue>,
    #[serde(rename = "Album", default)]
    album: Option<RawValue>,
    #[serde(rename = "Artist", default)]
    artist: Option<RawValue>,
    #[serde(rename = "Duration", default)]
    duration: Option<RawValue>,
    #[serde(rename = "Title", default)]
    title: Option<RawValue>,
    #[serde(rename = "Year", default)]
    year: Option<RawValue>,
    #[serde(rename = "Track", default)]
    track: Option<RawValue>,
    #[serde(rename = "Product", default)]
    product: Option<RawValue>,
    #[serde(rename = "TrackNumber", default)]
    track_number: Option<RawValue>,
}

impl From<Entry> for RawMetadataRecord {
    fn from(e: Entry) -> Self {
        RawMetadataRecord {
            id: text(e.source_file),
            album: text(e.album),
            artist: text(e.artist),
            duration: text(e.duration),
            title: text(e.title),
            date: optional(e.year),
            position: optional(e.track),
            product: optional(e.product),
            track_number: optional(e.track_number),
            ..Default::default()
        }
    }
}

/// exiftool responde siempre con un array, aunque se le pase un solo archivo.
pub(crate) fn parse(out: &[u8]) -> Result<RawMetadataRecord, ExtractError> {
    let entries: Vec<Entry> = serde_json::from_slice(out)?;
    entries
        .into_iter()
        .next()
        .map(RawMetadataRecord::from)
        .ok_or(ExtractError::EmptyResponse)
}
