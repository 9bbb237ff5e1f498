use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::process::run_tool;
use super::raw::{RawMetadataRecord, RawValue, optional, text};
use crate::error::ExtractError;
use crate::traits::MetadataExtractor;

/// Extractor basado en `mediainfo --Output=JSON`; usa la pista `General`.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    program: PathBuf,
}

impl MediaInfo {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        MediaInfo {
            program: program.into(),
        }
    }
}

impl Default for MediaInfo {
    fn default() -> Self {
        MediaInfo::new("mediainfo")
    }
}

#[async_trait]
impl MetadataExtractor for MediaInfo {
    async fn extract(&self, path: &Path) -> Result<RawMetadataRecord, ExtractError> {
        let out = run_tool(&self.program, [OsStr::new("--Output=JSON"), path.as_os_str()]).await?;
        parse(&out)
    }
}

#[derive(Debug, Deserialize)]
struct Output {
    media: Option<Media>,
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(rename = "@ref", default)]
    reference: Option<RawValue>,
    #[serde(default)]
    track: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "Album", default)]
    album: Option<RawValue>,
    #[serde(rename = "Performer", default)]
    performer: Option<RawValue>,
    #[serde(rename = "Duration", default)]
    duration: Option<RawValue>,
    #[serde(rename = "Track", default)]
    title: Option<RawValue>,
    #[serde(rename = "Recorded_Date", default)]
    recorded_date: Option<RawValue>,
    #[serde(rename = "Track_Position", default)]
    position: Option<RawValue>,
}

pub(crate) fn parse(out: &[u8]) -> Result<RawMetadataRecord, ExtractError> {
    let output: Output = serde_json::from_slice(out)?;
    let media = output.media.ok_or(ExtractError::EmptyResponse)?;

    let general = media
        .track
        .into_iter()
        .find(|t| t.kind == "General")
        .ok_or(ExtractError::NoGeneralTrack)?;

    Ok(RawMetadataRecord {
        id: text(media.reference),
        album: text(general.album),
        artist: text(general.performer),
        duration: text(general.duration),
        title: text(general.title),
        date: optional(general.recorded_date),
        position: optional(general.position),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_general_track() {
        let out = br#"{
            "creatingLibrary": {"name": "MediaInfoLib", "version": "23.04"},
            "media": {
                "@ref": "/music/Baz/c.flac",
                "track": [
                    {"@type": "Audio", "Duration": "1.000"},
                    {
                        "@type": "General",
                        "Album": "Baz",
                        "Performer": "Qux",
                        "Duration": "183.240",
                        "Track": "Three",
                        "Recorded_Date": "1999",
                        "Track_Position": "07"
                    }
                ]
            }
        }"#;

        let raw = parse(out).unwrap();
        assert_eq!(raw.id, "/music/Baz/c.flac");
        assert_eq!(raw.album, "Baz");
        assert_eq!(raw.artist, "Qux");
        assert_eq!(raw.title, "Three");
        assert_eq!(raw.duration, "183.240");
        assert_eq!(raw.date.as_deref(), Some("1999"));
        assert_eq!(raw.position.as_deref(), Some("07"));
    }

    #[test]
    fn missing_general_track_is_an_error() {
        let out = br#"{"media": {"@ref": "x.mp3", "track": [{"@type": "Audio"}]}}"#;
        assert!(matches!(parse(out), Err(ExtractError::NoGeneralTrack)));
    }

    #[test]
    fn null_media_is_an_empty_response() {
        assert!(matches!(parse(br#"{"media": null}"#), Err(ExtractError::EmptyResponse)));
    }
}
