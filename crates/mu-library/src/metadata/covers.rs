use std::ffi::OsStr;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tracing::debug;

use super::process::run_tool;
use crate::error::{ExtractError, LibraryError};

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("no cover present")]
    NoCover,

    #[error("cover extraction failed")]
    Tool(#[from] ExtractError),

    #[error("cover data is not valid base64")]
    Decode(#[from] base64::DecodeError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// Extrae la portada embebida de `path` con `mediainfo --Cover_Data=base64`.
///
/// Devuelve los bytes de la imagen tal cual están en el archivo.
pub async fn extract_cover(mediainfo: &Path, path: &Path) -> Result<Vec<u8>, CoverError> {
    let out = run_tool(
        mediainfo,
        [OsStr::new("--Full"), OsStr::new("--Cover_Data=base64"), path.as_os_str()],
    )
    .await?;

    let cover = parse_cover(&out)?;
    debug!(path = %path.display(), bytes = cover.len(), "cover extracted");
    Ok(cover)
}

fn parse_cover(out: &[u8]) -> Result<Vec<u8>, CoverError> {
    let text = String::from_utf8_lossy(out);

    let line = text
        .lines()
        .find(|l| l.starts_with("Cover_Data"))
        .ok_or(CoverError::NoCover)?;

    let (_, value) = line.split_once(':').ok_or(CoverError::NoCover)?;
    // varias portadas vienen separadas por " / "; nos quedamos con la primera
    let first = value.split(" / ").next().unwrap_or_default().trim();
    if first.is_empty() {
        return Err(CoverError::NoCover);
    }

    Ok(STANDARD.decode(first)?)
}
