use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::{Level, debug, instrument};

use crate::error::LibraryError;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("could not run `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("transcoder exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },

    #[error("I/O error while streaming: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// Convierte `path` a MP3 con ffmpeg (sin vídeo ni metadatos) y vuelca el
/// resultado en `sink` a medida que se produce.
///
/// Devuelve los bytes escritos. Si el proceso falla, aunque sea a mitad de
/// la conversión, el error lleva su stderr; lo ya escrito en `sink` queda
/// escrito.
#[instrument(level = Level::DEBUG, skip_all, fields(path = %path.display()))]
pub async fn transcode<W>(ffmpeg: &Path, path: &Path, sink: &mut W) -> Result<u64, TranscodeError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let args = [
        OsStr::new("-i"),
        path.as_os_str(),
        OsStr::new("-vn"),
        OsStr::new("-map_metadata"),
        OsStr::new("-1"),
        OsStr::new("-f"),
        OsStr::new("mp3"),
        OsStr::new("-"),
    ];

    let mut child = Command::new(ffmpeg)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| TranscodeError::Spawn {
            program: ffmpeg.display().to_string(),
            source,
        })?;

    let stdout = child.stdout.take().ok_or_else(|| io::Error::other("stdout not captured"))?;
    let stderr = child.stderr.take().ok_or_else(|| io::Error::other("stderr not captured"))?;

    // stdout se cierra al terminar la copia para que el proceso no se quede
    // bloqueado escribiendo si el destino falla
    let copy = async {
        let mut stdout = stdout;
        tokio::io::copy(&mut stdout, sink).await
    };
    let collect = async {
        let mut stderr = stderr;
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await.map(|_| buf)
    };
    let (copied, errors) = tokio::join!(copy, collect);

    let status = child.wait().await?;
    let errors = errors?;

    if !status.success() {
        return Err(TranscodeError::Exit {
            status,
            stderr: String::from_utf8_lossy(&errors).trim().to_owned(),
        });
    }

    let copied = copied?;
    sink.flush().await?;
    debug!(bytes = copied, "transcode finished");
    Ok(copied)
}
