use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;
use tokio::task::JoinError;

pub type Result<T, E = LibraryError> = std::result::Result<T, E>;

/// Errores del pipeline de indexado y de las consultas sobre la biblioteca.
///
/// Todo error producido durante la construcción aborta el índice completo;
/// sólo `NotFound` es un fallo de consulta ordinario.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("failed to scan {}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("metadata extraction failed for {}", .path.display())]
    ExtractionFailed {
        path: PathBuf,
        #[source]
        cause: ExtractError,
    },

    #[error("missing fields {missing:?} in metadata for {path}")]
    InvalidMetadata {
        path: String,
        missing: Vec<&'static str>,
    },

    #[error("{path} is not inside the library root")]
    PathError { path: String },

    #[error("duplicate song id: {id}")]
    DuplicateId { id: String },

    #[error("no such entry in the library: {id}")]
    NotFound { id: String },

    #[error("extraction worker stopped unexpectedly")]
    Worker(#[from] JoinError),

    #[error("library scan stopped unexpectedly")]
    ScanAborted(#[source] JoinError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Fallo de una única llamada a la herramienta externa de metadatos.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("could not run `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("extractor exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },

    #[error("malformed extractor output")]
    Parse(#[from] serde_json::Error),

    #[error("extractor returned no records")]
    EmptyResponse,

    #[error("no 'General' track in extractor output")]
    NoGeneralTrack,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("library root {} is not a directory", .0.display())]
    InvalidRoot(PathBuf),
}
