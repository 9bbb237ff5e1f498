use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{Level, debug, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use crate::classifier::{self, Classification};
use crate::error::{LibraryError, Result};

/// Recorre el árbol de la biblioteca y devuelve los archivos de audio soportados.
#[derive(Debug, Clone)]
pub struct LocalScanner {
    root: PathBuf,
    follow_symlinks: bool,
}

impl LocalScanner {
    pub fn new(root: impl Into<PathBuf>, follow_symlinks: bool) -> Self {
        LocalScanner {
            root: root.into(),
            follow_symlinks,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rutas absolutas de cada archivo cuyo contenido es de un tipo soportado,
    /// en orden de recorrido.
    ///
    /// Cualquier error al leer un directorio o abrir un archivo aborta el
    /// escaneo completo.
    #[instrument(level = Level::INFO, skip(self), fields(root = %self.root.display()))]
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();

        let walker = WalkDir::new(&self.root).follow_links(self.follow_symlinks);

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                LibraryError::Scan { path, source }
            })?;

            if !is_regular_file(&entry)? {
                continue;
            }

            let path = entry.into_path();
            let classification = classify_file(&path)?;
            match classification {
                Classification::Supported(kind) => {
                    debug!(path = %path.display(), %kind, "accepted");
                    found.push(path);
                }
                Classification::Unsupported { mime } if classification.is_audio_like() => {
                    warn!(
                        path = %path.display(),
                        mime = ?mime,
                        "unsupported audio format, skipping"
                    );
                }
                Classification::Unsupported { .. } => {}
            }
        }

        debug!(files = found.len(), "scan complete");
        Ok(found)
    }
}

/// Archivos regulares, incluidos los enlaces simbólicos a archivos. Sin
/// `follow_symlinks` no se entra en directorios enlazados, pero un enlace
/// a un archivo sí se indexa.
fn is_regular_file(entry: &DirEntry) -> Result<bool> {
    if entry.file_type().is_file() {
        return Ok(true);
    }
    if !entry.path_is_symlink() {
        return Ok(false);
    }

    let target = fs::metadata(entry.path()).map_err(|source| LibraryError::Scan {
        path: entry.path().to_path_buf(),
        source,
    })?;
    Ok(target.is_file())
}

fn classify_file(path: &Path) -> Result<Classification> {
    let scan_err = |source| LibraryError::Scan {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(scan_err)?;
    classifier::classify(&mut file).map_err(scan_err)
}
