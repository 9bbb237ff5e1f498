use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncWrite;
use tracing::{Level, debug, info, instrument};

use crate::catalog::Catalog;
use crate::coordinator::ExtractionCoordinator;
use crate::error::{LibraryError, Result};
use crate::index::LibraryIndex;
use crate::library_config::LibraryConfig;
use crate::metadata::{self, CoverError};
use crate::scanner::LocalScanner;
use crate::traits::MetadataExtractor;
use crate::transcode::{self, TranscodeError};

/// Orquesta escaneo, extracción, validación y ensamblado para una raíz, y
/// mantiene el catálogo publicado.
pub struct LibraryManager {
    config: LibraryConfig,
    root: PathBuf,
    scanner: LocalScanner,
    coordinator: ExtractionCoordinator,
    catalog: Catalog,
}

impl LibraryManager {
    /// Usa el extractor indicado en `config.extractor`.
    pub fn new(config: LibraryConfig) -> Result<Self> {
        let extractor = metadata::extractor_for(&config);
        Self::with_extractor(config, extractor)
    }

    pub fn with_extractor(
        config: LibraryConfig,
        extractor: Arc<dyn MetadataExtractor>,
    ) -> Result<Self> {
        let root = config.canonical_root()?;
        let scanner = LocalScanner::new(&root, config.follow_symlinks);
        let coordinator = ExtractionCoordinator::new(extractor, config.workers);
        let catalog = Catalog::empty(&root);

        Ok(LibraryManager {
            config,
            root,
            scanner,
            coordinator,
            catalog,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Índice publicado en este momento.
    pub fn snapshot(&self) -> Arc<LibraryIndex> {
        self.catalog.snapshot()
    }

    /// Construye un índice nuevo sin publicarlo.
    #[instrument(level = Level::INFO, skip(self), fields(root = %self.root.display()))]
    pub async fn build_index(&self) -> Result<LibraryIndex> {
        let start = Instant::now();

        let scanner = self.scanner.clone();
        let paths = scan_blocking(move || scanner.scan()).await?;
        info!(files = paths.len(), "scan complete");

        let raw = self.coordinator.run(paths).await?;
        info!(records = raw.len(), "metadata extraction complete");

        let songs = raw
            .into_iter()
            .map(|record| metadata::validate(record, &self.root))
            .collect::<Result<Vec<_>>>()?;
        debug!(songs = songs.len(), "metadata validated");

        let index = LibraryIndex::build(&self.root, songs)?;
        info!(
            songs = index.size(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "library indexed"
        );
        Ok(index)
    }

    /// Reindexa y publica. Si falla, el catálogo sigue sirviendo el índice
    /// anterior.
    pub async fn reindex(&self) -> Result<Arc<LibraryIndex>> {
        self.catalog.refresh(|| self.build_index()).await
    }

    /// Portada incrustada en la canción `id`.
    pub async fn song_cover(&self, id: &str) -> Result<Vec<u8>, CoverError> {
        let path = self.snapshot().lookup(id)?;
        metadata::extract_cover(&self.config.mediainfo_bin, &path).await
    }

    /// Portada de un álbum: la de su primera pista.
    pub async fn album_cover(&self, album: &str) -> Result<Vec<u8>, CoverError> {
        let path = self.snapshot().album_cover_path(album)?;
        metadata::extract_cover(&self.config.mediainfo_bin, &path).await
    }

    /// Transcodifica la canción `id` a MP3 y la escribe en `sink`.
    pub async fn transcode<W>(&self, id: &str, sink: &mut W) -> Result<u64, TranscodeError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let path = self.snapshot().lookup(id)?;
        transcode::transcode(&self.config.ffmpeg_bin, &path, sink).await
    }
}

/// Ejecuta el escaneo fuera del runtime. Un pánico en el escaneo se
/// informa como `ScanAborted`.
async fn scan_blocking<F>(scan: F) -> Result<Vec<PathBuf>>
where
    F: FnOnce() -> Result<Vec<PathBuf>> + Send + 'static,
{
    tokio::task::spawn_blocking(scan)
        .await
        .map_err(LibraryError::ScanAborted)?
}
