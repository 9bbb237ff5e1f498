use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, instrument, warn};

use crate::error::{LibraryError, Result};
use crate::metadata::RawMetadataRecord;
use crate::traits::MetadataExtractor;

/// Ejecuta el extractor sobre todos los archivos con un máximo de llamadas
/// simultáneas.
///
/// Política fail-fast: el primer fallo cancela el trabajo que aún no empezó,
/// espera a que terminen las llamadas en curso (sin matarlas) y devuelve ese
/// fallo. Nunca se devuelve un resultado parcial.
#[derive(Clone)]
pub struct ExtractionCoordinator {
    extractor: Arc<dyn MetadataExtractor>,
    workers: usize,
}

impl ExtractionCoordinator {
    /// `workers = None` usa tantos como CPUs haya. El valor queda entre 1 y
    /// `Semaphore::MAX_PERMITS`.
    pub fn new(extractor: Arc<dyn MetadataExtractor>, workers: Option<usize>) -> Self {
        let workers = workers
            .unwrap_or_else(num_cpus::get)
            .clamp(1, Semaphore::MAX_PERMITS);
        ExtractionCoordinator { extractor, workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// El orden del resultado no está definido; su contenido sí.
    #[instrument(
        level = Level::INFO,
        skip_all,
        fields(files = paths.len(), workers = self.workers)
    )]
    pub async fn run(&self, paths: Vec<PathBuf>) -> Result<Vec<RawMetadataRecord>> {
        let permits = Arc::new(Semaphore::new(self.workers));
        let cancel = CancellationToken::new();
        let records = Arc::new(AsyncMutex::new(Vec::with_capacity(paths.len())));

        let mut tasks = JoinSet::new();
        for path in paths {
            tasks.spawn(extract_one(
                self.extractor.clone(),
                path,
                permits.clone(),
                cancel.clone(),
                records.clone(),
            ));
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(LibraryError::from).and_then(|r| r);
            if let Err(e) = outcome {
                if first_error.is_none() {
                    warn!(error = %e, "extraction failed, cancelling pending work");
                    cancel.cancel();
                    first_error = Some(e);
                } else {
                    debug!(error = %e, "further extraction failure after cancellation");
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let records = std::mem::take(&mut *records.lock().await);
        Ok(records)
    }
}

async fn extract_one(
    extractor: Arc<dyn MetadataExtractor>,
    path: PathBuf,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
    records: Arc<AsyncMutex<Vec<RawMetadataRecord>>>,
) -> Result<()> {
    // la espera por un hueco se abandona en cuanto otro worker falla
    let _permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(()),
        permit = permits.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return Ok(()),
        },
    };

    if cancel.is_cancelled() {
        return Ok(());
    }

    debug!(path = %path.display(), "extracting");
    let mut record = match extractor.extract(&path).await {
        Ok(record) => record,
        Err(cause) => return Err(LibraryError::ExtractionFailed { path, cause }),
    };
    record.source = path;

    if cancel.is_cancelled() {
        return Ok(());
    }

    records.lock().await.push(record);
    Ok(())
}
