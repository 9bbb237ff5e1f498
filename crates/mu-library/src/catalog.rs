use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::error::Result;
use crate::index::LibraryIndex;

/// Índice publicado para las consultas.
///
/// Los lectores obtienen un `Arc<LibraryIndex>` y lo conservan el tiempo que
/// quieran; una reindexación publica un índice nuevo sin tocar el anterior.
pub struct Catalog {
    current: RwLock<Arc<LibraryIndex>>,
    rebuild: AsyncMutex<()>,
}

impl Catalog {
    pub fn new(index: LibraryIndex) -> Self {
        Catalog {
            current: RwLock::new(Arc::new(index)),
            rebuild: AsyncMutex::new(()),
        }
    }

    /// Catálogo vacío para `root`, útil antes del primer indexado.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Catalog::new(LibraryIndex::empty(root))
    }

    pub fn snapshot(&self) -> Arc<LibraryIndex> {
        self.current.read().clone()
    }

    /// Sustituye el índice publicado y devuelve el anterior.
    pub fn publish(&self, index: LibraryIndex) -> Arc<LibraryIndex> {
        self.swap(Arc::new(index))
    }

    fn swap(&self, next: Arc<LibraryIndex>) -> Arc<LibraryIndex> {
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Reconstruye con `build` y publica el resultado.
    ///
    /// Sólo una reconstrucción corre a la vez. Si `build` falla el índice
    /// publicado no cambia y se devuelve el error.
    pub async fn refresh<F, Fut>(&self, build: F) -> Result<Arc<LibraryIndex>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<LibraryIndex>>,
    {
        let _guard = self.rebuild.lock().await;

        match build().await {
            Ok(index) => {
                let built = Arc::new(index);
                self.swap(built.clone());
                info!(songs = built.size(), "catalog updated");
                Ok(built)
            }
            Err(e) => {
                warn!(error = %e, "rebuild failed, keeping the previous catalog");
                Err(e)
            }
        }
    }
}
