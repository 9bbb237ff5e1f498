use std::path::Path;

use crate::error::ExtractError;
use crate::metadata::RawMetadataRecord;

/// Operación externa de extracción de metadatos: una llamada por archivo.
///
/// Cada llamada es independiente y puede fallar por su cuenta; quien la
/// invoca decide si el fallo aborta el lote.
#[async_trait::async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<RawMetadataRecord, ExtractError>;
}
