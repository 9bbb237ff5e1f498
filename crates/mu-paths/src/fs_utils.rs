use std::{fs, path::Path};

use tracing::{Level, instrument};

use crate::errors::Error;

/// Crea `path` y sus padres si no existen.
#[instrument(level = Level::TRACE, err)]
pub fn ensure_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
