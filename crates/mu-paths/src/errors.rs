use std::io;
use std::path::PathBuf;

/// Errores al resolver las rutas de configuración
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Sin `$HOME` ni `MU_BASE_DIR` no hay dónde guardar la configuración
    #[error("no config directory: no home directory and MU_BASE_DIR is not set")]
    NoHome,

    #[error("could not create {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
