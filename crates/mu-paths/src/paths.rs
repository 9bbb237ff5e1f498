use std::{env, path::PathBuf};

use directories::ProjectDirs;

use crate::{errors::Error, fs_utils};

/// Nombre de la ENV var para override de ruta base (modo “portable”)
pub const ENV_BASE_DIR: &str = "MU_BASE_DIR";

/// Rutas de configuración del servidor
#[derive(Debug, Clone)]
pub struct MuPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
}

impl MuPaths {
    pub fn new() -> Result<Self, Error> {
        let config_dir = if let Ok(base) = env::var(ENV_BASE_DIR) {
            PathBuf::from(base).join("config")
        } else {
            let proj = ProjectDirs::from("org", "mu", "mu-server").ok_or(Error::NoHome)?;
            proj.config_dir().to_path_buf()
        };

        let paths = MuPaths {
            settings_file: config_dir.join("library.toml"),
            config_dir,
        };

        paths.ensure_structure()?;
        Ok(paths)
    }

    /// Crea la carpeta de configuración si no existe.
    pub fn ensure_structure(&self) -> Result<(), Error> {
        fs_utils::ensure_dir(&self.config_dir)?;
        Ok(())
    }
}
