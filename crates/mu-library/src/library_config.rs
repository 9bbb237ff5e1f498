use config::{Config, Environment, File, FileFormat};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sugar_path::SugarPath;

use crate::error::ConfigError;

/// Herramienta externa usada para leer los metadatos
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    #[default]
    ExifTool,
    MediaInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directorio raíz de la biblioteca.
    pub root: PathBuf,
    pub follow_symlinks: bool,
    /// Extracciones simultáneas; `None` = número de CPUs.
    pub workers: Option<usize>,
    pub extractor: ExtractorKind,
    pub exiftool_bin: PathBuf,
    pub mediainfo_bin: PathBuf,
    pub ffmpeg_bin: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        LibraryConfig {
            root: PathBuf::from("."),
            follow_symlinks: false,
            workers: None,
            extractor: ExtractorKind::ExifTool,
            exiftool_bin: PathBuf::from("exiftool"),
            mediainfo_bin: PathBuf::from("mediainfo"),
            ffmpeg_bin: PathBuf::from("ffmpeg"),
        }
    }
}

impl LibraryConfig {
    /// Lee la configuración de un TOML. Las variables `MU_*` (p. ej.
    /// `MU_ROOT`, `MU_WORKERS`) tienen prioridad sobre el archivo.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let cfg = Config::builder()
            .add_source(File::new(&path, FileFormat::Toml))
            .add_source(Environment::with_prefix("MU").try_parsing(true))
            .build()
            .map_err(ConfigError::Parse)?;
        let lc = cfg.try_deserialize::<LibraryConfig>().map_err(ConfigError::Parse)?;
        Ok(lc)
    }

    /// Igual que [`from_file`](Self::from_file) pero sin archivo: sólo
    /// valores por defecto y variables de entorno.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .add_source(Environment::with_prefix("MU").try_parsing(true))
            .build()
            .map_err(ConfigError::Parse)?;
        let lc = cfg.try_deserialize::<LibraryConfig>().map_err(ConfigError::Parse)?;
        Ok(lc)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Ruta absoluta y canónica de `root`. Falla si no es un directorio.
    pub fn canonical_root(&self) -> Result<PathBuf, ConfigError> {
        let absolute = self.root.absolutize();
        match dunce::canonicalize(&absolute) {
            Ok(p) if p.is_dir() => Ok(p),
            _ => Err(ConfigError::InvalidRoot(absolute)),
        }
    }
}
