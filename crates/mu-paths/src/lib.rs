//! Crate `mu_paths`: rutas de configuración de mu

mod errors;
mod fs_utils;
mod paths;

pub use errors::Error;
pub use paths::{ENV_BASE_DIR, MuPaths};
