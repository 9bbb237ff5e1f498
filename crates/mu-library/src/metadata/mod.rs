mod covers;
mod exiftool;
mod mediainfo;
mod model;
mod process;
mod raw;
mod validate;

use std::sync::Arc;

pub use covers::{CoverError, extract_cover};
pub use exiftool::ExifTool;
pub use mediainfo::MediaInfo;
pub use model::Metadata;
pub use raw::{RawMetadataRecord, RawValue};
pub use validate::validate;

use crate::library_config::{ExtractorKind, LibraryConfig};
use crate::traits::MetadataExtractor;

/// Construye el extractor elegido en la configuración.
pub fn extractor_for(config: &LibraryConfig) -> Arc<dyn MetadataExtractor> {
    match config.extractor {
        ExtractorKind::ExifTool => Arc::new(ExifTool::new(&config.exiftool_bin)),
        ExtractorKind::MediaInfo => Arc::new(MediaInfo::new(&config.mediainfo_bin)),
    }
}
