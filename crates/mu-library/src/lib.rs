pub mod catalog;
pub mod classifier;
pub mod coordinator;
pub mod error;
pub mod index;
pub mod library_config;
pub mod manager;
pub mod metadata;
pub mod scanner;
pub mod traits;
pub mod transcode;

pub use catalog::Catalog;
pub use classifier::{Classification, MediaKind, classify};
pub use coordinator::ExtractionCoordinator;
pub use error::{ConfigError, ExtractError, LibraryError, Result};
pub use index::{LibraryIndex, compare_positions};
pub use library_config::{ExtractorKind, LibraryConfig, LibraryConfigBuilder};
pub use manager::LibraryManager;
pub use metadata::{CoverError, Metadata, RawMetadataRecord};
pub use scanner::LocalScanner;
pub use traits::MetadataExtractor;
pub use transcode::TranscodeError;
