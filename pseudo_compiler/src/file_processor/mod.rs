//! Source file intake: reading, size and encoding checks, cleanup filter

pub mod cleanup;
mod processor;

use crate::config::runtime::FileProcessorPreferences;
use std::path::Path;

pub use cleanup::{clean_source, CleanupFilter};
pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Process a file with preferences taken from the environment
pub fn process_file(path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(path)
}

pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}
