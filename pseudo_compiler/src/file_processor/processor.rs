//! Reading and checking source files before lexing

use super::cleanup::CleanupFilter;
use crate::config::constants::compile_time::file_processing::{MAX_FILE_SIZE, MAX_LINE_COUNT};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .{expected}, found {extension:?}")]
    InvalidExtension {
        extension: Option<String>,
        expected: String,
    },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },

    #[error("Cleanup filter unavailable: {message}")]
    CleanupUnavailable { message: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => {
                codes::file_processing::INVALID_EXTENSION
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile => codes::file_processing::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
            FileProcessorError::CleanupUnavailable { .. } => {
                codes::file_processing::CLEANUP_UNAVAILABLE
            }
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    fn from_io(error: std::io::Error, path: &Path) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => FileProcessorError::FileNotFound {
                path: path.display().to_string(),
            },
            std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                path: path.display().to_string(),
            },
            _ => FileProcessorError::IoError {
                message: format!("'{}': {}", path.display(), error),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub extension: Option<String>,
    /// Lines of the raw file, before cleanup
    pub line_count: usize,
    pub modified: Option<SystemTime>,
}

impl FileMetadata {
    /// File name without extension, used to name report files
    pub fn base_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string())
    }

    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit = 0;

        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }

        if unit == 0 {
            format!("{} {}", self.size, UNITS[0])
        } else {
            format!("{:.2} {}", size, UNITS[unit])
        }
    }
}

/// Source text ready for the lexer
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    /// Cleaned text if the filter ran, raw text otherwise
    pub source: String,
    pub metadata: FileMetadata,
    pub cleanup_applied: bool,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    /// Wrap text that did not come from disk
    pub fn from_text(name: &str, source: String) -> Self {
        let metadata = FileMetadata {
            path: PathBuf::from(name),
            size: source.len() as u64,
            extension: Path::new(name)
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned()),
            line_count: source.lines().count(),
            modified: None,
        };
        Self {
            source,
            metadata,
            cleanup_applied: false,
            processing_duration: Duration::ZERO,
        }
    }

    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }
}

pub struct FileProcessor {
    pub apply_cleanup_filter: bool,
    pub require_source_extension: bool,
    pub source_extension: String,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self::from_preferences(&FileProcessorPreferences::default())
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            apply_cleanup_filter: prefs.apply_cleanup_filter,
            require_source_extension: prefs.require_source_extension,
            source_extension: prefs.source_extension.clone(),
        }
    }

    pub fn with_cleanup(mut self, enabled: bool) -> Self {
        self.apply_cleanup_filter = enabled;
        self
    }

    pub fn with_extension_required(mut self, extension: &str) -> Self {
        self.require_source_extension = true;
        self.source_extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    /// Read, check and optionally clean a source file
    pub fn process_file(&self, path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = Instant::now();
        let display = path.display().to_string();

        log_debug!("Starting file processing", "file" => display);

        let result = self.read_checked(path).and_then(|(metadata, raw)| {
            let source = if self.apply_cleanup_filter {
                Self::clean_text(&raw)?
            } else {
                raw
            };
            Ok(FileProcessingResult {
                source,
                metadata,
                cleanup_applied: self.apply_cleanup_filter,
                processing_duration: start_time.elapsed(),
            })
        });

        match &result {
            Ok(processed) => {
                log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File processed",
                    "file" => display,
                    "size" => processed.metadata.human_readable_size(),
                    "lines" => processed.metadata.line_count,
                    "cleaned" => processed.cleanup_applied,
                    "duration_ms" => format!("{:.2}", processed.processing_duration.as_secs_f64() * 1000.0)
                );
            }
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(), "file" => display);
            }
        }

        result
    }

    fn read_checked(&self, path: &Path) -> Result<(FileMetadata, String), FileProcessorError> {
        let fs_meta = fs::metadata(path).map_err(|e| FileProcessorError::from_io(e, path))?;
        if !fs_meta.is_file() {
            return Err(FileProcessorError::IoError {
                message: format!("'{}' is not a regular file", path.display()),
            });
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned());

        if self.require_source_extension
            && extension.as_deref() != Some(self.source_extension.as_str())
        {
            return Err(FileProcessorError::InvalidExtension {
                extension,
                expected: self.source_extension.clone(),
            });
        }

        let size = fs_meta.len();
        if size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size,
                max_size: MAX_FILE_SIZE,
            });
        }
        if size == 0 {
            return Err(FileProcessorError::EmptyFile);
        }

        let bytes = fs::read(path).map_err(|e| FileProcessorError::from_io(e, path))?;
        let raw = String::from_utf8(bytes).map_err(|_| FileProcessorError::InvalidEncoding {
            path: path.display().to_string(),
        })?;

        let line_count = raw.lines().count();
        if line_count > MAX_LINE_COUNT {
            return Err(FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            });
        }

        let metadata = FileMetadata {
            path: path.to_path_buf(),
            size,
            extension,
            line_count,
            modified: fs_meta.modified().ok(),
        };
        Ok((metadata, raw))
    }

    /// Run the shared cleanup filter; in-memory sources go through here too
    pub fn clean_text(raw: &str) -> Result<String, FileProcessorError> {
        let filter = CleanupFilter::shared().map_err(FileProcessorError::from)?;
        let cleaned = filter.apply(raw);

        log_success!(codes::success::CLEANUP_APPLIED, "Cleanup filter applied",
            "bytes_before" => raw.len(),
            "bytes_after" => cleaned.len()
        );
        Ok(cleaned)
    }
}

impl From<regex::Error> for FileProcessorError {
    fn from(error: regex::Error) -> Self {
        FileProcessorError::CleanupUnavailable {
            message: error.to_string(),
        }
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("prueba.txt");
        fs::write(&file_path, "Para p {\n  El x Puntual; /* nota */\n} Fin\n").unwrap();

        let result = FileProcessor::new().with_cleanup(true).process_file(&file_path).unwrap();

        assert_eq!(result.metadata.line_count, 3);
        assert_eq!(result.metadata.base_name(), "prueba");
        assert_eq!(result.metadata.extension.as_deref(), Some("txt"));
        assert!(result.cleanup_applied);
        assert_eq!(result.source, "Para p {\n El x Puntual; \n} Fin");
    }

    #[test]
    fn test_cleanup_can_be_disabled() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("raw.txt");
        let content = "Para p { /* nota */ } Fin\n";
        fs::write(&file_path, content).unwrap();

        let result = FileProcessor::new().with_cleanup(false).process_file(&file_path).unwrap();
        assert!(!result.cleanup_applied);
        assert_eq!(result.source, content);
    }

    #[test]
    fn test_file_not_found() {
        let result = FileProcessor::new().process_file(Path::new("no_existe.txt"));
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("programa.src");
        fs::write(&file_path, "Para p { } Fin").unwrap();

        let result = FileProcessor::new()
            .with_extension_required("txt")
            .process_file(&file_path);
        assert_matches!(
            result,
            Err(FileProcessorError::InvalidExtension { extension: Some(ref ext), .. }) if ext == "src"
        );
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("vacio.txt");
        fs::write(&file_path, "").unwrap();

        let result = FileProcessor::new().process_file(&file_path);
        assert_matches!(result, Err(FileProcessorError::EmptyFile));
    }

    #[test]
    fn test_invalid_encoding() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("binario.txt");
        fs::write(&file_path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let result = FileProcessor::new().process_file(&file_path);
        assert_matches!(result, Err(FileProcessorError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_broken_cleanup_pattern_is_its_own_category() {
        let pattern_error = regex::Regex::new("(").unwrap_err();
        let error = FileProcessorError::from(pattern_error);

        assert_matches!(error, FileProcessorError::CleanupUnavailable { .. });
        assert_eq!(error.error_code(), codes::file_processing::CLEANUP_UNAVAILABLE);
        assert_eq!(error.category(), "FileProcessing");
        assert!(error.requires_halt());
    }

    #[test]
    fn test_clean_text_matches_file_cleanup() {
        let raw = "Para p {  /* nota */\nEl x Puntual;\n\n\n} Fin";
        assert_eq!(
            FileProcessor::clean_text(raw).unwrap(),
            crate::file_processor::clean_source(raw).unwrap()
        );
    }

    #[test]
    fn test_error_metadata() {
        let error = FileProcessorError::FileNotFound {
            path: "x.txt".to_string(),
        };
        assert_eq!(error.error_code().as_str(), "E005");
        assert_eq!(error.category(), "FileProcessing");
        assert!(error.requires_halt());
    }

    #[test]
    fn test_from_text() {
        let result = FileProcessingResult::from_text("demo.txt", "Para p { } Fin".to_string());
        assert_eq!(result.metadata.base_name(), "demo");
        assert_eq!(result.metadata.line_count, 1);
        assert!(!result.is_effectively_empty());
    }

    #[test]
    fn test_human_readable_size() {
        let mut result = FileProcessingResult::from_text("a.txt", "abc".to_string());
        assert_eq!(result.metadata.human_readable_size(), "3 B");
        result.metadata.size = 2048;
        assert_eq!(result.metadata.human_readable_size(), "2.00 KB");
    }
}
