// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to strip comments and elision markers before lexing
    pub apply_cleanup_filter: bool,

    /// Whether to require the expected source extension
    pub require_source_extension: bool,

    /// Expected source extension (without the dot)
    pub source_extension: String,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            apply_cleanup_filter: env::var("PSEUDO_APPLY_CLEANUP_FILTER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            require_source_extension: env::var("PSEUDO_REQUIRE_SOURCE_EXTENSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            source_extension: env::var("PSEUDO_SOURCE_EXTENSION")
                .unwrap_or_else(|_| "txt".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to count tokens per kind
    pub track_kind_counts: bool,

    /// Whether to log every emitted token at debug level
    pub log_each_token: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            track_kind_counts: env::var("PSEUDO_LEXICAL_TRACK_KIND_COUNTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_each_token: env::var("PSEUDO_LEXICAL_LOG_EACH_TOKEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticPreferences {
    /// Whether to record the lines on which each symbol is used
    pub record_usage_lines: bool,

    /// Whether to log each diagnostic as it is collected
    pub log_each_diagnostic: bool,
}

impl Default for SemanticPreferences {
    fn default() -> Self {
        Self {
            record_usage_lines: env::var("PSEUDO_SEMANTIC_RECORD_USAGE_LINES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_each_diagnostic: env::var("PSEUDO_SEMANTIC_LOG_EACH_DIAGNOSTIC")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to print the cargo-style summary at the end of a run
    pub enable_cargo_style_output: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("PSEUDO_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("PSEUDO_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("PSEUDO_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            enable_cargo_style_output: env::var("PSEUDO_LOGGING_CARGO_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Errors raised while loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub semantic: SemanticPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Load preferences from a TOML file; missing sections and keys fall
    /// back to the environment-derived defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File processor
    pub const APPLY_CLEANUP_FILTER: &str = "PSEUDO_APPLY_CLEANUP_FILTER";
    pub const REQUIRE_SOURCE_EXTENSION: &str = "PSEUDO_REQUIRE_SOURCE_EXTENSION";
    pub const SOURCE_EXTENSION: &str = "PSEUDO_SOURCE_EXTENSION";

    // Lexical
    pub const LEXICAL_TRACK_KIND_COUNTS: &str = "PSEUDO_LEXICAL_TRACK_KIND_COUNTS";
    pub const LEXICAL_LOG_EACH_TOKEN: &str = "PSEUDO_LEXICAL_LOG_EACH_TOKEN";

    // Semantic
    pub const SEMANTIC_RECORD_USAGE_LINES: &str = "PSEUDO_SEMANTIC_RECORD_USAGE_LINES";
    pub const SEMANTIC_LOG_EACH_DIAGNOSTIC: &str = "PSEUDO_SEMANTIC_LOG_EACH_DIAGNOSTIC";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "PSEUDO_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "PSEUDO_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "PSEUDO_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "PSEUDO_LOGGING_CARGO_STYLE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [file_processor]
            apply_cleanup_filter = false

            [logging]
            min_log_level = "debug"
            "#,
        )
        .unwrap();

        assert!(!config.file_processor.apply_cleanup_filter);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
        assert!(!config.file_processor.source_extension.is_empty());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(RuntimeConfig::from_toml_str("[lexical]\ntrack_kind_counts = \"maybe\"").is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = RuntimeConfig::from_toml_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
