// build.rs - compile-time limits for the pseudo compiler, read from config/<profile>.toml
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
struct LimitsFile {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    semantic: SemanticLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    max_line_count: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_token_count: usize,
    max_lexeme_length: usize,
    max_string_size: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
}

#[derive(serde::Deserialize)]
struct SemanticLimits {
    max_semantic_errors: usize,
    max_scope_depth: usize,
    max_error_message_length: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
    security_min_log_level: u8,
}

/// One generated `pub const NAME: TYPE = VALUE;`
struct Constant {
    name: &'static str,
    ty: &'static str,
    value: String,
}

fn constant(name: &'static str, ty: &'static str, value: impl ToString) -> Constant {
    Constant {
        name,
        ty,
        value: value.to_string(),
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PSEUDO_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=PSEUDO_CONFIG_DIR");

    let profile = env::var("PSEUDO_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("PSEUDO_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let limits_path = locate_limits_file(&config_dir, &profile);
    println!("cargo:rerun-if-changed={}", limits_path.display());

    let text = fs::read_to_string(&limits_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", limits_path.display(), e));
    let limits: LimitsFile = toml::from_str(&text)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", limits_path.display(), e));

    if let Err(problem) = check_limits(&limits, &profile) {
        panic!("{}: {}", limits_path.display(), problem);
    }

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let generated = render(&limits, &profile);
    fs::write(Path::new(&out_dir).join("constants.rs"), generated)
        .expect("Failed to write generated constants");
}

/// The limits directory lives at the workspace root, one level above this crate
fn locate_limits_file(config_dir: &str, profile: &str) -> PathBuf {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("crate directory has a parent");

    let path = workspace_root.join(config_dir).join(format!("{}.toml", profile));
    if !path.exists() {
        panic!(
            "Limits file not found: {} (profile '{}')",
            path.display(),
            profile
        );
    }
    path
}

fn check_limits(limits: &LimitsFile, profile: &str) -> Result<(), String> {
    const HARD_MAX_FILE_SIZE: u64 = 100_000_000;
    // Recursive descent uses the native stack
    const HARD_MAX_PARSE_DEPTH: usize = 10_000;

    if limits.file_processing.max_file_size > HARD_MAX_FILE_SIZE {
        return Err("max_file_size is above the hard maximum".into());
    }
    if limits.syntax.max_parse_depth > HARD_MAX_PARSE_DEPTH {
        return Err("max_parse_depth is above the hard maximum".into());
    }
    if limits.syntax.max_parse_depth == 0 || limits.semantic.max_scope_depth == 0 {
        return Err("nesting limits must be non-zero".into());
    }
    if limits.lexical.max_string_size > limits.file_processing.max_file_size as usize {
        return Err("max_string_size cannot exceed max_file_size".into());
    }
    if limits.semantic.max_semantic_errors == 0 {
        return Err("max_semantic_errors must be non-zero".into());
    }
    if limits.logging.security_min_log_level > 2 {
        return Err("security_min_log_level above 2".into());
    }
    if limits.logging.max_log_events_per_file > limits.logging.log_buffer_size {
        return Err("max_log_events_per_file exceeds log_buffer_size".into());
    }
    if profile == "production" && limits.file_processing.max_file_size > 10_000_000 {
        return Err("max_file_size too high for a production build".into());
    }
    Ok(())
}

fn render(limits: &LimitsFile, profile: &str) -> String {
    let sections = [
        (
            "file_processing",
            vec![
                constant("MAX_FILE_SIZE", "u64", limits.file_processing.max_file_size),
                constant("MAX_LINE_COUNT", "usize", limits.file_processing.max_line_count),
            ],
        ),
        (
            "lexical",
            vec![
                constant("MAX_TOKEN_COUNT", "usize", limits.lexical.max_token_count),
                constant("MAX_LEXEME_LENGTH", "usize", limits.lexical.max_lexeme_length),
                constant("MAX_STRING_SIZE", "usize", limits.lexical.max_string_size),
            ],
        ),
        (
            "syntax",
            vec![constant("MAX_PARSE_DEPTH", "usize", limits.syntax.max_parse_depth)],
        ),
        (
            "semantic",
            vec![
                constant("MAX_SEMANTIC_ERRORS", "usize", limits.semantic.max_semantic_errors),
                constant("MAX_SCOPE_DEPTH", "usize", limits.semantic.max_scope_depth),
                constant(
                    "MAX_ERROR_MESSAGE_LENGTH",
                    "usize",
                    limits.semantic.max_error_message_length,
                ),
            ],
        ),
        (
            "logging",
            vec![
                constant("LOG_BUFFER_SIZE", "usize", limits.logging.log_buffer_size),
                constant("MAX_LOG_MESSAGE_LENGTH", "usize", limits.logging.max_log_message_length),
                constant("MAX_LOG_EVENTS_PER_FILE", "usize", limits.logging.max_log_events_per_file),
                constant("SECURITY_MIN_LOG_LEVEL", "u8", limits.logging.security_min_log_level),
            ],
        ),
    ];

    let mut out = String::new();
    let _ = writeln!(out, "// Generated by build.rs from profile '{}'. Do not edit.", profile);
    out.push_str("pub mod compile_time {\n");
    for (module, constants) in &sections {
        let _ = writeln!(out, "    pub mod {} {{", module);
        for c in constants {
            let _ = writeln!(out, "        pub const {}: {} = {};", c.name, c.ty, c.value);
        }
        out.push_str("    }\n");
    }
    out.push_str("}\n");
    out
}
