//! Compile-time limits
//!
//! The `compile_time` tree is generated by `build.rs` from
//! `config/<profile>.toml`. Every limit guards a resource that user input
//! could otherwise grow without bound:
//!
//! - `file_processing::MAX_FILE_SIZE` / `MAX_LINE_COUNT`: source accepted for reading
//! - `lexical::MAX_TOKEN_COUNT`: tokens produced from one source
//! - `lexical::MAX_LEXEME_LENGTH` / `MAX_STRING_SIZE`: single-token size
//! - `syntax::MAX_PARSE_DEPTH`: recursive-descent nesting ceiling
//! - `semantic::MAX_SEMANTIC_ERRORS`: diagnostics collected per run
//! - `semantic::MAX_SCOPE_DEPTH`: nested scope frames
//! - `logging::*`: event buffers and message sizes

include!(concat!(env!("OUT_DIR"), "/constants.rs"));
