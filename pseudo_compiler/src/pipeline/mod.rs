//! Compilation pipeline: source intake, lexer, parser, semantic analysis
//!
//! Each stage runs on the whole unit before the next one starts. File,
//! lexical and syntax failures stop the run; semantic diagnostics are kept
//! in the [`PipelineResult`] next to the symbol table.

mod error;
pub mod output;
mod result;

pub use error::PipelineError;
pub use output::{
    format_symbol_report, token_dump_file_name, write_token_dump, CompilationSummary,
    DiagnosticRecord, PipelineOutput,
};
pub use result::PipelineResult;

use crate::config::runtime::RuntimeConfig;
use crate::file_processor::{FileProcessingResult, FileProcessor};
use crate::lexical::LexicalAnalyzer;
use crate::logging;
use crate::semantic_analysis;
use crate::syntax::Parser;
use std::path::Path;
use std::time::Instant;

/// Compile one file with preferences from the environment
pub fn process_file(path: &Path) -> Result<PipelineResult, PipelineError> {
    process_file_with_config(path, &RuntimeConfig::default())
}

pub fn process_file_with_config(
    path: &Path,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(path.to_path_buf(), 0, || {
        crate::log_info!("Starting compilation pipeline", "file" => path.display());

        let file_result = FileProcessor::from_preferences(&config.file_processor).process_file(path)?;
        run_stages(file_result, config, start_time)
    })
}

/// Compile text that did not come from disk; `name` labels the unit
pub fn process_source(name: &str, source: &str) -> Result<PipelineResult, PipelineError> {
    process_source_with_config(name, source, &RuntimeConfig::default())
}

pub fn process_source_with_config(
    name: &str,
    source: &str,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();
    let cleanup = config.file_processor.apply_cleanup_filter;

    let text = if cleanup {
        FileProcessor::clean_text(source)?
    } else {
        source.to_string()
    };

    let mut file_result = FileProcessingResult::from_text(name, text);
    file_result.cleanup_applied = cleanup;
    run_stages(file_result, config, start_time)
}

fn run_stages(
    file_result: FileProcessingResult,
    config: &RuntimeConfig,
    start_time: Instant,
) -> Result<PipelineResult, PipelineError> {
    let display = file_result.metadata.path.display().to_string();

    let mut lexer = LexicalAnalyzer::with_preferences(config.lexical.clone());
    let tokens = lexer.tokenize(&file_result.source)?;

    Parser::new(&tokens).parse_program()?;

    let (symbol_table, diagnostics) =
        semantic_analysis::analyze_with_preferences(&tokens, config.semantic.clone());

    let result = PipelineResult {
        file_metadata: file_result.metadata,
        lexical_metrics: lexer.metrics().clone(),
        tokens,
        symbol_table,
        diagnostics,
        processing_duration: start_time.elapsed(),
    };

    if result.is_successful() {
        result.log_success(&display);
    }

    Ok(result)
}
