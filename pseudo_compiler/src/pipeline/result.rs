use super::error::PipelineError;
use super::output::CompilationSummary;
use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::semantic_analysis::SemanticError;
use crate::symbols::SymbolTable;
use crate::tokens::Token;
use std::time::Duration;

/// Everything one compilation unit produced
///
/// Semantic diagnostics do not abort the pipeline, so a result exists even
/// when the program is semantically wrong; see [`PipelineResult::check`].
#[derive(Debug)]
pub struct PipelineResult {
    pub file_metadata: FileMetadata,
    pub lexical_metrics: LexicalMetrics,
    pub tokens: Vec<Token>,
    pub symbol_table: SymbolTable,
    pub diagnostics: Vec<SemanticError>,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_successful(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Turn collected diagnostics into a pipeline error
    pub fn check(&self) -> Result<(), PipelineError> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::SemanticAnalysis(self.diagnostics.clone()))
        }
    }

    pub fn summary(&self) -> CompilationSummary {
        CompilationSummary {
            tokens: self.tokens.len(),
            variables: self.symbol_table.variable_count(),
            functions: self.symbol_table.function_count(),
            diagnostics: self.diagnostics.len(),
        }
    }

    pub fn log_success(&self, file_path: &str) {
        let seconds = self.processing_duration.as_secs_f64();
        crate::log_success!(
            crate::logging::codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
            "Compilation pipeline succeeded",
            "file" => file_path,
            "duration_ms" => format!("{:.2}", seconds * 1000.0),
            "processing_rate_tokens_per_sec" => format!("{:.0}",
                if seconds > 0.0 { self.tokens.len() as f64 / seconds } else { 0.0 })
        );
    }
}
