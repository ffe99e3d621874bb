use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::semantic_analysis::SemanticError;
use crate::syntax::SyntaxError;
use std::path::PathBuf;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),

    /// Every diagnostic of the run, in source order
    #[error("Semantic analysis found {} error(s)", .0.len())]
    SemanticAnalysis(Vec<SemanticError>),

    #[error("Failed to write '{}': {message}", path.display())]
    OutputWrite { path: PathBuf, message: String },
}

impl PipelineError {
    pub fn output_write(path: PathBuf, error: impl std::fmt::Display) -> Self {
        Self::OutputWrite {
            path,
            message: error.to_string(),
        }
    }

    /// Name of the stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileProcessing(_) => "file processing",
            Self::LexicalAnalysis(_) => "lexical analysis",
            Self::SyntaxAnalysis(_) => "syntax analysis",
            Self::SemanticAnalysis(_) => "semantic analysis",
            Self::OutputWrite { .. } => "output",
        }
    }
}
